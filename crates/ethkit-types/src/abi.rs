//! ABI summaries and the built-in token interfaces.

use alloy::json_abi::JsonAbi;
use alloy::primitives::U256;
use alloy::sol;
use serde::{Deserialize, Serialize};

/// Allowance sentinel meaning "unlimited" (2^256 - 1).
pub const MAX_ALLOWANCE: U256 = U256::MAX;

sol! {
	/// Minimal ERC-20 surface used by the typed token wrapper.
	interface Erc20 {
		function name() external view returns (string);
		function symbol() external view returns (string);
		function decimals() external view returns (uint8);
		function totalSupply() external view returns (uint256);
		function balanceOf(address owner) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function transfer(address to, uint256 value) external returns (bool);
		function approve(address spender, uint256 value) external returns (bool);
	}

	/// Minimal ERC-721 surface used by the NFT wrapper.
	interface Erc721 {
		function name() external view returns (string);
		function symbol() external view returns (string);
		function totalSupply() external view returns (uint256);
		function ownerOf(uint256 tokenId) external view returns (address);
		function tokenURI(uint256 tokenId) external view returns (string);
	}
}

/// One input or output of a contract function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionArgument {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
}

/// A human-readable summary of a contract function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSummary {
	pub name: String,
	pub inputs: Vec<FunctionArgument>,
	pub outputs: Vec<FunctionArgument>,
}

/// Lists the functions of an ABI with their argument names and types.
pub fn function_summaries(abi: &JsonAbi) -> Vec<FunctionSummary> {
	abi.functions()
		.map(|function| FunctionSummary {
			name: function.name.clone(),
			inputs: function
				.inputs
				.iter()
				.map(|param| FunctionArgument {
					name: param.name.clone(),
					kind: param.ty.clone(),
				})
				.collect(),
			outputs: function
				.outputs
				.iter()
				.map(|param| FunctionArgument {
					name: param.name.clone(),
					kind: param.ty.clone(),
				})
				.collect(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use alloy::primitives::Address;
	use alloy::sol_types::SolCall;

	use super::*;

	#[test]
	fn transfer_calldata_carries_selector_and_args() {
		let call = Erc20::transferCall {
			to: Address::ZERO,
			value: U256::from(1u64),
		};
		let data = call.abi_encode();
		assert_eq!(&data[..4], &Erc20::transferCall::SELECTOR);
		assert_eq!(data.len(), 4 + 32 + 32);
	}

	#[test]
	fn summaries_expose_names_and_types() {
		let abi: JsonAbi = serde_json::from_str(
			r#"[{
				"type": "function",
				"name": "transfer",
				"stateMutability": "nonpayable",
				"inputs": [
					{"name": "to", "type": "address"},
					{"name": "value", "type": "uint256"}
				],
				"outputs": [{"name": "", "type": "bool"}]
			}]"#,
		)
		.unwrap();
		let summaries = function_summaries(&abi);
		assert_eq!(summaries.len(), 1);
		assert_eq!(summaries[0].name, "transfer");
		assert_eq!(summaries[0].inputs[0].kind, "address");
		assert_eq!(summaries[0].outputs[0].kind, "bool");
	}
}
