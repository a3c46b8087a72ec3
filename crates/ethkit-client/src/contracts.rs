//! Contract access: ABI retrieval, generic calls and typed token wrappers.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol_types::SolCall;

use ethkit_types::abi::{function_summaries, Erc20, Erc721, FunctionSummary};
use ethkit_types::{Error, Result};

use crate::client::Client;

pub struct Contracts<'a> {
	pub(crate) client: &'a Client,
}

impl<'a> Contracts<'a> {
	/// ABI of a verified contract, fetched from the network's explorer.
	pub async fn get_abi(&self, address: Address) -> Result<JsonAbi> {
		let raw = self
			.client
			.network
			.explorer()?
			.contract()
			.get_abi(address)
			.await?;
		serde_json::from_str(&raw)
			.map_err(|e| Error::Contract(format!("bad ABI for {address}: {e}")))
	}

	/// Binds a contract at `address`, fetching the ABI when none is given.
	pub async fn at(&self, address: Address, abi: Option<JsonAbi>) -> Result<Contract<'a>> {
		let abi = match abi {
			Some(abi) => abi,
			None => self.get_abi(address).await?,
		};
		Ok(Contract {
			client: self.client,
			address,
			abi,
		})
	}

	/// Function signatures of a verified contract.
	pub async fn functions(&self, address: Address) -> Result<Vec<FunctionSummary>> {
		Ok(function_summaries(&self.get_abi(address).await?))
	}

	pub fn token(&self, address: Address) -> TokenContract<'a> {
		TokenContract {
			client: self.client,
			address,
		}
	}

	pub fn nft(&self, address: Address) -> NftContract<'a> {
		NftContract {
			client: self.client,
			address,
		}
	}
}

/// A decoded function call: name, full signature and named arguments.
#[derive(Debug, Clone)]
pub struct DecodedInput {
	pub function: String,
	pub signature: String,
	pub args: Vec<(String, DynSolValue)>,
}

/// A contract bound to a client and an ABI.
pub struct Contract<'a> {
	client: &'a Client,
	pub address: Address,
	pub abi: JsonAbi,
}

impl Contract<'_> {
	fn function(&self, name: &str) -> Result<&Function> {
		self.abi
			.function(name)
			.and_then(|functions| functions.first())
			.ok_or_else(|| Error::Contract(format!("no function {name} in ABI")))
	}

	/// Encodes a call to a named function, selector included.
	pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes> {
		let function = self.function(name)?;
		let data = function
			.abi_encode_input(args)
			.map_err(|e| Error::Contract(format!("encoding {name} failed: {e}")))?;
		Ok(Bytes::from(data))
	}

	/// Decodes calldata against the ABI by selector.
	pub fn decode_input(&self, data: &[u8]) -> Result<DecodedInput> {
		if data.len() < 4 {
			return Err(Error::Contract("calldata shorter than a selector".into()));
		}
		let function = self
			.abi
			.functions()
			.find(|function| function.selector()[..] == data[..4])
			.ok_or_else(|| {
				Error::Contract(format!(
					"no function with selector 0x{}",
					hex::encode(&data[..4])
				))
			})?;
		let values = function
			.abi_decode_input(&data[4..])
			.map_err(|e| Error::Contract(format!("decoding {} failed: {e}", function.name)))?;
		let args = function
			.inputs
			.iter()
			.zip(values)
			.map(|(param, value)| {
				let name = if param.name.is_empty() {
					param.ty.clone()
				} else {
					param.name.clone()
				};
				(name, value)
			})
			.collect();
		Ok(DecodedInput {
			function: function.name.clone(),
			signature: function.signature(),
			args,
		})
	}

	/// Read-only call with pre-encoded calldata.
	pub async fn call_raw(&self, data: Bytes) -> Result<Bytes> {
		let request = TransactionRequest {
			to: Some(self.address.into()),
			input: TransactionInput {
				input: Some(data),
				data: None,
			},
			..Default::default()
		};
		self.client
			.provider()
			.call(request)
			.await
			.map_err(|e| Error::Rpc(format!("eth_call failed: {e}")))
	}

	/// Read-only call to a named function, decoding the outputs.
	pub async fn call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
		let function = self.function(name)?.clone();
		let data = function
			.abi_encode_input(args)
			.map_err(|e| Error::Contract(format!("encoding {name} failed: {e}")))?;
		let output = self.call_raw(Bytes::from(data)).await?;
		function
			.abi_decode_output(&output)
			.map_err(|e| Error::Contract(format!("decoding {name} output failed: {e}")))
	}
}

/// Typed ERC-20 wrapper.
pub struct TokenContract<'a> {
	client: &'a Client,
	pub address: Address,
}

impl TokenContract<'_> {
	async fn call<C: SolCall>(&self, call: C) -> Result<C::Return> {
		eth_call(self.client, self.address, call).await
	}

	pub async fn name(&self) -> Result<String> {
		self.call(Erc20::nameCall {}).await
	}

	pub async fn symbol(&self) -> Result<String> {
		self.call(Erc20::symbolCall {}).await
	}

	pub async fn decimals(&self) -> Result<u8> {
		self.call(Erc20::decimalsCall {}).await
	}

	pub async fn total_supply(&self) -> Result<U256> {
		self.call(Erc20::totalSupplyCall {}).await
	}

	pub async fn balance_of(&self, owner: Address) -> Result<U256> {
		self.call(Erc20::balanceOfCall { owner }).await
	}

	pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
		self.call(Erc20::allowanceCall { owner, spender }).await
	}

	/// Calldata for `transfer(to, value)`.
	pub fn transfer_calldata(&self, to: Address, value: U256) -> Bytes {
		Erc20::transferCall { to, value }.abi_encode().into()
	}

	/// Calldata for `approve(spender, value)`.
	pub fn approve_calldata(&self, spender: Address, value: U256) -> Bytes {
		Erc20::approveCall { spender, value }.abi_encode().into()
	}
}

/// Typed ERC-721 wrapper.
pub struct NftContract<'a> {
	client: &'a Client,
	pub address: Address,
}

impl NftContract<'_> {
	async fn call<C: SolCall>(&self, call: C) -> Result<C::Return> {
		eth_call(self.client, self.address, call).await
	}

	pub async fn name(&self) -> Result<String> {
		self.call(Erc721::nameCall {}).await
	}

	pub async fn symbol(&self) -> Result<String> {
		self.call(Erc721::symbolCall {}).await
	}

	pub async fn total_supply(&self) -> Result<U256> {
		self.call(Erc721::totalSupplyCall {}).await
	}

	pub async fn owner_of(&self, token_id: U256) -> Result<Address> {
		self.call(Erc721::ownerOfCall { tokenId: token_id }).await
	}

	pub async fn token_uri(&self, token_id: U256) -> Result<String> {
		self.call(Erc721::tokenURICall { tokenId: token_id }).await
	}
}

async fn eth_call<C: SolCall>(client: &Client, to: Address, call: C) -> Result<C::Return> {
	let request = TransactionRequest {
		to: Some(to.into()),
		input: TransactionInput {
			input: Some(call.abi_encode().into()),
			data: None,
		},
		..Default::default()
	};
	let output = client
		.provider()
		.call(request)
		.await
		.map_err(|e| Error::Rpc(format!("eth_call failed: {e}")))?;
	C::abi_decode_returns(&output)
		.map_err(|e| Error::Contract(format!("decoding call output failed: {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::{presets, Network};
	use crate::signer::KeySource;

	fn offline_client() -> Client {
		Client::new(Network::offline(presets::ethereum(None)), KeySource::Generate).unwrap()
	}

	fn erc20_abi() -> JsonAbi {
		serde_json::from_str(
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
		.unwrap()
	}

	#[test]
	fn encode_and_decode_round_trip() {
		let client = offline_client();
		let contract = Contract {
			client: &client,
			address: Address::ZERO,
			abi: erc20_abi(),
		};
		let recipient = Address::repeat_byte(0x11);
		let args = [
			DynSolValue::Address(recipient),
			DynSolValue::Uint(U256::from(42u64), 256),
		];
		let data = contract.encode_call("transfer", &args).unwrap();

		let decoded = contract.decode_input(&data).unwrap();
		assert_eq!(decoded.function, "transfer");
		assert_eq!(decoded.signature, "transfer(address,uint256)");
		assert_eq!(decoded.args.len(), 2);
		assert_eq!(decoded.args[0].0, "to");
		assert_eq!(decoded.args[0].1, DynSolValue::Address(recipient));
	}

	#[test]
	fn unknown_selector_is_a_contract_error() {
		let client = offline_client();
		let contract = Contract {
			client: &client,
			address: Address::ZERO,
			abi: erc20_abi(),
		};
		assert!(matches!(
			contract.decode_input(&[0xde, 0xad, 0xbe, 0xef, 0x00]).unwrap_err(),
			Error::Contract(_)
		));
		assert!(matches!(
			contract.decode_input(&[0xde]).unwrap_err(),
			Error::Contract(_)
		));
		assert!(matches!(
			contract.encode_call("mint", &[]).unwrap_err(),
			Error::Contract(_)
		));
	}

	#[test]
	fn token_calldata_carries_selectors() {
		let client = offline_client();
		let token = client.contracts().token(Address::ZERO);
		let transfer = token.transfer_calldata(Address::repeat_byte(0x22), U256::from(5u64));
		assert_eq!(&transfer[..4], &Erc20::transferCall::SELECTOR);
		let approve = token.approve_calldata(Address::repeat_byte(0x22), U256::MAX);
		assert_eq!(&approve[..4], &Erc20::approveCall::SELECTOR);
		// An unlimited approval encodes the sentinel as all-ones.
		assert!(approve[4 + 32..].iter().all(|byte| *byte == 0xff));
	}
}
