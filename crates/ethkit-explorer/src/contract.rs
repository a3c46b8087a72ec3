//! `module=contract` endpoints: verified source and ABI lookups.

use alloy::primitives::Address;
use serde_json::Value;

use ethkit_types::{Error, Result};

use crate::{ExplorerApi, Params};

pub struct Contract<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Contract<'_> {
	/// ABI of a verified contract, as its JSON text.
	pub async fn get_abi(&self, address: Address) -> Result<String> {
		let params = Params::new().push("address", address);
		let result = self.api.get("contract", "getabi", params).await?;
		match result {
			Value::String(abi) => Ok(abi),
			other => Err(Error::Api {
				status_code: 200,
				body: format!("expected an ABI string, got {other}"),
			}),
		}
	}

	/// Verified source code of a contract.
	pub async fn get_source_code(&self, address: Address) -> Result<Value> {
		let params = Params::new().push("address", address);
		self.api.get("contract", "getsourcecode", params).await
	}

	/// Deployer address and creation transaction, up to 5 contracts at a time.
	pub async fn get_contract_creation(&self, addresses: &[Address]) -> Result<Value> {
		let joined = addresses
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(",");
		let params = Params::new().push("contractaddresses", joined);
		self.api.get("contract", "getcontractcreation", params).await
	}
}
