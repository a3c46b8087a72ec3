//! `module=token` endpoints: holder lists and project info.

use alloy::primitives::Address;
use serde_json::Value;

use ethkit_types::Result;

use crate::{ExplorerApi, Params};

pub struct Token<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Token<'_> {
	/// Current holders of a token and their balances.
	pub async fn token_holder_list(
		&self,
		contract_address: Address,
		page: Option<u64>,
		offset: Option<u64>,
	) -> Result<Value> {
		let params = Params::new()
			.push("contractaddress", contract_address)
			.push_opt("page", page)
			.push_opt("offset", offset);
		self.api.get("token", "tokenholderlist", params).await
	}

	/// Project information and social links of a token.
	pub async fn token_info(&self, contract_address: Address) -> Result<Value> {
		let params = Params::new().push("contractaddress", contract_address);
		self.api.get("token", "tokeninfo", params).await
	}
}
