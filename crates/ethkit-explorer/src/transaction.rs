//! `module=transaction` endpoints: execution status checks.

use alloy::primitives::B256;
use serde_json::Value;

use ethkit_types::Result;

use crate::{ExplorerApi, Params};

pub struct Transaction<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Transaction<'_> {
	/// Contract execution status of a transaction.
	pub async fn get_status(&self, tx_hash: B256) -> Result<Value> {
		let params = Params::new().push("txhash", tx_hash);
		self.api.get("transaction", "getstatus", params).await
	}

	/// Receipt status of a transaction (post-Byzantium only).
	pub async fn get_tx_receipt_status(&self, tx_hash: B256) -> Result<Value> {
		let params = Params::new().push("txhash", tx_hash);
		self.api
			.get("transaction", "gettxreceiptstatus", params)
			.await
	}
}
