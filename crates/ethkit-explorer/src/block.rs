//! `module=block` endpoints: rewards, countdowns and timestamp lookups.

use serde_json::Value;

use ethkit_types::Result;

use crate::options::Closest;
use crate::{ExplorerApi, Params};

pub struct Block<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Block<'_> {
	/// Block reward and uncle rewards of a block.
	pub async fn get_block_reward(&self, block_number: u64) -> Result<Value> {
		let params = Params::new().push("blockno", block_number);
		self.api.get("block", "getblockreward", params).await
	}

	/// Estimated seconds until a future block is produced.
	pub async fn get_block_countdown(&self, block_number: u64) -> Result<Value> {
		let params = Params::new().push("blockno", block_number);
		self.api.get("block", "getblockcountdown", params).await
	}

	/// Number of the block mined closest to a Unix timestamp.
	pub async fn get_block_number_by_time(&self, timestamp: u64, closest: Closest) -> Result<Value> {
		let params = Params::new()
			.push("timestamp", timestamp)
			.push("closest", closest);
		self.api.get("block", "getblocknobytime", params).await
	}
}
