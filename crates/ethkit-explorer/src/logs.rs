//! `module=logs` endpoints: event log queries.

use alloy::primitives::{Address, B256};
use serde_json::Value;

use ethkit_types::Result;

use crate::{ExplorerApi, Params};

/// Filter for an event log query. Topic operators (`topic0_1_opr` and
/// friends) apply when more than one topic is set.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
	pub address: Option<Address>,
	pub from_block: Option<u64>,
	pub to_block: Option<u64>,
	pub page: Option<u64>,
	pub offset: Option<u64>,
	/// Topic filters by position, e.g. `(0, hash)` for `topic0`.
	pub topics: Vec<(u8, B256)>,
	/// Raw operator parameters, e.g. `("topic0_1_opr", "and")`.
	pub topic_operators: Vec<(&'static str, String)>,
}

pub struct Logs<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Logs<'_> {
	/// Event logs matching a filter.
	pub async fn get_logs(&self, query: &LogQuery) -> Result<Value> {
		let mut params = Params::new()
			.push_opt("address", query.address)
			.push_opt("fromBlock", query.from_block)
			.push_opt("toBlock", query.to_block)
			.push_opt("page", query.page)
			.push_opt("offset", query.offset);
		for (position, topic) in &query.topics {
			params = match position {
				0 => params.push("topic0", topic),
				1 => params.push("topic1", topic),
				2 => params.push("topic2", topic),
				_ => params.push("topic3", topic),
			};
		}
		for (key, value) in &query.topic_operators {
			params = params.push(*key, value.clone());
		}
		self.api.get("logs", "getLogs", params).await
	}
}
