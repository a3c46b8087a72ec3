//! `module=stats` endpoints: supply, price and daily network series.

use alloy::primitives::Address;
use serde_json::Value;

use ethkit_types::Result;

use crate::options::{ClientType, Sort, SyncMode};
use crate::{ExplorerApi, Params};

/// Daily statistics series sharing the date-range request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyStat {
	TxnFee,
	NewAddress,
	NetUtilization,
	AvgHashRate,
	TxCount,
	AvgNetDifficulty,
	MarketCap,
	Price,
	AvgBlockSize,
	BlockCount,
	BlockRewards,
	AvgBlockTime,
	UncleBlockCount,
	AvgGasLimit,
	GasUsed,
	AvgGasPrice,
}

impl DailyStat {
	fn action(self) -> &'static str {
		match self {
			DailyStat::TxnFee => "dailytxnfee",
			DailyStat::NewAddress => "dailynewaddress",
			DailyStat::NetUtilization => "dailynetutilization",
			DailyStat::AvgHashRate => "dailyavghashrate",
			DailyStat::TxCount => "dailytx",
			DailyStat::AvgNetDifficulty => "dailyavgnetdifficulty",
			DailyStat::MarketCap => "ethdailymarketcap",
			DailyStat::Price => "ethdailyprice",
			DailyStat::AvgBlockSize => "dailyavgblocksize",
			DailyStat::BlockCount => "dailyblkcount",
			DailyStat::BlockRewards => "dailyblockrewards",
			DailyStat::AvgBlockTime => "dailyavgblocktime",
			DailyStat::UncleBlockCount => "dailyuncleblkcount",
			DailyStat::AvgGasLimit => "dailyavggaslimit",
			DailyStat::GasUsed => "dailygasused",
			DailyStat::AvgGasPrice => "dailyavggasprice",
		}
	}
}

pub struct Stats<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Stats<'_> {
	/// Current amount of native coin in circulation.
	pub async fn eth_supply(&self) -> Result<Value> {
		self.api.get("stats", "ethsupply", Params::new()).await
	}

	/// Circulating supply with staking rewards and burnt fees broken out.
	pub async fn eth_supply2(&self) -> Result<Value> {
		self.api.get("stats", "ethsupply2", Params::new()).await
	}

	/// Latest native coin price.
	pub async fn eth_price(&self) -> Result<Value> {
		self.api.get("stats", "ethprice", Params::new()).await
	}

	/// Total number of discoverable nodes.
	pub async fn node_count(&self) -> Result<Value> {
		self.api.get("stats", "nodecount", Params::new()).await
	}

	/// Total supply of an ERC-20 token.
	pub async fn token_supply(&self, contract_address: Address) -> Result<Value> {
		let params = Params::new().push("contractaddress", contract_address);
		self.api.get("stats", "tokensupply", params).await
	}

	/// Chain size in bytes over a date range (dates in `yyyy-MM-dd`).
	pub async fn chain_size(
		&self,
		start_date: &str,
		end_date: &str,
		client_type: ClientType,
		sync_mode: SyncMode,
		sort: Sort,
	) -> Result<Value> {
		let params = Params::new()
			.push("startdate", start_date)
			.push("enddate", end_date)
			.push("clienttype", client_type)
			.push("syncmode", sync_mode)
			.push("sort", sort);
		self.api.get("stats", "chainsize", params).await
	}

	/// One of the daily statistics series over a date range.
	pub async fn daily(
		&self,
		stat: DailyStat,
		start_date: &str,
		end_date: &str,
		sort: Sort,
	) -> Result<Value> {
		let params = Params::new()
			.push("startdate", start_date)
			.push("enddate", end_date)
			.push("sort", sort);
		self.api.get("stats", stat.action(), params).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn daily_stats_map_to_actions() {
		assert_eq!(DailyStat::TxnFee.action(), "dailytxnfee");
		assert_eq!(DailyStat::Price.action(), "ethdailyprice");
		assert_eq!(DailyStat::AvgGasPrice.action(), "dailyavggasprice");
	}
}
