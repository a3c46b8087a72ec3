//! Explorer account-history records and direction bucketing.
//!
//! Etherscan-family APIs serialize every number as a decimal string; the
//! deserializers here normalize them into native integer types.

use std::collections::BTreeMap;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

mod string_numbers {
	use std::str::FromStr;

	use alloy::primitives::{Address, U256};
	use serde::{de, Deserialize, Deserializer};

	pub fn u64_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}

	pub fn u8_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}

	pub fn u128_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}

	pub fn u256_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
		let s = String::deserialize(deserializer)?;
		U256::from_str(&s).map_err(de::Error::custom)
	}

	/// Addresses may be empty strings (e.g. `contractAddress` on a plain
	/// transfer); those become `None`.
	pub fn opt_address_from_str<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<Address>, D::Error> {
		let s = String::deserialize(deserializer)?;
		if s.is_empty() {
			return Ok(None);
		}
		Address::from_str(&s).map(Some).map_err(de::Error::custom)
	}

	/// `"1"` means set, anything else means clear.
	pub fn flag_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
		let s = String::deserialize(deserializer)?;
		Ok(s == "1")
	}
}

/// A normal (external) transaction from the `txlist` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinTx {
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub block_number: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub time_stamp: u64,
	pub hash: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub nonce: u64,
	pub block_hash: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub transaction_index: u64,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub from: Option<Address>,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub to: Option<Address>,
	#[serde(deserialize_with = "string_numbers::u256_from_str")]
	pub value: U256,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas: u64,
	#[serde(deserialize_with = "string_numbers::u128_from_str")]
	pub gas_price: u128,
	#[serde(deserialize_with = "string_numbers::flag_from_str")]
	pub is_error: bool,
	#[serde(rename = "txreceipt_status", default)]
	pub txreceipt_status: String,
	pub input: String,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str", default)]
	pub contract_address: Option<Address>,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub cumulative_gas_used: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas_used: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub confirmations: u64,
	#[serde(default)]
	pub method_id: Option<String>,
	#[serde(default)]
	pub function_name: Option<String>,
}

/// An internal (message-call) transaction from `txlistinternal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTx {
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub block_number: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub time_stamp: u64,
	pub hash: String,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub from: Option<Address>,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub to: Option<Address>,
	#[serde(deserialize_with = "string_numbers::u256_from_str")]
	pub value: U256,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str", default)]
	pub contract_address: Option<Address>,
	pub input: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas_used: u64,
	#[serde(default)]
	pub trace_id: Option<String>,
	#[serde(deserialize_with = "string_numbers::flag_from_str")]
	pub is_error: bool,
	#[serde(default)]
	pub err_code: Option<String>,
}

/// An ERC-20 transfer from `tokentx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Tx {
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub block_number: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub time_stamp: u64,
	pub hash: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub nonce: u64,
	pub block_hash: String,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub from: Option<Address>,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub contract_address: Option<Address>,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub to: Option<Address>,
	#[serde(deserialize_with = "string_numbers::u256_from_str")]
	pub value: U256,
	pub token_name: String,
	pub token_symbol: String,
	#[serde(deserialize_with = "string_numbers::u8_from_str")]
	pub token_decimal: u8,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub transaction_index: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas: u64,
	#[serde(deserialize_with = "string_numbers::u128_from_str")]
	pub gas_price: u128,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas_used: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub cumulative_gas_used: u64,
	pub input: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub confirmations: u64,
}

/// An ERC-721 transfer from `tokennfttx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc721Tx {
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub block_number: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub time_stamp: u64,
	pub hash: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub nonce: u64,
	pub block_hash: String,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub from: Option<Address>,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub contract_address: Option<Address>,
	#[serde(deserialize_with = "string_numbers::opt_address_from_str")]
	pub to: Option<Address>,
	#[serde(rename = "tokenID", deserialize_with = "string_numbers::u256_from_str")]
	pub token_id: U256,
	pub token_name: String,
	pub token_symbol: String,
	#[serde(deserialize_with = "string_numbers::u8_from_str")]
	pub token_decimal: u8,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub transaction_index: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas: u64,
	#[serde(deserialize_with = "string_numbers::u128_from_str")]
	pub gas_price: u128,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub gas_used: u64,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub cumulative_gas_used: u64,
	pub input: String,
	#[serde(deserialize_with = "string_numbers::u64_from_str")]
	pub confirmations: u64,
}

/// Common view over history records, used for direction bucketing.
pub trait HistoryRecord {
	fn tx_hash(&self) -> &str;
	fn sender(&self) -> Option<Address>;
	fn recipient(&self) -> Option<Address>;
}

impl HistoryRecord for CoinTx {
	fn tx_hash(&self) -> &str {
		&self.hash
	}
	fn sender(&self) -> Option<Address> {
		self.from
	}
	fn recipient(&self) -> Option<Address> {
		self.to
	}
}

impl HistoryRecord for InternalTx {
	fn tx_hash(&self) -> &str {
		&self.hash
	}
	fn sender(&self) -> Option<Address> {
		self.from
	}
	fn recipient(&self) -> Option<Address> {
		self.to
	}
}

impl HistoryRecord for Erc20Tx {
	fn tx_hash(&self) -> &str {
		&self.hash
	}
	fn sender(&self) -> Option<Address> {
		self.from
	}
	fn recipient(&self) -> Option<Address> {
		self.to
	}
}

impl HistoryRecord for Erc721Tx {
	fn tx_hash(&self) -> &str {
		&self.hash
	}
	fn sender(&self) -> Option<Address> {
		self.from
	}
	fn recipient(&self) -> Option<Address> {
		self.to
	}
}

/// History records keyed by transaction hash and split by direction
/// relative to an owner address.
#[derive(Debug, Clone)]
pub struct TxBuckets<T> {
	pub all: BTreeMap<String, T>,
	pub incoming: BTreeMap<String, T>,
	pub outgoing: BTreeMap<String, T>,
}

impl<T: HistoryRecord + Clone> TxBuckets<T> {
	/// Buckets records by direction. A record whose recipient matches
	/// `owner` is incoming; otherwise one whose sender matches is outgoing.
	/// Records matching neither stay in `all` only.
	pub fn new(owner: Address, records: Vec<T>) -> TxBuckets<T> {
		let mut buckets = TxBuckets {
			all: BTreeMap::new(),
			incoming: BTreeMap::new(),
			outgoing: BTreeMap::new(),
		};
		for record in records {
			let hash = record.tx_hash().to_string();
			if record.recipient() == Some(owner) {
				buckets.incoming.insert(hash.clone(), record.clone());
			} else if record.sender() == Some(owner) {
				buckets.outgoing.insert(hash.clone(), record.clone());
			}
			buckets.all.insert(hash, record);
		}
		buckets
	}
}

/// Aggregated account history. Each bucket is present only when its record
/// kind was fetched.
#[derive(Debug, Clone)]
pub struct TxHistory {
	pub owner: Address,
	pub coin: Option<TxBuckets<CoinTx>>,
	pub internal: Option<TxBuckets<InternalTx>>,
	pub erc20: Option<TxBuckets<Erc20Tx>>,
	pub erc721: Option<TxBuckets<Erc721Tx>>,
}

impl TxHistory {
	pub fn new(
		owner: Address,
		coin: Option<Vec<CoinTx>>,
		internal: Option<Vec<InternalTx>>,
		erc20: Option<Vec<Erc20Tx>>,
		erc721: Option<Vec<Erc721Tx>>,
	) -> TxHistory {
		TxHistory {
			owner,
			coin: coin.map(|records| TxBuckets::new(owner, records)),
			internal: internal.map(|records| TxBuckets::new(owner, records)),
			erc20: erc20.map(|records| TxBuckets::new(owner, records)),
			erc721: erc721.map(|records| TxBuckets::new(owner, records)),
		}
	}
}

/// Account history as raw JSON payloads, without record parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTxHistory {
	pub owner: Address,
	pub coin: Option<serde_json::Value>,
	pub internal: Option<serde_json::Value>,
	pub erc20: Option<serde_json::Value>,
	pub erc721: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	const OWNER: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
	const OTHER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
	const THIRD: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

	fn sample_tx(hash: &str, from: &str, to: &str) -> CoinTx {
		serde_json::from_value(serde_json::json!({
			"blockNumber": "18000000",
			"timeStamp": "1693526400",
			"hash": hash,
			"nonce": "42",
			"blockHash": "0xabc",
			"transactionIndex": "3",
			"from": from,
			"to": to,
			"value": "1000000000000000000",
			"gas": "21000",
			"gasPrice": "30000000000",
			"isError": "0",
			"txreceipt_status": "1",
			"input": "0x",
			"contractAddress": "",
			"cumulativeGasUsed": "1000000",
			"gasUsed": "21000",
			"confirmations": "120",
			"methodId": "0x",
			"functionName": ""
		}))
		.unwrap()
	}

	#[test]
	fn parses_string_numbers_and_empty_addresses() {
		let tx = sample_tx("0x01", OWNER, OTHER);
		assert_eq!(tx.block_number, 18_000_000);
		assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
		assert_eq!(tx.gas_price, 30_000_000_000);
		assert!(!tx.is_error);
		assert_eq!(tx.contract_address, None);
		assert_eq!(tx.from, Some(Address::from_str(OWNER).unwrap()));
	}

	#[test]
	fn buckets_split_by_direction() {
		let owner = Address::from_str(OWNER).unwrap();
		let records = vec![
			sample_tx("0x01", OTHER, OWNER),
			sample_tx("0x02", THIRD, OWNER),
			sample_tx("0x03", OWNER, OTHER),
			sample_tx("0x04", OTHER, THIRD),
		];
		let buckets = TxBuckets::new(owner, records);
		assert_eq!(buckets.all.len(), 4);
		assert_eq!(buckets.incoming.len(), 2);
		assert_eq!(buckets.outgoing.len(), 1);
		assert!(buckets.incoming.contains_key("0x01"));
		assert!(buckets.incoming.contains_key("0x02"));
		assert!(buckets.outgoing.contains_key("0x03"));
	}

	#[test]
	fn every_record_lands_in_exactly_one_direction() {
		let owner = Address::from_str(OWNER).unwrap();
		let records = vec![
			sample_tx("0x01", OTHER, OWNER),
			sample_tx("0x02", THIRD, OWNER),
			sample_tx("0x03", OWNER, OTHER),
			sample_tx("0x04", OWNER, THIRD),
		];
		let buckets = TxBuckets::new(owner, records);
		assert_eq!(buckets.all.len(), 4);
		assert_eq!(buckets.incoming.len(), 2);
		assert_eq!(buckets.outgoing.len(), 2);
		for hash in ["0x01", "0x02"] {
			assert!(buckets.incoming.contains_key(hash));
			assert!(!buckets.outgoing.contains_key(hash));
		}
		for hash in ["0x03", "0x04"] {
			assert!(buckets.outgoing.contains_key(hash));
			assert!(!buckets.incoming.contains_key(hash));
		}
	}

	#[test]
	fn self_transfer_counts_as_incoming() {
		let owner = Address::from_str(OWNER).unwrap();
		let buckets = TxBuckets::new(owner, vec![sample_tx("0x0a", OWNER, OWNER)]);
		assert_eq!(buckets.incoming.len(), 1);
		assert_eq!(buckets.outgoing.len(), 0);
	}

	#[test]
	fn history_skips_unfetched_kinds() {
		let owner = Address::from_str(OWNER).unwrap();
		let history = TxHistory::new(owner, Some(vec![]), None, None, None);
		assert!(history.coin.is_some());
		assert!(history.internal.is_none());
	}
}
