//! `module=account` endpoints: balances and transaction lists.

use alloy::primitives::Address;
use serde_json::Value;

use ethkit_types::Result;

use crate::{ExplorerApi, Params};
use crate::options::{BlockType, PageQuery, Tag};

/// What to list internal transactions for.
#[derive(Debug, Clone)]
pub enum InternalScope {
	/// All internal transactions touching an address.
	Address(Address),
	/// Internal transactions of one parent transaction.
	TxHash(String),
	/// All internal transactions inside the query's block range.
	BlockRange,
}

pub struct Account<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Account<'_> {
	/// Native coin balance of an address, in wei.
	pub async fn balance(&self, address: Address, tag: Tag) -> Result<Value> {
		let params = Params::new().push("address", address).push("tag", tag);
		self.api.get("account", "balance", params).await
	}

	/// Native coin balances for up to 20 addresses in a single call.
	pub async fn balance_multi(&self, addresses: &[Address], tag: Tag) -> Result<Value> {
		let joined = addresses
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(",");
		let params = Params::new().push("address", joined).push("tag", tag);
		self.api.get("account", "balancemulti", params).await
	}

	/// Normal transactions performed by an address.
	pub async fn txlist(&self, address: Address, query: &PageQuery) -> Result<Value> {
		let params = Params::new()
			.push("address", address)
			.push("sort", query.sort)
			.push_opt("startblock", query.start_block)
			.push_opt("endblock", query.end_block)
			.push_opt("page", query.page)
			.push_opt("offset", query.offset);
		self.api.get("account", "txlist", params).await
	}

	/// Internal transactions, scoped by address, parent hash or block range.
	pub async fn txlist_internal(&self, scope: &InternalScope, query: &PageQuery) -> Result<Value> {
		let params = match scope {
			InternalScope::TxHash(hash) => Params::new().push("txhash", hash),
			InternalScope::Address(address) => Params::new()
				.push("address", address)
				.push("sort", query.sort)
				.push_opt("startblock", query.start_block)
				.push_opt("endblock", query.end_block)
				.push_opt("page", query.page)
				.push_opt("offset", query.offset),
			InternalScope::BlockRange => Params::new()
				.push("sort", query.sort)
				.push_opt("startblock", query.start_block)
				.push_opt("endblock", query.end_block)
				.push_opt("page", query.page)
				.push_opt("offset", query.offset),
		};
		self.api.get("account", "txlistinternal", params).await
	}

	/// ERC-20 transfers touching an address, optionally for one token only.
	pub async fn token_tx(
		&self,
		address: Address,
		contract_address: Option<Address>,
		query: &PageQuery,
	) -> Result<Value> {
		let params = Self::transfer_params(address, contract_address, query);
		self.api.get("account", "tokentx", params).await
	}

	/// ERC-721 transfers touching an address, optionally for one token only.
	pub async fn token_nft_tx(
		&self,
		address: Address,
		contract_address: Option<Address>,
		query: &PageQuery,
	) -> Result<Value> {
		let params = Self::transfer_params(address, contract_address, query);
		self.api.get("account", "tokennfttx", params).await
	}

	/// ERC-1155 transfers touching an address, optionally for one token only.
	pub async fn token_1155_tx(
		&self,
		address: Address,
		contract_address: Option<Address>,
		query: &PageQuery,
	) -> Result<Value> {
		let params = Self::transfer_params(address, contract_address, query);
		self.api.get("account", "token1155tx", params).await
	}

	/// Blocks validated by an address.
	pub async fn mined_blocks(
		&self,
		address: Address,
		block_type: BlockType,
		page: Option<u64>,
		offset: Option<u64>,
	) -> Result<Value> {
		let params = Params::new()
			.push("address", address)
			.push("blocktype", block_type)
			.push_opt("page", page)
			.push_opt("offset", offset);
		self.api.get("account", "getminedblocks", params).await
	}

	/// Current ERC-20 token balance of an address, in base units.
	pub async fn token_balance(&self, contract_address: Address, address: Address) -> Result<Value> {
		let params = Params::new()
			.push("contractaddress", contract_address)
			.push("address", address);
		self.api.get("account", "tokenbalance", params).await
	}

	fn transfer_params(
		address: Address,
		contract_address: Option<Address>,
		query: &PageQuery,
	) -> Params {
		Params::new()
			.push("address", address)
			.push("sort", query.sort)
			.push_opt("contractaddress", contract_address)
			.push_opt("startblock", query.start_block)
			.push_opt("endblock", query.end_block)
			.push_opt("page", query.page)
			.push_opt("offset", query.offset)
	}
}
