//! Transaction building, signing, submission and account history.

use std::collections::BTreeMap;
use std::time::Duration;

use alloy::consensus::Transaction as _;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use bigdecimal::BigDecimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use ethkit_explorer::{InternalScope, PageQuery};
use ethkit_types::abi::MAX_ALLOWANCE;
use ethkit_types::amount::{self, TokenAmount, Unit, NATIVE_DECIMALS};
use ethkit_types::history::{CoinTx, Erc20Tx, Erc721Tx, InternalTx, RawTxHistory, TxHistory};
use ethkit_types::params::{TxFees, TxParams};
use ethkit_types::{Error, Result};

use crate::client::Client;
use crate::contracts::{Contract, DecodedInput};
use crate::fees;
use crate::tx::Tx;

/// How much to transfer or approve.
#[derive(Debug, Clone)]
pub enum TransferAmount {
	/// The full balance, or an unlimited allowance for approvals.
	All,
	/// An exact amount in base units.
	Base(U256),
	/// A decimal amount, scaled by the asset's decimals.
	Decimal(BigDecimal),
}

/// Optional overrides for [`Transactions::send`] and
/// [`Transactions::approve`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
	/// Gas price to bid instead of the network price.
	pub gas_price: Option<Unit>,
	pub gas_limit: Option<u64>,
	pub nonce: Option<u64>,
	/// Treat `gas_price` as a ceiling: fail with
	/// [`Error::GasPriceTooHigh`] when the network price exceeds it.
	pub check_gas_price: bool,
	/// Build and return the transaction without signing or submitting.
	pub dry_run: bool,
}

pub struct Transactions<'a> {
	pub(crate) client: &'a Client,
}

impl Transactions<'_> {
	/// Current network gas price.
	pub async fn gas_price(&self) -> Result<Unit> {
		fees::gas_price(self.client.provider()).await
	}

	/// Current max priority fee per gas.
	pub async fn max_priority_fee(&self) -> Result<Unit> {
		fees::max_priority_fee(self.client.provider()).await
	}

	/// Estimated gas limit for a parameter set.
	pub async fn estimate_gas(&self, params: &TxParams) -> Result<u64> {
		fees::estimate_gas(self.client.provider(), params).await
	}

	/// Fills the missing fields of a parameter set: chain id, sender,
	/// fees, nonce and gas limit, in that order.
	pub async fn auto_add_params(&self, params: &mut TxParams) -> Result<()> {
		if params.chain_id.is_none() {
			params.chain_id = self.client.network.chain_id;
		}
		if params.from.is_none() {
			params.from = Some(self.client.address()?);
		}
		if params.fee_per_gas() == 0 {
			params.fees =
				Some(fees::resolve(self.client.provider(), self.client.network.tx_type).await?);
		}
		if params.nonce.is_none() {
			params.nonce = Some(self.client.wallet().nonce(None).await?);
		}
		if params.gas_limit.unwrap_or(0) == 0 {
			params.gas_limit = Some(self.estimate_gas(params).await?);
		}
		Ok(())
	}

	/// Signs a complete parameter set into raw transaction bytes.
	pub async fn sign(&self, params: &TxParams) -> Result<Vec<u8>> {
		params.ensure_sendable()?;
		let signer = self.client.identity().signer()?.clone();
		let wallet = EthereumWallet::from(signer);
		let envelope = params
			.to_request()
			.build(&wallet)
			.await
			.map_err(|e| Error::Transaction(format!("signing failed: {e}")))?;
		Ok(envelope.encoded_2718())
	}

	/// Completes, signs and submits a parameter set.
	pub async fn sign_and_send(&self, mut params: TxParams) -> Result<Tx> {
		self.auto_add_params(&mut params).await?;
		let raw = self.sign(&params).await?;
		let hash = self.broadcast(&raw).await?;
		info!(%hash, "transaction submitted");
		Ok(Tx::submitted(hash, params))
	}

	pub(crate) async fn broadcast(&self, raw: &[u8]) -> Result<B256> {
		let pending = self
			.client
			.provider()
			.send_raw_transaction(raw)
			.await
			.map_err(|e| Error::Rpc(format!("eth_sendRawTransaction failed: {e}")))?;
		Ok(*pending.tx_hash())
	}

	/// Sends native coin or an ERC-20 token.
	///
	/// The amount is clamped to the available balance, and for native coin
	/// the gas cost is carved out of a full-balance send. A zero effective
	/// amount is [`Error::InsufficientBalance`].
	pub async fn send(
		&self,
		token: Option<Address>,
		recipient: Address,
		amount: TransferAmount,
		options: SendOptions,
	) -> Result<Tx> {
		let from = self.client.address()?;
		let resolved_fees = self.resolve_fees(&options).await?;
		let nonce = match options.nonce {
			Some(nonce) => nonce,
			None => self.client.wallet().nonce(None).await?,
		};

		let mut params = TxParams {
			chain_id: self.client.network.chain_id,
			nonce: Some(nonce),
			from: Some(from),
			fees: Some(resolved_fees),
			..Default::default()
		};

		let balance;
		match token {
			Some(token_address) => {
				let token = self.client.contracts().token(token_address);
				let decimals = token.decimals().await?;
				balance = token.balance_of(from).await?;
				let value = resolve_amount(&amount, decimals, balance)?;
				if value.is_zero() {
					return Err(Error::InsufficientBalance);
				}
				params.to = Some(token_address);
				params.data = Some(token.transfer_calldata(recipient, value));
			}
			None => {
				balance = self.client.wallet().balance(None).await?.as_wei();
				let value = resolve_amount(&amount, NATIVE_DECIMALS, balance)?;
				if value.is_zero() {
					return Err(Error::InsufficientBalance);
				}
				params.to = Some(recipient);
				params.value = Some(value);
			}
		}

		let gas_limit = match options.gas_limit {
			Some(gas_limit) => gas_limit,
			None => self.estimate_gas(&params).await?,
		};
		params.gas_limit = Some(gas_limit);

		if token.is_none() {
			let value = params.value.unwrap_or_default();
			let spendable = spendable_value(balance, value, params.fee_per_gas(), gas_limit)?;
			if spendable != value {
				debug!(%value, %spendable, "amount clamped to cover gas");
				params.value = Some(spendable);
			}
		}

		if options.dry_run {
			return Ok(Tx::from_params(params));
		}
		self.sign_and_send(params).await
	}

	/// Approves an ERC-20 allowance. `None` or [`TransferAmount::All`]
	/// grants an unlimited allowance.
	pub async fn approve(
		&self,
		token: Address,
		spender: Address,
		amount: Option<TransferAmount>,
		options: SendOptions,
	) -> Result<Tx> {
		let from = self.client.address()?;
		let token_contract = self.client.contracts().token(token);
		let value = match amount {
			None | Some(TransferAmount::All) => MAX_ALLOWANCE,
			Some(TransferAmount::Base(value)) => value,
			Some(TransferAmount::Decimal(value)) => {
				let decimals = token_contract.decimals().await?;
				amount::to_base_units(&value, decimals)?
			}
		};
		let resolved_fees = self.resolve_fees(&options).await?;
		let nonce = match options.nonce {
			Some(nonce) => nonce,
			None => self.client.wallet().nonce(None).await?,
		};

		let mut params = TxParams {
			chain_id: self.client.network.chain_id,
			nonce: Some(nonce),
			from: Some(from),
			to: Some(token),
			data: Some(token_contract.approve_calldata(spender, value)),
			fees: Some(resolved_fees),
			..Default::default()
		};
		params.gas_limit = Some(match options.gas_limit {
			Some(gas_limit) => gas_limit,
			None => self.estimate_gas(&params).await?,
		});

		if options.dry_run {
			return Ok(Tx::from_params(params));
		}
		self.sign_and_send(params).await
	}

	/// Current allowance granted to a spender, with decimals attached.
	pub async fn approved_amount(
		&self,
		token: Address,
		spender: Address,
		owner: Option<Address>,
	) -> Result<TokenAmount> {
		let owner = match owner {
			Some(owner) => owner,
			None => self.client.address()?,
		};
		let token = self.client.contracts().token(token);
		let decimals = token.decimals().await?;
		let base_units = token.allowance(owner, spender).await?;
		Ok(TokenAmount::from_base_units(base_units, decimals))
	}

	/// Full account history from the explorer, bucketed by direction.
	pub async fn history(&self, address: Option<Address>) -> Result<TxHistory> {
		let address = match address {
			Some(address) => address,
			None => self.client.address()?,
		};
		let account = self.client.network.explorer()?.account();
		let query = PageQuery::default();
		let coin: Vec<CoinTx> = parse_records(account.txlist(address, &query).await?)?;
		let internal: Vec<InternalTx> = parse_records(
			account
				.txlist_internal(&InternalScope::Address(address), &query)
				.await?,
		)?;
		let erc20: Vec<Erc20Tx> = parse_records(account.token_tx(address, None, &query).await?)?;
		let erc721: Vec<Erc721Tx> =
			parse_records(account.token_nft_tx(address, None, &query).await?)?;
		Ok(TxHistory::new(
			address,
			Some(coin),
			Some(internal),
			Some(erc20),
			Some(erc721),
		))
	}

	/// Account history as raw explorer payloads.
	pub async fn raw_history(&self, address: Option<Address>) -> Result<RawTxHistory> {
		let address = match address {
			Some(address) => address,
			None => self.client.address()?,
		};
		let account = self.client.network.explorer()?.account();
		let query = PageQuery::default();
		Ok(RawTxHistory {
			owner: address,
			coin: Some(account.txlist(address, &query).await?),
			internal: Some(
				account
					.txlist_internal(&InternalScope::Address(address), &query)
					.await?,
			),
			erc20: Some(account.token_tx(address, None, &query).await?),
			erc721: Some(account.token_nft_tx(address, None, &query).await?),
		})
	}

	/// Successful calls from `address` into `contract`, keyed by hash and
	/// optionally filtered by function name substring.
	pub async fn find_txs(
		&self,
		contract: Address,
		function_name: Option<&str>,
		address: Option<Address>,
	) -> Result<BTreeMap<String, CoinTx>> {
		let address = match address {
			Some(address) => address,
			None => self.client.address()?,
		};
		let account = self.client.network.explorer()?.account();
		let records: Vec<CoinTx> =
			parse_records(account.txlist(address, &PageQuery::default()).await?)?;
		Ok(records
			.into_iter()
			.filter(|tx| {
				!tx.is_error
					&& tx.to == Some(contract)
					&& function_name.is_none_or(|name| {
						tx.function_name.as_deref().unwrap_or("").contains(name)
					})
			})
			.map(|tx| (tx.hash.clone(), tx))
			.collect())
	}

	/// Waits for the receipt of a transaction known only by hash.
	pub async fn wait_for_receipt(
		&self,
		hash: B256,
		timeout: Option<Duration>,
		poll_interval: Option<Duration>,
	) -> Result<TransactionReceipt> {
		let mut tx = Tx::from_hash(hash);
		tx.wait_for_receipt(self.client, timeout, poll_interval).await
	}

	/// Decodes calldata against a bound contract's ABI.
	pub fn decode_input_data(&self, contract: &Contract<'_>, data: &[u8]) -> Result<DecodedInput> {
		contract.decode_input(data)
	}

	/// Fetches a transaction by hash and decodes its calldata against a
	/// bound contract's ABI.
	pub async fn decode_tx_input(
		&self,
		contract: &Contract<'_>,
		hash: B256,
	) -> Result<DecodedInput> {
		let tx = self
			.client
			.provider()
			.get_transaction_by_hash(hash)
			.await
			.map_err(|e| Error::Rpc(format!("eth_getTransactionByHash failed: {e}")))?
			.ok_or_else(|| Error::Transaction(format!("transaction {hash} not found")))?;
		contract.decode_input(tx.input())
	}

	/// The fee scheme for one send: the network price, or the caller's
	/// price, optionally enforced as a ceiling.
	async fn resolve_fees(&self, options: &SendOptions) -> Result<TxFees> {
		let current = fees::resolve(self.client.provider(), self.client.network.tx_type).await?;
		let Some(ceiling) = &options.gas_price else {
			return Ok(current);
		};
		apply_fee_ceiling(current, ceiling, options.check_gas_price)
	}
}

/// Replaces the network bid with a caller's price. With `enforce` set, a
/// network price above the ceiling is [`Error::GasPriceTooHigh`] instead.
fn apply_fee_ceiling(current: TxFees, ceiling: &Unit, enforce: bool) -> Result<TxFees> {
	let ceiling_wei = u128::try_from(ceiling.as_wei())
		.map_err(|_| Error::Validation("gas price exceeds 128 bits".into()))?;
	if enforce && current.fee_per_gas() > ceiling_wei {
		return Err(Error::GasPriceTooHigh {
			current: current.fee_per_gas(),
			ceiling: ceiling_wei,
		});
	}
	Ok(match current {
		TxFees::Legacy { .. } => TxFees::Legacy {
			gas_price: ceiling_wei,
		},
		TxFees::Eip1559 {
			max_priority_fee_per_gas,
			..
		} => TxFees::Eip1559 {
			max_fee_per_gas: ceiling_wei,
			max_priority_fee_per_gas: max_priority_fee_per_gas.min(ceiling_wei),
		},
	})
}

fn parse_records<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
	serde_json::from_value(value)
		.map_err(|e| Error::Conversion(format!("unexpected explorer payload: {e}")))
}

/// Resolves a requested amount against an available balance, clamping to
/// the balance.
fn resolve_amount(amount: &TransferAmount, decimals: u8, balance: U256) -> Result<U256> {
	let requested = match amount {
		TransferAmount::All => balance,
		TransferAmount::Base(value) => *value,
		TransferAmount::Decimal(value) => amount::to_base_units(value, decimals)?,
	};
	Ok(requested.min(balance))
}

/// Shrinks a native-coin value so the balance also covers the gas cost.
/// Errors when nothing would be left to send.
fn spendable_value(balance: U256, value: U256, fee_per_gas: u128, gas_limit: u64) -> Result<U256> {
	let gas_cost = U256::from(fee_per_gas).saturating_mul(U256::from(gas_limit));
	let available = balance.saturating_sub(gas_cost);
	if available < value {
		if available.is_zero() {
			return Err(Error::InsufficientBalance);
		}
		return Ok(available);
	}
	Ok(value)
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn resolve_amount_clamps_to_balance() {
		let balance = U256::from(1_000u64);
		assert_eq!(
			resolve_amount(&TransferAmount::All, 18, balance).unwrap(),
			balance
		);
		assert_eq!(
			resolve_amount(&TransferAmount::Base(U256::from(400u64)), 18, balance).unwrap(),
			U256::from(400u64)
		);
		assert_eq!(
			resolve_amount(&TransferAmount::Base(U256::from(2_000u64)), 18, balance).unwrap(),
			balance
		);
	}

	#[test]
	fn resolve_amount_scales_decimals() {
		let value = BigDecimal::from_str("1.5").unwrap();
		let balance = U256::from(10_000_000u64);
		assert_eq!(
			resolve_amount(&TransferAmount::Decimal(value), 6, balance).unwrap(),
			U256::from(1_500_000u64)
		);
	}

	#[test]
	fn fee_ceiling_rejects_expensive_networks() {
		let current = TxFees::Legacy { gas_price: 40 };
		let ceiling = Unit::wei(U256::from(30u64));
		match apply_fee_ceiling(current, &ceiling, true).unwrap_err() {
			Error::GasPriceTooHigh { current, ceiling } => {
				assert_eq!((current, ceiling), (40, 30));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn fee_ceiling_caps_the_bid() {
		// Without enforcement the ceiling simply becomes the bid.
		let current = TxFees::Eip1559 {
			max_fee_per_gas: 40,
			max_priority_fee_per_gas: 35,
		};
		let fees = apply_fee_ceiling(current, &Unit::wei(U256::from(30u64)), false).unwrap();
		assert_eq!(
			fees,
			TxFees::Eip1559 {
				max_fee_per_gas: 30,
				max_priority_fee_per_gas: 30,
			}
		);

		// A cheap network passes the check and still gets the caller's bid.
		let cheap = TxFees::Legacy { gas_price: 10 };
		assert_eq!(
			apply_fee_ceiling(cheap, &Unit::wei(U256::from(30u64)), true).unwrap(),
			TxFees::Legacy { gas_price: 30 }
		);
	}

	#[test]
	fn spendable_value_carves_out_gas() {
		let balance = U256::from(1_000_000u64);
		// Plenty of headroom: value untouched.
		assert_eq!(
			spendable_value(balance, U256::from(100u64), 10, 1_000).unwrap(),
			U256::from(100u64)
		);
		// Full-balance send: gas cost is carved out.
		assert_eq!(
			spendable_value(balance, balance, 10, 1_000).unwrap(),
			U256::from(990_000u64)
		);
		// Gas cost eats the whole balance.
		assert!(matches!(
			spendable_value(balance, balance, 1_000, 1_000).unwrap_err(),
			Error::InsufficientBalance
		));
	}
}
