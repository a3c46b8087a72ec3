//! A handle to a single transaction: parameter recovery, receipt waiting,
//! cancellation and speed-up.

use std::time::Duration;

use alloy::consensus::Transaction as _;
use alloy::primitives::{B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use tokio::time::Instant;
use tracing::{debug, info};

use ethkit_types::amount::Unit;
use ethkit_types::params::{TxFees, TxParams};
use ethkit_types::{Error, Result};

use crate::client::Client;
use crate::contracts::{Contract, DecodedInput};
use crate::fees;

pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum fee bump for a same-nonce replacement, as accepted by most
/// node implementations.
const REPLACEMENT_BUMP: (u128, u128) = (111, 100);
/// Default fee bump for a speed-up.
const SPEED_UP_BUMP: (u128, u128) = (3, 2);

/// A single transaction, known by hash or by parameters, with lazily
/// fetched state cached on the handle.
///
/// The two public constructors are the only ways to build one, so a
/// handle always carries a hash or a parameter set.
#[derive(Debug, Clone)]
pub struct Tx {
	hash: Option<B256>,
	params: Option<TxParams>,
	receipt: Option<TransactionReceipt>,
	decoded_input: Option<DecodedInput>,
}

impl Tx {
	/// A handle to an already-submitted transaction.
	pub fn from_hash(hash: B256) -> Tx {
		Tx {
			hash: Some(hash),
			params: None,
			receipt: None,
			decoded_input: None,
		}
	}

	/// A built but unsubmitted transaction (a dry run).
	pub fn from_params(params: TxParams) -> Tx {
		Tx {
			hash: None,
			params: Some(params),
			receipt: None,
			decoded_input: None,
		}
	}

	pub(crate) fn submitted(hash: B256, params: TxParams) -> Tx {
		Tx {
			hash: Some(hash),
			params: Some(params),
			receipt: None,
			decoded_input: None,
		}
	}

	pub fn hash(&self) -> Option<B256> {
		self.hash
	}

	pub fn params(&self) -> Option<&TxParams> {
		self.params.as_ref()
	}

	pub fn receipt(&self) -> Option<&TransactionReceipt> {
		self.receipt.as_ref()
	}

	pub fn decoded_input(&self) -> Option<&DecodedInput> {
		self.decoded_input.as_ref()
	}

	/// Recovers the transaction's parameters from the network, caching
	/// them on the handle.
	pub async fn parse_params(&mut self, client: &Client) -> Result<TxParams> {
		if let Some(params) = &self.params {
			return Ok(params.clone());
		}
		let hash = self
			.hash
			.ok_or_else(|| Error::Transaction("transaction has no hash".into()))?;
		let tx = client
			.provider()
			.get_transaction_by_hash(hash)
			.await
			.map_err(|e| Error::Rpc(format!("eth_getTransactionByHash failed: {e}")))?
			.ok_or_else(|| Error::Transaction(format!("transaction {hash} not found")))?;

		let fees = match tx.gas_price() {
			Some(gas_price) => TxFees::Legacy { gas_price },
			None => TxFees::Eip1559 {
				max_fee_per_gas: tx.max_fee_per_gas(),
				max_priority_fee_per_gas: tx.max_priority_fee_per_gas().unwrap_or(0),
			},
		};
		let params = TxParams {
			chain_id: tx.chain_id(),
			nonce: Some(tx.nonce()),
			from: Some(tx.inner.signer()),
			to: tx.to(),
			value: Some(tx.value()),
			data: Some(tx.input().clone()),
			gas_limit: Some(tx.gas_limit()),
			fees: Some(fees),
		};
		self.params = Some(params.clone());
		Ok(params)
	}

	/// Decodes the transaction's calldata against a bound contract's ABI,
	/// caching the result. Calldata that does not match the ABI is `None`,
	/// not an error; fetch failures still propagate.
	pub async fn decode_input(
		&mut self,
		client: &Client,
		contract: &Contract<'_>,
	) -> Result<Option<DecodedInput>> {
		if let Some(decoded) = &self.decoded_input {
			return Ok(Some(decoded.clone()));
		}
		let params = self.parse_params(client).await?;
		let Some(data) = params.data else {
			return Ok(None);
		};
		match contract.decode_input(&data) {
			Ok(decoded) => {
				self.decoded_input = Some(decoded.clone());
				Ok(Some(decoded))
			}
			Err(Error::Contract(reason)) => {
				debug!(%reason, "calldata did not decode");
				Ok(None)
			}
			Err(e) => Err(e),
		}
	}

	/// Polls for the transaction receipt until it appears or the timeout
	/// elapses, caching it on the handle.
	pub async fn wait_for_receipt(
		&mut self,
		client: &Client,
		timeout: Option<Duration>,
		poll_interval: Option<Duration>,
	) -> Result<TransactionReceipt> {
		if let Some(receipt) = &self.receipt {
			return Ok(receipt.clone());
		}
		let hash = self
			.hash
			.ok_or_else(|| Error::Transaction("transaction has no hash".into()))?;
		let timeout = timeout.unwrap_or(DEFAULT_RECEIPT_TIMEOUT);
		let poll_interval = poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
		let started = Instant::now();
		loop {
			let receipt = client
				.provider()
				.get_transaction_receipt(hash)
				.await
				.map_err(|e| Error::Rpc(format!("eth_getTransactionReceipt failed: {e}")))?;
			if let Some(receipt) = receipt {
				debug!(%hash, status = receipt.status(), "receipt found");
				self.receipt = Some(receipt.clone());
				return Ok(receipt);
			}
			let elapsed = started.elapsed();
			if elapsed >= timeout {
				return Err(Error::Timeout { elapsed });
			}
			tokio::time::sleep(poll_interval).await;
		}
	}

	/// Replaces a pending transaction with a zero-value self-transfer on
	/// the same nonce. Returns `false` when the handle carries no nonce to
	/// replace or the client cannot sign.
	pub async fn cancel(
		&mut self,
		client: &Client,
		gas_price: Option<Unit>,
		gas_limit: Option<u64>,
	) -> Result<bool> {
		if client.identity().is_read_only() {
			return Ok(false);
		}
		let Some(original) = self.params.clone() else {
			return Ok(false);
		};
		let Some(nonce) = original.nonce else {
			return Ok(false);
		};
		let from = client.address()?;
		let fees = replacement_fees(client, &original, gas_price, None).await?;
		let mut params = TxParams {
			chain_id: client.network.chain_id,
			nonce: Some(nonce),
			from: Some(from),
			to: Some(from),
			value: Some(U256::ZERO),
			fees: Some(fees),
			..Default::default()
		};
		params.gas_limit = Some(match gas_limit {
			Some(gas_limit) => gas_limit,
			None => fees::estimate_gas(client.provider(), &params).await?,
		});
		self.replace(client, params).await?;
		Ok(true)
	}

	/// Resubmits the same payload on the same nonce at a higher fee.
	/// Returns `false` when the handle carries no nonce to replace or the
	/// client cannot sign.
	pub async fn speed_up(
		&mut self,
		client: &Client,
		gas_price: Option<Unit>,
		gas_limit: Option<u64>,
	) -> Result<bool> {
		if client.identity().is_read_only() {
			return Ok(false);
		}
		let Some(original) = self.params.clone() else {
			return Ok(false);
		};
		if original.nonce.is_none() {
			return Ok(false);
		}
		let fees = replacement_fees(client, &original, gas_price, Some(SPEED_UP_BUMP)).await?;
		let mut params = TxParams {
			fees: Some(fees),
			..original.clone()
		};
		if params.from.is_none() {
			params.from = Some(client.address()?);
		}
		if params.chain_id.is_none() {
			params.chain_id = client.network.chain_id;
		}
		params.gas_limit = Some(match gas_limit.or(original.gas_limit) {
			Some(gas_limit) => gas_limit,
			None => fees::estimate_gas(client.provider(), &params).await?,
		});
		self.replace(client, params).await?;
		Ok(true)
	}

	async fn replace(&mut self, client: &Client, params: TxParams) -> Result<()> {
		let transactions = client.transactions();
		let raw = transactions.sign(&params).await?;
		let hash = transactions.broadcast(&raw).await?;
		info!(%hash, old = ?self.hash, "transaction replaced");
		self.hash = Some(hash);
		self.params = Some(params);
		self.receipt = None;
		self.decoded_input = None;
		Ok(())
	}
}

/// The fee scheme for a same-nonce replacement: the network price (bumped
/// by `default_bump` when given) or the caller's price, raised to at
/// least 111% of the original bid.
async fn replacement_fees(
	client: &Client,
	original: &TxParams,
	gas_price: Option<Unit>,
	default_bump: Option<(u128, u128)>,
) -> Result<TxFees> {
	let current = fees::resolve(client.provider(), client.network.tx_type).await?;
	let fees = match gas_price {
		Some(price) => {
			let wei = u128::try_from(price.as_wei())
				.map_err(|_| Error::Validation("gas price exceeds 128 bits".into()))?;
			match current {
				TxFees::Legacy { .. } => TxFees::Legacy { gas_price: wei },
				TxFees::Eip1559 {
					max_priority_fee_per_gas,
					..
				} => TxFees::Eip1559 {
					max_fee_per_gas: wei,
					max_priority_fee_per_gas: max_priority_fee_per_gas.min(wei),
				},
			}
		}
		None => match default_bump {
			Some((numerator, denominator)) => current.bumped(numerator, denominator),
			None => current,
		},
	};
	let floor = original
		.fee_per_gas()
		.saturating_mul(REPLACEMENT_BUMP.0)
		.div_ceil(REPLACEMENT_BUMP.1);
	Ok(fees.raised_to(floor))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::{presets, Network};
	use crate::signer::KeySource;

	fn offline_client() -> Client {
		Client::new(Network::offline(presets::ethereum(None)), KeySource::Generate).unwrap()
	}

	#[test]
	fn constructors_carry_hash_or_params() {
		let by_hash = Tx::from_hash(B256::repeat_byte(0x01));
		assert_eq!(by_hash.hash(), Some(B256::repeat_byte(0x01)));
		assert!(by_hash.params().is_none());

		let by_params = Tx::from_params(TxParams::default());
		assert!(by_params.hash().is_none());
		assert!(by_params.params().is_some());
		assert!(by_params.receipt().is_none());
		assert!(by_params.decoded_input().is_none());
	}

	#[tokio::test]
	async fn cancel_without_params_is_a_no_op() {
		let client = offline_client();
		let mut tx = Tx::from_hash(B256::repeat_byte(0x01));
		assert!(!tx.cancel(&client, None, None).await.unwrap());
	}

	#[tokio::test]
	async fn replacements_need_a_signing_identity() {
		let network = Network::offline(presets::ethereum(None));
		let client = Client::new(network, KeySource::ReadOnly).unwrap();
		let params = TxParams {
			nonce: Some(7),
			..Default::default()
		};
		let mut tx = Tx::from_params(params.clone());
		assert!(!tx.cancel(&client, None, None).await.unwrap());
		let mut tx = Tx::from_params(params);
		assert!(!tx.speed_up(&client, None, None).await.unwrap());
	}

	#[tokio::test]
	async fn speed_up_without_nonce_is_a_no_op() {
		let client = offline_client();
		let mut tx = Tx::from_params(TxParams::default());
		assert!(!tx.speed_up(&client, None, None).await.unwrap());
	}

	#[tokio::test]
	async fn receipt_wait_needs_a_hash() {
		let client = offline_client();
		let mut tx = Tx::from_params(TxParams::default());
		assert!(matches!(
			tx.wait_for_receipt(&client, None, None).await.unwrap_err(),
			Error::Transaction(_)
		));
	}
}
