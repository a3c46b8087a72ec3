//! Partial transaction parameter sets.
//!
//! Parameters accumulate across the build pipeline (caller overrides, then
//! network lookups) and are validated for completeness just before signing.

use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};

use crate::errors::{Error, Result};

/// Fee scheme for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFees {
	Legacy {
		gas_price: u128,
	},
	Eip1559 {
		max_fee_per_gas: u128,
		max_priority_fee_per_gas: u128,
	},
}

impl TxFees {
	/// The price bid per unit of gas (max fee for EIP-1559).
	pub fn fee_per_gas(&self) -> u128 {
		match *self {
			TxFees::Legacy { gas_price } => gas_price,
			TxFees::Eip1559 {
				max_fee_per_gas, ..
			} => max_fee_per_gas,
		}
	}

	/// Scales the fee by `numerator / denominator`, rounding up.
	pub fn bumped(&self, numerator: u128, denominator: u128) -> TxFees {
		let scale = |v: u128| v.saturating_mul(numerator).div_ceil(denominator);
		match *self {
			TxFees::Legacy { gas_price } => TxFees::Legacy {
				gas_price: scale(gas_price),
			},
			TxFees::Eip1559 {
				max_fee_per_gas,
				max_priority_fee_per_gas,
			} => TxFees::Eip1559 {
				max_fee_per_gas: scale(max_fee_per_gas),
				max_priority_fee_per_gas: scale(max_priority_fee_per_gas),
			},
		}
	}

	/// Raises the bid to at least `floor` wei per gas. The priority fee is
	/// capped at the max fee so the pair stays valid.
	pub fn raised_to(&self, floor: u128) -> TxFees {
		match *self {
			TxFees::Legacy { gas_price } => TxFees::Legacy {
				gas_price: gas_price.max(floor),
			},
			TxFees::Eip1559 {
				max_fee_per_gas,
				max_priority_fee_per_gas,
			} => {
				let max_fee_per_gas = max_fee_per_gas.max(floor);
				TxFees::Eip1559 {
					max_fee_per_gas,
					max_priority_fee_per_gas: max_priority_fee_per_gas.min(max_fee_per_gas),
				}
			}
		}
	}
}

/// Parameters of a transaction under construction.
///
/// Every field is optional; [`TxParams::ensure_sendable`] checks the set is
/// complete enough to sign and submit.
#[derive(Debug, Clone, Default)]
pub struct TxParams {
	pub chain_id: Option<u64>,
	pub nonce: Option<u64>,
	/// Sender address (None until a signing identity fills it in).
	pub from: Option<Address>,
	/// Recipient address (None for contract creation).
	pub to: Option<Address>,
	/// Value transferred in native currency.
	pub value: Option<U256>,
	/// Calldata.
	pub data: Option<Bytes>,
	pub gas_limit: Option<u64>,
	pub fees: Option<TxFees>,
}

impl TxParams {
	/// The fee currently bid per unit of gas, zero when no fees are set.
	pub fn fee_per_gas(&self) -> u128 {
		self.fees.map(|fees| fees.fee_per_gas()).unwrap_or(0)
	}

	/// Checks that the fee, gas limit and nonce are all present and
	/// non-zero where a zero makes the transaction unsubmittable.
	pub fn ensure_sendable(&self) -> Result<()> {
		if self.fee_per_gas() == 0 {
			return Err(Error::Transaction("gas price is missing".into()));
		}
		if self.gas_limit.unwrap_or(0) == 0 {
			return Err(Error::Transaction("gas limit is missing".into()));
		}
		if self.nonce.is_none() {
			return Err(Error::Transaction("nonce is missing".into()));
		}
		Ok(())
	}

	pub fn to_request(&self) -> TransactionRequest {
		let mut request = TransactionRequest {
			chain_id: self.chain_id,
			nonce: self.nonce,
			from: self.from,
			to: self.to.map(TxKind::Call),
			value: self.value,
			gas: self.gas_limit,
			input: TransactionInput {
				input: self.data.clone(),
				data: None,
			},
			..Default::default()
		};
		match self.fees {
			Some(TxFees::Legacy { gas_price }) => {
				request.gas_price = Some(gas_price);
			}
			Some(TxFees::Eip1559 {
				max_fee_per_gas,
				max_priority_fee_per_gas,
			}) => {
				request.max_fee_per_gas = Some(max_fee_per_gas);
				request.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
			}
			None => {}
		}
		request
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ensure_sendable_requires_fee_gas_and_nonce() {
		let mut params = TxParams {
			fees: Some(TxFees::Legacy { gas_price: 10 }),
			gas_limit: Some(21_000),
			nonce: Some(0),
			..Default::default()
		};
		assert!(params.ensure_sendable().is_ok());

		params.fees = Some(TxFees::Legacy { gas_price: 0 });
		assert!(params.ensure_sendable().is_err());

		params.fees = Some(TxFees::Legacy { gas_price: 10 });
		params.gas_limit = None;
		assert!(params.ensure_sendable().is_err());

		params.gas_limit = Some(21_000);
		params.nonce = None;
		assert!(params.ensure_sendable().is_err());
	}

	#[test]
	fn to_request_maps_fee_scheme() {
		let legacy = TxParams {
			fees: Some(TxFees::Legacy { gas_price: 7 }),
			..Default::default()
		};
		let request = legacy.to_request();
		assert_eq!(request.gas_price, Some(7));
		assert_eq!(request.max_fee_per_gas, None);

		let dynamic = TxParams {
			fees: Some(TxFees::Eip1559 {
				max_fee_per_gas: 30,
				max_priority_fee_per_gas: 2,
			}),
			..Default::default()
		};
		let request = dynamic.to_request();
		assert_eq!(request.gas_price, None);
		assert_eq!(request.max_fee_per_gas, Some(30));
		assert_eq!(request.max_priority_fee_per_gas, Some(2));
	}

	#[test]
	fn bumped_rounds_up() {
		let fees = TxFees::Legacy { gas_price: 100 };
		assert_eq!(fees.bumped(111, 100), TxFees::Legacy { gas_price: 111 });
		let fees = TxFees::Legacy { gas_price: 1 };
		assert_eq!(fees.bumped(3, 2), TxFees::Legacy { gas_price: 2 });
	}

	#[test]
	fn raised_to_keeps_priority_below_max() {
		let fees = TxFees::Eip1559 {
			max_fee_per_gas: 10,
			max_priority_fee_per_gas: 8,
		};
		match fees.raised_to(20) {
			TxFees::Eip1559 {
				max_fee_per_gas,
				max_priority_fee_per_gas,
			} => {
				assert_eq!(max_fee_per_gas, 20);
				assert_eq!(max_priority_fee_per_gas, 8);
			}
			other => panic!("unexpected scheme: {other:?}"),
		}
	}
}
