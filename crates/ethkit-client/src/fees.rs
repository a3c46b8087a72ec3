//! Gas price queries and fee scheme resolution.

use alloy::primitives::U256;
use alloy::providers::{DynProvider, Provider};

use ethkit_types::amount::Unit;
use ethkit_types::params::{TxFees, TxParams};
use ethkit_types::{Error, Result};

use crate::network::TxType;

/// Current network gas price.
pub async fn gas_price(provider: &DynProvider) -> Result<Unit> {
	let price = provider
		.get_gas_price()
		.await
		.map_err(|e| Error::Rpc(format!("eth_gasPrice failed: {e}")))?;
	Ok(Unit::wei(U256::from(price)))
}

/// Current max priority fee per gas.
pub async fn max_priority_fee(provider: &DynProvider) -> Result<Unit> {
	let fee = provider
		.get_max_priority_fee_per_gas()
		.await
		.map_err(|e| Error::Rpc(format!("eth_maxPriorityFeePerGas failed: {e}")))?;
	Ok(Unit::wei(U256::from(fee)))
}

/// Resolves the current fee scheme for a network's transaction type. For
/// EIP-1559 the max fee is the network price plus the priority fee.
pub async fn resolve(provider: &DynProvider, tx_type: TxType) -> Result<TxFees> {
	let price = provider
		.get_gas_price()
		.await
		.map_err(|e| Error::Rpc(format!("eth_gasPrice failed: {e}")))?;
	match tx_type {
		TxType::Legacy => Ok(TxFees::Legacy { gas_price: price }),
		TxType::Eip1559 => {
			let priority = provider
				.get_max_priority_fee_per_gas()
				.await
				.map_err(|e| Error::Rpc(format!("eth_maxPriorityFeePerGas failed: {e}")))?;
			Ok(TxFees::Eip1559 {
				max_fee_per_gas: price.saturating_add(priority),
				max_priority_fee_per_gas: priority,
			})
		}
	}
}

/// Estimates the gas limit for a parameter set.
pub async fn estimate_gas(provider: &DynProvider, params: &TxParams) -> Result<u64> {
	provider
		.estimate_gas(params.to_request())
		.await
		.map_err(|e| Error::Rpc(format!("eth_estimateGas failed: {e}")))
}
