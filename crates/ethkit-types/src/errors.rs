//! Error types for the SDK.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Decimals mismatch: {left} vs {right}")]
	DecimalsMismatch { left: u8, right: u8 },

	#[error("Arithmetic error: {0}")]
	Arithmetic(String),

	#[error("Conversion error: {0}")]
	Conversion(String),

	#[error("Insufficient balance")]
	InsufficientBalance,

	#[error("Gas price {current} wei exceeds the ceiling of {ceiling} wei")]
	GasPriceTooHigh { current: u128, ceiling: u128 },

	#[error("HTTP error: {0}")]
	Http(String),

	#[error("API error (status {status_code}): {body}")]
	Api { status_code: u16, body: String },

	#[error("RPC error: {0}")]
	Rpc(String),

	#[error("Timed out after {elapsed:?}")]
	Timeout { elapsed: Duration },

	#[error("Transaction error: {0}")]
	Transaction(String),

	#[error("Contract error: {0}")]
	Contract(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}
