//! Shared types for the ethkit SDK.
//!
//! This crate defines the error taxonomy, the typed amount model (native
//! coin denominations and ERC-20 token amounts), partial transaction
//! parameter sets, explorer history records and ABI helpers used by the
//! higher-level crates.

pub mod abi;
pub mod amount;
pub mod errors;
pub mod history;
pub mod params;

pub use errors::{Error, Result};
