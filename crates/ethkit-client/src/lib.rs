//! High-level async EVM client.
//!
//! A [`Client`] bundles a resolved [`Network`], an RPC provider and a
//! [`SigningIdentity`]. Service handles hang off it: [`Wallet`] for
//! balances and nonces, [`Transactions`] for building, signing and
//! submitting transactions, [`contracts::Contracts`] for ABI work and
//! typed token wrappers, and [`nfts::Nfts`] for NFT metadata.

pub mod client;
pub mod contracts;
pub mod fees;
pub mod network;
pub mod nfts;
pub mod signer;
pub mod transactions;
pub mod tx;
pub mod wallet;

pub use client::Client;
pub use network::{presets, Network, NetworkConfig, TxType};
pub use signer::{KeySource, SigningIdentity};
pub use transactions::{SendOptions, Transactions, TransferAmount};
pub use tx::Tx;
pub use wallet::Wallet;

pub use ethkit_explorer as explorer;
pub use ethkit_types as types;
