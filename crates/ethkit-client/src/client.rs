//! Client context bundling a network, a provider and a signing identity.

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tracing::debug;

use ethkit_types::{Error, Result};

use crate::contracts::Contracts;
use crate::network::Network;
use crate::nfts::Nfts;
use crate::signer::{KeySource, SigningIdentity};
use crate::transactions::Transactions;
use crate::wallet::Wallet;

/// One connection to one network with one signing identity.
#[derive(Debug)]
pub struct Client {
	pub network: Network,
	provider: DynProvider,
	identity: SigningIdentity,
}

impl Client {
	/// Connects to the network's RPC URL with the given key source. No
	/// network traffic happens until the first call.
	pub fn new(network: Network, key: KeySource) -> Result<Client> {
		let identity = SigningIdentity::from_source(key)?;
		let url = network
			.rpc_url
			.parse()
			.map_err(|e| Error::Validation(format!("invalid rpc url {}: {e}", network.rpc_url)))?;
		let provider = ProviderBuilder::new().connect_http(url).erased();
		debug!(
			network = %network.name,
			read_only = identity.is_read_only(),
			"client created"
		);
		Ok(Client {
			network,
			provider,
			identity,
		})
	}

	pub fn provider(&self) -> &DynProvider {
		&self.provider
	}

	pub fn identity(&self) -> &SigningIdentity {
		&self.identity
	}

	/// Address of the signing identity.
	///
	/// # Errors
	///
	/// [`Error::Config`] for read-only clients.
	pub fn address(&self) -> Result<Address> {
		self.identity.address()
	}

	pub fn wallet(&self) -> Wallet<'_> {
		Wallet { client: self }
	}

	pub fn transactions(&self) -> Transactions<'_> {
		Transactions { client: self }
	}

	pub fn contracts(&self) -> Contracts<'_> {
		Contracts { client: self }
	}

	pub fn nfts(&self) -> Nfts<'_> {
		Nfts { client: self }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::presets;

	#[test]
	fn read_only_client_has_no_address() {
		let network = Network::offline(presets::ethereum(None));
		let client = Client::new(network, KeySource::ReadOnly).unwrap();
		assert!(client.address().is_err());
	}

	#[test]
	fn bad_rpc_url_is_a_validation_error() {
		let mut config = presets::ethereum(None);
		config.rpc_url = "not a url".into();
		let network = Network::offline(config);
		let err = Client::new(network, KeySource::Generate).unwrap_err();
		assert!(matches!(err, Error::Validation(_)));
	}
}
