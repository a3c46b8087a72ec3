//! Balance and nonce queries.

use alloy::primitives::Address;
use alloy::providers::Provider;

use ethkit_types::amount::{TokenAmount, Unit};
use ethkit_types::{Error, Result};

use crate::client::Client;

pub struct Wallet<'a> {
	pub(crate) client: &'a Client,
}

impl Wallet<'_> {
	/// The address an override applies to, defaulting to the signing
	/// identity.
	fn resolve(&self, address: Option<Address>) -> Result<Address> {
		match address {
			Some(address) => Ok(address),
			None => self.client.address(),
		}
	}

	/// Native coin balance, in wei.
	pub async fn balance(&self, address: Option<Address>) -> Result<Unit> {
		let address = self.resolve(address)?;
		let wei = self
			.client
			.provider()
			.get_balance(address)
			.await
			.map_err(|e| Error::Rpc(format!("eth_getBalance failed: {e}")))?;
		Ok(Unit::wei(wei))
	}

	/// ERC-20 balance with the token's decimals attached.
	pub async fn token_balance(&self, token: Address, address: Option<Address>) -> Result<TokenAmount> {
		let address = self.resolve(address)?;
		let token = self.client.contracts().token(token);
		let decimals = token.decimals().await?;
		let base_units = token.balance_of(address).await?;
		Ok(TokenAmount::from_base_units(base_units, decimals))
	}

	/// Next account nonce.
	pub async fn nonce(&self, address: Option<Address>) -> Result<u64> {
		let address = self.resolve(address)?;
		self.client
			.provider()
			.get_transaction_count(address)
			.await
			.map_err(|e| Error::Rpc(format!("eth_getTransactionCount failed: {e}")))
	}
}
