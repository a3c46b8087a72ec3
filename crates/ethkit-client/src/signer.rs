//! Signing identity resolution.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use ethkit_types::{Error, Result};

/// Where the client's signing key comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
	/// An existing private key, hex-encoded with or without `0x`.
	Import(String),
	/// A freshly generated random key.
	Generate,
	/// No key at all; signing operations fail fast.
	ReadOnly,
}

/// A resolved signing identity.
#[derive(Debug, Clone)]
pub struct SigningIdentity {
	signer: Option<PrivateKeySigner>,
}

impl SigningIdentity {
	pub fn from_source(source: KeySource) -> Result<SigningIdentity> {
		let signer = match source {
			KeySource::Import(key) => Some(
				key.parse::<PrivateKeySigner>()
					.map_err(|e| Error::Validation(format!("invalid private key: {e}")))?,
			),
			KeySource::Generate => Some(PrivateKeySigner::random()),
			KeySource::ReadOnly => None,
		};
		Ok(SigningIdentity { signer })
	}

	pub fn is_read_only(&self) -> bool {
		self.signer.is_none()
	}

	/// The signer behind this identity.
	///
	/// # Errors
	///
	/// [`Error::Config`] for read-only identities.
	pub fn signer(&self) -> Result<&PrivateKeySigner> {
		self.signer
			.as_ref()
			.ok_or_else(|| Error::Config("this client is read-only; a private key is required".into()))
	}

	pub fn address(&self) -> Result<Address> {
		Ok(self.signer()?.address())
	}

	/// The private key as `0x`-prefixed hex, for export.
	pub fn private_key_hex(&self) -> Result<String> {
		Ok(format!("0x{}", hex::encode(self.signer()?.to_bytes())))
	}
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	// Well-known test vector.
	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	#[test]
	fn import_recovers_known_address() {
		let identity = SigningIdentity::from_source(KeySource::Import(KEY.into())).unwrap();
		assert_eq!(identity.address().unwrap(), Address::from_str(ADDRESS).unwrap());
		assert_eq!(identity.private_key_hex().unwrap(), KEY);
		assert!(!identity.is_read_only());
	}

	#[test]
	fn import_rejects_garbage() {
		let err = SigningIdentity::from_source(KeySource::Import("0xnope".into())).unwrap_err();
		assert!(matches!(err, Error::Validation(_)));
	}

	#[test]
	fn generated_keys_are_distinct() {
		let a = SigningIdentity::from_source(KeySource::Generate).unwrap();
		let b = SigningIdentity::from_source(KeySource::Generate).unwrap();
		assert_ne!(a.address().unwrap(), b.address().unwrap());
	}

	#[test]
	fn read_only_fails_fast() {
		let identity = SigningIdentity::from_source(KeySource::ReadOnly).unwrap();
		assert!(identity.is_read_only());
		assert!(matches!(identity.signer().unwrap_err(), Error::Config(_)));
		assert!(identity.address().is_err());
	}
}
