//! ERC-721 metadata lookup.

use alloy::primitives::{Address, U256};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;
use tracing::debug;

use ethkit_types::Result;

use crate::client::Client;

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// One attribute from a token's metadata document.
#[derive(Debug, Clone, PartialEq)]
pub struct NftAttribute {
	pub name: String,
	pub value: Value,
}

/// On-chain collection data plus off-chain token metadata.
#[derive(Debug, Clone)]
pub struct NftInfo {
	pub contract_address: Address,
	pub name: String,
	pub symbol: String,
	pub total_supply: U256,
	pub token_id: Option<U256>,
	pub owner: Option<Address>,
	pub image_url: Option<String>,
	pub attributes: Vec<NftAttribute>,
}

pub struct Nfts<'a> {
	pub(crate) client: &'a Client,
}

impl Nfts<'_> {
	/// Collection data for a contract, plus owner and metadata when a
	/// token id is given. Metadata retrieval is best-effort: a token URI
	/// that cannot be fetched or parsed leaves those fields empty.
	pub async fn get_info(
		&self,
		contract_address: Address,
		token_id: Option<U256>,
	) -> Result<NftInfo> {
		let contract = self.client.contracts().nft(contract_address);
		let mut info = NftInfo {
			contract_address,
			name: contract.name().await?,
			symbol: contract.symbol().await?,
			total_supply: contract.total_supply().await?,
			token_id,
			owner: None,
			image_url: None,
			attributes: Vec::new(),
		};
		if let Some(token_id) = token_id {
			info.owner = contract.owner_of(token_id).await.ok();
			if let Ok(uri) = contract.token_uri(token_id).await {
				if let Some(metadata) = fetch_metadata(&uri).await {
					apply_metadata(&mut info, &metadata);
				}
			}
		}
		Ok(info)
	}
}

/// Resolves a token URI into its metadata document. Supports inline data
/// URIs (plain or base64), IPFS and HTTP(S).
async fn fetch_metadata(uri: &str) -> Option<Value> {
	if let Some(rest) = uri.strip_prefix("data:application/json") {
		let (encoding, payload) = rest.split_once(',')?;
		let text = if encoding.contains("base64") {
			String::from_utf8(BASE64.decode(payload).ok()?).ok()?
		} else {
			payload.to_string()
		};
		return serde_json::from_str(&text).ok();
	}
	let url = ipfs_to_http(uri);
	if !url.starts_with("http://") && !url.starts_with("https://") {
		debug!(%uri, "unsupported token uri scheme");
		return None;
	}
	let response = reqwest::get(&url).await.ok()?;
	response.json().await.ok()
}

/// Rewrites `ipfs://` URIs to a public gateway URL.
fn ipfs_to_http(uri: &str) -> String {
	match uri.strip_prefix("ipfs://") {
		Some(path) => format!("{IPFS_GATEWAY}{}", path.trim_start_matches("ipfs/")),
		None => uri.to_string(),
	}
}

fn apply_metadata(info: &mut NftInfo, metadata: &Value) {
	let image = metadata
		.get("image")
		.or_else(|| metadata.get("image_url"))
		.and_then(Value::as_str);
	if let Some(image) = image {
		info.image_url = Some(ipfs_to_http(image));
	}
	let Some(attributes) = metadata.get("attributes").and_then(Value::as_array) else {
		return;
	};
	for attribute in attributes {
		let Some(object) = attribute.as_object() else {
			continue;
		};
		let Some(value) = object.get("value") else {
			continue;
		};
		let name = object
			.get("trait_type")
			.and_then(Value::as_str)
			.map(str::to_string)
			.or_else(|| object.keys().find(|key| *key != "value").cloned());
		if let Some(name) = name {
			info.attributes.push(NftAttribute {
				name,
				value: value.clone(),
			});
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn empty_info() -> NftInfo {
		NftInfo {
			contract_address: Address::ZERO,
			name: "Test".into(),
			symbol: "TST".into(),
			total_supply: U256::from(100u64),
			token_id: Some(U256::from(1u64)),
			owner: None,
			image_url: None,
			attributes: Vec::new(),
		}
	}

	#[test]
	fn metadata_fills_image_and_attributes() {
		let mut info = empty_info();
		apply_metadata(
			&mut info,
			&json!({
				"image": "ipfs://QmHash/1.png",
				"attributes": [
					{"trait_type": "Background", "value": "Blue"},
					{"Rarity": "ignored-key", "value": 3},
					{"no_value_here": true}
				]
			}),
		);
		assert_eq!(
			info.image_url.as_deref(),
			Some("https://ipfs.io/ipfs/QmHash/1.png")
		);
		assert_eq!(
			info.attributes,
			vec![
				NftAttribute {
					name: "Background".into(),
					value: json!("Blue"),
				},
				NftAttribute {
					name: "Rarity".into(),
					value: json!(3),
				},
			]
		);
	}

	#[tokio::test]
	async fn inline_data_uris_parse_without_io() {
		let plain = fetch_metadata(r#"data:application/json,{"image":"x.png"}"#)
			.await
			.unwrap();
		assert_eq!(plain["image"], "x.png");

		let encoded = BASE64.encode(r#"{"name":"inline"}"#);
		let decoded = fetch_metadata(&format!("data:application/json;base64,{encoded}"))
			.await
			.unwrap();
		assert_eq!(decoded["name"], "inline");
	}

	#[tokio::test]
	async fn unsupported_schemes_are_skipped() {
		assert!(fetch_metadata("ar://some-arweave-hash").await.is_none());
	}

	#[test]
	fn ipfs_paths_map_to_the_gateway() {
		assert_eq!(
			ipfs_to_http("ipfs://ipfs/QmHash"),
			"https://ipfs.io/ipfs/QmHash"
		);
		assert_eq!(ipfs_to_http("https://example.com/1.json"), "https://example.com/1.json");
	}
}
