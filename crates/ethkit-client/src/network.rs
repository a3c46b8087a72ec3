//! Network descriptors, resolution and built-in presets.

use alloy::providers::{Provider, ProviderBuilder};
use serde_json::Value;
use tracing::warn;

use ethkit_explorer::{ExplorerApi, ExplorerConfig};
use ethkit_types::{Error, Result};

/// Fee scheme a network expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxType {
	Legacy,
	#[default]
	Eip1559,
}

/// Plain description of a network, resolved into a [`Network`].
#[derive(Debug, Clone)]
pub struct NetworkConfig {
	pub name: String,
	pub rpc_url: String,
	/// Probed from the node when absent.
	pub chain_id: Option<u64>,
	pub tx_type: TxType,
	/// Looked up in the public chain registry when absent.
	pub coin_symbol: Option<String>,
	pub explorer: Option<ExplorerConfig>,
}

/// A resolved network: identity, fee scheme and optional explorer access.
#[derive(Debug, Clone)]
pub struct Network {
	pub name: String,
	pub rpc_url: String,
	pub chain_id: Option<u64>,
	pub tx_type: TxType,
	pub coin_symbol: Option<String>,
	explorer: Option<ExplorerApi>,
}

impl Network {
	/// Resolves a config into a network. A missing chain id is probed from
	/// the node and a missing coin symbol is looked up in the public chain
	/// registry; both lookups are best-effort and leave the field empty on
	/// failure.
	pub async fn new(config: NetworkConfig) -> Network {
		let mut network = Network::offline(config);
		if network.chain_id.is_none() {
			network.chain_id = probe_chain_id(&network.rpc_url).await;
		}
		if network.coin_symbol.is_none() {
			if let Some(chain_id) = network.chain_id {
				network.coin_symbol = fetch_coin_symbol(chain_id).await;
			}
		}
		network
	}

	/// Builds a network from a config without touching the node or the
	/// chain registry.
	pub fn offline(config: NetworkConfig) -> Network {
		Network {
			name: config.name,
			rpc_url: config.rpc_url,
			chain_id: config.chain_id,
			tx_type: config.tx_type,
			coin_symbol: config.coin_symbol.map(|symbol| symbol.to_uppercase()),
			explorer: config.explorer.map(ExplorerApi::new),
		}
	}

	/// The explorer API bound to this network.
	///
	/// # Errors
	///
	/// [`Error::Config`] when no explorer key was configured.
	pub fn explorer(&self) -> Result<&ExplorerApi> {
		self.explorer.as_ref().ok_or_else(|| {
			Error::Config("an explorer API key is required for this call".into())
		})
	}

	pub fn has_explorer(&self) -> bool {
		self.explorer.is_some()
	}

	/// Attaches (or replaces) the explorer API binding.
	pub fn set_explorer(&mut self, config: ExplorerConfig) {
		self.explorer = Some(ExplorerApi::new(config));
	}

	/// Two networks are the same when both chain ids are known and equal.
	pub fn is_same(&self, other: &Network) -> bool {
		self.chain_id.is_some() && self.chain_id == other.chain_id
	}
}

async fn probe_chain_id(rpc_url: &str) -> Option<u64> {
	let url = match rpc_url.parse() {
		Ok(url) => url,
		Err(e) => {
			warn!(rpc_url, "invalid rpc url: {e}");
			return None;
		}
	};
	let provider = ProviderBuilder::new().connect_http(url);
	match provider.get_chain_id().await {
		Ok(chain_id) => Some(chain_id),
		Err(e) => {
			warn!(rpc_url, "chain id probe failed: {e}");
			None
		}
	}
}

const CHAIN_REGISTRY_URL: &str = "https://chainid.network/chains.json";

/// Native coin symbol from the public chain registry, uppercased.
async fn fetch_coin_symbol(chain_id: u64) -> Option<String> {
	let response = reqwest::get(CHAIN_REGISTRY_URL).await.ok()?;
	let chains: Value = response.json().await.ok()?;
	chains
		.as_array()?
		.iter()
		.find(|chain| chain.get("chainId").and_then(Value::as_u64) == Some(chain_id))?
		.pointer("/nativeCurrency/symbol")?
		.as_str()
		.map(str::to_uppercase)
}

/// Ready-made configs for the most common networks. Pass an explorer API
/// key to enable explorer-backed calls.
pub mod presets {
	use ethkit_explorer::ExplorerConfig;

	use super::{NetworkConfig, TxType};

	fn preset(
		name: &str,
		rpc_url: &str,
		chain_id: u64,
		tx_type: TxType,
		coin_symbol: &str,
		explorer_url: &str,
		api_key: Option<&str>,
	) -> NetworkConfig {
		NetworkConfig {
			name: name.to_string(),
			rpc_url: rpc_url.to_string(),
			chain_id: Some(chain_id),
			tx_type,
			coin_symbol: Some(coin_symbol.to_string()),
			explorer: api_key.map(|key| ExplorerConfig {
				key: key.to_string(),
				url: explorer_url.to_string(),
			}),
		}
	}

	pub fn ethereum(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"ethereum",
			"https://rpc.ankr.com/eth/",
			1,
			TxType::Eip1559,
			"ETH",
			"https://api.etherscan.io/api",
			api_key,
		)
	}

	pub fn arbitrum(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"arbitrum",
			"https://rpc.ankr.com/arbitrum/",
			42161,
			TxType::Eip1559,
			"ETH",
			"https://api.arbiscan.io/api",
			api_key,
		)
	}

	pub fn arbitrum_nova(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"arbitrum_nova",
			"https://nova.arbitrum.io/rpc/",
			42170,
			TxType::Eip1559,
			"ETH",
			"https://api-nova.arbiscan.io/api",
			api_key,
		)
	}

	pub fn optimism(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"optimism",
			"https://rpc.ankr.com/optimism/",
			10,
			TxType::Eip1559,
			"ETH",
			"https://api-optimistic.etherscan.io/api",
			api_key,
		)
	}

	pub fn bsc(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"bsc",
			"https://rpc.ankr.com/bsc/",
			56,
			TxType::Legacy,
			"BNB",
			"https://api.bscscan.com/api",
			api_key,
		)
	}

	pub fn polygon(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"polygon",
			"https://rpc.ankr.com/polygon/",
			137,
			TxType::Eip1559,
			"MATIC",
			"https://api.polygonscan.com/api",
			api_key,
		)
	}

	pub fn avalanche(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"avalanche",
			"https://rpc.ankr.com/avalanche/",
			43114,
			TxType::Eip1559,
			"AVAX",
			"https://api.snowtrace.io/api",
			api_key,
		)
	}

	pub fn moonbeam(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"moonbeam",
			"https://rpc.api.moonbeam.network/",
			1284,
			TxType::Eip1559,
			"GLMR",
			"https://api-moonbeam.moonscan.io/api",
			api_key,
		)
	}

	pub fn fantom(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"fantom",
			"https://rpc.ankr.com/fantom/",
			250,
			TxType::Eip1559,
			"FTM",
			"https://api.ftmscan.com/api",
			api_key,
		)
	}

	pub fn celo(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"celo",
			"https://rpc.ankr.com/celo/",
			42220,
			TxType::Legacy,
			"CELO",
			"https://api.celoscan.io/api",
			api_key,
		)
	}

	pub fn gnosis(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"gnosis",
			"https://rpc.ankr.com/gnosis/",
			100,
			TxType::Eip1559,
			"xDAI",
			"https://api.gnosisscan.io/api",
			api_key,
		)
	}

	pub fn goerli(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"goerli",
			"https://rpc.ankr.com/eth_goerli/",
			5,
			TxType::Eip1559,
			"ETH",
			"https://api-goerli.etherscan.io/api",
			api_key,
		)
	}

	pub fn sepolia(api_key: Option<&str>) -> NetworkConfig {
		preset(
			"sepolia",
			"https://rpc.ankr.com/eth_sepolia/",
			11155111,
			TxType::Eip1559,
			"ETH",
			"https://api-sepolia.etherscan.io/api",
			api_key,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn offline_resolution_uppercases_symbol() {
		let network = Network::offline(presets::gnosis(None));
		assert_eq!(network.coin_symbol.as_deref(), Some("XDAI"));
		assert_eq!(network.chain_id, Some(100));
		assert!(!network.has_explorer());
		assert!(network.explorer().is_err());
	}

	#[test]
	fn explorer_binding_follows_api_key() {
		let network = Network::offline(presets::ethereum(Some("KEY")));
		assert!(network.has_explorer());
		assert_eq!(network.explorer().unwrap().url(), "https://api.etherscan.io/api");
	}

	#[test]
	fn sameness_requires_known_chain_ids() {
		let a = Network::offline(presets::ethereum(None));
		let b = Network::offline(presets::ethereum(None));
		let c = Network::offline(presets::polygon(None));
		assert!(a.is_same(&b));
		assert!(!a.is_same(&c));

		let mut unknown = presets::ethereum(None);
		unknown.chain_id = None;
		let unknown = Network::offline(unknown);
		assert!(!unknown.is_same(&a));
	}
}
