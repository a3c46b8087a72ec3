//! Async client for Etherscan-family block explorer APIs.
//!
//! Every endpoint lives under a module handle (`account`, `contract`,
//! `transaction`, `block`, `logs`, `token`, `gastracker`, `stats`)
//! mirroring the `module=` parameter of the REST interface. Responses are
//! unwrapped from the `{status, message, result}` envelope; a non-success
//! status becomes [`Error::Api`] carrying the status code and body, except
//! for the "No transactions found" reply which is an empty result set.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use ethkit_types::{Error, Result};

pub mod account;
pub mod block;
pub mod contract;
pub mod gastracker;
pub mod logs;
pub mod stats;
pub mod token;
pub mod transaction;

mod options;

pub use account::{Account, InternalScope};
pub use block::Block;
pub use contract::Contract;
pub use gastracker::Gastracker;
pub use logs::{LogQuery, Logs};
pub use options::{BlockType, Closest, ClientType, PageQuery, Sort, SyncMode, Tag};
pub use stats::{DailyStat, Stats};
pub use token::Token;
pub use transaction::Transaction;

/// API key and entry-point URL of one explorer deployment.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
	pub key: String,
	pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
	#[serde(default)]
	status: String,
	#[serde(default)]
	message: String,
	result: Value,
}

/// Entry point for one explorer deployment.
#[derive(Debug, Clone)]
pub struct ExplorerApi {
	http: reqwest::Client,
	key: String,
	url: String,
}

impl ExplorerApi {
	pub fn new(config: ExplorerConfig) -> ExplorerApi {
		ExplorerApi {
			http: reqwest::Client::new(),
			key: config.key,
			url: config.url,
		}
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn account(&self) -> Account<'_> {
		Account { api: self }
	}

	pub fn contract(&self) -> Contract<'_> {
		Contract { api: self }
	}

	pub fn transaction(&self) -> Transaction<'_> {
		Transaction { api: self }
	}

	pub fn block(&self) -> Block<'_> {
		Block { api: self }
	}

	pub fn logs(&self) -> Logs<'_> {
		Logs { api: self }
	}

	pub fn token(&self) -> Token<'_> {
		Token { api: self }
	}

	pub fn gastracker(&self) -> Gastracker<'_> {
		Gastracker { api: self }
	}

	pub fn stats(&self) -> Stats<'_> {
		Stats { api: self }
	}

	/// Performs one GET request against the API and unwraps the response
	/// envelope into its `result` payload.
	pub(crate) async fn get(
		&self,
		module: &'static str,
		action: &'static str,
		params: Params,
	) -> Result<Value> {
		debug!(module, action, "explorer request");

		let mut query = vec![
			("module", module.to_string()),
			("action", action.to_string()),
			("apikey", self.key.clone()),
		];
		query.extend(params.0);

		let response = self
			.http
			.get(&self.url)
			.query(&query)
			.send()
			.await
			.map_err(|e| Error::Http(e.to_string()))?;
		let status_code = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| Error::Http(e.to_string()))?;
		if !status_code.is_success() {
			return Err(Error::Api {
				status_code: status_code.as_u16(),
				body,
			});
		}

		let envelope: ApiResponse = serde_json::from_str(&body).map_err(|e| Error::Api {
			status_code: status_code.as_u16(),
			body: format!("malformed response: {e}"),
		})?;
		if envelope.status != "1" {
			// An empty result set, not a failure.
			if envelope.message.starts_with("No transactions found") {
				return Ok(Value::Array(Vec::new()));
			}
			return Err(Error::Api {
				status_code: status_code.as_u16(),
				body,
			});
		}
		Ok(envelope.result)
	}
}

/// Accumulates optional query parameters, skipping the absent ones.
#[derive(Debug, Default)]
pub(crate) struct Params(Vec<(&'static str, String)>);

impl Params {
	pub(crate) fn new() -> Params {
		Params::default()
	}

	pub(crate) fn push(mut self, key: &'static str, value: impl ToString) -> Params {
		self.0.push((key, value.to_string()));
		self
	}

	pub(crate) fn push_opt(self, key: &'static str, value: Option<impl ToString>) -> Params {
		match value {
			Some(value) => self.push(key, value),
			None => self,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn params_skip_absent_values() {
		let params = Params::new()
			.push("address", "0x0")
			.push_opt("page", Some(2u64))
			.push_opt("offset", None::<u64>);
		assert_eq!(
			params.0,
			vec![
				("address", "0x0".to_string()),
				("page", "2".to_string()),
			]
		);
	}

	#[test]
	fn envelope_parses_without_status() {
		let envelope: ApiResponse =
			serde_json::from_str(r#"{"jsonrpc":"2.0","result":"0x1"}"#).unwrap();
		assert_eq!(envelope.status, "");
		assert_eq!(envelope.result, Value::String("0x1".into()));
	}
}
