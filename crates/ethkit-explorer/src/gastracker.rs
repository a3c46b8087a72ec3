//! `module=gastracker` endpoints: confirmation estimates and the gas oracle.

use serde_json::Value;

use ethkit_types::Result;

use crate::{ExplorerApi, Params};

pub struct Gastracker<'a> {
	pub(crate) api: &'a ExplorerApi,
}

impl Gastracker<'_> {
	/// Estimated seconds to confirmation at a gas price in wei.
	pub async fn gas_estimate(&self, gas_price: u128) -> Result<Value> {
		let params = Params::new().push("gasprice", gas_price);
		self.api.get("gastracker", "gasestimate", params).await
	}

	/// Current safe, proposed and fast gas prices.
	pub async fn gas_oracle(&self) -> Result<Value> {
		self.api.get("gastracker", "gasoracle", Params::new()).await
	}
}
