//! Validated request options shared across API modules.

use std::fmt;
use std::str::FromStr;

use ethkit_types::Error;

macro_rules! request_option {
	($(#[$meta:meta])* $name:ident, $param:literal, { $($variant:ident => $value:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
		pub enum $name {
			#[default]
			$($variant),+
		}

		impl $name {
			pub fn as_str(self) -> &'static str {
				match self {
					$($name::$variant => $value),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s {
					$($value => Ok($name::$variant),)+
					other => Err(Error::Validation(format!(
						concat!("\"", $param, "\" must be one of ", $(concat!("\"", $value, "\" ")),+, ", got \"{}\""),
						other
					))),
				}
			}
		}
	};
}

request_option!(
	/// Pre-defined block parameter for balance queries.
	Tag, "tag", {
		Latest => "latest",
		Earliest => "earliest",
		Pending => "pending",
	}
);

request_option!(
	/// Sorting preference for list endpoints.
	Sort, "sort", {
		Asc => "asc",
		Desc => "desc",
	}
);

request_option!(
	/// Canonical or uncle blocks for mined-block queries.
	BlockType, "blocktype", {
		Blocks => "blocks",
		Uncles => "uncles",
	}
);

request_option!(
	/// Which neighboring block to pick for a timestamp lookup.
	Closest, "closest", {
		Before => "before",
		After => "after",
	}
);

request_option!(
	/// Node client flavor for chain-size statistics.
	ClientType, "clienttype", {
		Geth => "geth",
		Parity => "parity",
	}
);

request_option!(
	/// Node sync mode for chain-size statistics.
	SyncMode, "syncmode", {
		Default => "default",
		Archive => "archive",
	}
);

/// Block-range and pagination window for list endpoints.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
	pub start_block: Option<u64>,
	pub end_block: Option<u64>,
	pub page: Option<u64>,
	pub offset: Option<u64>,
	pub sort: Sort,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn options_round_trip() {
		assert_eq!(Tag::default(), Tag::Latest);
		assert_eq!("pending".parse::<Tag>().unwrap(), Tag::Pending);
		assert_eq!("desc".parse::<Sort>().unwrap(), Sort::Desc);
		assert_eq!("uncles".parse::<BlockType>().unwrap(), BlockType::Uncles);
		assert_eq!("after".parse::<Closest>().unwrap(), Closest::After);
	}

	#[test]
	fn unknown_option_is_a_validation_error() {
		let err = "sideways".parse::<Sort>().unwrap_err();
		assert!(matches!(err, Error::Validation(_)));
		assert!(err.to_string().contains("sideways"));
	}
}
