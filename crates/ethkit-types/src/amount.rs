//! Typed amounts of the native coin and ERC-20 tokens.
//!
//! Amounts are stored as integer base units (`U256` wei or token base
//! units) and converted to decimal views only on demand, so arithmetic
//! never loses precision. Mixed-operand arithmetic goes through
//! [`Operand`], and every operation that can fail returns a `Result`
//! instead of silently coercing.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use bigdecimal::{
	num_bigint::{BigInt, Sign},
	BigDecimal, RoundingMode, Zero,
};

use crate::errors::{Error, Result};

/// Number of decimals the native coin carries.
pub const NATIVE_DECIMALS: u8 = 18;

/// Named denominations of the native coin, by decimal exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denomination {
	Wei,
	KWei,
	MWei,
	GWei,
	Szabo,
	Finney,
	Ether,
	KEther,
	MEther,
	GEther,
	TEther,
}

impl Denomination {
	/// Number of wei decimal places in one unit of this denomination.
	pub fn decimals(self) -> u8 {
		match self {
			Denomination::Wei => 0,
			Denomination::KWei => 3,
			Denomination::MWei => 6,
			Denomination::GWei => 9,
			Denomination::Szabo => 12,
			Denomination::Finney => 15,
			Denomination::Ether => 18,
			Denomination::KEther => 21,
			Denomination::MEther => 24,
			Denomination::GEther => 27,
			Denomination::TEther => 30,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Denomination::Wei => "wei",
			Denomination::KWei => "kwei",
			Denomination::MWei => "mwei",
			Denomination::GWei => "gwei",
			Denomination::Szabo => "szabo",
			Denomination::Finney => "finney",
			Denomination::Ether => "ether",
			Denomination::KEther => "kether",
			Denomination::MEther => "mether",
			Denomination::GEther => "gether",
			Denomination::TEther => "tether",
		}
	}
}

impl fmt::Display for Denomination {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Converts a decimal amount into integer base units, truncating any
/// fraction finer than `decimals` places.
pub fn to_base_units(value: &BigDecimal, decimals: u8) -> Result<U256> {
	if value.sign() == Sign::Minus {
		return Err(Error::Arithmetic(format!("negative amount: {value}")));
	}
	let scaled = value.with_scale_round(i64::from(decimals), RoundingMode::Down);
	let (digits, _) = scaled.into_bigint_and_exponent();
	U256::from_str_radix(&digits.to_str_radix(10), 10)
		.map_err(|_| Error::Arithmetic(format!("amount does not fit in 256 bits: {value}")))
}

/// Exact decimal view of integer base units.
pub fn to_decimal(base_units: U256, decimals: u8) -> BigDecimal {
	let digits = BigInt::from_bytes_be(Sign::Plus, &base_units.to_be_bytes::<32>());
	BigDecimal::new(digits, i64::from(decimals))
}

/// Parses an `f64` through its shortest decimal representation.
pub fn decimal_from_f64(value: f64) -> Result<BigDecimal> {
	if !value.is_finite() {
		return Err(Error::Conversion(format!("not a finite number: {value}")));
	}
	BigDecimal::from_str(&format!("{value}"))
		.map_err(|e| Error::Conversion(format!("bad decimal {value}: {e}")))
}

/// Right-hand operand accepted by the checked arithmetic on [`Unit`] and
/// [`TokenAmount`].
#[derive(Debug, Clone)]
pub enum Operand {
	/// An integer amount already expressed in base units.
	BaseUnits(U256),
	/// A raw decimal amount, scaled by the left operand before use.
	Decimal(BigDecimal),
	/// Another typed amount: base units plus the decimals they carry.
	Amount { base_units: U256, decimals: u8 },
}

impl Operand {
	/// Treats a float as a raw decimal operand.
	pub fn from_f64(value: f64) -> Result<Operand> {
		Ok(Operand::Decimal(decimal_from_f64(value)?))
	}
}

impl From<U256> for Operand {
	fn from(value: U256) -> Self {
		Operand::BaseUnits(value)
	}
}

impl From<u64> for Operand {
	fn from(value: u64) -> Self {
		Operand::BaseUnits(U256::from(value))
	}
}

impl From<u128> for Operand {
	fn from(value: u128) -> Self {
		Operand::BaseUnits(U256::from(value))
	}
}

impl From<BigDecimal> for Operand {
	fn from(value: BigDecimal) -> Self {
		Operand::Decimal(value)
	}
}

impl From<&Unit> for Operand {
	fn from(value: &Unit) -> Self {
		Operand::Amount {
			base_units: value.as_wei(),
			decimals: NATIVE_DECIMALS,
		}
	}
}

impl From<Unit> for Operand {
	fn from(value: Unit) -> Self {
		Operand::from(&value)
	}
}

impl From<&TokenAmount> for Operand {
	fn from(value: &TokenAmount) -> Self {
		Operand::Amount {
			base_units: value.base_units(),
			decimals: value.decimals(),
		}
	}
}

impl From<TokenAmount> for Operand {
	fn from(value: TokenAmount) -> Self {
		Operand::from(&value)
	}
}

/// An amount of the native coin, stored in wei.
///
/// The denomination controls which decimal view `Display` and raw decimal
/// operands use; the stored value is always wei, and all units carry
/// [`NATIVE_DECIMALS`] when combined with token amounts.
#[derive(Debug, Clone, Copy)]
pub struct Unit {
	wei: U256,
	denomination: Denomination,
}

impl Unit {
	/// Builds a unit directly from an integer wei amount.
	pub fn wei(amount: impl Into<U256>) -> Unit {
		Unit {
			wei: amount.into(),
			denomination: Denomination::Wei,
		}
	}

	/// Builds a unit from a decimal amount of the given denomination.
	pub fn from_decimal(amount: &BigDecimal, denomination: Denomination) -> Result<Unit> {
		Ok(Unit {
			wei: to_base_units(amount, denomination.decimals())?,
			denomination,
		})
	}

	pub fn from_f64(amount: f64, denomination: Denomination) -> Result<Unit> {
		Unit::from_decimal(&decimal_from_f64(amount)?, denomination)
	}

	pub fn kwei(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::KWei)
	}

	pub fn mwei(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::MWei)
	}

	pub fn gwei(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::GWei)
	}

	pub fn szabo(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::Szabo)
	}

	pub fn finney(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::Finney)
	}

	pub fn ether(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::Ether)
	}

	pub fn kether(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::KEther)
	}

	pub fn mether(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::MEther)
	}

	pub fn gether(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::GEther)
	}

	pub fn tether(amount: f64) -> Result<Unit> {
		Unit::from_f64(amount, Denomination::TEther)
	}

	pub fn denomination(&self) -> Denomination {
		self.denomination
	}

	pub fn as_wei(&self) -> U256 {
		self.wei
	}

	/// Exact decimal view in an arbitrary denomination.
	pub fn view(&self, denomination: Denomination) -> BigDecimal {
		to_decimal(self.wei, denomination.decimals())
	}

	pub fn as_gwei(&self) -> BigDecimal {
		self.view(Denomination::GWei)
	}

	pub fn as_ether(&self) -> BigDecimal {
		self.view(Denomination::Ether)
	}

	pub fn is_zero(&self) -> bool {
		self.wei.is_zero()
	}

	/// Resolves an operand into wei. Decimal operands are scaled by this
	/// unit's own denomination; typed amounts must carry native decimals.
	fn rhs_wei(&self, rhs: &Operand) -> Result<U256> {
		match rhs {
			Operand::BaseUnits(wei) => Ok(*wei),
			Operand::Amount {
				base_units,
				decimals,
			} => {
				if *decimals != NATIVE_DECIMALS {
					return Err(Error::DecimalsMismatch {
						left: NATIVE_DECIMALS,
						right: *decimals,
					});
				}
				Ok(*base_units)
			}
			Operand::Decimal(value) => to_base_units(value, self.denomination.decimals()),
		}
	}

	pub fn checked_add(&self, rhs: impl Into<Operand>) -> Result<Unit> {
		let rhs = self.rhs_wei(&rhs.into())?;
		let wei = self
			.wei
			.checked_add(rhs)
			.ok_or_else(|| Error::Arithmetic("addition overflows 256 bits".into()))?;
		Ok(Unit {
			wei,
			denomination: self.denomination,
		})
	}

	pub fn checked_sub(&self, rhs: impl Into<Operand>) -> Result<Unit> {
		let rhs = self.rhs_wei(&rhs.into())?;
		let wei = self
			.wei
			.checked_sub(rhs)
			.ok_or_else(|| Error::Arithmetic("subtraction underflows zero".into()))?;
		Ok(Unit {
			wei,
			denomination: self.denomination,
		})
	}

	/// Multiplies by an operand. Integer and typed-amount operands multiply
	/// at the wei level; decimal operands scale the denomination view.
	pub fn checked_mul(&self, rhs: impl Into<Operand>) -> Result<Unit> {
		match rhs.into() {
			Operand::Decimal(value) => {
				let product = self.view(self.denomination) * value;
				Unit::from_decimal(&product, self.denomination)
			}
			other => {
				let rhs = self.rhs_wei(&other)?;
				let wei = self
					.wei
					.checked_mul(rhs)
					.ok_or_else(|| Error::Arithmetic("multiplication overflows 256 bits".into()))?;
				Ok(Unit {
					wei,
					denomination: self.denomination,
				})
			}
		}
	}

	/// Divides by an operand, truncating the quotient to whole wei.
	pub fn checked_div(&self, rhs: impl Into<Operand>) -> Result<Unit> {
		match rhs.into() {
			Operand::Decimal(value) => {
				if value.is_zero() {
					return Err(Error::Arithmetic("division by zero".into()));
				}
				let quotient = self.view(self.denomination) / value;
				Unit::from_decimal(&quotient, self.denomination)
			}
			other => {
				let rhs = self.rhs_wei(&other)?;
				if rhs.is_zero() {
					return Err(Error::Arithmetic("division by zero".into()));
				}
				let quotient = to_decimal(self.wei, 0) / to_decimal(rhs, 0);
				Ok(Unit {
					wei: to_base_units(&quotient, 0)?,
					denomination: self.denomination,
				})
			}
		}
	}

	/// Compares against an operand. Decimal operands compare against this
	/// unit's own denomination view, exactly.
	pub fn compare(&self, rhs: impl Into<Operand>) -> Result<Ordering> {
		match rhs.into() {
			Operand::Decimal(value) => Ok(self.view(self.denomination).cmp(&value)),
			other => Ok(self.wei.cmp(&self.rhs_wei(&other)?)),
		}
	}
}

impl fmt::Display for Unit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.view(self.denomination), self.denomination)
	}
}

/// An ERC-20 token amount: integer base units plus the token's decimals.
#[derive(Debug, Clone, Copy)]
pub struct TokenAmount {
	base_units: U256,
	decimals: u8,
}

impl TokenAmount {
	pub fn from_base_units(amount: impl Into<U256>, decimals: u8) -> TokenAmount {
		TokenAmount {
			base_units: amount.into(),
			decimals,
		}
	}

	pub fn from_decimal(amount: &BigDecimal, decimals: u8) -> Result<TokenAmount> {
		Ok(TokenAmount {
			base_units: to_base_units(amount, decimals)?,
			decimals,
		})
	}

	pub fn from_f64(amount: f64, decimals: u8) -> Result<TokenAmount> {
		TokenAmount::from_decimal(&decimal_from_f64(amount)?, decimals)
	}

	pub fn base_units(&self) -> U256 {
		self.base_units
	}

	pub fn decimals(&self) -> u8 {
		self.decimals
	}

	/// Exact human-readable decimal value.
	pub fn value(&self) -> BigDecimal {
		to_decimal(self.base_units, self.decimals)
	}

	pub fn is_zero(&self) -> bool {
		self.base_units.is_zero()
	}

	/// Re-expresses the amount with a different number of decimals, keeping
	/// the human-readable value and truncating digits the new scale cannot
	/// hold. Returns the new base-unit amount.
	pub fn change_decimals(&mut self, new_decimals: u8) -> Result<U256> {
		let value = self.value();
		self.base_units = to_base_units(&value, new_decimals)?;
		self.decimals = new_decimals;
		Ok(self.base_units)
	}

	fn rhs_base_units(&self, rhs: &Operand) -> Result<U256> {
		match rhs {
			Operand::BaseUnits(base_units) => Ok(*base_units),
			Operand::Amount {
				base_units,
				decimals,
			} => {
				if *decimals != self.decimals {
					return Err(Error::DecimalsMismatch {
						left: self.decimals,
						right: *decimals,
					});
				}
				Ok(*base_units)
			}
			Operand::Decimal(value) => to_base_units(value, self.decimals),
		}
	}

	pub fn checked_add(&self, rhs: impl Into<Operand>) -> Result<TokenAmount> {
		let rhs = self.rhs_base_units(&rhs.into())?;
		let base_units = self
			.base_units
			.checked_add(rhs)
			.ok_or_else(|| Error::Arithmetic("addition overflows 256 bits".into()))?;
		Ok(TokenAmount {
			base_units,
			decimals: self.decimals,
		})
	}

	pub fn checked_sub(&self, rhs: impl Into<Operand>) -> Result<TokenAmount> {
		let rhs = self.rhs_base_units(&rhs.into())?;
		let base_units = self
			.base_units
			.checked_sub(rhs)
			.ok_or_else(|| Error::Arithmetic("subtraction underflows zero".into()))?;
		Ok(TokenAmount {
			base_units,
			decimals: self.decimals,
		})
	}

	/// Multiplies by an operand. Integer operands multiply at the base-unit
	/// level; typed amounts (same decimals) and decimal operands multiply
	/// the human-readable values.
	pub fn checked_mul(&self, rhs: impl Into<Operand>) -> Result<TokenAmount> {
		match rhs.into() {
			Operand::BaseUnits(rhs) => {
				let base_units = self
					.base_units
					.checked_mul(rhs)
					.ok_or_else(|| Error::Arithmetic("multiplication overflows 256 bits".into()))?;
				Ok(TokenAmount {
					base_units,
					decimals: self.decimals,
				})
			}
			Operand::Amount {
				base_units,
				decimals,
			} => {
				if decimals != self.decimals {
					return Err(Error::DecimalsMismatch {
						left: self.decimals,
						right: decimals,
					});
				}
				let product = self.value() * to_decimal(base_units, decimals);
				TokenAmount::from_decimal(&product, self.decimals)
			}
			Operand::Decimal(value) => {
				let product = self.value() * value;
				TokenAmount::from_decimal(&product, self.decimals)
			}
		}
	}

	/// Divides by an operand, truncating to this amount's decimals.
	pub fn checked_div(&self, rhs: impl Into<Operand>) -> Result<TokenAmount> {
		match rhs.into() {
			Operand::BaseUnits(rhs) => {
				if rhs.is_zero() {
					return Err(Error::Arithmetic("division by zero".into()));
				}
				let quotient = to_decimal(self.base_units, 0) / to_decimal(rhs, 0);
				Ok(TokenAmount {
					base_units: to_base_units(&quotient, 0)?,
					decimals: self.decimals,
				})
			}
			Operand::Amount {
				base_units,
				decimals,
			} => {
				if decimals != self.decimals {
					return Err(Error::DecimalsMismatch {
						left: self.decimals,
						right: decimals,
					});
				}
				let rhs = to_decimal(base_units, decimals);
				if rhs.is_zero() {
					return Err(Error::Arithmetic("division by zero".into()));
				}
				let quotient = self.value() / rhs;
				TokenAmount::from_decimal(&quotient, self.decimals)
			}
			Operand::Decimal(value) => {
				if value.is_zero() {
					return Err(Error::Arithmetic("division by zero".into()));
				}
				let quotient = self.value() / value;
				TokenAmount::from_decimal(&quotient, self.decimals)
			}
		}
	}

	/// Compares against an operand at the base-unit level. Decimal operands
	/// are scaled to this amount's decimals first, truncating.
	pub fn compare(&self, rhs: impl Into<Operand>) -> Result<Ordering> {
		let rhs = self.rhs_base_units(&rhs.into())?;
		Ok(self.base_units.cmp(&rhs))
	}
}

impl fmt::Display for TokenAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.value())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dec(s: &str) -> BigDecimal {
		BigDecimal::from_str(s).unwrap()
	}

	#[test]
	fn denomination_views_are_exact() {
		let one_wei = Unit::wei(U256::from(1u64));
		assert_eq!(one_wei.view(Denomination::TEther), dec("0.000000000000000000000000000001"));
		assert_eq!(one_wei.as_ether(), dec("0.000000000000000001"));

		let amount = Unit::from_decimal(&dec("1.000000000000000001"), Denomination::Ether).unwrap();
		assert_eq!(amount.as_wei(), U256::from(1_000_000_000_000_000_001u64));
		assert_eq!(amount.as_ether(), dec("1.000000000000000001"));
	}

	#[test]
	fn add_then_sub_restores() {
		let a = Unit::ether(1.5).unwrap();
		let b = Unit::wei(U256::from(7u64));
		let sum = a.checked_add(&b).unwrap();
		let back = sum.checked_sub(&b).unwrap();
		assert_eq!(back.as_wei(), a.as_wei());
		assert_eq!(back.compare(&a).unwrap(), Ordering::Equal);
	}

	#[test]
	fn decimal_operand_uses_own_denomination() {
		let price = Unit::gwei(2.0).unwrap();
		let bumped = price.checked_add(Operand::from_f64(0.5).unwrap()).unwrap();
		assert_eq!(bumped.as_wei(), U256::from(2_500_000_000u64));
		assert_eq!(price.compare(Operand::from_f64(2.0).unwrap()).unwrap(), Ordering::Equal);
	}

	#[test]
	fn sub_zero_floor_errors() {
		let a = Unit::wei(U256::from(5u64));
		let err = a.checked_sub(6u64).unwrap_err();
		assert!(matches!(err, Error::Arithmetic(_)));
	}

	#[test]
	fn add_overflow_errors() {
		let a = Unit::wei(U256::MAX);
		let err = a.checked_add(1u64).unwrap_err();
		assert!(matches!(err, Error::Arithmetic(_)));
	}

	#[test]
	fn division_by_zero_errors() {
		let a = Unit::ether(1.0).unwrap();
		assert!(matches!(a.checked_div(0u64).unwrap_err(), Error::Arithmetic(_)));
		let t = TokenAmount::from_f64(1.0, 6).unwrap();
		assert!(matches!(t.checked_div(0u64).unwrap_err(), Error::Arithmetic(_)));
	}

	#[test]
	fn integer_division_truncates() {
		let a = Unit::wei(U256::from(7u64));
		assert_eq!(a.checked_div(2u64).unwrap().as_wei(), U256::from(3u64));
	}

	#[test]
	fn mismatched_decimals_error() {
		let usdc = TokenAmount::from_f64(10.0, 6).unwrap();
		let dai = TokenAmount::from_f64(10.0, 18).unwrap();
		match usdc.checked_add(&dai).unwrap_err() {
			Error::DecimalsMismatch { left, right } => {
				assert_eq!((left, right), (6, 18));
			}
			other => panic!("unexpected error: {other}"),
		}
		assert!(usdc.compare(&dai).is_err());
	}

	#[test]
	fn unit_and_token_interoperate_at_native_decimals() {
		let coin = Unit::ether(1.0).unwrap();
		let wrapped = TokenAmount::from_f64(0.25, 18).unwrap();
		let sum = coin.checked_add(&wrapped).unwrap();
		assert_eq!(sum.as_ether(), dec("1.25"));

		let six = TokenAmount::from_f64(0.25, 6).unwrap();
		assert!(coin.checked_add(&six).is_err());
	}

	#[test]
	fn change_decimals_truncates() {
		let mut amount = TokenAmount::from_f64(500.73467, 18).unwrap();
		assert_eq!(amount.base_units(), U256::from(500_734_670_000_000_000_000u128));
		let rescaled = amount.change_decimals(6).unwrap();
		assert_eq!(rescaled, U256::from(500_734_670u64));
		assert_eq!(amount.decimals(), 6);
		assert_eq!(amount.value(), dec("500.734670"));
	}

	#[test]
	fn change_decimals_drops_excess_digits() {
		let mut amount = TokenAmount::from_base_units(U256::from(1_234_567u64), 6);
		amount.change_decimals(2).unwrap();
		assert_eq!(amount.base_units(), U256::from(123u64));
		assert_eq!(amount.value(), dec("1.23"));
	}

	#[test]
	fn token_mul_decimal_scales_value() {
		let amount = TokenAmount::from_f64(2.5, 6).unwrap();
		let doubled = amount.checked_mul(Operand::from_f64(2.0).unwrap()).unwrap();
		assert_eq!(doubled.base_units(), U256::from(5_000_000u64));
	}

	#[test]
	fn negative_and_non_finite_inputs_error() {
		assert!(Unit::ether(-1.0).is_err());
		assert!(Operand::from_f64(f64::NAN).is_err());
		assert!(to_base_units(&dec("-0.5"), 18).is_err());
	}

	#[test]
	fn to_base_units_truncates_fraction() {
		assert_eq!(to_base_units(&dec("1.9999"), 2).unwrap(), U256::from(199u64));
		assert_eq!(to_base_units(&dec("0.0000001"), 6).unwrap(), U256::ZERO);
	}
}
