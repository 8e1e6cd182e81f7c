//! Conversion between base-unit integers and decimal display amounts.
//!
//! Base units are always [`U256`] integers (wei for the native currency, the
//! token's smallest unit otherwise). Display amounts are plain decimal strings:
//! digits with at most one `.`, never an exponent. Scaling is `U256` digit
//! arithmetic plus [`format_units`], so no floating point is involved.

use ethers::types::{Address, U256};
use ethers::utils::format_units;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Largest decimal count whose power of ten still fits in a `U256`.
pub const MAX_DECIMALS: u32 = 77;

/// Native currency denominations, all fixed relative to wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denomination {
    Wei,
    Gwei,
    Ether,
}

impl Denomination {
    pub fn decimals(&self) -> u32 {
        match self {
            Denomination::Wei => 0,
            Denomination::Gwei => 9,
            Denomination::Ether => 18,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Denomination::Wei => "wei",
            Denomination::Gwei => "gwei",
            Denomination::Ether => "ether",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_lowercase().as_str() {
            "wei" => Some(Denomination::Wei),
            "gwei" => Some(Denomination::Gwei),
            "ether" => Some(Denomination::Ether),
            _ => None,
        }
    }
}

/// Token registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub address: Address,
    #[serde(alias = "decimal", default = "default_token_decimals")]
    pub decimals: u32,
}

fn default_token_decimals() -> u32 {
    18
}

/// The denomination an amount is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    Native(Denomination),
    Token(Token),
}

impl Unit {
    pub fn ether() -> Self {
        Unit::Native(Denomination::Ether)
    }

    pub fn gwei() -> Self {
        Unit::Native(Denomination::Gwei)
    }

    pub fn wei() -> Self {
        Unit::Native(Denomination::Wei)
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Unit::Native(denomination) => denomination.decimals(),
            Unit::Token(token) => token.decimals,
        }
    }

    /// Symbol as it appears in unit pickers: `ether` or the token symbol.
    pub fn symbol(&self) -> &str {
        match self {
            Unit::Native(denomination) => denomination.as_str(),
            Unit::Token(token) => &token.symbol,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Unit::Native(_))
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Unit::Token(token) => Some(token),
            Unit::Native(_) => None,
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::ether()
    }
}

/// A decimal value paired with its unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub value: String,
    pub unit: Unit,
}

impl Amount {
    pub fn new(value: impl Into<String>, unit: Unit) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }
}

/// Splits a decimal string into its integer and fraction digits.
fn split_decimal(value: &str) -> Result<(&str, &str)> {
    let trimmed = value.trim();
    let (integer, fraction) = match trimmed.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty())
        || !all_digits(integer)
        || !all_digits(fraction)
    {
        return Err(Error::InvalidAmount(value.to_string()));
    }

    Ok((integer, fraction))
}

fn join_decimal(integer: &str, fraction: &str) -> String {
    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

/// Canonical decimal form: no leading zeros, no trailing fraction zeros, no
/// bare trailing dot.
pub fn canonical_amount(value: &str) -> Result<String> {
    let (integer, fraction) = split_decimal(value)?;
    Ok(join_decimal(integer, fraction))
}

/// True iff `value` is a well-formed decimal strictly greater than zero.
pub fn is_positive_amount(value: &str) -> bool {
    canonical_amount(value).map_or(false, |canonical| canonical != "0")
}

/// Scales a decimal string by `10^decimals`. Fraction digits beyond
/// `decimals` are truncated.
pub fn parse_decimal(value: &str, decimals: u32) -> Result<U256> {
    if decimals > MAX_DECIMALS {
        return Err(Error::InvalidAmount(format!(
            "{value} ({decimals} decimals exceeds {MAX_DECIMALS})"
        )));
    }
    let (integer, fraction) = split_decimal(value)?;
    let places = decimals as usize;
    let fraction = &fraction[..fraction.len().min(places)];
    let digits = format!("{integer}{fraction:0<places$}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(digits).map_err(|e| Error::InvalidAmount(format!("{value}: {e:?}")))
}

/// Renders a base-unit integer as a canonical decimal with `decimals` places.
pub fn format_decimal(raw: U256, decimals: u32) -> Result<String> {
    if decimals == 0 {
        return Ok(raw.to_string());
    }
    if decimals > MAX_DECIMALS {
        return Err(Error::InvalidAmount(format!(
            "{raw} ({decimals} decimals exceeds {MAX_DECIMALS})"
        )));
    }
    let formatted =
        format_units(raw, decimals).map_err(|e| Error::InvalidAmount(format!("{raw}: {e}")))?;
    canonical_amount(&formatted)
}

pub fn to_base_units(amount: &Amount) -> Result<U256> {
    parse_decimal(&amount.value, amount.unit.decimals())
}

pub fn from_base_units(raw: U256, unit: &Unit) -> Result<String> {
    format_decimal(raw, unit.decimals())
}

/// Re-expresses `amount` in `to`, e.g. a wei gas price in gwei.
pub fn convert(amount: &Amount, to: &Unit) -> Result<Amount> {
    let raw = to_base_units(amount)?;
    Ok(Amount::new(from_base_units(raw, to)?, to.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dai() -> Unit {
        Unit::Token(Token {
            symbol: "DAI".to_string(),
            address: Address::repeat_byte(0xda),
            decimals: 18,
        })
    }

    fn usdc() -> Unit {
        Unit::Token(Token {
            symbol: "USDC".to_string(),
            address: Address::repeat_byte(0xaf),
            decimals: 6,
        })
    }

    #[test]
    fn test_canonical_amount_strips_redundant_zeros() {
        assert_eq!(canonical_amount("001.500").unwrap(), "1.5");
        assert_eq!(canonical_amount("42.0").unwrap(), "42");
        assert_eq!(canonical_amount(".25").unwrap(), "0.25");
        assert_eq!(canonical_amount("7.").unwrap(), "7");
        assert_eq!(canonical_amount("0000").unwrap(), "0");
        assert_eq!(canonical_amount(" 3 ").unwrap(), "3");
    }

    #[test]
    fn test_rejects_non_decimal_input() {
        for bad in ["", ".", "-1", "+1", "1e18", "NaN", "Infinity", "1.2.3", "abc", "0x10"] {
            assert!(
                matches!(canonical_amount(bad), Err(Error::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_to_base_units_scales_by_unit_decimals() {
        let wei = to_base_units(&Amount::new("1.5", Unit::ether())).unwrap();
        assert_eq!(wei, U256::from(1_500_000_000_000_000_000u128));

        let gwei = to_base_units(&Amount::new("21", Unit::gwei())).unwrap();
        assert_eq!(gwei, U256::from(21_000_000_000u64));

        let raw = to_base_units(&Amount::new("12.34", usdc())).unwrap();
        assert_eq!(raw, U256::from(12_340_000u64));

        let dai_raw = to_base_units(&Amount::new("42.0", dai())).unwrap();
        assert_eq!(
            dai_raw,
            U256::from_dec_str("42000000000000000000").unwrap()
        );
    }

    #[test]
    fn test_excess_precision_is_truncated() {
        let raw = to_base_units(&Amount::new("1.1234567", usdc())).unwrap();
        assert_eq!(raw, U256::from(1_123_456u64));

        let wei = to_base_units(&Amount::new("1.9", Unit::wei())).unwrap();
        assert_eq!(wei, U256::from(1u64));
    }

    #[test]
    fn test_amounts_beyond_f64_precision_are_exact() {
        let amount = Amount::new("123456789012345678901234567.123456789012345678", Unit::ether());
        let raw = to_base_units(&amount).unwrap();
        assert_eq!(
            raw.to_string(),
            "123456789012345678901234567123456789012345678"
        );
        assert_eq!(
            from_base_units(raw, &Unit::ether()).unwrap(),
            "123456789012345678901234567.123456789012345678"
        );
    }

    #[test]
    fn test_overflow_is_invalid_amount() {
        let huge = "9".repeat(80);
        assert!(matches!(
            to_base_units(&Amount::new(huge, Unit::ether())),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_from_base_units_is_canonical() {
        assert_eq!(
            from_base_units(U256::from(1_500_000_000_000_000_000u128), &Unit::ether()).unwrap(),
            "1.5"
        );
        assert_eq!(from_base_units(U256::zero(), &Unit::ether()).unwrap(), "0");
        assert_eq!(from_base_units(U256::from(1u64), &Unit::ether()).unwrap(), "0.000000000000000001");
        assert_eq!(from_base_units(U256::from(99u64), &Unit::wei()).unwrap(), "99");
    }

    #[test]
    fn test_round_trip_matches_canonical_form() {
        let cases = [
            ("1.5", Unit::ether()),
            ("0.000000001", Unit::ether()),
            ("100", Unit::gwei()),
            ("20.500", Unit::gwei()),
            ("0012.340000", usdc()),
            ("42.0", dai()),
        ];
        for (value, unit) in cases {
            let raw = to_base_units(&Amount::new(value, unit.clone())).unwrap();
            assert_eq!(
                from_base_units(raw, &unit).unwrap(),
                canonical_amount(value).unwrap(),
                "round trip of {value} {}",
                unit.symbol()
            );
        }
    }

    #[test]
    fn test_convert_between_gas_price_denominations() {
        let gwei = convert(&Amount::new("21000000000", Unit::wei()), &Unit::gwei()).unwrap();
        assert_eq!(gwei, Amount::new("21", Unit::gwei()));

        let ether = convert(&Amount::new("1500000000", Unit::gwei()), &Unit::ether()).unwrap();
        assert_eq!(ether.value, "1.5");

        let wei = convert(&Amount::new("0.5", Unit::gwei()), &Unit::wei()).unwrap();
        assert_eq!(wei.value, "500000000");
    }

    #[test]
    fn test_denomination_lookup_is_case_insensitive() {
        assert_eq!(Denomination::from_symbol("Ether"), Some(Denomination::Ether));
        assert_eq!(Denomination::from_symbol("GWEI"), Some(Denomination::Gwei));
        assert_eq!(Denomination::from_symbol("DAI"), None);
    }

    #[test]
    fn test_token_decimals_accept_legacy_field_name() {
        let token: Token = serde_json::from_str(
            r#"{"symbol":"USDC","address":"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48","decimal":6}"#,
        )
        .unwrap();
        assert_eq!(token.decimals, 6);
    }
}
