use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use tax_core::calculations::common::{round_half_up, round_to};
use tax_core::{is_state_code, normalize_state_code};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Error returned for a malformed `NAME=AMOUNT` pair.
#[derive(Debug, Error)]
pub enum NamedAmountError {
    #[error("expected NAME=AMOUNT, got '{0}'")]
    MissingSeparator(String),

    #[error("missing name in '{0}'")]
    EmptyName(String),

    #[error(transparent)]
    InvalidAmount(#[from] ParseDecimalError),
}

/// Error returned when a state code is not two letters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid state code '{0}': expected two letters such as NY")]
pub struct InvalidStateCode(pub String);

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and a leading
/// `$`. Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    let normalized = normalized.strip_prefix('$').unwrap_or(&normalized);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Upper-cases `s` and checks it is a two-letter state code.
pub fn parse_state_code(s: &str) -> Result<String, InvalidStateCode> {
    let code = normalize_state_code(s);
    if is_state_code(&code) {
        Ok(code)
    } else {
        Err(InvalidStateCode(s.to_string()))
    }
}

/// A labelled amount given on the command line as `NAME=AMOUNT`, e.g.
/// `"Mortgage interest=12,000"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAmount {
    pub name: String,
    pub amount: Decimal,
}

impl FromStr for NamedAmount {
    type Err = NamedAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, amount) = s
            .rsplit_once('=')
            .ok_or_else(|| NamedAmountError::MissingSeparator(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(NamedAmountError::EmptyName(s.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            amount: parse_decimal(amount)?,
        })
    }
}

impl fmt::Display for NamedAmount {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}={}", self.name, self.amount)
    }
}

/// `$` and two decimal places, midpoints rounded away from zero.
/// Negative amounts render as `-$12.50`.
pub fn format_currency(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", rounded.abs())
    } else {
        format!("${}", rounded.abs())
    }
}

/// A percentage value with one decimal place and a `%` suffix.
pub fn format_percent(value: Decimal) -> String {
    let mut rounded = round_to(value, 1);
    rounded.rescale(1);
    format!("{rounded}%")
}

/// A rate stored as a fraction (`0.12`) shown as a percentage (`12%`).
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parse_decimal tests
    // =========================================================================

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_accepts_dollar_prefix() {
        assert_eq!(parse_decimal("$50,000").unwrap(), dec!(50000));
    }

    #[test]
    fn parse_decimal_trim_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
    }

    // =========================================================================
    // parse_state_code tests
    // =========================================================================

    #[test]
    fn parse_state_code_upper_cases() {
        assert_eq!(parse_state_code(" ny ").unwrap(), "NY");
    }

    #[test]
    fn parse_state_code_rejects_wrong_length() {
        assert_eq!(
            parse_state_code("NYC"),
            Err(InvalidStateCode("NYC".to_string()))
        );
    }

    #[test]
    fn parse_state_code_rejects_digits() {
        assert!(parse_state_code("N1").is_err());
    }

    #[test]
    fn parse_state_code_agrees_with_table_rule() {
        for input in ["ny", " CA ", "N1", "NYC", "", "é1"] {
            assert_eq!(
                parse_state_code(input).is_ok(),
                is_state_code(&normalize_state_code(input)),
                "input {input:?}"
            );
        }
    }

    // =========================================================================
    // NamedAmount tests
    // =========================================================================

    #[test]
    fn named_amount_parses_name_and_amount() {
        let parsed: NamedAmount = "Mortgage interest=12,000.50".parse().unwrap();

        assert_eq!(
            parsed,
            NamedAmount {
                name: "Mortgage interest".to_string(),
                amount: dec!(12000.50),
            }
        );
    }

    #[test]
    fn named_amount_requires_separator() {
        let err = "Charity".parse::<NamedAmount>().unwrap_err();

        assert!(matches!(err, NamedAmountError::MissingSeparator(_)));
    }

    #[test]
    fn named_amount_requires_name() {
        let err = " =100".parse::<NamedAmount>().unwrap_err();

        assert!(matches!(err, NamedAmountError::EmptyName(_)));
    }

    #[test]
    fn named_amount_rejects_bad_amount() {
        let err = "Charity=lots".parse::<NamedAmount>().unwrap_err();

        assert!(matches!(err, NamedAmountError::InvalidAmount(_)));
    }

    // =========================================================================
    // formatting tests
    // =========================================================================

    #[test]
    fn format_currency_pads_to_cents() {
        assert_eq!(format_currency(dec!(4016)), "$4016.00");
        assert_eq!(format_currency(dec!(1412.955)), "$1412.96");
    }

    #[test]
    fn format_currency_negative() {
        assert_eq!(format_currency(dec!(-12.5)), "-$12.50");
    }

    #[test]
    fn format_currency_zero() {
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn format_percent_one_place() {
        assert_eq!(format_percent(dec!(8.032)), "8.0%");
        assert_eq!(format_percent(dec!(0)), "0.0%");
        assert_eq!(format_percent(dec!(12.25)), "12.3%");
    }

    #[test]
    fn format_rate_as_percentage() {
        assert_eq!(format_rate(dec!(0.12)), "12%");
        assert_eq!(format_rate(dec!(0.0685)), "6.85%");
    }
}
