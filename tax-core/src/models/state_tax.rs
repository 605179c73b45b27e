use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

static STATE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("state code pattern is valid"));

/// Flat state income-tax rate and the state's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxInfo {
    pub name: String,
    pub rate: Decimal,
}

impl StateTaxInfo {
    pub fn new(
        name: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// Normalizes a state code for table lookups: trimmed and upper-cased.
pub fn normalize_state_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// True when `code` is exactly two ASCII upper-case letters.
///
/// This is the one rule for state codes: table validation and user input
/// parsing both go through it.
pub fn is_state_code(code: &str) -> bool {
    STATE_CODE.is_match(code)
}
