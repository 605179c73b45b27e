//! CSV loader for batch estimate requests.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive and must match exactly.
//!
//! | Column                   | Required | Type    | Notes                                   |
//! |--------------------------|----------|---------|-----------------------------------------|
//! | `tax_year`               | no       | integer | Defaults to 2024                        |
//! | `filing_status`          | yes      | string  | `S`, `MFJ`, `HOH`, `MFS` or long form   |
//! | `gross_income`           | yes      | decimal | e.g. `75000.00`                         |
//! | `state`                  | no       | string  | Two-letter code; empty for none         |
//! | `self_employment_income` | no       | decimal | Empty for none                          |
//! | `itemized_deductions`    | no       | decimal | Total itemized deductions               |
//! | `credits`                | no       | decimal | Total credits                           |
//! | `prior_year_tax`         | no       | decimal | Enables the year-over-year comparison   |
//! | `pay_periods`            | no       | integer | Defaults to 26                          |
//!
//! ### Minimal example
//!
//! ```csv
//! filing_status,gross_income
//! S,50000
//! ```
//!
//! ### Full example
//!
//! ```csv
//! tax_year,filing_status,gross_income,state,self_employment_income,itemized_deductions,credits,prior_year_tax,pay_periods
//! 2024,S,75000.00,NY,25000.00,,1000.00,12000.00,26
//! 2025,MFJ,200000.00,,,35000.00,,,24
//! ```
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{DEFAULT_PAY_PERIODS, DEFAULT_TAX_YEAR, FilingStatus, TaxEstimateInput};

use crate::utils::parse_state_code;

/// Label given to the single deduction built from `itemized_deductions`.
pub const ITEMIZED_DEDUCTIONS_NAME: &str = "Itemized deductions";

/// Label given to the single credit built from `credits`.
pub const CREDITS_NAME: &str = "Credits";

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    tax_year: Option<i32>,
    filing_status: String,
    gross_income: Decimal,
    state: Option<String>,
    self_employment_income: Option<Decimal>,
    itemized_deductions: Option<Decimal>,
    credits: Option<Decimal>,
    prior_year_tax: Option<Decimal>,
    pay_periods: Option<u32>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, type mismatch, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A `filing_status` cell was not a recognised status. `row` is the
    /// 1-based data row number (header = row 0).
    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    /// A `state` cell was not a two-letter code.
    #[error("invalid state code '{state}' on row {row}")]
    InvalidState { state: String, row: usize },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Convert a single CSV row into a TaxEstimateInput.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<TaxEstimateInput, CsvLoadError> {
    let filing_status = FilingStatus::parse(&row.filing_status).ok_or_else(|| {
        CsvLoadError::InvalidFilingStatus {
            status: row.filing_status.clone(),
            row: row_number,
        }
    })?;

    let mut input = TaxEstimateInput::new(row.gross_income, filing_status)
        .with_tax_year(row.tax_year.unwrap_or(DEFAULT_TAX_YEAR))
        .with_self_employment_income(row.self_employment_income.unwrap_or_default())
        .with_pay_periods(row.pay_periods.unwrap_or(DEFAULT_PAY_PERIODS));

    if let Some(state) = row.state.filter(|s| !s.is_empty()) {
        let code = parse_state_code(&state).map_err(|_| CsvLoadError::InvalidState {
            state,
            row: row_number,
        })?;
        input = input.with_state(code);
    }
    if let Some(amount) = row.itemized_deductions {
        input = input.with_deduction(ITEMIZED_DEDUCTIONS_NAME, amount);
    }
    if let Some(amount) = row.credits {
        input = input.with_credit(CREDITS_NAME, amount);
    }
    if let Some(prior) = row.prior_year_tax {
        input = input.with_prior_year_tax(prior);
    }

    Ok(input)
}

/// Parse CSV text (the full file contents as a &str) and return a vector of
/// TaxEstimateInput. Rows are returned in file order.
///
/// Amounts are not range-checked here; the engine's own validation reports
/// negative values per row.
///
/// # Errors
///
/// * [CsvLoadError::Parse] – if the CSV is structurally invalid or a
///   required field cannot be deserialised.
/// * [CsvLoadError::InvalidFilingStatus] – if any row contains an
///   unrecognised filing-status code.
/// * [CsvLoadError::InvalidState] – if any row has a malformed state code.
pub fn load_from_str(input: &str) -> Result<Vec<TaxEstimateInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            let row_number = idx + 1; // 1-based for user-facing messages
            convert_row(row, row_number)
        })
        .collect()
}

/// Convenience wrapper: read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<TaxEstimateInput>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
