//! Building an estimate request from the command line or a TOML file.
//!
//! A request file is a [`TaxEstimateInput`] in TOML with camelCase keys:
//!
//! ```toml
//! taxYear = 2024
//! grossIncome = "85000"
//! filingStatus = "headOfHousehold"
//! state = "ny"
//! selfEmploymentIncome = 12000
//! payPeriods = 24
//!
//! [[deductions]]
//! name = "Mortgage interest"
//! amount = "14250.75"
//!
//! [[credits]]
//! name = "Child tax credit"
//! amount = 2000
//!
//! [priorYear]
//! totalTax = 9100
//! ```
//!
//! Amounts may be TOML integers or strings; strings keep full decimal
//! precision.

use std::path::{Path, PathBuf};

use clap::Args;
use rust_decimal::Decimal;
use tax_core::{DEFAULT_PAY_PERIODS, DEFAULT_TAX_YEAR, FilingStatus, TaxEstimateInput};
use thiserror::Error;
use tracing::debug;

use crate::utils::{InvalidStateCode, NamedAmount, parse_decimal, parse_state_code};

/// Errors raised while turning user input into a [`TaxEstimateInput`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("cannot read request file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required option {0}")]
    MissingOption(&'static str),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateCode),
}

/// Estimate inputs accepted on the command line.
#[derive(Debug, Clone, Args)]
pub struct EstimateArgs {
    /// TOML request file; when given, the other estimate options are ignored
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Annual gross income, e.g. 85,000
    #[arg(long, value_parser = parse_decimal)]
    pub income: Option<Decimal>,

    /// Filing status: S, MFJ, HOH, MFS (or single, married, headOfHousehold, ...)
    #[arg(long)]
    pub filing_status: Option<FilingStatus>,

    /// Tax year whose tables are used
    #[arg(long, default_value_t = DEFAULT_TAX_YEAR)]
    pub year: i32,

    /// Two-letter state code
    #[arg(long, value_parser = parse_state_code)]
    pub state: Option<String>,

    /// Net self-employment income
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub self_employment_income: Decimal,

    /// Itemized deduction as NAME=AMOUNT; repeatable
    #[arg(long = "deduction", value_name = "NAME=AMOUNT")]
    pub deductions: Vec<NamedAmount>,

    /// Tax credit as NAME=AMOUNT; repeatable
    #[arg(long = "credit", value_name = "NAME=AMOUNT")]
    pub credits: Vec<NamedAmount>,

    /// Last year's total tax, for a year-over-year comparison
    #[arg(long, value_parser = parse_decimal)]
    pub prior_year_tax: Option<Decimal>,

    /// Paychecks per year for the withholding suggestion
    #[arg(long, default_value_t = DEFAULT_PAY_PERIODS)]
    pub pay_periods: u32,
}

impl EstimateArgs {
    /// Builds the engine input. A request file, when given, wins entirely.
    pub fn to_input(&self) -> Result<TaxEstimateInput, RequestError> {
        if let Some(path) = &self.request {
            return load_request_file(path);
        }

        let income = self.income.ok_or(RequestError::MissingOption("--income"))?;
        let filing_status = self
            .filing_status
            .ok_or(RequestError::MissingOption("--filing-status"))?;

        let mut input = TaxEstimateInput::new(income, filing_status)
            .with_tax_year(self.year)
            .with_self_employment_income(self.self_employment_income)
            .with_pay_periods(self.pay_periods);

        if let Some(state) = &self.state {
            input = input.with_state(state.clone());
        }
        for deduction in &self.deductions {
            input = input.with_deduction(deduction.name.clone(), deduction.amount);
        }
        for credit in &self.credits {
            input = input.with_credit(credit.name.clone(), credit.amount);
        }
        if let Some(prior) = self.prior_year_tax {
            input = input.with_prior_year_tax(prior);
        }

        Ok(input)
    }
}

/// Parses a TOML request and normalizes its state code.
pub fn parse_request(
    contents: &str,
    path: &Path,
) -> Result<TaxEstimateInput, RequestError> {
    let mut input: TaxEstimateInput =
        toml::from_str(contents).map_err(|source| RequestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    input.state = match input.state.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => Some(parse_state_code(code)?),
    };

    debug!(
        path = %path.display(),
        tax_year = input.tax_year,
        filing_status = input.filing_status.as_str(),
        "request file parsed"
    );

    Ok(input)
}

pub fn load_request_file(path: &Path) -> Result<TaxEstimateInput, RequestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| RequestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_request(&contents, path)
}
