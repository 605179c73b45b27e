//! Versioned tax tables.
//!
//! Tax law changes every year, so brackets, standard deductions, state rates
//! and self-employment rates are grouped per tax year in a [`TaxYearTables`]
//! and looked up through a [`TaxTableRegistry`].

mod builtin;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    BracketTable, FilingStatus, PerFilingStatus, SelfEmploymentRates, StateTaxInfo,
    is_state_code, normalize_state_code,
};

/// Errors raised while building or validating tax tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxTableError {
    #[error("bracket table has no brackets")]
    EmptyBracketTable,

    #[error("bracket rate must be between 0 and 1, got {0}")]
    InvalidBracketRate(Decimal),

    #[error("bracket rates must not decrease: {rate} follows {previous}")]
    DecreasingBracketRate { previous: Decimal, rate: Decimal },

    #[error("bracket limits must be positive and increasing: {limit} follows {previous}")]
    NonIncreasingBracketLimit { previous: Decimal, limit: Decimal },

    #[error("only the last bracket may be unbounded (bracket {index} is unbounded)")]
    UnboundedBracketNotLast { index: usize },

    #[error("the last bracket must be unbounded")]
    MissingUnboundedBracket,

    #[error("standard deduction for {filing_status} must be non-negative, got {amount}")]
    NegativeStandardDeduction {
        filing_status: FilingStatus,
        amount: Decimal,
    },

    #[error("state code must be two upper-case letters, got '{0}'")]
    InvalidStateCode(String),

    #[error("state rate for {state} must be between 0 and 1, got {rate}")]
    InvalidStateRate { state: String, rate: Decimal },

    #[error("social security tax rate must be between 0 and 1, got {0}")]
    InvalidSocialSecurityRate(Decimal),

    #[error("medicare tax rate must be between 0 and 1, got {0}")]
    InvalidMedicareRate(Decimal),

    #[error("net earnings factor must be between 0 and 1, got {0}")]
    InvalidNetEarningsFactor(Decimal),
}

/// The complete table set for one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxYearTables {
    tax_year: i32,
    brackets: PerFilingStatus<BracketTable>,
    standard_deductions: PerFilingStatus<Decimal>,
    state_rates: BTreeMap<String, StateTaxInfo>,
    self_employment: SelfEmploymentRates,
}

impl TaxYearTables {
    /// Assembles and validates a year's tables.
    ///
    /// State codes are normalized to upper case before validation.
    pub fn new(
        tax_year: i32,
        brackets: PerFilingStatus<BracketTable>,
        standard_deductions: PerFilingStatus<Decimal>,
        state_rates: BTreeMap<String, StateTaxInfo>,
        self_employment: SelfEmploymentRates,
    ) -> Result<Self, TaxTableError> {
        let state_rates = state_rates
            .into_iter()
            .map(|(code, info)| (normalize_state_code(&code), info))
            .collect();

        let tables = Self {
            tax_year,
            brackets,
            standard_deductions,
            state_rates,
            self_employment,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Checks everything that [`BracketTable::new`] cannot see on its own.
    pub fn validate(&self) -> Result<(), TaxTableError> {
        for (_, table) in self.brackets.iter() {
            BracketTable::validate(table.brackets())?;
        }
        for (filing_status, amount) in self.standard_deductions.iter() {
            if *amount < Decimal::ZERO {
                return Err(TaxTableError::NegativeStandardDeduction {
                    filing_status,
                    amount: *amount,
                });
            }
        }
        for (code, info) in &self.state_rates {
            if !is_state_code(code) {
                return Err(TaxTableError::InvalidStateCode(code.clone()));
            }
            if info.rate < Decimal::ZERO || info.rate > Decimal::ONE {
                return Err(TaxTableError::InvalidStateRate {
                    state: code.clone(),
                    rate: info.rate,
                });
            }
        }
        self.self_employment.validate()
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn bracket_table(
        &self,
        filing_status: FilingStatus,
    ) -> &BracketTable {
        self.brackets.get(filing_status)
    }

    pub fn standard_deduction(
        &self,
        filing_status: FilingStatus,
    ) -> Decimal {
        *self.standard_deductions.get(filing_status)
    }

    /// Looks up a state by code, ignoring case and surrounding whitespace.
    pub fn state(
        &self,
        code: &str,
    ) -> Option<&StateTaxInfo> {
        self.state_rates.get(&normalize_state_code(code))
    }

    pub fn state_rates(&self) -> &BTreeMap<String, StateTaxInfo> {
        &self.state_rates
    }

    pub fn self_employment(&self) -> &SelfEmploymentRates {
        &self.self_employment
    }
}

/// Tax tables keyed by tax year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxTableRegistry {
    years: BTreeMap<i32, TaxYearTables>,
}

static BUILTIN: OnceLock<TaxTableRegistry> = OnceLock::new();

impl TaxTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables shipped with the crate (2024 and 2025).
    ///
    /// Built on first use and shared read-only for the life of the process.
    pub fn builtin() -> &'static TaxTableRegistry {
        BUILTIN.get_or_init(|| {
            let mut registry = TaxTableRegistry::new();
            for tables in builtin::all_years() {
                registry.years.insert(tables.tax_year(), tables);
            }
            debug!(years = ?registry.years(), "built-in tax tables initialised");
            registry
        })
    }

    /// Adds a year's tables, replacing any tables already held for that year.
    ///
    /// The tables are re-validated so a registry never holds an invalid set.
    pub fn insert(
        &mut self,
        tables: TaxYearTables,
    ) -> Result<Option<TaxYearTables>, TaxTableError> {
        tables.validate()?;
        Ok(self.years.insert(tables.tax_year(), tables))
    }

    pub fn get(
        &self,
        tax_year: i32,
    ) -> Option<&TaxYearTables> {
        self.years.get(&tax_year)
    }

    /// Years with tables, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
