//! The tax engine: validates a request and assembles the full breakdown.
//!
//! # Pipeline
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Validate the input (negative amounts, overflowing totals, pay periods) |
//! | 2    | Resolve the tax year's tables |
//! | 3    | Effective deduction: max(itemized total, standard deduction) |
//! | 4    | Taxable income: max(0, gross income − step 3) |
//! | 5    | Federal tax from the bracket breakdown of step 4 |
//! | 6    | Self-employment tax |
//! | 7    | State tax |
//! | 8    | Total: max(0, step 5 + step 6 + step 7 − credits) |
//! | 9    | Effective rate, year-over-year comparison, withholding |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{FilingStatus, TaxEngine, TaxEstimateInput};
//!
//! let engine = TaxEngine::builtin();
//! let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single);
//!
//! let result = engine.compute_total_tax(&input).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(35400));
//! assert_eq!(result.federal_tax, dec!(4016.00));
//! assert_eq!(result.effective_rate, dec!(8.032));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::brackets::{BracketSlice, compute_bracket_breakdown, total_bracket_tax};
use crate::calculations::common::{non_negative, percentage_of};
use crate::calculations::comparison::compare_with_prior_year;
use crate::calculations::self_emp::{SelfEmploymentTax, compute_self_employment_tax};
use crate::calculations::state::compute_state_tax;
use crate::calculations::withholding::compute_withholding;
use crate::models::{DeductionSummary, FilingStatus, TaxEstimateInput, TaxEstimateResult};
use crate::tables::{TaxTableRegistry, TaxYearTables};

/// Reasons an estimate request is rejected.
///
/// Every variant is detected before any arithmetic runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxEngineError {
    #[error("gross income must be non-negative, got {0}")]
    NegativeGrossIncome(Decimal),

    #[error("self-employment income must be non-negative, got {0}")]
    NegativeSelfEmploymentIncome(Decimal),

    #[error("taxable income must be non-negative, got {0}")]
    NegativeTaxableIncome(Decimal),

    #[error("deduction '{name}' must be non-negative, got {amount}")]
    NegativeDeduction { name: String, amount: Decimal },

    #[error("credit '{name}' must be non-negative, got {amount}")]
    NegativeCredit { name: String, amount: Decimal },

    #[error("total of {0} exceeds the largest representable amount")]
    AmountOverflow(&'static str),

    #[error("prior-year total tax must be non-negative, got {0}")]
    NegativePriorYearTax(Decimal),

    #[error("pay periods must be at least 1")]
    ZeroPayPeriods,

    #[error("no tax tables for tax year {0}")]
    UnknownTaxYear(i32),
}

/// Computes estimates against the tables of a [`TaxTableRegistry`].
///
/// The engine holds only a shared reference to read-only tables, so one
/// instance can serve any number of threads at once.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    registry: &'a TaxTableRegistry,
}

impl TaxEngine<'static> {
    /// An engine over the tables shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(TaxTableRegistry::builtin())
    }
}

impl<'a> TaxEngine<'a> {
    pub fn new(registry: &'a TaxTableRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a TaxTableRegistry {
        self.registry
    }

    /// Looks up the tables for `tax_year`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::UnknownTaxYear`] if the registry has no
    /// tables for that year.
    pub fn tables(
        &self,
        tax_year: i32,
    ) -> Result<&'a TaxYearTables, TaxEngineError> {
        self.registry
            .get(tax_year)
            .ok_or(TaxEngineError::UnknownTaxYear(tax_year))
    }

    /// Per-bracket split of `taxable_income` for a filing status.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError`] if `taxable_income` is negative or the
    /// tax year is unknown.
    pub fn compute_bracket_breakdown(
        &self,
        tax_year: i32,
        taxable_income: Decimal,
        filing_status: FilingStatus,
    ) -> Result<Vec<BracketSlice>, TaxEngineError> {
        if taxable_income < Decimal::ZERO {
            return Err(TaxEngineError::NegativeTaxableIncome(taxable_income));
        }
        let tables = self.tables(tax_year)?;
        Ok(compute_bracket_breakdown(
            taxable_income,
            tables.bracket_table(filing_status),
        ))
    }

    /// Self-employment tax for `income` under the year's rates.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError`] if `income` is negative or the tax year is
    /// unknown.
    pub fn compute_self_employment_tax(
        &self,
        tax_year: i32,
        income: Decimal,
    ) -> Result<SelfEmploymentTax, TaxEngineError> {
        if income < Decimal::ZERO {
            return Err(TaxEngineError::NegativeSelfEmploymentIncome(income));
        }
        let tables = self.tables(tax_year)?;
        Ok(compute_self_employment_tax(income, tables.self_employment()))
    }

    /// State tax; see [`compute_state_tax`] for the exact formula.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::UnknownTaxYear`] if the tax year is unknown.
    pub fn compute_state_tax(
        &self,
        tax_year: i32,
        taxable_income: Decimal,
        state: Option<&str>,
        deductions_applied: Decimal,
    ) -> Result<Decimal, TaxEngineError> {
        let tables = self.tables(tax_year)?;
        Ok(compute_state_tax(
            taxable_income,
            state,
            deductions_applied,
            tables,
        ))
    }

    /// Runs the full estimate.
    ///
    /// The result depends only on `input` and the registry's tables; calling
    /// this twice with the same input gives identical results.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError`] if the input fails
    /// [`TaxEstimateInput::validate`] or its tax year is unknown.
    pub fn compute_total_tax(
        &self,
        input: &TaxEstimateInput,
    ) -> Result<TaxEstimateResult, TaxEngineError> {
        input.validate()?;
        let tables = self.tables(input.tax_year)?;

        let deductions = self.determine_deduction(input, tables);
        let taxable_income = non_negative(input.gross_income - deductions.effective);

        let federal_breakdown =
            compute_bracket_breakdown(taxable_income, tables.bracket_table(input.filing_status));
        let federal_tax = total_bracket_tax(&federal_breakdown);
        let marginal_rate = tables
            .bracket_table(input.filing_status)
            .marginal_rate(taxable_income);

        let self_employment_tax =
            compute_self_employment_tax(input.self_employment_income, tables.self_employment());

        let state_tax = compute_state_tax(
            taxable_income,
            input.state.as_deref(),
            deductions.effective,
            tables,
        );

        let credits = input.credit_total();
        let total_tax = self.total_tax(federal_tax, &self_employment_tax, state_tax, credits);

        // Undefined for zero income; reported as 0 rather than NaN.
        let effective_rate = percentage_of(total_tax, input.gross_income).unwrap_or(Decimal::ZERO);

        let year_over_year = input
            .prior_year
            .as_ref()
            .map(|prior| compare_with_prior_year(total_tax, prior));

        let withholding = compute_withholding(total_tax, input.pay_periods)
            .ok_or(TaxEngineError::ZeroPayPeriods)?;

        info!(
            tax_year = input.tax_year,
            filing_status = input.filing_status.as_str(),
            taxable_income = %taxable_income,
            federal_tax = %federal_tax,
            total_tax = %total_tax,
            "tax estimate computed"
        );

        Ok(TaxEstimateResult {
            tax_year: input.tax_year,
            filing_status: input.filing_status,
            gross_income: input.gross_income,
            taxable_income,
            federal_tax,
            federal_breakdown,
            marginal_rate,
            self_employment_tax,
            state_tax,
            total_tax,
            effective_rate,
            deductions,
            credits,
            year_over_year,
            withholding,
        })
    }

    /// Same as [`Self::compute_total_tax`].
    pub fn estimate(
        &self,
        input: &TaxEstimateInput,
    ) -> Result<TaxEstimateResult, TaxEngineError> {
        self.compute_total_tax(input)
    }

    /// Chooses the larger of the itemized total and the standard deduction.
    fn determine_deduction(
        &self,
        input: &TaxEstimateInput,
        tables: &TaxYearTables,
    ) -> DeductionSummary {
        let itemized = input.itemized_total();
        let standard = tables.standard_deduction(input.filing_status);
        let used_itemized = itemized > standard;
        let effective = if used_itemized { itemized } else { standard };

        debug!(
            itemized = %itemized,
            standard = %standard,
            used_itemized,
            "deduction path selected"
        );

        DeductionSummary {
            itemized,
            standard,
            effective,
            used_itemized,
        }
    }

    /// Federal + self-employment + state, less credits, never below zero.
    fn total_tax(
        &self,
        federal_tax: Decimal,
        self_employment_tax: &SelfEmploymentTax,
        state_tax: Decimal,
        credits: Decimal,
    ) -> Decimal {
        let before_credits = federal_tax + self_employment_tax.total + state_tax;
        if credits > before_credits {
            warn!(
                credits = %credits,
                tax_before_credits = %before_credits,
                "Credits exceed tax owed; total tax floored at zero"
            );
        }
        non_negative(before_credits - credits)
    }
}
