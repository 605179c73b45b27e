use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{
    BracketSlice, SelfEmploymentTax, TaxEngineError, WithholdingSuggestion, YearOverYear,
};
use crate::models::FilingStatus;

/// Tax year used when a request does not name one.
pub const DEFAULT_TAX_YEAR: i32 = 2024;

/// Bi-weekly pay schedule.
pub const DEFAULT_PAY_PERIODS: u32 = 26;

fn default_tax_year() -> i32 {
    DEFAULT_TAX_YEAR
}

fn default_pay_periods() -> u32 {
    DEFAULT_PAY_PERIODS
}

fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// An itemized deduction; reduces taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub name: String,
    pub amount: Decimal,
}

/// A credit; reduces tax owed dollar for dollar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    pub amount: Decimal,
}

/// The part of last year's result needed for a year-over-year comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorYearSummary {
    pub total_tax: Decimal,
}

/// Everything the engine needs for one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimateInput {
    /// Selects the table set (brackets, standard deductions, state rates).
    #[serde(default = "default_tax_year")]
    pub tax_year: i32,

    pub gross_income: Decimal,

    pub filing_status: FilingStatus,

    /// Two-letter state code; `None` means no state tax.
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub self_employment_income: Decimal,

    #[serde(default)]
    pub deductions: Vec<Deduction>,

    #[serde(default)]
    pub credits: Vec<Credit>,

    #[serde(default)]
    pub prior_year: Option<PriorYearSummary>,

    /// Number of paychecks per year for the withholding suggestion.
    #[serde(default = "default_pay_periods")]
    pub pay_periods: u32,
}

impl TaxEstimateInput {
    pub fn new(
        gross_income: Decimal,
        filing_status: FilingStatus,
    ) -> Self {
        Self {
            tax_year: DEFAULT_TAX_YEAR,
            gross_income,
            filing_status,
            state: None,
            self_employment_income: Decimal::ZERO,
            deductions: Vec::new(),
            credits: Vec::new(),
            prior_year: None,
            pay_periods: DEFAULT_PAY_PERIODS,
        }
    }

    pub fn with_tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = tax_year;
        self
    }

    pub fn with_state(
        mut self,
        state: impl Into<String>,
    ) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_self_employment_income(
        mut self,
        income: Decimal,
    ) -> Self {
        self.self_employment_income = income;
        self
    }

    pub fn with_deduction(
        mut self,
        name: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        self.deductions.push(Deduction {
            name: name.into(),
            amount,
        });
        self
    }

    pub fn with_credit(
        mut self,
        name: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        self.credits.push(Credit {
            name: name.into(),
            amount,
        });
        self
    }

    pub fn with_prior_year_tax(
        mut self,
        total_tax: Decimal,
    ) -> Self {
        self.prior_year = Some(PriorYearSummary { total_tax });
        self
    }

    pub fn with_pay_periods(
        mut self,
        pay_periods: u32,
    ) -> Self {
        self.pay_periods = pay_periods;
        self
    }

    /// Sum of the itemized deductions, saturating at [`Decimal::MAX`].
    /// [`validate`](Self::validate) rejects inputs where that matters.
    pub fn itemized_total(&self) -> Decimal {
        checked_total(self.deductions.iter().map(|d| d.amount)).unwrap_or(Decimal::MAX)
    }

    /// Sum of the credits, saturating at [`Decimal::MAX`].
    pub fn credit_total(&self) -> Decimal {
        checked_total(self.credits.iter().map(|c| c.amount)).unwrap_or(Decimal::MAX)
    }

    /// Checks the caller contract before any arithmetic runs.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError`] if:
    /// - gross income or self-employment income is negative
    /// - any deduction or credit amount is negative
    /// - the deductions or the credits add up to more than [`Decimal::MAX`]
    /// - the prior-year total tax is negative
    /// - `pay_periods` is zero
    pub fn validate(&self) -> Result<(), TaxEngineError> {
        if self.gross_income < Decimal::ZERO {
            return Err(TaxEngineError::NegativeGrossIncome(self.gross_income));
        }
        if self.self_employment_income < Decimal::ZERO {
            return Err(TaxEngineError::NegativeSelfEmploymentIncome(
                self.self_employment_income,
            ));
        }
        if let Some(d) = self.deductions.iter().find(|d| d.amount < Decimal::ZERO) {
            return Err(TaxEngineError::NegativeDeduction {
                name: d.name.clone(),
                amount: d.amount,
            });
        }
        if let Some(c) = self.credits.iter().find(|c| c.amount < Decimal::ZERO) {
            return Err(TaxEngineError::NegativeCredit {
                name: c.name.clone(),
                amount: c.amount,
            });
        }
        if checked_total(self.deductions.iter().map(|d| d.amount)).is_none() {
            return Err(TaxEngineError::AmountOverflow("deductions"));
        }
        if checked_total(self.credits.iter().map(|c| c.amount)).is_none() {
            return Err(TaxEngineError::AmountOverflow("credits"));
        }
        if let Some(prior) = &self.prior_year {
            if prior.total_tax < Decimal::ZERO {
                return Err(TaxEngineError::NegativePriorYearTax(prior.total_tax));
            }
        }
        if self.pay_periods == 0 {
            return Err(TaxEngineError::ZeroPayPeriods);
        }
        Ok(())
    }
}

/// Which deduction path was taken and the amounts compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionSummary {
    /// Sum of the itemized deductions.
    pub itemized: Decimal,

    /// Standard deduction for the filing status and year.
    pub standard: Decimal,

    /// The greater of `itemized` and `standard`.
    pub effective: Decimal,

    /// True only when itemized strictly exceeds standard.
    pub used_itemized: bool,
}

/// Full breakdown of one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimateResult {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    pub federal_breakdown: Vec<BracketSlice>,

    /// Federal rate on the next dollar of taxable income.
    pub marginal_rate: Decimal,

    pub self_employment_tax: SelfEmploymentTax,
    pub state_tax: Decimal,
    pub total_tax: Decimal,

    /// Total tax as a percentage of gross income; 0 when gross income is 0.
    pub effective_rate: Decimal,

    pub deductions: DeductionSummary,

    /// Sum of all credits.
    pub credits: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_over_year: Option<YearOverYear>,

    pub withholding: WithholdingSuggestion,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_input() -> TaxEstimateInput {
        TaxEstimateInput::new(dec!(50000), FilingStatus::Single)
    }

    // =========================================================================
    // builder tests
    // =========================================================================

    #[test]
    fn new_uses_defaults() {
        let input = valid_input();

        assert_eq!(input.tax_year, DEFAULT_TAX_YEAR);
        assert_eq!(input.state, None);
        assert_eq!(input.self_employment_income, Decimal::ZERO);
        assert_eq!(input.pay_periods, 26);
        assert!(input.deductions.is_empty());
        assert!(input.credits.is_empty());
        assert!(input.prior_year.is_none());
    }

    #[test]
    fn totals_sum_named_amounts() {
        let input = valid_input()
            .with_deduction("Mortgage interest", dec!(9000))
            .with_deduction("Charity", dec!(1500.50))
            .with_credit("Child tax credit", dec!(2000));

        assert_eq!(input.itemized_total(), dec!(10500.50));
        assert_eq!(input.credit_total(), dec!(2000));
    }

    #[test]
    fn totals_are_zero_without_entries() {
        let input = valid_input();

        assert_eq!(input.itemized_total(), Decimal::ZERO);
        assert_eq!(input.credit_total(), Decimal::ZERO);
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_zero_income() {
        let input = TaxEstimateInput::new(dec!(0), FilingStatus::Single);

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_gross_income() {
        let input = TaxEstimateInput::new(dec!(-1), FilingStatus::Single);

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::NegativeGrossIncome(dec!(-1)))
        );
    }

    #[test]
    fn validate_rejects_negative_self_employment_income() {
        let input = valid_input().with_self_employment_income(dec!(-500));

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::NegativeSelfEmploymentIncome(dec!(-500)))
        );
    }

    #[test]
    fn validate_rejects_negative_deduction() {
        let input = valid_input()
            .with_deduction("Charity", dec!(100))
            .with_deduction("Bogus", dec!(-100));

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::NegativeDeduction {
                name: "Bogus".to_string(),
                amount: dec!(-100),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_credit() {
        let input = valid_input().with_credit("Bogus", dec!(-0.01));

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::NegativeCredit {
                name: "Bogus".to_string(),
                amount: dec!(-0.01),
            })
        );
    }

    #[test]
    fn validate_rejects_deductions_summing_past_max() {
        let half = Decimal::MAX / dec!(2) + dec!(1);
        let input = valid_input()
            .with_deduction("First", half)
            .with_deduction("Second", half);

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::AmountOverflow("deductions"))
        );
        assert_eq!(input.itemized_total(), Decimal::MAX);
    }

    #[test]
    fn validate_rejects_credits_summing_past_max() {
        let input = valid_input()
            .with_credit("First", Decimal::MAX)
            .with_credit("Second", dec!(1));

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::AmountOverflow("credits"))
        );
    }

    #[test]
    fn validate_accepts_single_deduction_at_max() {
        let input = valid_input().with_deduction("All of it", Decimal::MAX);

        assert_eq!(input.validate(), Ok(()));
        assert_eq!(input.itemized_total(), Decimal::MAX);
    }

    #[test]
    fn validate_rejects_negative_prior_year_tax() {
        let input = valid_input().with_prior_year_tax(dec!(-10));

        assert_eq!(
            input.validate(),
            Err(TaxEngineError::NegativePriorYearTax(dec!(-10)))
        );
    }

    #[test]
    fn validate_rejects_zero_pay_periods() {
        let input = valid_input().with_pay_periods(0);

        assert_eq!(input.validate(), Err(TaxEngineError::ZeroPayPeriods));
    }
}
