//! Year-over-year comparison against a prior result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::percentage_of;
use crate::models::PriorYearSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearOverYear {
    /// This year's total tax minus last year's.
    pub difference: Decimal,

    /// `difference` as a percentage of last year's total tax.
    ///
    /// `None` when last year's total tax was zero.
    pub percentage_change: Option<Decimal>,
}

/// Compares `total_tax` with the prior year's total.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::PriorYearSummary;
/// use tax_core::calculations::compare_with_prior_year;
///
/// let yoy = compare_with_prior_year(dec!(4400), &PriorYearSummary { total_tax: dec!(4000) });
///
/// assert_eq!(yoy.difference, dec!(400));
/// assert_eq!(yoy.percentage_change, Some(dec!(10)));
/// ```
pub fn compare_with_prior_year(
    total_tax: Decimal,
    prior: &PriorYearSummary,
) -> YearOverYear {
    let difference = total_tax - prior.total_tax;
    YearOverYear {
        difference,
        percentage_change: percentage_of(difference, prior.total_tax),
    }
}
