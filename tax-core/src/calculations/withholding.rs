//! Suggested withholding derived from the annual tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

const MONTHS_PER_YEAR: u32 = 12;

/// Per-paycheck and monthly amounts that would cover the annual tax.
///
/// Both figures are rounded to cents for display and are not used in any
/// other total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithholdingSuggestion {
    pub pay_periods: u32,
    pub per_paycheck: Decimal,
    pub monthly: Decimal,
}

/// Spreads `total_tax` evenly over `pay_periods` paychecks and over twelve
/// months.
///
/// Returns `None` when `pay_periods` is zero.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::compute_withholding;
///
/// let w = compute_withholding(dec!(4016), 26).unwrap();
///
/// assert_eq!(w.per_paycheck, dec!(154.46));
/// assert_eq!(w.monthly, dec!(334.67));
/// ```
pub fn compute_withholding(
    total_tax: Decimal,
    pay_periods: u32,
) -> Option<WithholdingSuggestion> {
    if pay_periods == 0 {
        return None;
    }

    Some(WithholdingSuggestion {
        pay_periods,
        per_paycheck: round_half_up(total_tax / Decimal::from(pay_periods)),
        monthly: round_half_up(total_tax / Decimal::from(MONTHS_PER_YEAR)),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn bi_weekly_schedule() {
        let w = compute_withholding(dec!(4016), 26).unwrap();

        assert_eq!(
            w,
            WithholdingSuggestion {
                pay_periods: 26,
                per_paycheck: dec!(154.46),
                monthly: dec!(334.67),
            }
        );
    }

    #[test]
    fn monthly_schedule_matches_monthly_figure() {
        let w = compute_withholding(dec!(1200), 12).unwrap();

        assert_eq!(w.per_paycheck, w.monthly);
        assert_eq!(w.monthly, dec!(100));
    }

    #[test]
    fn zero_tax_withholds_nothing() {
        let w = compute_withholding(dec!(0), 52).unwrap();

        assert_eq!(w.per_paycheck, Decimal::ZERO);
        assert_eq!(w.monthly, Decimal::ZERO);
    }

    #[test]
    fn zero_pay_periods_is_rejected() {
        assert_eq!(compute_withholding(dec!(4016), 0), None);
    }
}
