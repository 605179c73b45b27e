//! Self-employment tax.
//!
//! Self-employed taxpayers pay both the employer and employee halves of
//! social security and Medicare. The tax is levied on net earnings, which are
//! raw self-employment income scaled by the net-earnings factor.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Self-employment income |
//! | 2    | Taxable base: step 1 × 92.35% (net-earnings factor) |
//! | 3    | Social security: step 2 × 12.4% |
//! | 4    | Medicare: step 2 × 2.9% |
//! | 5    | Total: step 3 + step 4 |
//!
//! No step is rounded, so the total is always exactly the sum of its parts.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::SelfEmploymentRates;
//! use tax_core::calculations::compute_self_employment_tax;
//!
//! let tax = compute_self_employment_tax(dec!(10000), &SelfEmploymentRates::default());
//!
//! assert_eq!(tax.taxable_base, dec!(9235));
//! assert_eq!(tax.social_security, dec!(1145.14));
//! assert_eq!(tax.medicare, dec!(267.815));
//! assert_eq!(tax.total, dec!(1412.955));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::SelfEmploymentRates;

/// Components of the self-employment tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEmploymentTax {
    /// Income subject to the tax after the net-earnings factor.
    pub taxable_base: Decimal,

    pub social_security: Decimal,

    pub medicare: Decimal,

    /// `social_security + medicare`.
    pub total: Decimal,
}

/// Computes self-employment tax on `income`.
///
/// Negative income is treated as zero and logged; callers going through
/// [`crate::TaxEngine`] never reach this case because the engine rejects
/// negative self-employment income up front.
pub fn compute_self_employment_tax(
    income: Decimal,
    rates: &SelfEmploymentRates,
) -> SelfEmploymentTax {
    let income = clamp_income(income);
    if income.is_zero() {
        return SelfEmploymentTax::default();
    }

    let taxable_base = taxable_base(income, rates);
    let social_security = social_security_tax(taxable_base, rates);
    let medicare = medicare_tax(taxable_base, rates);
    let total = social_security + medicare;

    debug!(
        income = %income,
        taxable_base = %taxable_base,
        social_security = %social_security,
        medicare = %medicare,
        total = %total,
        "self-employment tax computed"
    );

    SelfEmploymentTax {
        taxable_base,
        social_security,
        medicare,
        total,
    }
}

fn clamp_income(income: Decimal) -> Decimal {
    if income < Decimal::ZERO {
        warn!(
            income = %income,
            "Self-employment income is negative; treating as zero"
        );
        return Decimal::ZERO;
    }
    income
}

/// Step 2: income × net-earnings factor.
fn taxable_base(
    income: Decimal,
    rates: &SelfEmploymentRates,
) -> Decimal {
    income * rates.net_earnings_factor
}

/// Step 3.
fn social_security_tax(
    taxable_base: Decimal,
    rates: &SelfEmploymentRates,
) -> Decimal {
    taxable_base * rates.social_security_rate
}

/// Step 4. Medicare has no wage base limit.
fn medicare_tax(
    taxable_base: Decimal,
    rates: &SelfEmploymentRates,
) -> Decimal {
    taxable_base * rates.medicare_rate
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn rates() -> SelfEmploymentRates {
        SelfEmploymentRates::default()
    }

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // compute_self_employment_tax tests
    // =========================================================================

    #[test]
    fn zero_income_yields_zero_tax() {
        let tax = compute_self_employment_tax(dec!(0), &rates());

        assert_eq!(tax, SelfEmploymentTax::default());
    }

    #[test]
    fn ten_thousand_of_income() {
        let tax = compute_self_employment_tax(dec!(10000), &rates());

        assert_eq!(
            tax,
            SelfEmploymentTax {
                taxable_base: dec!(9235),
                social_security: dec!(1145.14),
                medicare: dec!(267.815),
                total: dec!(1412.955),
            }
        );
    }

    #[test]
    fn total_equals_base_times_combined_rate() {
        let tax = compute_self_employment_tax(dec!(87654.32), &rates());

        assert_eq!(tax.total, tax.taxable_base * rates().total_rate());
    }

    #[test]
    fn total_is_sum_of_components() {
        for income in [dec!(0.01), dec!(400), dec!(55555.55), dec!(1000000)] {
            let tax = compute_self_employment_tax(income, &rates());

            assert_eq!(tax.total, tax.social_security + tax.medicare, "income {income}");
        }
    }

    #[test]
    fn large_income_is_not_capped() {
        let tax = compute_self_employment_tax(dec!(1000000), &rates());

        assert_eq!(tax.taxable_base, dec!(923500));
        assert_eq!(tax.social_security, dec!(114514));
        assert_eq!(tax.medicare, dec!(26781.5));
    }

    #[test]
    fn custom_rates_are_applied() {
        let custom = SelfEmploymentRates {
            social_security_rate: dec!(0.10),
            medicare_rate: dec!(0.05),
            net_earnings_factor: dec!(1),
        };

        let tax = compute_self_employment_tax(dec!(2000), &custom);

        assert_eq!(tax.social_security, dec!(200));
        assert_eq!(tax.medicare, dec!(100));
        assert_eq!(tax.total, dec!(300));
    }

    #[test]
    fn negative_income_is_clamped_to_zero() {
        let _guard = init_test_tracing();

        let tax = compute_self_employment_tax(dec!(-5000), &rates());

        assert_eq!(tax, SelfEmploymentTax::default());
    }
}
