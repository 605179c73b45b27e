use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::tables::TaxTableError;

/// Self-employment tax rates for one tax year.
///
/// Social security and Medicare rates are the combined employer and employee
/// portions. Only `net_earnings_factor` of raw self-employment income is
/// subject to the tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEmploymentRates {
    /// Typically 12.4%.
    pub social_security_rate: Decimal,

    /// Typically 2.9%.
    pub medicare_rate: Decimal,

    /// Typically 92.35%.
    pub net_earnings_factor: Decimal,
}

impl SelfEmploymentRates {
    /// Social security plus Medicare.
    pub fn total_rate(&self) -> Decimal {
        self.social_security_rate + self.medicare_rate
    }

    /// Returns an error if any value is outside its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`TaxTableError`] if:
    /// - `social_security_rate` is not in [0, 1]
    /// - `medicare_rate` is not in [0, 1]
    /// - `net_earnings_factor` is not in (0, 1]
    pub fn validate(&self) -> Result<(), TaxTableError> {
        if self.social_security_rate < Decimal::ZERO || self.social_security_rate > Decimal::ONE {
            return Err(TaxTableError::InvalidSocialSecurityRate(
                self.social_security_rate,
            ));
        }
        if self.medicare_rate < Decimal::ZERO || self.medicare_rate > Decimal::ONE {
            return Err(TaxTableError::InvalidMedicareRate(self.medicare_rate));
        }
        if self.net_earnings_factor <= Decimal::ZERO || self.net_earnings_factor > Decimal::ONE {
            return Err(TaxTableError::InvalidNetEarningsFactor(
                self.net_earnings_factor,
            ));
        }
        Ok(())
    }
}

impl Default for SelfEmploymentRates {
    fn default() -> Self {
        Self {
            social_security_rate: dec!(0.124),
            medicare_rate: dec!(0.029),
            net_earnings_factor: dec!(0.9235),
        }
    }
}
