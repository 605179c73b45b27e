//! Marginal-bracket federal tax.
//!
//! Taxable income is split into slices, one per bracket, starting from the
//! lowest rate. Each slice is taxed at its own bracket's rate only.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{compute_bracket_breakdown, total_bracket_tax};
//! use tax_core::{BracketTable, TaxBracket};
//!
//! let table = BracketTable::new(vec![
//!     TaxBracket::bounded(dec!(0.10), dec!(11600)),
//!     TaxBracket::bounded(dec!(0.12), dec!(47150)),
//!     TaxBracket::unbounded(dec!(0.22)),
//! ])
//! .unwrap();
//!
//! let breakdown = compute_bracket_breakdown(dec!(35400), &table);
//!
//! assert_eq!(breakdown.len(), 2);
//! assert_eq!(breakdown[1].amount, dec!(23800));
//! assert_eq!(total_bracket_tax(&breakdown), dec!(4016.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::BracketTable;

/// The part of taxable income that falls in one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// Marginal rate of the bracket.
    pub rate: Decimal,

    /// Income taxed at `rate`.
    pub amount: Decimal,

    /// `amount × rate`.
    pub tax: Decimal,
}

/// Splits `taxable_income` across the brackets of `table`.
///
/// Slices are returned lowest rate first. Brackets the income never reaches
/// are left out, so zero (or negative) income yields an empty breakdown.
/// The slice amounts add up to `taxable_income` exactly.
pub fn compute_bracket_breakdown(
    taxable_income: Decimal,
    table: &BracketTable,
) -> Vec<BracketSlice> {
    let mut remaining = taxable_income;
    let mut previous_limit = Decimal::ZERO;
    let mut breakdown = Vec::new();

    for bracket in table.brackets() {
        let available = remaining.max(Decimal::ZERO);
        let amount = match bracket.limit {
            Some(limit) => available.min(limit - previous_limit),
            None => available,
        };

        if amount <= Decimal::ZERO {
            break;
        }

        breakdown.push(BracketSlice {
            rate: bracket.rate,
            amount,
            tax: amount * bracket.rate,
        });

        remaining -= amount;
        match bracket.limit {
            Some(limit) => previous_limit = limit,
            None => break,
        }
    }

    debug!(
        taxable_income = %taxable_income,
        brackets_used = breakdown.len(),
        "bracket breakdown computed"
    );

    breakdown
}

/// Sum of the per-bracket tax.
pub fn total_bracket_tax(breakdown: &[BracketSlice]) -> Decimal {
    breakdown.iter().map(|slice| slice.tax).sum()
}
