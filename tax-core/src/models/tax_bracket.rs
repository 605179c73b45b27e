use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tables::TaxTableError;

/// A marginal rate and the upper income limit it applies up to.
///
/// `limit` is `None` for the top bracket, which has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub rate: Decimal,
    pub limit: Option<Decimal>,
}

impl TaxBracket {
    pub fn bounded(
        rate: Decimal,
        limit: Decimal,
    ) -> Self {
        Self {
            rate,
            limit: Some(limit),
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self { rate, limit: None }
    }
}

/// An ordered, gap-free set of brackets covering income from zero upward.
///
/// Construction through [`BracketTable::new`] guarantees that:
/// - there is at least one bracket
/// - every rate is within [0, 1] and rates never decrease
/// - finite limits are positive and strictly increasing
/// - exactly the last bracket is unbounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates and wraps an ordered list of brackets.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::{BracketTable, TaxBracket};
    ///
    /// let table = BracketTable::new(vec![
    ///     TaxBracket::bounded(dec!(0.10), dec!(11600)),
    ///     TaxBracket::unbounded(dec!(0.12)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.top_rate(), dec!(0.12));
    /// ```
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, TaxTableError> {
        Self::validate(&brackets)?;
        Ok(Self { brackets })
    }

    /// Wraps brackets that are known to be valid (the built-in tables).
    pub(crate) fn from_validated(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }

    pub fn validate(brackets: &[TaxBracket]) -> Result<(), TaxTableError> {
        let Some(last_index) = brackets.len().checked_sub(1) else {
            return Err(TaxTableError::EmptyBracketTable);
        };

        let mut previous_rate: Option<Decimal> = None;
        let mut previous_limit = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(TaxTableError::InvalidBracketRate(bracket.rate));
            }
            if let Some(previous) = previous_rate {
                if bracket.rate < previous {
                    return Err(TaxTableError::DecreasingBracketRate {
                        previous,
                        rate: bracket.rate,
                    });
                }
            }
            previous_rate = Some(bracket.rate);

            match bracket.limit {
                Some(limit) => {
                    if index == last_index {
                        return Err(TaxTableError::MissingUnboundedBracket);
                    }
                    if limit <= previous_limit {
                        return Err(TaxTableError::NonIncreasingBracketLimit {
                            previous: previous_limit,
                            limit,
                        });
                    }
                    previous_limit = limit;
                }
                None if index != last_index => {
                    return Err(TaxTableError::UnboundedBracketNotLast { index });
                }
                None => {}
            }
        }

        Ok(())
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Rate of the unbounded top bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets
            .last()
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Rate that applies to the next dollar earned above `taxable_income`.
    ///
    /// Income sitting exactly on a limit is taxed at the following bracket's
    /// rate for its next dollar.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .find(|b| b.limit.is_none_or(|limit| taxable_income < limit))
            .map(|b| b.rate)
            .unwrap_or_else(|| self.top_rate())
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = TaxTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}
