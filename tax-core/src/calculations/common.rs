//! Small numeric helpers shared by the calculation modules.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, with midpoints rounded away from zero.
///
/// Only used for display-oriented figures; the engine itself keeps full
/// precision so that component sums stay exact.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(154.615)), dec!(154.62));
/// assert_eq!(round_half_up(dec!(154.614)), dec!(154.61));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_to(value, 2)
}

/// Rounds to `dp` decimal places, with midpoints rounded away from zero.
pub fn round_to(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Negative values become zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// `part / whole × 100`, or `None` when `whole` is zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percentage_of;
///
/// assert_eq!(percentage_of(dec!(4016), dec!(50000)), Some(dec!(8.032)));
/// assert_eq!(percentage_of(dec!(10), dec!(0)), None);
/// ```
pub fn percentage_of(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // rounding tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_rounds_negative_midpoint_away_from_zero() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_keeps_already_rounded_values() {
        assert_eq!(round_half_up(dec!(4016.00)), dec!(4016.00));
    }

    #[test]
    fn round_to_one_place() {
        assert_eq!(round_to(dec!(8.032), 1), dec!(8.0));
        assert_eq!(round_to(dec!(8.05), 1), dec!(8.1));
    }

    // =========================================================================
    // non_negative tests
    // =========================================================================

    #[test]
    fn non_negative_clamps_negative_to_zero() {
        assert_eq!(non_negative(dec!(-0.01)), Decimal::ZERO);
    }

    #[test]
    fn non_negative_keeps_positive() {
        assert_eq!(non_negative(dec!(12.5)), dec!(12.5));
    }

    // =========================================================================
    // percentage_of tests
    // =========================================================================

    #[test]
    fn percentage_of_exact_ratio() {
        assert_eq!(percentage_of(dec!(1), dec!(4)), Some(dec!(25)));
    }

    #[test]
    fn percentage_of_negative_part() {
        assert_eq!(percentage_of(dec!(-500), dec!(2000)), Some(dec!(-25)));
    }

    #[test]
    fn percentage_of_zero_whole_is_none() {
        assert_eq!(percentage_of(dec!(0), dec!(0)), None);
    }
}
