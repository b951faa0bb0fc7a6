//! Rounding, clamping and safe division shared by the calculators.

use rust_decimal::Decimal;

/// Rounds to cents using half-up rounding (midpoint away from zero).
///
/// The engine never rounds intermediate values; this is for presenting
/// final figures.
///
/// ```
/// use rust_decimal_macros::dec;
/// use takehome_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1087.505)), dec!(1087.51));
/// assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two amounts. Used as the floor-at-zero clamp:
/// `max(x, Decimal::ZERO)`.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use takehome_core::calculations::common::max;
///
/// assert_eq!(max(dec!(-14600), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Divides `numerator` by `denominator`, returning zero when the
/// denominator is not positive.
///
/// Every rate the engine reports goes through here, so zero or negative
/// income yields a zero rate instead of a division error.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use takehome_core::calculations::common::ratio;
///
/// assert_eq!(ratio(dec!(25), dec!(100)), dec!(0.25));
/// assert_eq!(ratio(dec!(25), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(2312.125));

        assert_eq!(result, dec!(2312.13));
    }

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(2312.124));

        assert_eq!(result, dec!(2312.12));
    }

    #[test]
    fn round_half_up_handles_long_quotients() {
        // 60000 / 26 = 2307.692307...
        let result = round_half_up(dec!(60000) / dec!(26));

        assert_eq!(result, dec!(2307.69));
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_clamps_negative_to_zero() {
        let result = max(dec!(-500.00), Decimal::ZERO);

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn max_keeps_positive_value() {
        let result = max(dec!(60400.00), Decimal::ZERO);

        assert_eq!(result, dec!(60400.00));
    }

    // =========================================================================
    // ratio tests
    // =========================================================================

    #[test]
    fn ratio_divides_positive_denominator() {
        let result = ratio(dec!(4650.00), dec!(75000.00));

        assert_eq!(result, dec!(0.062));
    }

    #[test]
    fn ratio_returns_zero_for_zero_denominator() {
        let result = ratio(dec!(100.00), dec!(0.00));

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn ratio_returns_zero_for_negative_denominator() {
        let result = ratio(dec!(100.00), dec!(-10.00));

        assert_eq!(result, Decimal::ZERO);
    }
}
