//! Progressive bracket evaluation shared by the federal and state
//! calculators.
//!
//! Brackets are expected in ascending order, contiguous from zero, with
//! an unbounded top bracket (see [`TaxYearConfig::validate`]). Both
//! functions are total: negative income, zero income and empty bracket
//! lists all produce zero rather than an error.
//!
//! [`TaxYearConfig::validate`]: crate::TaxYearConfig::validate

use rust_decimal::Decimal;

use crate::TaxBracket;

/// Tax owed on `income` under a progressive bracket schedule.
///
/// Each bracket taxes the slice of income that falls inside it; the walk
/// stops as soon as all income is consumed. The result is never negative
/// and never decreases as income grows.
///
/// ```
/// use rust_decimal_macros::dec;
/// use takehome_core::TaxBracket;
/// use takehome_core::calculations::progressive_tax;
///
/// let brackets = vec![
///     TaxBracket::new(dec!(0), Some(dec!(11600)), dec!(0.10)),
///     TaxBracket::new(dec!(11600), Some(dec!(47150)), dec!(0.12)),
///     TaxBracket::new(dec!(47150), None, dec!(0.22)),
/// ];
///
/// // 1160 + 4266 + 2904.50
/// assert_eq!(progressive_tax(dec!(60400), &brackets), dec!(8330.50));
/// ```
pub fn progressive_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut remaining = income;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let taxable_in_bracket = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        tax += taxable_in_bracket * bracket.rate;
        remaining -= taxable_in_bracket;
    }

    tax
}

/// Rate applied to the next dollar of `income`.
///
/// This is the rate of the first bracket whose upper bound is at or above
/// `income`, or the top bracket's rate when income exceeds every bound.
/// Zero income, and an empty schedule, have a marginal rate of zero.
pub fn marginal_rate(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    brackets
        .iter()
        .find(|bracket| bracket.max_income.is_none_or(|max| income <= max))
        .or_else(|| brackets.last())
        .map_or(Decimal::ZERO, |bracket| bracket.rate)
}
