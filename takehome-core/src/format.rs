//! US-style display formatting for amounts and rates.

use rust_decimal::{Decimal, RoundingStrategy};

/// Whole dollars with thousands separators, e.g. `$75,000` or `-$1,088`.
pub fn format_currency(amount: Decimal) -> String {
    format_money(amount, 0)
}

/// Dollars and cents with thousands separators, e.g. `$1,087.50`.
pub fn format_currency_detailed(amount: Decimal) -> String {
    format_money(amount, 2)
}

/// A rate as a percentage with one or two decimals, e.g. `7.65%` or `22.0%`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use takehome_core::format::format_percentage;
///
/// assert_eq!(format_percentage(dec!(0.0765)), "7.65%");
/// assert_eq!(format_percentage(dec!(0.22)), "22.0%");
/// assert_eq!(format_percentage(dec!(0.123456)), "12.35%");
/// ```
pub fn format_percentage(rate: Decimal) -> String {
    let percent = (rate * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if percent.scale() == 0 {
        format!("{percent:.1}%")
    } else {
        format!("{percent}%")
    }
}

/// A statutory rate with no padding, e.g. `6.2%`, `1.45%` or `37%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

fn format_money(
    amount: Decimal,
    decimal_places: u32,
) -> String {
    let rounded =
        amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let text = format!("{:.*}", decimal_places as usize, rounded.abs());
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}
