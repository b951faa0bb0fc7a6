//! Side-by-side comparison of two take-home pay results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CalculationResult;
use crate::calculations::common::ratio;

/// Which scenario leaves more net pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    First,
    Second,
    Equal,
}

/// Differences between two results, always measured as second minus first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub net_difference: Decimal,
    pub monthly_net_difference: Decimal,
    /// Net difference relative to the first scenario's net pay. Zero when
    /// the first scenario's net pay is not positive.
    pub net_percent_difference: Decimal,
    pub tax_difference: Decimal,
    pub effective_rate_difference: Decimal,
    pub preferred: Preference,
}

/// Compares scenario `second` against scenario `first`.
pub fn compare(
    first: &CalculationResult,
    second: &CalculationResult,
) -> ComparisonSummary {
    let net_difference = second.net_annual - first.net_annual;

    let preferred = match net_difference.cmp(&Decimal::ZERO) {
        std::cmp::Ordering::Greater => Preference::Second,
        std::cmp::Ordering::Less => Preference::First,
        std::cmp::Ordering::Equal => Preference::Equal,
    };

    ComparisonSummary {
        net_difference,
        monthly_net_difference: net_difference / Decimal::from(12),
        net_percent_difference: ratio(net_difference, first.net_annual),
        tax_difference: second.total_tax - first.total_tax,
        effective_rate_difference: second.effective_tax_rate - first.effective_tax_rate,
        preferred,
    }
}
