//! Conversions between salary periods and pay frequencies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PayFrequency, SalaryPeriod};

/// Full-time hours in a year (40 hours over 52 weeks).
pub const HOURS_PER_YEAR: u32 = 2080;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Working days in a year, used for the daily figure.
pub const WORKING_DAYS_PER_YEAR: u32 = 260;

fn periods_in_year(period: SalaryPeriod) -> Decimal {
    match period {
        SalaryPeriod::Annual => Decimal::ONE,
        SalaryPeriod::Monthly => Decimal::from(MONTHS_PER_YEAR),
        SalaryPeriod::Hourly => Decimal::from(HOURS_PER_YEAR),
    }
}

/// Annualizes an amount quoted per `period`.
///
/// Saturates at [`Decimal::MAX`] / [`Decimal::MIN`] instead of overflowing.
///
/// ```
/// use rust_decimal_macros::dec;
/// use takehome_core::SalaryPeriod;
/// use takehome_core::calculations::to_annual_salary;
///
/// assert_eq!(to_annual_salary(dec!(50), SalaryPeriod::Hourly), dec!(104000));
/// assert_eq!(to_annual_salary(dec!(6000), SalaryPeriod::Monthly), dec!(72000));
/// ```
pub fn to_annual_salary(
    amount: Decimal,
    period: SalaryPeriod,
) -> Decimal {
    amount.saturating_mul(periods_in_year(period))
}

/// Inverse of [`to_annual_salary`].
pub fn from_annual_salary(
    annual: Decimal,
    period: SalaryPeriod,
) -> Decimal {
    annual / periods_in_year(period)
}

/// Amount of each paycheck when `annual` is paid at `frequency`.
pub fn to_pay_period_amount(
    annual: Decimal,
    frequency: PayFrequency,
) -> Decimal {
    annual / Decimal::from(frequency.periods_per_year())
}

/// An annual amount spread over the common calendar periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBreakdown {
    pub annual: Decimal,
    pub monthly: Decimal,
    pub biweekly: Decimal,
    pub weekly: Decimal,
    pub daily: Decimal,
}

impl PeriodBreakdown {
    pub fn from_annual(annual: Decimal) -> Self {
        Self {
            annual,
            monthly: annual / Decimal::from(MONTHS_PER_YEAR),
            biweekly: to_pay_period_amount(annual, PayFrequency::Biweekly),
            weekly: to_pay_period_amount(annual, PayFrequency::Weekly),
            daily: annual / Decimal::from(WORKING_DAYS_PER_YEAR),
        }
    }
}
