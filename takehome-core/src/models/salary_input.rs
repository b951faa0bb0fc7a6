use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// The period the gross salary figure is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    #[default]
    Annual,
    Monthly,
    Hourly,
}

impl SalaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Monthly => "monthly",
            Self::Hourly => "hourly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "yearly" => Some(Self::Annual),
            "monthly" => Some(Self::Monthly),
            "hourly" => Some(Self::Hourly),
            _ => None,
        }
    }
}

/// How often the employee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    Weekly,
    #[default]
    Biweekly,
    Semimonthly,
    Monthly,
    Annual,
}

impl PayFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "semimonthly" => Some(Self::Semimonthly),
            "monthly" => Some(Self::Monthly),
            "annual" | "yearly" => Some(Self::Annual),
            _ => None,
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Biweekly => 26,
            Self::Semimonthly => 24,
            Self::Monthly => 12,
            Self::Annual => 1,
        }
    }
}

/// Annual pre-tax deductions.
///
/// Statutory contribution limits are the caller's responsibility; the
/// engine uses the amounts as given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreTaxDeductions {
    pub retirement_401k: Decimal,
    pub hsa: Decimal,
    pub health_insurance: Decimal,
    pub other: Decimal,
}

impl PreTaxDeductions {
    /// Sum of all four fields, with negative entries counted as zero.
    /// Saturates at [`Decimal::MAX`].
    pub fn total(&self) -> Decimal {
        [
            self.retirement_401k,
            self.hsa,
            self.health_insurance,
            self.other,
        ]
        .into_iter()
        .filter(|amount| *amount > Decimal::ZERO)
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
    }
}

/// One take-home pay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInput {
    pub gross_salary: Decimal,
    pub salary_period: SalaryPeriod,
    /// Two-letter state code, e.g. `CA`.
    pub state: String,
    pub filing_status: FilingStatus,
    pub pay_frequency: PayFrequency,
    pub deductions: PreTaxDeductions,
}

impl Default for SalaryInput {
    fn default() -> Self {
        Self {
            gross_salary: Decimal::from(75_000),
            salary_period: SalaryPeriod::Annual,
            state: "CA".to_string(),
            filing_status: FilingStatus::Single,
            pay_frequency: PayFrequency::Biweekly,
            deductions: PreTaxDeductions::default(),
        }
    }
}
