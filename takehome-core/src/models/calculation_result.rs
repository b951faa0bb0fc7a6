use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayFrequency;

/// A named line in the result breakdown.
///
/// Tax lines carry a positive `amount`; pre-tax deduction lines carry a
/// negative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub name: String,
    pub amount: Decimal,
    pub rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BreakdownItem {
    pub fn is_deduction(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

/// Output of one take-home pay calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub gross_annual: Decimal,
    pub adjusted_gross_income: Decimal,
    /// Federal taxable income (AGI minus the federal standard deduction).
    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub social_security: Decimal,
    /// Medicare including any additional Medicare tax.
    pub medicare: Decimal,
    pub total_tax: Decimal,
    pub total_deductions: Decimal,
    pub net_annual: Decimal,
    pub net_monthly: Decimal,
    pub net_biweekly: Decimal,
    pub net_weekly: Decimal,
    pub effective_tax_rate: Decimal,
    /// Federal marginal rate.
    pub marginal_tax_rate: Decimal,
    pub breakdown: Vec<BreakdownItem>,
}

impl CalculationResult {
    /// Net pay for a single paycheck at the given frequency.
    pub fn net_per_pay_period(
        &self,
        frequency: PayFrequency,
    ) -> Decimal {
        self.net_annual / Decimal::from(frequency.periods_per_year())
    }

    pub fn fica_total(&self) -> Decimal {
        self.social_security + self.medicare
    }

    pub fn tax_lines(&self) -> impl Iterator<Item = &BreakdownItem> {
        self.breakdown.iter().filter(|item| !item.is_deduction())
    }

    pub fn deduction_lines(&self) -> impl Iterator<Item = &BreakdownItem> {
        self.breakdown.iter().filter(|item| item.is_deduction())
    }
}
