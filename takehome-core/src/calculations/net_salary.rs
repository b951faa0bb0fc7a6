//! Take-home pay: the composition of the federal, FICA and state
//! calculators over one [`SalaryInput`].
//!
//! # Calculation Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Annualize the gross salary from its quoted period |
//! | 2    | Total the pre-tax deductions |
//! | 3    | AGI: gross minus deductions, minimum 0 |
//! | 4    | Federal income tax on gross with the deduction total |
//! | 5    | FICA on gross (not AGI) |
//! | 6    | State base: AGI minus the federal standard deduction, minimum 0 |
//! | 7    | State tax on the state base |
//! | 8    | Total tax: federal + state + FICA |
//! | 9    | Net: gross minus total tax minus deductions |
//! | 10   | Effective rate: total tax over gross |
//! | 11   | Net per month, two weeks and week (fixed divisors 12, 26, 52) |
//! | 12   | Breakdown lines: four tax lines, then one per nonzero deduction |
//!
//! Step 6 hands the state resolver a base that already has the federal
//! standard deduction removed; states with their own standard deduction
//! then subtract it as well, so those states see two standard deductions.
//!
//! No input makes the calculation fail. Negative gross salaries are
//! treated as zero and unknown states pay no state tax.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use takehome_core::calculations::NetSalaryCalculator;
//! use takehome_core::{
//!     ByFilingStatus, FederalTaxConfig, FicaConfig, SalaryInput, TaxBracket, TaxYearConfig,
//! };
//!
//! let brackets = vec![TaxBracket::new(dec!(0), None, dec!(0.10))];
//! let config = TaxYearConfig {
//!     tax_year: 2024,
//!     federal: FederalTaxConfig {
//!         brackets: ByFilingStatus {
//!             single: brackets.clone(),
//!             married: brackets.clone(),
//!             head_of_household: brackets,
//!         },
//!         standard_deduction: ByFilingStatus {
//!             single: dec!(10000),
//!             married: dec!(20000),
//!             head_of_household: dec!(15000),
//!         },
//!     },
//!     fica: FicaConfig {
//!         social_security_rate: dec!(0.062),
//!         social_security_wage_base: dec!(168600),
//!         medicare_rate: dec!(0.0145),
//!         additional_medicare_rate: dec!(0.009),
//!         additional_medicare_threshold: ByFilingStatus {
//!             single: dec!(200000),
//!             married: dec!(250000),
//!             head_of_household: dec!(200000),
//!         },
//!     },
//!     states: Default::default(),
//! };
//!
//! let calculator = NetSalaryCalculator::new(&config);
//! let result = calculator.calculate(&SalaryInput {
//!     gross_salary: dec!(60000),
//!     state: "TX".to_string(),
//!     ..Default::default()
//! });
//!
//! // 5000 federal + 3720 social security + 870 medicare
//! assert_eq!(result.total_tax, dec!(9590));
//! assert_eq!(result.net_annual, dec!(50410));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::calculations::common::{max, ratio};
use crate::calculations::converters::to_annual_salary;
use crate::calculations::federal::{FederalTaxCalculator, FederalTaxResult};
use crate::calculations::fica::{FicaCalculator, FicaResult};
use crate::calculations::state::{StateTaxResolver, StateTaxResult};
use crate::format::{format_currency, format_rate};
use crate::{BreakdownItem, CalculationResult, PreTaxDeductions, SalaryInput, TaxYearConfig};

/// Orchestrates a full take-home pay calculation for one tax year.
#[derive(Debug, Clone, Copy)]
pub struct NetSalaryCalculator<'a> {
    config: &'a TaxYearConfig,
    federal: FederalTaxCalculator<'a>,
    fica: FicaCalculator<'a>,
    state: StateTaxResolver<'a>,
}

impl<'a> NetSalaryCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self {
            config,
            federal: FederalTaxCalculator::new(&config.federal),
            fica: FicaCalculator::new(&config.fica),
            state: StateTaxResolver::new(&config.states),
        }
    }

    pub fn tax_year(&self) -> i32 {
        self.config.tax_year
    }

    pub fn federal(&self) -> &FederalTaxCalculator<'a> {
        &self.federal
    }

    pub fn fica(&self) -> &FicaCalculator<'a> {
        &self.fica
    }

    pub fn state(&self) -> &StateTaxResolver<'a> {
        &self.state
    }

    /// Computes take-home pay for `input`.
    pub fn calculate(
        &self,
        input: &SalaryInput,
    ) -> CalculationResult {
        let gross_annual = max(
            to_annual_salary(input.gross_salary, input.salary_period),
            Decimal::ZERO,
        );
        let total_deductions = input.deductions.total();
        let adjusted_gross_income = max(gross_annual - total_deductions, Decimal::ZERO);

        let federal = self
            .federal
            .calculate(gross_annual, input.filing_status, total_deductions);
        let fica = self.fica.calculate(gross_annual, input.filing_status);

        let state_taxable_income = max(
            adjusted_gross_income - self.federal.standard_deduction(input.filing_status),
            Decimal::ZERO,
        );
        let state = self
            .state
            .calculate(state_taxable_income, &input.state, input.filing_status);

        let total_tax = federal.tax + state.tax + fica.total;
        let net_annual = gross_annual - total_tax - total_deductions;

        debug!(
            gross_annual = %gross_annual,
            state = %input.state,
            filing_status = input.filing_status.as_str(),
            federal_tax = %federal.tax,
            state_tax = %state.tax,
            fica = %fica.total,
            net_annual = %net_annual,
            "Calculated net salary"
        );

        let breakdown = self.breakdown(input, gross_annual, &federal, &state, &fica);

        CalculationResult {
            gross_annual,
            adjusted_gross_income,
            taxable_income: federal.taxable_income,
            federal_tax: federal.tax,
            state_tax: state.tax,
            social_security: fica.social_security,
            medicare: fica.medicare + fica.additional_medicare,
            total_tax,
            total_deductions,
            net_annual,
            net_monthly: net_annual / Decimal::from(12),
            net_biweekly: net_annual / Decimal::from(26),
            net_weekly: net_annual / Decimal::from(52),
            effective_tax_rate: ratio(total_tax, gross_annual),
            marginal_tax_rate: federal.marginal_rate,
            breakdown,
        }
    }

    fn breakdown(
        &self,
        input: &SalaryInput,
        gross_annual: Decimal,
        federal: &FederalTaxResult,
        state: &StateTaxResult,
        fica: &FicaResult,
    ) -> Vec<BreakdownItem> {
        let marginal_percent = (federal.marginal_rate * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let medicare = fica.medicare + fica.additional_medicare;
        let medicare_description = if fica.additional_medicare > Decimal::ZERO {
            format!(
                "{} + {} additional",
                format_rate(self.fica.medicare_rate()),
                format_rate(self.config.fica.additional_medicare_rate)
            )
        } else {
            format_rate(self.fica.medicare_rate())
        };

        let mut breakdown = vec![
            BreakdownItem {
                name: "Federal Income Tax".to_string(),
                amount: federal.tax,
                rate: federal.effective_rate,
                description: Some(format!("Marginal rate: {marginal_percent}%")),
            },
            BreakdownItem {
                name: "State Income Tax".to_string(),
                amount: state.tax,
                rate: state.effective_rate,
                description: Some(format!(
                    "{} - {}",
                    input.state,
                    self.state.state_tax_type(&input.state).as_str()
                )),
            },
            BreakdownItem {
                name: "Social Security".to_string(),
                amount: fica.social_security,
                rate: ratio(fica.social_security, gross_annual),
                description: Some(format!(
                    "{} up to {}",
                    format_rate(self.fica.social_security_rate()),
                    format_currency(self.fica.social_security_wage_base())
                )),
            },
            BreakdownItem {
                name: "Medicare".to_string(),
                amount: medicare,
                rate: ratio(medicare, gross_annual),
                description: Some(medicare_description),
            },
        ];

        breakdown.extend(deduction_lines(&input.deductions));
        breakdown
    }
}

fn deduction_lines(deductions: &PreTaxDeductions) -> impl Iterator<Item = BreakdownItem> {
    [
        (
            deductions.retirement_401k,
            "401(k) Contribution",
            "Pre-tax retirement savings",
        ),
        (deductions.hsa, "HSA Contribution", "Health Savings Account"),
        (
            deductions.health_insurance,
            "Health Insurance",
            "Pre-tax premium",
        ),
        (deductions.other, "Other Deductions", "Other pre-tax deductions"),
    ]
    .into_iter()
    .filter(|(amount, _, _)| *amount > Decimal::ZERO)
    .map(|(amount, name, description)| BreakdownItem {
        name: name.to_string(),
        amount: -amount,
        rate: Decimal::ZERO,
        description: Some(description.to_string()),
    })
}
