//! Federal income tax on wage income.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Adjusted gross income: gross minus pre-tax deductions, minimum 0 |
//! | 2    | Taxable income: AGI minus the standard deduction, minimum 0 |
//! | 3    | Tax from the filing status's bracket schedule |
//! | 4    | Marginal rate at the taxable income |
//! | 5    | Effective rate: tax divided by gross (0 when gross is not positive) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use takehome_core::calculations::FederalTaxCalculator;
//! use takehome_core::{ByFilingStatus, FederalTaxConfig, FilingStatus, TaxBracket};
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), Some(dec!(11600)), dec!(0.10)),
//!     TaxBracket::new(dec!(11600), Some(dec!(47150)), dec!(0.12)),
//!     TaxBracket::new(dec!(47150), None, dec!(0.22)),
//! ];
//! let config = FederalTaxConfig {
//!     brackets: ByFilingStatus {
//!         single: brackets.clone(),
//!         married: brackets.clone(),
//!         head_of_household: brackets,
//!     },
//!     standard_deduction: ByFilingStatus {
//!         single: dec!(14600),
//!         married: dec!(29200),
//!         head_of_household: dec!(21900),
//!     },
//! };
//!
//! let calculator = FederalTaxCalculator::new(&config);
//! let result = calculator.calculate(dec!(75000), FilingStatus::Single, dec!(0));
//!
//! assert_eq!(result.taxable_income, dec!(60400));
//! assert_eq!(result.tax, dec!(8330.50));
//! assert_eq!(result.marginal_rate, dec!(0.22));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::brackets::{marginal_rate, progressive_tax};
use crate::calculations::common::{max, ratio};
use crate::{FederalTaxConfig, FilingStatus, TaxBracket};

/// Result of a federal income tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxResult {
    /// Federal income tax owed.
    pub tax: Decimal,

    /// Income the brackets were applied to.
    pub taxable_income: Decimal,

    /// Rate on the next dollar of taxable income.
    pub marginal_rate: Decimal,

    /// Tax as a share of gross income.
    pub effective_rate: Decimal,
}

/// Calculator for federal income tax.
///
/// Borrows the year's federal tables; construct one per [`FederalTaxConfig`]
/// and reuse it across calculations.
#[derive(Debug, Clone, Copy)]
pub struct FederalTaxCalculator<'a> {
    config: &'a FederalTaxConfig,
}

impl<'a> FederalTaxCalculator<'a> {
    pub fn new(config: &'a FederalTaxConfig) -> Self {
        Self { config }
    }

    /// Bracket schedule for a filing status.
    pub fn brackets(
        &self,
        filing_status: FilingStatus,
    ) -> &'a [TaxBracket] {
        self.config.brackets.get(filing_status)
    }

    pub fn standard_deduction(
        &self,
        filing_status: FilingStatus,
    ) -> Decimal {
        *self.config.standard_deduction.get(filing_status)
    }

    /// Computes federal income tax for a year of wages.
    ///
    /// `pre_tax_deductions` is the annual total of pre-tax payroll
    /// deductions. Negative or zero gross income yields zero tax.
    pub fn calculate(
        &self,
        gross_income: Decimal,
        filing_status: FilingStatus,
        pre_tax_deductions: Decimal,
    ) -> FederalTaxResult {
        let adjusted_gross_income = max(gross_income - pre_tax_deductions, Decimal::ZERO);
        let taxable_income = max(
            adjusted_gross_income - self.standard_deduction(filing_status),
            Decimal::ZERO,
        );

        let brackets = self.brackets(filing_status);
        let tax = progressive_tax(taxable_income, brackets);

        FederalTaxResult {
            tax,
            taxable_income,
            marginal_rate: marginal_rate(taxable_income, brackets),
            effective_rate: ratio(tax, gross_income),
        }
    }
}
