//! Employee-side FICA payroll taxes.
//!
//! FICA is levied on gross wages, before pre-tax deductions:
//!
//! - Social Security: gross up to the wage base, times the Social Security rate.
//! - Medicare: all gross, times the Medicare rate.
//! - Additional Medicare: gross above the filing status threshold, times the
//!   additional rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::max;
use crate::{FicaConfig, FilingStatus};

/// FICA components for one year of wages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaResult {
    pub social_security: Decimal,
    /// Base Medicare only; see `additional_medicare`.
    pub medicare: Decimal,
    pub additional_medicare: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct FicaCalculator<'a> {
    config: &'a FicaConfig,
}

impl<'a> FicaCalculator<'a> {
    pub fn new(config: &'a FicaConfig) -> Self {
        Self { config }
    }

    pub fn social_security_rate(&self) -> Decimal {
        self.config.social_security_rate
    }

    pub fn social_security_wage_base(&self) -> Decimal {
        self.config.social_security_wage_base
    }

    pub fn medicare_rate(&self) -> Decimal {
        self.config.medicare_rate
    }

    pub fn additional_medicare_threshold(
        &self,
        filing_status: FilingStatus,
    ) -> Decimal {
        *self.config.additional_medicare_threshold.get(filing_status)
    }

    /// Computes FICA on `gross_income`. Negative income is treated as zero.
    pub fn calculate(
        &self,
        gross_income: Decimal,
        filing_status: FilingStatus,
    ) -> FicaResult {
        let gross = max(gross_income, Decimal::ZERO);
        let config = self.config;

        let social_security =
            gross.min(config.social_security_wage_base) * config.social_security_rate;
        let medicare = gross * config.medicare_rate;
        let additional_medicare = max(
            gross - self.additional_medicare_threshold(filing_status),
            Decimal::ZERO,
        ) * config.additional_medicare_rate;

        FicaResult {
            social_security,
            medicare,
            additional_medicare,
            total: social_security + medicare + additional_medicare,
        }
    }
}
