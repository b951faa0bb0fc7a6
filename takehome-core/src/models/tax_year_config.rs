use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ByFilingStatus, FilingStatus, StateTaxConfig, StateTaxRegime, TaxBracket};

/// Reference data that fails the bracket or rate invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTableError {
    #[error("{table}: bracket list for {status:?} is empty")]
    EmptyBrackets {
        table: String,
        status: FilingStatus,
    },

    #[error("{table}: first bracket for {status:?} starts at {min} instead of 0")]
    BracketsNotFromZero {
        table: String,
        status: FilingStatus,
        min: Decimal,
    },

    #[error("{table}: bracket {index} for {status:?} does not start where the previous one ends")]
    BracketGap {
        table: String,
        status: FilingStatus,
        index: usize,
    },

    #[error("{table}: bracket {index} for {status:?} has max not above min")]
    EmptyBracketRange {
        table: String,
        status: FilingStatus,
        index: usize,
    },

    #[error("{table}: last bracket for {status:?} must be unbounded")]
    TopBracketBounded {
        table: String,
        status: FilingStatus,
    },

    #[error("{table}: rate must be between 0 and 1, got {rate}")]
    InvalidRate { table: String, rate: Decimal },

    #[error("{table}: amount must be non-negative, got {amount}")]
    NegativeAmount { table: String, amount: Decimal },

    #[error("social security wage base must be positive, got {0}")]
    InvalidWageBase(Decimal),

    #[error("state table key {key} does not match config code {code}")]
    StateCodeMismatch { key: String, code: String },
}

/// Federal income tax tables for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxConfig {
    pub brackets: ByFilingStatus<Vec<TaxBracket>>,
    pub standard_deduction: ByFilingStatus<Decimal>,
}

/// Payroll tax constants for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaConfig {
    /// Employee share of Social Security, e.g. 6.2%.
    pub social_security_rate: Decimal,
    /// Earnings ceiling for Social Security. Independent of filing status.
    pub social_security_wage_base: Decimal,
    /// Employee share of Medicare, e.g. 1.45%. Uncapped.
    pub medicare_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: ByFilingStatus<Decimal>,
}

/// Every constant the engine consults, for a single tax year.
///
/// Callers swap the whole value to support a different year; the
/// calculators never reach for global data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub federal: FederalTaxConfig,
    pub fica: FicaConfig,
    /// Keyed by upper-case state code.
    pub states: BTreeMap<String, StateTaxConfig>,
}

impl TaxYearConfig {
    /// Checks the structural invariants of every table.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxTableError`] found.
    pub fn validate(&self) -> Result<(), TaxTableError> {
        validate_bracket_table("federal", &self.federal.brackets)?;
        validate_amounts("federal standard deduction", &self.federal.standard_deduction)?;

        let fica = &self.fica;
        for rate in [
            fica.social_security_rate,
            fica.medicare_rate,
            fica.additional_medicare_rate,
        ] {
            validate_rate("fica", rate)?;
        }
        if fica.social_security_wage_base <= Decimal::ZERO {
            return Err(TaxTableError::InvalidWageBase(
                fica.social_security_wage_base,
            ));
        }
        validate_amounts(
            "additional medicare threshold",
            &fica.additional_medicare_threshold,
        )?;

        for (key, state) in &self.states {
            if *key != state.code {
                return Err(TaxTableError::StateCodeMismatch {
                    key: key.clone(),
                    code: state.code.clone(),
                });
            }
            match &state.regime {
                StateTaxRegime::None => {}
                StateTaxRegime::Flat { rate } => validate_rate(&state.code, *rate)?,
                StateTaxRegime::Progressive { brackets } => {
                    validate_bracket_table(&state.code, brackets)?
                }
            }
            if let Some(deduction) = &state.standard_deduction {
                validate_amounts(&state.code, deduction)?;
            }
        }

        Ok(())
    }
}

fn validate_rate(
    table: &str,
    rate: Decimal,
) -> Result<(), TaxTableError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(TaxTableError::InvalidRate {
            table: table.to_string(),
            rate,
        });
    }
    Ok(())
}

fn validate_amounts(
    table: &str,
    amounts: &ByFilingStatus<Decimal>,
) -> Result<(), TaxTableError> {
    match amounts.iter().find(|(_, amount)| **amount < Decimal::ZERO) {
        Some((_, amount)) => Err(TaxTableError::NegativeAmount {
            table: table.to_string(),
            amount: *amount,
        }),
        None => Ok(()),
    }
}

fn validate_bracket_table(
    table: &str,
    brackets: &ByFilingStatus<Vec<TaxBracket>>,
) -> Result<(), TaxTableError> {
    for (status, list) in brackets.iter() {
        validate_brackets(table, status, list)?;
    }
    Ok(())
}

/// Brackets must start at zero, be contiguous and ascending, and end with
/// a single unbounded bracket.
fn validate_brackets(
    table: &str,
    status: FilingStatus,
    brackets: &[TaxBracket],
) -> Result<(), TaxTableError> {
    let Some(first) = brackets.first() else {
        return Err(TaxTableError::EmptyBrackets {
            table: table.to_string(),
            status,
        });
    };
    if first.min_income != Decimal::ZERO {
        return Err(TaxTableError::BracketsNotFromZero {
            table: table.to_string(),
            status,
            min: first.min_income,
        });
    }

    let last = brackets.len() - 1;
    for (index, bracket) in brackets.iter().enumerate() {
        validate_rate(table, bracket.rate)?;

        match bracket.max_income {
            Some(max) if max <= bracket.min_income => {
                return Err(TaxTableError::EmptyBracketRange {
                    table: table.to_string(),
                    status,
                    index,
                });
            }
            Some(_) if index == last => {
                return Err(TaxTableError::TopBracketBounded {
                    table: table.to_string(),
                    status,
                });
            }
            None if index != last => {
                return Err(TaxTableError::BracketGap {
                    table: table.to_string(),
                    status,
                    index: index + 1,
                });
            }
            _ => {}
        }

        if index > 0 && brackets[index - 1].max_income != Some(bracket.min_income) {
            return Err(TaxTableError::BracketGap {
                table: table.to_string(),
                status,
                index,
            });
        }
    }

    Ok(())
}
