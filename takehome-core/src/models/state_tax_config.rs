use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ByFilingStatus, TaxBracket};

/// The shape of a state's income tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTaxType {
    None,
    Flat,
    Progressive,
}

impl StateTaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Flat => "flat",
            Self::Progressive => "progressive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "flat" => Some(Self::Flat),
            "progressive" => Some(Self::Progressive),
            _ => None,
        }
    }
}

/// How a state taxes wage income, with the data each regime needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateTaxRegime {
    None,
    Flat {
        rate: Decimal,
    },
    Progressive {
        brackets: ByFilingStatus<Vec<TaxBracket>>,
    },
}

impl StateTaxRegime {
    pub fn tax_type(&self) -> StateTaxType {
        match self {
            Self::None => StateTaxType::None,
            Self::Flat { .. } => StateTaxType::Flat,
            Self::Progressive { .. } => StateTaxType::Progressive,
        }
    }
}

/// Reference data for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxConfig {
    pub code: String,
    pub name: String,
    pub regime: StateTaxRegime,
    /// State standard deduction, applied on top of the federal one.
    pub standard_deduction: Option<ByFilingStatus<Decimal>>,
}

/// Summary of a state for listings and pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub code: String,
    pub name: String,
    pub has_income_tax: bool,
    pub tax_type: StateTaxType,
}

impl From<&StateTaxConfig> for StateInfo {
    fn from(config: &StateTaxConfig) -> Self {
        let tax_type = config.regime.tax_type();
        Self {
            code: config.code.clone(),
            name: config.name.clone(),
            has_income_tax: tax_type != StateTaxType::None,
            tax_type,
        }
    }
}
