use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CalculationResult, FilingStatus, PayFrequency, SalaryInput};

/// Most recent saved calculations kept by a repository; older entries are
/// dropped when a new one is saved.
pub const MAX_SAVED_CALCULATIONS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: i64,
    pub name: String,
    pub input: SalaryInput,
    pub result: CalculationResult,
    pub created_at: DateTime<Utc>,
}

/// For saving new calculations (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedCalculation {
    pub name: String,
    pub input: SalaryInput,
    pub result: CalculationResult,
}

/// Choices remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub last_state: String,
    pub last_filing_status: FilingStatus,
    pub last_pay_frequency: PayFrequency,
    pub advanced_mode: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            last_state: "CA".to_string(),
            last_filing_status: FilingStatus::Single,
            last_pay_frequency: PayFrequency::Biweekly,
            advanced_mode: false,
        }
    }
}

/// A partial change to [`UserPreferences`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    pub last_state: Option<String>,
    pub last_filing_status: Option<FilingStatus>,
    pub last_pay_frequency: Option<PayFrequency>,
    pub advanced_mode: Option<bool>,
}

impl UserPreferences {
    pub fn merge(
        mut self,
        update: PreferencesUpdate,
    ) -> Self {
        if let Some(state) = update.last_state {
            self.last_state = state;
        }
        if let Some(status) = update.last_filing_status {
            self.last_filing_status = status;
        }
        if let Some(frequency) = update.last_pay_frequency {
            self.last_pay_frequency = frequency;
        }
        if let Some(advanced) = update.advanced_mode {
            self.advanced_mode = advanced;
        }
        self
    }
}
