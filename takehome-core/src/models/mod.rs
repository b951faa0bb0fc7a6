mod calculation_result;
mod filing_status;
mod salary_input;
mod saved_calculation;
mod state_tax_config;
mod tax_bracket;
mod tax_year_config;

pub use calculation_result::{BreakdownItem, CalculationResult};
pub use filing_status::{ByFilingStatus, FilingStatus};
pub use salary_input::{PayFrequency, PreTaxDeductions, SalaryInput, SalaryPeriod};
pub use saved_calculation::{
    MAX_SAVED_CALCULATIONS, NewSavedCalculation, PreferencesUpdate, SavedCalculation,
    UserPreferences,
};
pub use state_tax_config::{StateInfo, StateTaxConfig, StateTaxRegime, StateTaxType};
pub use tax_bracket::TaxBracket;
pub use tax_year_config::{FederalTaxConfig, FicaConfig, TaxTableError, TaxYearConfig};
