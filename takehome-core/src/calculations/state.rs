//! State income tax dispatch over the per-state regime table.
//!
//! Each state is one of three regimes: no wage tax, a flat rate, or a
//! progressive bracket schedule by filing status. A state may also carry
//! its own standard deduction, subtracted from the income handed in before
//! any rate is applied.
//!
//! Unknown state codes are not an error: they are logged and produce zero
//! tax. Callers that need strict validation check [`StateTaxResolver::is_known_state`]
//! first.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::brackets::progressive_tax;
use crate::calculations::common::{max, ratio};
use crate::{FilingStatus, StateInfo, StateTaxConfig, StateTaxRegime, StateTaxType};

/// State tax owed and its rate against the income handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateTaxResult {
    pub tax: Decimal,
    pub effective_rate: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct StateTaxResolver<'a> {
    states: &'a BTreeMap<String, StateTaxConfig>,
}

impl<'a> StateTaxResolver<'a> {
    pub fn new(states: &'a BTreeMap<String, StateTaxConfig>) -> Self {
        Self { states }
    }

    /// Looks up a state by code, ignoring case and surrounding whitespace.
    pub fn state(
        &self,
        code: &str,
    ) -> Option<&'a StateTaxConfig> {
        let code = code.trim();
        self.states
            .get(code)
            .or_else(|| self.states.get(&code.to_ascii_uppercase()))
    }

    pub fn is_known_state(
        &self,
        code: &str,
    ) -> bool {
        self.state(code).is_some()
    }

    /// All configured states, ordered by code.
    pub fn states(&self) -> Vec<StateInfo> {
        self.states.values().map(StateInfo::from).collect()
    }

    /// Regime of a state. Unknown codes report [`StateTaxType::None`].
    pub fn state_tax_type(
        &self,
        code: &str,
    ) -> StateTaxType {
        self.state(code)
            .map_or(StateTaxType::None, |state| state.regime.tax_type())
    }

    /// Rate of a flat-tax state, `None` for every other regime.
    pub fn flat_rate(
        &self,
        code: &str,
    ) -> Option<Decimal> {
        match self.state(code).map(|state| &state.regime) {
            Some(StateTaxRegime::Flat { rate }) => Some(*rate),
            _ => None,
        }
    }

    /// Computes state tax on `taxable_income`.
    ///
    /// The state's own standard deduction, if any, is subtracted (floored at
    /// zero) before the regime's rate or brackets apply. The effective rate
    /// is measured against the income as passed in.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
        code: &str,
        filing_status: FilingStatus,
    ) -> StateTaxResult {
        let Some(state) = self.state(code) else {
            warn!(state = code, "Unknown state code, applying no state income tax");
            return StateTaxResult::default();
        };

        let deduction = state
            .standard_deduction
            .as_ref()
            .map_or(Decimal::ZERO, |deduction| *deduction.get(filing_status));
        let adjusted_income = max(taxable_income - deduction, Decimal::ZERO);

        let tax = match &state.regime {
            StateTaxRegime::None => Decimal::ZERO,
            StateTaxRegime::Flat { rate } => adjusted_income * rate,
            StateTaxRegime::Progressive { brackets } => {
                progressive_tax(adjusted_income, brackets.get(filing_status))
            }
        };

        StateTaxResult {
            tax,
            effective_rate: ratio(tax, taxable_income),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::test_support::tax_year_2024;

    // =========================================================================
    // Regime dispatch tests
    // =========================================================================

    #[test]
    fn progressive_state_applies_own_deduction_then_brackets() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        // 60400 - 5363 = 55037 through CA single brackets
        let result = resolver.calculate(dec!(60400), "CA", FilingStatus::Single);

        assert_eq!(result.tax, dec!(1944.36));
        assert_eq!(result.effective_rate, dec!(1944.36) / dec!(60400));
    }

    #[test]
    fn flat_state_applies_rate_to_whole_income() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        let result = resolver.calculate(dec!(60400), "IL", FilingStatus::Single);

        assert_eq!(result.tax, dec!(2989.80));
    }

    #[test]
    fn no_tax_state_yields_zero() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        let result = resolver.calculate(dec!(500000), "TX", FilingStatus::Married);

        assert_eq!(result, StateTaxResult::default());
    }

    #[test]
    fn unknown_state_yields_zero() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        let result = resolver.calculate(dec!(80000), "ZZ", FilingStatus::Single);

        assert_eq!(result, StateTaxResult::default());
    }

    #[test]
    fn state_deduction_larger_than_income_yields_zero() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        let result = resolver.calculate(dec!(4000), "CA", FilingStatus::Single);

        assert_eq!(result.tax, Decimal::ZERO);
        assert_eq!(result.effective_rate, Decimal::ZERO);
    }

    #[test]
    fn zero_income_has_zero_rate() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        let result = resolver.calculate(Decimal::ZERO, "IL", FilingStatus::Single);

        assert_eq!(result, StateTaxResult::default());
    }

    // =========================================================================
    // Lookup tests
    // =========================================================================

    #[test]
    fn lookups_ignore_case_and_whitespace() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        assert!(resolver.is_known_state(" ca "));
        assert_eq!(resolver.state_tax_type("il"), StateTaxType::Flat);
    }

    #[test]
    fn flat_rate_only_for_flat_states() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        assert_eq!(resolver.flat_rate("IL"), Some(dec!(0.0495)));
        assert_eq!(resolver.flat_rate("CA"), None);
        assert_eq!(resolver.flat_rate("TX"), None);
        assert_eq!(resolver.flat_rate("ZZ"), None);
    }

    #[test]
    fn unknown_state_reports_no_tax_type() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        assert!(!resolver.is_known_state("ZZ"));
        assert_eq!(resolver.state_tax_type("ZZ"), StateTaxType::None);
    }

    #[test]
    fn states_lists_info_in_code_order() {
        let config = tax_year_2024();
        let resolver = StateTaxResolver::new(&config.states);

        let codes: Vec<(String, bool)> = resolver
            .states()
            .into_iter()
            .map(|info| (info.code, info.has_income_tax))
            .collect();

        assert_eq!(
            codes,
            vec![
                ("CA".to_string(), true),
                ("IL".to_string(), true),
                ("TX".to_string(), false),
            ]
        );
    }
}
