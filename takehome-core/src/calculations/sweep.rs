//! Evaluates take-home pay across a salary range, for charting how net pay
//! and tax rates change with income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::NetSalaryCalculator;
use crate::{FilingStatus, PreTaxDeductions, SalaryInput};

/// Intervals the range is divided into; a sweep yields one more point.
pub const SWEEP_STEPS: u32 = 20;

/// Extra gross income used to measure the combined marginal rate.
pub const MARGINAL_PROBE: Decimal = Decimal::ONE_THOUSAND;

/// Upper clamp for the measured combined marginal rate.
pub const MAX_COMBINED_MARGINAL_RATE: Decimal = Decimal::from_parts(60, 0, 0, false, 2);

/// One salary in a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub effective_tax_rate: Decimal,
    /// Federal, state and FICA tax on the next dollar, measured over
    /// [`MARGINAL_PROBE`] and clamped to `[0, 0.60]`.
    pub combined_marginal_rate: Decimal,
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub fica_tax: Decimal,
}

/// A salary range for one state and filing status, without deductions.
#[derive(Debug, Clone)]
pub struct SalarySweep<'a> {
    calculator: &'a NetSalaryCalculator<'a>,
    state: String,
    filing_status: FilingStatus,
}

impl<'a> SalarySweep<'a> {
    pub fn new(
        calculator: &'a NetSalaryCalculator<'a>,
        state: impl Into<String>,
        filing_status: FilingStatus,
    ) -> Self {
        Self {
            calculator,
            state: state.into(),
            filing_status,
        }
    }

    /// Evaluates [`SWEEP_STEPS`] + 1 evenly spaced salaries from `min` to
    /// `max` inclusive. The bounds may be given in either order; equal
    /// bounds yield a single point.
    pub fn run(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Vec<SweepPoint> {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        if low == high {
            return vec![self.point(low)];
        }

        let step = (high - low) / Decimal::from(SWEEP_STEPS);
        (0..=SWEEP_STEPS)
            .map(|index| {
                let offset = step.saturating_mul(Decimal::from(index));
                self.point(low.saturating_add(offset))
            })
            .collect()
    }

    /// Evaluates a single salary.
    pub fn point(
        &self,
        gross_salary: Decimal,
    ) -> SweepPoint {
        let result = self.calculator.calculate(&self.input(gross_salary));
        let probe = self
            .calculator
            .calculate(&self.input(gross_salary.saturating_add(MARGINAL_PROBE)));

        let withheld = result.gross_annual - result.net_annual;
        let withheld_probe = probe.gross_annual - probe.net_annual;
        let combined_marginal_rate = ((withheld_probe - withheld) / MARGINAL_PROBE)
            .clamp(Decimal::ZERO, MAX_COMBINED_MARGINAL_RATE);

        SweepPoint {
            gross_salary,
            net_salary: result.net_annual,
            effective_tax_rate: result.effective_tax_rate,
            combined_marginal_rate,
            federal_tax: result.federal_tax,
            state_tax: result.state_tax,
            fica_tax: result.fica_total(),
        }
    }

    fn input(
        &self,
        gross_salary: Decimal,
    ) -> SalaryInput {
        SalaryInput {
            gross_salary,
            state: self.state.clone(),
            filing_status: self.filing_status,
            deductions: PreTaxDeductions::default(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::test_support::tax_year_2024;

    #[test]
    fn constants_have_expected_values() {
        assert_eq!(MARGINAL_PROBE, dec!(1000));
        assert_eq!(MAX_COMBINED_MARGINAL_RATE, dec!(0.60));
    }

    #[test]
    fn sweep_yields_evenly_spaced_inclusive_points() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "CA", FilingStatus::Single);

        let points = sweep.run(dec!(30000), dec!(250000));
        let salaries: Vec<Decimal> = points.iter().map(|p| p.gross_salary).collect();

        assert_eq!(points.len(), 21);
        assert_eq!(salaries[0], dec!(30000));
        assert_eq!(salaries[1], dec!(41000));
        assert_eq!(salaries[20], dec!(250000));
    }

    #[test]
    fn sweep_net_is_monotonic() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "CA", FilingStatus::Married);

        let points = sweep.run(Decimal::ZERO, dec!(1000000));

        assert!(points.windows(2).all(|pair| pair[0].net_salary <= pair[1].net_salary));
    }

    #[test]
    fn combined_marginal_rate_in_texas() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "TX", FilingStatus::Single);

        let point = sweep.point(dec!(75000));

        // 22% federal + 6.2% social security + 1.45% medicare
        assert_eq!(point.combined_marginal_rate, dec!(0.2965));
        assert_eq!(point.state_tax, Decimal::ZERO);
        assert_eq!(point.fica_tax, dec!(5737.50));
    }

    #[test]
    fn combined_marginal_rate_is_never_negative() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "TX", FilingStatus::Single);

        let point = sweep.point(dec!(-5000));

        assert_eq!(point.combined_marginal_rate, Decimal::ZERO);
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "IL", FilingStatus::HeadOfHousehold);

        let forward = sweep.run(dec!(40000), dec!(60000));
        let backward = sweep.run(dec!(60000), dec!(40000));

        assert_eq!(forward, backward);
    }

    #[test]
    fn equal_bounds_yield_single_point() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "CA", FilingStatus::Single);

        let points = sweep.run(dec!(50000), dec!(50000));

        assert_eq!(points.len(), 1);
    }

    #[test]
    fn sweep_up_to_largest_salary_saturates() {
        let config = tax_year_2024();
        let calculator = NetSalaryCalculator::new(&config);
        let sweep = SalarySweep::new(&calculator, "CA", FilingStatus::Single);

        let points = sweep.run(Decimal::ZERO, Decimal::MAX);
        let top = sweep.point(Decimal::MAX);

        assert_eq!(points.len(), 21);
        assert_eq!(points[20].gross_salary, Decimal::MAX);
        assert_eq!(top.combined_marginal_rate, Decimal::ZERO);
        assert!(top.net_salary > Decimal::ZERO);
    }
}
