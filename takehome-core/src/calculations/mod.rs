//! Take-home pay calculations.
//!
//! The calculators borrow one year's [`TaxYearConfig`](crate::TaxYearConfig)
//! and are pure: no I/O, no shared state, and no error paths. Every
//! numeric edge case degrades to a zero-valued result.

pub mod brackets;
pub mod common;
pub mod comparison;
pub mod converters;
pub mod federal;
pub mod fica;
pub mod net_salary;
pub mod state;
pub mod sweep;

pub use brackets::{marginal_rate, progressive_tax};
pub use comparison::{ComparisonSummary, Preference, compare};
pub use converters::{PeriodBreakdown, from_annual_salary, to_annual_salary, to_pay_period_amount};
pub use federal::{FederalTaxCalculator, FederalTaxResult};
pub use fica::{FicaCalculator, FicaResult};
pub use net_salary::NetSalaryCalculator;
pub use state::{StateTaxResolver, StateTaxResult};
pub use sweep::{SalarySweep, SweepPoint};
