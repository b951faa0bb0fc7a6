pub mod calculations;
pub mod db;
pub mod format;
pub mod models;

pub use calculations::NetSalaryCalculator;
pub use db::repository::{CalculationRepository, RepositoryError};
pub use models::*;
