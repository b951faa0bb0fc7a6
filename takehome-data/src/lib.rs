//! Reference tax tables for the take-home pay engine.
//!
//! Tables are plain CSV, one directory per tax year. The 2024 tables are
//! compiled in; [`TaxTableLoader::load_dir`] reads any other year.

pub mod loader;

pub use loader::{TaxTableLoader, TaxTableLoaderError, TaxTableRecords};
