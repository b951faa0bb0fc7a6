//! CSV loader for batch salary inputs.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive.
//!
//! | Column             | Required | Notes                                              |
//! |--------------------|----------|----------------------------------------------------|
//! | `gross_salary`     | yes      | `85000`, `$85,000.00`                              |
//! | `state`            | yes      | Two-letter code, e.g. `CA`                         |
//! | `filing_status`    | yes      | `single`, `married`, `head_of_household` (or `S`, `MFJ`, `HOH`) |
//! | `name`             | no       | Label for the row; defaults to `row N`             |
//! | `salary_period`    | no       | `annual` (default), `monthly`, `hourly`            |
//! | `pay_frequency`    | no       | `biweekly` (default), `weekly`, `semimonthly`, `monthly`, `annual` |
//! | `retirement_401k`  | no       | Annual amount; empty means 0                       |
//! | `hsa`              | no       | Annual amount; empty means 0                       |
//! | `health_insurance` | no       | Annual amount; empty means 0                       |
//! | `other`            | no       | Annual amount; empty means 0                       |
//!
//! ### Minimal example
//!
//! ```csv
//! gross_salary,state,filing_status
//! 75000,CA,single
//! ```
//!
//! ### Full example
//!
//! ```csv
//! name,gross_salary,salary_period,state,filing_status,pay_frequency,retirement_401k,hsa,health_insurance,other
//! Seattle offer,"$140,000",annual,WA,single,semimonthly,23000,4150,,
//! Contract,55,hourly,TX,head_of_household,weekly,,,2400,
//! ```
use std::path::{Path, PathBuf};

use serde::Deserialize;
use takehome_core::{FilingStatus, PayFrequency, PreTaxDeductions, SalaryInput, SalaryPeriod};

use crate::utils::{ParseDecimalError, parse_currency_input, parse_decimal};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: Option<String>,
    gross_salary: String,
    salary_period: Option<String>,
    state: String,
    filing_status: String,
    pay_frequency: Option<String>,
    #[serde(default)]
    retirement_401k: String,
    #[serde(default)]
    hsa: String,
    #[serde(default)]
    health_insurance: String,
    #[serde(default)]
    other: String,
}

/// One labelled salary input read from a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRow {
    pub label: String,
    pub input: SalaryInput,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Row numbers are 1-based (header = row 0).
    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    #[error("unrecognised salary period '{period}' on row {row}")]
    InvalidSalaryPeriod { period: String, row: usize },

    #[error("unrecognised pay frequency '{frequency}' on row {row}")]
    InvalidPayFrequency { frequency: String, row: usize },

    #[error("column '{column}' on row {row}: {source}")]
    InvalidAmount {
        column: &'static str,
        row: usize,
        #[source]
        source: ParseDecimalError,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn amount(
    column: &'static str,
    value: &str,
    row: usize,
    parse: fn(&str) -> Result<rust_decimal::Decimal, ParseDecimalError>,
) -> Result<rust_decimal::Decimal, CsvLoadError> {
    parse(value).map_err(|source| CsvLoadError::InvalidAmount {
        column,
        row,
        source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Convert a single CSV row into a [`SalaryRow`].
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<SalaryRow, CsvLoadError> {
    let filing_status = FilingStatus::parse(&row.filing_status).ok_or_else(|| {
        CsvLoadError::InvalidFilingStatus {
            status: row.filing_status.clone(),
            row: row_number,
        }
    })?;

    let salary_period = match non_empty(row.salary_period) {
        Some(period) => SalaryPeriod::parse(&period).ok_or(CsvLoadError::InvalidSalaryPeriod {
            period,
            row: row_number,
        })?,
        None => SalaryPeriod::default(),
    };

    let pay_frequency = match non_empty(row.pay_frequency) {
        Some(frequency) => {
            PayFrequency::parse(&frequency).ok_or(CsvLoadError::InvalidPayFrequency {
                frequency,
                row: row_number,
            })?
        }
        None => PayFrequency::default(),
    };

    let input = SalaryInput {
        gross_salary: amount("gross_salary", &row.gross_salary, row_number, parse_currency_input)?,
        salary_period,
        state: row.state.trim().to_ascii_uppercase(),
        filing_status,
        pay_frequency,
        deductions: PreTaxDeductions {
            retirement_401k: amount("retirement_401k", &row.retirement_401k, row_number, parse_decimal)?,
            hsa: amount("hsa", &row.hsa, row_number, parse_decimal)?,
            health_insurance: amount(
                "health_insurance",
                &row.health_insurance,
                row_number,
                parse_decimal,
            )?,
            other: amount("other", &row.other, row_number, parse_decimal)?,
        },
    };

    Ok(SalaryRow {
        label: non_empty(row.name).unwrap_or_else(|| format!("row {row_number}")),
        input,
    })
}

/// Parse CSV text and return its rows in file order.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`] – if the CSV is structurally invalid or a
///   required column is missing.
/// * [`CsvLoadError::InvalidFilingStatus`], [`CsvLoadError::InvalidSalaryPeriod`],
///   [`CsvLoadError::InvalidPayFrequency`] – for unrecognised codes.
/// * [`CsvLoadError::InvalidAmount`] – for amounts that are not numbers.
pub fn load_from_str(input: &str) -> Result<Vec<SalaryRow>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Reads a file from disk and delegates to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<SalaryRow>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
