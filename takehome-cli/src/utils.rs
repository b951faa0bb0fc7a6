use rust_decimal::Decimal;
use takehome_core::{FilingStatus, PayFrequency, SalaryPeriod};
use thiserror::Error;

/// Error returned when user input cannot be read as an amount.
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("an amount is required")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Strips the decorations people type around amounts: whitespace, `$` and
/// thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
        .collect()
}

fn parse_normalized(
    original: &str,
    normalized: &str,
) -> Result<Decimal, ParseDecimalError> {
    normalized.parse().map_err(|e| {
        tracing::error!(input = %original, "invalid decimal: {}", e);
        ParseDecimalError::Invalid {
            input: original.to_string(),
            source: e,
        }
    })
}

/// Parses a required amount such as `"$85,000"`, `"85000.50"` or `" 1,234 "`.
///
/// Empty input is an error; use [`parse_decimal`] for optional fields.
pub fn parse_currency_input(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    parse_normalized(s, &normalized)
}

/// Parses an optional amount.
///
/// Accepts the same decorations as [`parse_currency_input`]. Empty or
/// whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_normalized(s, &normalized)
}

/// Argument parsers for the command line; the error text is shown by clap.
pub fn parse_filing_status(s: &str) -> Result<FilingStatus, String> {
    FilingStatus::parse(s)
        .ok_or_else(|| format!("'{s}' is not one of single, married, head_of_household"))
}

pub fn parse_pay_frequency(s: &str) -> Result<PayFrequency, String> {
    PayFrequency::parse(s).ok_or_else(|| {
        format!("'{s}' is not one of weekly, biweekly, semimonthly, monthly, annual")
    })
}

pub fn parse_salary_period(s: &str) -> Result<SalaryPeriod, String> {
    SalaryPeriod::parse(s).ok_or_else(|| format!("'{s}' is not one of annual, monthly, hourly"))
}
