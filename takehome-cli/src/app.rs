//! Command handlers. Each returns the text to print so it can be tested
//! without a terminal.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use takehome_core::calculations::{
    ComparisonSummary, SalarySweep, StateTaxResolver, compare,
};
use takehome_core::db::{DbConfig, RepositoryRegistry};
use takehome_core::{
    CalculationRepository, CalculationResult, FilingStatus, NetSalaryCalculator,
    NewSavedCalculation, PayFrequency, PreTaxDeductions, PreferencesUpdate, SalaryInput,
    SalaryPeriod, TaxYearConfig,
};
use takehome_data::TaxTableLoader;
use takehome_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

use crate::csv_loader;
use crate::render;

/// Build the registry of available database backends.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(db: &DbConfig) -> Result<Box<dyn CalculationRepository>> {
    debug!(backend = %db.backend, "Opening repository");
    build_registry()
        .create(db)
        .await
        .with_context(|| format!("Failed to open {} database '{}'", db.backend, db.connection_string))
}

/// Tables from `dir`, or the embedded 2024 tables when `dir` is `None`.
pub fn load_tables(dir: Option<&Path>) -> Result<TaxYearConfig> {
    match dir {
        Some(dir) => TaxTableLoader::load_dir(dir)
            .with_context(|| format!("Failed to load tax tables from {}", dir.display())),
        None => TaxTableLoader::tax_year_2024().context("Embedded 2024 tax tables are invalid"),
    }
}

fn normalize_state(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

// ─── calc ────────────────────────────────────────────────────────────────────

/// Options for a single calculation. `None` fields fall back to the stored
/// preferences.
#[derive(Debug, Clone, Default)]
pub struct CalcRequest {
    pub gross_salary: Decimal,
    pub salary_period: SalaryPeriod,
    pub state: Option<String>,
    pub filing_status: Option<FilingStatus>,
    pub pay_frequency: Option<PayFrequency>,
    pub deductions: PreTaxDeductions,
    pub json: bool,
    pub save_as: Option<String>,
}

pub async fn run_calc(
    tables: &TaxYearConfig,
    repo: &dyn CalculationRepository,
    request: CalcRequest,
) -> Result<String> {
    let prefs = repo
        .get_preferences()
        .await
        .context("Failed to read preferences")?;

    let input = SalaryInput {
        gross_salary: request.gross_salary,
        salary_period: request.salary_period,
        state: normalize_state(request.state.as_deref().unwrap_or(&prefs.last_state)),
        filing_status: request.filing_status.unwrap_or(prefs.last_filing_status),
        pay_frequency: request.pay_frequency.unwrap_or(prefs.last_pay_frequency),
        deductions: request.deductions,
    };

    let result = NetSalaryCalculator::new(tables).calculate(&input);

    let update = PreferencesUpdate {
        last_state: Some(input.state.clone()),
        last_filing_status: Some(input.filing_status),
        last_pay_frequency: Some(input.pay_frequency),
        advanced_mode: (input.deductions.total() > Decimal::ZERO).then_some(true),
    };
    repo.save_preferences(&prefs.merge(update))
        .await
        .context("Failed to save preferences")?;

    if let Some(name) = request.save_as {
        let saved = repo
            .save_calculation(NewSavedCalculation {
                name,
                input: input.clone(),
                result: result.clone(),
            })
            .await
            .context("Failed to save calculation")?;
        info!(id = saved.id, name = %saved.name, "Saved calculation");
    }

    if request.json {
        to_json(&result)
    } else {
        Ok(render::render_result(&input, &result))
    }
}

// ─── compare ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub first: SalaryInput,
    pub second: SalaryInput,
    pub json: bool,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    first: &'a CalculationResult,
    second: &'a CalculationResult,
    summary: &'a ComparisonSummary,
}

pub fn run_compare(
    tables: &TaxYearConfig,
    mut request: CompareRequest,
) -> Result<String> {
    request.first.state = normalize_state(&request.first.state);
    request.second.state = normalize_state(&request.second.state);

    let calculator = NetSalaryCalculator::new(tables);
    let first = calculator.calculate(&request.first);
    let second = calculator.calculate(&request.second);
    let summary = compare(&first, &second);

    if request.json {
        to_json(&ComparisonReport {
            first: &first,
            second: &second,
            summary: &summary,
        })
    } else {
        Ok(render::render_comparison(
            (&request.first, &first),
            (&request.second, &second),
            &summary,
        ))
    }
}

// ─── sweep ───────────────────────────────────────────────────────────────────

pub fn run_sweep(
    tables: &TaxYearConfig,
    min: Decimal,
    max: Decimal,
    state: &str,
    filing_status: FilingStatus,
    json: bool,
) -> Result<String> {
    let calculator = NetSalaryCalculator::new(tables);
    let points = SalarySweep::new(&calculator, normalize_state(state), filing_status).run(min, max);

    if json {
        to_json(&points)
    } else {
        Ok(render::render_sweep(&points))
    }
}

// ─── batch ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct BatchEntry {
    name: String,
    input: SalaryInput,
    result: CalculationResult,
}

pub fn run_batch(
    tables: &TaxYearConfig,
    path: &Path,
    json: bool,
) -> Result<String> {
    let rows = csv_loader::load_from_file(path)
        .with_context(|| format!("Failed to load salary inputs from {}", path.display()))?;
    info!(rows = rows.len(), "Loaded batch inputs");

    let calculator = NetSalaryCalculator::new(tables);
    let results: Vec<(String, SalaryInput, CalculationResult)> = rows
        .into_iter()
        .map(|row| {
            let result = calculator.calculate(&row.input);
            (row.label, row.input, result)
        })
        .collect();

    if json {
        let entries: Vec<BatchEntry> = results
            .into_iter()
            .map(|(name, input, result)| BatchEntry {
                name,
                input,
                result,
            })
            .collect();
        to_json(&entries)
    } else {
        Ok(render::render_batch(&results))
    }
}

// ─── states / tables ─────────────────────────────────────────────────────────

pub fn run_states(
    tables: &TaxYearConfig,
    json: bool,
) -> Result<String> {
    let resolver = StateTaxResolver::new(&tables.states);
    if json {
        to_json(&resolver.states())
    } else {
        Ok(render::render_states(&resolver))
    }
}

pub fn run_validate_tables(dir: &Path) -> Result<String> {
    let tables = load_tables(Some(dir))?;
    Ok(format!(
        "Tax tables for {} in {} are valid ({} states)",
        tables.tax_year,
        dir.display(),
        tables.states.len()
    ))
}

// ─── saved ───────────────────────────────────────────────────────────────────

pub async fn run_saved_list(repo: &dyn CalculationRepository) -> Result<String> {
    let saved = repo
        .list_calculations()
        .await
        .context("Failed to list saved calculations")?;
    Ok(render::render_saved_list(&saved))
}

pub async fn run_saved_show(
    repo: &dyn CalculationRepository,
    id: i64,
    json: bool,
) -> Result<String> {
    let saved = repo
        .get_calculation(id)
        .await
        .with_context(|| format!("Failed to load saved calculation {id}"))?;

    if json {
        to_json(&saved)
    } else {
        Ok(format!(
            "#{} {} (saved {})\n\n{}",
            saved.id,
            saved.name,
            saved.created_at.format("%Y-%m-%d %H:%M UTC"),
            render::render_result(&saved.input, &saved.result)
        ))
    }
}

pub async fn run_saved_delete(
    repo: &dyn CalculationRepository,
    id: i64,
) -> Result<String> {
    repo.delete_calculation(id)
        .await
        .with_context(|| format!("Failed to delete saved calculation {id}"))?;
    Ok(format!("Deleted saved calculation {id}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use takehome_core::{RepositoryError, UserPreferences};

    use super::*;

    async fn memory_repo() -> Box<dyn CalculationRepository> {
        open_repository(&DbConfig::new("sqlite", ":memory:"))
            .await
            .expect("Failed to open in-memory repository")
    }

    fn tables() -> TaxYearConfig {
        load_tables(None).unwrap()
    }

    fn request(gross: Decimal) -> CalcRequest {
        CalcRequest {
            gross_salary: gross,
            ..Default::default()
        }
    }

    // ========================================================================
    // calc
    // ========================================================================

    #[tokio::test]
    async fn test_calc_defaults_to_stored_preferences() {
        let tables = tables();
        let repo = memory_repo().await;

        let text = run_calc(&tables, repo.as_ref(), request(dec!(75000)))
            .await
            .unwrap();

        assert!(text.contains("in CA, Single"));
        assert!(text.contains("$58,987.64"));
    }

    #[tokio::test]
    async fn test_calc_remembers_choices_for_next_run() {
        let tables = tables();
        let repo = memory_repo().await;
        let first = CalcRequest {
            state: Some(" tx ".to_string()),
            filing_status: Some(FilingStatus::Married),
            pay_frequency: Some(PayFrequency::Monthly),
            ..request(dec!(90000))
        };

        run_calc(&tables, repo.as_ref(), first).await.unwrap();
        let text = run_calc(&tables, repo.as_ref(), request(dec!(90000)))
            .await
            .unwrap();

        assert_eq!(
            repo.get_preferences().await.unwrap(),
            UserPreferences {
                last_state: "TX".to_string(),
                last_filing_status: FilingStatus::Married,
                last_pay_frequency: PayFrequency::Monthly,
                advanced_mode: false,
            }
        );
        assert!(text.contains("in TX, Married Filing Jointly"));
        assert!(text.contains("Per paycheck (monthly)"));
    }

    #[tokio::test]
    async fn test_calc_json_output_parses_back() {
        let tables = tables();
        let repo = memory_repo().await;

        let text = run_calc(
            &tables,
            repo.as_ref(),
            CalcRequest {
                json: true,
                ..request(dec!(75000))
            },
        )
        .await
        .unwrap();
        let result: CalculationResult = serde_json::from_str(&text).unwrap();

        assert_eq!(result.net_annual, dec!(58987.64));
    }

    #[tokio::test]
    async fn test_calc_with_save_then_show_and_delete() {
        let tables = tables();
        let repo = memory_repo().await;
        let save = CalcRequest {
            save_as: Some("Current job".to_string()),
            deductions: PreTaxDeductions {
                hsa: dec!(4150),
                ..Default::default()
            },
            ..request(dec!(75000))
        };

        run_calc(&tables, repo.as_ref(), save).await.unwrap();
        let listed = run_saved_list(repo.as_ref()).await.unwrap();
        let id = repo.list_calculations().await.unwrap()[0].id;
        let shown = run_saved_show(repo.as_ref(), id, false).await.unwrap();
        let deleted = run_saved_delete(repo.as_ref(), id).await.unwrap();

        assert!(listed.contains("Current job"));
        assert!(shown.contains("HSA Contribution"));
        assert_eq!(deleted, format!("Deleted saved calculation {id}"));
        assert!(repo.get_preferences().await.unwrap().advanced_mode);
        assert_eq!(run_saved_list(repo.as_ref()).await.unwrap(), "No saved calculations");
    }

    #[tokio::test]
    async fn test_deleting_unknown_id_reports_not_found() {
        let repo = memory_repo().await;

        let err = run_saved_delete(repo.as_ref(), 404).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<RepositoryError>(),
            Some(&RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let result = open_repository(&DbConfig::new("postgres", "db")).await;

        assert!(result.is_err());
    }

    // ========================================================================
    // engine-only commands
    // ========================================================================

    #[test]
    fn test_compare_prefers_no_tax_state() {
        let tables = tables();
        let text = run_compare(
            &tables,
            CompareRequest {
                first: SalaryInput::default(),
                second: SalaryInput {
                    state: "wa".to_string(),
                    ..Default::default()
                },
                json: false,
            },
        )
        .unwrap();

        assert!(text.contains("in WA"));
        assert!(text.contains("B leaves more take-home pay"));
    }

    #[test]
    fn test_sweep_json_has_twenty_one_points() {
        let tables = tables();

        let text = run_sweep(&tables, dec!(50000), dec!(150000), "or", FilingStatus::Single, true)
            .unwrap();
        let points: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();

        assert_eq!(points.len(), 21);
    }

    #[test]
    fn test_states_json_lists_all_states() {
        let text = run_states(&tables(), true).unwrap();
        let states: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();

        assert_eq!(states.len(), 50);
    }

    #[test]
    fn test_validate_tables_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();

        let err = run_validate_tables(dir.path()).unwrap_err();

        assert!(format!("{err:#}").contains("Failed to load tax tables"));
    }

    #[test]
    fn test_batch_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salaries.csv");
        std::fs::write(&path, "gross_salary,state,filing_status\n50000,CA,nobody\n").unwrap();

        let err = run_batch(&tables(), &path, false).unwrap_err();

        assert!(format!("{err:#}").contains("unrecognised filing status 'nobody' on row 1"));
    }
}
