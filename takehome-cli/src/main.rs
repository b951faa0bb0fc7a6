use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use takehome_cli::app::{self, CalcRequest, CompareRequest};
use takehome_cli::config::{AppConfig, ConfigOverrides, DEFAULT_LOG_LEVEL};
use takehome_cli::logging;
use takehome_cli::utils::{
    parse_currency_input, parse_filing_status, parse_pay_frequency, parse_salary_period,
};
use takehome_core::{FilingStatus, PayFrequency, PreTaxDeductions, SalaryInput, SalaryPeriod};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// US take-home pay calculator.
///
/// Federal income tax, FICA and state income tax for a salary, using the
/// 2024 tables unless `--tables` points at another year.
#[derive(Debug, Parser)]
#[command(name = "takehome", version)]
struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend for saved calculations and preferences.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `takehome.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Directory of tax table CSVs to use instead of the built-in 2024 tables.
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Log level or EnvFilter directive, e.g. `debug` or `takehome_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Take-home pay for one salary.
    Calc(CalcArgs),
    /// Two salaries or states side by side.
    Compare(CompareArgs),
    /// Net pay and marginal rates across a salary range.
    Sweep(SweepArgs),
    /// Run every row of a CSV of salary inputs.
    Batch {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List states and how they tax wages.
    States {
        #[arg(long)]
        json: bool,
    },
    /// Manage saved calculations.
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
    /// Load and validate a directory of tax table CSVs.
    ValidateTables { dir: PathBuf },
}

#[derive(Debug, Args)]
struct CalcArgs {
    /// Gross salary, e.g. `85000` or `$85,000`.
    #[arg(value_parser = parse_currency_input)]
    salary: Decimal,

    #[arg(long, value_parser = parse_salary_period, default_value = "annual")]
    period: SalaryPeriod,

    /// Two-letter state code. Defaults to the last one used.
    #[arg(long)]
    state: Option<String>,

    #[arg(long, value_parser = parse_filing_status)]
    filing_status: Option<FilingStatus>,

    #[arg(long, value_parser = parse_pay_frequency)]
    pay_frequency: Option<PayFrequency>,

    #[command(flatten)]
    deductions: DeductionArgs,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Save the calculation under this name.
    #[arg(long, value_name = "NAME")]
    save: Option<String>,
}

#[derive(Debug, Args)]
struct DeductionArgs {
    /// Annual 401(k) contribution.
    #[arg(long = "401k", value_parser = parse_currency_input, default_value = "0")]
    retirement_401k: Decimal,

    /// Annual HSA contribution.
    #[arg(long, value_parser = parse_currency_input, default_value = "0")]
    hsa: Decimal,

    /// Annual pre-tax health insurance premiums.
    #[arg(long, value_parser = parse_currency_input, default_value = "0")]
    health_insurance: Decimal,

    /// Any other annual pre-tax deductions.
    #[arg(long, value_parser = parse_currency_input, default_value = "0")]
    other: Decimal,
}

impl From<DeductionArgs> for PreTaxDeductions {
    fn from(args: DeductionArgs) -> Self {
        Self {
            retirement_401k: args.retirement_401k,
            hsa: args.hsa,
            health_insurance: args.health_insurance,
            other: args.other,
        }
    }
}

#[derive(Debug, Args)]
struct CompareArgs {
    #[arg(long, value_parser = parse_currency_input)]
    salary_a: Decimal,

    #[arg(long, default_value = "CA")]
    state_a: String,

    /// Defaults to the first salary.
    #[arg(long, value_parser = parse_currency_input)]
    salary_b: Option<Decimal>,

    /// Defaults to the first state.
    #[arg(long)]
    state_b: Option<String>,

    #[arg(long, value_parser = parse_filing_status, default_value = "single")]
    filing_status: FilingStatus,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SweepArgs {
    #[arg(long, value_parser = parse_currency_input)]
    min: Decimal,

    #[arg(long, value_parser = parse_currency_input)]
    max: Decimal,

    #[arg(long, default_value = "CA")]
    state: String,

    #[arg(long, value_parser = parse_filing_status, default_value = "single")]
    filing_status: FilingStatus,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum SavedCommand {
    List,
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    Delete {
        id: i64,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging(DEFAULT_LOG_LEVEL);

    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        backend: cli.backend,
        database: cli.db,
        tables_dir: cli.tables,
        log_level: cli.log_level,
    };
    let config = AppConfig::load(cli.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    if !logging::env_filter_overridden() {
        logging::set_log_level(&config.log_level)?;
    }
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "Resolved configuration");

    let output = match cli.command {
        Command::Calc(args) => {
            let tables = app::load_tables(config.tables_dir.as_deref())?;
            let repo = app::open_repository(&config.db).await?;
            let request = CalcRequest {
                gross_salary: args.salary,
                salary_period: args.period,
                state: args.state,
                filing_status: args.filing_status,
                pay_frequency: args.pay_frequency,
                deductions: args.deductions.into(),
                json: args.json,
                save_as: args.save,
            };
            app::run_calc(&tables, repo.as_ref(), request).await?
        }
        Command::Compare(args) => {
            let tables = app::load_tables(config.tables_dir.as_deref())?;
            let first = SalaryInput {
                gross_salary: args.salary_a,
                state: args.state_a.clone(),
                filing_status: args.filing_status,
                ..Default::default()
            };
            let second = SalaryInput {
                gross_salary: args.salary_b.unwrap_or(args.salary_a),
                state: args.state_b.unwrap_or(args.state_a),
                ..first.clone()
            };
            app::run_compare(
                &tables,
                CompareRequest {
                    first,
                    second,
                    json: args.json,
                },
            )?
        }
        Command::Sweep(args) => {
            let tables = app::load_tables(config.tables_dir.as_deref())?;
            app::run_sweep(
                &tables,
                args.min,
                args.max,
                &args.state,
                args.filing_status,
                args.json,
            )?
        }
        Command::Batch { path, json } => {
            let tables = app::load_tables(config.tables_dir.as_deref())?;
            app::run_batch(&tables, &path, json)?
        }
        Command::States { json } => {
            let tables = app::load_tables(config.tables_dir.as_deref())?;
            app::run_states(&tables, json)?
        }
        Command::Saved { action } => {
            let repo = app::open_repository(&config.db).await?;
            match action {
                SavedCommand::List => app::run_saved_list(repo.as_ref()).await?,
                SavedCommand::Show { id, json } => {
                    app::run_saved_show(repo.as_ref(), id, json).await?
                }
                SavedCommand::Delete { id } => app::run_saved_delete(repo.as_ref(), id).await?,
            }
        }
        Command::ValidateTables { dir } => app::run_validate_tables(&dir)?,
    };

    println!("{output}");
    Ok(())
}
