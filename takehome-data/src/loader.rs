use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use takehome_core::{
    ByFilingStatus, FederalTaxConfig, FicaConfig, FilingStatus, StateTaxConfig, StateTaxRegime,
    StateTaxType, TaxBracket, TaxTableError, TaxYearConfig,
};
use thiserror::Error;
use tracing::debug;

pub const TAX_YEAR_FILE: &str = "tax_year.csv";
pub const FILING_STATUS_FILE: &str = "filing_status.csv";
pub const FEDERAL_BRACKETS_FILE: &str = "federal_brackets.csv";
pub const STATES_FILE: &str = "states.csv";
pub const STATE_BRACKETS_FILE: &str = "state_brackets.csv";
pub const STATE_DEDUCTIONS_FILE: &str = "state_standard_deductions.csv";

/// Errors that can occur when loading tax tables.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} must contain exactly one row")]
    ExpectedSingleRow(&'static str),

    #[error("{table}: no row for filing status '{}'", .status.as_str())]
    MissingFilingStatus {
        table: String,
        status: FilingStatus,
    },

    #[error("{table}: duplicate row for filing status '{}'", .status.as_str())]
    DuplicateFilingStatus {
        table: String,
        status: FilingStatus,
    },

    #[error("State {code}: unknown regime '{regime}' (expected none, flat or progressive)")]
    UnknownRegime { code: String, regime: String },

    #[error("State {0} is listed more than once")]
    DuplicateState(String),

    #[error("State {0} has a flat regime but no rate")]
    FlatStateWithoutRate(String),

    #[error("State {0} has a progressive regime but no brackets")]
    ProgressiveStateWithoutBrackets(String),

    #[error("State {0} has brackets but is not progressive")]
    BracketsForNonProgressiveState(String),

    #[error("{table}: state {code} is not listed in states.csv")]
    UnknownState { table: &'static str, code: String },

    #[error("Invalid tax table: {0}")]
    Invalid(#[from] TaxTableError),
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

/// The single row of `tax_year.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxYearRecord {
    pub tax_year: i32,
    pub social_security_rate: Decimal,
    pub social_security_wage_base: Decimal,
    pub medicare_rate: Decimal,
    pub additional_medicare_rate: Decimal,
}

/// A row of `filing_status.csv`: the per-status federal amounts.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FilingStatusRecord {
    pub filing_status: FilingStatus,
    pub standard_deduction: Decimal,
    pub additional_medicare_threshold: Decimal,
}

/// A row of `federal_brackets.csv`. An empty `max_income` marks the
/// unbounded top bracket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FederalBracketRecord {
    pub filing_status: FilingStatus,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A row of `states.csv`. `rate` is only filled in for flat-tax states.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateRecord {
    pub code: String,
    pub name: String,
    pub regime: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub rate: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateBracketRecord {
    pub code: String,
    pub filing_status: FilingStatus,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateStandardDeductionRecord {
    pub code: String,
    pub filing_status: FilingStatus,
    pub amount: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Every row of one tax year's tables, before assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxTableRecords {
    pub tax_year: Vec<TaxYearRecord>,
    pub filing_statuses: Vec<FilingStatusRecord>,
    pub federal_brackets: Vec<FederalBracketRecord>,
    pub states: Vec<StateRecord>,
    pub state_brackets: Vec<StateBracketRecord>,
    pub state_deductions: Vec<StateStandardDeductionRecord>,
}

/// Loader for a tax year's reference tables from CSV.
///
/// A table directory holds six files (see the `*_FILE` constants). The
/// 2024 tables ship inside the crate; other years are loaded from disk
/// with [`TaxTableLoader::load_dir`]. Every loaded configuration has
/// passed [`TaxYearConfig::validate`].
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse records of any table from a CSV reader.
    ///
    /// Headers are required; surrounding whitespace in fields is ignored.
    pub fn parse<T, R>(reader: R) -> Result<Vec<T>, TaxTableLoaderError>
    where
        T: for<'de> Deserialize<'de>,
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            records.push(result?);
        }
        Ok(records)
    }

    /// The embedded 2024 tables.
    pub fn tax_year_2024() -> Result<TaxYearConfig, TaxTableLoaderError> {
        let records = TaxTableRecords {
            tax_year: Self::parse(include_str!("../data/2024/tax_year.csv").as_bytes())?,
            filing_statuses: Self::parse(
                include_str!("../data/2024/filing_status.csv").as_bytes(),
            )?,
            federal_brackets: Self::parse(
                include_str!("../data/2024/federal_brackets.csv").as_bytes(),
            )?,
            states: Self::parse(include_str!("../data/2024/states.csv").as_bytes())?,
            state_brackets: Self::parse(
                include_str!("../data/2024/state_brackets.csv").as_bytes(),
            )?,
            state_deductions: Self::parse(
                include_str!("../data/2024/state_standard_deductions.csv").as_bytes(),
            )?,
        };
        Self::build(records)
    }

    /// Loads and validates the six table files in `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<TaxYearConfig, TaxTableLoaderError> {
        let dir = dir.as_ref();
        let records = TaxTableRecords {
            tax_year: parse_file(dir, TAX_YEAR_FILE)?,
            filing_statuses: parse_file(dir, FILING_STATUS_FILE)?,
            federal_brackets: parse_file(dir, FEDERAL_BRACKETS_FILE)?,
            states: parse_file(dir, STATES_FILE)?,
            state_brackets: parse_file(dir, STATE_BRACKETS_FILE)?,
            state_deductions: parse_file(dir, STATE_DEDUCTIONS_FILE)?,
        };
        let config = Self::build(records)?;

        debug!(
            dir = %dir.display(),
            tax_year = config.tax_year,
            states = config.states.len(),
            "Loaded tax tables"
        );
        Ok(config)
    }

    /// Assembles parsed rows into a validated [`TaxYearConfig`].
    ///
    /// Bracket rows may appear in any order; they are sorted by
    /// `min_income` within each state and filing status.
    pub fn build(records: TaxTableRecords) -> Result<TaxYearConfig, TaxTableLoaderError> {
        let [year] = records.tax_year.as_slice() else {
            return Err(TaxTableLoaderError::ExpectedSingleRow(TAX_YEAR_FILE));
        };

        let mut standard_deductions = HashMap::new();
        let mut thresholds = HashMap::new();
        for record in &records.filing_statuses {
            insert_once(
                &mut standard_deductions,
                FILING_STATUS_FILE,
                record.filing_status,
                record.standard_deduction,
            )?;
            thresholds.insert(record.filing_status, record.additional_medicare_threshold);
        }

        let mut federal_brackets: HashMap<FilingStatus, Vec<TaxBracket>> = HashMap::new();
        for record in &records.federal_brackets {
            federal_brackets
                .entry(record.filing_status)
                .or_default()
                .push(TaxBracket::new(record.min_income, record.max_income, record.rate));
        }

        let federal = FederalTaxConfig {
            brackets: sorted_brackets(FEDERAL_BRACKETS_FILE, federal_brackets)?,
            standard_deduction: by_filing_status(FILING_STATUS_FILE, standard_deductions)?,
        };
        let fica = FicaConfig {
            social_security_rate: year.social_security_rate,
            social_security_wage_base: year.social_security_wage_base,
            medicare_rate: year.medicare_rate,
            additional_medicare_rate: year.additional_medicare_rate,
            additional_medicare_threshold: by_filing_status(FILING_STATUS_FILE, thresholds)?,
        };

        let config = TaxYearConfig {
            tax_year: year.tax_year,
            federal,
            fica,
            states: build_states(&records)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_file<T>(
    dir: &Path,
    name: &str,
) -> Result<Vec<T>, TaxTableLoaderError>
where
    T: for<'de> Deserialize<'de>,
{
    let path = dir.join(name);
    let file = File::open(&path).map_err(|source| TaxTableLoaderError::Io { path, source })?;
    TaxTableLoader::parse(file)
}

fn insert_once<T>(
    map: &mut HashMap<FilingStatus, T>,
    table: &str,
    status: FilingStatus,
    value: T,
) -> Result<(), TaxTableLoaderError> {
    if map.insert(status, value).is_some() {
        return Err(TaxTableLoaderError::DuplicateFilingStatus {
            table: table.to_string(),
            status,
        });
    }
    Ok(())
}

fn by_filing_status<T>(
    table: &str,
    mut values: HashMap<FilingStatus, T>,
) -> Result<ByFilingStatus<T>, TaxTableLoaderError> {
    let mut take = |status: FilingStatus| {
        values
            .remove(&status)
            .ok_or_else(|| TaxTableLoaderError::MissingFilingStatus {
                table: table.to_string(),
                status,
            })
    };

    Ok(ByFilingStatus {
        single: take(FilingStatus::Single)?,
        married: take(FilingStatus::Married)?,
        head_of_household: take(FilingStatus::HeadOfHousehold)?,
    })
}

fn sorted_brackets(
    table: &str,
    mut brackets: HashMap<FilingStatus, Vec<TaxBracket>>,
) -> Result<ByFilingStatus<Vec<TaxBracket>>, TaxTableLoaderError> {
    for list in brackets.values_mut() {
        list.sort_by(|a, b| a.min_income.cmp(&b.min_income));
    }
    by_filing_status(table, brackets)
}

fn build_states(
    records: &TaxTableRecords,
) -> Result<BTreeMap<String, StateTaxConfig>, TaxTableLoaderError> {
    let mut brackets: HashMap<String, HashMap<FilingStatus, Vec<TaxBracket>>> = HashMap::new();
    for record in &records.state_brackets {
        brackets
            .entry(record.code.to_ascii_uppercase())
            .or_default()
            .entry(record.filing_status)
            .or_default()
            .push(TaxBracket::new(record.min_income, record.max_income, record.rate));
    }

    let mut deductions: HashMap<String, HashMap<FilingStatus, Decimal>> = HashMap::new();
    for record in &records.state_deductions {
        let code = record.code.to_ascii_uppercase();
        let table = format!("{STATE_DEDUCTIONS_FILE} ({code})");
        insert_once(
            deductions.entry(code).or_default(),
            &table,
            record.filing_status,
            record.amount,
        )?;
    }

    let mut states = BTreeMap::new();
    for record in &records.states {
        let code = record.code.to_ascii_uppercase();
        let tax_type = StateTaxType::parse(&record.regime).ok_or_else(|| {
            TaxTableLoaderError::UnknownRegime {
                code: code.clone(),
                regime: record.regime.clone(),
            }
        })?;

        let regime = match (tax_type, brackets.remove(&code)) {
            (StateTaxType::Progressive, Some(by_status)) => StateTaxRegime::Progressive {
                brackets: sorted_brackets(&format!("{STATE_BRACKETS_FILE} ({code})"), by_status)?,
            },
            (StateTaxType::Progressive, None) => {
                return Err(TaxTableLoaderError::ProgressiveStateWithoutBrackets(code));
            }
            (_, Some(_)) => {
                return Err(TaxTableLoaderError::BracketsForNonProgressiveState(code));
            }
            (StateTaxType::Flat, None) => match record.rate {
                Some(rate) => StateTaxRegime::Flat { rate },
                None => return Err(TaxTableLoaderError::FlatStateWithoutRate(code)),
            },
            (StateTaxType::None, None) => StateTaxRegime::None,
        };

        let standard_deduction = deductions
            .remove(&code)
            .map(|by_status| {
                by_filing_status(&format!("{STATE_DEDUCTIONS_FILE} ({code})"), by_status)
            })
            .transpose()?;

        let config = StateTaxConfig {
            code: code.clone(),
            name: record.name.clone(),
            regime,
            standard_deduction,
        };
        if states.insert(code.clone(), config).is_some() {
            return Err(TaxTableLoaderError::DuplicateState(code));
        }
    }

    if let Some(code) = brackets.into_keys().min() {
        return Err(TaxTableLoaderError::UnknownState {
            table: STATE_BRACKETS_FILE,
            code,
        });
    }
    if let Some(code) = deductions.into_keys().min() {
        return Err(TaxTableLoaderError::UnknownState {
            table: STATE_DEDUCTIONS_FILE,
            code,
        });
    }

    Ok(states)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TAX_YEAR_CSV: &str = "tax_year,social_security_rate,social_security_wage_base,medicare_rate,additional_medicare_rate
2024,0.062,168600,0.0145,0.009
";

    const FILING_STATUS_CSV: &str = "filing_status,standard_deduction,additional_medicare_threshold
single,14600,200000
married,29200,250000
head_of_household,21900,200000
";

    const FEDERAL_BRACKETS_CSV: &str = "filing_status,min_income,max_income,rate
single,0,11600,0.10
single,11600,,0.12
married,23200,,0.12
married,0,23200,0.10
head_of_household,0,16550,0.10
head_of_household,16550,,0.12
";

    const STATES_CSV: &str = "code,name,regime,rate
CA,California,progressive,
IL,Illinois,flat,0.0495
TX,Texas,none,
";

    const STATE_BRACKETS_CSV: &str = "code,filing_status,min_income,max_income,rate
CA,single,0,10412,0.01
CA,single,10412,,0.02
CA,married,0,20824,0.01
CA,married,20824,,0.02
CA,head_of_household,0,20839,0.01
CA,head_of_household,20839,,0.02
";

    const STATE_DEDUCTIONS_CSV: &str = "code,filing_status,amount
CA,single,5363
CA,married,10726
CA,head_of_household,10726
";

    fn records() -> TaxTableRecords {
        TaxTableRecords {
            tax_year: TaxTableLoader::parse(TAX_YEAR_CSV.as_bytes()).unwrap(),
            filing_statuses: TaxTableLoader::parse(FILING_STATUS_CSV.as_bytes()).unwrap(),
            federal_brackets: TaxTableLoader::parse(FEDERAL_BRACKETS_CSV.as_bytes()).unwrap(),
            states: TaxTableLoader::parse(STATES_CSV.as_bytes()).unwrap(),
            state_brackets: TaxTableLoader::parse(STATE_BRACKETS_CSV.as_bytes()).unwrap(),
            state_deductions: TaxTableLoader::parse(STATE_DEDUCTIONS_CSV.as_bytes()).unwrap(),
        }
    }

    // =========================================================================
    // Parsing tests
    // =========================================================================

    #[test]
    fn test_parse_unbounded_bracket() {
        let csv = "filing_status,min_income,max_income,rate\nsingle,609350,,0.37";

        let records: Vec<FederalBracketRecord> =
            TaxTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![FederalBracketRecord {
                filing_status: FilingStatus::Single,
                min_income: dec!(609350),
                max_income: None,
                rate: dec!(0.37),
            }]
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let csv = "code,name,regime,rate\n IL , Illinois , flat , 0.0495 ";

        let records: Vec<StateRecord> =
            TaxTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].code, "IL");
        assert_eq!(records[0].regime, "flat");
        assert_eq!(records[0].rate, Some(dec!(0.0495)));
    }

    #[test]
    fn test_parse_unknown_filing_status() {
        let csv = "filing_status,min_income,max_income,rate\nwidowed,0,,0.10";

        let result: Result<Vec<FederalBracketRecord>, _> = TaxTableLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(TaxTableLoaderError::CsvParse(_))));
    }

    #[test]
    fn test_parse_bad_decimal() {
        let csv = "code,filing_status,amount\nCA,single,abc";

        let result: Result<Vec<StateStandardDeductionRecord>, _> =
            TaxTableLoader::parse(csv.as_bytes());

        let Err(TaxTableLoaderError::CsvParse(msg)) = result else {
            panic!("Expected CsvParse error, got: {result:?}");
        };
        assert!(msg.contains("abc"), "got: {msg}");
    }

    // =========================================================================
    // Build tests
    // =========================================================================

    #[test]
    fn test_build_assembles_config() {
        let config = TaxTableLoader::build(records()).expect("Failed to build");

        assert_eq!(config.tax_year, 2024);
        assert_eq!(config.federal.standard_deduction.married, dec!(29200));
        assert_eq!(config.fica.additional_medicare_threshold.married, dec!(250000));
        assert_eq!(config.states.len(), 3);
        assert_eq!(config.states["IL"].regime, StateTaxRegime::Flat { rate: dec!(0.0495) });
        assert_eq!(config.states["TX"].regime, StateTaxRegime::None);
        assert_eq!(
            config.states["CA"].standard_deduction.as_ref().map(|d| d.single),
            Some(dec!(5363))
        );
    }

    #[test]
    fn test_build_sorts_brackets_by_min_income() {
        let config = TaxTableLoader::build(records()).expect("Failed to build");

        let married = &config.federal.brackets.married;
        assert_eq!(married[0], TaxBracket::new(dec!(0), Some(dec!(23200)), dec!(0.10)));
        assert_eq!(married[1], TaxBracket::new(dec!(23200), None, dec!(0.12)));
    }

    #[test]
    fn test_build_rejects_missing_filing_status() {
        let mut records = records();
        records
            .filing_statuses
            .retain(|r| r.filing_status != FilingStatus::HeadOfHousehold);

        let result = TaxTableLoader::build(records);

        assert!(matches!(
            result,
            Err(TaxTableLoaderError::MissingFilingStatus {
                status: FilingStatus::HeadOfHousehold,
                ..
            })
        ));
    }

    #[test]
    fn test_build_rejects_second_tax_year_row() {
        let mut records = records();
        let extra = records.tax_year[0].clone();
        records.tax_year.push(extra);

        assert!(matches!(
            TaxTableLoader::build(records),
            Err(TaxTableLoaderError::ExpectedSingleRow(TAX_YEAR_FILE))
        ));
    }

    #[test]
    fn test_build_rejects_unknown_regime() {
        let mut records = records();
        records.states[2].regime = "capped".to_string();

        assert!(matches!(
            TaxTableLoader::build(records),
            Err(TaxTableLoaderError::UnknownRegime { .. })
        ));
    }

    #[test]
    fn test_build_rejects_flat_state_without_rate() {
        let mut records = records();
        records.states[1].rate = None;

        let result = TaxTableLoader::build(records);

        assert!(
            matches!(&result, Err(TaxTableLoaderError::FlatStateWithoutRate(code)) if code == "IL"),
            "got {result:?}"
        );
    }

    #[test]
    fn test_build_rejects_progressive_state_without_brackets() {
        let mut records = records();
        records.state_brackets.clear();

        assert!(matches!(
            TaxTableLoader::build(records),
            Err(TaxTableLoaderError::ProgressiveStateWithoutBrackets(_))
        ));
    }

    #[test]
    fn test_build_rejects_deductions_for_unlisted_state() {
        let mut records = records();
        records.state_deductions.push(StateStandardDeductionRecord {
            code: "ZZ".to_string(),
            filing_status: FilingStatus::Single,
            amount: dec!(1000),
        });

        assert!(matches!(
            TaxTableLoader::build(records),
            Err(TaxTableLoaderError::UnknownState { code, .. }) if code == "ZZ"
        ));
    }

    #[test]
    fn test_build_surfaces_validation_errors() {
        let mut records = records();
        records.federal_brackets[1].min_income = dec!(12000);

        let result = TaxTableLoader::build(records);

        assert!(matches!(
            result,
            Err(TaxTableLoaderError::Invalid(TaxTableError::BracketGap { .. }))
        ));
    }

    // =========================================================================
    // Embedded tables
    // =========================================================================

    #[test]
    fn test_embedded_2024_tables_are_valid() {
        let config = TaxTableLoader::tax_year_2024().expect("Embedded tables should load");

        assert_eq!(config.tax_year, 2024);
        assert_eq!(config.states.len(), 50);
        assert_eq!(config.federal.brackets.single.len(), 7);
        assert_eq!(config.fica.social_security_wage_base, dec!(168600));
    }

    #[test]
    fn test_embedded_2024_no_tax_states() {
        let config = TaxTableLoader::tax_year_2024().expect("Embedded tables should load");

        let no_tax: Vec<&str> = config
            .states
            .values()
            .filter(|state| state.regime == StateTaxRegime::None)
            .map(|state| state.code.as_str())
            .collect();

        assert_eq!(
            no_tax,
            vec!["AK", "FL", "NH", "NV", "SD", "TN", "TX", "WA", "WY"]
        );
    }
}
