use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use takehome_core::{
    CalculationRepository, FilingStatus, MAX_SAVED_CALCULATIONS, NewSavedCalculation,
    PayFrequency, RepositoryError, SavedCalculation, UserPreferences,
};
use tracing::debug;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens (creating if needed) a database file, or an in-memory
    /// database for `:memory:`.
    ///
    /// An in-memory database lives only as long as its connection, so that
    /// pool is held to one connection that is never recycled.
    pub async fn open(path: &str) -> Result<Self> {
        let (options, pool_options) = if path == ":memory:" {
            (
                SqliteConnectOptions::from_str("sqlite::memory:")?,
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None),
            )
        } else {
            (
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true),
                SqlitePoolOptions::new(),
            )
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(
    column: &str,
    json: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_str(json)
        .map_err(|e| RepositoryError::Serialization(format!("Column '{}': {}", column, e)))
}

fn row_to_saved_calculation(row: &SqliteRow) -> Result<SavedCalculation, RepositoryError> {
    let input_json: String = row.try_get("input_json").map_err(db_error)?;
    let result_json: String = row.try_get("result_json").map_err(db_error)?;

    Ok(SavedCalculation {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        input: from_json("input_json", &input_json)?,
        result: from_json("result_json", &result_json)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

fn row_to_preferences(row: &SqliteRow) -> Result<UserPreferences, RepositoryError> {
    let filing_status: String = row.try_get("last_filing_status").map_err(db_error)?;
    let pay_frequency: String = row.try_get("last_pay_frequency").map_err(db_error)?;

    Ok(UserPreferences {
        last_state: row.try_get("last_state").map_err(db_error)?,
        last_filing_status: FilingStatus::parse(&filing_status).ok_or_else(|| {
            RepositoryError::Serialization(format!("Unknown filing status '{}'", filing_status))
        })?,
        last_pay_frequency: PayFrequency::parse(&pay_frequency).ok_or_else(|| {
            RepositoryError::Serialization(format!("Unknown pay frequency '{}'", pay_frequency))
        })?,
        advanced_mode: row.try_get("advanced_mode").map_err(db_error)?,
    })
}

#[async_trait]
impl CalculationRepository for SqliteRepository {
    async fn save_calculation(
        &self,
        calc: NewSavedCalculation,
    ) -> Result<SavedCalculation, RepositoryError> {
        let now = Utc::now();
        let input_json = to_json(&calc.input)?;
        let result_json = to_json(&calc.result)?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let inserted = sqlx::query(
            "INSERT INTO saved_calculation (name, input_json, result_json, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&calc.name)
        .bind(&input_json)
        .bind(&result_json)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let trimmed = sqlx::query(
            "DELETE FROM saved_calculation WHERE id NOT IN (
                SELECT id FROM saved_calculation ORDER BY id DESC LIMIT ?
             )",
        )
        .bind(MAX_SAVED_CALCULATIONS as i64)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        if trimmed.rows_affected() > 0 {
            debug!(
                removed = trimmed.rows_affected(),
                "Trimmed saved calculations to the most recent {}", MAX_SAVED_CALCULATIONS
            );
        }

        Ok(SavedCalculation {
            id: inserted.last_insert_rowid(),
            name: calc.name,
            input: calc.input,
            result: calc.result,
            created_at: now,
        })
    }

    async fn get_calculation(
        &self,
        id: i64,
    ) -> Result<SavedCalculation, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, input_json, result_json, created_at
             FROM saved_calculation WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_saved_calculation(&row)
    }

    async fn list_calculations(&self) -> Result<Vec<SavedCalculation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, input_json, result_json, created_at
             FROM saved_calculation ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_saved_calculation).collect()
    }

    async fn delete_calculation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_calculation WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_preferences(&self) -> Result<UserPreferences, RepositoryError> {
        let row = sqlx::query(
            "SELECT last_state, last_filing_status, last_pay_frequency, advanced_mode
             FROM user_preferences WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => row_to_preferences(&row),
            None => Ok(UserPreferences::default()),
        }
    }

    async fn save_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_preferences (
                id, last_state, last_filing_status, last_pay_frequency, advanced_mode, updated_at
             ) VALUES (1, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                last_state = excluded.last_state,
                last_filing_status = excluded.last_filing_status,
                last_pay_frequency = excluded.last_pay_frequency,
                advanced_mode = excluded.advanced_mode,
                updated_at = excluded.updated_at",
        )
        .bind(&prefs.last_state)
        .bind(prefs.last_filing_status.as_str())
        .bind(prefs.last_pay_frequency.as_str())
        .bind(prefs.advanced_mode)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use takehome_core::{BreakdownItem, CalculationResult, PreTaxDeductions, SalaryInput};

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::open(":memory:")
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn create_test_result(net_annual: Decimal) -> CalculationResult {
        CalculationResult {
            gross_annual: dec!(75000),
            adjusted_gross_income: dec!(75000),
            taxable_income: dec!(60400),
            federal_tax: dec!(8330.50),
            state_tax: dec!(1944.36),
            social_security: dec!(4650.000),
            medicare: dec!(1087.5000),
            total_tax: dec!(16012.3600),
            total_deductions: Decimal::ZERO,
            net_annual,
            net_monthly: net_annual / dec!(12),
            net_biweekly: net_annual / dec!(26),
            net_weekly: net_annual / dec!(52),
            effective_tax_rate: dec!(0.2134981333333333333333333333),
            marginal_tax_rate: dec!(0.22),
            breakdown: vec![BreakdownItem {
                name: "Federal Income Tax".to_string(),
                amount: dec!(8330.50),
                rate: dec!(0.1110733333333333333333333333),
                description: Some("Marginal rate: 22%".to_string()),
            }],
        }
    }

    fn create_test_calculation(name: &str) -> NewSavedCalculation {
        NewSavedCalculation {
            name: name.to_string(),
            input: SalaryInput {
                deductions: PreTaxDeductions {
                    hsa: dec!(4150),
                    ..Default::default()
                },
                ..Default::default()
            },
            result: create_test_result(dec!(58987.64)),
        }
    }

    // =========================================================================
    // Saved calculations
    // =========================================================================

    #[tokio::test]
    async fn test_save_and_get_calculation() {
        let repo = setup_test_db().await;

        let saved = repo
            .save_calculation(create_test_calculation("CA offer"))
            .await
            .expect("Failed to save calculation");
        let fetched = repo
            .get_calculation(saved.id)
            .await
            .expect("Failed to get calculation");

        assert_eq!(fetched.name, "CA offer");
        assert_eq!(fetched.input, saved.input);
        assert_eq!(fetched.result, saved.result);
        assert_eq!(fetched.input.deductions.hsa, dec!(4150));
    }

    #[tokio::test]
    async fn test_in_memory_database_uses_a_single_connection() {
        let repo = setup_test_db().await;

        repo.save_calculation(create_test_calculation("first"))
            .await
            .expect("Failed to save calculation");
        let (listed, prefs) = tokio::join!(repo.list_calculations(), repo.get_preferences());

        assert_eq!(repo.pool().options().get_max_connections(), 1);
        assert_eq!(listed.expect("Failed to list calculations").len(), 1);
        assert!(prefs.is_ok());
    }

    #[tokio::test]
    async fn test_saved_result_keeps_full_precision() {
        let repo = setup_test_db().await;

        let saved = repo
            .save_calculation(create_test_calculation("precise"))
            .await
            .unwrap();
        let fetched = repo.get_calculation(saved.id).await.unwrap();

        assert_eq!(fetched.result.net_biweekly, dec!(58987.64) / dec!(26));
        assert_eq!(
            fetched.result.effective_tax_rate,
            dec!(0.2134981333333333333333333333)
        );
    }

    #[tokio::test]
    async fn test_get_calculation_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_calculation(999).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_calculations_newest_first() {
        let repo = setup_test_db().await;
        for name in ["first", "second", "third"] {
            repo.save_calculation(create_test_calculation(name))
                .await
                .unwrap();
        }

        let names: Vec<String> = repo
            .list_calculations()
            .await
            .unwrap()
            .into_iter()
            .map(|calc| calc.name)
            .collect();

        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_save_keeps_only_most_recent() {
        let repo = setup_test_db().await;
        for index in 0..(MAX_SAVED_CALCULATIONS + 5) {
            repo.save_calculation(create_test_calculation(&format!("calc {index}")))
                .await
                .unwrap();
        }

        let saved = repo.list_calculations().await.unwrap();

        assert_eq!(saved.len(), MAX_SAVED_CALCULATIONS);
        assert_eq!(saved[0].name, format!("calc {}", MAX_SAVED_CALCULATIONS + 4));
        assert_eq!(saved[MAX_SAVED_CALCULATIONS - 1].name, "calc 5");
    }

    #[tokio::test]
    async fn test_delete_calculation() {
        let repo = setup_test_db().await;
        let saved = repo
            .save_calculation(create_test_calculation("to delete"))
            .await
            .unwrap();

        repo.delete_calculation(saved.id)
            .await
            .expect("Failed to delete calculation");

        assert!(matches!(
            repo.get_calculation(saved.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(repo.list_calculations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_calculation_not_found() {
        let repo = setup_test_db().await;

        let result = repo.delete_calculation(42).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_corrupt_json_is_a_serialization_error() {
        let repo = setup_test_db().await;
        sqlx::query(
            "INSERT INTO saved_calculation (id, name, input_json, result_json, created_at)
             VALUES (7, 'broken', '{not json', '{}', ?)",
        )
        .bind(Utc::now())
        .execute(repo.pool())
        .await
        .unwrap();

        let result = repo.get_calculation(7).await;

        assert!(matches!(result, Err(RepositoryError::Serialization(_))));
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    #[tokio::test]
    async fn test_preferences_default_when_unset() {
        let repo = setup_test_db().await;

        let prefs = repo.get_preferences().await.unwrap();

        assert_eq!(prefs, UserPreferences::default());
    }

    #[tokio::test]
    async fn test_save_and_overwrite_preferences() {
        let repo = setup_test_db().await;
        let first = UserPreferences {
            last_state: "NY".to_string(),
            last_filing_status: FilingStatus::Married,
            last_pay_frequency: PayFrequency::Semimonthly,
            advanced_mode: true,
        };
        let second = UserPreferences {
            last_state: "TX".to_string(),
            ..UserPreferences::default()
        };

        repo.save_preferences(&first).await.unwrap();
        assert_eq!(repo.get_preferences().await.unwrap(), first);

        repo.save_preferences(&second).await.unwrap();
        assert_eq!(repo.get_preferences().await.unwrap(), second);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_preferences")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
