use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSavedCalculation, SavedCalculation, UserPreferences};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for saved calculations and the user's remembered choices.
#[async_trait]
pub trait CalculationRepository: Send + Sync {
    // Saved calculations

    /// Stores a calculation as the newest entry, then drops everything
    /// beyond the [`MAX_SAVED_CALCULATIONS`](crate::MAX_SAVED_CALCULATIONS)
    /// most recent.
    async fn save_calculation(
        &self,
        calc: NewSavedCalculation,
    ) -> Result<SavedCalculation, RepositoryError>;

    async fn get_calculation(
        &self,
        id: i64,
    ) -> Result<SavedCalculation, RepositoryError>;

    /// Newest first.
    async fn list_calculations(&self) -> Result<Vec<SavedCalculation>, RepositoryError>;

    async fn delete_calculation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Preferences

    /// Stored preferences, or [`UserPreferences::default`] when none were saved.
    async fn get_preferences(&self) -> Result<UserPreferences, RepositoryError>;

    async fn save_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<(), RepositoryError>;
}
