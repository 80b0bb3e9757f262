use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewCalculationRecord, RequestMetadata, StoredCalculation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for calculation analytics records.
#[async_trait]
pub trait CalculationRepository: Send + Sync {
    /// Insert one analytics row under `session_id`.
    async fn save_calculation(
        &self,
        session_id: &str,
        record: &NewCalculationRecord,
        metadata: &RequestMetadata,
    ) -> Result<StoredCalculation, RepositoryError>;

    async fn get_calculation(&self, id: i64) -> Result<StoredCalculation, RepositoryError>;

    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<StoredCalculation, RepositoryError>;

    /// Most recent rows first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<StoredCalculation>, RepositoryError>;

    async fn count_calculations(&self) -> Result<i64, RepositoryError>;
}
