use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tax_core::{
    CalculationRepository, NewCalculationRecord, RepositoryError, RequestMetadata,
    StoredCalculation,
};

use crate::decimal::{decimal_to_text, get_optional_decimal};

const SELECT_COLUMNS: &str = "SELECT id, session_id, income, filing_status, tax_type,
        calculated_tax, tax_amount_entered, calculation_method, allocations,
        ip_address, user_agent, created_at
     FROM tax_calculations";

/// Translate a connection string into sqlx options.
///
/// * `:memory:` opens a private in-memory database that lives as long as
///   the repository.
/// * `sqlite:...` URLs are passed to sqlx unchanged.
/// * Anything else is a file path, created if missing.
pub fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions, RepositoryError> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(RepositoryError::Configuration(
            "empty SQLite connection string".to_string(),
        ));
    }

    let options = match trimmed {
        ":memory:" => SqliteConnectOptions::from_str("sqlite::memory:"),
        url if url.starts_with("sqlite:") => SqliteConnectOptions::from_str(url),
        path => Ok(SqliteConnectOptions::new().filename(path)),
    }
    .map_err(|e| RepositoryError::Configuration(e.to_string()))?;

    Ok(options.create_if_missing(true))
}

fn is_in_memory(connection_string: &str) -> bool {
    let trimmed = connection_string.trim();
    trimmed == ":memory:" || trimmed.starts_with("sqlite::memory:") || trimmed.contains("mode=memory")
}

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(connection_string: &str) -> Result<Self, RepositoryError> {
        let options = connect_options(connection_string)?;
        let pool = if is_in_memory(connection_string) {
            // The database disappears with its last connection, so hold
            // exactly one open for the life of the pool.
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePool::connect_with(options).await
        }
        .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn get_text(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<String>, RepositoryError> {
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

fn row_to_calculation(row: &SqliteRow) -> Result<StoredCalculation, RepositoryError> {
    let allocations_json: String = row
        .try_get("allocations")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let allocations = serde_json::from_str(&allocations_json)
        .map_err(|e| RepositoryError::Database(format!("Invalid allocations JSON: {}", e)))?;

    Ok(StoredCalculation {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        session_id: row
            .try_get("session_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        record: NewCalculationRecord {
            income: get_optional_decimal(row, "income")?,
            filing_status: get_text(row, "filing_status")?,
            tax_type: get_text(row, "tax_type")?,
            calculated_tax: get_optional_decimal(row, "calculated_tax")?,
            tax_amount_entered: get_optional_decimal(row, "tax_amount_entered")?,
            calculation_method: get_text(row, "calculation_method")?,
            allocations,
        },
        metadata: RequestMetadata {
            ip_address: row
                .try_get("ip_address")
                .map_err(|e| RepositoryError::Database(e.to_string()))?,
            user_agent: row
                .try_get("user_agent")
                .map_err(|e| RepositoryError::Database(e.to_string()))?,
        },
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

#[async_trait]
impl CalculationRepository for SqliteRepository {
    async fn save_calculation(
        &self,
        session_id: &str,
        record: &NewCalculationRecord,
        metadata: &RequestMetadata,
    ) -> Result<StoredCalculation, RepositoryError> {
        let allocations = serde_json::to_string(&record.allocations)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO tax_calculations (
                session_id, income, filing_status, tax_type, calculated_tax,
                tax_amount_entered, calculation_method, allocations,
                ip_address, user_agent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(record.income.map(decimal_to_text))
        .bind(record.filing_status.as_deref())
        .bind(record.tax_type.as_deref())
        .bind(record.calculated_tax.map(decimal_to_text))
        .bind(record.tax_amount_entered.map(decimal_to_text))
        .bind(record.calculation_method.as_deref())
        .bind(allocations)
        .bind(&metadata.ip_address)
        .bind(&metadata.user_agent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, session_id, "saved calculation");
        self.get_calculation(id).await
    }

    async fn get_calculation(
        &self,
        id: i64,
    ) -> Result<StoredCalculation, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_calculation(&row)
    }

    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<StoredCalculation, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE session_id = ?"))
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_calculation(&row)
    }

    async fn list_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<StoredCalculation>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_calculation).collect()
    }

    async fn count_calculations(&self) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tax_calculations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}
