use async_trait::async_trait;

use tax_core::db::repository::{CalculationRepository, RepositoryError};
use tax_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`tax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date. See [`crate::connect_options`] for the
    /// accepted forms.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculationRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        tracing::info!(connection = %config.connection_string, "sqlite repository ready");
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use tax_core::RequestMetadata;
    use tax_core::db::{DbConfig, RepositoryFactory, RepositoryRegistry};

    use super::SqliteRepositoryFactory;

    fn memory_config() -> DbConfig {
        DbConfig::in_memory()
    }

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_migrated_in_memory_repository() {
        let repo = SqliteRepositoryFactory
            .create(&memory_config())
            .await
            .expect("failed to create in-memory repository");

        assert_eq!(repo.count_calculations().await, Ok(0));
    }

    #[tokio::test]
    async fn registry_dispatches_to_sqlite() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(SqliteRepositoryFactory));

        let repo = registry
            .create(&memory_config())
            .await
            .expect("registry should create sqlite repository");
        let saved = repo
            .save_calculation("abc", &Default::default(), &RequestMetadata::default())
            .await
            .expect("save");

        assert_eq!(saved.session_id, "abc");
    }
}
