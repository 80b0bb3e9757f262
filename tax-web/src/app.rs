use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tax_core::db::{DbConfig, RepositoryRegistry};
use tax_core::{CalculationRepository, TaxTables};
use tax_data::{BracketCsvLoader, new_york};
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::info;

use crate::analytics::{AnalyticsSink, HttpAnalyticsSink, RepositorySink};
use crate::config::{AnalyticsConfig, AppConfig, DataConfig};
use crate::routes::{AppState, router};

/// Registry with every compiled-in storage backend.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Built-in New York tables, with any configured bracket file applied.
pub fn load_tables(data: &DataConfig) -> Result<TaxTables> {
    let Some(path) = &data.brackets_csv else {
        return Ok(new_york::tables().clone());
    };
    let file =
        File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let tables = BracketCsvLoader::load(new_york::tables(), file)
        .with_context(|| format!("Invalid bracket file: {}", path.display()))?;
    info!(path = %path.display(), "bracket tables loaded");
    Ok(tables)
}

pub async fn open_repository(database: &DbConfig) -> Result<Arc<dyn CalculationRepository>> {
    let repository = build_registry()
        .create(database)
        .await
        .with_context(|| format!("Failed to open {} database", database.backend))?;
    Ok(Arc::from(repository))
}

/// Sink for `/api/calculate`: the remote endpoint when one is configured,
/// otherwise the local repository.
pub fn analytics_sink(
    config: &AnalyticsConfig,
    repository: &Arc<dyn CalculationRepository>,
) -> Result<Option<Arc<dyn AnalyticsSink>>> {
    if !config.enabled {
        return Ok(None);
    }
    let sink: Arc<dyn AnalyticsSink> = match &config.endpoint {
        Some(endpoint) => Arc::new(HttpAnalyticsSink::new(
            endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )?),
        None => Arc::new(RepositorySink::new(repository.clone())),
    };
    Ok(Some(sink))
}

pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let tables = load_tables(&config.data)?;
    let repository = open_repository(&config.database).await?;
    let analytics = analytics_sink(&config.analytics, &repository)?;
    Ok(AppState {
        tables: Arc::new(tables),
        repository,
        analytics,
    })
}

/// Runs the HTTP service until the process is stopped.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = build_state(config).await?;
    let addr = config.socket_addr()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "tax allocation service listening");
    axum::serve(listener, router(state))
        .await
        .context("server error")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tax_core::FilingStatus;

    use super::*;

    #[test]
    fn registry_has_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["sqlite"]);
    }

    #[test]
    fn default_data_config_uses_built_in_tables() {
        let tables = load_tables(&DataConfig::default()).unwrap();

        assert_eq!(&tables, new_york::tables());
    }

    #[test]
    fn bracket_file_overrides_built_in_tables() {
        let path = std::env::temp_dir().join(format!("tax-web-brackets-{}.csv", std::process::id()));
        let mut file = File::create(&path).unwrap();
        writeln!(file, "filing_status,min_income,max_income,rate").unwrap();
        writeln!(file, "single,0,,0.05").unwrap();
        drop(file);

        let tables = load_tables(&DataConfig {
            brackets_csv: Some(path.clone()),
        });
        let _ = std::fs::remove_file(&path);

        assert_eq!(tables.unwrap().brackets_for(FilingStatus::Single).len(), 1);
    }

    #[test]
    fn missing_bracket_file_is_an_error() {
        let err = load_tables(&DataConfig {
            brackets_csv: Some("/nonexistent/brackets.csv".into()),
        })
        .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/brackets.csv"));
    }

    #[tokio::test]
    async fn unknown_backend_is_reported() {
        let err = open_repository(&DbConfig {
            backend: "postgres".to_string(),
            connection_string: String::new(),
        })
        .await
        .err()
        .unwrap();

        assert!(format!("{err:#}").contains("unknown backend 'postgres'"));
    }

    #[tokio::test]
    async fn disabled_analytics_has_no_sink() {
        let repository = open_repository(&DbConfig::in_memory()).await.unwrap();
        let config = AnalyticsConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(analytics_sink(&config, &repository).unwrap().is_none());
        assert!(
            analytics_sink(&AnalyticsConfig::default(), &repository)
                .unwrap()
                .is_some()
        );
    }
}
