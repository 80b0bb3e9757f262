//! Service configuration.
//!
//! Read from a TOML file with `[server]`, `[database]`, `[analytics]` and
//! `[data]` sections. Every field has a default, so an empty file (or no
//! file at all) yields a runnable configuration that records to
//! `tax_allocation.db` in the working directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tax_core::db::DbConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Where finished calculations are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub enabled: bool,
    /// Remote save-calculation URL. When unset, records go straight to the
    /// configured database.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Bracket CSV applied over the built-in New York tables.
    pub brackets_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub analytics: AnalyticsConfig,
    pub data: DataConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid configuration")
    }

    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn no_path_is_default() {
        let config = AppConfig::load(None).unwrap();

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, "tax_allocation.db");
        assert!(config.analytics.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [database]
            connection_string = "/var/lib/tax-allocation/calc.db"

            [analytics]
            endpoint = "https://example.org/api/save-calculation"

            [data]
            brackets_csv = "brackets.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, "/var/lib/tax-allocation/calc.db");
        assert_eq!(
            config.analytics.endpoint.as_deref(),
            Some("https://example.org/api/save-calculation")
        );
        assert_eq!(config.analytics.timeout_secs, 5);
        assert_eq!(config.data.brackets_csv, Some(PathBuf::from("brackets.csv")));
    }

    #[test]
    fn unknown_types_are_rejected() {
        let err = AppConfig::from_toml_str("[server]\nport = \"eighty\"").unwrap_err();

        assert!(format!("{err:#}").contains("invalid configuration"));
    }

    #[test]
    fn socket_addr_from_host_and_port() {
        let config = AppConfig::default();

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn missing_file_names_path() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/tax.toml"))).unwrap_err();

        assert!(err.to_string().contains("/nonexistent/tax.toml"));
    }
}
