//! Process-wide `tracing` setup for the `tax-allocation` binary.
//!
//! Everything is decided once at startup from [`LogOptions`]: the filter,
//! whether the terminal gets output (always stderr, so `estimate --json`
//! stays clean on stdout) and an optional log file.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::ChronoLocal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "info,tax_web=debug,tower_http=info";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Filter directives; take precedence over `RUST_LOG`.
    pub filter: Option<String>,
    /// Append a plain-text copy of the log here.
    pub file: Option<PathBuf>,
    /// No terminal output. The file, if any, still receives everything.
    pub quiet: bool,
}

/// Explicit directives, else `RUST_LOG`, else [`DEFAULT_FILTER`].
pub fn log_filter(directives: Option<&str>) -> Result<EnvFilter> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log level '{directives}'")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

fn local_time() -> ChronoLocal {
    ChronoLocal::new(TIMESTAMP_FORMAT.to_string())
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(options: &LogOptions) -> Result<()> {
    let filter = log_filter(options.filter.as_deref())?;

    let terminal = (!options.quiet).then(|| {
        fmt::layer()
            .with_timer(local_time())
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
    });

    let file = match &options.file {
        Some(path) => Some(
            fmt::layer()
                .with_timer(local_time())
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(terminal)
        .with(file)
        .try_init()
        .context("logging is already initialized")
}

/// Logs a background task failure with its full error chain.
pub fn log_task_error(
    task_name: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task = task_name, error = format!("{error:#}"), "background task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directives_are_validated() {
        assert!(log_filter(Some("debug")).is_ok());
        assert!(log_filter(Some("tax_web=trace,tower_http=warn")).is_ok());

        let err = log_filter(Some("tax_web=loud")).unwrap_err();
        assert!(err.to_string().contains("tax_web=loud"));
    }

    #[test]
    fn missing_log_directory_is_reported() {
        let err = open_log_file(Path::new("/nonexistent/dir/tax.log")).unwrap_err();

        assert!(err.to_string().contains("/nonexistent/dir/tax.log"));
    }

    #[test]
    fn log_task_error_accepts_success_and_failure() {
        log_task_error("noop", Ok(()));
        log_task_error("failing", Err(anyhow::anyhow!("boom")));
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn init_installs_once_and_writes_file() {
        let path = std::env::temp_dir().join(format!("tax-web-log-{}.log", std::process::id()));
        let options = LogOptions {
            filter: Some("info".to_string()),
            file: Some(path.clone()),
            quiet: true,
        };

        init_logging(&options).unwrap();
        tracing::info!("written to file");
        let second = init_logging(&options);
        let contents = std::fs::read_to_string(&path).unwrap_or_default();
        let _ = std::fs::remove_file(&path);

        assert!(second.is_err());
        assert!(contents.contains("written to file"), "{contents}");
    }
}
