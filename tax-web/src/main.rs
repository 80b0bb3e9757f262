use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use tax_core::calculations::Calculator;
use tax_core::{
    CalculationInput, FilingStatus, NewCalculationRecord, RequestMetadata, TaxTables, TaxType,
};
use tax_web::analytics::{AnalyticsSink, HttpAnalyticsSink};
use tax_web::config::AppConfig;
use tax_web::presentation::{CalculationResponse, format_currency, render_text};
use tax_web::utils::parse_amount;
use tax_web::{app, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Shows where New York State taxes go.
///
/// Estimates state tax from income (or takes a known tax amount) and splits
/// it across the FY 2026 budget categories.
#[derive(Debug, Parser)]
#[command(name = "tax-allocation", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tax_web=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Suppress terminal log output (file logging is unaffected).
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Database connection string (overrides the config file, which
        /// defaults to `tax_allocation.db`).
        #[arg(long)]
        db: Option<String>,
    },
    /// Print the allocation of an estimated or known tax amount.
    Estimate(EstimateArgs),
    /// Print the most recently recorded calculations.
    History {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Database connection string (overrides the config file, which
        /// defaults to `tax_allocation.db`).
        #[arg(long)]
        db: Option<String>,
    },
}

#[derive(Debug, Args)]
struct EstimateArgs {
    /// Annual income, e.g. `75,000`.
    #[arg(long, conflicts_with = "tax_amount", required_unless_present = "tax_amount")]
    income: Option<String>,

    /// Tax amount already known; skips the estimate.
    #[arg(long)]
    tax_amount: Option<String>,

    /// Filing status code (single, marriedJoint, marriedSeparate,
    /// headOfHousehold, qualifyingWidow).
    #[arg(long, default_value = "single")]
    status: String,

    /// income, corporate or sales.
    #[arg(long, default_value = "income")]
    tax_type: TaxType,

    /// Post the calculation to this save-calculation URL after printing.
    #[arg(long)]
    analytics_endpoint: Option<String>,

    /// Print the response as JSON instead of a report.
    #[arg(long)]
    json: bool,
}

// ─── logging ─────────────────────────────────────────────────────────────────

fn log_options(cli: &Cli) -> logging::LogOptions {
    logging::LogOptions {
        filter: cli.log_level.clone(),
        file: cli.log_file.clone(),
        quiet: cli.quiet,
    }
}

// ─── commands ────────────────────────────────────────────────────────────────

fn required_amount(
    flag: &str,
    value: &str,
) -> Result<rust_decimal::Decimal> {
    parse_amount(value)?.with_context(|| format!("--{flag} must not be empty"))
}

fn estimate_input(args: &EstimateArgs) -> Result<CalculationInput> {
    match (&args.income, &args.tax_amount) {
        (Some(income), None) => Ok(CalculationInput::Income {
            income: required_amount("income", income)?,
            filing_status: FilingStatus::parse_or_default(&args.status),
            tax_type: args.tax_type,
        }),
        (None, Some(amount)) => Ok(CalculationInput::Direct {
            tax_amount: required_amount("tax-amount", amount)?,
            tax_type: args.tax_type,
        }),
        _ => bail!("pass exactly one of --income or --tax-amount"),
    }
}

/// Runs the calculation for `args` without printing or recording it.
fn prepare(
    tables: &TaxTables,
    args: &EstimateArgs,
) -> Result<(CalculationResponse, NewCalculationRecord)> {
    let input = estimate_input(args)?;
    let result = Calculator::new(tables)
        .calculate(&input)
        .context("cannot allocate this amount")?;
    let record = Calculator::record_for(&input, &result);
    Ok((CalculationResponse::new(&input, result), record))
}

async fn estimate(
    config: &AppConfig,
    args: &EstimateArgs,
) -> Result<()> {
    let tables = app::load_tables(&config.data)?;
    let (response, record) = prepare(&tables, args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_text(&response));
    }

    let endpoint = args.analytics_endpoint.clone().or_else(|| {
        config
            .analytics
            .enabled
            .then(|| config.analytics.endpoint.clone())
            .flatten()
    });
    if let Some(endpoint) = endpoint {
        let delivered = match HttpAnalyticsSink::new(
            endpoint,
            Duration::from_secs(config.analytics.timeout_secs),
        ) {
            Ok(sink) => sink.record(&record, &RequestMetadata::default()).await,
            Err(e) => Err(e),
        };
        if let Err(error) = delivered {
            warn!(error = format!("{error:#}"), "calculation was not recorded");
        }
    }
    Ok(())
}

async fn history(
    config: &AppConfig,
    limit: u32,
) -> Result<()> {
    let repository = app::open_repository(&config.database).await?;
    let rows = repository
        .list_recent(limit)
        .await
        .context("Failed to read calculations")?;

    if rows.is_empty() {
        println!("No calculations recorded.");
        return Ok(());
    }
    for row in rows {
        let record = &row.record;
        println!(
            "{:>6}  {}  {:<10} {:<13} {:>14}  {}",
            row.id,
            row.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.tax_type.as_deref().unwrap_or("-"),
            record.calculation_method.as_deref().unwrap_or("-"),
            record
                .calculated_tax
                .map(format_currency)
                .unwrap_or_else(|| "-".to_string()),
            row.metadata.ip_address,
        );
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&log_options(&cli))?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match &cli.command {
        Command::Serve { host, port, db } => {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(db) = db {
                config.database.connection_string = db.clone();
            }
            app::serve(&config).await
        }
        Command::Estimate(args) => estimate(&config, args).await,
        Command::History { limit, db } => {
            if let Some(db) = db {
                config.database.connection_string = db.clone();
            }
            history(&config, *limit).await
        }
    }
}
