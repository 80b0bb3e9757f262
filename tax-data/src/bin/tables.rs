use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tax_core::FilingStatus;
use tax_core::calculations::TaxEstimator;
use tax_data::{BracketCsvLoader, new_york};

/// Validate a bracket CSV against the built-in New York tables.
///
/// The CSV file should have the following columns:
/// - filing_status: form code (single, marriedJoint, marriedSeparate,
///   headOfHousehold, qualifyingWidow)
/// - min_income: lower bound of the bracket
/// - max_income: upper bound (empty for the top bracket)
/// - rate: marginal rate as a decimal (e.g., 0.055)
#[derive(Parser, Debug)]
#[command(name = "tax-tables")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing bracket data. Without it the
    /// built-in tables are summarised.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the estimated tax at this income for every filing status
    #[arg(short, long)]
    income: Option<Decimal>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tables = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            let tables = BracketCsvLoader::load(new_york::tables(), file)
                .with_context(|| format!("Invalid bracket file: {}", path.display()))?;
            println!("{} is valid.", path.display());
            tables
        }
        None => {
            new_york::tables()
                .validate()
                .context("Built-in tables failed validation")?;
            new_york::tables().clone()
        }
    };

    for status in FilingStatus::all() {
        let brackets = tables.brackets_for(*status);
        let top_rate = brackets.last().map(|b| b.tax_rate).unwrap_or(Decimal::ZERO);
        println!(
            "{:<28} {} brackets, top rate {}, standard deduction {}",
            status.label(),
            brackets.len(),
            top_rate,
            tables.standard_deduction_for(*status)
        );

        if let Some(income) = args.income {
            let tax = TaxEstimator::for_status(&tables, *status).estimate(income);
            println!("{:<28} tax on {income}: {tax}", "");
        }
    }

    Ok(())
}
