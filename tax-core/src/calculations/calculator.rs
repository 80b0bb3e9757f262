use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::allocation::{AllocationMapper, expenditure_shares, revenue_share_percent};
use crate::calculations::common::round_half_up;
use crate::calculations::tax_estimator::TaxEstimator;
use crate::models::{
    AllocationEntry, CalculationInput, CalculationResult, NewCalculationRecord, TaxTables,
};

/// Why a request produced no breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("tax amount {0} is negative; nothing to allocate")]
    NegativeTaxAmount(Decimal),

    #[error("amount is too large to allocate")]
    Overflow,
}

/// Runs the estimator and the allocation mapper over one set of tables.
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'a> {
    tables: &'a TaxTables,
}

impl<'a> Calculator<'a> {
    pub fn new(tables: &'a TaxTables) -> Self {
        Self { tables }
    }

    /// Produces the breakdown for `input`.
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CalculationError> {
        let estimated_tax = match input {
            CalculationInput::Income {
                income,
                filing_status,
                ..
            } => TaxEstimator::for_status(self.tables, *filing_status).estimate(*income),
            CalculationInput::Direct { tax_amount, .. } => {
                if *tax_amount < Decimal::ZERO {
                    tracing::debug!(%tax_amount, "negative tax amount; nothing to allocate");
                    return Err(CalculationError::NegativeTaxAmount(*tax_amount));
                }
                *tax_amount
            }
        };
        self.allocate(estimated_tax, input).ok_or_else(|| {
            tracing::debug!(%estimated_tax, "allocation overflowed");
            CalculationError::Overflow
        })
    }

    fn allocate(
        &self,
        estimated_tax: Decimal,
        input: &CalculationInput,
    ) -> Option<CalculationResult> {
        let tax_type = input.tax_type();
        let revenue = self.tables.total_state_revenue;

        Some(CalculationResult {
            estimated_tax,
            tax_type,
            method: input.method(),
            allocations: AllocationMapper::new(self.tables.budget_for(tax_type))
                .allocate(estimated_tax)?,
            expenditure_shares: expenditure_shares(
                estimated_tax,
                &self.tables.expenditures,
                revenue,
            )?,
            revenue_share_percent: revenue_share_percent(estimated_tax, revenue)?,
        })
    }

    /// Analytics document for a finished calculation.
    pub fn record_for(
        input: &CalculationInput,
        result: &CalculationResult,
    ) -> NewCalculationRecord {
        let (income, filing_status, tax_amount_entered) = match input {
            CalculationInput::Income {
                income,
                filing_status,
                ..
            } => (Some(*income), Some(filing_status.as_str().to_string()), None),
            CalculationInput::Direct { tax_amount, .. } => (None, None, Some(*tax_amount)),
        };

        NewCalculationRecord {
            income,
            filing_status,
            tax_type: Some(result.tax_type.as_str().to_string()),
            calculated_tax: Some(result.estimated_tax),
            tax_amount_entered,
            calculation_method: Some(result.method.as_str().to_string()),
            allocations: result
                .allocations
                .iter()
                .map(|a| {
                    (
                        a.category.clone(),
                        AllocationEntry {
                            amount: round_half_up(a.amount),
                            percent: a.percent,
                            description: a.description.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}
