use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BudgetCategory, FilingStatus, TaxBracket, TaxExpenditure, TaxType};

/// Invariant violations reported by [`TaxTables::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TablesError {
    #[error("no brackets for filing status '{0}'")]
    EmptyBrackets(FilingStatus),

    #[error("first bracket for '{status}' starts at {min}, expected 0")]
    FirstBracketNotZero { status: FilingStatus, min: Decimal },

    #[error("bracket {index} for '{status}' does not start where the previous bracket ends")]
    NonContiguous { status: FilingStatus, index: usize },

    #[error("bracket {index} for '{status}' has an upper bound not above its lower bound")]
    EmptyRange { status: FilingStatus, index: usize },

    #[error("bracket {index} for '{status}' is unbounded but is not the last bracket")]
    UnboundedNotLast { status: FilingStatus, index: usize },

    #[error("bracket {index} for '{status}' has a lower rate than the bracket below it")]
    DecreasingRate { status: FilingStatus, index: usize },

    #[error("bracket {index} for '{status}' has a rate outside 0..=1")]
    RateOutOfRange { status: FilingStatus, index: usize },

    #[error("no standard deduction for filing status '{0}'")]
    MissingDeduction(FilingStatus),

    #[error("no budget allocation table for tax type '{0}'")]
    MissingBudget(TaxType),

    #[error("total state revenue must be positive, got {0}")]
    NonPositiveRevenue(Decimal),
}

/// Reference data behind every calculation.
///
/// Built once at startup and shared read-only. Lookups by filing status fall
/// back to the single-filer entry when a status has no table of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTables {
    pub brackets: BTreeMap<FilingStatus, Vec<TaxBracket>>,
    pub standard_deductions: BTreeMap<FilingStatus, Decimal>,
    pub budgets: BTreeMap<TaxType, Vec<BudgetCategory>>,
    pub expenditures: Vec<TaxExpenditure>,
    pub total_state_revenue: Decimal,
}

impl TaxTables {
    pub fn brackets_for(
        &self,
        status: FilingStatus,
    ) -> &[TaxBracket] {
        self.brackets
            .get(&status)
            .or_else(|| self.brackets.get(&FilingStatus::Single))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn standard_deduction_for(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        self.standard_deductions
            .get(&status)
            .or_else(|| self.standard_deductions.get(&FilingStatus::Single))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn budget_for(
        &self,
        tax_type: TaxType,
    ) -> &[BudgetCategory] {
        self.budgets.get(&tax_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Checks every bracket table and that each tax type has a budget.
    ///
    /// Only the single-filer table and deduction are mandatory; other
    /// statuses may be absent and will borrow the single-filer values.
    pub fn validate(&self) -> Result<(), TablesError> {
        if !self.brackets.contains_key(&FilingStatus::Single) {
            return Err(TablesError::EmptyBrackets(FilingStatus::Single));
        }
        if !self.standard_deductions.contains_key(&FilingStatus::Single) {
            return Err(TablesError::MissingDeduction(FilingStatus::Single));
        }
        for (status, brackets) in &self.brackets {
            validate_brackets(*status, brackets)?;
        }
        for tax_type in TaxType::all() {
            if self.budget_for(*tax_type).is_empty() {
                return Err(TablesError::MissingBudget(*tax_type));
            }
        }
        if self.total_state_revenue <= Decimal::ZERO {
            return Err(TablesError::NonPositiveRevenue(self.total_state_revenue));
        }
        Ok(())
    }
}

fn validate_brackets(
    status: FilingStatus,
    brackets: &[TaxBracket],
) -> Result<(), TablesError> {
    let first = brackets.first().ok_or(TablesError::EmptyBrackets(status))?;
    if !first.min_income.is_zero() {
        return Err(TablesError::FirstBracketNotZero {
            status,
            min: first.min_income,
        });
    }

    let last = brackets.len() - 1;
    for (index, bracket) in brackets.iter().enumerate() {
        match bracket.max_income {
            Some(max) if max <= bracket.min_income => {
                return Err(TablesError::EmptyRange { status, index });
            }
            None if index != last => {
                return Err(TablesError::UnboundedNotLast { status, index });
            }
            _ => {}
        }
        if bracket.tax_rate.is_sign_negative() || bracket.tax_rate > Decimal::ONE {
            return Err(TablesError::RateOutOfRange { status, index });
        }

        if index == 0 {
            continue;
        }
        let prev = &brackets[index - 1];
        if prev.max_income != Some(bracket.min_income) {
            return Err(TablesError::NonContiguous { status, index });
        }
        if bracket.tax_rate < prev.tax_rate {
            return Err(TablesError::DecreasingRate { status, index });
        }
    }
    Ok(())
}
