//! Progressive state income tax estimate.
//!
//! The estimate subtracts the filing status's standard deduction and walks
//! the rate table from the lowest bracket up, adding each bracket's slice of
//! taxable income times that bracket's marginal rate.
//!
//! | Step | Computation |
//! |------|-------------|
//! | 1    | `income <= 0` (or not entered) gives a tax of zero |
//! | 2    | `taxable = max(0, income - standard_deduction)` |
//! | 3    | per bracket: `min(taxable - lower, upper - lower) * rate` when `taxable > lower` |
//! | 4    | tax is the sum of step 3 over every bracket, unrounded |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::TaxBracket;
//! use tax_core::calculations::TaxEstimator;
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), Some(dec!(8500)), dec!(0.04)),
//!     TaxBracket::new(dec!(8500), Some(dec!(11700)), dec!(0.045)),
//!     TaxBracket::new(dec!(11700), Some(dec!(13900)), dec!(0.0525)),
//!     TaxBracket::new(dec!(13900), Some(dec!(80650)), dec!(0.055)),
//!     TaxBracket::new(dec!(80650), None, dec!(0.06)),
//! ];
//!
//! let estimator = TaxEstimator::new(&brackets, dec!(8000));
//!
//! assert_eq!(estimator.estimate(dec!(50000)), dec!(2145.00));
//! assert_eq!(estimator.estimate(dec!(7999)), dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FilingStatus, TaxBracket, TaxTables};

/// One bracket's contribution to an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    pub bracket: TaxBracket,
    /// Taxable income falling inside this bracket.
    pub taxed_income: Decimal,
    pub tax: Decimal,
}

/// Full working of an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEstimate {
    pub income: Decimal,
    pub standard_deduction: Decimal,
    pub taxable_income: Decimal,
    /// Only brackets the taxable income reaches.
    pub contributions: Vec<BracketContribution>,
    pub tax: Decimal,
}

/// Estimator for one filing status.
#[derive(Debug, Clone)]
pub struct TaxEstimator<'a> {
    brackets: &'a [TaxBracket],
    standard_deduction: Decimal,
}

impl<'a> TaxEstimator<'a> {
    /// Brackets must be sorted by `min_income` in ascending order;
    /// [`TaxTables::validate`] checks this for loaded tables.
    pub fn new(
        brackets: &'a [TaxBracket],
        standard_deduction: Decimal,
    ) -> Self {
        Self {
            brackets,
            standard_deduction,
        }
    }

    /// Estimator using the tables for `status`, or the single-filer tables
    /// when `status` has none.
    pub fn for_status(
        tables: &'a TaxTables,
        status: FilingStatus,
    ) -> Self {
        Self::new(
            tables.brackets_for(status),
            tables.standard_deduction_for(status),
        )
    }

    pub fn standard_deduction(&self) -> Decimal {
        self.standard_deduction
    }

    pub fn taxable_income(
        &self,
        income: Decimal,
    ) -> Decimal {
        (income - self.standard_deduction).max(Decimal::ZERO)
    }

    /// Estimated tax on `income`. Never negative.
    pub fn estimate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.breakdown(income).tax
    }

    pub fn breakdown(
        &self,
        income: Decimal,
    ) -> TaxEstimate {
        if income <= Decimal::ZERO {
            return TaxEstimate {
                income,
                standard_deduction: self.standard_deduction,
                taxable_income: Decimal::ZERO,
                contributions: Vec::new(),
                tax: Decimal::ZERO,
            };
        }

        let taxable_income = self.taxable_income(income);
        let contributions: Vec<BracketContribution> = self
            .brackets
            .iter()
            .filter(|bracket| taxable_income > bracket.min_income)
            .map(|bracket| {
                let taxed_income = bracket.income_within(taxable_income);
                BracketContribution {
                    bracket: bracket.clone(),
                    taxed_income,
                    tax: taxed_income * bracket.tax_rate,
                }
            })
            .collect();
        let tax: Decimal = contributions.iter().map(|c| c.tax).sum();

        TaxEstimate {
            income,
            standard_deduction: self.standard_deduction,
            taxable_income,
            contributions,
            tax,
        }
    }
}
