//! Calculation logic: the progressive tax estimate, the budget allocation
//! of a tax amount, and the calculator that ties them together.

pub mod allocation;
pub mod calculator;
pub mod common;
pub mod tax_estimator;

pub use allocation::{AllocationMapper, expenditure_shares, revenue_share_percent};
pub use calculator::{CalculationError, Calculator};
pub use tax_estimator::{BracketContribution, TaxEstimate, TaxEstimator};
