use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FilingStatus, TaxType};

/// How the tax amount being allocated was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    IncomeBased,
    DirectEntry,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncomeBased => "income_based",
            Self::DirectEntry => "direct_entry",
        }
    }
}

/// One request to the calculator: either an income to estimate tax from,
/// or a tax amount the user already knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CalculationInput {
    #[serde(rename_all = "camelCase")]
    Income {
        income: Decimal,
        #[serde(default)]
        filing_status: FilingStatus,
        #[serde(default)]
        tax_type: TaxType,
    },
    #[serde(rename_all = "camelCase")]
    Direct {
        tax_amount: Decimal,
        #[serde(default)]
        tax_type: TaxType,
    },
}

impl CalculationInput {
    pub fn tax_type(&self) -> TaxType {
        match self {
            Self::Income { tax_type, .. } | Self::Direct { tax_type, .. } => *tax_type,
        }
    }

    pub fn method(&self) -> CalculationMethod {
        match self {
            Self::Income { .. } => CalculationMethod::IncomeBased,
            Self::Direct { .. } => CalculationMethod::DirectEntry,
        }
    }
}

/// A budget category's share of the user's tax payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub category: String,
    pub amount: Decimal,
    pub percent: Decimal,
    pub description: String,
}

/// The user's proportional piece of a tax expenditure program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenditureShare {
    pub program: String,
    pub share: Decimal,
    pub description: String,
}

/// Everything derived from one calculation request. Never mutated after
/// the calculator hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub estimated_tax: Decimal,
    pub tax_type: TaxType,
    pub method: CalculationMethod,
    pub allocations: Vec<CategoryAllocation>,
    pub expenditure_shares: Vec<ExpenditureShare>,
    /// The user's tax as a percentage of total state revenue.
    pub revenue_share_percent: Decimal,
}
