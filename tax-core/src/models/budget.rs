use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A spending category in a tax type's budget allocation table.
///
/// `percent` is a whole-number percentage of the budget (29 means 29%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub name: String,
    pub percent: Decimal,
    pub description: String,
}

impl BudgetCategory {
    pub fn new(
        name: impl Into<String>,
        percent: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            percent,
            description: description.into(),
        }
    }
}

/// A tax credit or exemption program and its annual cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxExpenditure {
    pub program: String,
    pub amount_millions: Decimal,
    pub description: String,
}

impl TaxExpenditure {
    pub fn new(
        program: impl Into<String>,
        amount_millions: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            amount_millions,
            description: description.into(),
        }
    }

    /// Annual program cost in dollars.
    pub fn amount_dollars(&self) -> Decimal {
        self.amount_millions * Decimal::from(1_000_000)
    }
}
