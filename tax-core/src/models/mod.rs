mod budget;
mod calculation;
mod calculation_record;
mod filing_status;
mod tax_bracket;
mod tax_tables;
mod tax_type;

pub use budget::{BudgetCategory, TaxExpenditure};
pub use calculation::{
    CalculationInput, CalculationMethod, CalculationResult, CategoryAllocation, ExpenditureShare,
};
pub use calculation_record::{
    AllocationEntry, NewCalculationRecord, RequestMetadata, SaveCalculationResponse,
    StoredCalculation,
};
pub use filing_status::FilingStatus;
pub use tax_bracket::TaxBracket;
pub use tax_tables::{TablesError, TaxTables};
pub use tax_type::TaxType;
