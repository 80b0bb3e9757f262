//! Allocation of a tax payment across budget categories and tax
//! expenditure programs.
//!
//! Category amounts are `tax * percent / 100` using the table's percentages
//! as declared. Tables whose percentages do not add up to 100 are allocated
//! as-is; nothing is renormalized.
//!
//! Expenditure shares are a separate attribution: the user's fraction of
//! total state revenue applied to each program's annual cost. Shares across
//! users are not expected to add up to the program total.

use rust_decimal::Decimal;

use crate::calculations::common::{percent_of, proportional_share};
use crate::models::{BudgetCategory, CategoryAllocation, ExpenditureShare, TaxExpenditure};

/// Maps a tax amount onto one tax type's budget table.
#[derive(Debug, Clone)]
pub struct AllocationMapper<'a> {
    categories: &'a [BudgetCategory],
}

impl<'a> AllocationMapper<'a> {
    pub fn new(categories: &'a [BudgetCategory]) -> Self {
        Self { categories }
    }

    /// One entry per category, in table order. `None` if any amount
    /// overflows.
    pub fn allocate(
        &self,
        tax_amount: Decimal,
    ) -> Option<Vec<CategoryAllocation>> {
        self.categories
            .iter()
            .map(|category| {
                Some(CategoryAllocation {
                    category: category.name.clone(),
                    amount: percent_of(tax_amount, category.percent)?,
                    percent: category.percent,
                    description: category.description.clone(),
                })
            })
            .collect()
    }

    /// Sum of the table's declared percentages.
    pub fn declared_percent(&self) -> Decimal {
        self.categories.iter().map(|c| c.percent).sum()
    }
}

/// `(tax_amount / total_revenue) * program_cost_in_dollars` for each program.
pub fn expenditure_shares(
    tax_amount: Decimal,
    expenditures: &[TaxExpenditure],
    total_revenue: Decimal,
) -> Option<Vec<ExpenditureShare>> {
    expenditures
        .iter()
        .map(|expenditure| {
            Some(ExpenditureShare {
                program: expenditure.program.clone(),
                share: proportional_share(
                    tax_amount,
                    total_revenue,
                    expenditure.amount_dollars(),
                )?,
                description: expenditure.description.clone(),
            })
        })
        .collect()
}

/// The user's tax as a percentage of total state revenue.
pub fn revenue_share_percent(
    tax_amount: Decimal,
    total_revenue: Decimal,
) -> Option<Decimal> {
    proportional_share(tax_amount, total_revenue, Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const REVENUE: Decimal = dec!(147000000000);

    fn sales_table() -> Vec<BudgetCategory> {
        vec![
            BudgetCategory::new("Education/School Aid", dec!(29), "Education"),
            BudgetCategory::new("Health/Medicaid", dec!(27), "Health"),
            BudgetCategory::new("Local Government Aid", dec!(20), "Local aid"),
            BudgetCategory::new("Higher Education", dec!(9), "SUNY/CUNY"),
            BudgetCategory::new("Mental Hygiene", dec!(8), "Mental health"),
            BudgetCategory::new("Transportation Infrastructure", dec!(4), "Roads"),
            BudgetCategory::new("General State Operations", dec!(3), "Operations"),
        ]
    }

    fn expenditures() -> Vec<TaxExpenditure> {
        vec![
            TaxExpenditure::new("Earned Income Credit", dec!(1070.1), "EIC"),
            TaxExpenditure::new("Pass-through Entity Tax Credit", dec!(14722.0), "PTET"),
        ]
    }

    // =========================================================================
    // Category allocation
    // =========================================================================

    #[test]
    fn allocates_every_category_in_table_order() {
        let table = sales_table();
        let mapper = AllocationMapper::new(&table);

        let allocations = mapper.allocate(dec!(1000)).unwrap();

        let names: Vec<&str> = allocations.iter().map(|a| a.category.as_str()).collect();
        let expected: Vec<&str> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, expected);
        assert_eq!(allocations[0].amount, dec!(290));
        assert_eq!(allocations[2].amount, dec!(200));
        assert_eq!(allocations[6].amount, dec!(30));
    }

    #[test]
    fn carries_percent_and_description_unchanged() {
        let table = sales_table();
        let mapper = AllocationMapper::new(&table);

        let allocations = mapper.allocate(dec!(123.45)).unwrap();

        for (allocation, category) in allocations.iter().zip(&table) {
            assert_eq!(allocation.percent, category.percent);
            assert_eq!(allocation.description, category.description);
        }
    }

    #[test]
    fn percentages_are_not_renormalized() {
        let table = vec![
            BudgetCategory::new("A", dec!(50), "a"),
            BudgetCategory::new("B", dec!(30), "b"),
        ];
        let mapper = AllocationMapper::new(&table);

        let allocations = mapper.allocate(dec!(100)).unwrap();
        let total: Decimal = allocations.iter().map(|a| a.amount).sum();
        let percent: Decimal = allocations.iter().map(|a| a.percent).sum();

        assert_eq!(total, dec!(80));
        assert_eq!(percent, mapper.declared_percent());
        assert_eq!(percent, dec!(80));
    }

    #[test]
    fn doubling_tax_doubles_every_amount() {
        let table = sales_table();
        let mapper = AllocationMapper::new(&table);

        let single = mapper.allocate(dec!(2145.37)).unwrap();
        let double = mapper.allocate(dec!(4290.74)).unwrap();

        for (one, two) in single.iter().zip(&double) {
            assert_eq!(two.amount, one.amount * dec!(2));
        }
    }

    #[test]
    fn zero_tax_allocates_zero_everywhere() {
        let table = sales_table();
        let mapper = AllocationMapper::new(&table);

        assert!(
            mapper
                .allocate(dec!(0))
                .unwrap()
                .iter()
                .all(|a| a.amount.is_zero())
        );
    }

    #[test]
    fn allocation_overflow_is_none() {
        let table = sales_table();

        assert_eq!(AllocationMapper::new(&table).allocate(Decimal::MAX), None);
    }

    // =========================================================================
    // Expenditure shares
    // =========================================================================

    #[test]
    fn expenditure_share_is_zero_for_zero_tax() {
        let shares = expenditure_shares(dec!(0), &expenditures(), REVENUE).unwrap();

        assert!(shares.iter().all(|s| s.share.is_zero()));
    }

    #[test]
    fn expenditure_share_is_proportional_to_revenue_fraction() {
        // 1470 of 147 billion is one part in 100 million.
        let shares = expenditure_shares(dec!(1470), &expenditures(), REVENUE).unwrap();

        assert_eq!(shares[0].program, "Earned Income Credit");
        assert_eq!(shares[0].share, dec!(10.701));
        assert_eq!(shares[1].share, dec!(147.22));
    }

    #[test]
    fn expenditure_share_is_monotonic_in_tax() {
        let programs = expenditures();
        let mut previous = expenditure_shares(dec!(0), &programs, REVENUE).unwrap();

        for tax in [dec!(0.01), dec!(1), dec!(2145), dec!(50000), dec!(1000000)] {
            let current = expenditure_shares(tax, &programs, REVENUE).unwrap();
            for (before, after) in previous.iter().zip(&current) {
                assert!(after.share > before.share);
            }
            previous = current;
        }
    }

    // =========================================================================
    // Revenue share
    // =========================================================================

    #[test]
    fn revenue_share_percent_of_total() {
        assert_eq!(revenue_share_percent(dec!(1470000), REVENUE), Some(dec!(0.001)));
        assert_eq!(revenue_share_percent(dec!(0), REVENUE), Some(dec!(0)));
    }

    #[test]
    fn expenditure_share_overflow_is_none() {
        let shares = expenditure_shares(dec!(100000000000000000000), &expenditures(), REVENUE);

        assert_eq!(shares, None);
    }
}
