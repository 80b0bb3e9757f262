//! New York State reference tables.
//!
//! Budget percentages come from the FY 2026 Enacted Budget (State Operating
//! Funds, OpenBudget.NY.Gov). Tax expenditures come from the FY 2026 Tax
//! Expenditure Report, in millions of dollars. Brackets and standard
//! deductions are the simplified 2025 personal income tax tables.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::{BudgetCategory, FilingStatus, TaxBracket, TaxExpenditure, TaxTables, TaxType};

/// State revenue collected in fiscal year 2024.
pub const TOTAL_STATE_REVENUE: Decimal = dec!(147000000000);

static NEW_YORK: LazyLock<TaxTables> = LazyLock::new(build);

/// Shared, immutable New York tables.
pub fn tables() -> &'static TaxTables {
    &NEW_YORK
}

/// Bracket upper bounds and rates; lower bounds are the previous upper bound.
fn schedule(bounds: [(Option<Decimal>, Decimal); 9]) -> Vec<TaxBracket> {
    let mut min_income = Decimal::ZERO;
    bounds
        .into_iter()
        .map(|(max_income, rate)| {
            let bracket = TaxBracket::new(min_income, max_income, rate);
            min_income = max_income.unwrap_or(min_income);
            bracket
        })
        .collect()
}

fn single() -> Vec<TaxBracket> {
    schedule([
        (Some(dec!(8500)), dec!(0.04)),
        (Some(dec!(11700)), dec!(0.045)),
        (Some(dec!(13900)), dec!(0.0525)),
        (Some(dec!(80650)), dec!(0.055)),
        (Some(dec!(215400)), dec!(0.06)),
        (Some(dec!(1077550)), dec!(0.0685)),
        (Some(dec!(5000000)), dec!(0.0965)),
        (Some(dec!(25000000)), dec!(0.103)),
        (None, dec!(0.109)),
    ])
}

fn married_joint() -> Vec<TaxBracket> {
    schedule([
        (Some(dec!(17150)), dec!(0.04)),
        (Some(dec!(23600)), dec!(0.045)),
        (Some(dec!(27900)), dec!(0.0525)),
        (Some(dec!(161550)), dec!(0.055)),
        (Some(dec!(323200)), dec!(0.06)),
        (Some(dec!(2155350)), dec!(0.0685)),
        (Some(dec!(5000000)), dec!(0.0965)),
        (Some(dec!(25000000)), dec!(0.103)),
        (None, dec!(0.109)),
    ])
}

fn married_separate() -> Vec<TaxBracket> {
    schedule([
        (Some(dec!(8500)), dec!(0.04)),
        (Some(dec!(11700)), dec!(0.045)),
        (Some(dec!(13900)), dec!(0.0525)),
        (Some(dec!(80650)), dec!(0.055)),
        (Some(dec!(161550)), dec!(0.06)),
        (Some(dec!(1077550)), dec!(0.0685)),
        (Some(dec!(2500000)), dec!(0.0965)),
        (Some(dec!(12500000)), dec!(0.103)),
        (None, dec!(0.109)),
    ])
}

fn head_of_household() -> Vec<TaxBracket> {
    schedule([
        (Some(dec!(12800)), dec!(0.04)),
        (Some(dec!(17650)), dec!(0.045)),
        (Some(dec!(20900)), dec!(0.0525)),
        (Some(dec!(107650)), dec!(0.055)),
        (Some(dec!(269300)), dec!(0.06)),
        (Some(dec!(1616450)), dec!(0.0685)),
        (Some(dec!(5000000)), dec!(0.0965)),
        (Some(dec!(25000000)), dec!(0.103)),
        (None, dec!(0.109)),
    ])
}

fn income_budget() -> Vec<BudgetCategory> {
    vec![
        BudgetCategory::new(
            "Education/School Aid",
            dec!(29),
            "K-12 public schools, special education, teacher training, school construction aid",
        ),
        BudgetCategory::new(
            "Health/Medicaid",
            dec!(27),
            "Medicaid for low-income families, hospitals, nursing homes, mental health clinics",
        ),
        BudgetCategory::new(
            "Higher Education",
            dec!(9),
            "SUNY and CUNY colleges, community colleges, student financial aid",
        ),
        BudgetCategory::new(
            "Mental Hygiene",
            dec!(8),
            "Mental health treatment, substance abuse programs, developmental disabilities services",
        ),
        BudgetCategory::new(
            "Social Welfare Programs",
            dec!(5),
            "SNAP food assistance, TANF cash assistance, child care subsidies, homeless services",
        ),
        BudgetCategory::new(
            "Transportation Infrastructure",
            dec!(4),
            "Highway maintenance, bridge repairs, MTA funding, airport improvements",
        ),
        BudgetCategory::new(
            "Public Safety & Justice",
            dec!(4),
            "State police, prisons, courts, district attorneys, probation services",
        ),
        BudgetCategory::new(
            "Environmental Protection",
            dec!(3),
            "Parks maintenance, environmental cleanup, water quality, climate programs",
        ),
        BudgetCategory::new(
            "Economic Development",
            dec!(3),
            "Business incentives, tourism promotion, workforce development, infrastructure grants",
        ),
        BudgetCategory::new(
            "Elected Officials & Government Operations",
            dec!(3),
            "Legislature, Governor's office, state agencies administration",
        ),
        BudgetCategory::new(
            "Emergency Services & Preparedness",
            dec!(2),
            "Emergency management, disaster response, homeland security",
        ),
        BudgetCategory::new(
            "Agriculture & Rural Development",
            dec!(2),
            "Farm support programs, rural infrastructure, food safety inspection",
        ),
        BudgetCategory::new(
            "Arts & Cultural Programs",
            dec!(1),
            "Museums, libraries, arts grants, historical preservation",
        ),
    ]
}

fn corporate_budget() -> Vec<BudgetCategory> {
    vec![
        BudgetCategory::new(
            "Education/School Aid",
            dec!(29),
            "Corporate taxes contribute to K-12 education funding and higher education",
        ),
        BudgetCategory::new(
            "Health/Medicaid",
            dec!(27),
            "Corporate taxes help fund healthcare programs and Medicaid",
        ),
        BudgetCategory::new(
            "Economic Development & Business Programs",
            dec!(15),
            "Business development programs, manufacturing support, economic incentives",
        ),
        BudgetCategory::new(
            "Higher Education",
            dec!(9),
            "SUNY, CUNY, workforce development aligned with business needs",
        ),
        BudgetCategory::new(
            "Mental Hygiene",
            dec!(8),
            "Mental health and substance abuse treatment services",
        ),
        BudgetCategory::new(
            "Transportation Infrastructure",
            dec!(4),
            "Transportation networks that support business and commerce",
        ),
        BudgetCategory::new(
            "Public Safety & Justice",
            dec!(4),
            "Business regulatory enforcement, commercial courts, public safety",
        ),
        BudgetCategory::new(
            "General Government Operations",
            dec!(4),
            "State agencies that regulate and support business operations",
        ),
    ]
}

fn sales_budget() -> Vec<BudgetCategory> {
    vec![
        BudgetCategory::new(
            "Education/School Aid",
            dec!(29),
            "Sales tax contributes to state education funding",
        ),
        BudgetCategory::new(
            "Health/Medicaid",
            dec!(27),
            "Sales tax helps fund state healthcare programs",
        ),
        BudgetCategory::new(
            "Local Government Aid",
            dec!(20),
            "State revenue sharing with local governments from sales tax",
        ),
        BudgetCategory::new(
            "Higher Education",
            dec!(9),
            "State universities and community colleges",
        ),
        BudgetCategory::new(
            "Mental Hygiene",
            dec!(8),
            "Mental health and developmental disability services",
        ),
        BudgetCategory::new(
            "Transportation Infrastructure",
            dec!(4),
            "State transportation systems and infrastructure",
        ),
        BudgetCategory::new(
            "General State Operations",
            dec!(3),
            "Various state government operations and services",
        ),
    ]
}

fn expenditures() -> Vec<TaxExpenditure> {
    vec![
        TaxExpenditure::new(
            "Earned Income Credit",
            dec!(1070.1),
            "Tax credit for working families with low to moderate income",
        ),
        TaxExpenditure::new(
            "Social Security Exclusion",
            dec!(1990.7),
            "Excludes Social Security benefits from state tax",
        ),
        TaxExpenditure::new(
            "Pension/Annuity Exclusion",
            dec!(1004.2),
            "Tax relief for retirees on pension income",
        ),
        TaxExpenditure::new(
            "NY State/Municipal Retiree Benefits",
            dec!(1410.4),
            "Tax exemption for state and local government retirees",
        ),
        TaxExpenditure::new(
            "Empire State Child Credit",
            dec!(691.0),
            "Tax credit for families with children",
        ),
        TaxExpenditure::new(
            "Interest on US Obligations",
            dec!(659.4),
            "Federal law requires exemption of federal bond interest",
        ),
        TaxExpenditure::new(
            "Pass-through Entity Tax Credit",
            dec!(14722.0),
            "Credit for business owners paying entity-level tax",
        ),
        TaxExpenditure::new(
            "STAR Credit (New Homeowners)",
            dec!(924.3),
            "Property tax relief for new homeowners",
        ),
        TaxExpenditure::new(
            "STAR Credit (NYC Residents)",
            dec!(748.4),
            "Property tax relief for NYC residents",
        ),
        TaxExpenditure::new(
            "College Tuition Credit",
            dec!(170.9),
            "Tax credit for higher education expenses",
        ),
    ]
}

/// Builds a fresh copy of the New York tables.
pub fn build() -> TaxTables {
    TaxTables {
        brackets: BTreeMap::from([
            (FilingStatus::Single, single()),
            (FilingStatus::MarriedJoint, married_joint()),
            (FilingStatus::MarriedSeparate, married_separate()),
            (FilingStatus::HeadOfHousehold, head_of_household()),
            // Qualifying widow(er)s file on the joint schedule.
            (FilingStatus::QualifyingWidow, married_joint()),
        ]),
        standard_deductions: BTreeMap::from([
            (FilingStatus::Single, dec!(8000)),
            (FilingStatus::MarriedJoint, dec!(16050)),
            (FilingStatus::MarriedSeparate, dec!(8000)),
            (FilingStatus::HeadOfHousehold, dec!(11200)),
            (FilingStatus::QualifyingWidow, dec!(16050)),
        ]),
        budgets: BTreeMap::from([
            (TaxType::Income, income_budget()),
            (TaxType::Corporate, corporate_budget()),
            (TaxType::Sales, sales_budget()),
        ]),
        expenditures: expenditures(),
        total_state_revenue: TOTAL_STATE_REVENUE,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tax_core::calculations::{AllocationMapper, TaxEstimator};

    use super::*;

    #[test]
    fn built_in_tables_are_valid() {
        assert_eq!(tables().validate(), Ok(()));
    }

    #[test]
    fn every_status_has_nine_brackets() {
        for status in FilingStatus::all() {
            assert_eq!(tables().brackets_for(*status).len(), 9, "{status}");
        }
    }

    #[test]
    fn schedule_chains_lower_bounds() {
        let brackets = head_of_household();

        assert_eq!(brackets[0].min_income, dec!(0));
        assert_eq!(brackets[1].min_income, dec!(12800));
        assert_eq!(brackets[8].min_income, dec!(25000000));
        assert_eq!(brackets[8].max_income, None);
    }

    #[test]
    fn single_fifty_thousand_is_2145() {
        let estimator = TaxEstimator::for_status(tables(), FilingStatus::Single);

        assert_eq!(estimator.estimate(dec!(50000)), dec!(2145.00));
    }

    #[test]
    fn income_at_or_below_deduction_is_untaxed_for_every_status() {
        for status in FilingStatus::all() {
            let estimator = TaxEstimator::for_status(tables(), *status);
            let deduction = estimator.standard_deduction();

            assert_eq!(estimator.estimate(deduction), dec!(0), "{status}");
            assert_eq!(estimator.estimate(deduction / dec!(2)), dec!(0), "{status}");
            assert!(estimator.estimate(deduction + dec!(1)) > dec!(0), "{status}");
        }
    }

    #[test]
    fn tax_is_continuous_at_every_boundary_for_every_status() {
        for status in FilingStatus::all() {
            let estimator = TaxEstimator::for_status(tables(), *status);
            let deduction = estimator.standard_deduction();

            for bracket in &tables().brackets_for(*status)[1..] {
                let income = bracket.min_income + deduction;
                let below = estimator.estimate(income - dec!(0.01));
                let at = estimator.estimate(income);
                let above = estimator.estimate(income + dec!(0.01));

                assert!(at >= below && above >= at, "{status} at {income}");
                assert!(above - below < dec!(0.01), "{status} jumps at {income}");
            }
        }
    }

    #[test]
    fn allocation_percent_totals_match_declared_tables() {
        for tax_type in TaxType::all() {
            let table = tables().budget_for(*tax_type);
            let allocations = AllocationMapper::new(table).allocate(dec!(2145)).unwrap();
            let allocated: Decimal = allocations.iter().map(|a| a.percent).sum();
            let declared: Decimal = table.iter().map(|c| c.percent).sum();

            assert_eq!(allocated, declared, "{tax_type}");
        }
    }

    #[test]
    fn ten_expenditure_programs() {
        assert_eq!(tables().expenditures.len(), 10);
        assert_eq!(tables().total_state_revenue, dec!(147000000000));
    }
}
