//! Display shaping for a [`CalculationResult`]: currency strings, category
//! icons, the featured tax expenditures and the plain-text report used by
//! the CLI.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::common::round_half_up;
use tax_core::{CalculationInput, CalculationResult, ExpenditureShare, FilingStatus, TaxType};

/// Number of expenditure programs shown under an income tax breakdown.
pub const FEATURED_EXPENDITURES: usize = 6;

/// Percentage below which the revenue share is reported as a floor.
const REVENUE_SHARE_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Icon shown on a budget category card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    GraduationCap,
    Heart,
    Users,
    Building,
    Shield,
    Leaf,
    Briefcase,
}

/// Icon for a budget category name. Unlisted categories get
/// [`Icon::Building`].
pub fn category_icon(category: &str) -> Icon {
    match category {
        "Education/School Aid" | "Higher Education" => Icon::GraduationCap,
        "Health/Medicaid" | "Mental Hygiene" => Icon::Heart,
        "Social Welfare Programs" | "Elected Officials & Government Operations" => Icon::Users,
        "Public Safety & Justice" | "Emergency Services & Preparedness" => Icon::Shield,
        "Environmental Protection" | "Agriculture & Rural Development" => Icon::Leaf,
        "Economic Development" | "Economic Development & Business Programs" => Icon::Briefcase,
        _ => Icon::Building,
    }
}

/// US dollar amount with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = round_half_up(amount);
    rounded.rescale(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${grouped}.{cents}", if negative { "-" } else { "" })
}

/// Share of total state revenue as shown to the user.
pub fn revenue_share_text(percent: Decimal) -> String {
    if percent < REVENUE_SHARE_FLOOR {
        return "Less than 0.01%".to_string();
    }
    let mut shown = percent.round_dp(4);
    shown.rescale(4);
    format!("{shown}%")
}

/// Expenditure programs listed under the breakdown: the first
/// [`FEATURED_EXPENDITURES`] for income tax, none otherwise.
pub fn featured_expenditures(result: &CalculationResult) -> &[ExpenditureShare] {
    match result.tax_type {
        TaxType::Income => {
            let end = result.expenditure_shares.len().min(FEATURED_EXPENDITURES);
            &result.expenditure_shares[..end]
        }
        TaxType::Corporate | TaxType::Sales => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCard {
    pub category: String,
    pub amount: Decimal,
    pub formatted_amount: String,
    pub percent: Decimal,
    pub description: String,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenditureCard {
    pub program: String,
    pub share: Decimal,
    pub formatted_share: String,
    pub description: String,
}

/// Body returned by `POST /api/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub tax_type_label: String,
    pub estimated_tax: Decimal,
    pub formatted_tax: String,
    /// "Based on $50,000.00 income, Single status" for income-based runs.
    pub basis: Option<String>,
    pub categories: Vec<CategoryCard>,
    pub expenditures: Vec<ExpenditureCard>,
    pub revenue_share: String,
    pub result: CalculationResult,
}

impl CalculationResponse {
    pub fn new(
        input: &CalculationInput,
        result: CalculationResult,
    ) -> Self {
        let basis = match input {
            CalculationInput::Income {
                income,
                filing_status,
                ..
            } => Some(basis_line(*income, *filing_status)),
            CalculationInput::Direct { .. } => None,
        };

        let categories = result
            .allocations
            .iter()
            .map(|a| CategoryCard {
                category: a.category.clone(),
                amount: round_half_up(a.amount),
                formatted_amount: format_currency(a.amount),
                percent: a.percent,
                description: a.description.clone(),
                icon: category_icon(&a.category),
            })
            .collect();

        let expenditures = featured_expenditures(&result)
            .iter()
            .map(|s| ExpenditureCard {
                program: s.program.clone(),
                share: round_half_up(s.share),
                formatted_share: format_currency(s.share),
                description: s.description.clone(),
            })
            .collect();

        Self {
            tax_type_label: result.tax_type.label().to_string(),
            estimated_tax: round_half_up(result.estimated_tax),
            formatted_tax: format_currency(result.estimated_tax),
            basis,
            categories,
            expenditures,
            revenue_share: revenue_share_text(result.revenue_share_percent),
            result,
        }
    }
}

fn basis_line(
    income: Decimal,
    status: FilingStatus,
) -> String {
    format!(
        "Based on {} income, {} status",
        format_currency(income),
        status.label()
    )
}

/// Plain-text report of a calculation.
pub fn render_text(response: &CalculationResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Your {} Breakdown", response.tax_type_label);
    let _ = writeln!(out, "{}: {}", response.tax_type_label, response.formatted_tax);
    if let Some(basis) = &response.basis {
        let _ = writeln!(out, "{basis}");
    }
    out.push('\n');

    let width = response
        .categories
        .iter()
        .map(|c| c.category.len())
        .max()
        .unwrap_or(0);
    for card in &response.categories {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>14}  {:>3}% of budget",
            card.category, card.formatted_amount, card.percent
        );
    }

    if !response.expenditures.is_empty() {
        out.push_str("\nTax Credits & Exemptions You Help Fund\n");
        for card in &response.expenditures {
            let _ = writeln!(out, "  {:<40}  {:>10}", card.program, card.formatted_share);
        }
    }

    let _ = writeln!(
        out,
        "\nYour contribution: {} ({} of total revenue)",
        response.formatted_tax, response.revenue_share
    );
    out
}
