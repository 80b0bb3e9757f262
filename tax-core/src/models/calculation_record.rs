use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Allocation entry as stored in the analytics record. `amount` is rounded
/// to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub amount: Decimal,
    pub percent: Decimal,
    pub description: String,
}

/// Analytics document posted after a calculation (no id or timestamps).
///
/// Every field is optional on the wire and the save endpoint stores whatever
/// the client sent. The code fields stay plain strings: an unrecognised
/// filing status or tax type is recorded verbatim, not mapped or rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalculationRecord {
    #[serde(default)]
    pub income: Option<Decimal>,
    /// Filing status code, e.g. `marriedJoint`.
    #[serde(default)]
    pub filing_status: Option<String>,
    /// Tax type code, e.g. `sales`.
    #[serde(default)]
    pub tax_type: Option<String>,
    #[serde(default)]
    pub calculated_tax: Option<Decimal>,
    #[serde(default)]
    pub tax_amount_entered: Option<Decimal>,
    /// `income_based` or `direct_entry` when produced by this service.
    #[serde(default)]
    pub calculation_method: Option<String>,
    #[serde(default)]
    pub allocations: BTreeMap<String, AllocationEntry>,
}

/// Request details captured alongside a saved record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub ip_address: String,
    pub user_agent: String,
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self {
            ip_address: "unknown".to_string(),
            user_agent: String::new(),
        }
    }
}

/// A persisted analytics row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCalculation {
    pub id: i64,
    pub session_id: String,
    #[serde(flatten)]
    pub record: NewCalculationRecord,
    #[serde(flatten)]
    pub metadata: RequestMetadata,
    pub created_at: DateTime<Utc>,
}

/// Reply from the save-calculation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCalculationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveCalculationResponse {
    pub fn saved(session_id: impl Into<String>) -> Self {
        Self {
            success: true,
            session_id: Some(session_id.into()),
            message: Some("Calculation saved successfully".to_string()),
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            session_id: None,
            message: None,
            error: Some("Failed to save calculation".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deserializes_camel_case_document() {
        let json = r#"{
            "income": 50000,
            "filingStatus": "single",
            "taxType": "income",
            "calculatedTax": "2145.00",
            "taxAmountEntered": null,
            "calculationMethod": "income_based",
            "allocations": {
                "Health/Medicaid": { "amount": "579.15", "percent": 27, "description": "Medicaid" }
            }
        }"#;

        let record: NewCalculationRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.income, Some(dec!(50000)));
        assert_eq!(record.filing_status.as_deref(), Some("single"));
        assert_eq!(record.calculated_tax, Some(dec!(2145.00)));
        assert_eq!(record.tax_amount_entered, None);
        assert_eq!(record.calculation_method.as_deref(), Some("income_based"));
        assert_eq!(record.allocations["Health/Medicaid"].amount, dec!(579.15));
    }

    #[test]
    fn unrecognised_codes_are_kept_verbatim() {
        let json = r#"{
            "filingStatus": "S",
            "taxType": "property",
            "calculationMethod": "guess"
        }"#;

        let record: NewCalculationRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.filing_status.as_deref(), Some("S"));
        assert_eq!(record.tax_type.as_deref(), Some("property"));
        assert_eq!(record.calculation_method.as_deref(), Some("guess"));
        assert_eq!(
            serde_json::to_value(&record).unwrap()["filingStatus"],
            serde_json::json!("S")
        );
    }

    #[test]
    fn empty_document_is_accepted() {
        let record: NewCalculationRecord = serde_json::from_str("{}").unwrap();

        assert_eq!(record, NewCalculationRecord::default());
    }

    #[test]
    fn failed_response_omits_session_id() {
        let json = serde_json::to_value(SaveCalculationResponse::failed()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Failed to save calculation" })
        );
    }

    #[test]
    fn saved_response_carries_session_id() {
        let json = serde_json::to_value(SaveCalculationResponse::saved("abc")).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["message"], "Calculation saved successfully");
    }
}
