use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace, a leading `$` and thousands separators.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .replace(',', "")
}

/// Parses a form amount such as `"50,000"` or `"$1,234.56"`.
///
/// Empty input is `Ok(None)`; anything else that is not a number is an error.
pub fn parse_amount(s: &str) -> Result<Option<Decimal>, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized
        .parse()
        .map(Some)
        .map_err(|e| ParseAmountError {
            input: s.to_string(),
            source: e,
        })
}

/// Like [`parse_amount`] but treats invalid input as missing, logging a
/// warning.
pub fn parse_optional_amount(s: &str) -> Option<Decimal> {
    parse_amount(s).unwrap_or_else(|e| {
        tracing::warn!("{e}");
        None
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

/// Serde helper for request amounts that may arrive as JSON numbers or as
/// strings. Empty, non-numeric or non-scalar values deserialize to `None`.
pub fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawAmount> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawAmount::Number(n)) => parse_optional_amount(&n.to_string()),
        Some(RawAmount::Text(s)) => parse_optional_amount(&s),
        Some(RawAmount::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_lenient_amount")]
        amount: Option<Decimal>,
    }

    fn amount(json: &str) -> Option<Decimal> {
        serde_json::from_str::<Body>(json).unwrap().amount
    }

    #[test]
    fn parse_amount_accepts_separators_and_dollar_sign() {
        assert_eq!(parse_amount("1,234.56").unwrap(), Some(dec!(1234.56)));
        assert_eq!(parse_amount(" $50,000 ").unwrap(), Some(dec!(50000)));
    }

    #[test]
    fn parse_amount_empty_is_none() {
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount("   ").unwrap(), None);
    }

    #[test]
    fn parse_amount_invalid_is_error() {
        let err = parse_amount("abc").unwrap_err();
        assert!(err.to_string().starts_with("invalid amount 'abc'"));
    }

    #[test]
    fn parse_optional_amount_swallows_invalid() {
        assert_eq!(parse_optional_amount("12x"), None);
        assert_eq!(parse_optional_amount("-5"), Some(dec!(-5)));
    }

    #[test]
    fn lenient_amount_accepts_numbers_and_strings() {
        assert_eq!(amount(r#"{"amount": 50000}"#), Some(dec!(50000)));
        assert_eq!(amount(r#"{"amount": 1234.5}"#), Some(dec!(1234.5)));
        assert_eq!(amount(r#"{"amount": "75,000"}"#), Some(dec!(75000)));
    }

    #[test]
    fn lenient_amount_maps_junk_to_none() {
        assert_eq!(amount(r#"{}"#), None);
        assert_eq!(amount(r#"{"amount": null}"#), None);
        assert_eq!(amount(r#"{"amount": ""}"#), None);
        assert_eq!(amount(r#"{"amount": "lots"}"#), None);
        assert_eq!(amount(r#"{"amount": [1]}"#), None);
        assert_eq!(amount(r#"{"amount": true}"#), None);
    }
}
