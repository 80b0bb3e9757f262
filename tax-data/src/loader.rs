use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{FilingStatus, TablesError, TaxBracket, TaxTables};
use thiserror::Error;

/// Errors that can occur when loading bracket overrides.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown filing status '{0}'")]
    UnknownStatus(String),

    #[error("Invalid bracket table: {0}")]
    InvalidTable(#[from] TablesError),
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a bracket CSV file.
///
/// - `filing_status`: form code (`single`, `marriedJoint`, ...)
/// - `min_income`: lower bound of taxable income for the bracket
/// - `max_income`: upper bound, empty for the top bracket
/// - `rate`: marginal rate as a decimal (e.g. `0.055`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub filing_status: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reads bracket tables from CSV and swaps them into a [`TaxTables`].
///
/// Rows for one status are kept in file order. Statuses that do not appear
/// in the file keep their existing table.
pub struct BracketCsvLoader;

impl BracketCsvLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups records into one bracket table per filing status.
    pub fn group(
        records: &[BracketRecord]
    ) -> Result<BTreeMap<FilingStatus, Vec<TaxBracket>>, BracketLoaderError> {
        let mut tables: BTreeMap<FilingStatus, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            let status = FilingStatus::parse(record.filing_status.trim())
                .ok_or_else(|| BracketLoaderError::UnknownStatus(record.filing_status.clone()))?;
            tables.entry(status).or_default().push(TaxBracket::new(
                record.min_income,
                record.max_income,
                record.rate,
            ));
        }

        Ok(tables)
    }

    /// Replaces the bracket tables of every status present in `records` and
    /// validates the result. `tables` is left untouched on error.
    ///
    /// Returns the number of statuses replaced.
    pub fn apply(
        tables: &mut TaxTables,
        records: &[BracketRecord],
    ) -> Result<usize, BracketLoaderError> {
        let grouped = Self::group(records)?;
        let replaced = grouped.len();

        let mut candidate = tables.clone();
        candidate.brackets.extend(grouped);
        candidate.validate()?;

        *tables = candidate;
        Ok(replaced)
    }

    /// Parses `reader` and applies it on top of `base`.
    pub fn load<R: Read>(
        base: &TaxTables,
        reader: R,
    ) -> Result<TaxTables, BracketLoaderError> {
        let records = Self::parse(reader)?;
        let mut tables = base.clone();
        Self::apply(&mut tables, &records)?;
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "filing_status,min_income,max_income,rate\n";

    fn csv(rows: &str) -> String {
        format!("{HEADER}{rows}")
    }

    #[test]
    fn parses_bounded_row() {
        let records = BracketCsvLoader::parse(csv("single,0,8500,0.04").as_bytes()).unwrap();

        assert_eq!(
            records,
            vec![BracketRecord {
                filing_status: "single".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(8500)),
                rate: dec!(0.04),
            }]
        );
    }

    #[test]
    fn empty_max_income_is_unbounded() {
        let records =
            BracketCsvLoader::parse(csv("single,25000000,,0.109").as_bytes()).unwrap();

        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].rate, dec!(0.109));
    }

    #[test]
    fn header_only_is_empty() {
        let records = BracketCsvLoader::parse(HEADER.as_bytes()).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn missing_column_is_parse_error() {
        let err = BracketCsvLoader::parse("filing_status,min_income\nsingle,0".as_bytes())
            .expect_err("missing columns");

        let BracketLoaderError::CsvParse(msg) = err else {
            panic!("expected CsvParse, got {err:?}");
        };
        assert!(msg.contains("missing field"), "{msg}");
    }

    #[test]
    fn bad_decimal_is_parse_error() {
        let err = BracketCsvLoader::parse(csv("single,abc,8500,0.04").as_bytes())
            .expect_err("bad decimal");

        assert!(matches!(err, BracketLoaderError::CsvParse(_)));
    }

    #[test]
    fn group_keeps_file_order_per_status() {
        let records = BracketCsvLoader::parse(
            csv("single,0,1000,0.04\nmarriedJoint,0,,0.05\nsingle,1000,,0.06").as_bytes(),
        )
        .unwrap();

        let grouped = BracketCsvLoader::group(&records).unwrap();

        assert_eq!(grouped.len(), 2);
        let single = &grouped[&FilingStatus::Single];
        assert_eq!(single[0].tax_rate, dec!(0.04));
        assert_eq!(single[1].min_income, dec!(1000));
        assert_eq!(grouped[&FilingStatus::MarriedJoint][0].tax_rate, dec!(0.05));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let records = BracketCsvLoader::parse(csv("S,0,,0.04").as_bytes()).unwrap();

        match BracketCsvLoader::group(&records) {
            Err(BracketLoaderError::UnknownStatus(code)) => assert_eq!(code, "S"),
            other => panic!("expected UnknownStatus, got {other:?}"),
        }
    }

    #[test]
    fn apply_replaces_only_listed_statuses() {
        let mut tables = crate::new_york::build();
        let before_joint = tables.brackets[&FilingStatus::MarriedJoint].clone();
        let records =
            BracketCsvLoader::parse(csv("single,0,10000,0.04\nsingle,10000,,0.05").as_bytes())
                .unwrap();

        let replaced = BracketCsvLoader::apply(&mut tables, &records).unwrap();

        assert_eq!(replaced, 1);
        assert_eq!(tables.brackets[&FilingStatus::Single].len(), 2);
        assert_eq!(tables.brackets[&FilingStatus::MarriedJoint], before_joint);
    }

    #[test]
    fn apply_leaves_tables_untouched_on_invalid_table() {
        let mut tables = crate::new_york::build();
        let original = tables.clone();
        let records =
            BracketCsvLoader::parse(csv("single,0,10000,0.04\nsingle,12000,,0.05").as_bytes())
                .unwrap();

        let err = BracketCsvLoader::apply(&mut tables, &records).expect_err("gap");

        assert!(matches!(
            err,
            BracketLoaderError::InvalidTable(TablesError::NonContiguous { index: 1, .. })
        ));
        assert_eq!(tables, original);
    }
}
