use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::MarketDataError;

/// Columns of a crawler row that are fund metadata rather than allocations.
///
/// Every other column of a wide row is an instrument type whose value is the
/// percentage of the fund's portfolio held in that instrument.
pub const METADATA_COLUMNS: [&str; 7] = [
    "date",
    "code",
    "title",
    "price",
    "market_cap",
    "number_of_shares",
    "number_of_investors",
];

/// One crawler row, keyed by column name.
pub type WideRow = serde_json::Map<String, Value>;

/// Daily record of one fund as published by the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRecord {
    pub date: NaiveDate,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub number_of_shares: Option<f64>,
    pub number_of_investors: Option<f64>,

    /// Instrument type -> allocation percentage. Unparseable cells are `None`.
    #[serde(default)]
    pub allocations: BTreeMap<String, Option<f64>>,
}

impl FundRecord {
    /// Create a record with metadata only.
    pub fn new(date: NaiveDate, code: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            date,
            code: code.into(),
            title: None,
            price,
            market_cap: None,
            number_of_shares: None,
            number_of_investors: None,
            allocations: BTreeMap::new(),
        }
    }

    /// Build a record from a wide row.
    ///
    /// `date` must be an ISO `YYYY-MM-DD` string and `code` a non-empty
    /// string. Columns not listed in [`METADATA_COLUMNS`] become allocations.
    pub fn from_wide_row(row: &WideRow, provider: &str) -> Result<Self, MarketDataError> {
        let parse_err = |message: String| MarketDataError::Parse {
            provider: provider.to_string(),
            message,
        };

        let date = row
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| parse_err("row without date".to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| parse_err(format!("invalid date '{}': {}", date, e)))?;

        let code = row
            .get("code")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| parse_err(format!("row dated {} without fund code", date)))?;

        let allocations = row
            .iter()
            .filter(|(column, _)| !METADATA_COLUMNS.contains(&column.as_str()))
            .map(|(column, value)| (column.clone(), numeric(value)))
            .collect();

        Ok(Self {
            date,
            code: code.to_string(),
            title: row.get("title").and_then(Value::as_str).map(str::to_string),
            price: row.get("price").and_then(numeric),
            market_cap: row.get("market_cap").and_then(numeric),
            number_of_shares: row.get("number_of_shares").and_then(numeric),
            number_of_investors: row.get("number_of_investors").and_then(numeric),
            allocations,
        })
    }
}

/// Interpret a cell as a float. Numeric strings are accepted.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> WideRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_from_wide_row_splits_metadata_and_allocations() {
        let row = row(json!({
            "date": "2024-01-10",
            "code": "AAK",
            "title": "Sample Fund",
            "price": 12.5,
            "market_cap": 1000000.0,
            "number_of_shares": 80000,
            "number_of_investors": "1520",
            "stock": 64.2,
            "government_bond": 0.0,
            "repo": null
        }));

        let record = FundRecord::from_wide_row(&row, "TEST").unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(record.code, "AAK");
        assert_eq!(record.title.as_deref(), Some("Sample Fund"));
        assert_eq!(record.price, Some(12.5));
        assert_eq!(record.number_of_shares, Some(80000.0));
        assert_eq!(record.number_of_investors, Some(1520.0));
        assert_eq!(record.allocations.len(), 3);
        assert_eq!(record.allocations["stock"], Some(64.2));
        assert_eq!(record.allocations["government_bond"], Some(0.0));
        assert_eq!(record.allocations["repo"], None);
    }

    #[test]
    fn test_from_wide_row_requires_code_and_date() {
        let missing_code = row(json!({ "date": "2024-01-10", "price": 1.0 }));
        assert!(FundRecord::from_wide_row(&missing_code, "TEST").is_err());

        let bad_date = row(json!({ "date": "10.01.2024", "code": "AAK" }));
        let err = FundRecord::from_wide_row(&bad_date, "TEST").unwrap_err();
        assert!(matches!(err, MarketDataError::Parse { .. }));
    }

    #[test]
    fn test_non_numeric_price_is_none() {
        let row = row(json!({ "date": "2024-01-10", "code": "AAK", "price": "n/a" }));
        let record = FundRecord::from_wide_row(&row, "TEST").unwrap();
        assert_eq!(record.price, None);
        assert!(record.allocations.is_empty());
    }
}
