//! CSV import of fund labels.
//!
//! Expected header: `code,category,main_category`. Empty cells are unknown
//! labels. Column order does not matter; extra columns are ignored.

use std::collections::BTreeMap;
use std::io::Read;

use csv::{ReaderBuilder, Trim};
use log::warn;
use serde::Deserialize;

use crate::errors::{Result, ValidationError};
use crate::labels::labels_model::FundLabel;

#[derive(Debug, Deserialize)]
struct LabelRow {
    code: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    main_category: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a label CSV. Later rows win over earlier rows for the same code;
/// rows without a code are skipped. Output is ordered by fund code.
pub fn parse_labels_csv<R: Read>(reader: R) -> Result<Vec<FundLabel>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if !headers.iter().any(|h| h == "code") {
        return Err(ValidationError::MissingField("code".to_string()).into());
    }

    let mut labels = BTreeMap::new();
    for (index, row) in csv_reader.deserialize::<LabelRow>().enumerate() {
        let row = row?;
        if row.code.is_empty() {
            warn!("Skipping label row {} without a fund code", index + 1);
            continue;
        }
        labels.insert(
            row.code.clone(),
            FundLabel {
                fund_code: row.code,
                category: non_empty(row.category),
                main_category: non_empty(row.main_category),
            },
        );
    }

    Ok(labels.into_values().collect())
}
