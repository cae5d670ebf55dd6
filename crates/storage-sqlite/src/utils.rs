//! Helpers shared by the repositories.

use chrono::NaiveDate;

use crate::errors::StorageError;

/// Dates are stored as ISO text so lexical order equals calendar order.
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound on bound parameters per statement.
///
/// SQLite builds older than 3.32 cap a statement at 999 variables.
pub const SQLITE_MAX_PARAMS: usize = 999;

pub fn format_db_date(date: NaiveDate) -> String {
    date.format(DB_DATE_FORMAT).to_string()
}

pub fn parse_db_date(value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DB_DATE_FORMAT)
        .map_err(|e| StorageError::InvalidStoredValue(format!("date '{}': {}", value, e)))
}

/// Splits rows for a multi-row INSERT so each statement stays under
/// [`SQLITE_MAX_PARAMS`] given `columns` bound values per row.
pub fn chunk_for_sqlite<T>(items: &[T], columns: usize) -> impl Iterator<Item = &[T]> {
    let rows_per_chunk = (SQLITE_MAX_PARAMS / columns.max(1)).max(1);
    items.chunks(rows_per_chunk)
}
