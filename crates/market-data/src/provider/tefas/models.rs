use serde::Deserialize;

use crate::models::WideRow;

/// Envelope of the history endpoints: `{"draw": .., "recordsTotal": .., "data": [...]}`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct HistoryResponse {
    #[serde(default)]
    pub data: Vec<WideRow>,
}

/// Source column names of the history-info endpoint.
pub(super) const COL_DATE: &str = "TARIH";
pub(super) const COL_CODE: &str = "FONKODU";
pub(super) const COL_TITLE: &str = "FONUNVAN";
pub(super) const COL_PRICE: &str = "FIYAT";
pub(super) const COL_SHARES: &str = "TEDPAYSAYISI";
pub(super) const COL_INVESTORS: &str = "KISISAYISI";
pub(super) const COL_MARKET_CAP: &str = "PORTFOYBUYUKLUK";
pub(super) const COL_BULLETIN_PRICE: &str = "BORSABULTENFIYAT";

/// Allocation columns that identify the row rather than an instrument.
pub(super) const ALLOCATION_KEY_COLUMNS: [&str; 4] =
    [COL_DATE, COL_CODE, COL_TITLE, COL_BULLETIN_PRICE];
