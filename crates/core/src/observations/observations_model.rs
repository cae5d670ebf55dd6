use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fund's published figures for one day. Keyed by (date, fund_code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundObservation {
    pub date: NaiveDate,
    pub fund_code: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub investor_count: Option<f64>,
}

impl FundObservation {
    pub fn key(&self) -> (NaiveDate, &str) {
        (self.date, self.fund_code.as_str())
    }
}

/// Share of a fund's portfolio held in one instrument type on one day.
/// Keyed by (date, fund_code, instrument_type); `percentage` is always > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentAllocation {
    pub date: NaiveDate,
    pub fund_code: String,
    pub instrument_type: String,
    pub percentage: f64,
}

impl InstrumentAllocation {
    pub fn key(&self) -> (NaiveDate, &str, &str) {
        (
            self.date,
            self.fund_code.as_str(),
            self.instrument_type.as_str(),
        )
    }
}

/// Result of one merge-then-purge batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Rows inserted or overwritten.
    pub upserted: usize,
    /// Rows deleted by the retention cutoff.
    pub purged: usize,
}
