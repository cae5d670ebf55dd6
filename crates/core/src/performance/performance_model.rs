use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Risk-adjusted 90-day figures of one fund, before peer comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct FundScore {
    pub fund_code: String,
    pub sharpe_like: f64,
    pub total_return: f64,
    pub volatility: f64,
    pub category: Option<String>,
    pub main_category: Option<String>,
}

/// Stored result row. One per (fund_code, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundPerformanceMetric {
    pub fund_code: String,
    pub date: NaiveDate,
    /// Percentile of the Sharpe-like score within the peer group, in (0, 1].
    pub performance_score: f64,
    /// Category value, main category value, or `ALL`.
    pub peer_category: String,
    pub is_poor_performer: bool,
    /// Only present when flagged.
    pub confidence: Option<f64>,
}

/// Latest flagged row of a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderperformerAlert {
    pub fund_code: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRunSummary {
    pub run_date: NaiveDate,
    /// Date the metrics were stored under: the most recent return date.
    pub metric_date: Option<NaiveDate>,
    pub evaluated: usize,
    pub poor_performers: usize,
}
