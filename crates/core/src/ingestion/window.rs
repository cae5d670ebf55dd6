use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::RETENTION_DAYS;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// What the ingestion controller decided to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "window", rename_all = "camelCase")]
pub enum FetchPlan {
    /// Empty store: fetch the whole retention window.
    Bootstrap(FetchWindow),
    /// Fetch the days after the latest stored observation.
    Incremental(FetchWindow),
    /// Latest stored observation is already today.
    UpToDate,
}

impl FetchPlan {
    pub fn window(&self) -> Option<FetchWindow> {
        match self {
            FetchPlan::Bootstrap(w) | FetchPlan::Incremental(w) => Some(*w),
            FetchPlan::UpToDate => None,
        }
    }
}

/// Decide the fetch range from the latest stored observation date.
///
/// - no data: `[today - RETENTION_DAYS, today]`
/// - latest `L`: `[L + 1, today]`, or nothing when `L + 1 > today`
pub fn plan_fetch(latest: Option<NaiveDate>, today: NaiveDate) -> FetchPlan {
    match latest {
        None => FetchPlan::Bootstrap(FetchWindow {
            start: today - Duration::days(RETENTION_DAYS),
            end: today,
        }),
        Some(latest) => {
            let start = latest + Duration::days(1);
            if start > today {
                FetchPlan::UpToDate
            } else {
                FetchPlan::Incremental(FetchWindow { start, end: today })
            }
        }
    }
}

/// Rows dated strictly before this are purged after a merge.
pub fn retention_cutoff(today: NaiveDate) -> NaiveDate {
    today - Duration::days(RETENTION_DAYS)
}
