use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_DAYS, DEFAULT_CHUNK_PAUSE_MS};
use crate::errors::{Error, Result};
use crate::ingestion::window::FetchPlan;
use crate::observations::MergeOutcome;

/// Chunking and pacing of data source requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    pub chunk_days: i64,
    pub chunk_pause: Duration,
}

impl IngestionConfig {
    pub fn new(chunk_days: i64, chunk_pause: Duration) -> Result<Self> {
        if chunk_days < 1 {
            return Err(Error::InvalidConfigValue(format!(
                "chunk size must be at least 1 day, got {}",
                chunk_days
            )));
        }
        Ok(Self {
            chunk_days,
            chunk_pause,
        })
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_days: DEFAULT_CHUNK_DAYS,
            chunk_pause: Duration::from_millis(DEFAULT_CHUNK_PAUSE_MS),
        }
    }
}

/// Outcome of one ingestion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSummary {
    pub run_date: NaiveDate,
    pub plan: FetchPlan,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub fetched_records: usize,
    pub dropped_records: usize,
    pub observations: MergeOutcome,
    pub allocations: MergeOutcome,
}

impl IngestionSummary {
    pub fn up_to_date(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            plan: FetchPlan::UpToDate,
            chunks: 0,
            failed_chunks: 0,
            fetched_records: 0,
            dropped_records: 0,
            observations: MergeOutcome::default(),
            allocations: MergeOutcome::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_days_must_be_positive() {
        assert!(IngestionConfig::new(0, Duration::ZERO).is_err());
        assert!(IngestionConfig::new(-3, Duration::ZERO).is_err());
        assert_eq!(IngestionConfig::new(1, Duration::ZERO).unwrap().chunk_days, 1);
    }

    #[test]
    fn test_default_config() {
        let config = IngestionConfig::default();
        assert_eq!(config.chunk_days, 7);
        assert_eq!(config.chunk_pause, Duration::from_secs(1));
    }
}
