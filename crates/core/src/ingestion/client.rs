//! Chunked, paced access to a fund data provider.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate};
use log::{debug, error, info, warn};

use fundwatch_market_data::{FundDataProvider, FundRecord, MarketDataError, RetryClass};

use crate::errors::{Result, ValidationError};
use crate::ingestion::ingestion_model::IngestionConfig;

/// Records gathered over a range plus per-chunk bookkeeping.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub records: Vec<FundRecord>,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub empty_chunks: usize,
}

/// Wraps a provider with range validation, chunking and pacing.
///
/// A failing chunk is retried once when its error is transient and then
/// logged and skipped, so a range where every chunk fails yields an empty
/// report rather than an error.
pub struct FundDataClient {
    provider: Arc<dyn FundDataProvider>,
    config: IngestionConfig,
}

impl FundDataClient {
    pub fn new(provider: Arc<dyn FundDataProvider>, config: IngestionConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Pause between requests: the configured pause, raised to the provider's minimum delay.
    fn pause(&self) -> Duration {
        self.config
            .chunk_pause
            .max(self.provider.rate_limit().min_delay)
    }

    /// Fetch `[start, end]` in chunks of `chunk_days`.
    ///
    /// Fails before any request when `end` is after `today` or `start` is
    /// after `end`.
    pub async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<FetchReport> {
        if end > today {
            let message = format!("End date {} cannot be in the future (today is {})", end, today);
            error!("{}", message);
            return Err(ValidationError::InvalidDateRange(message).into());
        }
        if start > end {
            let message = format!("Start date {} cannot be after end date {}", start, end);
            error!("{}", message);
            return Err(ValidationError::InvalidDateRange(message).into());
        }

        let chunks = chunk_range(start, end, self.config.chunk_days);
        let pause = self.pause();
        info!(
            "Fetching data from {} to {} ({} days, {} chunks) via {}",
            start,
            end,
            (end - start).num_days() + 1,
            chunks.len(),
            self.provider.id()
        );

        let mut report = FetchReport {
            chunks: chunks.len(),
            ..FetchReport::default()
        };

        for (index, (chunk_start, chunk_end)) in chunks.into_iter().enumerate() {
            if index > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            debug!("Processing from {} to {}", chunk_start, chunk_end);
            match self.fetch_chunk(chunk_start, chunk_end, pause).await {
                Ok(records) if records.is_empty() => {
                    report.empty_chunks += 1;
                    warn!("No data returned for {} to {}", chunk_start, chunk_end);
                }
                Ok(records) => {
                    debug!(
                        "Fetched {} records for {} to {}",
                        records.len(),
                        chunk_start,
                        chunk_end
                    );
                    report.records.extend(records);
                }
                Err(e) => {
                    report.failed_chunks += 1;
                    error!(
                        "Error fetching data for {} to {}: {}",
                        chunk_start, chunk_end, e
                    );
                }
            }
        }

        if report.records.is_empty() {
            warn!(
                "No data fetched from {} for {} to {}, returning empty batch",
                self.provider.id(),
                start,
                end
            );
        }

        Ok(report)
    }

    async fn fetch_chunk(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        pause: Duration,
    ) -> std::result::Result<Vec<FundRecord>, MarketDataError> {
        match self.provider.fetch(start, end).await {
            Err(e) if e.retry_class() == RetryClass::WithBackoff => {
                warn!("Transient error for {} to {} ({}), retrying once", start, end, e);
                tokio::time::sleep(pause).await;
                self.provider.fetch(start, end).await
            }
            other => other,
        }
    }
}

/// Split `[start, end]` into consecutive inclusive ranges of at most
/// `chunk_days` days. `chunk_days` below 1 is treated as 1.
pub fn chunk_range(start: NaiveDate, end: NaiveDate, chunk_days: i64) -> Vec<(NaiveDate, NaiveDate)> {
    let step = chunk_days.max(1);
    let mut chunks = Vec::new();
    let mut current = start;
    while current <= end {
        let chunk_end = (current + ChronoDuration::days(step - 1)).min(end);
        chunks.push((current, chunk_end));
        current = chunk_end + ChronoDuration::days(1);
    }
    chunks
}
