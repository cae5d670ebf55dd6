//! Fund data provider trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::FundRecord;

use super::capabilities::RateLimit;

/// Trait for fund data sources.
///
/// A provider returns every fund's daily record for an inclusive date range.
/// An empty vector is a valid answer (weekends, holidays).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use fundwatch_market_data::{FundDataProvider, FundRecord, MarketDataError, RateLimit};
///
/// struct StaticProvider(Vec<FundRecord>);
///
/// #[async_trait]
/// impl FundDataProvider for StaticProvider {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     async fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FundRecord>, MarketDataError> {
///         Ok(self.0.iter().filter(|r| r.date >= start && r.date <= end).cloned().collect())
///     }
/// }
/// ```
#[async_trait]
pub trait FundDataProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Rate limits that callers should respect.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch all fund records dated within `[start, end]`.
    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FundRecord>, MarketDataError>;
}
