use async_trait::async_trait;

use crate::errors::Result;
use crate::performance::performance_model::{FundPerformanceMetric, UnderperformerAlert};

/// Trait for the fund performance metric table.
#[async_trait]
pub trait PerformanceRepositoryTrait: Send + Sync {
    /// Insert or overwrite one row per (fund_code, date) in one transaction.
    async fn upsert_performance_metrics(&self, metrics: Vec<FundPerformanceMetric>)
        -> Result<usize>;

    /// For each fund, its most recent flagged row, ordered by fund code.
    fn load_latest_poor_performers(&self) -> Result<Vec<UnderperformerAlert>>;
}
