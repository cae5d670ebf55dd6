use async_trait::async_trait;

use crate::errors::Result;
use crate::risk::risk_model::{HighRiskAlert, PortfolioRiskScore};

/// Trait for the portfolio risk score table.
#[async_trait]
pub trait RiskScoreRepositoryTrait: Send + Sync {
    /// Insert or overwrite one row per (portfolio_id, date) in one transaction.
    async fn upsert_risk_scores(&self, scores: Vec<PortfolioRiskScore>) -> Result<usize>;

    /// For each portfolio, its most recent HIGH row, ordered by portfolio id.
    fn load_latest_high_risk(&self) -> Result<Vec<HighRiskAlert>>;
}
