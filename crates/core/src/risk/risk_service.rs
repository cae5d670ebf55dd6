use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};

use crate::analytics::daily_returns;
use crate::constants::{LIQUIDITY_WINDOW_DAYS, RISK_LOOKBACK_DAYS};
use crate::errors::Result;
use crate::observations::ObservationRepositoryTrait;
use crate::portfolios::PortfolioRepositoryTrait;
use crate::risk::risk_calculator::{fund_liquidity, portfolio_components, score_portfolios};
use crate::risk::risk_model::{HighRiskAlert, RiskRunSummary};
use crate::risk::risk_traits::RiskScoreRepositoryTrait;
use crate::utils::time_utils::days_before;

/// Scores every registered portfolio for one run date.
pub struct RiskScoringService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    observations: Arc<dyn ObservationRepositoryTrait>,
    scores: Arc<dyn RiskScoreRepositoryTrait>,
}

impl RiskScoringService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        observations: Arc<dyn ObservationRepositoryTrait>,
        scores: Arc<dyn RiskScoreRepositoryTrait>,
    ) -> Self {
        Self {
            portfolios,
            observations,
            scores,
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RiskRunSummary> {
        let mut summary = RiskRunSummary {
            run_date: today,
            portfolios: 0,
            scored: 0,
            skipped: 0,
        };

        let portfolios = self.portfolios.load_portfolios()?;
        if portfolios.is_empty() {
            warn!("No portfolios found, nothing to score");
            return Ok(summary);
        }
        summary.portfolios = portfolios.len();
        info!("Found {} portfolios to calculate risk for", portfolios.len());

        let observations = self
            .observations
            .load_observations_since(days_before(today, RISK_LOOKBACK_DAYS))?;
        if observations.is_empty() {
            warn!("No fund prices found, skipping risk scoring");
            summary.skipped = portfolios.len();
            return Ok(summary);
        }

        let returns = daily_returns(&observations);
        let liquidity = fund_liquidity(&returns, days_before(today, LIQUIDITY_WINDOW_DAYS));

        let mut components = Vec::with_capacity(portfolios.len());
        for portfolio in &portfolios {
            match portfolio_components(portfolio, &returns, &liquidity) {
                Ok(c) => components.push(c),
                Err(reason) => {
                    summary.skipped += 1;
                    warn!("Portfolio {} skipped: {}", portfolio.id, reason);
                }
            }
        }

        if components.is_empty() {
            warn!("No portfolio components calculated");
            return Ok(summary);
        }

        let scores = score_portfolios(&components, today);
        summary.scored = self.scores.upsert_risk_scores(scores).await?;

        info!(
            "Risk scoring for {} complete: {} scored, {} skipped",
            today, summary.scored, summary.skipped
        );
        Ok(summary)
    }

    pub fn high_risk_alerts(&self) -> Result<Vec<HighRiskAlert>> {
        self.scores.load_latest_high_risk()
    }
}
