use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};

use crate::analytics::daily_returns;
use crate::constants::PERFORMANCE_LOOKBACK_DAYS;
use crate::errors::Result;
use crate::labels::FundLabelRepositoryTrait;
use crate::observations::ObservationRepositoryTrait;
use crate::performance::performance_calculator::{evaluate_peers, evaluation_window, fund_scores};
use crate::performance::performance_model::{PerformanceRunSummary, UnderperformerAlert};
use crate::performance::performance_traits::PerformanceRepositoryTrait;
use crate::utils::time_utils::days_before;

/// Evaluates every fund against its peers and stores the result under the
/// most recent observed return date.
pub struct PerformanceService {
    observations: Arc<dyn ObservationRepositoryTrait>,
    labels: Arc<dyn FundLabelRepositoryTrait>,
    metrics: Arc<dyn PerformanceRepositoryTrait>,
}

impl PerformanceService {
    pub fn new(
        observations: Arc<dyn ObservationRepositoryTrait>,
        labels: Arc<dyn FundLabelRepositoryTrait>,
        metrics: Arc<dyn PerformanceRepositoryTrait>,
    ) -> Self {
        Self {
            observations,
            labels,
            metrics,
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<PerformanceRunSummary> {
        let mut summary = PerformanceRunSummary {
            run_date: today,
            metric_date: None,
            evaluated: 0,
            poor_performers: 0,
        };

        let observations = self
            .observations
            .load_observations_since(days_before(today, PERFORMANCE_LOOKBACK_DAYS))?;
        if observations.is_empty() {
            warn!("No fund prices found, skipping performance evaluation");
            return Ok(summary);
        }

        let returns = daily_returns(&observations);
        let Some(window) = evaluation_window(&returns) else {
            warn!("No data in 90-day window for fund performance");
            return Ok(summary);
        };

        let labels: HashMap<_, _> = self
            .labels
            .load_labels()?
            .into_iter()
            .map(|l| (l.fund_code.clone(), l))
            .collect();

        let scores = fund_scores(&returns, &labels, window);
        if scores.is_empty() {
            warn!("No funds had sufficient data for performance metrics");
            return Ok(summary);
        }

        let metrics = evaluate_peers(&scores, window.1);
        let poor_performers = metrics.iter().filter(|m| m.is_poor_performer).count();
        info!(
            "Calculated performance for {} funds as of {}, poor performers flagged: {}",
            metrics.len(),
            window.1,
            poor_performers
        );

        summary.metric_date = Some(window.1);
        summary.evaluated = self.metrics.upsert_performance_metrics(metrics).await?;
        summary.poor_performers = poor_performers;
        Ok(summary)
    }

    pub fn underperformer_alerts(&self) -> Result<Vec<UnderperformerAlert>> {
        self.metrics.load_latest_poor_performers()
    }
}
