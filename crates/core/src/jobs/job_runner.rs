use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ingestion::{IngestionService, IngestionSummary};
use crate::jobs::job_guard::{JobKind, JobLocks};
use crate::performance::{PerformanceRunSummary, PerformanceService};
use crate::risk::{RiskRunSummary, RiskScoringService};
use crate::utils::time_utils::pipeline_today;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub ingestion: IngestionSummary,
    pub risk: RiskRunSummary,
    pub performance: PerformanceRunSummary,
}

/// Entry point for every job.
///
/// Each invocation computes "today" once in the pipeline timezone and holds
/// the run guard of its kind until it returns.
pub struct JobRunner {
    ingestion: Arc<IngestionService>,
    risk: Arc<RiskScoringService>,
    performance: Arc<PerformanceService>,
    timezone: Tz,
    locks: JobLocks,
}

impl JobRunner {
    pub fn new(
        ingestion: Arc<IngestionService>,
        risk: Arc<RiskScoringService>,
        performance: Arc<PerformanceService>,
        timezone: Tz,
    ) -> Self {
        Self {
            ingestion,
            risk,
            performance,
            timezone,
            locks: JobLocks::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        pipeline_today(self.timezone)
    }

    pub fn locks(&self) -> &JobLocks {
        &self.locks
    }

    pub async fn ingest(&self) -> Result<IngestionSummary> {
        self.ingest_on(self.today()).await
    }

    pub async fn score_risk(&self) -> Result<RiskRunSummary> {
        self.score_risk_on(self.today()).await
    }

    pub async fn evaluate_performance(&self) -> Result<PerformanceRunSummary> {
        self.evaluate_performance_on(self.today()).await
    }

    /// Ingestion, then risk, then performance, all for the same day.
    pub async fn daily(&self) -> Result<DailySummary> {
        self.daily_on(self.today()).await
    }

    pub async fn ingest_on(&self, today: NaiveDate) -> Result<IngestionSummary> {
        let _guard = self.locks.try_acquire(JobKind::Ingest)?;
        info!("Job {} started for {}", JobKind::Ingest, today);
        self.ingestion.run(today).await
    }

    pub async fn score_risk_on(&self, today: NaiveDate) -> Result<RiskRunSummary> {
        let _guard = self.locks.try_acquire(JobKind::Risk)?;
        info!("Job {} started for {}", JobKind::Risk, today);
        self.risk.run(today).await
    }

    pub async fn evaluate_performance_on(&self, today: NaiveDate) -> Result<PerformanceRunSummary> {
        let _guard = self.locks.try_acquire(JobKind::Performance)?;
        info!("Job {} started for {}", JobKind::Performance, today);
        self.performance.run(today).await
    }

    pub async fn daily_on(&self, today: NaiveDate) -> Result<DailySummary> {
        let _guard = self.locks.try_acquire(JobKind::Daily)?;
        info!("Job {} started for {}", JobKind::Daily, today);
        let ingestion = self.ingest_on(today).await?;
        let risk = self.score_risk_on(today).await?;
        let performance = self.evaluate_performance_on(today).await?;
        Ok(DailySummary {
            ingestion,
            risk,
            performance,
        })
    }
}
