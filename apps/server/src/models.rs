use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use fundwatch_core::ingestion::{FetchPlan, IngestionSummary};
use fundwatch_core::jobs::DailySummary;
use fundwatch_core::observations::MergeOutcome;
use fundwatch_core::performance::{PerformanceRunSummary, UnderperformerAlert};
use fundwatch_core::risk::{HighRiskAlert, RiskRunSummary};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRiskAlert {
    pub portfolio_id: i64,
    pub risk_score: f64,
    pub risk: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct PortfolioRiskAlertList {
    pub portfolios: Vec<PortfolioRiskAlert>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundAlert {
    pub fund_code: String,
    pub confidence: Option<f64>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FundAlertList {
    pub funds: Vec<FundAlert>,
}

impl From<HighRiskAlert> for PortfolioRiskAlert {
    fn from(a: HighRiskAlert) -> Self {
        Self {
            portfolio_id: a.portfolio_id,
            risk_score: a.risk_score,
            risk: a.risk.to_string(),
        }
    }
}

impl From<UnderperformerAlert> for FundAlert {
    fn from(a: UnderperformerAlert) -> Self {
        Self {
            fund_code: a.fund_code,
            confidence: a.confidence,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq)]
pub struct MergeStats {
    pub upserted: usize,
    pub purged: usize,
}

impl From<MergeOutcome> for MergeStats {
    fn from(m: MergeOutcome) -> Self {
        Self {
            upserted: m.upserted,
            purged: m.purged,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestionRun {
    pub run_date: NaiveDate,
    /// `bootstrap`, `incremental` or `upToDate`.
    pub plan: String,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub fetched_records: usize,
    pub dropped_records: usize,
    pub observations: MergeStats,
    pub allocations: MergeStats,
}

impl From<IngestionSummary> for IngestionRun {
    fn from(s: IngestionSummary) -> Self {
        let plan = match s.plan {
            FetchPlan::Bootstrap(_) => "bootstrap",
            FetchPlan::Incremental(_) => "incremental",
            FetchPlan::UpToDate => "upToDate",
        };
        let window = s.plan.window();
        Self {
            run_date: s.run_date,
            plan: plan.to_string(),
            window_start: window.map(|w| w.start),
            window_end: window.map(|w| w.end),
            chunks: s.chunks,
            failed_chunks: s.failed_chunks,
            fetched_records: s.fetched_records,
            dropped_records: s.dropped_records,
            observations: s.observations.into(),
            allocations: s.allocations.into(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskRun {
    pub run_date: NaiveDate,
    pub portfolios: usize,
    pub scored: usize,
    pub skipped: usize,
}

impl From<RiskRunSummary> for RiskRun {
    fn from(s: RiskRunSummary) -> Self {
        Self {
            run_date: s.run_date,
            portfolios: s.portfolios,
            scored: s.scored,
            skipped: s.skipped,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRun {
    pub run_date: NaiveDate,
    /// Date the metrics were stored under, absent when nothing was evaluated.
    pub metric_date: Option<NaiveDate>,
    pub evaluated: usize,
    pub poor_performers: usize,
}

impl From<PerformanceRunSummary> for PerformanceRun {
    fn from(s: PerformanceRunSummary) -> Self {
        Self {
            run_date: s.run_date,
            metric_date: s.metric_date,
            evaluated: s.evaluated,
            poor_performers: s.poor_performers,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct DailyRun {
    pub ingestion: IngestionRun,
    pub risk: RiskRun,
    pub performance: PerformanceRun,
}

impl From<DailySummary> for DailyRun {
    fn from(s: DailySummary) -> Self {
        Self {
            ingestion: s.ingestion.into(),
            risk: s.risk.into(),
            performance: s.performance.into(),
        }
    }
}
