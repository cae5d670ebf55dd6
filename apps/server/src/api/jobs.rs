use std::future::Future;
use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use fundwatch_core::{jobs::JobRunner, Result as CoreResult};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{DailyRun, IngestionRun, PerformanceRun, RiskRun},
};

/// Runs a job on its own task. A client that disconnects mid-run drops only
/// the wait, never the job, so fetched data still reaches the store.
async fn run_job<T, F, Fut>(runner: Arc<JobRunner>, job: F) -> ApiResult<T>
where
    F: FnOnce(Arc<JobRunner>) -> Fut,
    Fut: Future<Output = CoreResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let summary = tokio::spawn(job(runner)).await??;
    Ok(summary)
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs/ingest",
    responses(
        (status = 200, body = IngestionRun),
        (status = 409, description = "Ingestion already running")
    )
)]
pub async fn run_ingest(State(state): State<Arc<AppState>>) -> ApiResult<Json<IngestionRun>> {
    let summary = run_job(state.runner.clone(), |runner| async move {
        runner.ingest().await
    })
    .await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs/risk",
    responses(
        (status = 200, body = RiskRun),
        (status = 409, description = "Risk scoring already running")
    )
)]
pub async fn run_risk(State(state): State<Arc<AppState>>) -> ApiResult<Json<RiskRun>> {
    let summary = run_job(state.runner.clone(), |runner| async move {
        runner.score_risk().await
    })
    .await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs/performance",
    responses(
        (status = 200, body = PerformanceRun),
        (status = 409, description = "Performance evaluation already running")
    )
)]
pub async fn run_performance(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PerformanceRun>> {
    let summary = run_job(state.runner.clone(), |runner| async move {
        runner.evaluate_performance().await
    })
    .await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs/daily",
    responses(
        (status = 200, body = DailyRun),
        (status = 409, description = "A pipeline step is already running")
    )
)]
pub async fn run_daily(State(state): State<Arc<AppState>>) -> ApiResult<Json<DailyRun>> {
    let summary = run_job(state.runner.clone(), |runner| async move {
        runner.daily().await
    })
    .await?;
    Ok(Json(summary.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs/ingest", post(run_ingest))
        .route("/jobs/risk", post(run_risk))
        .route("/jobs/performance", post(run_performance))
        .route("/jobs/daily", post(run_daily))
}
