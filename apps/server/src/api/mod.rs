use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    main_lib::AppState,
    models::{
        DailyRun, FundAlert, FundAlertList, IngestionRun, MergeStats, PerformanceRun,
        PortfolioRiskAlert, PortfolioRiskAlertList, RiskRun,
    },
};

pub mod alerts;
pub mod jobs;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        readyz,
        jobs::run_ingest,
        jobs::run_risk,
        jobs::run_performance,
        jobs::run_daily,
        alerts::high_risk_portfolios,
        alerts::underperforming_funds
    ),
    components(schemas(
        IngestionRun,
        MergeStats,
        RiskRun,
        PerformanceRun,
        DailyRun,
        PortfolioRiskAlert,
        PortfolioRiskAlertList,
        FundAlert,
        FundAlertList
    )),
    tags((name = "fundwatch"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    // Job routes run as long as the fetch needs; everything else is bounded.
    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(alerts::router())
        .layer(TimeoutLayer::new(config.request_timeout))
        .merge(jobs::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}
