use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{FundAlert, FundAlertList, PortfolioRiskAlert, PortfolioRiskAlertList},
};

/// Latest HIGH score of every portfolio that has one.
#[utoipa::path(
    get,
    path = "/api/v1/alerts/portfolios",
    responses((status = 200, body = PortfolioRiskAlertList))
)]
pub async fn high_risk_portfolios(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioRiskAlertList>> {
    let alerts = state.risk_service.high_risk_alerts()?;
    Ok(Json(PortfolioRiskAlertList {
        portfolios: alerts.into_iter().map(PortfolioRiskAlert::from).collect(),
    }))
}

/// Latest flagged metric of every fund that has one.
#[utoipa::path(
    get,
    path = "/api/v1/alerts/funds",
    responses((status = 200, body = FundAlertList))
)]
pub async fn underperforming_funds(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<FundAlertList>> {
    let alerts = state.performance_service.underperformer_alerts()?;
    Ok(Json(FundAlertList {
        funds: alerts.into_iter().map(FundAlert::from).collect(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/alerts/portfolios", get(high_risk_portfolios))
        .route("/alerts/funds", get(underperforming_funds))
}
