//! Risk module - composite, cross-portfolio normalized risk scores.

mod risk_calculator;
mod risk_model;
mod risk_service;
mod risk_traits;

pub use risk_calculator::{
    composite_score, fund_liquidity, portfolio_components, score_portfolios, RiskSkipReason,
};
pub use risk_model::{
    HighRiskAlert, PortfolioRiskScore, RiskComponents, RiskLevel, RiskRunSummary,
};
pub use risk_service::RiskScoringService;
pub use risk_traits::RiskScoreRepositoryTrait;
