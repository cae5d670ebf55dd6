//! SQLite storage implementation for portfolio risk scores.

mod model;
mod repository;

pub use model::{HighRiskAlertDB, PortfolioRiskScoreDB};
pub use repository::RiskScoreRepository;
