//! SQLite storage implementation for fund performance metrics.

mod model;
mod repository;

pub use model::{FundPerformanceMetricDB, UnderperformerAlertDB};
pub use repository::PerformanceRepository;
