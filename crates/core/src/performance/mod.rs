//! Performance module - peer-relative fund scores and the poor-performer flag.

mod performance_calculator;
mod performance_model;
mod performance_service;
mod performance_traits;

pub use performance_calculator::{
    evaluate_peers, evaluation_window, fund_scores, poor_performer_verdict, resolve_peer_group,
    PeerGroup,
};
pub use performance_model::{
    FundPerformanceMetric, FundScore, PerformanceRunSummary, UnderperformerAlert,
};
pub use performance_service::PerformanceService;
pub use performance_traits::PerformanceRepositoryTrait;
