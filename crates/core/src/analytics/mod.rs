//! Shared numeric building blocks for the risk and performance engines.

pub mod returns;
pub mod stats;

pub use returns::{daily_returns, ReturnPoint};
pub use stats::{
    max_drawdown, median, median_absolute_deviation, min_max_normalize, percentile_ranks,
    portfolio_variance, round_to, sample_covariance, sample_std,
};
