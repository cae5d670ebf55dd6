//! Portfolios module - read-only view of the portfolio registry.

mod portfolios_model;
mod portfolios_traits;

pub use portfolios_model::{Portfolio, Position};
pub use portfolios_traits::PortfolioRepositoryTrait;
