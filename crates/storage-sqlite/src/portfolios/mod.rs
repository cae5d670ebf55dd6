//! SQLite storage implementation for the read-only portfolio registry.

mod model;
mod repository;

pub use model::{PortfolioDB, PortfolioPositionDB};
pub use repository::PortfolioRepository;
