//! SQLite storage implementation for Fundwatch.
//!
//! This crate is the only place in the workspace where Diesel lives. It
//! implements the repository traits defined in `fundwatch-core` and contains:
//! - Connection pooling and the single writer actor
//! - Embedded Diesel migrations
//! - Repository implementations for observations, portfolios, labels,
//!   risk scores and performance metrics
//! - Database model types (with Diesel derives)
//!
//! ```text
//! core (domain, traits)
//!          │
//!          ▼
//!  storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod labels;
pub mod observations;
pub mod performance;
pub mod portfolios;
pub mod risk_scores;

pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use labels::FundLabelRepository;
pub use observations::ObservationRepository;
pub use performance::PerformanceRepository;
pub use portfolios::PortfolioRepository;
pub use risk_scores::RiskScoreRepository;

// Re-export from fundwatch-core for convenience
pub use fundwatch_core::errors::{DatabaseError, Error, Result};
