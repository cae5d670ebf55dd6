//! Fundwatch Core - domain entities, services, and traits.
//!
//! This crate contains the ingestion controller and the two analytics
//! engines (portfolio risk scoring and fund performance evaluation).
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod analytics;
pub mod constants;
pub mod errors;
pub mod ingestion;
pub mod jobs;
pub mod labels;
pub mod observations;
pub mod performance;
pub mod portfolios;
pub mod risk;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
