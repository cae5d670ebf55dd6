//! Fund data provider abstractions and implementations.
//!
//! This module contains:
//! - The `FundDataProvider` trait that every data source implements
//! - Rate limiting configuration
//! - The TEFAS provider
//!
//! The ingestion controller in the core crate only sees the trait; chunking,
//! pacing and retry of failed ranges are its job, not the provider's.

mod capabilities;
mod traits;

pub mod tefas;

pub use capabilities::RateLimit;
pub use traits::FundDataProvider;
