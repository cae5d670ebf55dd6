//! Fundwatch Market Data Crate
//!
//! This crate provides provider-agnostic access to the daily fund data
//! published by an external source.
//!
//! # Overview
//!
//! A provider answers one question: "give me every fund's daily record
//! between two dates". Records arrive in wide form: a fixed set of
//! metadata columns (price, market cap, share and investor counts) plus a
//! variable number of instrument-allocation percentage columns.
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |  Ingestion (core)| --> | FundDataProvider | --> |   FundRecord     |
//! +------------------+     +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  TefasProvider   |  (HTTP, form posts)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`FundRecord`] - One fund on one day, wide form
//! - [`FundDataProvider`] - Trait every data source implements
//! - [`MarketDataError`] - Provider errors with a [`RetryClass`]

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use models::{FundRecord, WideRow, METADATA_COLUMNS};
pub use provider::tefas::TefasProvider;
pub use provider::{FundDataProvider, RateLimit};
