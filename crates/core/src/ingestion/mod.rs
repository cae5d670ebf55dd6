//! Incremental ingestion - plan the missing date range, fetch it from the
//! data source in paced chunks, reshape it, and merge it into the store.

mod client;
mod extractor;
mod ingestion_model;
mod ingestion_service;
mod window;

pub use client::{chunk_range, FetchReport, FundDataClient};
pub use extractor::{extract, ExtractedBatch};
pub use ingestion_model::{IngestionConfig, IngestionSummary};
pub use ingestion_service::IngestionService;
pub use window::{plan_fetch, retention_cutoff, FetchPlan, FetchWindow};
