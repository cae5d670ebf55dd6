//! Observations module - daily fund observations and instrument allocations.

mod observations_model;
mod observations_traits;

pub use observations_model::{FundObservation, InstrumentAllocation, MergeOutcome};
pub use observations_traits::ObservationRepositoryTrait;
