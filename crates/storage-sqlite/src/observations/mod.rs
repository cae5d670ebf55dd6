//! SQLite storage implementation for fund observations and instrument allocations.

mod model;
mod repository;

pub use model::{FundObservationDB, InstrumentAllocationDB};
pub use repository::ObservationRepository;
