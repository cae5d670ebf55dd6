//! Fund data models
//!
//! - `fund_record` - One fund on one day in wide form (FundRecord) and the
//!   declared list of non-instrument columns

mod fund_record;

pub use fund_record::{FundRecord, WideRow, METADATA_COLUMNS};
