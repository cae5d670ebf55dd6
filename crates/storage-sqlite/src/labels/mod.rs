//! SQLite storage implementation for fund labels.

mod model;
mod repository;

pub use model::FundLabelDB;
pub use repository::FundLabelRepository;
