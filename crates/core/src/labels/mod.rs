//! Labels module - fund category reference data used to build peer groups.

mod labels_import;
mod labels_model;
mod labels_traits;

pub use labels_import::parse_labels_csv;
pub use labels_model::FundLabel;
pub use labels_traits::FundLabelRepositoryTrait;
