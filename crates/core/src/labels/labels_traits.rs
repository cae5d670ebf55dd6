use async_trait::async_trait;

use crate::errors::Result;
use crate::labels::labels_model::FundLabel;

/// Trait for the fund label reference table.
#[async_trait]
pub trait FundLabelRepositoryTrait: Send + Sync {
    fn load_labels(&self) -> Result<Vec<FundLabel>>;

    fn count_labels(&self) -> Result<i64>;

    /// Replace the whole table with `labels` in one transaction.
    async fn replace_labels(&self, labels: Vec<FundLabel>) -> Result<usize>;
}
