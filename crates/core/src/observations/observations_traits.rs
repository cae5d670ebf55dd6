use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::observations::observations_model::{
    FundObservation, InstrumentAllocation, MergeOutcome,
};

/// Trait for the observation store.
///
/// Both merge operations overwrite existing keys field by field, insert new
/// keys, then delete every row dated strictly before `retention_cutoff`,
/// all in one transaction. The purge runs even when `rows` is empty, so the
/// caller decides when a cycle has nothing to write.
#[async_trait]
pub trait ObservationRepositoryTrait: Send + Sync {
    /// Most recent stored observation date, `None` when the store is empty.
    fn latest_observation_date(&self) -> Result<Option<NaiveDate>>;

    /// Observations dated on or after `since`, ordered by (fund_code, date).
    fn load_observations_since(&self, since: NaiveDate) -> Result<Vec<FundObservation>>;

    fn load_allocations_since(&self, since: NaiveDate) -> Result<Vec<InstrumentAllocation>>;

    async fn merge_observations(
        &self,
        rows: Vec<FundObservation>,
        retention_cutoff: NaiveDate,
    ) -> Result<MergeOutcome>;

    async fn merge_allocations(
        &self,
        rows: Vec<InstrumentAllocation>,
        retention_cutoff: NaiveDate,
    ) -> Result<MergeOutcome>;
}
