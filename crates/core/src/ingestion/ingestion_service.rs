use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};

use crate::errors::Result;
use crate::ingestion::client::FundDataClient;
use crate::ingestion::extractor::extract;
use crate::ingestion::ingestion_model::IngestionSummary;
use crate::ingestion::window::{plan_fetch, retention_cutoff, FetchPlan};
use crate::observations::{MergeOutcome, ObservationRepositoryTrait};

/// Brings the observation store up to `today`.
pub struct IngestionService {
    repository: Arc<dyn ObservationRepositoryTrait>,
    client: FundDataClient,
}

impl IngestionService {
    pub fn new(repository: Arc<dyn ObservationRepositoryTrait>, client: FundDataClient) -> Self {
        Self { repository, client }
    }

    /// Probe, plan, fetch, extract and merge.
    ///
    /// A failed probe is treated as an empty store. An empty fetch writes
    /// nothing, which also leaves retention untouched. Otherwise both tables
    /// are merged and purged, even when one side of the batch is empty.
    pub async fn run(&self, today: NaiveDate) -> Result<IngestionSummary> {
        let latest = match self.repository.latest_observation_date() {
            Ok(latest) => latest,
            Err(e) => {
                warn!(
                    "Could not read latest observation date, starting from scratch: {}",
                    e
                );
                None
            }
        };

        let plan = plan_fetch(latest, today);
        let window = match plan {
            FetchPlan::UpToDate => {
                info!(
                    "Observations already current (latest {:?}, today {}), skipping fetch",
                    latest, today
                );
                return Ok(IngestionSummary::up_to_date(today));
            }
            FetchPlan::Bootstrap(w) => {
                info!("No stored observations, bootstrapping {} to {}", w.start, w.end);
                w
            }
            FetchPlan::Incremental(w) => {
                info!("Fetching new observations {} to {}", w.start, w.end);
                w
            }
        };

        let report = self.client.fetch_range(window.start, window.end, today).await?;
        let batch = extract(&report.records);
        let cutoff = retention_cutoff(today);

        // Retention applies to both tables whenever the cycle brought anything.
        let (observations, allocations) =
            if batch.observations.is_empty() && batch.allocations.is_empty() {
                (MergeOutcome::default(), MergeOutcome::default())
            } else {
                let observations = self
                    .repository
                    .merge_observations(batch.observations, cutoff)
                    .await?;
                let allocations = self
                    .repository
                    .merge_allocations(batch.allocations, cutoff)
                    .await?;
                (observations, allocations)
            };

        info!(
            "Ingestion complete: {} records from {}, observations {} upserted / {} purged, allocations {} upserted / {} purged",
            report.records.len(),
            self.client.provider_id(),
            observations.upserted,
            observations.purged,
            allocations.upserted,
            allocations.purged
        );

        Ok(IngestionSummary {
            run_date: today,
            plan,
            chunks: report.chunks,
            failed_chunks: report.failed_chunks,
            fetched_records: report.records.len(),
            dropped_records: batch.dropped_records,
            observations,
            allocations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error};
    use crate::ingestion::ingestion_model::IngestionConfig;
    use crate::observations::{FundObservation, InstrumentAllocation};
    use async_trait::async_trait;
    use fundwatch_market_data::{FundDataProvider, FundRecord, MarketDataError, RateLimit};
    use std::sync::Mutex;
    use std::time::Duration;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    // =========================================================================
    // Mocks
    // =========================================================================

    #[derive(Default)]
    struct MockObservationRepository {
        observations: Mutex<Vec<FundObservation>>,
        allocations: Mutex<Vec<InstrumentAllocation>>,
        fail_probe: bool,
        merge_calls: Mutex<usize>,
    }

    #[async_trait]
    impl ObservationRepositoryTrait for MockObservationRepository {
        fn latest_observation_date(&self) -> Result<Option<NaiveDate>> {
            if self.fail_probe {
                return Err(DatabaseError::QueryFailed("no such table".into()).into());
            }
            Ok(self.observations.lock().unwrap().iter().map(|o| o.date).max())
        }

        fn load_observations_since(&self, since: NaiveDate) -> Result<Vec<FundObservation>> {
            Ok(self
                .observations
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.date >= since)
                .cloned()
                .collect())
        }

        fn load_allocations_since(&self, since: NaiveDate) -> Result<Vec<InstrumentAllocation>> {
            Ok(self
                .allocations
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.date >= since)
                .cloned()
                .collect())
        }

        async fn merge_observations(
            &self,
            rows: Vec<FundObservation>,
            retention_cutoff: NaiveDate,
        ) -> Result<MergeOutcome> {
            *self.merge_calls.lock().unwrap() += 1;
            let mut stored = self.observations.lock().unwrap();
            let upserted = rows.len();
            for row in rows {
                stored.retain(|o| o.key() != row.key());
                stored.push(row);
            }
            let before = stored.len();
            stored.retain(|o| o.date >= retention_cutoff);
            Ok(MergeOutcome {
                upserted,
                purged: before - stored.len(),
            })
        }

        async fn merge_allocations(
            &self,
            rows: Vec<InstrumentAllocation>,
            retention_cutoff: NaiveDate,
        ) -> Result<MergeOutcome> {
            *self.merge_calls.lock().unwrap() += 1;
            let mut stored = self.allocations.lock().unwrap();
            let upserted = rows.len();
            for row in rows {
                stored.retain(|a| a.key() != row.key());
                stored.push(row);
            }
            let before = stored.len();
            stored.retain(|a| a.date >= retention_cutoff);
            Ok(MergeOutcome {
                upserted,
                purged: before - stored.len(),
            })
        }
    }

    struct DailyProvider {
        calls: Mutex<Vec<(NaiveDate, NaiveDate)>>,
        with_allocations: bool,
        silent: bool,
    }

    #[async_trait]
    impl FundDataProvider for DailyProvider {
        fn id(&self) -> &'static str {
            "DAILY"
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                requests_per_minute: 600,
                max_concurrency: 1,
                min_delay: Duration::ZERO,
            }
        }

        async fn fetch(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> std::result::Result<Vec<FundRecord>, MarketDataError> {
            self.calls.lock().unwrap().push((start, end));
            if self.silent {
                return Ok(Vec::new());
            }
            Ok(start
                .iter_days()
                .take_while(|day| *day <= end)
                .map(|day| {
                    let mut r = FundRecord::new(day, "AAK", Some(10.0));
                    if self.with_allocations {
                        r.allocations.insert("stock".into(), Some(100.0));
                    }
                    r
                })
                .collect())
        }
    }

    fn service(
        repository: Arc<MockObservationRepository>,
        provider: Arc<DailyProvider>,
    ) -> IngestionService {
        let config = IngestionConfig::new(7, Duration::ZERO).unwrap();
        IngestionService::new(repository, FundDataClient::new(provider, config))
    }

    fn provider() -> Arc<DailyProvider> {
        Arc::new(DailyProvider {
            calls: Mutex::new(Vec::new()),
            with_allocations: true,
            silent: false,
        })
    }

    fn price_only_provider() -> Arc<DailyProvider> {
        Arc::new(DailyProvider {
            calls: Mutex::new(Vec::new()),
            with_allocations: false,
            silent: false,
        })
    }

    fn silent_provider() -> Arc<DailyProvider> {
        Arc::new(DailyProvider {
            calls: Mutex::new(Vec::new()),
            with_allocations: true,
            silent: true,
        })
    }

    fn stale_allocation() -> InstrumentAllocation {
        InstrumentAllocation {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            fund_code: "AAK".into(),
            instrument_type: "stock".into(),
            percentage: 100.0,
        }
    }

    fn observation(date: NaiveDate) -> FundObservation {
        FundObservation {
            date,
            fund_code: "AAK".into(),
            price: 9.0,
            market_cap: None,
            shares_outstanding: None,
            investor_count: None,
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_incremental_run_fetches_missing_days() {
        let repo = Arc::new(MockObservationRepository::default());
        repo.observations.lock().unwrap().push(observation(d(1, 10)));
        let provider = provider();

        let summary = service(repo.clone(), provider.clone())
            .run(d(1, 15))
            .await
            .unwrap();

        assert_eq!(
            provider.calls.lock().unwrap().as_slice(),
            &[(d(1, 11), d(1, 15))]
        );
        assert_eq!(summary.fetched_records, 5);
        assert_eq!(summary.observations.upserted, 5);
        assert_eq!(summary.allocations.upserted, 5);
        assert_eq!(repo.observations.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_up_to_date_skips_fetch() {
        let repo = Arc::new(MockObservationRepository::default());
        repo.observations.lock().unwrap().push(observation(d(1, 15)));
        let provider = provider();

        let summary = service(repo.clone(), provider.clone())
            .run(d(1, 15))
            .await
            .unwrap();

        assert_eq!(summary.plan, FetchPlan::UpToDate);
        assert!(provider.calls.lock().unwrap().is_empty());
        assert_eq!(*repo.merge_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_probe_bootstraps() {
        let repo = Arc::new(MockObservationRepository {
            fail_probe: true,
            ..MockObservationRepository::default()
        });
        let provider = provider();

        let summary = service(repo, provider.clone()).run(d(1, 15)).await.unwrap();

        assert!(matches!(summary.plan, FetchPlan::Bootstrap(_)));
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.first().unwrap().0, d(1, 15) - chrono::Duration::days(200));
        assert_eq!(calls.last().unwrap().1, d(1, 15));
        assert_eq!(summary.fetched_records, 201);
    }

    #[tokio::test]
    async fn test_rerun_same_day_is_idempotent() {
        let repo = Arc::new(MockObservationRepository::default());
        repo.observations.lock().unwrap().push(observation(d(1, 10)));

        service(repo.clone(), provider()).run(d(1, 15)).await.unwrap();
        let first = repo.observations.lock().unwrap().clone();
        let second = service(repo.clone(), provider()).run(d(1, 15)).await.unwrap();

        assert_eq!(second.plan, FetchPlan::UpToDate);
        assert_eq!(*repo.observations.lock().unwrap(), first);
    }

    #[tokio::test]
    async fn test_retention_purges_old_rows() {
        let repo = Arc::new(MockObservationRepository::default());
        repo.observations
            .lock()
            .unwrap()
            .extend([observation(d(1, 1) - chrono::Duration::days(300)), observation(d(7, 1))]);

        let today = d(7, 3);
        let summary = service(repo.clone(), provider()).run(today).await.unwrap();

        assert_eq!(summary.observations.purged, 1);
        let cutoff = retention_cutoff(today);
        assert!(repo
            .observations
            .lock()
            .unwrap()
            .iter()
            .all(|o| o.date >= cutoff));
    }

    #[tokio::test]
    async fn test_price_only_batch_still_purges_allocations() {
        let repo = Arc::new(MockObservationRepository::default());
        repo.observations.lock().unwrap().push(observation(d(7, 1)));
        repo.allocations.lock().unwrap().push(stale_allocation());

        let today = d(7, 3);
        let summary = service(repo.clone(), price_only_provider())
            .run(today)
            .await
            .unwrap();

        assert_eq!(summary.observations.upserted, 2);
        assert_eq!(summary.allocations, MergeOutcome { upserted: 0, purged: 1 });
        let cutoff = retention_cutoff(today);
        assert!(repo
            .allocations
            .lock()
            .unwrap()
            .iter()
            .all(|a| a.date >= cutoff));
    }

    #[tokio::test]
    async fn test_empty_fetch_leaves_store_untouched() {
        let repo = Arc::new(MockObservationRepository::default());
        repo.observations.lock().unwrap().push(observation(d(7, 1)));
        repo.allocations.lock().unwrap().push(stale_allocation());

        let summary = service(repo.clone(), silent_provider())
            .run(d(7, 3))
            .await
            .unwrap();

        assert_eq!(summary.fetched_records, 0);
        assert_eq!(*repo.merge_calls.lock().unwrap(), 0);
        assert_eq!(repo.allocations.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_error_from_probe_is_database_error() {
        let repo = MockObservationRepository {
            fail_probe: true,
            ..MockObservationRepository::default()
        };
        assert!(matches!(
            repo.latest_observation_date(),
            Err(Error::Database(_))
        ));
    }
}
