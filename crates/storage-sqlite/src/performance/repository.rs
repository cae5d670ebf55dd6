use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_query;
use diesel::SqliteConnection;
use std::sync::Arc;

use fundwatch_core::performance::{
    FundPerformanceMetric, PerformanceRepositoryTrait, UnderperformerAlert,
};
use fundwatch_core::Result;

use super::model::{FundPerformanceMetricDB, UnderperformerAlertDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::fund_performance_metrics;

pub struct PerformanceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PerformanceRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PerformanceRepositoryTrait for PerformanceRepository {
    async fn upsert_performance_metrics(
        &self,
        metrics: Vec<FundPerformanceMetric>,
    ) -> Result<usize> {
        if metrics.is_empty() {
            return Ok(0);
        }
        let rows: Vec<FundPerformanceMetricDB> = metrics.into_iter().map(Into::into).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for row in &rows {
                    affected_rows += diesel::insert_into(fund_performance_metrics::table)
                        .values(row)
                        .on_conflict((
                            fund_performance_metrics::fund_code,
                            fund_performance_metrics::date,
                        ))
                        .do_update()
                        .set(row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected_rows)
            })
            .await
    }

    fn load_latest_poor_performers(&self) -> Result<Vec<UnderperformerAlert>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = sql_query(
            r#"SELECT fpm.fund_code, fpm.confidence
             FROM fund_performance_metrics fpm
             INNER JOIN (
                 SELECT fund_code, MAX(date) AS max_date
                 FROM fund_performance_metrics
                 WHERE is_poor_performer = 1
                 GROUP BY fund_code
             ) latest ON fpm.fund_code = latest.fund_code
                     AND fpm.date = latest.max_date
             WHERE fpm.is_poor_performer = 1
             ORDER BY fpm.fund_code"#,
        )
        .load::<UnderperformerAlertDB>(&mut conn)
        .into_core()?;

        Ok(rows.into_iter().map(UnderperformerAlert::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_store;
    use chrono::NaiveDate;

    fn metric(code: &str, day: u32, flagged: bool, confidence: Option<f64>) -> FundPerformanceMetric {
        FundPerformanceMetric {
            fund_code: code.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            performance_score: if flagged { 0.05 } else { 0.6 },
            peer_category: "Equity".to_string(),
            is_poor_performer: flagged,
            confidence,
        }
    }

    #[tokio::test]
    async fn test_rerun_clears_flag_and_confidence() {
        let (pool, writer, _dir) = migrated_store();
        let repo = PerformanceRepository::new(pool.clone(), writer);

        repo.upsert_performance_metrics(vec![metric("AAA", 15, true, Some(0.667))])
            .await
            .unwrap();
        repo.upsert_performance_metrics(vec![metric("AAA", 15, false, None)])
            .await
            .unwrap();

        let mut conn = get_connection(&pool).unwrap();
        let stored = fund_performance_metrics::table
            .select(FundPerformanceMetricDB::as_select())
            .load::<FundPerformanceMetricDB>(&mut conn)
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_poor_performer);
        assert_eq!(stored[0].confidence, None);
        assert!(repo.load_latest_poor_performers().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_flagged_row_per_fund() {
        let (pool, writer, _dir) = migrated_store();
        let repo = PerformanceRepository::new(pool, writer);

        repo.upsert_performance_metrics(vec![
            metric("BBB", 10, true, Some(0.5)),
            metric("BBB", 12, true, Some(0.9)),
            metric("BBB", 14, false, None),
            metric("AAA", 11, true, Some(0.667)),
            metric("CCC", 14, false, None),
        ])
        .await
        .unwrap();

        let alerts = repo.load_latest_poor_performers().unwrap();

        assert_eq!(
            alerts,
            vec![
                UnderperformerAlert {
                    fund_code: "AAA".to_string(),
                    confidence: Some(0.667)
                },
                UnderperformerAlert {
                    fund_code: "BBB".to_string(),
                    confidence: Some(0.9)
                },
            ]
        );
    }
}
