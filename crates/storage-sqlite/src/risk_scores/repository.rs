use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_query;
use diesel::SqliteConnection;
use std::sync::Arc;

use fundwatch_core::risk::{HighRiskAlert, PortfolioRiskScore, RiskScoreRepositoryTrait};
use fundwatch_core::Result;

use super::model::{HighRiskAlertDB, PortfolioRiskScoreDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::portfolio_risk_scores;

pub struct RiskScoreRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RiskScoreRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl RiskScoreRepositoryTrait for RiskScoreRepository {
    async fn upsert_risk_scores(&self, scores: Vec<PortfolioRiskScore>) -> Result<usize> {
        if scores.is_empty() {
            return Ok(0);
        }
        let rows: Vec<PortfolioRiskScoreDB> = scores.into_iter().map(Into::into).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for row in &rows {
                    affected_rows += diesel::insert_into(portfolio_risk_scores::table)
                        .values(row)
                        .on_conflict((
                            portfolio_risk_scores::portfolio_id,
                            portfolio_risk_scores::date,
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

    fn load_latest_high_risk(&self) -> Result<Vec<HighRiskAlert>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = sql_query(
            r#"SELECT prs.portfolio_id, prs.risk_score, prs.risk
             FROM portfolio_risk_scores prs
             INNER JOIN (
                 SELECT portfolio_id, MAX(date) AS max_date
                 FROM portfolio_risk_scores
                 WHERE risk = 'HIGH'
                 GROUP BY portfolio_id
             ) latest ON prs.portfolio_id = latest.portfolio_id
                     AND prs.date = latest.max_date
             WHERE prs.risk = 'HIGH'
             ORDER BY prs.portfolio_id"#,
        )
        .load::<HighRiskAlertDB>(&mut conn)
        .into_core()?;

        Ok(rows
            .into_iter()
            .map(HighRiskAlert::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }
}
