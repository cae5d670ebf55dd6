use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::info;
use std::sync::Arc;

use fundwatch_core::labels::{FundLabel, FundLabelRepositoryTrait};
use fundwatch_core::Result;

use super::model::{FundLabelDB, FUND_LABEL_COLUMNS};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::fund_labels;
use crate::utils::chunk_for_sqlite;

pub struct FundLabelRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl FundLabelRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl FundLabelRepositoryTrait for FundLabelRepository {
    fn load_labels(&self) -> Result<Vec<FundLabel>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fund_labels::table
            .order(fund_labels::code.asc())
            .select(FundLabelDB::as_select())
            .load::<FundLabelDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(FundLabel::from).collect())
    }

    fn count_labels(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        fund_labels::table.count().get_result(&mut conn).into_core()
    }

    async fn replace_labels(&self, labels: Vec<FundLabel>) -> Result<usize> {
        let rows: Vec<FundLabelDB> = labels.into_iter().map(Into::into).collect();

        let inserted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(fund_labels::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let mut inserted = 0;
                for chunk in chunk_for_sqlite(&rows, FUND_LABEL_COLUMNS) {
                    inserted += diesel::insert_into(fund_labels::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(inserted)
            })
            .await?;

        info!("Replaced fund labels with {} rows", inserted);
        Ok(inserted)
    }
}
