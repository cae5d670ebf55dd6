use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use fundwatch_core::observations::{
    FundObservation, InstrumentAllocation, MergeOutcome, ObservationRepositoryTrait,
};
use fundwatch_core::Result;

use super::model::{FundObservationDB, InstrumentAllocationDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{fund_observations, instrument_allocations};
use crate::utils::{format_db_date, parse_db_date};

pub struct ObservationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ObservationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ObservationRepositoryTrait for ObservationRepository {
    fn latest_observation_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let latest: Option<String> = fund_observations::table
            .select(diesel::dsl::max(fund_observations::date))
            .first(&mut conn)
            .into_core()?;

        Ok(latest.as_deref().map(parse_db_date).transpose()?)
    }

    fn load_observations_since(&self, since: NaiveDate) -> Result<Vec<FundObservation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fund_observations::table
            .filter(fund_observations::date.ge(format_db_date(since)))
            .order((fund_observations::fund_code.asc(), fund_observations::date.asc()))
            .select(FundObservationDB::as_select())
            .load::<FundObservationDB>(&mut conn)
            .into_core()?;

        Ok(rows
            .into_iter()
            .map(FundObservation::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    fn load_allocations_since(&self, since: NaiveDate) -> Result<Vec<InstrumentAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = instrument_allocations::table
            .filter(instrument_allocations::date.ge(format_db_date(since)))
            .order((
                instrument_allocations::fund_code.asc(),
                instrument_allocations::date.asc(),
                instrument_allocations::instrument_type.asc(),
            ))
            .select(InstrumentAllocationDB::as_select())
            .load::<InstrumentAllocationDB>(&mut conn)
            .into_core()?;

        Ok(rows
            .into_iter()
            .map(InstrumentAllocation::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    async fn merge_observations(
        &self,
        rows: Vec<FundObservation>,
        retention_cutoff: NaiveDate,
    ) -> Result<MergeOutcome> {
        let rows_db: Vec<FundObservationDB> = rows.into_iter().map(Into::into).collect();
        let cutoff = format_db_date(retention_cutoff);

        let outcome = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MergeOutcome> {
                let mut upserted = 0;
                for row in &rows_db {
                    upserted += diesel::insert_into(fund_observations::table)
                        .values(row)
                        .on_conflict((fund_observations::date, fund_observations::fund_code))
                        .do_update()
                        .set(row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                let purged = diesel::delete(
                    fund_observations::table.filter(fund_observations::date.lt(&cutoff)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                Ok(MergeOutcome { upserted, purged })
            })
            .await?;

        debug!(
            "Merged fund observations: {} upserted, {} purged",
            outcome.upserted, outcome.purged
        );
        Ok(outcome)
    }

    async fn merge_allocations(
        &self,
        rows: Vec<InstrumentAllocation>,
        retention_cutoff: NaiveDate,
    ) -> Result<MergeOutcome> {
        let rows_db: Vec<InstrumentAllocationDB> = rows.into_iter().map(Into::into).collect();
        let cutoff = format_db_date(retention_cutoff);

        let outcome = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MergeOutcome> {
                let mut upserted = 0;
                for row in &rows_db {
                    upserted += diesel::insert_into(instrument_allocations::table)
                        .values(row)
                        .on_conflict((
                            instrument_allocations::date,
                            instrument_allocations::fund_code,
                            instrument_allocations::instrument_type,
                        ))
                        .do_update()
                        .set(instrument_allocations::percentage.eq(row.percentage))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                let purged = diesel::delete(
                    instrument_allocations::table.filter(instrument_allocations::date.lt(&cutoff)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                Ok(MergeOutcome { upserted, purged })
            })
            .await?;

        debug!(
            "Merged instrument allocations: {} upserted, {} purged",
            outcome.upserted, outcome.purged
        );
        Ok(outcome)
    }
}
