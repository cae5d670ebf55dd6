//! Database models for observations.

use diesel::prelude::*;
use fundwatch_core::observations::{FundObservation, InstrumentAllocation};

use crate::errors::StorageError;
use crate::utils::{format_db_date, parse_db_date};

/// Row of `fund_observations`. Nullable figures are written as NULL on
/// update so a re-ingested row replaces every field.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::fund_observations)]
#[diesel(primary_key(date, fund_code))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundObservationDB {
    pub date: String,
    pub fund_code: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub investor_count: Option<f64>,
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instrument_allocations)]
#[diesel(primary_key(date, fund_code, instrument_type))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentAllocationDB {
    pub date: String,
    pub fund_code: String,
    pub instrument_type: String,
    pub percentage: f64,
}

impl From<FundObservation> for FundObservationDB {
    fn from(domain: FundObservation) -> Self {
        Self {
            date: format_db_date(domain.date),
            fund_code: domain.fund_code,
            price: domain.price,
            market_cap: domain.market_cap,
            shares_outstanding: domain.shares_outstanding,
            investor_count: domain.investor_count,
        }
    }
}

impl TryFrom<FundObservationDB> for FundObservation {
    type Error = StorageError;

    fn try_from(db: FundObservationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_db_date(&db.date)?,
            fund_code: db.fund_code,
            price: db.price,
            market_cap: db.market_cap,
            shares_outstanding: db.shares_outstanding,
            investor_count: db.investor_count,
        })
    }
}

impl From<InstrumentAllocation> for InstrumentAllocationDB {
    fn from(domain: InstrumentAllocation) -> Self {
        Self {
            date: format_db_date(domain.date),
            fund_code: domain.fund_code,
            instrument_type: domain.instrument_type,
            percentage: domain.percentage,
        }
    }
}

impl TryFrom<InstrumentAllocationDB> for InstrumentAllocation {
    type Error = StorageError;

    fn try_from(db: InstrumentAllocationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_db_date(&db.date)?,
            fund_code: db.fund_code,
            instrument_type: db.instrument_type,
            percentage: db.percentage,
        })
    }
}
