use diesel::prelude::*;
use diesel::sql_types::{Double, Nullable, Text};

use fundwatch_core::performance::{FundPerformanceMetric, UnderperformerAlert};

use crate::utils::format_db_date;

/// Row of `fund_performance_metrics`. A rerun that clears the flag also
/// clears the stored confidence.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::fund_performance_metrics)]
#[diesel(primary_key(fund_code, date))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundPerformanceMetricDB {
    pub fund_code: String,
    pub date: String,
    pub performance_score: f64,
    pub peer_category: String,
    pub is_poor_performer: bool,
    pub confidence: Option<f64>,
}

#[derive(QueryableByName, Debug, Clone)]
pub struct UnderperformerAlertDB {
    #[diesel(sql_type = Text)]
    pub fund_code: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub confidence: Option<f64>,
}

impl From<FundPerformanceMetric> for FundPerformanceMetricDB {
    fn from(domain: FundPerformanceMetric) -> Self {
        Self {
            fund_code: domain.fund_code,
            date: format_db_date(domain.date),
            performance_score: domain.performance_score,
            peer_category: domain.peer_category,
            is_poor_performer: domain.is_poor_performer,
            confidence: domain.confidence,
        }
    }
}

impl From<UnderperformerAlertDB> for UnderperformerAlert {
    fn from(db: UnderperformerAlertDB) -> Self {
        Self {
            fund_code: db.fund_code,
            confidence: db.confidence,
        }
    }
}
