use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Text};
use std::str::FromStr;

use fundwatch_core::risk::{HighRiskAlert, PortfolioRiskScore, RiskLevel};

use crate::errors::StorageError;
use crate::utils::format_db_date;

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::portfolio_risk_scores)]
#[diesel(primary_key(portfolio_id, date))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioRiskScoreDB {
    pub portfolio_id: i64,
    pub date: String,
    pub risk_score: f64,
    pub risk: String,
}

/// Result row of the latest-HIGH-per-portfolio query.
#[derive(QueryableByName, Debug, Clone)]
pub struct HighRiskAlertDB {
    #[diesel(sql_type = BigInt)]
    pub portfolio_id: i64,
    #[diesel(sql_type = Double)]
    pub risk_score: f64,
    #[diesel(sql_type = Text)]
    pub risk: String,
}

impl From<PortfolioRiskScore> for PortfolioRiskScoreDB {
    fn from(domain: PortfolioRiskScore) -> Self {
        Self {
            portfolio_id: domain.portfolio_id,
            date: format_db_date(domain.date),
            risk_score: domain.risk_score,
            risk: domain.risk.as_str().to_string(),
        }
    }
}

impl TryFrom<HighRiskAlertDB> for HighRiskAlert {
    type Error = StorageError;

    fn try_from(db: HighRiskAlertDB) -> Result<Self, Self::Error> {
        let risk = RiskLevel::from_str(&db.risk)
            .map_err(|e| StorageError::InvalidStoredValue(e.to_string()))?;
        Ok(Self {
            portfolio_id: db.portfolio_id,
            risk_score: db.risk_score,
            risk,
        })
    }
}
