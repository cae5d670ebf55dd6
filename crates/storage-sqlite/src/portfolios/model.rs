//! Database models for portfolios.

use diesel::prelude::*;
use fundwatch_core::portfolios::{Portfolio, Position};

#[derive(Queryable, Identifiable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: i64,
    pub name: String,
}

#[derive(Queryable, Identifiable, Associations, Selectable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(PortfolioDB, foreign_key = portfolio_id))]
#[diesel(table_name = crate::schema::portfolio_positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioPositionDB {
    pub id: i64,
    pub portfolio_id: i64,
    pub fund_code: String,
    pub weight: f64,
}

impl From<PortfolioPositionDB> for Position {
    fn from(db: PortfolioPositionDB) -> Self {
        Self {
            fund_code: db.fund_code,
            weight: db.weight,
        }
    }
}

impl PortfolioDB {
    pub fn into_domain(self, positions: Vec<PortfolioPositionDB>) -> Portfolio {
        Portfolio {
            id: self.id,
            name: self.name,
            positions: positions.into_iter().map(Position::from).collect(),
        }
    }
}
