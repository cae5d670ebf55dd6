use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use fundwatch_core::portfolios::{Portfolio, PortfolioRepositoryTrait};
use fundwatch_core::Result;

use super::model::{PortfolioDB, PortfolioPositionDB};
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::{portfolio_positions, portfolios};

/// Reads the registry maintained by the portfolio CRUD service. The
/// pipeline never writes to these tables, so no writer handle is held.
pub struct PortfolioRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    fn load_portfolios(&self) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        let portfolios_db = portfolios::table
            .order(portfolios::id.asc())
            .select(PortfolioDB::as_select())
            .load::<PortfolioDB>(&mut conn)
            .into_core()?;

        let positions_db = PortfolioPositionDB::belonging_to(&portfolios_db)
            .order((
                portfolio_positions::portfolio_id.asc(),
                portfolio_positions::fund_code.asc(),
            ))
            .select(PortfolioPositionDB::as_select())
            .load::<PortfolioPositionDB>(&mut conn)
            .into_core()?;

        Ok(positions_db
            .grouped_by(&portfolios_db)
            .into_iter()
            .zip(portfolios_db)
            .map(|(positions, portfolio)| portfolio.into_domain(positions))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_store;

    #[tokio::test]
    async fn test_load_portfolios_groups_positions_by_portfolio() {
        let (pool, _writer, _dir) = migrated_store();
        {
            let mut conn = get_connection(&pool).unwrap();
            diesel::sql_query(
                "INSERT INTO portfolios (id, name) VALUES (2, 'Growth'), (1, 'Income'), (3, 'Empty')",
            )
            .execute(&mut conn)
            .unwrap();
            diesel::sql_query(
                "INSERT INTO portfolio_positions (portfolio_id, fund_code, weight) VALUES \
                 (1, 'BBB', 0.4), (1, 'AAA', 0.6), (2, 'CCC', 1.0)",
            )
            .execute(&mut conn)
            .unwrap();
        }
        let repo = PortfolioRepository::new(pool);

        let loaded = repo.load_portfolios().unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].id, 1);
        assert_eq!(loaded[0].name, "Income");
        let codes: Vec<&str> = loaded[0]
            .positions
            .iter()
            .map(|p| p.fund_code.as_str())
            .collect();
        assert_eq!(codes, vec!["AAA", "BBB"]);
        assert_eq!(loaded[1].positions.len(), 1);
        assert!(loaded[2].positions.is_empty());
    }

    #[tokio::test]
    async fn test_schema_rejects_duplicate_and_out_of_range_positions() {
        let (pool, _writer, _dir) = migrated_store();
        let mut conn = get_connection(&pool).unwrap();
        diesel::sql_query("INSERT INTO portfolios (id, name) VALUES (1, 'P')")
            .execute(&mut conn)
            .unwrap();

        let duplicate = diesel::sql_query(
            "INSERT INTO portfolio_positions (portfolio_id, fund_code, weight) VALUES \
             (1, 'AAA', 0.5), (1, 'AAA', 0.5)",
        )
        .execute(&mut conn);
        let out_of_range = diesel::sql_query(
            "INSERT INTO portfolio_positions (portfolio_id, fund_code, weight) VALUES (1, 'BBB', 1.5)",
        )
        .execute(&mut conn);

        assert!(duplicate.is_err());
        assert!(out_of_range.is_err());
    }
}
