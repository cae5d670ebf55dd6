use crate::errors::Result;
use crate::portfolios::portfolios_model::Portfolio;

/// Read access to the externally managed portfolio registry.
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Every portfolio with its positions, ordered by id.
    fn load_portfolios(&self) -> Result<Vec<Portfolio>>;
}
