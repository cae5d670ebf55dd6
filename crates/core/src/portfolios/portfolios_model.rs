use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::WEIGHT_SUM_TOLERANCE;
use crate::errors::{Result, ValidationError};

/// A fund held by a portfolio with its target weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub fund_code: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    pub positions: Vec<Position>,
}

impl Portfolio {
    /// Checks the registry invariants: unique fund codes, weights in
    /// `[0, 1]`, and weights summing to 1 within tolerance.
    pub fn validate_weights(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for position in &self.positions {
            if !seen.insert(position.fund_code.as_str()) {
                return Err(ValidationError::InvalidInput(format!(
                    "Portfolio {} lists fund {} more than once",
                    self.id, position.fund_code
                ))
                .into());
            }
            if !(0.0..=1.0).contains(&position.weight) {
                return Err(ValidationError::InvalidInput(format!(
                    "Portfolio {} weight for {} must be within [0, 1], got {}",
                    self.id, position.fund_code, position.weight
                ))
                .into());
            }
        }

        let total: f64 = self.positions.iter().map(|p| p.weight).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::InvalidInput(format!(
                "Portfolio {} weights sum to {:.4}, expected 1.0",
                self.id, total
            ))
            .into());
        }
        Ok(())
    }

    /// Weights rescaled to sum to exactly 1, in position order.
    /// `None` when there are no positions or the weights sum to zero or less.
    pub fn normalized_weights(&self) -> Option<Vec<(String, f64)>> {
        let total: f64 = self.positions.iter().map(|p| p.weight).sum();
        if self.positions.is_empty() || total.is_nan() || total <= 0.0 {
            return None;
        }
        Some(
            self.positions
                .iter()
                .map(|p| (p.fund_code.clone(), p.weight / total))
                .collect(),
        )
    }
}
