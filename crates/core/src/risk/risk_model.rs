use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// Three-tier label derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const LOW_UPPER: f64 = 0.33;
    pub const MEDIUM_UPPER: f64 = 0.67;

    /// Fixed cut-points: `< 0.33` LOW, `< 0.67` MEDIUM, else HIGH.
    pub fn classify(score: f64) -> Self {
        if score < Self::LOW_UPPER {
            RiskLevel::Low
        } else if score < Self::MEDIUM_UPPER {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown risk level '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Raw, unnormalized risk metrics of one portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskComponents {
    pub portfolio_id: i64,
    pub volatility: f64,
    pub herfindahl: f64,
    pub max_drawdown: f64,
    pub liquidity_penalty: f64,
}

/// Stored result row. One per (portfolio_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRiskScore {
    pub portfolio_id: i64,
    pub date: NaiveDate,
    pub risk_score: f64,
    pub risk: RiskLevel,
}

/// Latest HIGH row of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskAlert {
    pub portfolio_id: i64,
    pub risk_score: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRunSummary {
    pub run_date: NaiveDate,
    pub portfolios: usize,
    pub scored: usize,
    pub skipped: usize,
}
