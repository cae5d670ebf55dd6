use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use log::info;
use nalgebra::DMatrix;

use crate::analytics::{
    max_drawdown, min_max_normalize, percentile_ranks, portfolio_variance, round_to,
    sample_covariance, ReturnPoint,
};
use crate::constants::{MIN_RETURN_OBSERVATIONS, SCORE_DECIMALS};
use crate::portfolios::Portfolio;
use crate::risk::risk_model::{PortfolioRiskScore, RiskComponents, RiskLevel};

const VOLATILITY_WEIGHT: f64 = 0.6;
const CONCENTRATION_WEIGHT: f64 = 0.2;
const DRAWDOWN_WEIGHT: f64 = 0.1;
const LIQUIDITY_WEIGHT: f64 = 0.1;

/// Normalized liquidity of a fund missing from the liquidity window.
const NEUTRAL_LIQUIDITY: f64 = 0.5;

/// Why a portfolio could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskSkipReason {
    NoPositions,
    InvalidWeights,
    NoPriceData,
    InsufficientHistory { aligned_days: usize },
    Numerical(String),
}

impl fmt::Display for RiskSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskSkipReason::NoPositions => write!(f, "no positions"),
            RiskSkipReason::InvalidWeights => write!(f, "weights do not sum to a positive value"),
            RiskSkipReason::NoPriceData => write!(f, "no price data for its funds"),
            RiskSkipReason::InsufficientHistory { aligned_days } => write!(
                f,
                "insufficient data ({} aligned days, need {})",
                aligned_days, MIN_RETURN_OBSERVATIONS
            ),
            RiskSkipReason::Numerical(msg) => write!(f, "numerical failure: {}", msg),
        }
    }
}

fn mean_or_zero<I: Iterator<Item = Option<f64>>>(values: I) -> f64 {
    let present: Vec<f64> = values.flatten().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

/// Min-max normalized liquidity of every fund with return rows dated on or
/// after `since`.
///
/// Raw liquidity is `ln(1 + mean market cap) + ln(1 + mean investor count)`.
pub fn fund_liquidity(
    returns: &BTreeMap<String, Vec<ReturnPoint>>,
    since: NaiveDate,
) -> HashMap<String, f64> {
    let mut codes = Vec::new();
    let mut raw = Vec::new();
    for (code, points) in returns {
        let recent: Vec<&ReturnPoint> = points.iter().filter(|p| p.date >= since).collect();
        if recent.is_empty() {
            continue;
        }
        let market_cap = mean_or_zero(recent.iter().map(|p| p.market_cap));
        let investors = mean_or_zero(recent.iter().map(|p| p.investor_count));
        codes.push(code.clone());
        raw.push(market_cap.ln_1p() + investors.ln_1p());
    }

    codes.into_iter().zip(min_max_normalize(&raw)).collect()
}

/// Raw risk metrics of one portfolio over date-aligned constituent returns.
pub fn portfolio_components(
    portfolio: &Portfolio,
    returns: &BTreeMap<String, Vec<ReturnPoint>>,
    liquidity: &HashMap<String, f64>,
) -> Result<RiskComponents, RiskSkipReason> {
    if portfolio.positions.is_empty() {
        return Err(RiskSkipReason::NoPositions);
    }
    let weighted = portfolio
        .normalized_weights()
        .ok_or(RiskSkipReason::InvalidWeights)?;

    let series: Vec<BTreeMap<NaiveDate, f64>> = weighted
        .iter()
        .map(|(code, _)| {
            returns
                .get(code)
                .map(|points| points.iter().map(|p| (p.date, p.value)).collect())
                .unwrap_or_default()
        })
        .collect();

    if series.iter().all(BTreeMap::is_empty) {
        return Err(RiskSkipReason::NoPriceData);
    }

    let mut common: BTreeSet<NaiveDate> = series[0].keys().copied().collect();
    for s in &series[1..] {
        common.retain(|date| s.contains_key(date));
    }
    if common.len() < MIN_RETURN_OBSERVATIONS {
        return Err(RiskSkipReason::InsufficientHistory {
            aligned_days: common.len(),
        });
    }

    let dates: Vec<NaiveDate> = common.into_iter().collect();
    let weights: Vec<f64> = weighted.iter().map(|(_, w)| *w).collect();
    let matrix = DMatrix::from_fn(dates.len(), series.len(), |row, col| {
        series[col].get(&dates[row]).copied().unwrap_or(0.0)
    });

    let covariance =
        sample_covariance(&matrix).map_err(|e| RiskSkipReason::Numerical(e.to_string()))?;
    let variance = portfolio_variance(&weights, &covariance)
        .map_err(|e| RiskSkipReason::Numerical(e.to_string()))?;

    let daily: Vec<f64> = matrix
        .row_iter()
        .map(|row| row.iter().zip(&weights).map(|(r, w)| r * w).sum())
        .collect();

    let liquidity_penalty = weighted
        .iter()
        .map(|(code, w)| {
            let normalized = liquidity.get(code).copied().unwrap_or(NEUTRAL_LIQUIDITY);
            w * (1.0 - normalized)
        })
        .sum();

    Ok(RiskComponents {
        portfolio_id: portfolio.id,
        volatility: variance.sqrt(),
        herfindahl: weights.iter().map(|w| w * w).sum(),
        max_drawdown: max_drawdown(&daily),
        liquidity_penalty,
    })
}

/// `0.6·vol + 0.2·herfindahl + 0.1·drawdown + 0.1·liquidity`, rounded to 6 decimals.
pub fn composite_score(
    volatility_pct: f64,
    herfindahl_pct: f64,
    drawdown_pct: f64,
    liquidity_pct: f64,
) -> f64 {
    round_to(
        VOLATILITY_WEIGHT * volatility_pct
            + CONCENTRATION_WEIGHT * herfindahl_pct
            + DRAWDOWN_WEIGHT * drawdown_pct
            + LIQUIDITY_WEIGHT * liquidity_pct,
        SCORE_DECIMALS,
    )
}

/// Rank every metric across the run's portfolios and combine the ranks.
pub fn score_portfolios(components: &[RiskComponents], date: NaiveDate) -> Vec<PortfolioRiskScore> {
    let ranks = |metric: fn(&RiskComponents) -> f64| {
        percentile_ranks(&components.iter().map(metric).collect::<Vec<_>>())
    };
    let volatility = ranks(|c| c.volatility);
    let herfindahl = ranks(|c| c.herfindahl);
    let drawdown = ranks(|c| c.max_drawdown);
    let liquidity = ranks(|c| c.liquidity_penalty);

    components
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let risk_score =
                composite_score(volatility[i], herfindahl[i], drawdown[i], liquidity[i]);
            let risk = RiskLevel::classify(risk_score);
            info!(
                "Portfolio {}: vol_pct={:.3}, herf_pct={:.3}, mdd_pct={:.3}, liq_pct={:.3} -> {:.6} ({})",
                c.portfolio_id, volatility[i], herfindahl[i], drawdown[i], liquidity[i], risk_score, risk
            );
            PortfolioRiskScore {
                portfolio_id: c.portfolio_id,
                date,
                risk_score,
                risk,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolios::Position;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series(values: &[f64]) -> Vec<ReturnPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ReturnPoint {
                date: start() + Duration::days(i as i64),
                value: *v,
                market_cap: Some(1_000.0),
                investor_count: Some(10.0),
            })
            .collect()
    }

    fn alternating(n: usize, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    fn portfolio(id: i64, weights: &[(&str, f64)]) -> Portfolio {
        Portfolio {
            id,
            name: format!("P{}", id),
            positions: weights
                .iter()
                .map(|(c, w)| Position {
                    fund_code: c.to_string(),
                    weight: *w,
                })
                .collect(),
        }
    }

    #[test]
    fn test_composite_weighting_is_exact() {
        assert_eq!(composite_score(0.1, 0.9, 0.5, 0.5), 0.34);
        assert_eq!(composite_score(0.5, 0.5, 0.5, 0.5), 0.5);
        assert_eq!(composite_score(0.9, 0.1, 0.5, 0.5), 0.66);
        assert_eq!(RiskLevel::classify(composite_score(0.1, 0.9, 0.5, 0.5)), RiskLevel::Medium);
    }

    #[test]
    fn test_single_fund_portfolio_components() {
        let mut returns = BTreeMap::new();
        returns.insert("AAK".to_string(), series(&alternating(40, 0.01)));
        let liquidity = HashMap::from([("AAK".to_string(), 0.25)]);

        let c = portfolio_components(&portfolio(1, &[("AAK", 1.0)]), &returns, &liquidity).unwrap();

        assert!((c.herfindahl - 1.0).abs() < 1e-12);
        let expected_vol = crate::analytics::sample_std(&alternating(40, 0.01)).unwrap();
        assert!((c.volatility - expected_vol).abs() < 1e-12);
        assert!((c.liquidity_penalty - 0.75).abs() < 1e-12);
        assert!(c.max_drawdown > 0.0 && c.max_drawdown < 0.02);
    }

    #[test]
    fn test_dates_missing_for_any_fund_are_dropped() {
        let mut returns = BTreeMap::new();
        returns.insert("AAK".to_string(), series(&alternating(40, 0.01)));
        // BBK only has the last 20 days of the same calendar
        let late: Vec<ReturnPoint> = series(&alternating(40, 0.02)).into_iter().skip(20).collect();
        returns.insert("BBK".to_string(), late);

        let result = portfolio_components(
            &portfolio(1, &[("AAK", 0.5), ("BBK", 0.5)]),
            &returns,
            &HashMap::new(),
        );
        assert_eq!(
            result,
            Err(RiskSkipReason::InsufficientHistory { aligned_days: 20 })
        );
    }

    #[test]
    fn test_exactly_thirty_aligned_days_is_enough() {
        let mut returns = BTreeMap::new();
        returns.insert("AAK".to_string(), series(&alternating(30, 0.01)));
        assert!(portfolio_components(&portfolio(1, &[("AAK", 1.0)]), &returns, &HashMap::new()).is_ok());

        returns.insert("AAK".to_string(), series(&alternating(29, 0.01)));
        assert!(portfolio_components(&portfolio(1, &[("AAK", 1.0)]), &returns, &HashMap::new()).is_err());
    }

    #[test]
    fn test_weights_are_normalized_and_missing_liquidity_is_neutral() {
        let mut returns = BTreeMap::new();
        returns.insert("AAK".to_string(), series(&alternating(35, 0.01)));
        returns.insert("BBK".to_string(), series(&alternating(35, 0.03)));

        let c = portfolio_components(
            &portfolio(1, &[("AAK", 2.0), ("BBK", 2.0)]),
            &returns,
            &HashMap::new(),
        )
        .unwrap();
        assert!((c.herfindahl - 0.5).abs() < 1e-12);
        assert!((c.liquidity_penalty - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_skip_reasons() {
        let returns = BTreeMap::new();
        assert_eq!(
            portfolio_components(&portfolio(1, &[]), &returns, &HashMap::new()),
            Err(RiskSkipReason::NoPositions)
        );
        assert_eq!(
            portfolio_components(&portfolio(1, &[("AAK", 0.0)]), &returns, &HashMap::new()),
            Err(RiskSkipReason::InvalidWeights)
        );
        assert_eq!(
            portfolio_components(&portfolio(1, &[("AAK", 1.0)]), &returns, &HashMap::new()),
            Err(RiskSkipReason::NoPriceData)
        );
    }

    #[test]
    fn test_fund_liquidity_min_max_and_window() {
        let mut returns = BTreeMap::new();
        let mut big = series(&[0.0; 5]);
        for p in &mut big {
            p.market_cap = Some(1e9);
            p.investor_count = Some(1e5);
        }
        let mut small = series(&[0.0; 5]);
        for p in &mut small {
            p.market_cap = None;
            p.investor_count = None;
        }
        returns.insert("BIG".to_string(), big);
        returns.insert("SMALL".to_string(), small);
        returns.insert("OLD".to_string(), series(&[0.0; 1]));

        let liquidity = fund_liquidity(&returns, start() + Duration::days(2));
        assert_eq!(liquidity["BIG"], 1.0);
        assert_eq!(liquidity["SMALL"], 0.0);
        assert!(!liquidity.contains_key("OLD"));
    }

    #[test]
    fn test_fund_liquidity_ties_are_neutral() {
        let mut returns = BTreeMap::new();
        returns.insert("AAK".to_string(), series(&[0.0; 3]));
        returns.insert("BBK".to_string(), series(&[0.0; 3]));
        let liquidity = fund_liquidity(&returns, start());
        assert_eq!(liquidity["AAK"], 0.5);
        assert_eq!(liquidity["BBK"], 0.5);
    }

    #[test]
    fn test_score_portfolios_ranks_across_run() {
        let components = vec![
            RiskComponents {
                portfolio_id: 1,
                volatility: 0.01,
                herfindahl: 1.0,
                max_drawdown: 0.1,
                liquidity_penalty: 0.5,
            },
            RiskComponents {
                portfolio_id: 2,
                volatility: 0.02,
                herfindahl: 0.5,
                max_drawdown: 0.1,
                liquidity_penalty: 0.5,
            },
            RiskComponents {
                portfolio_id: 3,
                volatility: 0.03,
                herfindahl: 0.2,
                max_drawdown: 0.1,
                liquidity_penalty: 0.5,
            },
        ];
        let scores = score_portfolios(&components, start());

        // vol pct 1/3, 2/3, 1; herf pct 1, 2/3, 1/3; mdd and liq 2/3 everywhere
        assert_eq!(scores[0].risk_score, round_to(0.6 / 3.0 + 0.2 + 0.2 * 2.0 / 3.0, 6));
        assert_eq!(scores[2].risk_score, round_to(0.6 + 0.2 / 3.0 + 0.2 * 2.0 / 3.0, 6));
        assert_eq!(scores[2].risk, RiskLevel::High);
        assert!(scores.iter().all(|s| s.date == start()));
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.risk_score)));
    }
}
