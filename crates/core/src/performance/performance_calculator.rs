use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};

use crate::analytics::{median, median_absolute_deviation, percentile_ranks, round_to, sample_std, ReturnPoint};
use crate::constants::{
    EPSILON, MAD_SCALE, MIN_PEER_GROUP_SIZE, MIN_RETURN_OBSERVATIONS, NEAR_ZERO_VOLATILITY,
    PEER_GROUP_ALL, PERFORMANCE_WINDOW_DAYS, SCORE_DECIMALS,
};
use crate::labels::FundLabel;
use crate::performance::performance_model::{FundPerformanceMetric, FundScore};

const POOR_SCORE_MAX: f64 = 0.10;
const POOR_Z_MAX: f64 = -1.5;
const CONFIDENCE_Z_SCALE: f64 = 3.0;

/// The evaluation window `(most_recent - 90d, most_recent]`, where
/// `most_recent` is the latest return date across all funds.
pub fn evaluation_window(returns: &BTreeMap<String, Vec<ReturnPoint>>) -> Option<(NaiveDate, NaiveDate)> {
    let most_recent = returns.values().flatten().map(|p| p.date).max()?;
    Some((most_recent - Duration::days(PERFORMANCE_WINDOW_DAYS), most_recent))
}

/// Sharpe-like score of every fund with enough non-flat history in the window.
///
/// `window` is `(exclusive start, inclusive end)`.
pub fn fund_scores(
    returns: &BTreeMap<String, Vec<ReturnPoint>>,
    labels: &HashMap<String, FundLabel>,
    window: (NaiveDate, NaiveDate),
) -> Vec<FundScore> {
    let (after, until) = window;
    returns
        .iter()
        .filter_map(|(code, points)| {
            let values: Vec<f64> = points
                .iter()
                .filter(|p| p.date > after && p.date <= until)
                .map(|p| p.value)
                .collect();
            if values.len() < MIN_RETURN_OBSERVATIONS {
                return None;
            }

            let volatility = sample_std(&values)?;
            if volatility <= NEAR_ZERO_VOLATILITY {
                return None;
            }
            let total_return = values.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;

            let label = labels.get(code);
            Some(FundScore {
                fund_code: code.clone(),
                sharpe_like: total_return / (volatility + EPSILON),
                total_return,
                volatility,
                category: label.and_then(|l| l.category.clone()),
                main_category: label.and_then(|l| l.main_category.clone()),
            })
        })
        .collect()
}

fn count_by<'a>(keys: impl Iterator<Item = Option<&'a String>>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for key in keys.flatten() {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Peer group of a fund: its category when that group has at least five
/// scored members, else its main category under the same rule, else `ALL`.
pub fn resolve_peer_group(
    fund: &FundScore,
    category_counts: &HashMap<&str, usize>,
    main_category_counts: &HashMap<&str, usize>,
) -> PeerGroup {
    let large_enough = |key: &Option<String>, counts: &HashMap<&str, usize>| {
        key.as_deref()
            .filter(|k| counts.get(k).copied().unwrap_or(0) >= MIN_PEER_GROUP_SIZE)
            .map(str::to_string)
    };

    if let Some(category) = large_enough(&fund.category, category_counts) {
        PeerGroup::Category(category)
    } else if let Some(main) = large_enough(&fund.main_category, main_category_counts) {
        PeerGroup::MainCategory(main)
    } else {
        PeerGroup::All
    }
}

/// Resolved peer group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerGroup {
    Category(String),
    MainCategory(String),
    All,
}

impl PeerGroup {
    pub fn name(&self) -> &str {
        match self {
            PeerGroup::Category(name) | PeerGroup::MainCategory(name) => name,
            PeerGroup::All => PEER_GROUP_ALL,
        }
    }

    fn contains(&self, fund: &FundScore) -> bool {
        match self {
            PeerGroup::Category(name) => fund.category.as_deref() == Some(name.as_str()),
            PeerGroup::MainCategory(name) => fund.main_category.as_deref() == Some(name.as_str()),
            PeerGroup::All => true,
        }
    }
}

/// `(flagged, confidence)`: flagged when the score is in the bottom decile
/// and the robust z-score is at most -1.5; confidence is `min(1, |z| / 3)`.
pub fn poor_performer_verdict(performance_score: f64, z: f64) -> (bool, Option<f64>) {
    let flagged = performance_score <= POOR_SCORE_MAX && z <= POOR_Z_MAX;
    let confidence = flagged.then(|| (z.abs() / CONFIDENCE_Z_SCALE).min(1.0));
    (flagged, confidence)
}

/// Compare every fund with its peer group and build the rows stored under `date`.
pub fn evaluate_peers(scores: &[FundScore], date: NaiveDate) -> Vec<FundPerformanceMetric> {
    let category_counts = count_by(scores.iter().map(|s| s.category.as_ref()));
    let main_category_counts = count_by(scores.iter().map(|s| s.main_category.as_ref()));

    scores
        .iter()
        .map(|fund| {
            let group = resolve_peer_group(fund, &category_counts, &main_category_counts);
            let peers: Vec<&FundScore> = scores.iter().filter(|s| group.contains(s)).collect();
            let values: Vec<f64> = peers.iter().map(|s| s.sharpe_like).collect();

            let position = peers
                .iter()
                .position(|s| s.fund_code == fund.fund_code)
                .unwrap_or(0);
            let performance_score = percentile_ranks(&values)[position];

            let center = median(&values).unwrap_or(fund.sharpe_like);
            let mad = median_absolute_deviation(&values).unwrap_or(0.0);
            let z = (fund.sharpe_like - center) / (MAD_SCALE * mad + EPSILON);

            let (is_poor_performer, confidence) = poor_performer_verdict(performance_score, z);

            FundPerformanceMetric {
                fund_code: fund.fund_code.clone(),
                date,
                performance_score: round_to(performance_score, SCORE_DECIMALS),
                peer_category: group.name().to_string(),
                is_poor_performer,
                confidence,
            }
        })
        .collect()
}
