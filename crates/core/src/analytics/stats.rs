//! Descriptive statistics over `f64` samples.
//!
//! Inputs are expected to be finite. Rank-based helpers follow the
//! "average rank, divided by n" convention, so every output lies in (0, 1].

use std::cmp::Ordering;

use nalgebra::{DMatrix, DVector};

use crate::errors::{Error, Result};

/// Percentile rank of every element, ties sharing their average rank.
///
/// `[10, 20, 20, 40]` ranks as `[1, 2.5, 2.5, 4] / 4`.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j share ranks i+1..=j+1
        let average = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = average / n as f64;
        }
        i = j + 1;
    }
    ranks
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Unscaled median absolute deviation around the median.
pub fn median_absolute_deviation(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Sample standard deviation (n - 1 denominator). `None` below two samples.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Sample covariance of the columns of `observations` (rows are days).
pub fn sample_covariance(observations: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let rows = observations.nrows();
    if rows < 2 {
        return Err(Error::Calculation(format!(
            "Covariance needs at least 2 observations, got {}",
            rows
        )));
    }
    let means = observations.row_mean();
    let mut centered = observations.clone();
    for mut row in centered.row_iter_mut() {
        row -= &means;
    }
    Ok(centered.transpose() * &centered / (rows - 1) as f64)
}

/// Portfolio variance wᵀΣw, clamped at zero.
pub fn portfolio_variance(weights: &[f64], covariance: &DMatrix<f64>) -> Result<f64> {
    let n = weights.len();
    if n == 0 || covariance.nrows() != n || covariance.ncols() != n {
        return Err(Error::Calculation(format!(
            "Covariance matrix dimensions ({} x {}) do not match number of weights ({})",
            covariance.nrows(),
            covariance.ncols(),
            n
        )));
    }
    let w = DVector::from_column_slice(weights);
    let variance = (w.transpose() * covariance * &w)[(0, 0)];
    Ok(variance.max(0.0))
}

/// Largest peak-to-trough loss of the compounded curve ∏(1 + r).
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for r in returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        worst = worst.max(1.0 - cumulative / peak);
    }
    worst
}

/// Min-max scale to [0, 1]; every value becomes 0.5 when they all tie.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        values.iter().map(|v| (v - min) / (max - min)).collect()
    } else {
        vec![0.5; values.len()]
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
