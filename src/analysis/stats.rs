//! Small numeric helpers shared by the stage analyses.
//!
//! Distribution functions come from `statrs`; quantiles use the linear
//! interpolation between closest ranks that spreadsheet tools and pandas
//! default to (R-7), which `statrs`' order statistics do not.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use statrs::statistics::Statistics;

use crate::error::AnalysisError;

/// Arithmetic mean. `what` names the caller in the error.
pub fn mean(values: &[f64], what: &'static str) -> Result<f64, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput(what));
    }
    Ok(values.iter().mean())
}

/// Sample standard deviation (n − 1 denominator), two-pass around `mean`.
///
/// `NaN` for fewer than two values.
pub fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Copy of `values` in ascending order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// `p`-quantile (`0.0..=1.0`) of pre-sorted data, linearly interpolated.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Result<f64, AnalysisError> {
    let n = sorted.len();
    if n == 0 {
        return Err(AnalysisError::EmptyInput("quantile"));
    }
    if n == 1 {
        return Ok(sorted[0]);
    }
    let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;
    Ok(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

pub fn standard_normal() -> Result<Normal, AnalysisError> {
    Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Distribution(e.to_string()))
}

/// P(Z > z) under the standard normal.
pub fn normal_right_tail(z: f64) -> Result<f64, AnalysisError> {
    Ok(standard_normal()?.sf(z))
}

/// Standard normal density sampled on `points` evenly spaced x in `[-limit, limit]`.
pub fn standard_normal_curve(limit: f64, points: usize) -> Result<Vec<[f64; 2]>, AnalysisError> {
    let normal = standard_normal()?;
    Ok(linspace(-limit, limit, points)
        .into_iter()
        .map(|x| [x, normal.pdf(x)])
        .collect())
}

/// `points` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}
