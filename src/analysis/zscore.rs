use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::{Dataset, NumericColumn};
use crate::error::AnalysisError;

use super::stats::{mean, normal_right_tail, sample_std_dev, standard_normal_curve};
use super::Analysis;

// ---------------------------------------------------------------------------
// Standardisation
// ---------------------------------------------------------------------------

/// `(x - mean) / s` for every value, with `s` the sample standard deviation.
pub fn z_scores(values: &[f64]) -> Result<(f64, f64, Vec<f64>), AnalysisError> {
    let mean = mean(values, "z-score")?;
    if values.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            what: "z-score".into(),
            needed: 2,
            got: values.len(),
        });
    }
    let std_dev = sample_std_dev(values, mean);
    if std_dev == 0.0 {
        return Err(AnalysisError::DivisionByZero("z-score"));
    }
    let z = values.iter().map(|x| (x - mean) / std_dev).collect();
    Ok((mean, std_dev, z))
}

// ---------------------------------------------------------------------------
// Histogram (density-normalised)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub width: f64,
    pub density: f64,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        self.start + self.width / 2.0
    }
}

/// Equal-width bins over `[min, max]`; bar areas sum to one.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (start, width) = if max > min {
        (min, (max - min) / bins as f64)
    } else {
        (min - 0.5, 1.0 / bins as f64)
    };

    let mut counts = vec![0usize; bins];
    for &v in values {
        let i = ((v - start) / width).floor() as usize;
        counts[i.min(bins - 1)] += 1;
    }

    let n = values.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| HistogramBin {
            start: start + width * i as f64,
            width,
            density: c as f64 / (n * width),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stage analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreReport {
    pub column: NumericColumn,
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
    pub above_threshold: usize,
    pub tail_z: f64,
    /// P(Z > tail_z) for a standard normal; a reference value, not a
    /// property of the sample.
    pub tail_probability: f64,
    pub z_scores: Vec<f64>,
    pub histogram: Vec<HistogramBin>,
    pub normal_curve: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy)]
pub struct ZScoreAnalyzer {
    pub column: NumericColumn,
    pub threshold: f64,
    pub tail_z: f64,
    pub bins: usize,
    pub grid_limit: f64,
    pub grid_points: usize,
}

impl ZScoreAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        ZScoreAnalyzer {
            column: NumericColumn::Volume,
            threshold: config.zscore_threshold,
            tail_z: config.tail_z,
            bins: config.histogram_bins,
            grid_limit: config.density_grid_limit,
            grid_points: config.density_grid_points,
        }
    }
}

impl Analysis for ZScoreAnalyzer {
    type Report = ZScoreReport;

    fn run(&self, dataset: &Dataset) -> Result<ZScoreReport, AnalysisError> {
        let (mean, std_dev, z_scores) = z_scores(&dataset.column(self.column))?;
        let above_threshold = z_scores.iter().filter(|&&z| z > self.threshold).count();
        let tail_probability = normal_right_tail(self.tail_z)?;

        log::debug!(
            "Z-scores of {}: mean {mean:.2}, sd {std_dev:.2}, {above_threshold} above {}",
            self.column,
            self.threshold
        );
        Ok(ZScoreReport {
            column: self.column,
            mean,
            std_dev,
            threshold: self.threshold,
            above_threshold,
            tail_z: self.tail_z,
            tail_probability,
            histogram: histogram(&z_scores, self.bins),
            normal_curve: standard_normal_curve(self.grid_limit, self.grid_points)?,
            z_scores,
        })
    }
}
