use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::{Dataset, NumericColumn};
use crate::error::AnalysisError;

use super::stats::{mean, sample_std_dev};
use super::Analysis;

/// `n` distinct row indices drawn uniformly with a seeded generator.
///
/// The same seed, length and `n` always give the same rows.
pub fn sample_indices(len: usize, n: usize, seed: u64) -> Result<Vec<usize>, AnalysisError> {
    if len < n {
        return Err(AnalysisError::InsufficientData {
            what: "confidence interval sample".into(),
            needed: n,
            got: len,
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(rand::seq::index::sample(&mut rng, len, n).into_vec())
}

/// Mean ± margin of error for one column of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub column: NumericColumn,
    pub mean: f64,
    pub std_dev: f64,
    pub margin: f64,
}

impl Estimate {
    pub fn from_sample(
        column: NumericColumn,
        values: &[f64],
        z_critical: f64,
    ) -> Result<Self, AnalysisError> {
        let mean = mean(values, "confidence interval")?;
        let std_dev = sample_std_dev(values, mean);
        Ok(Estimate {
            column,
            mean,
            std_dev,
            margin: z_critical * std_dev / (values.len() as f64).sqrt(),
        })
    }

    pub fn lower(&self) -> f64 {
        self.mean - self.margin
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.margin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalReport {
    pub sample_size: usize,
    pub seed: u64,
    pub z_critical: f64,
    pub estimates: Vec<Estimate>,
}

#[derive(Debug, Clone)]
pub struct IntervalEstimator {
    pub sample_size: usize,
    pub seed: u64,
    pub z_critical: f64,
    pub columns: Vec<NumericColumn>,
}

impl IntervalEstimator {
    pub fn new(config: &AnalysisConfig) -> Self {
        IntervalEstimator {
            sample_size: config.sample_size,
            seed: config.seed,
            z_critical: config.z_critical,
            columns: vec![NumericColumn::Volume, NumericColumn::Expenditure],
        }
    }
}

impl Analysis for IntervalEstimator {
    type Report = IntervalReport;

    fn run(&self, dataset: &Dataset) -> Result<IntervalReport, AnalysisError> {
        if self.sample_size < 2 {
            return Err(AnalysisError::InsufficientData {
                what: "confidence interval sample size".into(),
                needed: 2,
                got: self.sample_size,
            });
        }
        let rows = sample_indices(dataset.len(), self.sample_size, self.seed)?;
        let records = dataset.records();

        let estimates = self
            .columns
            .iter()
            .map(|&column| {
                let values: Vec<f64> = rows.iter().map(|&i| column.value(&records[i])).collect();
                Estimate::from_sample(column, &values, self.z_critical)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for e in &estimates {
            log::debug!("{}: {:.2} ± {:.2}", e.column, e.mean, e.margin);
        }
        Ok(IntervalReport {
            sample_size: self.sample_size,
            seed: self.seed,
            z_critical: self.z_critical,
            estimates,
        })
    }
}
