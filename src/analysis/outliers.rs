//! Quartiles and one-sided IQR outlier detection.
//!
//! Only the upper fence flags outliers: the interest is in excess volume.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::filter::rows_above;
use crate::data::{Dataset, NumericColumn};
use crate::error::AnalysisError;

use super::stats::{quantile_sorted, sorted};
use super::Analysis;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn of_sorted(sorted: &[f64]) -> Result<Self, AnalysisError> {
        Ok(Quartiles {
            q1: quantile_sorted(sorted, 0.25)?,
            q2: quantile_sorted(sorted, 0.5)?,
            q3: quantile_sorted(sorted, 0.75)?,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn upper_fence(&self, multiplier: f64) -> f64 {
        self.q3 + multiplier * self.iqr()
    }

    pub fn lower_fence(&self, multiplier: f64) -> f64 {
        self.q1 - multiplier * self.iqr()
    }
}

/// Five-number box plot with points beyond the whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotData {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub points_above: Vec<f64>,
    pub points_below: Vec<f64>,
}

/// Whiskers reach the most extreme values inside the fences.
pub fn box_plot(values: &[f64], multiplier: f64) -> Result<BoxPlotData, AnalysisError> {
    let sorted = sorted(values);
    let quartiles = Quartiles::of_sorted(&sorted)?;
    let low = quartiles.lower_fence(multiplier);
    let high = quartiles.upper_fence(multiplier);

    Ok(BoxPlotData {
        lower_whisker: sorted.iter().copied().find(|&v| v >= low).unwrap_or(quartiles.q1),
        q1: quartiles.q1,
        median: quartiles.q2,
        q3: quartiles.q3,
        upper_whisker: sorted.iter().rev().copied().find(|&v| v <= high).unwrap_or(quartiles.q3),
        points_above: sorted.iter().copied().filter(|&v| v > high).collect(),
        points_below: sorted.iter().copied().filter(|&v| v < low).collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub column: NumericColumn,
    pub quartiles: Quartiles,
    pub iqr: f64,
    pub upper_fence: f64,
    pub outlier_count: usize,
    /// Row indices of the outliers, in file order.
    pub outlier_rows: Vec<usize>,
    pub box_plot: BoxPlotData,
}

#[derive(Debug, Clone, Copy)]
pub struct OutlierDetector {
    pub column: NumericColumn,
    pub multiplier: f64,
}

impl OutlierDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        OutlierDetector {
            column: NumericColumn::Volume,
            multiplier: config.iqr_multiplier,
        }
    }
}

impl Analysis for OutlierDetector {
    type Report = OutlierReport;

    fn run(&self, dataset: &Dataset) -> Result<OutlierReport, AnalysisError> {
        let values = dataset.column(self.column);
        if values.is_empty() {
            return Err(AnalysisError::EmptyInput("quartiles"));
        }
        let quartiles = Quartiles::of_sorted(&sorted(&values))?;
        let upper_fence = quartiles.upper_fence(self.multiplier);
        let outlier_rows: Vec<usize> = rows_above(dataset, self.column, upper_fence)
            .into_iter()
            .map(|(i, _)| i)
            .collect();

        log::debug!(
            "Quartiles of {}: {quartiles:?}, fence {upper_fence:.2}, {} outliers",
            self.column,
            outlier_rows.len()
        );
        Ok(OutlierReport {
            column: self.column,
            quartiles,
            iqr: quartiles.iqr(),
            upper_fence,
            outlier_count: outlier_rows.len(),
            outlier_rows,
            box_plot: box_plot(&values, self.multiplier)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::data::{CleaningStats, Record};

    fn dataset(volumes: &[f64]) -> Dataset {
        let records = volumes
            .iter()
            .map(|&volume| Record {
                year: 2020,
                product: "ÓLEO DIESEL".into(),
                operation: "IMPORTAÇÃO".into(),
                volume,
                expenditure: 1.0,
                extra: Vec::new(),
            })
            .collect();
        Dataset::new(records, Vec::new(), CleaningStats::default())
    }

    fn detector() -> OutlierDetector {
        OutlierDetector::new(&AnalysisConfig::default())
    }

    #[test]
    fn fence_is_strict() {
        // Sorted: Q1 at rank 2 = 10, Q3 at rank 6 = 30, fence 60.
        let ds = dataset(&[30.0, 10.0, 61.0, 20.0, 10.0, 60.0, 30.0, 20.0, 10.0]);
        let report = detector().run(&ds).unwrap();

        assert_abs_diff_eq!(report.quartiles.q1, 10.0);
        assert_abs_diff_eq!(report.quartiles.q2, 20.0);
        assert_abs_diff_eq!(report.quartiles.q3, 30.0);
        assert_abs_diff_eq!(report.iqr, 20.0);
        assert_abs_diff_eq!(report.upper_fence, 60.0);
        assert_eq!(report.outlier_count, 1);
        assert_eq!(report.outlier_rows, vec![2]);

        assert_abs_diff_eq!(report.box_plot.upper_whisker, 60.0);
        assert_eq!(report.box_plot.points_above, vec![61.0]);
    }

    #[test]
    fn low_values_are_never_flagged() {
        let ds = dataset(&[1.0, 100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        let report = detector().run(&ds).unwrap();
        assert_eq!(report.outlier_count, 0);
        assert_eq!(report.box_plot.points_below, vec![1.0]);
        assert_abs_diff_eq!(report.box_plot.lower_whisker, 100.0);
    }

    #[test]
    fn empty_column() {
        let ds = dataset(&[]);
        assert_eq!(
            detector().run(&ds),
            Err(AnalysisError::EmptyInput("quartiles"))
        );
    }
}
