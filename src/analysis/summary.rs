use serde::Serialize;

use crate::data::{CleaningStats, Dataset, NumericColumn};
use crate::error::AnalysisError;

use super::stats::{mean, quantile_sorted, sample_std_dev, sorted};
use super::Analysis;

/// "describe"-style statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: NumericColumn,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Result of the cleaning stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub records: usize,
    pub first_year: i64,
    pub last_year: i64,
    pub cleaning: CleaningStats,
    pub columns: Vec<ColumnSummary>,
}

pub fn describe(column: NumericColumn, values: &[f64]) -> Result<ColumnSummary, AnalysisError> {
    let mean = mean(values, "describe")?;
    let sorted = sorted(values);
    Ok(ColumnSummary {
        column,
        count: values.len(),
        mean,
        std_dev: sample_std_dev(values, mean),
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max: sorted[sorted.len() - 1],
    })
}

/// Record count, year span and per-column statistics of the cleaned table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summary;

impl Analysis for Summary {
    type Report = SummaryReport;

    fn run(&self, dataset: &Dataset) -> Result<SummaryReport, AnalysisError> {
        let (first_year, last_year) = dataset
            .year_range()
            .ok_or(AnalysisError::EmptyInput("summary"))?;
        let columns = NumericColumn::ALL
            .iter()
            .map(|&c| describe(c, &dataset.column(c)))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Summary: {} records, {first_year}–{last_year}",
            dataset.len()
        );
        Ok(SummaryReport {
            records: dataset.len(),
            first_year,
            last_year,
            cleaning: dataset.cleaning,
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::data::Record;

    fn record(year: i64, volume: f64, expenditure: f64) -> Record {
        Record {
            year,
            product: "GLP".into(),
            operation: "IMPORTAÇÃO".into(),
            volume,
            expenditure,
            extra: Vec::new(),
        }
    }

    #[test]
    fn describes_every_numeric_column() {
        let ds = Dataset::new(
            vec![
                record(2019, 1.0, 10.0),
                record(2021, 2.0, 20.0),
                record(2020, 3.0, 30.0),
                record(2022, 4.0, 40.0),
            ],
            Vec::new(),
            CleaningStats::default(),
        );
        let report = Summary.run(&ds).unwrap();
        assert_eq!(report.records, 4);
        assert_eq!((report.first_year, report.last_year), (2019, 2022));
        assert_eq!(report.columns.len(), 3);

        let volume = &report.columns[1];
        assert_eq!(volume.column, NumericColumn::Volume);
        assert_eq!(volume.count, 4);
        assert_abs_diff_eq!(volume.mean, 2.5);
        assert_abs_diff_eq!(volume.std_dev, (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(volume.min, 1.0);
        assert_abs_diff_eq!(volume.q1, 1.75);
        assert_abs_diff_eq!(volume.median, 2.5);
        assert_abs_diff_eq!(volume.q3, 3.25);
        assert_abs_diff_eq!(volume.max, 4.0);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let ds = Dataset::new(Vec::new(), Vec::new(), CleaningStats::default());
        assert_eq!(
            Summary.run(&ds),
            Err(AnalysisError::EmptyInput("summary"))
        );
    }
}
