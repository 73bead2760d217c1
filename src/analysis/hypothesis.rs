//! Two independent tests: Welch's mean-difference test between two
//! subgroups, and a one-sample z-test on the share of rows above a threshold.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::config::{AnalysisConfig, Subgroup};
use crate::data::filter::subgroup_values;
use crate::data::{Dataset, NumericColumn};
use crate::error::AnalysisError;

use super::outliers::{box_plot, BoxPlotData};
use super::stats::{mean, sample_std_dev, standard_normal};
use super::Analysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Reject,
    FailToReject,
}

impl Decision {
    pub fn at(p_value: f64, significance: f64) -> Self {
        if p_value < significance {
            Decision::Reject
        } else {
            Decision::FailToReject
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Reject => f.write_str("Reject H0"),
            Decision::FailToReject => f.write_str("Fail to reject H0"),
        }
    }
}

// ---------------------------------------------------------------------------
// Welch's t-test
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WelchTest {
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided.
    pub p_value: f64,
}

/// Two-sample t-test without assuming equal variances.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<WelchTest, AnalysisError> {
    for (name, values) in [("first subgroup", a), ("second subgroup", b)] {
        if values.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                what: format!("mean-difference test, {name}"),
                needed: 2,
                got: values.len(),
            });
        }
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (mean(a, "welch")?, mean(b, "welch")?);
    let va = sample_std_dev(a, mean_a).powi(2) / na;
    let vb = sample_std_dev(b, mean_b).powi(2) / nb;
    let se2 = va + vb;
    if se2 == 0.0 {
        return Err(AnalysisError::DivisionByZero("mean-difference test"));
    }

    let t = (mean_a - mean_b) / se2.sqrt();
    let df = se2.powi(2) / (va.powi(2) / (na - 1.0) + vb.powi(2) / (nb - 1.0));
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    let p_value = 2.0 * dist.sf(t.abs());

    Ok(WelchTest { t, df, p_value })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: Subgroup,
    pub count: usize,
    pub mean: f64,
    pub box_plot: BoxPlotData,
}

impl GroupStats {
    fn of(group: &Subgroup, values: &[f64], multiplier: f64) -> Result<Self, AnalysisError> {
        Ok(GroupStats {
            group: group.clone(),
            count: values.len(),
            mean: mean(values, "subgroup")?,
            box_plot: box_plot(values, multiplier)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanDifferenceReport {
    pub column: NumericColumn,
    pub group_a: GroupStats,
    pub group_b: GroupStats,
    pub test: WelchTest,
    pub decision: Decision,
}

// ---------------------------------------------------------------------------
// One-sample proportion z-test
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProportionTest {
    pub column: NumericColumn,
    pub threshold: f64,
    pub reference: f64,
    pub n: usize,
    pub successes: usize,
    pub proportion: f64,
    pub z: f64,
    pub p_value: f64,
    pub decision: Decision,
}

/// z-test of the share of `values` above `threshold` against `reference`.
pub fn proportion_z_test(
    column: NumericColumn,
    values: &[f64],
    threshold: f64,
    reference: f64,
    significance: f64,
) -> Result<ProportionTest, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput("proportion test"));
    }
    let n = values.len();
    let successes = values.iter().filter(|&&v| v > threshold).count();
    let proportion = successes as f64 / n as f64;

    let se = (reference * (1.0 - reference) / n as f64).sqrt();
    if se == 0.0 || se.is_nan() {
        return Err(AnalysisError::DivisionByZero("proportion test"));
    }
    let z = (proportion - reference) / se;
    let p_value = 2.0 * standard_normal()?.sf(z.abs());

    Ok(ProportionTest {
        column,
        threshold,
        reference,
        n,
        successes,
        proportion,
        z,
        p_value,
        decision: Decision::at(p_value, significance),
    })
}

// ---------------------------------------------------------------------------
// Stage analysis
// ---------------------------------------------------------------------------

/// Each sub-test keeps its own outcome; one failing leaves the other intact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisReport {
    pub mean_difference: Result<MeanDifferenceReport, AnalysisError>,
    pub proportion: Result<ProportionTest, AnalysisError>,
}

#[derive(Debug, Clone)]
pub struct HypothesisTester {
    pub group_a: Subgroup,
    pub group_b: Subgroup,
    pub mean_column: NumericColumn,
    pub proportion_column: NumericColumn,
    pub proportion_threshold: f64,
    pub reference_proportion: f64,
    pub significance: f64,
    pub iqr_multiplier: f64,
}

impl HypothesisTester {
    pub fn new(config: &AnalysisConfig) -> Self {
        HypothesisTester {
            group_a: config.group_a.clone(),
            group_b: config.group_b.clone(),
            mean_column: NumericColumn::Volume,
            proportion_column: NumericColumn::Expenditure,
            proportion_threshold: config.proportion_threshold,
            reference_proportion: config.reference_proportion,
            significance: config.significance,
            iqr_multiplier: config.iqr_multiplier,
        }
    }

    pub fn mean_difference(&self, dataset: &Dataset) -> Result<MeanDifferenceReport, AnalysisError> {
        let a = subgroup_values(dataset, &self.group_a, self.mean_column);
        let b = subgroup_values(dataset, &self.group_b, self.mean_column);
        let test = welch_t_test(&a, &b)?;
        Ok(MeanDifferenceReport {
            column: self.mean_column,
            group_a: GroupStats::of(&self.group_a, &a, self.iqr_multiplier)?,
            group_b: GroupStats::of(&self.group_b, &b, self.iqr_multiplier)?,
            decision: Decision::at(test.p_value, self.significance),
            test,
        })
    }

    pub fn proportion(&self, dataset: &Dataset) -> Result<ProportionTest, AnalysisError> {
        proportion_z_test(
            self.proportion_column,
            &dataset.column(self.proportion_column),
            self.proportion_threshold,
            self.reference_proportion,
            self.significance,
        )
    }
}

impl Analysis for HypothesisTester {
    type Report = HypothesisReport;

    fn run(&self, dataset: &Dataset) -> Result<HypothesisReport, AnalysisError> {
        let mean_difference = self.mean_difference(dataset);
        let proportion = self.proportion(dataset);

        match &mean_difference {
            Ok(r) => log::debug!(
                "Welch {} vs {}: t = {:.3}, p = {:.3e}",
                self.group_a,
                self.group_b,
                r.test.t,
                r.test.p_value
            ),
            Err(e) => log::warn!("Mean-difference test skipped: {e}"),
        }
        match &proportion {
            Ok(r) => log::debug!("Proportion {:.4}: z = {:.3}, p = {:.3e}", r.proportion, r.z, r.p_value),
            Err(e) => log::warn!("Proportion test skipped: {e}"),
        }

        Ok(HypothesisReport {
            mean_difference,
            proportion,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::data::{CleaningStats, Record};

    fn record(product: &str, volume: f64, expenditure: f64) -> Record {
        Record {
            year: 2022,
            product: product.into(),
            operation: "EXPORTAÇÃO".into(),
            volume,
            expenditure,
            extra: Vec::new(),
        }
    }

    fn dataset(gasoline: &[f64], diesel: &[f64]) -> Dataset {
        let records = gasoline
            .iter()
            .map(|&v| record("GASOLINA A", v, 1.0))
            .chain(diesel.iter().map(|&v| record("ÓLEO DIESEL", v, 1.0)))
            .collect();
        Dataset::new(records, Vec::new(), CleaningStats::default())
    }

    fn tester() -> HypothesisTester {
        HypothesisTester::new(&AnalysisConfig::default())
    }

    #[test]
    fn identical_groups_fail_to_reject() {
        let values = [10.0, 12.0, 9.0, 11.0, 13.0, 8.0];
        let report = tester().mean_difference(&dataset(&values, &values)).unwrap();
        assert_abs_diff_eq!(report.test.t, 0.0);
        assert!(report.test.p_value > 0.05);
        assert_eq!(report.decision, Decision::FailToReject);
        assert_eq!(report.group_a.count, 6);
    }

    #[test]
    fn separated_groups_reject() {
        let a = [10.0, 12.0, 9.0, 11.0, 13.0, 8.0];
        // Shifted by far more than ten standard deviations.
        let b: Vec<f64> = a.iter().map(|v| v + 100.0).collect();
        let report = tester().mean_difference(&dataset(&a, &b)).unwrap();
        assert!(report.test.t < 0.0);
        assert!(report.test.p_value < 0.05);
        assert_eq!(report.decision, Decision::Reject);
        assert_eq!(report.decision.to_string(), "Reject H0");
    }

    #[test]
    fn welch_matches_reference_values() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let test = welch_t_test(&a, &b).unwrap();
        assert_abs_diff_eq!(test.t, -2.3763541031440183, epsilon = 1e-9);
        assert_abs_diff_eq!(test.df, 6.9722557297949335, epsilon = 1e-9);
        assert_abs_diff_eq!(test.p_value, 0.049284, epsilon = 1e-4);
    }

    #[test]
    fn far_apart_groups_keep_a_positive_p_value() {
        let a: Vec<f64> = (0..30).map(|i| 10.0 + (i % 5) as f64).collect();
        let b: Vec<f64> = a.iter().map(|v| v + 90.0).collect();
        let test = welch_t_test(&a, &b).unwrap();
        assert!(test.t < -200.0);
        assert!(test.p_value > 0.0, "p underflowed to {}", test.p_value);
        assert!(test.p_value < 1e-50);
    }

    #[test]
    fn extreme_proportion_keeps_a_positive_p_value() {
        let values = vec![600_000.0; 10_000];
        let test =
            proportion_z_test(NumericColumn::Expenditure, &values, 500_000.0, 0.9, 0.05).unwrap();
        assert!(test.p_value > 0.0);
        assert_eq!(test.decision, Decision::Reject);
    }

    #[test]
    fn small_subgroup_is_insufficient() {
        let err = tester()
            .mean_difference(&dataset(&[1.0], &[1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { needed: 2, got: 1, .. }
        ));
    }

    #[test]
    fn half_above_threshold_gives_z_zero() {
        let values = [1_000_000.0, 10.0, 600_000.0, 20.0];
        let test =
            proportion_z_test(NumericColumn::Expenditure, &values, 500_000.0, 0.5, 0.05).unwrap();
        assert_eq!(test.successes, 2);
        assert_abs_diff_eq!(test.z, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(test.p_value, 1.0, epsilon = 1e-9);
        assert_eq!(test.decision, Decision::FailToReject);
    }

    #[test]
    fn lopsided_proportion_rejects() {
        let values = vec![600_000.0; 90]
            .into_iter()
            .chain(vec![1.0; 10])
            .collect::<Vec<_>>();
        let test =
            proportion_z_test(NumericColumn::Expenditure, &values, 500_000.0, 0.5, 0.05).unwrap();
        assert_abs_diff_eq!(test.proportion, 0.9);
        assert_abs_diff_eq!(test.z, 8.0, epsilon = 1e-9);
        assert_eq!(test.decision, Decision::Reject);
    }

    #[test]
    fn one_failing_sub_test_keeps_the_other() {
        let ds = dataset(&[1.0, 2.0, 3.0], &[]);
        let report = tester().run(&ds).unwrap();
        assert!(report.mean_difference.is_err());
        assert!(report.proportion.is_ok());
    }
}
