//! Analysis layer: one independent, stateless handler per dashboard stage.
//!
//! ```text
//!   Stage ──run_stage──▶ handler.run(&Dataset) ──▶ StageReport
//!     Cleaning             Summary
//!     Quartiles            OutlierDetector
//!     ZScore               ZScoreAnalyzer
//!     ConfidenceInterval   IntervalEstimator
//!     HypothesisTests      HypothesisTester
//! ```
//!
//! Handlers only borrow the dataset; derived columns, subgroups and samples
//! live inside a single `run` call.

pub mod hypothesis;
pub mod interval;
pub mod outliers;
pub mod stats;
pub mod summary;
pub mod zscore;

use std::fmt;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::Dataset;
use crate::error::AnalysisError;

use self::hypothesis::{HypothesisReport, HypothesisTester};
use self::interval::{IntervalEstimator, IntervalReport};
use self::outliers::{OutlierDetector, OutlierReport};
use self::summary::{Summary, SummaryReport};
use self::zscore::{ZScoreAnalyzer, ZScoreReport};

// ---------------------------------------------------------------------------
// Stage selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Stage {
    #[default]
    Cleaning,
    Quartiles,
    ZScore,
    ConfidenceInterval,
    HypothesisTests,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Cleaning,
        Stage::Quartiles,
        Stage::ZScore,
        Stage::ConfidenceInterval,
        Stage::HypothesisTests,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Cleaning => "1. Limpeza",
            Stage::Quartiles => "2. Quartis e Outliers",
            Stage::ZScore => "3. Z-score",
            Stage::ConfidenceInterval => "4. Intervalo de Confiança",
            Stage::HypothesisTests => "5. Testes de Hipótese",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Handler capability + result bundle
// ---------------------------------------------------------------------------

/// A stage handler: reads the dataset, produces a report.
pub trait Analysis {
    type Report: Into<StageReport>;

    fn run(&self, dataset: &Dataset) -> Result<Self::Report, AnalysisError>;
}

/// What one stage hands to the dashboard for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage")]
pub enum StageReport {
    Cleaning(SummaryReport),
    Quartiles(OutlierReport),
    ZScore(ZScoreReport),
    ConfidenceInterval(IntervalReport),
    HypothesisTests(HypothesisReport),
}

impl StageReport {
    pub fn stage(&self) -> Stage {
        match self {
            StageReport::Cleaning(_) => Stage::Cleaning,
            StageReport::Quartiles(_) => Stage::Quartiles,
            StageReport::ZScore(_) => Stage::ZScore,
            StageReport::ConfidenceInterval(_) => Stage::ConfidenceInterval,
            StageReport::HypothesisTests(_) => Stage::HypothesisTests,
        }
    }
}

macro_rules! impl_into_report {
    ($($report:ty => $variant:ident),* $(,)?) => {
        $(impl From<$report> for StageReport {
            fn from(r: $report) -> Self {
                StageReport::$variant(r)
            }
        })*
    };
}

impl_into_report! {
    SummaryReport => Cleaning,
    OutlierReport => Quartiles,
    ZScoreReport => ZScore,
    IntervalReport => ConfidenceInterval,
    HypothesisReport => HypothesisTests,
}

fn produce<A: Analysis>(handler: &A, dataset: &Dataset) -> Result<StageReport, AnalysisError> {
    handler.run(dataset).map(Into::into)
}

/// Run the handler for `stage` against `dataset`.
pub fn run_stage(
    stage: Stage,
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> Result<StageReport, AnalysisError> {
    log::debug!("Running stage {stage}");
    match stage {
        Stage::Cleaning => produce(&Summary, dataset),
        Stage::Quartiles => produce(&OutlierDetector::new(config), dataset),
        Stage::ZScore => produce(&ZScoreAnalyzer::new(config), dataset),
        Stage::ConfidenceInterval => produce(&IntervalEstimator::new(config), dataset),
        Stage::HypothesisTests => produce(&HypothesisTester::new(config), dataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_reader, LoadOptions};

    fn sample_dataset(rows: usize) -> Dataset {
        let mut text = String::from(
            "ANO;PRODUTO;OPERAÇÃO COMERCIAL;IMPORTADO / EXPORTADO;DISPÊNDIO / RECEITA\n",
        );
        for i in 0..rows {
            let product = if i % 2 == 0 { "GASOLINA A" } else { "ÓLEO DIESEL" };
            let volume = format!("{},{}", 100 + (i * 37) % 900, i % 10);
            let expenditure = (i * 7919) % 1_000_000;
            text.push_str(&format!(
                "{};{product};EXPORTAÇÃO;{volume};{expenditure}\n",
                2000 + i % 24
            ));
        }
        load_reader(text.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn every_stage_produces_its_own_report() {
        let ds = sample_dataset(400);
        let config = AnalysisConfig::default();
        for stage in Stage::ALL {
            let report = run_stage(stage, &ds, &config).unwrap();
            assert_eq!(report.stage(), stage);
        }
    }

    #[test]
    fn stage_failure_leaves_dataset_usable() {
        let ds = sample_dataset(50);
        let config = AnalysisConfig::default();
        let err = run_stage(Stage::ConfidenceInterval, &ds, &config).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { needed: 300, .. }));
        assert!(run_stage(Stage::Quartiles, &ds, &config).is_ok());
        assert_eq!(ds.len(), 50);
    }

    #[test]
    fn reports_serialize_with_stage_tag() {
        let ds = sample_dataset(20);
        let report = run_stage(Stage::Cleaning, &ds, &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "Cleaning");
        assert_eq!(json["records"], 20);
    }

    #[test]
    fn labels_follow_stage_order() {
        let labels: Vec<_> = Stage::ALL.iter().map(|s| s.label()).collect();
        assert!(labels.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(labels[0], "1. Limpeza");
        assert_eq!(labels[4], "5. Testes de Hipótese");
    }
}
