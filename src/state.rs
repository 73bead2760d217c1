use std::path::Path;

use anyhow::{Context, Result};
use petro_explorer::analysis::{run_stage, Stage, StageReport};
use petro_explorer::config::{Config, Subgroup};
use petro_explorer::data::{load_file, Dataset, LoadOptions};
use petro_explorer::error::AnalysisError;

use crate::color::ProductColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which subgroup slot of the mean-difference test is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSlot {
    A,
    B,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Cleaned dataset; `None` until a load succeeds.
    pub dataset: Option<Dataset>,

    /// Why the dataset could not be loaded. Blocks every stage.
    pub load_error: Option<String>,

    pub stage: Stage,

    /// Outcome of the last run of `stage`; recomputed only on changes.
    pub report: Option<Result<StageReport, AnalysisError>>,

    /// Distinct values offered by the subgroup pickers.
    pub products: Vec<String>,
    pub operations: Vec<String>,

    pub product_colors: ProductColors,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// State for `config`, with its data file loaded.
    pub fn new(config: Config) -> Self {
        let path = config.data_path.clone();
        let mut state = Self::empty(config);
        if let Err(e) = state.load(&path) {
            log::error!("{e:#}");
            state.load_error = Some(format!("{e:#}"));
        }
        state
    }

    /// State whose startup failed before any load was attempted.
    pub fn failed(config: Config, message: String) -> Self {
        let mut state = Self::empty(config);
        state.load_error = Some(message);
        state
    }

    fn empty(config: Config) -> Self {
        Self {
            config,
            dataset: None,
            load_error: None,
            stage: Stage::default(),
            report: None,
            products: Vec::new(),
            operations: Vec::new(),
            product_colors: ProductColors::default(),
            status_message: None,
        }
    }

    /// Load and clean `path`. On failure the current dataset is kept.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let options = LoadOptions::for_path(&self.config, path)?;
        let dataset =
            load_file(path, &options).with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "Loaded {} records from {} ({} raw rows)",
            dataset.len(),
            path.display(),
            dataset.cleaning.raw_rows
        );
        self.config.data_path = path.to_path_buf();
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a newly loaded dataset and rerun the current stage.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.products = dataset.products().into_iter().collect();
        self.operations = dataset.operations().into_iter().collect();
        self.product_colors = ProductColors::new(&self.products);
        self.dataset = Some(dataset);
        self.load_error = None;
        self.status_message = None;
        self.refresh();
    }

    pub fn select_stage(&mut self, stage: Stage) {
        if stage != self.stage || self.report.is_none() {
            self.stage = stage;
            self.refresh();
        }
    }

    pub fn group(&self, slot: GroupSlot) -> &Subgroup {
        match slot {
            GroupSlot::A => &self.config.analysis.group_a,
            GroupSlot::B => &self.config.analysis.group_b,
        }
    }

    pub fn set_group(&mut self, slot: GroupSlot, group: Subgroup) {
        if *self.group(slot) == group {
            return;
        }
        match slot {
            GroupSlot::A => self.config.analysis.group_a = group,
            GroupSlot::B => self.config.analysis.group_b = group,
        }
        if self.stage == Stage::HypothesisTests {
            self.refresh();
        }
    }

    /// Rerun the selected stage against the dataset.
    pub fn refresh(&mut self) {
        self.report = self.dataset.as_ref().map(|ds| {
            let result = run_stage(self.stage, ds, &self.config.analysis);
            if let Err(e) = &result {
                log::warn!("{} failed: {e}", self.stage);
            }
            result
        });
    }

    /// The current report as pretty JSON.
    pub fn report_json(&self) -> Option<Result<String>> {
        match &self.report {
            Some(Ok(report)) => {
                Some(serde_json::to_string_pretty(report).context("serializing report"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petro_explorer::data::{load_reader, LoadOptions};

    fn dataset() -> Dataset {
        let text = "ANO;PRODUTO;OPERAÇÃO COMERCIAL;IMPORTADO / EXPORTADO;DISPÊNDIO / RECEITA\n\
                    2020;GASOLINA A;EXPORTAÇÃO;10,5;600000\n\
                    2021;GASOLINA A;EXPORTAÇÃO;12,0;100\n\
                    2020;ÓLEO DIESEL;EXPORTAÇÃO;30,0;700000\n\
                    2021;ÓLEO DIESEL;EXPORTAÇÃO;31,5;200\n";
        load_reader(text.as_bytes(), &LoadOptions::default()).unwrap()
    }

    fn state() -> AppState {
        let mut state = AppState::empty(Config::default());
        state.set_dataset(dataset());
        state
    }

    #[test]
    fn set_dataset_runs_first_stage() {
        let state = state();
        assert_eq!(state.products, vec!["GASOLINA A", "ÓLEO DIESEL"]);
        assert!(matches!(state.report, Some(Ok(StageReport::Cleaning(_)))));
        assert!(state.report_json().is_some());
    }

    #[test]
    fn stage_error_is_scoped() {
        let mut state = state();
        state.select_stage(Stage::ConfidenceInterval);
        assert!(matches!(state.report, Some(Err(_))));
        assert!(state.dataset.is_some());
        assert!(state.load_error.is_none());

        state.select_stage(Stage::Quartiles);
        assert!(matches!(state.report, Some(Ok(StageReport::Quartiles(_)))));
    }

    #[test]
    fn missing_file_keeps_state_usable() {
        let mut state = state();
        let err = state.load(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("loading /nonexistent/data.csv"));
        assert!(state.dataset.is_some());
    }

    #[test]
    fn changing_a_group_reruns_hypothesis_stage() {
        let mut state = state();
        state.select_stage(Stage::HypothesisTests);
        state.set_group(GroupSlot::B, Subgroup::new("GASOLINA A", "EXPORTAÇÃO"));
        let Some(Ok(StageReport::HypothesisTests(report))) = &state.report else {
            panic!("expected hypothesis report");
        };
        let md = report.mean_difference.as_ref().unwrap();
        assert_eq!(md.test.t, 0.0);
    }
}
