use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use petro_explorer::analysis::hypothesis::{HypothesisReport, MeanDifferenceReport, ProportionTest};
use petro_explorer::analysis::interval::IntervalReport;
use petro_explorer::analysis::outliers::OutlierReport;
use petro_explorer::analysis::summary::SummaryReport;
use petro_explorer::analysis::zscore::ZScoreReport;
use petro_explorer::analysis::StageReport;
use petro_explorer::error::AnalysisError;

use crate::color::ProductColors;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – current stage
// ---------------------------------------------------------------------------

pub fn stage_view(ui: &mut Ui, state: &AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Dataset could not be loaded:\n{err}"))
                    .color(Color32::RED)
                    .heading(),
            );
        });
        return;
    }

    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to start  (File → Open…)");
        });
        return;
    };

    ui.heading(format!("Stage {}", state.stage));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match report {
            Ok(StageReport::Cleaning(r)) => cleaning(ui, r),
            Ok(StageReport::Quartiles(r)) => quartiles(ui, r),
            Ok(StageReport::ZScore(r)) => zscore(ui, r),
            Ok(StageReport::ConfidenceInterval(r)) => interval(ui, r),
            Ok(StageReport::HypothesisTests(r)) => hypothesis(ui, r, &state.product_colors),
            Err(e) => stage_error(ui, e),
        });
}

fn stage_error(ui: &mut Ui, err: &AnalysisError) {
    ui.label(RichText::new(format!("This stage could not be computed: {err}")).color(Color32::RED));
}

// ---------------------------------------------------------------------------
// 1. Cleaning
// ---------------------------------------------------------------------------

fn cleaning(ui: &mut Ui, r: &SummaryReport) {
    let c = &r.cleaning;
    ui.label(format!("Rows read: {}", c.raw_rows));
    ui.label(format!("• {} duplicate rows removed", c.duplicates_removed));
    ui.label(format!("• {} rows with missing values removed", c.incomplete_removed));
    ui.label(format!("• {} rows with zero or negative volume removed", c.non_positive_removed));
    ui.label("• Volume converted from comma-decimal text to float");
    ui.add_space(8.0);

    ui.strong(format!("Valid records: {}", r.records));
    ui.label(format!("Period: {} to {}", r.first_year, r.last_year));
    ui.add_space(8.0);

    let headers = ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(80.0), headers.len() - 1)
        .header(20.0, |mut header| {
            for h in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for s in &r.columns {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(s.column.label());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(s.count.to_string());
                    });
                    for v in [s.mean, s.std_dev, s.min, s.q1, s.median, s.q3, s.max] {
                        row.col(|ui: &mut Ui| {
                            ui.monospace(format!("{v:.2}"));
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// 2. Quartiles and outliers
// ---------------------------------------------------------------------------

fn quartiles(ui: &mut Ui, r: &OutlierReport) {
    let q = &r.quartiles;
    ui.label(format!(
        "Q1: {:.2}, Q2 (median): {:.2}, Q3: {:.2}, IQR: {:.2}",
        q.q1, q.q2, q.q3, r.iqr
    ));
    ui.label(format!(
        "Outliers (above Q3 + 1.5×IQR = {:.2}): {}",
        r.upper_fence, r.outlier_count
    ));
    ui.add_space(8.0);

    let boxes = [(r.column.to_string(), &r.box_plot, Color32::LIGHT_BLUE)];
    plot::box_plots(ui, "volume_box_plot", r.column.label(), &boxes);
}

// ---------------------------------------------------------------------------
// 3. Z-score
// ---------------------------------------------------------------------------

fn zscore(ui: &mut Ui, r: &ZScoreReport) {
    ui.label(format!("Values with Z > {}: {}", r.threshold, r.above_threshold));
    ui.label(format!(
        "Probability Z > {}: {:.2}%",
        r.tail_z,
        r.tail_probability * 100.0
    ));
    ui.add_space(8.0);
    plot::zscore_histogram(ui, r);
}

// ---------------------------------------------------------------------------
// 4. Confidence interval
// ---------------------------------------------------------------------------

fn interval(ui: &mut Ui, r: &IntervalReport) {
    ui.label(format!(
        "Random sample of {} rows (seed {}), z = {}",
        r.sample_size, r.seed, r.z_critical
    ));
    ui.add_space(4.0);
    for e in &r.estimates {
        ui.label(format!(
            "{}: {:.2} ± {:.2}   [{:.2}, {:.2}]",
            e.column,
            e.mean,
            e.margin,
            e.lower(),
            e.upper()
        ));
    }
}

// ---------------------------------------------------------------------------
// 5. Hypothesis tests
// ---------------------------------------------------------------------------

fn hypothesis(ui: &mut Ui, r: &HypothesisReport, colors: &ProductColors) {
    match &r.mean_difference {
        Ok(md) => mean_difference(ui, md, colors),
        Err(e) => {
            ui.strong("Hypothesis 1 - mean volume");
            stage_error(ui, e);
        }
    }

    ui.separator();

    match &r.proportion {
        Ok(p) => proportion(ui, p),
        Err(e) => {
            ui.strong("Hypothesis 2 - proportion");
            stage_error(ui, e);
        }
    }
}

fn mean_difference(ui: &mut Ui, md: &MeanDifferenceReport, colors: &ProductColors) {
    let (a, b) = (&md.group_a, &md.group_b);
    ui.strong(format!("Hypothesis 1 - {}: {} x {}", md.column, a.group, b.group));
    ui.label(format!(
        "n = {} / {}, mean = {:.2} / {:.2}",
        a.count, b.count, a.mean, b.mean
    ));
    ui.label(format!(
        "t = {:.2}, df = {:.1}, p = {:.4e}",
        md.test.t, md.test.df, md.test.p_value
    ));
    decision(ui, &md.decision.to_string());
    ui.add_space(8.0);

    let boxes = [
        (a.group.to_string(), &a.box_plot, colors.color_for(&a.group.product)),
        (b.group.to_string(), &b.box_plot, colors.color_for(&b.group.product)),
    ];
    plot::box_plots(ui, "subgroup_box_plot", md.column.label(), &boxes);
}

fn proportion(ui: &mut Ui, p: &ProportionTest) {
    ui.strong(format!(
        "Hypothesis 2 - share of {} > {:.0} vs {}",
        p.column, p.threshold, p.reference
    ));
    ui.label(format!(
        "Observed proportion: {:.2}% ({} of {})",
        p.proportion * 100.0,
        p.successes,
        p.n
    ));
    ui.label(format!("z = {:.2}, p = {:.4e}", p.z, p.p_value));
    decision(ui, &p.decision.to_string());
}

fn decision(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(format!("Result: {text}")).strong());
}
