use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, LineStyle, Plot, PlotPoints, Points,
};
use petro_explorer::analysis::outliers::BoxPlotData;
use petro_explorer::analysis::zscore::ZScoreReport;

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Box plots (quartile stage, hypothesis stage)
// ---------------------------------------------------------------------------

/// One box per entry, side by side, with the points beyond the whiskers.
pub fn box_plots(ui: &mut Ui, id: &str, y_label: &str, boxes: &[(String, &BoxPlotData, Color32)]) {
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, (name, data, color)) in boxes.iter().enumerate() {
                let x = i as f64;
                let spread = BoxSpread::new(
                    data.lower_whisker,
                    data.q1,
                    data.median,
                    data.q3,
                    data.upper_whisker,
                );
                let elem = BoxElem::new(x, spread)
                    .name(name)
                    .box_width(0.5)
                    .whisker_width(0.3)
                    .fill(color.linear_multiply(0.25))
                    .stroke(Stroke::new(1.5, *color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(name));

                let points: PlotPoints = data
                    .points_above
                    .iter()
                    .chain(&data.points_below)
                    .map(|&v| [x, v])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(format!("{name} outliers"))
                        .color(*color)
                        .radius(2.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Z-score histogram with the standard normal density
// ---------------------------------------------------------------------------

pub fn zscore_histogram(ui: &mut Ui, report: &ZScoreReport) {
    let bars: Vec<Bar> = report
        .histogram
        .iter()
        .map(|bin| Bar::new(bin.center(), bin.density).width(bin.width))
        .collect();
    let curve: PlotPoints = report.normal_curve.iter().copied().collect();

    Plot::new("zscore_histogram")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label("z")
        .y_axis_label("Density")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(format!("{} z-scores", report.column))
                    .color(Color32::LIGHT_BLUE),
            );
            plot_ui.line(
                Line::new(curve)
                    .name("Normal")
                    .color(Color32::RED)
                    .style(LineStyle::dashed_dense())
                    .width(1.5),
            );
        });
}
