use eframe::egui::{self, Color32, RichText, Ui};
use petro_explorer::analysis::Stage;
use petro_explorer::config::Subgroup;

use crate::state::{AppState, GroupSlot};

// ---------------------------------------------------------------------------
// Left side panel – stage selector
// ---------------------------------------------------------------------------

/// Render the left stage panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("ANP study");
    ui.separator();

    ui.strong("Select the stage:");
    let mut selected = state.stage;
    for stage in Stage::ALL {
        ui.radio_value(&mut selected, stage, stage.label());
    }
    state.select_stage(selected);

    if state.stage == Stage::HypothesisTests && state.dataset.is_some() {
        ui.add_space(12.0);
        ui.separator();
        ui.strong("Compared subgroups");
        group_picker(ui, state, GroupSlot::A, "Group A");
        group_picker(ui, state, GroupSlot::B, "Group B");
    }
}

/// Product + operation combo boxes for one subgroup slot.
fn group_picker(ui: &mut Ui, state: &mut AppState, slot: GroupSlot, title: &str) {
    let mut group: Subgroup = state.group(slot).clone();

    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let color = state.product_colors.color_for(&group.product);
            egui::ComboBox::from_id_salt((title, "product"))
                .selected_text(RichText::new(&group.product).color(color))
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for product in &state.products {
                        let text = RichText::new(product)
                            .color(state.product_colors.color_for(product));
                        ui.selectable_value(&mut group.product, product.clone(), text);
                    }
                });
            egui::ComboBox::from_id_salt((title, "operation"))
                .selected_text(&group.operation)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for operation in &state.operations {
                        ui.selectable_value(&mut group.operation, operation.clone(), operation);
                    }
                });
        });

    state.set_group(slot, group);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} valid records from {}",
                ds.len(),
                state.config.data_path.display()
            ));
            ui.separator();
        }

        let has_report = matches!(state.report, Some(Ok(_)));
        if ui
            .add_enabled(has_report, egui::Button::new("Copy JSON"))
            .on_hover_text("Copy the current stage's results to the clipboard")
            .clicked()
        {
            copy_report(ui, state);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn copy_report(ui: &Ui, state: &mut AppState) {
    match state.report_json() {
        Some(Ok(json)) => {
            ui.ctx().copy_text(json);
            state.status_message = None;
        }
        Some(Err(e)) => {
            log::error!("{e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open import/export records")
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
