use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::{self, Choice};
use crate::data::model::columns;
use crate::data::remote::DataSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter and search widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No data loaded.");
        return;
    };

    // Options are computed before any mutation of `state`.
    let departments = filter::options(table, columns::DEPARTMENT);
    let education_levels = filter::options(table, columns::EDUCATION);

    if let Some(choice) = choice_combo(
        ui,
        "Select Department",
        &state.selection.department,
        &departments,
    ) {
        state.set_department(choice);
    }
    if let Some(choice) = choice_combo(
        ui,
        "Select Education Level",
        &state.selection.education,
        &education_levels,
    ) {
        state.set_education(choice);
    }

    ui.add_space(8.0);
    let mut follow = state.charts_follow_filters;
    if ui.checkbox(&mut follow, "Charts follow filters").changed() {
        state.set_charts_follow_filters(follow);
    }
    let mut drop_missing = state.drop_missing;
    if ui
        .checkbox(&mut drop_missing, "Drop rows with missing values")
        .changed()
    {
        state.set_drop_missing(drop_missing);
    }

    ui.add_space(12.0);
    ui.heading("Search Employees");
    ui.separator();
    ui.label("Enter Employee ID");
    let mut query = state.search_query.clone();
    if ui.text_edit_singleline(&mut query).changed() {
        state.set_search_query(query);
    }
}

/// A labelled dropdown; returns the newly picked choice, if any.
fn choice_combo(ui: &mut Ui, label: &str, current: &Choice, options: &[Choice]) -> Option<Choice> {
    let mut picked = None;
    ui.strong(label);
    egui::ComboBox::from_id_salt(label)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui
                    .selectable_label(option == current, option.to_string())
                    .clicked()
                    && option != current
                {
                    picked = Some(option.clone());
                }
            }
        });
    ui.add_space(4.0);
    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

pub const MENU_OPEN: &str = "Open local file…";
pub const MENU_RELOAD: &str = "Reload from source";

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button(MENU_OPEN).clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.loading, egui::Button::new(MENU_RELOAD))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Source: {}", state.source));

        if let Some(table) = &state.table {
            ui.separator();
            ui.label(format!(
                "{} employees loaded, {} match filters",
                table.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open employee data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.start_load(DataSource::File(path));
    }
}
