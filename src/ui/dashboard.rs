use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::search::SearchOutcome;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

const TITLE: &str = "Employee Performance Analysis and HR Dashboard";
const OVERVIEW_ROWS: usize = 5;
const CONCLUSION: &str = "This dashboard provides insights into employee performance and HR \
metrics. You can filter data by department, education level, and other factors to focus on \
specific groups.";

// ---------------------------------------------------------------------------
// Central panel – the report page
// ---------------------------------------------------------------------------

/// Render the scrolling dashboard page.
pub fn central_page(ui: &mut Ui, state: &AppState) {
    let Some(data) = &state.table else {
        placeholder(ui, state);
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new(TITLE).size(24.0));
            ui.add_space(8.0);

            ui.heading("Data Overview");
            let head: Vec<usize> = (0..data.len().min(OVERVIEW_ROWS)).collect();
            table::records_table(ui, "overview", data, &head);

            ui.add_space(12.0);
            ui.heading(format!(
                "Filtered Data - {} with Education {}",
                state.selection.department, state.selection.education
            ));
            if state.visible_indices.is_empty() {
                ui.label("No employees match the current selection.");
            } else {
                table::records_table(ui, "filtered", data, &state.visible_indices);
            }

            match &state.search {
                SearchOutcome::Idle => {}
                SearchOutcome::Found(rows) => {
                    ui.add_space(12.0);
                    ui.heading(format!("Search Results for '{}'", state.search_query.trim()));
                    table::records_table(ui, "search", data, rows);
                }
                SearchOutcome::NotFound(_) => {
                    ui.add_space(12.0);
                    if let Some(msg) = state.search.message() {
                        ui.label(RichText::new(msg).color(Color32::YELLOW));
                    }
                }
            }

            ui.add_space(12.0);
            ui.heading("Visualizations");
            plot::visualizations(ui, &state.charts);

            ui.add_space(12.0);
            ui.heading("Key Statistics");
            table::statistics_table(ui, &state.statistics);

            ui.add_space(12.0);
            ui.heading("Conclusion");
            ui.label(CONCLUSION);
        });
}

/// Shown until a table is available: spinner while loading, else the error.
fn placeholder(ui: &mut Ui, state: &AppState) {
    ui.centered_and_justified(|ui: &mut Ui| {
        if state.loading {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.add(egui::Spinner::new().size(32.0));
                ui.label(format!("Loading employee data from {}…", state.source));
            });
        } else if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        } else {
            ui.heading(empty_hint());
        }
    });
}

/// Points the user at the File menu entry that opens a table.
fn empty_hint() -> String {
    format!("Open a file to view employees  (File → {})", panels::MENU_OPEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hint_names_the_open_menu_entry() {
        assert_eq!(
            empty_hint(),
            "Open a file to view employees  (File → Open local file…)"
        );
        assert_eq!(panels::MENU_RELOAD, "Reload from source");
    }
}
