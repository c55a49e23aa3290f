use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::EmployeeTable;
use crate::data::stats::ColumnSummary;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Record table
// ---------------------------------------------------------------------------

/// Show the given rows of `table`, index column first.
pub fn records_table(ui: &mut Ui, id: &str, table: &EmployeeTable, rows: &[usize]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(260.0)
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(70.0), table.column_names.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for name in &table.column_names {
                    header.col(|ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let idx = rows[row.index()];
                    let record = &table.records[idx];
                    row.col(|ui| {
                        ui.label(RichText::new(idx.to_string()).weak());
                    });
                    for name in &table.column_names {
                        row.col(|ui| {
                            ui.label(record.value(name).to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Statistics table
// ---------------------------------------------------------------------------

/// Statistic labels as rows, numeric columns as columns.
pub fn statistics_table(ui: &mut Ui, summaries: &[ColumnSummary]) {
    if summaries.is_empty() {
        ui.label("No numeric columns to summarise.");
        return;
    }

    ui.push_id("statistics", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(50.0))
            .columns(Column::auto().at_least(90.0), summaries.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui| {
                    ui.strong("");
                });
                for s in summaries {
                    header.col(|ui| {
                        ui.strong(s.column.as_str());
                    });
                }
            })
            .body(|mut body| {
                for (stat, label) in ColumnSummary::LABELS.iter().enumerate() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.strong(*label);
                        });
                        for s in summaries {
                            row.col(|ui| {
                                ui.label(format_stat(s.values()[stat]));
                            });
                        }
                    });
                }
            });
    });
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}
