use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, Ui};
use egui_extras::{Column, TableBuilder};

use crate::pivot::builder::{build_pivot, PivotOutcome};
use crate::pivot::table::PivotTable;
use crate::render::html;
use crate::state::SessionState;

// ---------------------------------------------------------------------------
// Central panel – the pivot result
// ---------------------------------------------------------------------------

/// Render the central panel. The pivot is recomputed from the immutable
/// dataset on every pass; which branch renders follows the builder outcome.
pub fn pivot_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading("Pivot table");
    ui.add_space(4.0);

    if !state.pivot.is_ready() {
        ui.label("Pick at least one row column, one pivot column and a value column.");
        return;
    }

    match build_pivot(&state.dataset, &state.visible_indices, &state.pivot) {
        Ok(PivotOutcome::EmptyInput) => {
            ui.colored_label(
                Color32::YELLOW,
                "The filtered dataset is empty. Adjust the filters.",
            );
        }
        Err(e) => {
            ui.colored_label(Color32::RED, format!("Pivot failed: {e}"));
        }
        Ok(PivotOutcome::Table(table)) => {
            show_table(ui, &table);
            ui.add_space(8.0);
            if ui.button("Download HTML table").clicked() {
                export_html(state, &table);
            }
        }
    }
}

/// Striped, bounded-height table with one label column per row field and
/// one data column per column key.
fn show_table(ui: &mut Ui, table: &PivotTable) {
    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;
    let n_label_cols = table.row_fields.len();

    let mut builder = TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .max_scroll_height(450.0);
    for _ in 0..(n_label_cols + table.n_cols()) {
        builder = builder.column(Column::auto().at_least(60.0));
    }

    builder
        .header(24.0, |mut header| {
            for field in &table.row_fields {
                header.col(|ui| {
                    ui.strong(field);
                });
            }
            for c in 0..table.n_cols() {
                // Stack the multi-level column key into one header cell.
                let label = table.col_label_joined(c, "\n");
                header.col(|ui| {
                    ui.strong(label);
                });
            }
        })
        .body(|body| {
            body.rows(row_height, table.n_rows(), |mut row| {
                let r = row.index();
                for level in 0..n_label_cols {
                    row.col(|ui| {
                        ui.label(table.row_label(r, level));
                    });
                }
                for c in 0..table.n_cols() {
                    row.col(|ui| {
                        ui.label(table.value_label(r, c));
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// HTML download
// ---------------------------------------------------------------------------

/// Save dialog pre-filled with the fixed export name; the written bytes are
/// exactly the rendered fragment.
fn export_html(state: &mut SessionState, table: &PivotTable) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save pivot table")
        .set_file_name(html::EXPORT_FILE_NAME)
        .add_filter("HTML", &["html"])
        .save_file()
    else {
        return;
    };

    match write_export(&path, table) {
        Ok(()) => {
            log::info!("Wrote pivot table to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("HTML export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_export(path: &Path, table: &PivotTable) -> anyhow::Result<()> {
    std::fs::write(path, html::to_html(table))
        .with_context(|| format!("writing {}", path.display()))
}
