use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CellValue;
use crate::pivot::spec::Aggregation;
use crate::state::SessionState;

// ---------------------------------------------------------------------------
// Left side panel – filter and pivot widgets
// ---------------------------------------------------------------------------

/// Render the left panel: the cascading year/format filters followed by
/// the pivot configuration.
pub fn side_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            year_filter(ui, state);
            format_filter(ui, state);

            ui.separator();
            ui.heading("Pivot");
            ui.add_space(4.0);

            field_picker(ui, state, "Row columns", PickerTarget::RowFields);
            field_picker(ui, state, "Pivot columns", PickerTarget::ColFields);
            value_picker(ui, state);
            aggregation_picker(ui, state);
        });
}

/// Year multiselect (checkbox list over the unique year values).
fn year_filter(ui: &mut Ui, state: &mut SessionState) {
    let options = state.year_options();
    let header = format!("Year  ({}/{})", state.selected_years.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("year_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for val in &options {
                let mut checked = state.selected_years.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    state.toggle_year(val);
                }
            }
        });
}

/// Format multiselect. The option list is derived from the rows matching
/// the selected years; with no year chosen it is empty. A format selected
/// earlier but absent from the current options stays listed so the user
/// can still deselect it.
fn format_filter(ui: &mut Ui, state: &mut SessionState) {
    let options = state.format_options();
    let mut listed: Vec<CellValue> = options.clone();
    for val in &state.selected_formats {
        if !listed.contains(val) {
            listed.push(val.clone());
        }
    }

    let header = format!(
        "Format  ({}/{})",
        state.selected_formats.len(),
        options.len()
    );

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("format_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if listed.is_empty() {
                ui.label("Pick a year to see the available formats.");
                return;
            }
            for val in &listed {
                let mut checked = state.selected_formats.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    state.toggle_format(val);
                }
            }
        });
}

#[derive(Clone, Copy)]
enum PickerTarget {
    RowFields,
    ColFields,
}

/// Multiselect over every dataset column for the row/column grouping lists.
fn field_picker(ui: &mut Ui, state: &mut SessionState, title: &str, target: PickerTarget) {
    let columns = state.dataset.column_names.clone();
    let selected: Vec<String> = match target {
        PickerTarget::RowFields => state.pivot.row_fields.iter().map(|c| c.name.clone()).collect(),
        PickerTarget::ColFields => state.pivot.col_fields.iter().map(|c| c.name.clone()).collect(),
    };

    let header = format!("{title}  ({}/{})", selected.len(), columns.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let mut checked = selected.contains(col);
                if ui.checkbox(&mut checked, col).changed() {
                    match target {
                        PickerTarget::RowFields => state.toggle_row_field(col),
                        PickerTarget::ColFields => state.toggle_col_field(col),
                    }
                }
            }
        });
}

/// Single-select for the aggregated value column.
fn value_picker(ui: &mut Ui, state: &mut SessionState) {
    let columns = state.dataset.column_names.clone();
    let current = state
        .pivot
        .value_field
        .as_ref()
        .map(|c| c.name.clone())
        .unwrap_or_default();

    ui.strong("Value column");
    egui::ComboBox::from_id_salt("value_col")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(current == *col, col).clicked() {
                    state.set_value_field(col);
                }
            }
        });
    ui.add_space(4.0);
}

/// Single-select for the aggregation function ("count" is the only entry).
fn aggregation_picker(ui: &mut Ui, state: &mut SessionState) {
    let current = state.pivot.aggregation;

    ui.strong("Aggregation");
    egui::ComboBox::from_id_salt("agg_fn")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for agg in Aggregation::ALL {
                if ui
                    .selectable_label(current == *agg, agg.to_string())
                    .clicked()
                {
                    state.set_aggregation(*agg);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &mut SessionState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "{} rows loaded, {} match the filters",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
