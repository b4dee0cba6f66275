use crate::data::filter::{filtered_indices, format_options, year_options, FORMAT_COLUMN, YEAR_COLUMN};
use crate::data::model::{CellValue, Dataset};
use crate::pivot::spec::{Aggregation, PivotSpec};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Default row grouping.
const DEFAULT_ROW_FIELD: &str = "Cat. LOLF";

/// Default value column position in the source header.
const DEFAULT_VALUE_INDEX: usize = 3;

/// The full per-session state, independent of rendering. One instance owns
/// the immutable Dataset and every user selection; it is threaded through
/// the filter and pivot stages explicitly, never shared globally.
pub struct SessionState {
    /// Loaded dataset, immutable for the session lifetime.
    pub dataset: Dataset,

    /// Ordered year selection (first dropdown).
    pub selected_years: Vec<CellValue>,

    /// Ordered format selection (second, year-dependent dropdown).
    pub selected_formats: Vec<CellValue>,

    /// Pivot configuration.
    pub pivot: PivotSpec,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl SessionState {
    /// Start a session over a freshly loaded dataset with the default
    /// pivot configuration: rows by `Cat. LOLF`, columns by `Année` and
    /// `format_pdt`, value column at position 3, counting rows. Defaults
    /// missing from the schema are simply skipped.
    pub fn new(dataset: Dataset) -> Self {
        let mut pivot = PivotSpec::default();

        if let Some(col) = dataset.resolve_column(DEFAULT_ROW_FIELD) {
            pivot.row_fields.push(col);
        }
        for name in [YEAR_COLUMN, FORMAT_COLUMN] {
            if let Some(col) = dataset.resolve_column(name) {
                pivot.col_fields.push(col);
            }
        }
        pivot.value_field = dataset
            .column_names
            .get(DEFAULT_VALUE_INDEX)
            .and_then(|name| dataset.resolve_column(name));

        let visible_indices = (0..dataset.len()).collect();

        SessionState {
            dataset,
            selected_years: Vec::new(),
            selected_formats: Vec::new(),
            pivot,
            visible_indices,
            status_message: None,
        }
    }

    /// Recompute the cached filtered view after a selection change.
    pub fn refilter(&mut self) {
        self.visible_indices =
            filtered_indices(&self.dataset, &self.selected_years, &self.selected_formats);
    }

    /// Options for the year dropdown.
    pub fn year_options(&self) -> Vec<CellValue> {
        year_options(&self.dataset)
    }

    /// Options for the format dropdown, dependent on the year selection.
    pub fn format_options(&self) -> Vec<CellValue> {
        format_options(&self.dataset, &self.selected_years)
    }

    /// Toggle a year in the selection. An existing format selection is
    /// deliberately left alone: only explicit deselection resets it.
    pub fn toggle_year(&mut self, value: &CellValue) {
        toggle_value(&mut self.selected_years, value);
        self.refilter();
    }

    /// Toggle a format in the selection.
    pub fn toggle_format(&mut self, value: &CellValue) {
        toggle_value(&mut self.selected_formats, value);
        self.refilter();
    }

    /// Toggle a column in the row-grouping field list.
    pub fn toggle_row_field(&mut self, name: &str) {
        if let Some(col) = self.dataset.resolve_column(name) {
            PivotSpec::toggle_field(&mut self.pivot.row_fields, col);
        }
    }

    /// Toggle a column in the column-grouping field list.
    pub fn toggle_col_field(&mut self, name: &str) {
        if let Some(col) = self.dataset.resolve_column(name) {
            PivotSpec::toggle_field(&mut self.pivot.col_fields, col);
        }
    }

    /// Pick the value column. Rejected (selection untouched, message set)
    /// when the current aggregation cannot handle the column's kind.
    pub fn set_value_field(&mut self, name: &str) {
        let Some(col) = self.dataset.resolve_column(name) else {
            return;
        };
        if self.pivot.aggregation.accepts(col.kind) {
            self.pivot.value_field = Some(col);
            self.status_message = None;
        } else {
            self.status_message = Some(format!(
                "'{}' cannot be aggregated with {}",
                name, self.pivot.aggregation
            ));
        }
    }

    /// Pick the aggregation function. Rejected when the current value
    /// column is incompatible with it.
    pub fn set_aggregation(&mut self, agg: Aggregation) {
        if let Some(value) = &self.pivot.value_field {
            if !agg.accepts(value.kind) {
                self.status_message = Some(format!(
                    "{} cannot aggregate column '{}'",
                    agg, value.name
                ));
                return;
            }
        }
        self.pivot.aggregation = agg;
        self.status_message = None;
    }
}

fn toggle_value(list: &mut Vec<CellValue>, value: &CellValue) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;
    use std::collections::BTreeMap;

    fn dataset() -> Dataset {
        let columns = vec![
            YEAR_COLUMN.to_string(),
            FORMAT_COLUMN.to_string(),
            "Cat. LOLF".to_string(),
            "ETP".to_string(),
        ];
        let rows = [
            (2020, "Papier", "Personnel", 1.0),
            (2021, "Numérique", "Fonctionnement", 2.0),
            (2021, "Papier", "Personnel", 3.0),
        ]
        .iter()
        .map(|(year, format, cat, etp)| {
            let mut values = BTreeMap::new();
            values.insert(YEAR_COLUMN.to_string(), CellValue::Integer(*year));
            values.insert(FORMAT_COLUMN.to_string(), CellValue::Text(format.to_string()));
            values.insert("Cat. LOLF".to_string(), CellValue::Text(cat.to_string()));
            values.insert("ETP".to_string(), CellValue::Float(*etp));
            Row { values }
        })
        .collect();
        Dataset::from_rows(columns, rows)
    }

    #[test]
    fn defaults_follow_the_source_layout() {
        let state = SessionState::new(dataset());

        assert_eq!(state.pivot.row_fields[0].name, "Cat. LOLF");
        assert_eq!(
            state
                .pivot
                .col_fields
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>(),
            vec![YEAR_COLUMN, FORMAT_COLUMN]
        );
        // Column at index 3 of the header.
        assert_eq!(state.pivot.value_field.as_ref().map(|c| c.name.as_str()), Some("ETP"));
        assert!(state.pivot.is_ready());
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn toggling_a_year_refilters_without_touching_formats() {
        let mut state = SessionState::new(dataset());
        state.toggle_format(&CellValue::Text("Papier".to_string()));
        state.toggle_year(&CellValue::Integer(2021));

        assert_eq!(state.visible_indices, vec![2]);
        // The format selection survives the year change untouched.
        assert_eq!(
            state.selected_formats,
            vec![CellValue::Text("Papier".to_string())]
        );

        // Deselecting the year puts the year filter back to a no-op.
        state.toggle_year(&CellValue::Integer(2021));
        assert_eq!(state.visible_indices, vec![0, 2]);
    }

    #[test]
    fn format_options_follow_the_year_selection() {
        let mut state = SessionState::new(dataset());
        assert!(state.format_options().is_empty());

        state.toggle_year(&CellValue::Integer(2020));
        assert_eq!(
            state.format_options(),
            vec![CellValue::Text("Papier".to_string())]
        );
    }

    #[test]
    fn value_field_selection_is_capability_checked() {
        let mut state = SessionState::new(dataset());
        // Count accepts categorical columns, so the switch goes through.
        state.set_value_field(FORMAT_COLUMN);
        assert_eq!(
            state.pivot.value_field.as_ref().map(|c| c.name.as_str()),
            Some(FORMAT_COLUMN)
        );
        assert!(state.status_message.is_none());
    }
}
