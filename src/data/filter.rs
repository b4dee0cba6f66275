use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Cascading year/format filters
// ---------------------------------------------------------------------------

/// Column driving the first dropdown.
pub const YEAR_COLUMN: &str = "Année";

/// Column driving the second, year-dependent dropdown.
pub const FORMAT_COLUMN: &str = "format_pdt";

/// Return indices of rows that pass the current selections, in source order.
///
/// Semantics:
/// * empty `years` → the year filter is a no-op (all rows pass);
/// * non-empty `years` → a row passes when its year value is a member;
/// * `formats` behaves the same on the format column;
/// * both filters combine with AND.
///
/// An empty selection meaning "everything" (rather than "nothing") is the
/// contract the dependent dropdowns are built on.
pub fn filtered_indices(
    dataset: &Dataset,
    years: &[CellValue],
    formats: &[CellValue],
) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let year_ok = years.is_empty()
                || row
                    .get(YEAR_COLUMN)
                    .map(|v| years.contains(v))
                    .unwrap_or(false);
            let format_ok = formats.is_empty()
                || row
                    .get(FORMAT_COLUMN)
                    .map(|v| formats.contains(v))
                    .unwrap_or(false);
            year_ok && format_ok
        })
        .map(|(i, _)| i)
        .collect()
}

/// Options for the year dropdown: unique year values of the whole dataset,
/// first-appearance order.
pub fn year_options(dataset: &Dataset) -> Vec<CellValue> {
    dataset
        .unique_values
        .get(YEAR_COLUMN)
        .cloned()
        .unwrap_or_default()
}

/// Options for the format dropdown, computed from the rows matching the
/// current year selection. With no year selected the list is empty: no
/// format is orderable until a year is chosen, even though the empty year
/// selection still passes every row for filtering purposes.
pub fn format_options(dataset: &Dataset, years: &[CellValue]) -> Vec<CellValue> {
    if years.is_empty() {
        return Vec::new();
    }

    let mut options = Vec::new();
    for idx in filtered_indices(dataset, years, &[]) {
        if let Some(val) = dataset.rows[idx].get(FORMAT_COLUMN) {
            if !options.contains(val) {
                options.push(val.clone());
            }
        }
    }
    options
}
