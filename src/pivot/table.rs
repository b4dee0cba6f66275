use crate::data::model::CellValue;
use crate::pivot::spec::Aggregation;

// ---------------------------------------------------------------------------
// PivotTable – the computed cross-tabulation
// ---------------------------------------------------------------------------

/// A two-dimensional labeled result grid.
///
/// Row keys are the observed row-field combinations, sorted ascending.
/// Column keys are the Cartesian product of the per-level observed values,
/// also sorted. A combination with no contributing rows still owns a cell
/// holding exact zero, never a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    /// Names of the row-grouping fields, outer to inner.
    pub row_fields: Vec<String>,
    /// Names of the column-grouping fields, outer to inner.
    pub col_fields: Vec<String>,
    /// Name of the aggregated value field.
    pub value_field: String,
    /// Aggregation that produced the cells.
    pub aggregation: Aggregation,
    /// One tuple per result row; each has `row_fields.len()` values.
    pub row_keys: Vec<Vec<CellValue>>,
    /// One tuple per result column; each has `col_fields.len()` values.
    pub col_keys: Vec<Vec<CellValue>>,
    /// Dense row-major grid: `values[r][c]` is the cell for
    /// `(row_keys[r], col_keys[c])`.
    pub values: Vec<Vec<f64>>,
}

impl PivotTable {
    pub fn n_rows(&self) -> usize {
        self.row_keys.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_keys.len()
    }

    /// The cell value at (row, column).
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Display label for one level of a column key.
    pub fn col_label(&self, col: usize, level: usize) -> String {
        self.col_keys[col][level].to_string()
    }

    /// Multi-level column label joined for single-line display.
    pub fn col_label_joined(&self, col: usize, separator: &str) -> String {
        self.col_keys[col]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Display label for one level of a row key.
    pub fn row_label(&self, row: usize, level: usize) -> String {
        self.row_keys[row][level].to_string()
    }

    /// Display label for a cell. Whole numbers render without a decimal
    /// point ("3", not "3.0").
    pub fn value_label(&self, row: usize, col: usize) -> String {
        let v = self.value(row, col);
        if v.fract() == 0.0 && v.abs() < 1e15 {
            format!("{}", v as i64)
        } else {
            format!("{v}")
        }
    }
}
