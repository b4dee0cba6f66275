use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::model::{CellValue, ColumnKind, ColumnRef};

// ---------------------------------------------------------------------------
// Aggregation functions
// ---------------------------------------------------------------------------

/// Aggregation applied to the value cells of one pivot group.
///
/// Only `Count` is offered in the UI, but the enum is the extension point:
/// a new function slots in with a label, a kind check, and an `apply` arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Number of rows in the group.
    Count,
}

impl Aggregation {
    /// Every selectable aggregation, in menu order.
    pub const ALL: &'static [Aggregation] = &[Aggregation::Count];

    /// Whether a column of the given kind can be aggregated by this
    /// function. Counting works on any column; a numeric reduction
    /// (sum, mean, …) would demand `ColumnKind::Numeric` here.
    pub fn accepts(&self, _kind: ColumnKind) -> bool {
        match self {
            Aggregation::Count => true,
        }
    }

    /// Reduce the value cells of one group to a number.
    pub fn apply(&self, values: &[CellValue]) -> f64 {
        match self {
            Aggregation::Count => values.len() as f64,
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Count => write!(f, "count"),
        }
    }
}

// ---------------------------------------------------------------------------
// PivotSpec – user intent for one cross-tabulation
// ---------------------------------------------------------------------------

/// The pivot configuration: ordered row fields, ordered column fields, the
/// value field and the aggregation. Fields are capability-typed references
/// resolved against the Dataset schema when the user picks them.
/// Serializable as a configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotSpec {
    pub row_fields: Vec<ColumnRef>,
    pub col_fields: Vec<ColumnRef>,
    pub value_field: Option<ColumnRef>,
    pub aggregation: Aggregation,
}

impl Default for PivotSpec {
    fn default() -> Self {
        PivotSpec {
            row_fields: Vec::new(),
            col_fields: Vec::new(),
            value_field: None,
            aggregation: Aggregation::Count,
        }
    }
}

impl PivotSpec {
    /// A pivot is computed only when row fields, column fields and the
    /// value field are all set; otherwise the UI shows a prompt instead.
    pub fn is_ready(&self) -> bool {
        !self.row_fields.is_empty() && !self.col_fields.is_empty() && self.value_field.is_some()
    }

    /// Toggle a column in an ordered field list: remove when present,
    /// append when absent. Click order is selection order.
    pub fn toggle_field(list: &mut Vec<ColumnRef>, column: ColumnRef) {
        if let Some(pos) = list.iter().position(|c| c.name == column.name) {
            list.remove(pos);
        } else {
            list.push(column);
        }
    }
}
