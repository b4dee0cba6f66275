use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value. The loader never produces a "missing"
/// variant: empty cells are normalized to `Integer(0)` in every column,
/// text columns included.
/// Used as a grouping key downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

// -- Manual Eq/Ord so CellValue can key BTreeMap / BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Bool(_) => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Spreadsheet numbers arrive as floats; whole values (years,
            // head counts) must label as "2021", not "2021.0".
            CellValue::Float(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{v}")
                }
            }
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whether the value is numeric (integer or float).
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Column schema: kind classification and capability-typed references
// ---------------------------------------------------------------------------

/// Broad column classification inferred at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every cell is an integer or a float.
    Numeric,
    /// Anything else, including mixed columns (a zero-filled text column
    /// holds both text and integer zeros and classifies as categorical).
    Categorical,
}

/// A column reference resolved against the Dataset schema: carries the
/// declared kind so aggregation compatibility is checked at selection time,
/// before the pivot builder runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub name: String,
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// Row – one record of the source table
// ---------------------------------------------------------------------------

/// A single row: column name → value. The loader guarantees every column
/// of the Dataset is present (empty cells become integer zero).
#[derive(Debug, Clone)]
pub struct Row {
    pub values: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices. Created once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows, in source order.
    pub rows: Vec<Row>,
    /// Column names in source order (the default value column is picked by
    /// position, so order matters).
    pub column_names: Vec<String>,
    /// Per-column kind classification.
    pub kinds: BTreeMap<String, ColumnKind>,
    /// For each column the unique values in first-appearance order. These
    /// feed the dropdown option lists.
    pub unique_values: BTreeMap<String, Vec<CellValue>>,
}

impl Dataset {
    /// Build column indices from loaded rows. `column_names` comes from the
    /// source header so positional defaults stay stable.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Row>) -> Self {
        let mut unique_values: BTreeMap<String, Vec<CellValue>> = BTreeMap::new();
        let mut kinds: BTreeMap<String, ColumnKind> = BTreeMap::new();

        for name in &column_names {
            let mut uniques: Vec<CellValue> = Vec::new();
            let mut numeric = !rows.is_empty();
            for row in &rows {
                if let Some(val) = row.get(name) {
                    if !val.is_numeric() {
                        numeric = false;
                    }
                    if !uniques.contains(val) {
                        uniques.push(val.clone());
                    }
                } else {
                    numeric = false;
                }
            }
            unique_values.insert(name.clone(), uniques);
            kinds.insert(
                name.clone(),
                if numeric {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                },
            );
        }

        Dataset {
            rows,
            column_names,
            kinds,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column name against the schema into a capability-typed
    /// reference. `None` when the column does not exist.
    pub fn resolve_column(&self, name: &str) -> Option<ColumnRef> {
        self.kinds.get(name).map(|kind| ColumnRef {
            name: name.to_string(),
            kind: *kind,
        })
    }

    /// Names of the numeric columns, in source order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_names
            .iter()
            .filter(|c| self.kinds.get(*c) == Some(&ColumnKind::Numeric))
            .map(|c| c.as_str())
            .collect()
    }
}
