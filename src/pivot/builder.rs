use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::data::model::{CellValue, ColumnRef, Dataset, Row};
use crate::pivot::spec::PivotSpec;
use crate::pivot::table::PivotTable;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// What a pivot computation produced. The empty-input case is a first-class
/// outcome, not an error: the caller warns instead of aggregating nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum PivotOutcome {
    Table(PivotTable),
    EmptyInput,
}

/// Internal aggregation failure, reported to the user and recoverable by
/// changing the selection. Never touches the Selection State.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("no value column selected")]
    NoValueColumn,

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("row {row} has no value for column '{column}'")]
    MissingValue { row: usize, column: String },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Cross-tabulate the filtered view described by `indices`.
///
/// The caller gates on `spec.is_ready()`; this function assumes the row
/// fields, column fields and value field are all set and resolved.
pub fn build_pivot(
    dataset: &Dataset,
    indices: &[usize],
    spec: &PivotSpec,
) -> Result<PivotOutcome, AggregationError> {
    if indices.is_empty() {
        return Ok(PivotOutcome::EmptyInput);
    }

    let value_field = spec
        .value_field
        .as_ref()
        .ok_or(AggregationError::NoValueColumn)?;

    // Re-check every referenced column against the schema. Selections are
    // resolved when picked, so a miss here is an internal failure.
    for column in spec
        .row_fields
        .iter()
        .chain(spec.col_fields.iter())
        .chain(std::iter::once(value_field))
    {
        if !dataset.kinds.contains_key(&column.name) {
            return Err(AggregationError::UnknownColumn(column.name.clone()));
        }
    }

    // Group the filtered rows: (row key, column key) → value cells.
    let mut groups: BTreeMap<(Vec<CellValue>, Vec<CellValue>), Vec<CellValue>> = BTreeMap::new();
    let mut col_level_values: Vec<BTreeSet<CellValue>> =
        vec![BTreeSet::new(); spec.col_fields.len()];
    let mut row_key_set: BTreeSet<Vec<CellValue>> = BTreeSet::new();

    for &idx in indices {
        let row = &dataset.rows[idx];

        let row_key = key_for(row, idx, &spec.row_fields)?;
        let col_key = key_for(row, idx, &spec.col_fields)?;
        let value = cell_for(row, idx, &value_field.name)?;

        for (level, v) in col_key.iter().enumerate() {
            col_level_values[level].insert(v.clone());
        }
        row_key_set.insert(row_key.clone());
        groups.entry((row_key, col_key)).or_default().push(value);
    }

    // Row labels: observed combinations, ascending. Column labels: the
    // Cartesian product of the per-level observed values, so combinations
    // without rows still get a zero cell.
    let row_keys: Vec<Vec<CellValue>> = row_key_set.into_iter().collect();
    let col_keys = cartesian_product(&col_level_values);

    let values: Vec<Vec<f64>> = row_keys
        .iter()
        .map(|rk| {
            col_keys
                .iter()
                .map(|ck| {
                    groups
                        .get(&(rk.clone(), ck.clone()))
                        .map(|cells| spec.aggregation.apply(cells))
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    Ok(PivotOutcome::Table(PivotTable {
        row_fields: spec.row_fields.iter().map(|c| c.name.clone()).collect(),
        col_fields: spec.col_fields.iter().map(|c| c.name.clone()).collect(),
        value_field: value_field.name.clone(),
        aggregation: spec.aggregation,
        row_keys,
        col_keys,
        values,
    }))
}

/// Extract the grouping key of one row for an ordered field list.
fn key_for(row: &Row, idx: usize, fields: &[ColumnRef]) -> Result<Vec<CellValue>, AggregationError> {
    fields
        .iter()
        .map(|f| cell_for(row, idx, &f.name))
        .collect()
}

fn cell_for(row: &Row, idx: usize, column: &str) -> Result<CellValue, AggregationError> {
    row.get(column)
        .cloned()
        .ok_or_else(|| AggregationError::MissingValue {
            row: idx,
            column: column.to_string(),
        })
}

/// Ordered Cartesian product of the per-level value sets. Empty when any
/// level is empty (cannot happen with a non-empty input view).
fn cartesian_product(levels: &[BTreeSet<CellValue>]) -> Vec<Vec<CellValue>> {
    let mut keys: Vec<Vec<CellValue>> = vec![Vec::new()];
    for level in levels {
        let mut next = Vec::with_capacity(keys.len() * level.len());
        for prefix in &keys {
            for value in level {
                let mut key = prefix.clone();
                key.push(value.clone());
                next.push(key);
            }
        }
        keys = next;
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, FORMAT_COLUMN, YEAR_COLUMN};
    use crate::data::model::{ColumnKind, ColumnRef};
    use crate::pivot::spec::Aggregation;
    use std::collections::BTreeMap;

    fn dataset(rows: &[(i64, &str, &str, f64)]) -> Dataset {
        let columns = vec![
            YEAR_COLUMN.to_string(),
            FORMAT_COLUMN.to_string(),
            "Cat. LOLF".to_string(),
            "ETP".to_string(),
        ];
        let rows = rows
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

    fn spec(ds: &Dataset, rows: &[&str], cols: &[&str], value: &str) -> PivotSpec {
        PivotSpec {
            row_fields: rows.iter().map(|n| ds.resolve_column(n).unwrap()).collect(),
            col_fields: cols.iter().map(|n| ds.resolve_column(n).unwrap()).collect(),
            value_field: Some(ds.resolve_column(value).unwrap()),
            aggregation: Aggregation::Count,
        }
    }

    #[test]
    fn empty_view_yields_the_empty_outcome_not_an_error() {
        let ds = dataset(&[(2020, "A", "Personnel", 1.0)]);
        let spec = spec(&ds, &["Cat. LOLF"], &[YEAR_COLUMN], "ETP");

        let outcome = build_pivot(&ds, &[], &spec).expect("no error on empty input");
        assert_eq!(outcome, PivotOutcome::EmptyInput);
    }

    #[test]
    fn count_pivot_over_one_year_has_one_column() {
        // Filter to year 2021 / format A, pivot Cat. LOLF × Année
        // counting rows.
        let rows: Vec<(i64, &str, &str, f64)> = (0..100)
            .map(|i| {
                let year = 2020 + (i % 3) as i64;
                let format = if i % 2 == 0 { "A" } else { "B" };
                let cat = if i % 5 == 0 { "Personnel" } else { "Fonctionnement" };
                (year, format, cat, i as f64)
            })
            .collect();
        let ds = dataset(&rows);

        let indices = filtered_indices(
            &ds,
            &[CellValue::Integer(2021)],
            &[CellValue::Text("A".to_string())],
        );
        let spec = spec(&ds, &["Cat. LOLF"], &[YEAR_COLUMN], "ETP");

        let table = match build_pivot(&ds, &indices, &spec).expect("pivot") {
            PivotOutcome::Table(t) => t,
            other => panic!("expected a table, got {other:?}"),
        };

        assert_eq!(table.col_keys, vec![vec![CellValue::Integer(2021)]]);
        let total: f64 = (0..table.n_rows()).map(|r| table.value(r, 0)).sum();
        assert_eq!(total as usize, indices.len());

        for (r, key) in table.row_keys.iter().enumerate() {
            let expected = indices
                .iter()
                .filter(|&&i| ds.rows[i].get("Cat. LOLF") == Some(&key[0]))
                .count();
            assert_eq!(table.value(r, 0) as usize, expected);
        }
    }

    #[test]
    fn unobserved_column_combinations_are_zero_cells() {
        // Papier only exists in 2020 and Numérique only in 2021, so the
        // (2020, Numérique) and (2021, Papier) columns exist with zeros.
        let ds = dataset(&[
            (2020, "Papier", "Personnel", 1.0),
            (2021, "Numérique", "Personnel", 2.0),
        ]);
        let spec = spec(&ds, &["Cat. LOLF"], &[YEAR_COLUMN, FORMAT_COLUMN], "ETP");
        let indices: Vec<usize> = (0..ds.len()).collect();

        let table = match build_pivot(&ds, &indices, &spec).expect("pivot") {
            PivotOutcome::Table(t) => t,
            other => panic!("expected a table, got {other:?}"),
        };

        // 2 years × 2 formats = 4 columns, Cartesian.
        assert_eq!(table.n_cols(), 4);
        assert_eq!(table.n_rows(), 1);

        let mut zeros = 0;
        let mut ones = 0;
        for c in 0..table.n_cols() {
            let v = table.value(0, c);
            assert!(v >= 0.0, "cells are never negative");
            if v == 0.0 {
                zeros += 1;
            } else if v == 1.0 {
                ones += 1;
            }
        }
        assert_eq!((zeros, ones), (2, 2));
    }

    #[test]
    fn row_keys_are_observed_combinations_sorted() {
        let ds = dataset(&[
            (2020, "A", "Personnel", 1.0),
            (2020, "A", "Fonctionnement", 2.0),
            (2020, "A", "Personnel", 3.0),
        ]);
        let spec = spec(&ds, &["Cat. LOLF"], &[YEAR_COLUMN], "ETP");
        let indices: Vec<usize> = (0..ds.len()).collect();

        let table = match build_pivot(&ds, &indices, &spec).expect("pivot") {
            PivotOutcome::Table(t) => t,
            other => panic!("expected a table, got {other:?}"),
        };

        assert_eq!(
            table.row_keys,
            vec![
                vec![CellValue::Text("Fonctionnement".to_string())],
                vec![CellValue::Text("Personnel".to_string())],
            ]
        );
        assert_eq!(table.values, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn unknown_column_is_an_aggregation_error() {
        let ds = dataset(&[(2020, "A", "Personnel", 1.0)]);
        let mut spec = spec(&ds, &["Cat. LOLF"], &[YEAR_COLUMN], "ETP");
        spec.col_fields[0] = ColumnRef {
            name: "Disparue".to_string(),
            kind: ColumnKind::Categorical,
        };

        let err = build_pivot(&ds, &[0], &spec).unwrap_err();
        assert_eq!(err, AggregationError::UnknownColumn("Disparue".to_string()));
    }

    #[test]
    fn zero_filled_cells_count_like_any_other_value() {
        // A missing format cell was normalized to integer zero by the
        // loader; it groups as its own column label and still counts.
        let mut values = BTreeMap::new();
        values.insert(YEAR_COLUMN.to_string(), CellValue::Integer(2020));
        values.insert(FORMAT_COLUMN.to_string(), CellValue::Integer(0));
        values.insert("Cat. LOLF".to_string(), CellValue::Text("Personnel".to_string()));
        values.insert("ETP".to_string(), CellValue::Integer(0));
        let ds = Dataset::from_rows(
            vec![
                YEAR_COLUMN.to_string(),
                FORMAT_COLUMN.to_string(),
                "Cat. LOLF".to_string(),
                "ETP".to_string(),
            ],
            vec![Row { values }],
        );

        let spec = PivotSpec {
            row_fields: vec![ds.resolve_column("Cat. LOLF").unwrap()],
            col_fields: vec![ds.resolve_column(FORMAT_COLUMN).unwrap()],
            value_field: Some(ds.resolve_column("ETP").unwrap()),
            aggregation: Aggregation::Count,
        };

        let table = match build_pivot(&ds, &[0], &spec).expect("pivot") {
            PivotOutcome::Table(t) => t,
            other => panic!("expected a table, got {other:?}"),
        };
        assert_eq!(table.col_keys, vec![vec![CellValue::Integer(0)]]);
        assert_eq!(table.value(0, 0), 1.0);
    }
}
