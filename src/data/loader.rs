use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Load failures, split into an I/O class and a format class. Both are
/// fatal at startup: the dashboard cannot run without its dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX read error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON read error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tabular data: {0}")]
    InvalidFormat(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` – first worksheet, first row is the header (the usual input)
/// * `.csv`  – header row with column names
/// * `.json` – records-oriented: `[{ "col": value, ... }, ...]`
///
/// Post-condition: every missing/empty cell is replaced with integer zero,
/// whatever the column holds elsewhere. Text columns are zero-filled too;
/// that mirrors the source data pipeline and downstream code relies on it.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "xlsx" => load_xlsx(path)?,
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::debug!("numeric columns: {:?}", dataset.numeric_columns());
    Ok(dataset)
}

/// The zero that stands in for any missing cell.
fn zero() -> CellValue {
    CellValue::Integer(0)
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` workbook. The first row is the
/// header; later rows shorter than the header are padded with zeros.
fn load_xlsx(path: &Path) -> Result<Dataset, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let first_sheet = sheet_names
        .first()
        .ok_or_else(|| LoadError::InvalidFormat("workbook contains no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(first_sheet)
        .map_err(|e| LoadError::InvalidFormat(e.to_string()))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| LoadError::InvalidFormat("worksheet is empty".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{i}"),
            other => other.to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut values = BTreeMap::new();
        for (i, name) in headers.iter().enumerate() {
            let value = row.get(i).map(convert_xlsx_cell).unwrap_or_else(zero);
            values.insert(name.clone(), value);
        }
        rows.push(Row { values });
    }

    Ok(Dataset::from_rows(headers, rows))
}

/// Convert a calamine cell, normalizing empties to zero.
fn convert_xlsx_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => zero(),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line. Empty
/// fields become zero.
fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut values = BTreeMap::new();
        for (i, name) in headers.iter().enumerate() {
            let value = record.get(i).map(guess_cell_type).unwrap_or_else(zero);
            values.insert(name.clone(), value);
        }
        rows.push(Row { values });
    }

    Ok(Dataset::from_rows(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return zero();
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "Année": 2021, "format_pdt": "Papier", "Cat. LOLF": "Personnel", "ETP": 3.5 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys across records; a record missing a key
/// gets the zero fill for it.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidFormat("expected top-level JSON array".to_string()))?;

    let mut objects = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    for rec in records {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::InvalidFormat("record is not a JSON object".to_string()))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut rows = Vec::with_capacity(objects.len());
    for obj in objects {
        let mut values = BTreeMap::new();
        for name in &headers {
            let value = obj.get(name).map(json_to_cell).unwrap_or_else(zero);
            values.insert(name.clone(), value);
        }
        rows.push(Row { values });
    }

    Ok(Dataset::from_rows(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Null => zero(),
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(content.as_bytes()).expect("write");
        (dir, path)
    }

    #[test]
    fn csv_missing_cells_become_zero() {
        let (_dir, path) = write_temp(
            "data.csv",
            "Année,format_pdt,Cat. LOLF,ETP\n\
             2021,Papier,Personnel,3.5\n\
             2021,,Personnel,\n",
        );

        let ds = load_file(&path).expect("load");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[1].get("format_pdt"), Some(&CellValue::Integer(0)));
        assert_eq!(ds.rows[1].get("ETP"), Some(&CellValue::Integer(0)));
        // The zero participates in indexing like any other value.
        assert!(ds.unique_values["ETP"].contains(&CellValue::Integer(0)));
    }

    #[test]
    fn csv_keeps_header_order() {
        let (_dir, path) = write_temp("data.csv", "b,a,c\n1,2,3\n");
        let ds = load_file(&path).expect("load");
        assert_eq!(ds.column_names, vec!["b", "a", "c"]);
    }

    #[test]
    fn json_records_are_loaded_and_zero_filled() {
        let (_dir, path) = write_temp(
            "data.json",
            r#"[
                {"Année": 2020, "format_pdt": "Papier", "ETP": 1.5},
                {"Année": 2021, "format_pdt": null}
            ]"#,
        );

        let ds = load_file(&path).expect("load");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[1].get("format_pdt"), Some(&CellValue::Integer(0)));
        // key absent from the second record → zero fill
        assert_eq!(ds.rows[1].get("ETP"), Some(&CellValue::Integer(0)));
    }

    #[test]
    fn unknown_extension_is_a_format_error() {
        let (_dir, path) = write_temp("data.parquet", "");
        match load_file(&path) {
            Err(LoadError::UnsupportedExtension(ext)) => assert_eq!(ext, "parquet"),
            other => panic!("expected UnsupportedExtension, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_class_error() {
        let err = load_file(Path::new("definitely-not-here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_) | LoadError::Io(_)));
    }
}
