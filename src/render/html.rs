use std::fmt::Write as _;

use crate::pivot::table::PivotTable;

// ---------------------------------------------------------------------------
// HTML export of a pivot table
// ---------------------------------------------------------------------------

/// Fixed default filename for the downloadable artifact.
pub const EXPORT_FILE_NAME: &str = "pivot_table_dark.html";

/// Dark table theme: sticky header, alternating row shading, hover
/// highlight, bounded-height scrollable container.
const DARK_TABLE_CSS: &str = "\
<style>
.dark-table {
    display: block;
    max-height: 450px;
    overflow-y: auto;
    border: 1px solid #555;
    border-radius: 6px;
    background-color: #111;
    color: #f0f0f0;
    font-family: 'Consolas', 'Courier New', monospace;
    font-size: 15px;
    text-align: right;
}
.dark-table th, .dark-table td {
    border: 1px solid #333;
    padding: 6px 10px;
}
.dark-table th {
    background-color: #222;
    color: #00bfff;
    position: sticky;
    top: 0;
    z-index: 2;
    text-align: center;
}
.dark-table tr:nth-child(even) {
    background-color: #1a1a1a;
}
.dark-table tr:hover {
    background-color: #003366;
    transition: 0.3s;
}
</style>
";

/// Render the pivot as a self-contained HTML fragment. The same bytes serve
/// as the display markup and the downloadable document; the table is never
/// mutated.
///
/// The `<thead>` keeps the multi-level column grouping: one row per column
/// field with colspan-merged labels, then a final row naming the row
/// fields. Each body row leads with one `<th>` per row-field level.
pub fn to_html(table: &PivotTable) -> String {
    let mut out = String::new();
    out.push_str(DARK_TABLE_CSS);
    out.push_str("<table border=\"0\" class=\"dark-table\">\n<thead>\n");

    let n_row_fields = table.row_fields.len().max(1);

    // One header row per column-field level, labels merged over the runs
    // of column keys sharing the same prefix up to that level.
    for level in 0..table.col_fields.len() {
        let _ = write!(
            out,
            "<tr>\n<th colspan=\"{}\">{}</th>\n",
            n_row_fields,
            escape(&table.col_fields[level])
        );
        let mut col = 0;
        while col < table.n_cols() {
            let mut run = 1;
            while col + run < table.n_cols()
                && table.col_keys[col + run][..=level] == table.col_keys[col][..=level]
            {
                run += 1;
            }
            if run > 1 {
                let _ = write!(
                    out,
                    "<th colspan=\"{}\">{}</th>\n",
                    run,
                    escape(&table.col_label(col, level))
                );
            } else {
                let _ = write!(out, "<th>{}</th>\n", escape(&table.col_label(col, level)));
            }
            col += run;
        }
        out.push_str("</tr>\n");
    }

    // Row-field names row.
    out.push_str("<tr>\n");
    for field in &table.row_fields {
        let _ = write!(out, "<th>{}</th>\n", escape(field));
    }
    for _ in 0..table.n_cols() {
        out.push_str("<th></th>\n");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    // Data rows.
    for r in 0..table.n_rows() {
        out.push_str("<tr>\n");
        for level in 0..table.row_fields.len() {
            let _ = write!(out, "<th>{}</th>\n", escape(&table.row_label(r, level)));
        }
        for c in 0..table.n_cols() {
            let _ = write!(out, "<td>{}</td>\n", table.value_label(r, c));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::pivot::spec::Aggregation;

    fn sample_table() -> PivotTable {
        PivotTable {
            row_fields: vec!["Cat. LOLF".to_string()],
            col_fields: vec!["Année".to_string(), "format_pdt".to_string()],
            value_field: "ETP".to_string(),
            aggregation: Aggregation::Count,
            row_keys: vec![
                vec![CellValue::Text("Fonctionnement".to_string())],
                vec![CellValue::Text("Personnel".to_string())],
            ],
            col_keys: vec![
                vec![CellValue::Integer(2020), CellValue::Text("A".to_string())],
                vec![CellValue::Integer(2020), CellValue::Text("B".to_string())],
                vec![CellValue::Integer(2021), CellValue::Text("A".to_string())],
                vec![CellValue::Integer(2021), CellValue::Text("B".to_string())],
            ],
            values: vec![vec![1.0, 0.0, 2.0, 0.0], vec![0.0, 3.0, 0.0, 4.0]],
        }
    }

    /// Pull the text of every `<tag>…</tag>` occurrence, in order.
    fn extract(html: &str, tag: &str) -> Vec<String> {
        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        let mut found = Vec::new();
        let mut rest = html;
        while let Some(start) = rest.find(&open) {
            let after = &rest[start..];
            let Some(gt) = after.find('>') else { break };
            let Some(end) = after.find(&close) else { break };
            found.push(after[gt + 1..end].to_string());
            rest = &after[end + close.len()..];
        }
        found
    }

    #[test]
    fn export_contains_style_and_dark_table_class() {
        let html = to_html(&sample_table());
        assert!(html.contains("<style>"));
        assert!(html.contains("class=\"dark-table\""));
        assert!(html.contains("position: sticky"));
        assert!(html.contains("max-height: 450px"));
    }

    #[test]
    fn multi_level_headers_merge_with_colspan() {
        let html = to_html(&sample_table());
        // Outer level: 2020 and 2021 each span their two formats.
        assert!(html.contains("<th colspan=\"2\">2020</th>"));
        assert!(html.contains("<th colspan=\"2\">2021</th>"));
        // Level names sit in the header corner.
        assert!(html.contains("<th colspan=\"1\">Année</th>"));
        assert!(html.contains("<th colspan=\"1\">format_pdt</th>"));
    }

    #[test]
    fn cell_text_round_trips_the_value_grid() {
        let table = sample_table();
        let html = to_html(&table);

        let body = html
            .split("<tbody>")
            .nth(1)
            .and_then(|b| b.split("</tbody>").next())
            .expect("tbody present");

        let cells = extract(body, "td");
        assert_eq!(cells.len(), table.n_rows() * table.n_cols());

        for r in 0..table.n_rows() {
            for c in 0..table.n_cols() {
                let parsed: f64 = cells[r * table.n_cols() + c].parse().expect("number");
                assert_eq!(parsed, table.value(r, c));
            }
        }

        // Row labels come back too.
        let row_labels = extract(body, "th");
        assert_eq!(row_labels, vec!["Fonctionnement", "Personnel"]);
    }

    #[test]
    fn labels_are_html_escaped() {
        let mut table = sample_table();
        table.row_keys[0] = vec![CellValue::Text("A & B <1>".to_string())];
        let html = to_html(&table);
        assert!(html.contains("A &amp; B &lt;1&gt;"));
        assert!(!html.contains("<1>"));
    }

    #[test]
    fn whole_counts_have_no_decimal_point() {
        let html = to_html(&sample_table());
        assert!(html.contains("<td>3</td>"));
        assert!(!html.contains("3.0"));
    }
}
