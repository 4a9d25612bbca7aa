//! Output rendering

use gridstore_lib::Table;
use gridstore_lib::model::Record;
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = "  ";

/// Renders the displayed page as aligned columns with a header row.
pub fn render_table(table: &Table) -> String {
    let cols = table.get_col_definitions();
    let rows = table.get_data();

    let headers: Vec<String> = cols
        .iter()
        .map(|col| col.header_label.clone().unwrap_or_else(|| col.data_property.clone()))
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            cols.iter()
                .map(|col| row.value(&col.data_property).to_display_string())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect();
    out.push_str(line.join(SEPARATOR).trim_end());
    out.push('\n');
}

/// Pads to a display width, counting wide characters as two columns.
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Renders the table state as JSON.
pub fn render_json(table: &Table, selected: &[String]) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = table.get_data().iter().map(record_json).collect();
    serde_json::json!({
        "id": table.id(),
        "dataAvailable": table.is_data_available(),
        "dataCount": table.get_data_count(),
        "pagination": table.get_pagination_data(),
        "sortColIndex": table.get_sort_col_index(),
        "selected": selected,
        "rows": rows,
    })
}

fn record_json(record: &Record) -> serde_json::Value {
    serde_json::to_value(record).unwrap_or(serde_json::Value::Null)
}

/// One-line summary printed under the table.
pub fn summary(table: &Table, selected: &[String]) -> String {
    let mut parts = vec![format!("{} rows", table.get_data_count())];
    if let Some(page) = table.get_pagination_data() {
        let shown = table.get_data().len();
        if shown > 0 {
            parts.push(format!("showing {}-{}", page.cursor + 1, page.cursor + shown));
        } else {
            parts.push(format!("cursor {} past end", page.cursor));
        }
    }
    if !selected.is_empty() {
        parts.push(format!("selected: {}", selected.join(", ")));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use gridstore_lib::StoreConfig;
    use gridstore_lib::model::ColumnDefinition;
    use gridstore_lib::model::DataType;
    use gridstore_lib::model::TableDefinition;

    use super::*;

    fn table() -> Table {
        let definition = TableDefinition::new("/")
            .with_col(ColumnDefinition::new("id", DataType::Select).with_header("#"))
            .with_col(ColumnDefinition::new("name", DataType::String).with_header("Name"))
            .with_page_size(2);
        let mut table = Table::new("t", definition, None, &StoreConfig::default());
        table.on_data_received(serde_json::json!([
            {"id": 1, "name": "東京"},
            {"id": 22, "name": "Oslo"},
            {"id": 3, "name": "Lima"}
        ]));
        table
    }

    #[test]
    fn test_render_table_aligns_wide_chars() {
        let out = render_table(&table());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "#   Name");
        assert_eq!(lines[1], "--  ----");
        assert_eq!(lines[2], "1   東京");
        assert_eq!(lines[3], "22  Oslo");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_summary() {
        let table = table();
        assert_eq!(summary(&table, &[]), "3 rows | showing 1-2");
        assert_eq!(
            summary(&table, &["1".to_string()]),
            "3 rows | showing 1-2 | selected: 1"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&table(), &[]);
        assert_eq!(json["dataCount"], 3);
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["pagination"]["size"], 2);
    }
}
