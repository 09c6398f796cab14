use table_diff::{CellValue, Table};

/// Builds a table from string literals; the first row is the header.
pub fn table(rows: &[&[&str]]) -> Table {
    Table::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|v| CellValue::text(*v)).collect())
            .collect(),
    )
    .expect("test tables are well-shaped")
}
