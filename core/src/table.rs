//! Immutable tabular view over a header row plus data rows.
//!
//! A [`Table`] is built once from parsed rows and is read-only from then on.
//! Rows shorter than the header are padded with [`CellValue::Empty`]; rows
//! longer than the header are rejected with [`ShapeError`]. The merger builds
//! its output table through the crate-internal constructor.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::column_match::ColumnRemap;
use crate::value::CellValue;

/// Malformed table input: a data row is wider than the header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "[TBLDIFF_TABLE_001] data row {row} has {actual} cells but the header has {expected}. \
     Suggestion: fix the source row or widen the header before building the table."
)]
pub struct ShapeError {
    /// Zero-based data row index (header excluded).
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

/// An ordered header plus data rows, all rows exactly header-width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    // First occurrence wins for duplicate header names.
    column_lookup: FxHashMap<String, usize>,
}

impl Table {
    /// Builds a table from an explicit header and data rows.
    ///
    /// Short rows are padded with empty cells; over-long rows fail with
    /// [`ShapeError`].
    pub fn build(
        header: Vec<String>,
        mut rows: Vec<Vec<CellValue>>,
    ) -> Result<Table, ShapeError> {
        let width = header.len();
        for (idx, row) in rows.iter_mut().enumerate() {
            if row.len() > width {
                return Err(ShapeError {
                    row: idx,
                    expected: width,
                    actual: row.len(),
                });
            }
            row.resize(width, CellValue::Empty);
        }
        Ok(Table::from_parts(header, rows))
    }

    /// Builds a table from rows where the first row is the header, the shape
    /// CSV readers naturally produce.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Result<Table, ShapeError> {
        if rows.is_empty() {
            return Ok(Table::from_parts(Vec::new(), Vec::new()));
        }
        let header = rows
            .remove(0)
            .iter()
            .map(|v| v.normalized().into_owned())
            .collect();
        Table::build(header, rows)
    }

    /// Crate-internal constructor for callers that already guarantee shape.
    /// Rows here are padded silently rather than rejected.
    pub(crate) fn from_parts(header: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Table {
        let width = header.len();
        for row in rows.iter_mut() {
            debug_assert!(row.len() <= width, "internal rows must not exceed the header");
            row.resize(width, CellValue::Empty);
        }
        let mut column_lookup = FxHashMap::default();
        for (idx, name) in header.iter().enumerate() {
            column_lookup.entry(name.clone()).or_insert(idx);
        }
        Table {
            header,
            rows,
            column_lookup,
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.header
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_lookup.get(name).copied()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`, data rows only (the header is not row 0).
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.rows[row][col]
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// All values of one column, in row order.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |r| &r[col])
    }

    /// Returns a copy with header names rewritten through `remap`. This is
    /// the hook for the external column pre-matching step: the remap is
    /// applied before the table reaches the aligner.
    pub fn apply_column_renames(&self, remap: &ColumnRemap) -> Table {
        let header = self
            .header
            .iter()
            .map(|name| remap.renamed(name).unwrap_or(name.as_str()).to_owned())
            .collect();
        Table::from_parts(header, self.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(vals: &[&str]) -> Vec<CellValue> {
        vals.iter().map(|v| CellValue::text(*v)).collect()
    }

    #[test]
    fn pads_short_rows_with_empty() {
        let table = Table::build(
            vec!["a".into(), "b".into(), "c".into()],
            vec![cells(&["1"])],
        )
        .expect("short rows are padded");
        assert_eq!(table.column_count(), 3);
        assert!(table.cell(0, 1).is_blank());
        assert!(table.cell(0, 2).is_blank());
    }

    #[test]
    fn rejects_over_long_rows() {
        let err = Table::build(vec!["a".into()], vec![cells(&["1", "2"])])
            .expect_err("over-long rows are a shape error");
        assert_eq!(err.row, 0);
        assert_eq!(err.expected, 1);
        assert_eq!(err.actual, 2);
    }

    #[test]
    fn first_row_is_header_in_from_rows() {
        let table =
            Table::from_rows(vec![cells(&["id", "name"]), cells(&["1", "Alice"])]).unwrap();
        assert_eq!(table.column_names(), ["id", "name"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn duplicate_header_lookup_prefers_first_occurrence() {
        let table = Table::build(
            vec!["x".into(), "x".into()],
            vec![cells(&["left", "right"])],
        )
        .unwrap();
        assert_eq!(table.column_index("x"), Some(0));
    }

    #[test]
    fn empty_input_builds_a_degenerate_table() {
        let table = Table::from_rows(Vec::new()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn renames_header_through_remap() {
        let table =
            Table::from_rows(vec![cells(&["centre", "city"]), cells(&["a", "b"])]).unwrap();
        let remap = ColumnRemap::from_pairs([("centre", "location_name")]);
        let renamed = table.apply_column_renames(&remap);
        assert_eq!(renamed.column_names(), ["location_name", "city"]);
        assert_eq!(renamed.cell(0, 0), &CellValue::text("a"));
    }
}
