//! CSV loading and saving for the CLI.
//!
//! Every file is read with its first record as the header. Empty fields
//! become [`CellValue::Empty`]; everything else is kept as text verbatim, so
//! untouched cells round-trip byte for byte. Numeric lexemes still compare
//! numerically through cell normalization.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use table_diff::{CellValue, Table};

pub fn read_table(path: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path))?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read CSV record in {}", path))?;
        rows.push(record.iter().map(parse_field).collect());
    }

    Table::from_rows(rows).with_context(|| format!("Malformed table in {}", path))
}

pub fn write_table(path: &str, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path))?;

    writer
        .write_record(table.column_names())
        .context("Failed to write CSV header")?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn parse_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::text(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_their_lexeme() {
        assert_eq!(parse_field("2.5"), CellValue::text("2.5"));
        assert_eq!(parse_field("007"), CellValue::text("007"));
        assert_eq!(parse_field(""), CellValue::Empty);
        assert_eq!(parse_field("abc"), CellValue::text("abc"));
    }

    #[test]
    fn numeric_lexemes_still_compare_numerically() {
        assert!(parse_field("007").diff_eq(&parse_field("7")));
        assert!(!parse_field("007").diff_eq(&parse_field("8")));
    }
}
