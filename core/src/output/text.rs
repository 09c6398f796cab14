//! CSV-shaped text rendering of a diff table.
//!
//! Output layout, one line per row:
//! ```text
//! !,,+++
//! @@,id,city
//! +++,2,Toronto
//! ->,1,Ottawa->Kingston
//! ```
//! The `!` column-status line follows the diff's `show_meta_row` decision:
//! with `show_unchanged_meta` set it is always present (blank markers when
//! no column changed), otherwise only when the schema changed. The `@@`
//! header line is always present.

use std::fmt::Write;

use crate::diff::{ChangeTag, DiffTable};

/// Renders the diff as action-column CSV text.
pub fn render_text(diff: &DiffTable) -> String {
    let mut out = String::new();

    if diff.show_meta_row {
        push_line(
            &mut out,
            "!",
            diff.columns.iter().map(|col| col.tag.marker().to_string()),
        );
    }

    push_line(
        &mut out,
        "@@",
        diff.columns.iter().map(|col| col.name.clone()),
    );

    for row in &diff.rows {
        push_line(
            &mut out,
            row.tag.marker(),
            row.cells.iter().map(|cell| cell.text.clone()),
        );
    }

    out
}

fn push_line(out: &mut String, action: &str, cells: impl Iterator<Item = String>) {
    let _ = write!(out, "{}", quote(action));
    for cell in cells {
        let _ = write!(out, ",{}", quote(&cell));
    }
    out.push('\n');
}

/// Minimal CSV quoting: only fields containing a comma, quote, or newline
/// are wrapped, with inner quotes doubled.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        let mut quoted = String::with_capacity(field.len() + 2);
        quoted.push('"');
        for ch in field.chars() {
            if ch == '"' {
                quoted.push('"');
            }
            quoted.push(ch);
        }
        quoted.push('"');
        quoted
    } else {
        field.to_string()
    }
}
