//! HTML rendering of a diff table.
//!
//! [`render_html`] emits a `<table class="highlighter">` fragment whose rows
//! and cells carry `add`, `remove`, and `modify` classes; [`complete_html`]
//! wraps a fragment in a standalone document with the matching stylesheet, so
//! the result opens directly in a browser.

use std::fmt::Write;

use crate::diff::{ChangeTag, DiffTable};

fn tag_class(tag: ChangeTag) -> Option<&'static str> {
    match tag {
        ChangeTag::Unchanged => None,
        ChangeTag::Inserted => Some("add"),
        ChangeTag::Deleted => Some("remove"),
        ChangeTag::Modified => Some("modify"),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn open_tag(out: &mut String, tag: &str, class: Option<&str>) {
    match class {
        Some(class) => {
            let _ = write!(out, "<{} class=\"{}\">", tag, class);
        }
        None => {
            let _ = write!(out, "<{}>", tag);
        }
    }
}

/// Renders the diff as an HTML table fragment.
pub fn render_html(diff: &DiffTable) -> String {
    let mut out = String::from("<table class=\"highlighter\">\n");

    if diff.show_meta_row {
        out.push_str("<tr class=\"meta\"><td>!</td>");
        for col in &diff.columns {
            open_tag(&mut out, "td", tag_class(col.tag));
            out.push_str(col.tag.marker());
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("<tr class=\"header\"><th>@@</th>");
    for col in &diff.columns {
        open_tag(&mut out, "th", tag_class(col.tag));
        out.push_str(&escape(&col.name));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n");

    for row in &diff.rows {
        open_tag(&mut out, "tr", tag_class(row.tag));
        out.push_str("<td>");
        out.push_str(row.tag.marker());
        out.push_str("</td>");
        for cell in &row.cells {
            // Whole-row inserts and deletes color via the row class.
            let class = if row.tag == ChangeTag::Unchanged || row.tag == ChangeTag::Modified {
                tag_class(cell.tag)
            } else {
                None
            };
            open_tag(&mut out, "td", class);
            out.push_str(&escape(&cell.text));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</table>\n");
    out
}

const STYLE: &str = "\
.highlighter { border-collapse: collapse; font-family: sans-serif; }
.highlighter td, .highlighter th { border: 1px solid #2D4068; padding: 3px 7px 2px; }
.highlighter .header, .highlighter .meta { background-color: #aaf; }
.highlighter .add { background-color: #7fff7f; }
.highlighter .remove { background-color: #ff7f7f; }
.highlighter td.modify { background-color: #7f7fff; }
";

/// Wraps a rendered fragment in a complete standalone document.
pub fn complete_html(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, fragment
    )
}
