use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use table_diff::{complete_html, diff_tables, render_html, render_text, CompareFlags};

use crate::csv_io;
use crate::OutputFormat;

pub fn run(
    local_path: &str,
    remote_path: &str,
    format: OutputFormat,
    out: Option<&str>,
    ordered: bool,
    hide_unchanged: bool,
) -> Result<ExitCode> {
    let flags = build_flags(ordered, hide_unchanged)?;

    let local = csv_io::read_table(local_path)?;
    let remote = csv_io::read_table(remote_path)?;

    let diff = diff_tables(&local, &remote, &flags);
    let rendered = match format {
        OutputFormat::Text => render_text(&diff),
        OutputFormat::Html => complete_html(&render_html(&diff)),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&diff).context("Failed to serialize diff")?;
            json.push('\n');
            json
        }
    };

    match out {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output file: {}", path))?,
        None => io::stdout()
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?,
    }

    Ok(if diff.is_unchanged() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    })
}

pub fn build_flags(ordered: bool, hide_unchanged: bool) -> Result<CompareFlags> {
    CompareFlags::builder()
        .ordered(ordered)
        .show_unchanged(!hide_unchanged)
        .show_unchanged_columns(!hide_unchanged)
        .build()
        .context("Invalid comparison settings")
}
