use anyhow::{Context, Result};
use std::fs;
use std::process::ExitCode;
use table_diff::{
    complete_html, diff_tables3, render_html, CompareFlags, ConflictRow, Merger,
};

use crate::csv_io;

pub fn run(
    ancestor_path: &str,
    local_path: &str,
    remote_path: &str,
    out: &str,
    diff_out: Option<&str>,
    conflicts_json: Option<&str>,
    ordered: bool,
) -> Result<ExitCode> {
    let flags = CompareFlags::builder()
        .ordered(ordered)
        .build()
        .context("Invalid comparison settings")?;

    let ancestor = csv_io::read_table(ancestor_path)?;
    let local = csv_io::read_table(local_path)?;
    let remote = csv_io::read_table(remote_path)?;

    if let Some(path) = diff_out {
        let diff = diff_tables3(&ancestor, &local, &remote, &flags);
        let page = complete_html(&render_html(&diff));
        fs::write(path, page)
            .with_context(|| format!("Failed to write diff output file: {}", path))?;
    }

    let mut merger = Merger::new(ancestor, local, remote, flags);
    let conflict_count = merger.apply();

    let merged = merger
        .merged()
        .context("Merge produced no output table")?;
    csv_io::write_table(out, merged)?;

    for conflict in merger.conflicts() {
        let location = match conflict.row {
            ConflictRow::Merged(idx) => format!("merged row {}", idx),
            ConflictRow::Dropped(idx) => format!("dropped ancestor row {}", idx),
        };
        eprintln!(
            "Conflict at {}, column \"{}\": ancestor {:?}, local {:?}, remote {:?}",
            location,
            conflict.column,
            conflict.ancestor.to_string(),
            conflict.local.to_string(),
            conflict.remote.to_string(),
        );
    }

    if let Some(path) = conflicts_json {
        let mut json = serde_json::to_string_pretty(merger.conflicts())
            .context("Failed to serialize conflicts")?;
        json.push('\n');
        fs::write(path, json)
            .with_context(|| format!("Failed to write conflicts file: {}", path))?;
    }

    Ok(if conflict_count == 0 {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    })
}
