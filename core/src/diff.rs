//! Diff table construction (highlighting).
//!
//! Consumes an alignment and produces a [`DiffTable`]: every cell, row, and
//! column carries a [`ChangeTag`], and modified cells carry a composite
//! `old->new` display text. The `show_unchanged*` flags filter what the
//! output materializes; they never influence the alignment itself.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, Alignment3};
use crate::config::CompareFlags;
use crate::table::Table;
use crate::value::CellValue;

/// Change classification for a cell, row, or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTag {
    Unchanged,
    Inserted,
    Deleted,
    Modified,
}

impl ChangeTag {
    /// The action marker used by the renderers.
    pub fn marker(&self) -> &'static str {
        match self {
            ChangeTag::Unchanged => "",
            ChangeTag::Inserted => "+++",
            ChangeTag::Deleted => "---",
            ChangeTag::Modified => "->",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffCell {
    pub text: String,
    pub tag: ChangeTag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRow {
    pub tag: ChangeTag,
    pub cells: Vec<DiffCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffColumn {
    pub name: String,
    pub tag: ChangeTag,
}

/// Change counts, computed before any display filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub row_inserts: usize,
    pub row_deletes: usize,
    pub row_updates: usize,
    pub rows_unchanged: usize,
    pub column_inserts: usize,
    pub column_deletes: usize,
    pub column_updates: usize,
    pub cell_updates: usize,
}

impl DiffSummary {
    pub fn has_changes(&self) -> bool {
        self.row_inserts
            + self.row_deletes
            + self.row_updates
            + self.column_inserts
            + self.column_deletes
            + self.cell_updates
            > 0
    }
}

/// The highlighted output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffTable {
    pub columns: Vec<DiffColumn>,
    pub rows: Vec<DiffRow>,
    /// Whether renderers should emit the column-status metadata row.
    pub show_meta_row: bool,
    pub summary: DiffSummary,
}

impl DiffTable {
    pub fn is_unchanged(&self) -> bool {
        !self.summary.has_changes()
    }
}

fn composite(old: &CellValue, new: &CellValue) -> String {
    format!("{}->{}", old, new)
}

/// Output column plan: which side(s) back each column of the diff table.
struct OutColumn {
    name: String,
    a: Option<usize>,
    b: Option<usize>,
}

/// Computes the alignment and highlights it in one step.
pub fn diff_tables(a: &Table, b: &Table, flags: &CompareFlags) -> DiffTable {
    let alignment = Alignment::between(a, b, flags);
    diff_aligned(a, b, &alignment, flags)
}

/// Highlights a previously computed alignment.
pub fn diff_aligned(a: &Table, b: &Table, alignment: &Alignment, flags: &CompareFlags) -> DiffTable {
    // Matched and deleted columns keep A's order; inserted columns follow in
    // B's order.
    let mut out_columns: Vec<OutColumn> = Vec::new();
    for a_idx in 0..a.column_count() {
        out_columns.push(OutColumn {
            name: a.column_names()[a_idx].clone(),
            a: Some(a_idx),
            b: alignment.columns.matched_in_b(a_idx),
        });
    }
    for &b_idx in &alignment.columns.inserted {
        out_columns.push(OutColumn {
            name: b.column_names()[b_idx].clone(),
            a: None,
            b: Some(b_idx),
        });
    }

    let mut col_modified = vec![false; out_columns.len()];
    let mut rows: Vec<DiffRow> = Vec::new();
    let mut summary = DiffSummary::default();

    let b_to_a: FxHashMap<usize, usize> = alignment
        .rows
        .matched
        .iter()
        .map(|&(ar, br)| (br, ar))
        .collect();
    // Deleted A rows interleave before the matched row that follows them in A.
    let mut pending_deletes = alignment.rows.deleted.iter().copied().peekable();

    for b_idx in 0..b.row_count() {
        match b_to_a.get(&b_idx).copied() {
            Some(a_idx) => {
                while let Some(&del_idx) = pending_deletes.peek() {
                    if del_idx >= a_idx {
                        break;
                    }
                    pending_deletes.next();
                    rows.push(deleted_row(a, del_idx, &out_columns));
                    summary.row_deletes += 1;
                }

                let mut row_modified = false;
                let cells: Vec<DiffCell> = out_columns
                    .iter()
                    .enumerate()
                    .map(|(out_idx, col)| match (col.a, col.b) {
                        (Some(ac), Some(bc)) => {
                            let va = a.cell(a_idx, ac);
                            let vb = b.cell(b_idx, bc);
                            if va.diff_eq(vb) {
                                DiffCell {
                                    text: va.to_string(),
                                    tag: ChangeTag::Unchanged,
                                }
                            } else {
                                row_modified = true;
                                col_modified[out_idx] = true;
                                summary.cell_updates += 1;
                                DiffCell {
                                    text: composite(va, vb),
                                    tag: ChangeTag::Modified,
                                }
                            }
                        }
                        (Some(ac), None) => DiffCell {
                            text: a.cell(a_idx, ac).to_string(),
                            tag: ChangeTag::Deleted,
                        },
                        (None, Some(bc)) => DiffCell {
                            text: b.cell(b_idx, bc).to_string(),
                            tag: ChangeTag::Inserted,
                        },
                        (None, None) => unreachable!("output column backed by neither side"),
                    })
                    .collect();

                let tag = if row_modified {
                    summary.row_updates += 1;
                    ChangeTag::Modified
                } else {
                    summary.rows_unchanged += 1;
                    ChangeTag::Unchanged
                };
                rows.push(DiffRow { tag, cells });
            }
            None => {
                let cells = out_columns
                    .iter()
                    .map(|col| DiffCell {
                        text: col
                            .b
                            .map(|c| b.cell(b_idx, c).to_string())
                            .unwrap_or_default(),
                        tag: ChangeTag::Inserted,
                    })
                    .collect();
                rows.push(DiffRow {
                    tag: ChangeTag::Inserted,
                    cells,
                });
                summary.row_inserts += 1;
            }
        }
    }
    for del_idx in pending_deletes {
        rows.push(deleted_row(a, del_idx, &out_columns));
        summary.row_deletes += 1;
    }

    let columns: Vec<DiffColumn> = out_columns
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let tag = match (col.a, col.b) {
                (Some(_), Some(_)) if col_modified[idx] => {
                    summary.column_updates += 1;
                    ChangeTag::Modified
                }
                (Some(_), Some(_)) => ChangeTag::Unchanged,
                (Some(_), None) => {
                    summary.column_deletes += 1;
                    ChangeTag::Deleted
                }
                (None, _) => {
                    summary.column_inserts += 1;
                    ChangeTag::Inserted
                }
            };
            DiffColumn {
                name: col.name.clone(),
                tag,
            }
        })
        .collect();

    finish(columns, rows, summary, flags)
}

fn deleted_row(a: &Table, a_idx: usize, out_columns: &[OutColumn]) -> DiffRow {
    let cells = out_columns
        .iter()
        .map(|col| DiffCell {
            text: col
                .a
                .map(|c| a.cell(a_idx, c).to_string())
                .unwrap_or_default(),
            tag: ChangeTag::Deleted,
        })
        .collect();
    DiffRow {
        tag: ChangeTag::Deleted,
        cells,
    }
}

/// Applies the display filters and assembles the final table.
fn finish(
    mut columns: Vec<DiffColumn>,
    mut rows: Vec<DiffRow>,
    summary: DiffSummary,
    flags: &CompareFlags,
) -> DiffTable {
    if !flags.show_unchanged {
        rows.retain(|row| row.tag != ChangeTag::Unchanged);
    }

    if !flags.show_unchanged_columns {
        let keep: Vec<bool> = columns
            .iter()
            .map(|col| col.tag != ChangeTag::Unchanged)
            .collect();
        let mut keep_iter = keep.iter();
        columns.retain(|_| *keep_iter.next().unwrap_or(&true));
        for row in rows.iter_mut() {
            let mut keep_iter = keep.iter();
            row.cells.retain(|_| *keep_iter.next().unwrap_or(&true));
        }
    }

    let schema_changed = columns.iter().any(|col| col.tag != ChangeTag::Unchanged);
    DiffTable {
        columns,
        rows,
        show_meta_row: flags.show_unchanged_meta || schema_changed,
        summary,
    }
}

/// Three-way highlight showing how local and remote each moved away from the
/// ancestor. Cells where both sides changed incompatibly display
/// `ancestor->local///remote`.
pub fn diff_tables3(
    ancestor: &Table,
    local: &Table,
    remote: &Table,
    flags: &CompareFlags,
) -> DiffTable {
    let a3 = Alignment3::between(ancestor, local, remote, flags);

    // Ancestor columns keep their order; columns new in local come next,
    // then columns new in remote that local does not already carry by name.
    let mut out_columns: Vec<(String, Option<usize>, Option<usize>, Option<usize>)> = Vec::new();
    for (anc_idx, corr) in a3.ancestor_columns.iter().enumerate() {
        out_columns.push((
            ancestor.column_names()[anc_idx].clone(),
            Some(anc_idx),
            corr.local,
            corr.remote,
        ));
    }
    for &l_idx in &a3.local_only_columns {
        let name = local.column_names()[l_idx].clone();
        let remote_idx = remote
            .column_index(&name)
            .filter(|r| a3.remote_only_columns.contains(r));
        out_columns.push((name, None, Some(l_idx), remote_idx));
    }
    for &r_idx in &a3.remote_only_columns {
        let name = remote.column_names()[r_idx].clone();
        let claimed = out_columns
            .iter()
            .any(|(_, _, _, rc)| *rc == Some(r_idx));
        if !claimed {
            out_columns.push((name, None, None, Some(r_idx)));
        }
    }

    let mut rows: Vec<DiffRow> = Vec::new();
    let mut summary = DiffSummary::default();
    let mut col_modified = vec![false; out_columns.len()];

    for (anc_idx, corr) in a3.ancestor_rows.iter().enumerate() {
        match (corr.local, corr.remote) {
            (Some(l), Some(r)) => {
                let mut row_modified = false;
                let cells: Vec<DiffCell> = out_columns
                    .iter()
                    .enumerate()
                    .map(|(out_idx, &(_, ac, lc, rc))| {
                        let anc_val = ac.map(|c| ancestor.cell(anc_idx, c));
                        let loc_val = lc.map(|c| local.cell(l, c));
                        let rem_val = rc.map(|c| remote.cell(r, c));
                        let cell = three_way_cell(anc_val, loc_val, rem_val);
                        if cell.tag == ChangeTag::Modified {
                            row_modified = true;
                            col_modified[out_idx] = true;
                            summary.cell_updates += 1;
                        }
                        cell
                    })
                    .collect();
                let tag = if row_modified {
                    summary.row_updates += 1;
                    ChangeTag::Modified
                } else {
                    summary.rows_unchanged += 1;
                    ChangeTag::Unchanged
                };
                rows.push(DiffRow { tag, cells });
            }
            _ => {
                // Deleted in at least one side; display the ancestor state.
                let cells = out_columns
                    .iter()
                    .map(|&(_, ac, _, _)| DiffCell {
                        text: ac
                            .map(|c| ancestor.cell(anc_idx, c).to_string())
                            .unwrap_or_default(),
                        tag: ChangeTag::Deleted,
                    })
                    .collect();
                rows.push(DiffRow {
                    tag: ChangeTag::Deleted,
                    cells,
                });
                summary.row_deletes += 1;
            }
        }
    }

    for &l_idx in &a3.local_only_rows {
        rows.push(inserted_row3(&out_columns, |lc, _| lc.map(|c| local.cell(l_idx, c))));
        summary.row_inserts += 1;
    }
    let coalesced_remote: Vec<usize> = a3
        .coalesced_insertions
        .iter()
        .map(|&(_, r)| r)
        .collect();
    for &r_idx in &a3.remote_only_rows {
        if coalesced_remote.contains(&r_idx) {
            continue;
        }
        rows.push(inserted_row3(&out_columns, |_, rc| rc.map(|c| remote.cell(r_idx, c))));
        summary.row_inserts += 1;
    }

    let columns: Vec<DiffColumn> = out_columns
        .iter()
        .enumerate()
        .map(|(idx, (name, ac, lc, rc))| {
            let tag = match (ac, lc, rc) {
                (Some(_), Some(_), Some(_)) if col_modified[idx] => {
                    summary.column_updates += 1;
                    ChangeTag::Modified
                }
                (Some(_), Some(_), Some(_)) => ChangeTag::Unchanged,
                (Some(_), _, _) => {
                    summary.column_deletes += 1;
                    ChangeTag::Deleted
                }
                (None, _, _) => {
                    summary.column_inserts += 1;
                    ChangeTag::Inserted
                }
            };
            DiffColumn {
                name: name.clone(),
                tag,
            }
        })
        .collect();

    finish(columns, rows, summary, flags)
}

fn three_way_cell(
    ancestor: Option<&CellValue>,
    local: Option<&CellValue>,
    remote: Option<&CellValue>,
) -> DiffCell {
    let empty = CellValue::Empty;
    let anc = ancestor.unwrap_or(&empty);
    let loc = local.unwrap_or(&empty);
    let rem = remote.unwrap_or(&empty);

    let local_changed = !loc.diff_eq(anc);
    let remote_changed = !rem.diff_eq(anc);

    match (local_changed, remote_changed) {
        (false, false) => DiffCell {
            text: anc.to_string(),
            tag: ChangeTag::Unchanged,
        },
        (true, false) => DiffCell {
            text: composite(anc, loc),
            tag: ChangeTag::Modified,
        },
        (false, true) => DiffCell {
            text: composite(anc, rem),
            tag: ChangeTag::Modified,
        },
        (true, true) if loc.diff_eq(rem) => DiffCell {
            text: composite(anc, loc),
            tag: ChangeTag::Modified,
        },
        (true, true) => DiffCell {
            text: format!("{}->{}///{}", anc, loc, rem),
            tag: ChangeTag::Modified,
        },
    }
}

fn inserted_row3<'a>(
    out_columns: &[(String, Option<usize>, Option<usize>, Option<usize>)],
    value: impl Fn(Option<usize>, Option<usize>) -> Option<&'a CellValue>,
) -> DiffRow {
    let cells = out_columns
        .iter()
        .map(|&(_, _, lc, rc)| DiffCell {
            text: value(lc, rc).map(|v| v.to_string()).unwrap_or_default(),
            tag: ChangeTag::Inserted,
        })
        .collect();
    DiffRow {
        tag: ChangeTag::Inserted,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::text(*v)).collect())
                .collect(),
        )
        .expect("well-shaped test table")
    }

    #[test]
    fn self_diff_is_all_unchanged() {
        let t = table(&[&["id", "name"], &["1", "a"], &["2", "b"]]);
        let diff = diff_tables(&t, &t, &CompareFlags::default());
        assert!(diff.is_unchanged());
        assert!(diff
            .rows
            .iter()
            .all(|row| row.tag == ChangeTag::Unchanged));
        assert!(diff
            .columns
            .iter()
            .all(|col| col.tag == ChangeTag::Unchanged));
    }

    #[test]
    fn modified_cell_carries_composite_text() {
        let a = table(&[&["id", "name"], &["1", "Alice"]]);
        let b = table(&[&["id", "name"], &["1", "Alicia"]]);
        let diff = diff_tables(&a, &b, &CompareFlags::default());
        assert_eq!(diff.rows.len(), 1);
        assert_eq!(diff.rows[0].tag, ChangeTag::Modified);
        assert_eq!(diff.rows[0].cells[1].text, "Alice->Alicia");
        assert_eq!(diff.rows[0].cells[1].tag, ChangeTag::Modified);
        assert_eq!(diff.summary.cell_updates, 1);
    }

    #[test]
    fn inserted_and_deleted_rows_are_tagged_wholesale() {
        let a = table(&[&["id"], &["1"], &["2"]]);
        let b = table(&[&["id"], &["2"], &["3"]]);
        let diff = diff_tables(&a, &b, &CompareFlags::default());
        let tags: Vec<ChangeTag> = diff.rows.iter().map(|r| r.tag).collect();
        assert!(tags.contains(&ChangeTag::Inserted));
        assert!(tags.contains(&ChangeTag::Deleted));
        assert_eq!(diff.summary.row_inserts, 1);
        assert_eq!(diff.summary.row_deletes, 1);
    }

    #[test]
    fn hide_unchanged_rows_filters_output_only() {
        let a = table(&[&["id"], &["1"], &["2"]]);
        let b = table(&[&["id"], &["1"], &["2"], &["3"]]);
        let flags = CompareFlags::builder().show_unchanged(false).build().unwrap();
        let diff = diff_tables(&a, &b, &flags);
        assert_eq!(diff.rows.len(), 1);
        assert_eq!(diff.rows[0].tag, ChangeTag::Inserted);
        // Summary still counts the hidden rows.
        assert_eq!(diff.summary.rows_unchanged, 2);
    }

    #[test]
    fn hide_unchanged_columns_drops_cells_too() {
        let a = table(&[&["id", "name"], &["1", "x"]]);
        let b = table(&[&["id", "name"], &["1", "y"]]);
        let flags = CompareFlags::builder()
            .show_unchanged_columns(false)
            .build()
            .unwrap();
        let diff = diff_tables(&a, &b, &flags);
        assert_eq!(diff.columns.len(), 1);
        assert_eq!(diff.columns[0].name, "name");
        assert_eq!(diff.rows[0].cells.len(), 1);
    }

    #[test]
    fn unmatched_column_shows_as_delete_insert_pair() {
        let a = table(&[&["id", "old"], &["1", "x"]]);
        let b = table(&[&["id", "new"], &["1", "y"]]);
        let diff = diff_tables(&a, &b, &CompareFlags::default());
        let tags: Vec<(String, ChangeTag)> = diff
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.tag))
            .collect();
        assert!(tags.contains(&("old".to_string(), ChangeTag::Deleted)));
        assert!(tags.contains(&("new".to_string(), ChangeTag::Inserted)));
    }

    #[test]
    fn empty_left_table_marks_everything_inserted() {
        let a = table(&[&["id"]]);
        let b = table(&[&["id"], &["1"], &["2"]]);
        let diff = diff_tables(&a, &b, &CompareFlags::default());
        assert_eq!(diff.rows.len(), 2);
        assert!(diff.rows.iter().all(|r| r.tag == ChangeTag::Inserted));
    }

    #[test]
    fn three_way_conflict_cell_shows_both_sides() {
        let ancestor = table(&[&["id", "k"], &["1", "x"]]);
        let local = table(&[&["id", "k"], &["1", "y"]]);
        let remote = table(&[&["id", "k"], &["1", "z"]]);
        let diff = diff_tables3(&ancestor, &local, &remote, &CompareFlags::default());
        assert_eq!(diff.rows.len(), 1);
        assert_eq!(diff.rows[0].cells[1].text, "x->y///z");
    }

    #[test]
    fn three_way_shows_ancestor_state_for_clean_changes() {
        let ancestor = table(&[&["id", "name"], &["1", "Alice"]]);
        let local = table(&[&["id", "name"], &["1", "Alicia"]]);
        let remote = table(&[&["id", "name"], &["1", "Alice"], &["2", "Bob"]]);
        let diff = diff_tables3(&ancestor, &local, &remote, &CompareFlags::default());
        assert_eq!(diff.rows[0].cells[1].text, "Alice->Alicia");
        assert_eq!(diff.rows[1].tag, ChangeTag::Inserted);
        assert_eq!(diff.rows[1].cells[1].text, "Bob");
    }
}
