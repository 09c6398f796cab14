//! Three-way merge: apply non-conflicting remote changes onto local.
//!
//! The merge walks the composed three-way alignment cell by cell. A conflict
//! exists exactly when local and remote both moved a cell away from the
//! ancestor to different values; conflicted cells keep the local value and
//! are reported as data, never as errors. Rows and columns added only in
//! remote are appended; rows and columns deleted only in remote are removed
//! unless local edited them, in which case the local edit survives and each
//! edited cell is reported as a conflict against the remote deletion.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::alignment::Alignment3;
use crate::config::CompareFlags;
use crate::table::Table;
use crate::value::CellValue;

/// Where a conflicting cell lives relative to the merge output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ConflictRow {
    /// Data row index in the merged table.
    Merged(usize),
    /// Ancestor row index for a row the merge output does not contain
    /// (deleted locally while remote edited it).
    Dropped(usize),
}

/// One cell where local and remote diverged incompatibly from the ancestor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictInfo {
    pub row: ConflictRow,
    pub column: String,
    pub ancestor: CellValue,
    pub local: CellValue,
    pub remote: CellValue,
}

/// Column of the merge output and where its values come from.
struct MergeColumn {
    name: String,
    ancestor: Option<usize>,
    local: Option<usize>,
    remote: Option<usize>,
}

/// Three-way merger; `created -> applied`, with [`Merger::apply`] idempotent.
pub struct Merger {
    ancestor: Table,
    local: Table,
    remote: Table,
    flags: CompareFlags,
    merged: Option<Table>,
    conflicts: Vec<ConflictInfo>,
}

impl Merger {
    pub fn new(ancestor: Table, local: Table, remote: Table, flags: CompareFlags) -> Merger {
        Merger {
            ancestor,
            local,
            remote,
            flags,
            merged: None,
            conflicts: Vec::new(),
        }
    }

    /// Runs the merge and returns the number of conflicts found. Calling it
    /// again returns the stored count without re-applying anything.
    pub fn apply(&mut self) -> usize {
        if self.merged.is_none() {
            self.run();
        }
        self.conflicts.len()
    }

    /// The merge result; `None` until [`Merger::apply`] has run.
    pub fn merged(&self) -> Option<&Table> {
        self.merged.as_ref()
    }

    /// Conflicts in output order (row-major); empty until applied.
    pub fn conflicts(&self) -> &[ConflictInfo] {
        &self.conflicts
    }

    fn run(&mut self) {
        let a3 = Alignment3::between(&self.ancestor, &self.local, &self.remote, &self.flags);

        // Row correspondences keyed by local row.
        let mut anc_of_local_row: FxHashMap<usize, usize> = FxHashMap::default();
        let mut remote_of_local_row: FxHashMap<usize, usize> = FxHashMap::default();
        for (ar, corr) in a3.ancestor_rows.iter().enumerate() {
            if let Some(l) = corr.local {
                anc_of_local_row.insert(l, ar);
                if let Some(r) = corr.remote {
                    remote_of_local_row.insert(l, r);
                }
            }
        }
        for &(l, r) in &a3.coalesced_insertions {
            remote_of_local_row.insert(l, r);
        }

        // Column correspondences keyed by local column.
        let mut anc_of_local_col: FxHashMap<usize, (usize, Option<usize>)> = FxHashMap::default();
        for (c, corr) in a3.ancestor_columns.iter().enumerate() {
            if let Some(lc) = corr.local {
                anc_of_local_col.insert(lc, (c, corr.remote));
            }
        }

        // Decide which local rows survive: a row deleted only in remote goes
        // away unless local edited it since the ancestor.
        let mut keep_row = vec![true; self.local.row_count()];
        for (ar, corr) in a3.ancestor_rows.iter().enumerate() {
            let (Some(l), None) = (corr.local, corr.remote) else {
                continue;
            };
            let locally_modified = anc_of_local_col.iter().any(|(&lc, &(c, _))| {
                !self.local.cell(l, lc).diff_eq(self.ancestor.cell(ar, c))
            });
            if !locally_modified {
                keep_row[l] = false;
            }
        }

        let mut final_index = vec![usize::MAX; self.local.row_count()];
        let mut next = 0usize;
        for l in 0..self.local.row_count() {
            if keep_row[l] {
                final_index[l] = next;
                next += 1;
            }
        }

        // Decide which local columns survive, mirroring the row rule.
        let local_only_rows_with_value = |lc: usize| {
            a3.local_only_rows
                .iter()
                .any(|&l| !self.local.cell(l, lc).is_blank())
        };
        let mut columns: Vec<MergeColumn> = Vec::new();
        for lc in 0..self.local.column_count() {
            let name = self.local.column_names()[lc].clone();
            match anc_of_local_col.get(&lc).copied() {
                Some((c, Some(rc))) => columns.push(MergeColumn {
                    name,
                    ancestor: Some(c),
                    local: Some(lc),
                    remote: Some(rc),
                }),
                Some((c, None)) => {
                    let locally_modified = a3.ancestor_rows.iter().enumerate().any(|(ar, corr)| {
                        corr.local.is_some_and(|l| {
                            !self.local.cell(l, lc).diff_eq(self.ancestor.cell(ar, c))
                        })
                    });
                    if locally_modified || local_only_rows_with_value(lc) {
                        columns.push(MergeColumn {
                            name,
                            ancestor: Some(c),
                            local: Some(lc),
                            remote: None,
                        });
                    }
                }
                None => {
                    // Added locally; pair with an identically named
                    // remote-only column so both-side additions coalesce.
                    let remote = self
                        .remote
                        .column_index(&name)
                        .filter(|rc| a3.remote_only_columns.contains(rc));
                    columns.push(MergeColumn {
                        name,
                        ancestor: None,
                        local: Some(lc),
                        remote,
                    });
                }
            }
        }
        for &rc in &a3.remote_only_columns {
            let claimed = columns.iter().any(|col| col.remote == Some(rc));
            if !claimed {
                columns.push(MergeColumn {
                    name: self.remote.column_names()[rc].clone(),
                    ancestor: None,
                    local: None,
                    remote: Some(rc),
                });
            }
        }

        let mut conflicts: Vec<(usize, usize, ConflictInfo)> = Vec::new();
        let mut rows: Vec<Vec<CellValue>> = Vec::new();

        for l in 0..self.local.row_count() {
            if !keep_row[l] {
                continue;
            }
            let out_row = final_index[l];
            let ar = anc_of_local_row.get(&l).copied();
            let r = remote_of_local_row.get(&l).copied();

            let mut cells: Vec<CellValue> = Vec::with_capacity(columns.len());
            for (col_idx, col) in columns.iter().enumerate() {
                let value = match (col.local, col.ancestor, col.remote) {
                    // Ordinary three-way cell.
                    (Some(lc), Some(c), Some(rc)) => {
                        let lv = self.local.cell(l, lc);
                        match (ar, r) {
                            (Some(ar), Some(r)) => {
                                let av = self.ancestor.cell(ar, c);
                                let rv = self.remote.cell(r, rc);
                                let local_changed = !lv.diff_eq(av);
                                let remote_changed = !rv.diff_eq(av);
                                if remote_changed && !local_changed {
                                    rv.clone()
                                } else {
                                    if local_changed && remote_changed && !lv.diff_eq(rv) {
                                        conflicts.push((
                                            out_row,
                                            col_idx,
                                            ConflictInfo {
                                                row: ConflictRow::Merged(out_row),
                                                column: col.name.clone(),
                                                ancestor: av.clone(),
                                                local: lv.clone(),
                                                remote: rv.clone(),
                                            },
                                        ));
                                    }
                                    lv.clone()
                                }
                            }
                            _ => lv.clone(),
                        }
                    }
                    // Column deleted in remote but kept for local edits.
                    (Some(lc), Some(c), None) => {
                        let lv = self.local.cell(l, lc);
                        if let Some(ar) = ar {
                            let av = self.ancestor.cell(ar, c);
                            if !lv.diff_eq(av) {
                                conflicts.push((
                                    out_row,
                                    col_idx,
                                    ConflictInfo {
                                        row: ConflictRow::Merged(out_row),
                                        column: col.name.clone(),
                                        ancestor: av.clone(),
                                        local: lv.clone(),
                                        remote: CellValue::Empty,
                                    },
                                ));
                            }
                        }
                        lv.clone()
                    }
                    // Column only local (possibly coalesced with remote).
                    (Some(lc), None, _) => self.local.cell(l, lc).clone(),
                    // Column added only in remote: fill from the remote row
                    // when this row exists there.
                    (None, _, Some(rc)) => match r {
                        Some(r) => self.remote.cell(r, rc).clone(),
                        None => CellValue::Empty,
                    },
                    (None, _, None) => CellValue::Empty,
                };
                cells.push(value);
            }
            rows.push(cells);

            // Remote deleted this row; local edits above survived, so every
            // locally edited cell conflicts against the deletion.
            if let (Some(ar), None) = (ar, r) {
                if a3.ancestor_rows[ar].remote.is_none() {
                    for (col_idx, col) in columns.iter().enumerate() {
                        let (Some(lc), Some(c)) = (col.local, col.ancestor) else {
                            continue;
                        };
                        if col.remote.is_some() {
                            let lv = self.local.cell(l, lc);
                            let av = self.ancestor.cell(ar, c);
                            if !lv.diff_eq(av) {
                                conflicts.push((
                                    out_row,
                                    col_idx,
                                    ConflictInfo {
                                        row: ConflictRow::Merged(out_row),
                                        column: col.name.clone(),
                                        ancestor: av.clone(),
                                        local: lv.clone(),
                                        remote: CellValue::Empty,
                                    },
                                ));
                            }
                        }
                    }
                }
            }
        }

        // Rows deleted locally while remote edited them: the deletion wins,
        // the edit is surfaced.
        for (ar, corr) in a3.ancestor_rows.iter().enumerate() {
            let (None, Some(r)) = (corr.local, corr.remote) else {
                continue;
            };
            for (c, col_corr) in a3.ancestor_columns.iter().enumerate() {
                let Some(rc) = col_corr.remote else {
                    continue;
                };
                let av = self.ancestor.cell(ar, c);
                let rv = self.remote.cell(r, rc);
                if !rv.diff_eq(av) {
                    conflicts.push((
                        usize::MAX,
                        c,
                        ConflictInfo {
                            row: ConflictRow::Dropped(ar),
                            column: self.ancestor.column_names()[c].clone(),
                            ancestor: av.clone(),
                            local: CellValue::Empty,
                            remote: rv.clone(),
                        },
                    ));
                }
            }
        }

        // Rows added only in remote are appended (coalesced ones already
        // exist in local).
        let coalesced_remote: Vec<usize> =
            a3.coalesced_insertions.iter().map(|&(_, r)| r).collect();
        for &r in &a3.remote_only_rows {
            if coalesced_remote.contains(&r) {
                continue;
            }
            let cells = columns
                .iter()
                .map(|col| match col.remote {
                    Some(rc) => self.remote.cell(r, rc).clone(),
                    None => CellValue::Empty,
                })
                .collect();
            rows.push(cells);
        }

        conflicts.sort_by(|(ra, ca, _), (rb, cb, _)| ra.cmp(rb).then(ca.cmp(cb)));

        let header = columns.into_iter().map(|col| col.name).collect();
        self.merged = Some(Table::from_parts(header, rows));
        self.conflicts = conflicts.into_iter().map(|(_, _, info)| info).collect();
    }
}
