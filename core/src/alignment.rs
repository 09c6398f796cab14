//! Public alignment API: two-way and ancestor-anchored three-way.
//!
//! A three-way alignment is two independent two-way alignments (ancestor to
//! local, ancestor to remote) composed through the ancestor's row and column
//! identity. Rows inserted on both sides coalesce only when their content
//! matches exactly over the columns local and remote share; otherwise they
//! stay two separate insertions.

use crate::column_alignment::{align_columns, ColumnAlignment};
use crate::config::CompareFlags;
use crate::row_alignment::{align_rows, fingerprints, RowAlignment};
use crate::table::Table;

/// Row and column correspondence between two tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub columns: ColumnAlignment,
    pub rows: RowAlignment,
}

impl Alignment {
    /// Aligns columns by name, then rows by fingerprint. A zero-row side
    /// produces a degenerate alignment with everything inserted or deleted.
    pub fn between(a: &Table, b: &Table, flags: &CompareFlags) -> Alignment {
        let columns = align_columns(a, b);
        let rows = align_rows(a, b, &columns, flags);
        Alignment { columns, rows }
    }
}

/// Where an ancestor row or column ended up in local and remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Correspondence {
    pub local: Option<usize>,
    pub remote: Option<usize>,
}

/// Composed correspondence across ancestor, local, and remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment3 {
    /// One entry per ancestor data row.
    pub ancestor_rows: Vec<Correspondence>,
    /// One entry per ancestor column.
    pub ancestor_columns: Vec<Correspondence>,
    /// Local rows with no ancestor counterpart, ascending.
    pub local_only_rows: Vec<usize>,
    /// Remote rows with no ancestor counterpart, ascending.
    pub remote_only_rows: Vec<usize>,
    /// `(local_row, remote_row)` insertions whose content matches exactly;
    /// these are one logical insertion, not a conflict and not a duplicate.
    pub coalesced_insertions: Vec<(usize, usize)>,
    /// Local columns with no ancestor counterpart, ascending.
    pub local_only_columns: Vec<usize>,
    /// Remote columns with no ancestor counterpart, ascending.
    pub remote_only_columns: Vec<usize>,
}

impl Alignment3 {
    pub fn between(
        ancestor: &Table,
        local: &Table,
        remote: &Table,
        flags: &CompareFlags,
    ) -> Alignment3 {
        let to_local = Alignment::between(ancestor, local, flags);
        let to_remote = Alignment::between(ancestor, remote, flags);

        let mut ancestor_rows = vec![Correspondence::default(); ancestor.row_count()];
        for &(anc, loc) in &to_local.rows.matched {
            ancestor_rows[anc].local = Some(loc);
        }
        for &(anc, rem) in &to_remote.rows.matched {
            ancestor_rows[anc].remote = Some(rem);
        }

        let mut ancestor_columns = vec![Correspondence::default(); ancestor.column_count()];
        for &(anc, loc) in &to_local.columns.matched {
            ancestor_columns[anc].local = Some(loc);
        }
        for &(anc, rem) in &to_remote.columns.matched {
            ancestor_columns[anc].remote = Some(rem);
        }

        let local_only_rows = to_local.rows.inserted.clone();
        let remote_only_rows = to_remote.rows.inserted.clone();
        let coalesced_insertions =
            coalesce_insertions(local, remote, &local_only_rows, &remote_only_rows);

        Alignment3 {
            ancestor_rows,
            ancestor_columns,
            local_only_rows,
            remote_only_rows,
            coalesced_insertions,
            local_only_columns: to_local.columns.inserted,
            remote_only_columns: to_remote.columns.inserted,
        }
    }
}

/// Pairs local-only and remote-only rows whose fingerprints match exactly
/// over the columns local and remote share by name, in original order.
fn coalesce_insertions(
    local: &Table,
    remote: &Table,
    local_only: &[usize],
    remote_only: &[usize],
) -> Vec<(usize, usize)> {
    if local_only.is_empty() || remote_only.is_empty() {
        return Vec::new();
    }

    let shared = align_columns(local, remote);
    let l_cols: Vec<usize> = shared.matched.iter().map(|&(l, _)| l).collect();
    let r_cols: Vec<usize> = shared.matched.iter().map(|&(_, r)| r).collect();
    if l_cols.is_empty() {
        return Vec::new();
    }

    let fp_local = fingerprints(local, &l_cols);
    let fp_remote = fingerprints(remote, &r_cols);

    let mut pairs = Vec::new();
    let mut remote_unclaimed: Vec<usize> = remote_only.to_vec();
    for &l in local_only {
        let slot = remote_unclaimed
            .iter()
            .position(|&r| fp_remote[r] == fp_local[l]);
        if let Some(pos) = slot {
            pairs.push((l, remote_unclaimed.remove(pos)));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::text(*v)).collect())
                .collect(),
        )
        .expect("well-shaped test table")
    }

    #[test]
    fn composes_row_identity_through_ancestor() {
        let ancestor = table(&[&["id", "name"], &["1", "Alice"], &["2", "Bob"]]);
        let local = table(&[&["id", "name"], &["1", "Alicia"], &["2", "Bob"]]);
        let remote = table(&[&["id", "name"], &["2", "Bob"], &["3", "Cory"]]);

        let a3 = Alignment3::between(&ancestor, &local, &remote, &CompareFlags::default());
        assert_eq!(a3.ancestor_rows.len(), 2);
        assert_eq!(a3.ancestor_rows[0].local, Some(0));
        assert_eq!(a3.ancestor_rows[0].remote, None);
        assert_eq!(a3.ancestor_rows[1].local, Some(1));
        assert_eq!(a3.ancestor_rows[1].remote, Some(0));
        assert_eq!(a3.remote_only_rows, vec![1]);
        assert!(a3.local_only_rows.is_empty());
    }

    #[test]
    fn identical_insertions_coalesce() {
        let ancestor = table(&[&["id"], &["1"]]);
        let local = table(&[&["id"], &["1"], &["9"]]);
        let remote = table(&[&["id"], &["1"], &["9"]]);

        let a3 = Alignment3::between(&ancestor, &local, &remote, &CompareFlags::default());
        assert_eq!(a3.local_only_rows, vec![1]);
        assert_eq!(a3.remote_only_rows, vec![1]);
        assert_eq!(a3.coalesced_insertions, vec![(1, 1)]);
    }

    #[test]
    fn different_insertions_stay_separate() {
        let ancestor = table(&[&["id"], &["1"]]);
        let local = table(&[&["id"], &["1"], &["8"]]);
        let remote = table(&[&["id"], &["1"], &["9"]]);

        let a3 = Alignment3::between(&ancestor, &local, &remote, &CompareFlags::default());
        assert!(a3.coalesced_insertions.is_empty());
    }

    #[test]
    fn column_changes_compose_through_ancestor() {
        let ancestor = table(&[&["id", "name", "phone"]]);
        let local = table(&[&["id", "name", "phone", "city"]]);
        let remote = table(&[&["id", "name"]]);

        let a3 = Alignment3::between(&ancestor, &local, &remote, &CompareFlags::default());
        assert_eq!(a3.ancestor_columns[2].local, Some(2));
        assert_eq!(a3.ancestor_columns[2].remote, None);
        assert_eq!(a3.local_only_columns, vec![3]);
        assert!(a3.remote_only_columns.is_empty());
    }
}
