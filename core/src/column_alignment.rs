//! Column alignment by exact header-name match.
//!
//! Columns correspond when their header names are equal; a name with no
//! counterpart becomes a deleted+inserted pair, never an error. Renames are
//! handled upstream by the column pre-matching remap, not here.

use rustc_hash::FxHashMap;

use crate::table::Table;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAlignment {
    /// `(col_idx_a, col_idx_b)` pairs, in A's column order.
    pub matched: Vec<(usize, usize)>,
    /// Columns present only in B, in B's column order.
    pub inserted: Vec<usize>,
    /// Columns present only in A, in A's column order.
    pub deleted: Vec<usize>,
}

impl ColumnAlignment {
    /// Index in B matched to column `a_idx` of A.
    pub fn matched_in_b(&self, a_idx: usize) -> Option<usize> {
        self.matched
            .iter()
            .find(|(a, _)| *a == a_idx)
            .map(|(_, b)| *b)
    }
}

pub(crate) fn align_columns(a: &Table, b: &Table) -> ColumnAlignment {
    // For duplicate header names, occurrences pair up left to right.
    let mut b_by_name: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (idx, name) in b.column_names().iter().enumerate().rev() {
        b_by_name.entry(name.as_str()).or_default().push(idx);
    }

    let mut matched = Vec::new();
    let mut deleted = Vec::new();
    let mut taken_b = vec![false; b.column_count()];

    for (a_idx, name) in a.column_names().iter().enumerate() {
        match b_by_name.get_mut(name.as_str()).and_then(|v| v.pop()) {
            Some(b_idx) => {
                matched.push((a_idx, b_idx));
                taken_b[b_idx] = true;
            }
            None => deleted.push(a_idx),
        }
    }

    let inserted = (0..b.column_count()).filter(|&i| !taken_b[i]).collect();

    ColumnAlignment {
        matched,
        inserted,
        deleted,
    }
}
