//! Fingerprint-based row alignment.
//!
//! Rows are keyed by a fingerprint over the aligned columns only. In
//! unordered mode (the default) matching is a multiset pairing: each row of A
//! pairs with the first unconsumed equal-fingerprint row of B, so reordering
//! alone never shows up as a change and duplicate rows pair in original
//! order. In ordered mode, unique fingerprints form anchors, a longest
//! increasing subsequence keeps the maximal crossing-free chain, and the gaps
//! between anchors are filled with in-order exact matches.
//!
//! A final pass pairs leftover rows as *edits* when enough aligned cells
//! still agree (`fuzzy_similarity_threshold`); whatever remains is a pure
//! insertion or deletion.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::column_alignment::ColumnAlignment;
use crate::config::CompareFlags;
use crate::hashing::{row_fingerprint, RowFingerprint};
use crate::table::Table;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowAlignment {
    /// `(row_idx_a, row_idx_b)` pairs, sorted by the A index.
    pub matched: Vec<(usize, usize)>,
    /// Rows present only in B, ascending.
    pub inserted: Vec<usize>,
    /// Rows present only in A, ascending.
    pub deleted: Vec<usize>,
}

/// Fingerprints for every row of `table` over the given columns, slot-indexed
/// by position in `cols` so both sides of an alignment hash comparably.
pub(crate) fn fingerprints(table: &Table, cols: &[usize]) -> Vec<RowFingerprint> {
    (0..table.row_count())
        .map(|r| {
            row_fingerprint(
                cols.iter()
                    .enumerate()
                    .map(|(slot, &c)| (slot as u32, table.cell(r, c))),
            )
        })
        .collect()
}

pub(crate) fn align_rows(
    a: &Table,
    b: &Table,
    columns: &ColumnAlignment,
    flags: &CompareFlags,
) -> RowAlignment {
    let a_cols: Vec<usize> = columns.matched.iter().map(|&(x, _)| x).collect();
    let b_cols: Vec<usize> = columns.matched.iter().map(|&(_, y)| y).collect();
    let fp_a = fingerprints(a, &a_cols);
    let fp_b = fingerprints(b, &b_cols);

    let similar = |ar: usize, br: usize| -> bool {
        if a_cols.is_empty() {
            return false;
        }
        let agreeing = a_cols
            .iter()
            .zip(b_cols.iter())
            .filter(|&(&ac, &bc)| a.cell(ar, ac).diff_eq(b.cell(br, bc)))
            .count();
        agreeing as f64 / a_cols.len() as f64 >= flags.fuzzy_similarity_threshold
    };

    let mut matched = if flags.ordered {
        match_ordered(&fp_a, &fp_b, &similar)
    } else {
        match_unordered(&fp_a, &fp_b, &similar)
    };
    matched.sort_unstable();

    let mut taken_a = vec![false; fp_a.len()];
    let mut taken_b = vec![false; fp_b.len()];
    for &(ar, br) in &matched {
        taken_a[ar] = true;
        taken_b[br] = true;
    }

    RowAlignment {
        matched,
        inserted: (0..fp_b.len()).filter(|&i| !taken_b[i]).collect(),
        deleted: (0..fp_a.len()).filter(|&i| !taken_a[i]).collect(),
    }
}

/// Multiset pairing: first unconsumed equal fingerprint wins, duplicates in
/// original order. Leftovers are then offered to the fuzzy edit pass without
/// any ordering constraint.
fn match_unordered(
    fp_a: &[RowFingerprint],
    fp_b: &[RowFingerprint],
    similar: &dyn Fn(usize, usize) -> bool,
) -> Vec<(usize, usize)> {
    let mut b_by_fp: FxHashMap<RowFingerprint, VecDeque<usize>> = FxHashMap::default();
    for (idx, fp) in fp_b.iter().enumerate() {
        b_by_fp.entry(*fp).or_default().push_back(idx);
    }

    let mut matched = Vec::new();
    let mut taken_b = vec![false; fp_b.len()];
    let mut leftover_a = Vec::new();

    for (ar, fp) in fp_a.iter().enumerate() {
        match b_by_fp.get_mut(fp).and_then(|q| q.pop_front()) {
            Some(br) => {
                matched.push((ar, br));
                taken_b[br] = true;
            }
            None => leftover_a.push(ar),
        }
    }

    for ar in leftover_a {
        let candidate = (0..fp_b.len()).find(|&br| !taken_b[br] && similar(ar, br));
        if let Some(br) = candidate {
            matched.push((ar, br));
            taken_b[br] = true;
        }
    }

    matched
}

/// Anchor + LIS matching for order-significant comparisons, with exact and
/// fuzzy gap filling between consecutive anchors.
fn match_ordered(
    fp_a: &[RowFingerprint],
    fp_b: &[RowFingerprint],
    similar: &dyn Fn(usize, usize) -> bool,
) -> Vec<(usize, usize)> {
    let chain = anchor_chain(fp_a, fp_b);

    let mut matched = Vec::new();
    let mut prev_a = 0usize;
    let mut prev_b = 0usize;

    for &(anchor_a, anchor_b) in &chain {
        fill_gap(
            prev_a..anchor_a,
            prev_b..anchor_b,
            fp_a,
            fp_b,
            similar,
            &mut matched,
        );
        matched.push((anchor_a, anchor_b));
        prev_a = anchor_a + 1;
        prev_b = anchor_b + 1;
    }
    fill_gap(
        prev_a..fp_a.len(),
        prev_b..fp_b.len(),
        fp_a,
        fp_b,
        similar,
        &mut matched,
    );

    matched
}

/// Anchors are fingerprints unique in both tables; the longest increasing
/// subsequence keeps the maximal subset without crossings.
fn anchor_chain(fp_a: &[RowFingerprint], fp_b: &[RowFingerprint]) -> Vec<(usize, usize)> {
    let mut freq_a: FxHashMap<RowFingerprint, u32> = FxHashMap::default();
    let mut freq_b: FxHashMap<RowFingerprint, u32> = FxHashMap::default();
    for fp in fp_a {
        *freq_a.entry(*fp).or_insert(0) += 1;
    }
    for fp in fp_b {
        *freq_b.entry(*fp).or_insert(0) += 1;
    }

    let mut a_by_fp: FxHashMap<RowFingerprint, usize> = FxHashMap::default();
    for (idx, fp) in fp_a.iter().enumerate() {
        if freq_a.get(fp) == Some(&1) && freq_b.get(fp) == Some(&1) {
            a_by_fp.insert(*fp, idx);
        }
    }

    // Anchors arrive sorted by B index; LIS over the A index removes crossings.
    let anchors: Vec<(usize, usize)> = fp_b
        .iter()
        .enumerate()
        .filter_map(|(b_idx, fp)| a_by_fp.get(fp).map(|&a_idx| (a_idx, b_idx)))
        .collect();

    lis_by_a(anchors)
}

fn lis_by_a(anchors: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut piles: Vec<usize> = Vec::new();
    let mut predecessors: Vec<Option<usize>> = vec![None; anchors.len()];

    for (idx, &(a_idx, _)) in anchors.iter().enumerate() {
        let pos = piles
            .binary_search_by_key(&a_idx, |&pile_idx| anchors[pile_idx].0)
            .unwrap_or_else(|insert_pos| insert_pos);
        if pos > 0 {
            predecessors[idx] = Some(piles[pos - 1]);
        }
        if pos == piles.len() {
            piles.push(idx);
        } else {
            piles[pos] = idx;
        }
    }

    let Some(&last) = piles.last() else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let mut current = last;
    loop {
        result.push(anchors[current]);
        match predecessors[current] {
            Some(prev) => current = prev,
            None => break,
        }
    }
    result.reverse();
    result
}

/// Gap filling between two anchors: greedy in-order exact matches first,
/// then positional fuzzy pairing of the remaining sub-runs. Both passes keep
/// the pairs monotonic within the gap.
fn fill_gap(
    a_range: std::ops::Range<usize>,
    b_range: std::ops::Range<usize>,
    fp_a: &[RowFingerprint],
    fp_b: &[RowFingerprint],
    similar: &dyn Fn(usize, usize) -> bool,
    matched: &mut Vec<(usize, usize)>,
) {
    let mut exact = Vec::new();
    let mut cursor = b_range.start;
    for ar in a_range.clone() {
        if let Some(br) = (cursor..b_range.end).find(|&br| fp_b[br] == fp_a[ar]) {
            exact.push((ar, br));
            cursor = br + 1;
        }
    }

    // Sub-runs between exact matches pair positionally, gated by similarity.
    let mut prev_a = a_range.start;
    let mut prev_b = b_range.start;
    let mut bounds: Vec<(usize, usize)> = exact.clone();
    bounds.push((a_range.end, b_range.end));
    for &(end_a, end_b) in &bounds {
        let mut ar = prev_a;
        let mut br = prev_b;
        while ar < end_a && br < end_b {
            if similar(ar, br) {
                matched.push((ar, br));
            }
            ar += 1;
            br += 1;
        }
        prev_a = end_a + 1;
        prev_b = end_b + 1;
    }

    matched.extend(exact);
}
