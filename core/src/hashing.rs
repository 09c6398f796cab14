//! Hash utilities for row fingerprint computation.
//!
//! Fingerprints are xxh64-based and computed over the *aligned* columns of a
//! row only, so that matching is insensitive to columns the other table does
//! not share. Per-cell contributions encode the aligned slot index, and the
//! combine step is a mixed wrapping add, so contribution order does not
//! matter as long as slot indices are consistent between the two tables.

use std::hash::{Hash, Hasher};
use xxhash_rust::xxh64::Xxh64;

use crate::value::CellValue;

pub(crate) const XXH64_SEED: u64 = 0;
const HASH_MIX_CONSTANT: u64 = 0x9e3779b97f4a7c15;

/// Comparison key for a whole row, derived from its aligned cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowFingerprint(pub u64);

pub(crate) fn cell_contribution(slot: u32, value: &CellValue) -> u64 {
    let mut hasher = Xxh64::new(XXH64_SEED);
    slot.hash(&mut hasher);
    value.normalized().hash(&mut hasher);
    hasher.finish()
}

fn mix_hash(hash: u64) -> u64 {
    hash.rotate_left(13) ^ HASH_MIX_CONSTANT
}

pub(crate) fn combine_hashes(current: u64, contribution: u64) -> u64 {
    current.wrapping_add(mix_hash(contribution))
}

/// Fingerprint of one row over `(slot, value)` pairs, where `slot` is the
/// index of the matched column pair, identical for both tables.
pub(crate) fn row_fingerprint<'a>(
    cells: impl Iterator<Item = (u32, &'a CellValue)>,
) -> RowFingerprint {
    let hash = cells.fold(0u64, |acc, (slot, value)| {
        combine_hashes(acc, cell_contribution(slot, value))
    });
    RowFingerprint(hash)
}
