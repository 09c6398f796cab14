//! Column pre-matching: score remote columns against local ones and turn a
//! sequence of reviewer choices into a rename map.
//!
//! Scoring is value-overlap based. The interactive part is a pure state
//! machine: callers pull the next [`Question`], supply an [`Answer`], and
//! collect the final [`ColumnRemap`] themselves; no terminal I/O happens
//! here.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::table::Table;
use crate::value::CellValue;

/// Minimum overlap score for a remote column to be offered as a candidate.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.2;

/// Fraction of local entries whose value also appears in the remote column.
///
/// Duplicates are collapsed before intersecting, but the denominator is the
/// full local entry count, so a column of repeated values scores low against
/// a sparse match. Either side empty scores 0.
pub fn inclusion<'a, 'b>(
    local: impl IntoIterator<Item = &'a CellValue>,
    remote: impl IntoIterator<Item = &'b CellValue>,
) -> f64 {
    let local_values: Vec<String> = local
        .into_iter()
        .map(|v| v.normalized().into_owned())
        .collect();
    let remote_unique: FxHashSet<String> = remote
        .into_iter()
        .map(|v| v.normalized().into_owned())
        .collect();
    if local_values.is_empty() || remote_unique.is_empty() {
        return 0.0;
    }
    let total = local_values.len();
    let local_unique: FxHashSet<String> = local_values.into_iter().collect();
    let intersection = local_unique
        .iter()
        .filter(|v| remote_unique.contains(*v))
        .count();
    intersection as f64 / total as f64
}

/// A remote column offered as a possible match, with its overlap score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCandidate {
    pub name: String,
    pub score: f64,
}

/// Candidate remote columns for one local column, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSimilarity {
    pub local_column: String,
    pub candidates: Vec<ColumnCandidate>,
}

/// Scores every remote column against every local column and keeps the
/// candidates strictly above `threshold`, sorted by descending score. Local
/// columns with no candidates still get an entry with an empty list.
pub fn similarity_results(local: &Table, remote: &Table, threshold: f64) -> Vec<ColumnSimilarity> {
    let mut results = Vec::with_capacity(local.column_count());
    for lc in 0..local.column_count() {
        let mut candidates: Vec<ColumnCandidate> = Vec::new();
        for rc in 0..remote.column_count() {
            let score = inclusion(local.column(lc), remote.column(rc));
            if score > threshold {
                candidates.push(ColumnCandidate {
                    name: remote.column_names()[rc].clone(),
                    score,
                });
            }
        }
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.push(ColumnSimilarity {
            local_column: local.column_names()[lc].clone(),
            candidates,
        });
    }
    results
}

/// Ordered old-name to new-name mapping, applied to remote headers so they
/// line up with local before alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnRemap {
    renames: Vec<(String, String)>,
}

impl ColumnRemap {
    pub fn from_pairs<S: Into<String>, T: Into<String>>(
        pairs: impl IntoIterator<Item = (S, T)>,
    ) -> ColumnRemap {
        ColumnRemap {
            renames: pairs
                .into_iter()
                .map(|(old, new)| (old.into(), new.into()))
                .collect(),
        }
    }

    /// The new name for `old`, if this remap renames it.
    pub fn renamed(&self, old: &str) -> Option<&str> {
        self.renames
            .iter()
            .find(|(from, _)| from == old)
            .map(|(_, to)| to.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    fn push(&mut self, old: String, new: String) {
        self.renames.push((old, new));
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for ColumnRemap {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> ColumnRemap {
        ColumnRemap::from_pairs(iter)
    }
}

/// One pending choice: which remote column matches `local_column`, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub local_column: String,
    pub candidates: Vec<ColumnCandidate>,
}

/// A reviewer's response to a [`Question`].
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// The named remote column is the same column as the local one.
    Pick(String),
    /// No offered candidate matches.
    None,
}

/// Drives the column-matching dialogue without doing any I/O itself.
///
/// Each answered pick removes that remote column from later questions, so a
/// remote column is matched at most once. When [`MatchSession::next_question`]
/// returns `None` the session is complete and [`MatchSession::into_remap`]
/// yields the accumulated remote-to-local renames.
#[derive(Debug, Clone)]
pub struct MatchSession {
    pending: Vec<ColumnSimilarity>,
    // Index into `pending` of the question currently on offer.
    cursor: usize,
    picked: Vec<String>,
    remap: ColumnRemap,
}

impl MatchSession {
    pub fn new(local: &Table, remote: &Table, threshold: f64) -> MatchSession {
        MatchSession {
            pending: similarity_results(local, remote, threshold),
            cursor: 0,
            picked: Vec::new(),
            remap: ColumnRemap::default(),
        }
    }

    pub fn with_default_threshold(local: &Table, remote: &Table) -> MatchSession {
        MatchSession::new(local, remote, DEFAULT_SIMILARITY_THRESHOLD)
    }

    /// The next question that still has candidates left, or `None` when the
    /// session is finished.
    pub fn next_question(&self) -> Option<Question> {
        for entry in &self.pending[self.cursor.min(self.pending.len())..] {
            let candidates = self.remaining_candidates(entry);
            if !candidates.is_empty() {
                return Some(Question {
                    local_column: entry.local_column.clone(),
                    candidates,
                });
            }
        }
        None
    }

    /// Answers the question currently returned by
    /// [`MatchSession::next_question`]. Returns `false` without advancing if
    /// `answer` picks a column that is not among the offered candidates.
    pub fn answer(&mut self, answer: Answer) -> bool {
        // Advance past entries whose candidates have all been picked.
        while self.cursor < self.pending.len()
            && self
                .remaining_candidates(&self.pending[self.cursor])
                .is_empty()
        {
            self.cursor += 1;
        }
        let Some(entry) = self.pending.get(self.cursor) else {
            return false;
        };
        match answer {
            Answer::Pick(remote_name) => {
                let offered = self
                    .remaining_candidates(entry)
                    .iter()
                    .any(|c| c.name == remote_name);
                if !offered {
                    return false;
                }
                let local_name = entry.local_column.clone();
                if remote_name != local_name {
                    self.remap.push(remote_name.clone(), local_name);
                }
                self.picked.push(remote_name);
            }
            Answer::None => {}
        }
        self.cursor += 1;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.next_question().is_none()
    }

    /// The renames accumulated so far, remote name to local name.
    pub fn into_remap(self) -> ColumnRemap {
        self.remap
    }

    fn remaining_candidates(&self, entry: &ColumnSimilarity) -> Vec<ColumnCandidate> {
        entry
            .candidates
            .iter()
            .filter(|c| !self.picked.contains(&c.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(vals: &[&str]) -> Vec<CellValue> {
        vals.iter().map(|v| CellValue::text(*v)).collect()
    }

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::text(*v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn inclusion_counts_unique_overlap_over_total_local_entries() {
        let local = column(&["a", "a", "b"]);
        let remote = column(&["a", "c"]);
        let score = inclusion(local.iter(), remote.iter());
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn inclusion_of_empty_columns_is_zero() {
        let local = column(&["a"]);
        let empty: Vec<CellValue> = Vec::new();
        assert_eq!(inclusion(local.iter(), empty.iter()), 0.0);
        assert_eq!(inclusion(empty.iter(), local.iter()), 0.0);
    }

    #[test]
    fn similarity_threshold_is_strict() {
        // Overlap is exactly 1/5 = 0.2, which must not pass a 0.2 threshold.
        let local = table(&[&["v"], &["a"], &["b"], &["c"], &["d"], &["e"]]);
        let remote = table(&[&["w"], &["a"], &["x"], &["y"], &["z"], &["q"]]);
        let results = similarity_results(&local, &remote, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(results.len(), 1);
        assert!(results[0].candidates.is_empty());
    }

    #[test]
    fn candidates_are_sorted_by_descending_score() {
        let local = table(&[&["v"], &["a"], &["b"]]);
        let remote = table(&[&["half", "full"], &["a", "a"], &["x", "b"]]);
        let results = similarity_results(&local, &remote, 0.0);
        let candidates = &results[0].candidates;
        assert_eq!(candidates[0].name, "full");
        assert_eq!(candidates[1].name, "half");
        assert!(candidates[0].score > candidates[1].score);
    }

    #[test]
    fn session_produces_remote_to_local_renames() {
        let local = table(&[&["centre"], &["Sunnybrook"], &["Humber"]]);
        let remote = table(&[&["location_name"], &["Sunnybrook"], &["Humber"]]);
        let mut session = MatchSession::with_default_threshold(&local, &remote);

        let question = session.next_question().expect("one question pending");
        assert_eq!(question.local_column, "centre");
        assert_eq!(question.candidates[0].name, "location_name");
        assert!(session.answer(Answer::Pick("location_name".into())));
        assert!(session.is_complete());

        let remap = session.into_remap();
        assert_eq!(remap.renamed("location_name"), Some("centre"));
        assert_eq!(remap.renamed("centre"), None);
    }

    #[test]
    fn declining_a_question_records_nothing() {
        let local = table(&[&["a"], &["1"]]);
        let remote = table(&[&["b"], &["1"]]);
        let mut session = MatchSession::with_default_threshold(&local, &remote);
        assert!(session.next_question().is_some());
        assert!(session.answer(Answer::None));
        assert!(session.is_complete());
        assert!(session.into_remap().is_empty());
    }

    #[test]
    fn picked_columns_are_not_offered_again() {
        // Both local columns overlap the single remote column.
        let local = table(&[&["a", "b"], &["1", "1"]]);
        let remote = table(&[&["c"], &["1"]]);
        let mut session = MatchSession::with_default_threshold(&local, &remote);

        assert!(session.answer(Answer::Pick("c".into())));
        assert!(
            session.is_complete(),
            "second question vanishes once its only candidate is taken"
        );
    }

    #[test]
    fn answering_with_a_non_candidate_is_rejected() {
        let local = table(&[&["a"], &["1"]]);
        let remote = table(&[&["b"], &["1"]]);
        let mut session = MatchSession::with_default_threshold(&local, &remote);
        assert!(!session.answer(Answer::Pick("nope".into())));
        assert!(!session.is_complete());
    }

    #[test]
    fn same_name_pick_is_an_identity_and_not_recorded() {
        let local = table(&[&["id"], &["1"]]);
        let remote = table(&[&["id"], &["1"]]);
        let mut session = MatchSession::with_default_threshold(&local, &remote);
        assert!(session.answer(Answer::Pick("id".into())));
        assert!(session.into_remap().is_empty());
    }
}
