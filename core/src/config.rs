//! Comparison flags for the aligner, highlighter, and merger.
//!
//! `CompareFlags` is an immutable value passed explicitly into every
//! operation; nothing in this crate reads configuration from globals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Behavioral knobs shared by alignment, diffing, and merging.
///
/// The display flags (`show_unchanged*`) only filter what the diff table
/// materializes; they never change how rows and columns are matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareFlags {
    /// When `true`, matched row pairs must preserve relative order and a
    /// reordering shows up as delete+insert. When `false` (the default for
    /// the published datasets this engine was built for), row order carries
    /// no meaning and matching ignores position.
    pub ordered: bool,
    /// Keep unchanged rows in the diff table.
    pub show_unchanged: bool,
    /// Keep unchanged columns in the diff table.
    pub show_unchanged_columns: bool,
    /// Always emit the column-status metadata row, even when no column
    /// changed.
    pub show_unchanged_meta: bool,
    /// Minimum fraction of aligned columns that must agree before two
    /// unequal rows are paired as an edit instead of a delete+insert pair.
    pub fuzzy_similarity_threshold: f64,
}

impl Default for CompareFlags {
    fn default() -> Self {
        Self {
            ordered: false,
            show_unchanged: true,
            show_unchanged_columns: true,
            show_unchanged_meta: true,
            fuzzy_similarity_threshold: 0.3,
        }
    }
}

impl CompareFlags {
    pub fn builder() -> CompareFlagsBuilder {
        CompareFlagsBuilder {
            inner: CompareFlags::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fuzzy_similarity_threshold.is_finite()
            || self.fuzzy_similarity_threshold < 0.0
            || self.fuzzy_similarity_threshold > 1.0
        {
            return Err(ConfigError::InvalidSimilarityThreshold {
                value: self.fuzzy_similarity_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "[TBLDIFF_CONFIG_001] fuzzy_similarity_threshold must be finite and in [0.0, 1.0] (got {value})"
    )]
    InvalidSimilarityThreshold { value: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct CompareFlagsBuilder {
    inner: CompareFlags,
}

impl CompareFlagsBuilder {
    pub fn ordered(mut self, value: bool) -> Self {
        self.inner.ordered = value;
        self
    }

    pub fn show_unchanged(mut self, value: bool) -> Self {
        self.inner.show_unchanged = value;
        self
    }

    pub fn show_unchanged_columns(mut self, value: bool) -> Self {
        self.inner.show_unchanged_columns = value;
        self
    }

    pub fn show_unchanged_meta(mut self, value: bool) -> Self {
        self.inner.show_unchanged_meta = value;
        self
    }

    pub fn fuzzy_similarity_threshold(mut self, value: f64) -> Self {
        self.inner.fuzzy_similarity_threshold = value;
        self
    }

    pub fn build(self) -> Result<CompareFlags, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
