//! Table Diff: aligning, diffing, and merging tabular datasets.
//!
//! This crate provides functionality for:
//! - Aligning rows and columns between two or three versions of a table
//! - Highlighting differences into a renderable diff table
//! - Three-way merging with cell-level conflict reporting
//! - Scoring column similarity to pre-match renamed columns
//!
//! # Quick Start
//!
//! ```
//! use table_diff::{diff_tables, CellValue, CompareFlags, Table};
//!
//! let old = Table::from_rows(vec![
//!     vec![CellValue::text("id"), CellValue::text("name")],
//!     vec![CellValue::text("1"), CellValue::text("Alice")],
//! ])?;
//! let new = Table::from_rows(vec![
//!     vec![CellValue::text("id"), CellValue::text("name")],
//!     vec![CellValue::text("1"), CellValue::text("Alicia")],
//! ])?;
//!
//! let diff = diff_tables(&old, &new, &CompareFlags::default());
//! assert!(!diff.is_unchanged());
//! # Ok::<(), table_diff::ShapeError>(())
//! ```

pub(crate) mod alignment;
pub(crate) mod column_alignment;
mod column_match;
mod config;
mod diff;
pub(crate) mod hashing;
mod merge;
mod output;
pub(crate) mod row_alignment;
mod table;
mod value;

pub use alignment::{Alignment, Alignment3, Correspondence};
pub use column_alignment::ColumnAlignment;
pub use column_match::{
    Answer, ColumnCandidate, ColumnRemap, ColumnSimilarity, MatchSession, Question,
    inclusion, similarity_results, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use config::{CompareFlags, CompareFlagsBuilder, ConfigError};
pub use diff::{
    diff_aligned, diff_tables, diff_tables3, ChangeTag, DiffCell, DiffColumn, DiffRow,
    DiffSummary, DiffTable,
};
pub use hashing::RowFingerprint;
pub use merge::{ConflictInfo, ConflictRow, Merger};
pub use output::{complete_html, render_html, render_text};
pub use row_alignment::RowAlignment;
pub use table::{ShapeError, Table};
pub use value::CellValue;
