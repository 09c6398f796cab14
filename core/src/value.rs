//! Cell values and their normalized comparison semantics.
//!
//! Source data mixes strings, numbers, and blanks freely, so equality for
//! diffing purposes is defined over a normalized string form: text is
//! trimmed, numeric lexemes and numbers use their shortest round-trip
//! rendering, and blanks normalize to the empty string. `Text(" 1 ")`,
//! `Text("1.0")`, `Number(1.0)`, and `Text("1")` all compare equal under
//! [`CellValue::diff_eq`]. Normalization is a comparison key only: `Display`
//! keeps the original lexeme, so cells round-trip verbatim through readers
//! and writers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single cell value as read from a parsed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// The normalized string form used for all diff/merge comparisons.
    ///
    /// Text that parses as a finite number normalizes to the number's
    /// shortest rendering, so `"007"`, `"7.0"`, and `Number(7.0)` all share
    /// one key without the stored lexeme changing.
    pub fn normalized(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Cow::Owned(n.to_string()),
                    _ => Cow::Borrowed(trimmed),
                }
            }
            CellValue::Number(n) => Cow::Owned(n.to_string()),
            CellValue::Empty => Cow::Borrowed(""),
        }
    }

    /// Equality under normalization. This is the only equality the diff and
    /// merge layers are allowed to use on cell contents.
    pub fn diff_eq(&self, other: &CellValue) -> bool {
        self.normalized() == other.normalized()
    }

    pub fn is_blank(&self) -> bool {
        self.normalized().is_empty()
    }

    pub fn text(s: impl Into<String>) -> CellValue {
        CellValue::Text(s.into())
    }
}

/// Renders the stored lexeme, not the comparison key: `Text("007")` stays
/// `007`.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> CellValue {
        CellValue::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> CellValue {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> CellValue {
        CellValue::Number(n)
    }
}
