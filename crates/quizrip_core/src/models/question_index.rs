//! Question index newtype for filename-safe question identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a question, canonicalized to at least two digits.
///
/// Single-character values are left-padded with `0` so that files sort
/// naturally in the output tree. Longer values are kept as they are.
///
/// # Examples
///
/// ```
/// use quizrip_core::models::QuestionIndex;
///
/// assert_eq!(QuestionIndex::new("7").unwrap().as_str(), "07");
/// assert_eq!(QuestionIndex::new("12").unwrap().as_str(), "12");
/// assert!(QuestionIndex::new("  ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionIndex(String);

impl QuestionIndex {
    /// Canonicalize a raw index field.
    ///
    /// Returns `None` for an empty (or whitespace-only) field.
    pub fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.chars().count() < 2 {
            Some(Self(format!("0{}", raw)))
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Get the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QuestionIndex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
