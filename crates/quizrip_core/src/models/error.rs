//! Errors raised while turning raw records into entries.

use thiserror::Error;

/// A raw record could not be turned into an [`Entry`](super::Entry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record is narrower than the fixed schema.
    #[error("expected {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// The index column is empty.
    #[error("question index is empty")]
    EmptyIndex,

    /// The kind column holds an unknown tag.
    #[error("unknown kind '{0}'")]
    UnknownKind(String),

    /// The kind needs more source URLs than the record provides.
    #[error("kind '{kind}' needs {needed} source url(s), found {found}")]
    MissingSource {
        kind: String,
        needed: usize,
        found: usize,
    },
}

impl RecordError {
    /// Whether the record should be skipped rather than abort loading.
    ///
    /// Rows with an unknown kind are ignored; every other defect means the
    /// sheet is malformed.
    pub fn is_skippable(&self) -> bool {
        matches!(self, RecordError::UnknownKind(_))
    }
}
