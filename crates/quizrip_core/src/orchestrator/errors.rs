//! Error types for dispatch and overlap resolution.
//!
//! Errors carry context that chains through layers:
//! Run → Entry / Overlap group → Operation → Tool

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::QuestionIndex;
use crate::ops::OpError;

/// Failure of one entry's processing sequence.
///
/// Recoverable: the dispatcher reports it and moves on to the next entry.
#[derive(Error, Debug)]
pub enum EntryError {
    /// An audio operation failed.
    #[error("{step} failed: {source}")]
    Operation {
        step: &'static str,
        #[source]
        source: OpError,
    },

    /// A finished clip could not be moved into the output tree.
    #[error("Failed to place {}: {source}", path.display())]
    Placement {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EntryError {
    /// Create an operation failed error.
    pub fn operation(step: &'static str, source: OpError) -> Self {
        Self::Operation { step, source }
    }

    /// Create a placement error.
    pub fn placement(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Placement {
            path: path.into(),
            source,
        }
    }
}

/// Failure while merging one overlap group.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A group does not have exactly two entries.
    #[error("Overlap question {index} has {count} entries, expected 2")]
    GroupSize { index: QuestionIndex, count: usize },

    /// Mixing the two question clips failed.
    #[error("Overlap question {index}: mix failed: {source}")]
    Mix {
        index: QuestionIndex,
        #[source]
        source: OpError,
    },

    /// The merged clip could not be moved into the output tree.
    #[error("Overlap question {index}: failed to place {}: {source}", path.display())]
    Placement {
        index: QuestionIndex,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    /// Create a group size error.
    pub fn group_size(index: QuestionIndex, count: usize) -> Self {
        Self::GroupSize { index, count }
    }

    /// Create a mix failed error.
    pub fn mix(index: QuestionIndex, source: OpError) -> Self {
        Self::Mix { index, source }
    }

    /// Create a placement error.
    pub fn placement(index: QuestionIndex, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Placement {
            index,
            path: path.into(),
            source,
        }
    }

    /// Question index of the group that failed.
    pub fn index(&self) -> &QuestionIndex {
        match self {
            Self::GroupSize { index, .. } | Self::Mix { index, .. } | Self::Placement { index, .. } => {
                index
            }
        }
    }
}

/// Run-level error that stops the whole run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The output tree could not be created.
    #[error("Failed to create output directories under {}: {source}", root.display())]
    Layout {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The run was cancelled between entries.
    #[error("Run cancelled after {dispatched} of {total} entries")]
    Cancelled { dispatched: usize, total: usize },
}

impl RunError {
    /// Create a layout error.
    pub fn layout(root: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Layout {
            root: root.into(),
            source,
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(dispatched: usize, total: usize) -> Self {
        Self::Cancelled { dispatched, total }
    }
}

/// Result type for entry dispatch.
pub type EntryResult<T> = Result<T, EntryError>;

/// Result type for overlap resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type for a whole run.
pub type RunResult<T> = Result<T, RunError>;
