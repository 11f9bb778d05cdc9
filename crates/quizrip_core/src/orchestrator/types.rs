//! Outcomes and reports of a run.

use std::path::PathBuf;

use serde::Serialize;

use crate::models::{Entry, QuestionIndex};

use super::registry::OverlapRegistry;

/// Files placed for a successfully dispatched entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub question: PathBuf,
    pub answer: PathBuf,
}

/// Final status of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryStatus {
    Ok,
    Failed {
        error: String,
        /// Outputs removed again under the discard policy.
        discarded: Vec<PathBuf>,
    },
}

/// Report line for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub index: QuestionIndex,
    pub title: String,
    pub kind: String,
    pub file_name: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl EntryReport {
    pub fn new(entry: &Entry, status: EntryStatus) -> Self {
        Self {
            index: entry.index().clone(),
            title: entry.title().to_string(),
            kind: entry.kind().tag().to_string(),
            file_name: entry.file_name(),
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == EntryStatus::Ok
    }
}

/// Result of the dispatch phase.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// One report per dispatched entry, in input order.
    pub entries: Vec<EntryReport>,
    /// Overlap entries to hand to the resolver.
    pub registry: OverlapRegistry,
    /// Dispatch stopped early on cancellation.
    pub cancelled: bool,
}

/// A merged overlap clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedOverlap {
    pub index: QuestionIndex,
    pub path: PathBuf,
}

/// An overlap group that could not be merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapFailure {
    pub index: QuestionIndex,
    pub error: String,
}

/// Result of the resolution phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub merged: Vec<MergedOverlap>,
    /// Groups that failed while failures were isolated per group.
    pub failed: Vec<OverlapFailure>,
}

/// Serializable summary of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub entries: Vec<EntryReport>,
    pub merged: Vec<MergedOverlap>,
    pub overlap_failures: Vec<OverlapFailure>,
    /// Error that aborted the resolution phase, if any.
    pub resolution_error: Option<String>,
    pub skipped_records: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    /// Any entry or overlap group failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || !self.overlap_failures.is_empty() || self.resolution_error.is_some()
    }

    /// `N entries: A ok, B failed; M overlap merged`
    pub fn summary(&self) -> String {
        format!(
            "{} entries: {} ok, {} failed; {} overlap merged",
            self.entries.len(),
            self.succeeded(),
            self.failed(),
            self.merged.len()
        )
    }
}
