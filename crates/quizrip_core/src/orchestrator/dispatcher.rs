//! Pipeline dispatcher: runs each entry's kind-specific operation sequence.
//!
//! | kind            | question                                  | answer                 |
//! |-----------------|-------------------------------------------|------------------------|
//! | normal, overlap | acquire → trim                            | same media → trim      |
//! | slow, fast      | acquire → trim → change speed (in place)  | same media → trim      |
//! | midi            | download → transcode → trim               | acquire → trim         |
//!
//! Entries are processed one at a time, in input order. A failure ends
//! that entry only; the next entry is still dispatched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::logging::RunLogger;
use crate::models::{Entry, EntryKind, OutputLayout};
use crate::ops::AudioOps;

use super::errors::{EntryError, EntryResult};
use super::registry::OverlapRegistry;
use super::types::{DispatchReport, EntryOutcome, EntryReport, EntryStatus};

/// Handle for cancelling a running dispatch.
#[derive(Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the run.
    ///
    /// Dispatch stops before the next entry.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Runs entries through the audio operations and places their clips.
pub struct Dispatcher<'a> {
    ops: &'a dyn AudioOps,
    layout: &'a OutputLayout,
    logger: &'a RunLogger,
    discard_partial: bool,
    cancel: CancelHandle,
}

impl<'a> Dispatcher<'a> {
    pub fn new(ops: &'a dyn AudioOps, layout: &'a OutputLayout, logger: &'a RunLogger) -> Self {
        Self {
            ops,
            layout,
            logger,
            discard_partial: false,
            cancel: CancelHandle::new(),
        }
    }

    /// Remove the clips already placed for an entry that then fails.
    ///
    /// Off by default: a failed entry may leave a question without answer.
    pub fn discard_partial_outputs(mut self, discard: bool) -> Self {
        self.discard_partial = discard;
        self
    }

    /// Stop at the next entry boundary when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Dispatch a single entry.
    ///
    /// Overlap entries are registered before their clips are made, so a
    /// group is complete even if one of its entries fails here.
    pub fn dispatch(
        &self,
        entry: &Entry,
        registry: &mut OverlapRegistry,
    ) -> EntryResult<EntryOutcome> {
        self.dispatch_tracked(entry, registry).0
    }

    /// Dispatch all entries in order and collect the overlap registry.
    pub fn dispatch_all(&self, entries: &[Entry]) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.logger.phase("Dispatch");

        for entry in entries {
            if self.cancel.is_cancelled() {
                self.logger
                    .warn(&format!("Cancelled before {}", entry.label()));
                report.cancelled = true;
                break;
            }

            self.logger.debug(&format!("Processing {}", entry.label()));
            let (result, discarded) = self.dispatch_tracked(entry, &mut report.registry);
            let status = match result {
                Ok(_) => {
                    self.logger.success(&entry.label());
                    EntryStatus::Ok
                }
                Err(e) => {
                    self.logger.failed(&format!("{}: {}", entry.title(), e));
                    EntryStatus::Failed {
                        error: e.to_string(),
                        discarded,
                    }
                }
            };
            report.entries.push(EntryReport::new(entry, status));
        }

        report
    }

    /// Dispatch one entry, returning the outputs removed under the discard
    /// policy alongside the result.
    fn dispatch_tracked(
        &self,
        entry: &Entry,
        registry: &mut OverlapRegistry,
    ) -> (EntryResult<EntryOutcome>, Vec<PathBuf>) {
        if let EntryKind::Overlap { .. } = entry.kind() {
            registry.register(entry.clone());
        }

        let mut placed = Vec::new();
        let result = self.run_sequence(entry, &mut placed);

        let mut discarded = Vec::new();
        if result.is_err() && self.discard_partial {
            for path in placed {
                match fs::remove_file(&path) {
                    Ok(()) => {
                        self.logger
                            .info(&format!("Removed partial output {}", path.display()));
                        discarded.push(path);
                    }
                    Err(e) => self.logger.warn(&format!(
                        "Failed to remove partial output {}: {}",
                        path.display(),
                        e
                    )),
                }
            }
        }

        (result, discarded)
    }

    fn run_sequence(&self, entry: &Entry, placed: &mut Vec<PathBuf>) -> EntryResult<EntryOutcome> {
        let question = self.layout.question_path(entry);
        let answer = self.layout.answer_path(entry);

        match entry.kind() {
            EntryKind::Normal { source } | EntryKind::Overlap { source } => {
                self.cut_pair(entry, source, &question, &answer, placed)?;
            }
            EntryKind::Slow { source, factor } | EntryKind::Fast { source, factor } => {
                self.cut_pair(entry, source, &question, &answer, placed)?;
                self.apply_speed(&question, factor)?;
            }
            EntryKind::Midi {
                midi_source,
                answer_source,
            } => {
                self.midi_question(entry, midi_source, &question, placed)?;

                let media = self
                    .ops
                    .acquire(answer_source)
                    .map_err(|e| EntryError::operation("acquire answer source", e))?;
                let result = self.cut(
                    &media,
                    entry.answer_start(),
                    entry.answer_length(),
                    &answer,
                    "trim answer",
                    placed,
                );
                self.ops.scratch().discard(&media);
                result?;
            }
        }

        Ok(EntryOutcome { question, answer })
    }

    /// Acquire one media source and cut both clips from it.
    fn cut_pair(
        &self,
        entry: &Entry,
        source: &str,
        question: &Path,
        answer: &Path,
        placed: &mut Vec<PathBuf>,
    ) -> EntryResult<()> {
        let media = self
            .ops
            .acquire(source)
            .map_err(|e| EntryError::operation("acquire source", e))?;

        let result = self
            .cut(
                &media,
                entry.question_start(),
                entry.question_length(),
                question,
                "trim question",
                placed,
            )
            .and_then(|()| {
                self.cut(
                    &media,
                    entry.answer_start(),
                    entry.answer_length(),
                    answer,
                    "trim answer",
                    placed,
                )
            });

        self.ops.scratch().discard(&media);
        result
    }

    fn midi_question(
        &self,
        entry: &Entry,
        midi_source: &str,
        question: &Path,
        placed: &mut Vec<PathBuf>,
    ) -> EntryResult<()> {
        let midi = self
            .ops
            .download(midi_source)
            .map_err(|e| EntryError::operation("download MIDI", e))?;
        let rendered = self.ops.transcode(&midi);
        self.ops.scratch().discard(&midi);
        let rendered = rendered.map_err(|e| EntryError::operation("transcode MIDI", e))?;

        let result = self.cut(
            &rendered,
            entry.question_start(),
            entry.question_length(),
            question,
            "trim question",
            placed,
        );
        self.ops.scratch().discard(&rendered);
        result
    }

    /// Trim a clip out of `source` and place it at `dest`.
    fn cut(
        &self,
        source: &Path,
        start: &str,
        length: &str,
        dest: &Path,
        step: &'static str,
        placed: &mut Vec<PathBuf>,
    ) -> EntryResult<()> {
        let clip = self
            .ops
            .trim(source, start, length)
            .map_err(|e| EntryError::operation(step, e))?;
        self.place(&clip, dest)?;
        placed.push(dest.to_path_buf());
        Ok(())
    }

    /// Replace the placed question with a speed-changed version.
    fn apply_speed(&self, question: &Path, factor: &str) -> EntryResult<()> {
        let changed = self
            .ops
            .change_speed(question, factor)
            .map_err(|e| EntryError::operation("change speed", e))?;
        self.place(&changed, question)
    }

    fn place(&self, artifact: &Path, dest: &Path) -> EntryResult<()> {
        let scratch = self.ops.scratch();
        scratch.place(artifact, dest).map_err(|e| {
            scratch.discard(artifact);
            EntryError::placement(dest, e)
        })
    }
}
