//! Overlap resolver: merges the question clips of overlap pairs.
//!
//! Runs once after dispatch. Each group must hold exactly two entries; the
//! two question clips are mixed into `questions/<index>-overlap.mp3` and
//! the originals removed. Answer clips are left alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::OverlapSettings;
use crate::logging::RunLogger;
use crate::models::{Entry, OutputLayout, QuestionIndex};
use crate::ops::AudioOps;

use super::errors::{ResolveError, ResolveResult};
use super::registry::OverlapRegistry;
use super::types::{MergedOverlap, OverlapFailure, ResolutionReport};

/// Merges overlap groups collected during dispatch.
pub struct OverlapResolver<'a> {
    ops: &'a dyn AudioOps,
    layout: &'a OutputLayout,
    logger: &'a RunLogger,
    volume: String,
    isolate_failures: bool,
}

impl<'a> OverlapResolver<'a> {
    pub fn new(
        ops: &'a dyn AudioOps,
        layout: &'a OutputLayout,
        logger: &'a RunLogger,
        settings: &OverlapSettings,
    ) -> Self {
        Self {
            ops,
            layout,
            logger,
            volume: settings.volume.clone(),
            isolate_failures: settings.isolate_failures,
        }
    }

    /// Merge every group, in ascending index order.
    ///
    /// By default the first bad group aborts the phase and the remaining
    /// groups are left unmerged. With `isolate_failures` a bad group is
    /// recorded in the report and the next group is still merged.
    pub fn resolve(&self, registry: OverlapRegistry) -> ResolveResult<ResolutionReport> {
        let mut report = ResolutionReport::default();
        self.resolve_into(registry, &mut report)?;
        Ok(report)
    }

    /// Like [`resolve`](Self::resolve), keeping the groups merged before an
    /// abort in `report`.
    pub fn resolve_into(
        &self,
        registry: OverlapRegistry,
        report: &mut ResolutionReport,
    ) -> ResolveResult<()> {
        if registry.is_empty() {
            return Ok(());
        }
        self.logger.phase("Overlap");

        for (index, group) in registry {
            match self.merge(&index, &group) {
                Ok(path) => {
                    self.logger
                        .success(&path.file_name().unwrap_or_default().to_string_lossy());
                    report.merged.push(MergedOverlap { index, path });
                }
                Err(e) if self.isolate_failures => {
                    self.logger.failed(&e.to_string());
                    report.failed.push(OverlapFailure {
                        index,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    self.logger
                        .error(&format!("Overlap resolution aborted: {}", e));
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    fn merge(&self, index: &QuestionIndex, group: &[Entry]) -> ResolveResult<PathBuf> {
        let [first, second] = group else {
            return Err(ResolveError::group_size(index.clone(), group.len()));
        };

        let first_question = self.layout.question_path(first);
        let second_question = self.layout.question_path(second);

        let mixed = self
            .ops
            .mix(&first_question, &second_question, &self.volume)
            .map_err(|e| ResolveError::mix(index.clone(), e))?;

        let target = self.layout.overlap_path(first.index());
        let scratch = self.ops.scratch();
        scratch.place(&mixed, &target).map_err(|e| {
            scratch.discard(&mixed);
            ResolveError::placement(index.clone(), &target, e)
        })?;

        self.remove_superseded(&first_question);
        if second_question != first_question {
            self.remove_superseded(&second_question);
        }
        Ok(target)
    }

    fn remove_superseded(&self, question: &Path) {
        match fs::remove_file(question) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => self.logger.warn(&format!(
                "Failed to remove {}: {}",
                question.display(),
                e
            )),
        }
    }
}
