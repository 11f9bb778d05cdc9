//! Run driver: dispatch every entry, then resolve overlap groups.

use std::sync::Arc;

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{Entry, OutputLayout};
use crate::ops::AudioOps;

use super::dispatcher::{CancelHandle, Dispatcher};
use super::errors::{RunError, RunResult};
use super::resolver::OverlapResolver;
use super::types::{ResolutionReport, RunReport};

/// Context for one run over a loaded sheet.
pub struct QuizRun<O: AudioOps> {
    settings: Settings,
    layout: OutputLayout,
    ops: O,
    logger: Arc<RunLogger>,
    cancel: CancelHandle,
}

impl<O: AudioOps> QuizRun<O> {
    pub fn new(settings: Settings, layout: OutputLayout, ops: O, logger: Arc<RunLogger>) -> Self {
        Self {
            settings,
            layout,
            ops,
            logger,
            cancel: CancelHandle::new(),
        }
    }

    /// Get a cancellation handle.
    ///
    /// Call `cancel()` on the returned handle to stop the run at the next
    /// entry boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Process `entries` in order and merge overlap pairs.
    ///
    /// Per-entry failures and a failed resolution phase are recorded in the
    /// report. Only an unusable output tree or cancellation is an error.
    pub fn run(&self, entries: &[Entry]) -> RunResult<RunReport> {
        self.layout
            .create()
            .map_err(|e| RunError::layout(self.layout.root(), e))?;

        let dispatch = Dispatcher::new(&self.ops, &self.layout, &self.logger)
            .discard_partial_outputs(self.settings.run.discard_partial_outputs)
            .with_cancel(self.cancel.clone())
            .dispatch_all(entries);

        if dispatch.cancelled {
            return Err(RunError::cancelled(dispatch.entries.len(), entries.len()));
        }

        let mut report = RunReport {
            entries: dispatch.entries,
            ..RunReport::default()
        };

        let resolver =
            OverlapResolver::new(&self.ops, &self.layout, &self.logger, &self.settings.overlap);
        let mut resolution = ResolutionReport::default();
        if let Err(e) = resolver.resolve_into(dispatch.registry, &mut resolution) {
            report.resolution_error = Some(e.to_string());
        }
        report.merged = resolution.merged;
        report.overlap_failures = resolution.failed;

        self.logger.phase("Summary");
        if report.has_failures() {
            self.logger.warn(&report.summary());
        } else {
            self.logger.success(&report.summary());
        }
        self.logger.flush();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogConfig, LogSink};
    use crate::orchestrator::fake_ops::{entry, FakeOps};
    use parking_lot::Mutex;
    use std::fs;
    use tempfile::tempdir;

    fn logger() -> (Arc<RunLogger>, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let clone = Arc::clone(&lines);
        let sink: LogSink = Box::new(move |msg| clone.lock().push(msg.to_string()));
        let config = LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        };
        (Arc::new(RunLogger::new(config).with_sink(sink)), lines)
    }

    #[test]
    fn creates_output_tree_and_places_clips() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("quiz"));
        let ops = FakeOps::new(dir.path());
        let (log, lines) = logger();
        let run = QuizRun::new(Settings::default(), layout.clone(), ops, log);

        let e = entry("7", "normal", "Test Song", "http://a | http://b", "");
        let report = run.run(std::slice::from_ref(&e)).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(
            fs::read_to_string(layout.questions_dir().join("07-Test-Song.mp3")).unwrap(),
            "media:http://a|trim 0 5"
        );
        assert!(layout.answers_dir().join("07-Test-Song.mp3").exists());
        assert_eq!(
            lines.lock().last().unwrap(),
            "[OK] 1 entries: 1 ok, 0 failed; 0 overlap merged"
        );
    }

    #[test]
    fn resolution_failure_is_reported_not_fatal() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("quiz"));
        let ops = FakeOps::new(dir.path());
        let (log, _) = logger();
        let run = QuizRun::new(Settings::default(), layout, ops, log);

        let entries = vec![
            entry("1", "overlap", "Lonely", "http://a", ""),
            entry("2", "normal", "Plain", "http://b", ""),
        ];
        let report = run.run(&entries).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert!(report.merged.is_empty());
        assert!(report.resolution_error.as_deref().unwrap().contains("has 1 entries"));
        assert!(report.has_failures());
    }

    #[test]
    fn overlap_pair_merged_in_full_run() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("quiz"));
        let ops = FakeOps::new(dir.path());
        let (log, _) = logger();
        let run = QuizRun::new(Settings::default(), layout.clone(), ops, log);

        let entries = vec![
            entry("7", "overlap", "A", "http://a", ""),
            entry("7", "overlap", "B", "http://b", ""),
        ];
        let report = run.run(&entries).unwrap();

        assert_eq!(report.merged.len(), 1);
        assert_eq!(report.summary(), "2 entries: 2 ok, 0 failed; 1 overlap merged");
        let questions: Vec<_> = fs::read_dir(layout.questions_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(questions, ["07-overlap.mp3"]);
    }

    #[test]
    fn cancelled_run_is_an_error() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("quiz"));
        let ops = FakeOps::new(dir.path());
        let (log, _) = logger();
        let run = QuizRun::new(Settings::default(), layout, ops, log);
        run.cancel_handle().cancel();

        let err = run
            .run(&[entry("1", "normal", "A", "http://a", "")])
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Cancelled {
                dispatched: 0,
                total: 1
            }
        ));
        assert!(run.ops().calls().is_empty());
    }

    #[test]
    fn unusable_output_root_is_fatal() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let ops = FakeOps::new(dir.path());
        let (log, _) = logger();
        let run = QuizRun::new(Settings::default(), OutputLayout::new(&blocker), ops, log);

        assert!(matches!(run.run(&[]), Err(RunError::Layout { .. })));
    }
}
