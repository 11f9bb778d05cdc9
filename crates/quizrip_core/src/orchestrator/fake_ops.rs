//! Scripted [`AudioOps`] for orchestrator tests.
//!
//! Every operation writes a small text artifact describing how it was
//! made, so a placed clip's content shows its whole history, e.g.
//! `media:http://a|trim 0 5|speed 0.5`.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::models::{Entry, OutputLayout};
use crate::ops::{AudioOps, OpError, OpResult};
use crate::scratch::ScratchSpace;

pub struct FakeOps {
    scratch: ScratchSpace,
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl FakeOps {
    pub fn new(parent: &Path) -> Self {
        Self {
            scratch: ScratchSpace::create(parent).unwrap(),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call whose description starts with `prefix`.
    pub fn fail_on(&self, prefix: &str) {
        self.failures.lock().push(prefix.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> OpResult<()> {
        let fail = self.failures.lock().iter().any(|p| call.starts_with(p));
        self.calls.lock().push(call.clone());
        if fail {
            Err(OpError::other(format!("scripted failure: {}", call)))
        } else {
            Ok(())
        }
    }

    fn emit(&self, content: String) -> OpResult<PathBuf> {
        let out = self.scratch.file("mp3");
        fs::write(&out, content).map_err(|e| OpError::io("fake", e))?;
        Ok(out)
    }
}

fn content(path: &Path) -> OpResult<String> {
    fs::read_to_string(path).map_err(|e| OpError::io("fake", e))
}

impl AudioOps for FakeOps {
    fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    fn download(&self, url: &str) -> OpResult<PathBuf> {
        self.record(format!("download {}", url))?;
        self.emit(format!("dl:{}", url))
    }

    fn acquire(&self, url: &str) -> OpResult<PathBuf> {
        self.record(format!("acquire {}", url))?;
        self.emit(format!("media:{}", url))
    }

    fn trim(&self, input: &Path, start: &str, length: &str) -> OpResult<PathBuf> {
        self.record(format!("trim {} {}", start, length))?;
        self.emit(format!("{}|trim {} {}", content(input)?, start, length))
    }

    fn transcode(&self, input: &Path) -> OpResult<PathBuf> {
        self.record("transcode".to_string())?;
        self.emit(format!("{}|transcode", content(input)?))
    }

    fn mix(&self, first: &Path, second: &Path, volume: &str) -> OpResult<PathBuf> {
        let a = content(first)?;
        let b = content(second)?;
        self.record(format!("mix {}", volume))?;
        self.emit(format!("mix({} + {})@{}", a, b, volume))
    }

    fn change_speed(&self, input: &Path, factor: &str) -> OpResult<PathBuf> {
        self.record(format!("speed {}", factor))?;
        self.emit(format!("{}|speed {}", content(input)?, factor))
    }
}

/// Output tree plus fake operations in a temporary directory.
pub struct Harness {
    pub ops: FakeOps,
    pub layout: OutputLayout,
    _dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        crate::logging::init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"));
        layout.create().unwrap();
        let ops = FakeOps::new(layout.root());
        Self {
            ops,
            layout,
            _dir: dir,
        }
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

/// Build an entry from the interesting columns.
pub fn entry(index: &str, kind: &str, title: &str, urls: &str, speed: &str) -> Entry {
    Entry::from_record(&["", index, kind, title, urls, "0", "5", "10", "5", speed]).unwrap()
}
