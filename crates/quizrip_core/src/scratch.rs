//! Run-scoped scratch space for temporary artifacts.
//!
//! Every run gets a fresh directory named `quizrip_<uuid>`; artifacts inside
//! it get fresh uuid names too, so nothing from an earlier run is ever
//! reused. Artifacts leave the scratch space by being placed (renamed) into
//! the output tree or discarded. The directory is removed on drop.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Prefix of scratch directory names.
pub const SCRATCH_PREFIX: &str = "quizrip_";

/// Temporary resource manager for one run.
#[derive(Debug)]
pub struct ScratchSpace {
    root: PathBuf,
    keep: bool,
}

impl ScratchSpace {
    /// Create a fresh scratch directory under `parent`.
    pub fn create(parent: impl AsRef<Path>) -> io::Result<Self> {
        let parent = parent.as_ref();
        fs::create_dir_all(parent)?;

        let root = parent.join(format!("{}{}", SCRATCH_PREFIX, Uuid::new_v4().simple()));
        fs::create_dir(&root)?;
        tracing::info!("Using scratch space {}", root.display());

        Ok(Self { root, keep: false })
    }

    /// Leave the directory on disk when dropped.
    pub fn keep_on_drop(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    /// Root of the scratch directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh artifact path with the given extension.
    ///
    /// The file is not created; the operation that owns it writes it.
    pub fn file(&self, extension: &str) -> PathBuf {
        let name = Uuid::new_v4().simple().to_string();
        if extension.is_empty() {
            self.root.join(name)
        } else {
            self.root.join(format!("{}.{}", name, extension))
        }
    }

    /// Create a fresh, empty subdirectory.
    pub fn dir(&self) -> io::Result<PathBuf> {
        let dir = self.root.join(Uuid::new_v4().simple().to_string());
        fs::create_dir(&dir)?;
        Ok(dir)
    }

    /// Move an artifact to its final location.
    ///
    /// This is a plain rename: it replaces an existing destination and fails
    /// (leaving the artifact in place) if the rename is not possible.
    pub fn place(&self, artifact: &Path, destination: &Path) -> io::Result<()> {
        fs::rename(artifact, destination)?;
        tracing::debug!("Placed {} -> {}", artifact.display(), destination.display());
        Ok(())
    }

    /// Remove an artifact (file or directory) that is no longer needed.
    ///
    /// Missing artifacts are ignored; other failures are logged only.
    pub fn discard(&self, artifact: &Path) {
        let result = if artifact.is_dir() {
            fs::remove_dir_all(artifact)
        } else {
            fs::remove_file(artifact)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to discard {}: {}", artifact.display(), e),
        }
    }

    /// Number of artifacts currently held.
    pub fn artifact_count(&self) -> usize {
        fs::read_dir(&self.root)
            .map(|entries| entries.filter_map(Result::ok).count())
            .unwrap_or(0)
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!("Keeping scratch space {}", self.root.display());
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.root) {
            tracing::warn!("Failed to remove scratch space {}: {}", self.root.display(), e);
        }
    }
}
