//! Audio operation layer.
//!
//! Each operation takes its inputs, allocates exactly one new artifact in
//! the scratch space and returns its path. Inputs are never modified and
//! nothing is retried.
//!
//! ```text
//! download(url)              -> raw bytes of a remote file
//! acquire(url)               -> audio extracted from a video-platform page
//! trim(path, start, length)  -> codec-copy sub-range
//! transcode(path)            -> MIDI rendered and encoded (two piped stages)
//! mix(a, b, volume)          -> both tracks superimposed
//! change_speed(path, factor) -> playback speed scaled
//! ```

mod error;
mod tool_ops;

pub use error::{OpError, OpResult};
pub use tool_ops::ToolOps;

use std::path::{Path, PathBuf};

use crate::scratch::ScratchSpace;

/// The six audio operations, plus access to the scratch space holding
/// their artifacts.
///
/// The dispatcher and resolver only talk to this trait, so tests can drive
/// them with a scripted implementation.
pub trait AudioOps {
    /// Scratch space that artifacts are allocated in.
    fn scratch(&self) -> &ScratchSpace;

    /// Fetch a remote resource byte-for-byte.
    fn download(&self, url: &str) -> OpResult<PathBuf>;

    /// Extract audio from a media page with the downloader tool.
    fn acquire(&self, url: &str) -> OpResult<PathBuf>;

    /// Cut `[start, start + length)` without re-encoding.
    fn trim(&self, input: &Path, start: &str, length: &str) -> OpResult<PathBuf>;

    /// Render a MIDI file to encoded audio.
    fn transcode(&self, input: &Path) -> OpResult<PathBuf>;

    /// Superimpose two tracks.
    fn mix(&self, first: &Path, second: &Path, volume: &str) -> OpResult<PathBuf>;

    /// Scale playback speed by `factor`.
    fn change_speed(&self, input: &Path, factor: &str) -> OpResult<PathBuf>;
}
