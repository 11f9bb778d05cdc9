//! Locating required programs at startup.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::ToolSettings;

use super::types::{ToolError, ToolResult, ToolRole};

/// Resolved paths of the four required programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolset {
    pub downloader: PathBuf,
    pub synth: PathBuf,
    pub transcoder: PathBuf,
    pub mixer: PathBuf,
}

impl Toolset {
    /// Resolve every configured program, failing on the first missing one.
    pub fn locate(settings: &ToolSettings) -> ToolResult<Self> {
        let resolve = |role: ToolRole| -> ToolResult<PathBuf> {
            let program = Self::configured(settings, role);
            let path = find_program(program).ok_or_else(|| ToolError::not_found(role, program))?;
            tracing::debug!("Using {} at {}", role, path.display());
            Ok(path)
        };

        Ok(Self {
            downloader: resolve(ToolRole::Downloader)?,
            synth: resolve(ToolRole::Synth)?,
            transcoder: resolve(ToolRole::Transcoder)?,
            mixer: resolve(ToolRole::Mixer)?,
        })
    }

    /// Use the configured values without checking that they exist.
    pub fn unchecked(settings: &ToolSettings) -> Self {
        Self {
            downloader: PathBuf::from(&settings.downloader),
            synth: PathBuf::from(&settings.synth),
            transcoder: PathBuf::from(&settings.transcoder),
            mixer: PathBuf::from(&settings.mixer),
        }
    }

    /// Path for a role.
    pub fn path(&self, role: ToolRole) -> &Path {
        match role {
            ToolRole::Downloader => &self.downloader,
            ToolRole::Synth => &self.synth,
            ToolRole::Transcoder => &self.transcoder,
            ToolRole::Mixer => &self.mixer,
        }
    }

    fn configured(settings: &ToolSettings, role: ToolRole) -> &str {
        match role {
            ToolRole::Downloader => &settings.downloader,
            ToolRole::Synth => &settings.synth,
            ToolRole::Transcoder => &settings.transcoder,
            ToolRole::Mixer => &settings.mixer,
        }
    }
}

/// Find a program by name on `PATH`, or check an explicit path.
///
/// A value containing a path separator is treated as a path and must name
/// an existing file.
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}
