//! Types for external tool handling.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// What a required external program is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolRole {
    /// Pulls audio out of video-platform URLs.
    Downloader,
    /// Renders MIDI to raw samples.
    Synth,
    /// Trims and encodes audio.
    Transcoder,
    /// Mixes tracks and changes speed.
    Mixer,
}

impl ToolRole {
    /// All roles, in the order they are checked at startup.
    pub fn all() -> &'static [ToolRole] {
        &[Self::Downloader, Self::Synth, Self::Transcoder, Self::Mixer]
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ToolRole::Downloader => "media downloader",
            ToolRole::Synth => "MIDI synthesizer",
            ToolRole::Transcoder => "transcoder",
            ToolRole::Mixer => "audio mixer",
        }
    }
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error from locating or running an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A required program is not on PATH (or the configured path is missing).
    #[error("Required {role} '{program}' not found")]
    NotFound { role: ToolRole, program: String },

    /// The program could not be started.
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    Failed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The program ran past the configured timeout and was killed.
    #[error("{tool} timed out after {limit:?}")]
    TimedOut { tool: String, limit: Duration },

    /// Waiting on, or piping between, processes failed.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    /// Create a not found error.
    pub fn not_found(role: ToolRole, program: impl Into<String>) -> Self {
        Self::NotFound {
            role,
            program: program.into(),
        }
    }

    /// Create a spawn error.
    pub fn spawn(tool: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            tool: tool.into(),
            source,
        }
    }

    /// Create a failed error.
    pub fn failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::Failed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with tool context.
    pub fn io(tool: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            tool: tool.into(),
            source,
        }
    }
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_displays_context() {
        let err = ToolError::failed("ffmpeg", 1, "Invalid duration");
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Invalid duration"));
    }

    #[test]
    fn not_found_names_role() {
        let err = ToolError::not_found(ToolRole::Synth, "timidity");
        assert_eq!(err.to_string(), "Required MIDI synthesizer 'timidity' not found");
    }
}
