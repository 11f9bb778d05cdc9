//! Errors from audio operations.

use std::io;

use thiserror::Error;

use crate::tools::ToolError;

/// Failure of a single audio operation.
#[derive(Error, Debug)]
pub enum OpError {
    /// The external tool behind the operation failed.
    #[error("{op}: {source}")]
    Tool {
        op: &'static str,
        #[source]
        source: ToolError,
    },

    /// The HTTP transfer failed.
    #[error("Download of {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The tool ran but left nothing to pick up.
    #[error("{op} produced no {expected} file")]
    NoOutput { op: &'static str, expected: String },

    /// File I/O error.
    #[error("I/O error in {op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Generic operation error with message.
    #[error("{0}")]
    Other(String),
}

impl OpError {
    /// Create a tool failure error.
    pub fn tool(op: &'static str, source: ToolError) -> Self {
        Self::Tool { op, source }
    }

    /// Create an HTTP transfer error.
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Create a bad status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a missing output error.
    pub fn no_output(op: &'static str, expected: impl Into<String>) -> Self {
        Self::NoOutput {
            op,
            expected: expected.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(op: &'static str, source: io::Error) -> Self {
        Self::Io { op, source }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for audio operations.
pub type OpResult<T> = Result<T, OpError>;
