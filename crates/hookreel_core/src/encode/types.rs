//! Types for encode operations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Raw outcome of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Exit code; `None` if killed by a signal or timed out.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The engine was killed after exceeding the timeout.
    pub timed_out: bool,
    /// The engine was killed because the job was cancelled.
    pub cancelled: bool,
}

impl EngineOutput {
    /// Successful exit with the given stderr.
    pub fn success(stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Failed exit with the given code and stderr.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Killed after `timeout`.
    pub fn timed_out() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }

    /// Killed on cancellation.
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        !self.timed_out && !self.cancelled && self.exit_code == Some(0)
    }
}

/// Error type for encode operations.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}:\n{tail}")]
    NonZeroExit {
        tool: String,
        exit_code: i32,
        /// Last lines of the engine's stderr.
        tail: String,
    },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("{tool} was stopped because the job was cancelled")]
    Cancelled { tool: String },

    #[error("Output file missing after successful encode: {0}")]
    OutputMissing(PathBuf),

    #[error("Output file is empty after successful encode: {0}")]
    OutputEmpty(PathBuf),
}

impl EncodeError {
    /// Whether the engine reported success but the output is unusable.
    pub fn is_verification(&self) -> bool {
        matches!(self, EncodeError::OutputMissing(_) | EncodeError::OutputEmpty(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, EncodeError::Cancelled { .. })
    }
}

/// Result type for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;
