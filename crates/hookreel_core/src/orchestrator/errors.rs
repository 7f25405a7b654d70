//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Step → Operation → Detail

use std::fmt;
use std::io;

use thiserror::Error;

use crate::encode::EncodeError;
use crate::fetch::FetchError;
use crate::plan::PlanError;

/// Failure classification, shared by diagnostics and the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The job did not receive exactly four inputs.
    InputCount,
    /// An input could not be fetched within the retry bound.
    Fetch,
    /// Inspection failed. Never fatal; only appears in diagnostics.
    Probe,
    /// The encoding engine failed or timed out.
    Encode,
    /// The engine reported success but the output is missing or empty.
    Verification,
    /// Job setup (directories, logger) failed.
    Setup,
    /// The job was cancelled.
    Cancelled,
    Other,
}

impl ErrorKind {
    /// Process exit status for a job failing with this kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::InputCount => 2,
            ErrorKind::Fetch => 3,
            ErrorKind::Encode => 4,
            ErrorKind::Verification => 5,
            ErrorKind::Probe | ErrorKind::Setup | ErrorKind::Cancelled | ErrorKind::Other => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InputCount => "input-count",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Probe => "probe",
            ErrorKind::Encode => "encode",
            ErrorKind::Verification => "verification",
            ErrorKind::Setup => "setup",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Wrong number of inputs; nothing was fetched.
    #[error("Job '{job_name}' needs exactly {expected} inputs, got {actual}")]
    InputCount {
        job_name: String,
        expected: usize,
        actual: usize,
    },

    /// Pipeline was cancelled.
    #[error("Job '{job_name}' was cancelled")]
    Cancelled { job_name: String },

    /// Failed to set up job (create directories, etc.).
    #[error("Job '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create an input count error.
    pub fn input_count(job_name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InputCount {
            job_name: job_name.into(),
            expected,
            actual,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(job_name: impl Into<String>) -> Self {
        Self::Cancelled {
            job_name: job_name.into(),
        }
    }

    /// Classify this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::StepFailed { source, .. } => source.kind(),
            PipelineError::InputCount { .. } => ErrorKind::InputCount,
            PipelineError::Cancelled { .. } => ErrorKind::Cancelled,
            PipelineError::SetupFailed { .. } => ErrorKind::Setup,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// A previous step did not record what this step needs.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Classify this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StepError::Fetch(e) if e.is_cancelled() => ErrorKind::Cancelled,
            StepError::Fetch(_) => ErrorKind::Fetch,
            StepError::Encode(e) if e.is_cancelled() => ErrorKind::Cancelled,
            StepError::Encode(e) if e.is_verification() => ErrorKind::Verification,
            StepError::Encode(_) => ErrorKind::Encode,
            StepError::InvalidInput(_)
            | StepError::InvalidOutput(_)
            | StepError::PreconditionFailed(_)
            | StepError::IoError { .. }
            | StepError::Plan(_) => ErrorKind::Other,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::Encode(EncodeError::NonZeroExit {
            tool: "ffmpeg".to_string(),
            exit_code: 1,
            tail: "Conversion failed!".to_string(),
        });
        let pipeline_err = PipelineError::step_failed("reel_123", "Encode", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("reel_123"));
        assert!(msg.contains("Encode"));
        assert!(msg.contains("exit code 1"));
        assert_eq!(pipeline_err.kind(), ErrorKind::Encode);
    }

    #[test]
    fn verification_is_its_own_kind() {
        let err = StepError::Encode(EncodeError::OutputEmpty(PathBuf::from("final.mp4")));
        assert_eq!(err.kind(), ErrorKind::Verification);
    }

    #[test]
    fn interrupted_engine_is_a_cancellation() {
        let err = StepError::Encode(EncodeError::Cancelled {
            tool: "ffmpeg".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(StepError::Fetch(FetchError::Cancelled).kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn exit_codes_are_distinct_per_failure_class() {
        assert_eq!(ErrorKind::InputCount.exit_code(), 2);
        assert_eq!(ErrorKind::Fetch.exit_code(), 3);
        assert_eq!(ErrorKind::Encode.exit_code(), 4);
        assert_eq!(ErrorKind::Verification.exit_code(), 5);
        assert_eq!(ErrorKind::Cancelled.exit_code(), 1);
        assert_eq!(PipelineError::input_count("job", 4, 3).kind(), ErrorKind::InputCount);
    }
}
