//! Types for fetch operations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::FetchSettings;
use crate::models::LocalAsset;

/// Error type for fetch operations.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for {locator}")]
    HttpStatus { status: u16, locator: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Download reported success but left nothing usable behind.
    #[error("Downloaded file missing or empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Input {ordinal} ({locator}) failed after {attempts} attempt(s): {last}")]
    Exhausted {
        ordinal: usize,
        locator: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least 1.
    pub max_attempts: u32,
    /// Delay between attempts. Never applied after the last one.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Build from the `[fetch]` settings section.
    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self::new(settings.max_attempts, settings.backoff())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&FetchSettings::default())
    }
}

/// A successfully fetched input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub asset: LocalAsset,
    /// Attempts it took, 1-based.
    pub attempts: u32,
    /// Messages of the failed attempts, oldest first.
    pub failures: Vec<String>,
}
