//! Input fetching.
//!
//! This module provides:
//! - The [`Downloader`] capability and an HTTP/local-file implementation
//! - Bounded retry with fixed backoff and a non-empty-file check; the
//!   backoff wait stops early on cancellation
//! - Batch fetching of all inputs, sequential or on scoped threads
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use hookreel_core::fetch::{fetch_with_retry, HttpDownloader, RetryPolicy};
//! use hookreel_core::models::InputSpec;
//! use hookreel_core::orchestrator::CancelHandle;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let timeout = Duration::from_secs(120);
//! let downloader = HttpDownloader::new(runtime.handle().clone(), timeout).unwrap();
//! let input = InputSpec::new("https://cdn.example/clip.mp4", 0);
//!
//! let fetched = fetch_with_retry(
//!     &downloader,
//!     &input,
//!     Path::new(".temp/video_0.mp4"),
//!     &RetryPolicy::default(),
//!     &CancelHandle::new(),
//! ).unwrap();
//! println!("{} bytes", fetched.asset.size_bytes);
//! ```

mod downloader;
mod retry;
mod types;

pub use downloader::{Downloader, HttpDownloader};
pub use retry::{fetch_all, fetch_with_retry};
pub use types::{FetchError, FetchResult, FetchedAsset, RetryPolicy};
