//! Bounded retry around a [`Downloader`] and batch fetching.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::models::{InputSpec, LocalAsset};
use crate::orchestrator::CancelHandle;

use super::downloader::Downloader;
use super::types::{FetchError, FetchResult, FetchedAsset, RetryPolicy};

/// Longest single sleep while waiting out a backoff.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Fetch one input into `dest`, retrying per `policy`.
///
/// An attempt only counts as successful if `dest` exists afterwards with a
/// non-zero size. Files left behind by failed attempts are not removed here.
/// Cancellation is honoured between attempts and during the backoff wait.
pub fn fetch_with_retry(
    downloader: &dyn Downloader,
    input: &InputSpec,
    dest: &Path,
    policy: &RetryPolicy,
    cancel: &CancelHandle,
) -> FetchResult<FetchedAsset> {
    let attempts = policy.max_attempts.max(1);
    let mut failures = Vec::new();
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        attempt += 1;
        let outcome = downloader
            .download(&input.locator, dest)
            .and_then(|()| verify_download(dest));

        match outcome {
            Ok(size) => {
                return Ok(FetchedAsset {
                    asset: LocalAsset::fetched(input.ordinal, dest.to_path_buf(), size),
                    attempts: attempt,
                    failures,
                });
            }
            Err(err) if attempt == attempts => {
                tracing::error!(
                    ordinal = input.ordinal,
                    attempts,
                    error = %err,
                    "fetch exhausted"
                );
                return Err(FetchError::Exhausted {
                    ordinal: input.ordinal,
                    locator: input.locator.clone(),
                    attempts,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                tracing::warn!(
                    ordinal = input.ordinal,
                    attempt,
                    wait = ?policy.backoff,
                    error = %err,
                    "retrying fetch"
                );
                failures.push(format!("attempt {}: {}", attempt, err));
                wait_backoff(policy.backoff, cancel);
            }
        }
    }
}

/// Sleep for `backoff`, returning early once `cancel` fires.
fn wait_backoff(backoff: Duration, cancel: &CancelHandle) {
    let deadline = Instant::now() + backoff;
    loop {
        let now = Instant::now();
        if now >= deadline || cancel.is_cancelled() {
            return;
        }
        thread::sleep(CANCEL_POLL.min(deadline - now));
    }
}

/// Size of a finished download, rejecting missing or empty files.
fn verify_download(dest: &Path) -> FetchResult<u64> {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        _ => Err(FetchError::EmptyFile(dest.to_path_buf())),
    }
}

/// Fetch every input into `work_dir` under its ordinal file name.
///
/// Sequential mode stops at the first exhausted input. Parallel mode runs
/// one scoped thread per input and reports the lowest-ordinal failure.
/// Results are always returned in ordinal order.
pub fn fetch_all(
    downloader: &dyn Downloader,
    inputs: &[InputSpec],
    work_dir: &Path,
    policy: &RetryPolicy,
    parallel: bool,
    cancel: &CancelHandle,
) -> FetchResult<Vec<FetchedAsset>> {
    let mut results: Vec<(usize, FetchResult<FetchedAsset>)> = if parallel {
        thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| {
                    let dest = work_dir.join(input.local_file_name());
                    let handle = scope
                        .spawn(move || fetch_with_retry(downloader, input, &dest, policy, cancel));
                    (input.ordinal, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(ordinal, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(FetchError::Io(std::io::Error::other(format!(
                            "fetch thread for input {} panicked",
                            ordinal
                        ))))
                    });
                    (ordinal, result)
                })
                .collect()
        })
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let dest = work_dir.join(input.local_file_name());
            let result = fetch_with_retry(downloader, input, &dest, policy, cancel);
            let failed = result.is_err();
            results.push((input.ordinal, result));
            if failed {
                break;
            }
        }
        results
    };

    results.sort_by_key(|(ordinal, _)| *ordinal);
    results.into_iter().map(|(_, result)| result).collect()
}
