//! Downloader capability and its HTTP/local-file implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;

use super::types::{FetchError, FetchResult};

/// Copies one remote resource to a local path.
///
/// Implementations only transfer bytes. Retry and size checks are the
/// caller's job (see [`super::fetch_with_retry`]).
pub trait Downloader: Send + Sync {
    fn download(&self, locator: &str, dest: &Path) -> FetchResult<()>;
}

/// Where a locator points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Locator {
    Http(String),
    Local(PathBuf),
}

impl Locator {
    pub(crate) fn parse(locator: &str) -> Self {
        let trimmed = locator.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Locator::Http(trimmed.to_string())
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Locator::Local(PathBuf::from(path))
        } else {
            Locator::Local(PathBuf::from(trimmed))
        }
    }
}

/// Downloads `http(s)://` URLs with reqwest and copies `file://` URLs or
/// bare paths from local storage.
///
/// HTTP transfers run on the given tokio runtime; `download` blocks the
/// calling thread, which must not be a runtime worker.
pub struct HttpDownloader {
    client: reqwest::Client,
    runtime: Handle,
}

impl HttpDownloader {
    pub fn new(runtime: Handle, request_timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("hookreel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, runtime })
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> FetchResult<()> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                locator: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, locator: &str, dest: &Path) -> FetchResult<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        match Locator::parse(locator) {
            Locator::Http(url) => {
                tracing::debug!("Downloading {} -> {}", url, dest.display());
                self.runtime.block_on(self.stream_to_file(&url, dest))
            }
            Locator::Local(source) => {
                if !source.is_file() {
                    return Err(FetchError::SourceNotFound(source));
                }
                tracing::debug!("Copying {} -> {}", source.display(), dest.display());
                fs::copy(&source, dest)?;
                Ok(())
            }
        }
    }
}
