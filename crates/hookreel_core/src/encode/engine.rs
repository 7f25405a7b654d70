//! Encoding engine capability and the ffmpeg implementation.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::runtime::Handle;

use crate::orchestrator::CancelHandle;

use super::types::EngineOutput;

/// How often a running engine checks for cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Runs the encoding engine once with a prepared argument vector.
///
/// Returns `Err` only when the process could not be started. Exit status,
/// stderr, timeout and cancellation are reported in [`EngineOutput`].
pub trait EncodingEngine: Send + Sync {
    /// Program name, for logs and error messages.
    fn program(&self) -> &str;

    fn run(
        &self,
        args: &[String],
        timeout: Option<Duration>,
        cancel: &CancelHandle,
    ) -> io::Result<EngineOutput>;
}

/// Runs ffmpeg as a tokio child process.
///
/// The child is killed when the timeout expires or the job is cancelled.
/// `run` blocks the calling thread, which must not be a runtime worker.
pub struct FfmpegEngine {
    ffmpeg_path: String,
    runtime: Handle,
}

impl FfmpegEngine {
    pub fn new(ffmpeg_path: impl Into<String>, runtime: Handle) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            runtime,
        }
    }

    async fn run_async(
        &self,
        args: &[String],
        timeout: Option<Duration>,
        cancel: &CancelHandle,
    ) -> io::Result<EngineOutput> {
        let child = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            output = child.wait_with_output() => output?,
            _ = deadline => {
                tracing::warn!("{} exceeded {:?}, killed", self.ffmpeg_path, timeout);
                return Ok(EngineOutput::timed_out());
            }
            _ = cancelled(cancel) => {
                tracing::warn!("{} stopped on cancellation", self.ffmpeg_path);
                return Ok(EngineOutput::cancelled());
            }
        };

        Ok(EngineOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            ..EngineOutput::default()
        })
    }
}

async fn cancelled(cancel: &CancelHandle) {
    while !cancel.is_cancelled() {
        tokio::time::sleep(CANCEL_POLL).await;
    }
}

impl EncodingEngine for FfmpegEngine {
    fn program(&self) -> &str {
        &self.ffmpeg_path
    }

    fn run(
        &self,
        args: &[String],
        timeout: Option<Duration>,
        cancel: &CancelHandle,
    ) -> io::Result<EngineOutput> {
        self.runtime.block_on(self.run_async(args, timeout, cancel))
    }
}
