//! Inspection engine capability and the ffprobe implementation.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tokio::runtime::Handle;

use super::types::{ProbeError, ProbeResult, StreamSelection};

/// Reports the streams of a media file as ffprobe-style JSON
/// (`{"streams": [...]}`).
pub trait InspectionEngine: Send + Sync {
    fn inspect(&self, path: &Path, selection: StreamSelection) -> ProbeResult<Value>;
}

/// Runs ffprobe as a tokio child process, killed if it outlives the
/// timeout. `inspect` blocks the calling thread, which must not be a
/// runtime worker.
pub struct FfprobeEngine {
    ffprobe_path: String,
    runtime: Handle,
    timeout: Option<Duration>,
}

impl FfprobeEngine {
    pub fn new(ffprobe_path: impl Into<String>, runtime: Handle) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            runtime,
            timeout: None,
        }
    }

    /// Limit each invocation to `timeout`; `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments for one inspection, without the program name.
    fn build_args(path: &Path, selection: StreamSelection) -> Vec<String> {
        let mut args = vec!["-v".to_string(), "error".to_string()];
        if selection == StreamSelection::Audio {
            args.push("-select_streams".to_string());
            args.push("a".to_string());
        }
        args.extend(["-show_streams", "-of", "json"].map(String::from));
        args.push(path.to_string_lossy().to_string());
        args
    }
}

impl InspectionEngine for FfprobeEngine {
    fn inspect(&self, path: &Path, selection: StreamSelection) -> ProbeResult<Value> {
        if !path.exists() {
            return Err(ProbeError::FileNotFound(path.to_path_buf()));
        }

        let tool = &self.ffprobe_path;
        let spawn_error = |source| ProbeError::Spawn {
            tool: tool.clone(),
            source,
        };

        let output = self.runtime.block_on(async {
            let child = Command::new(tool)
                .args(Self::build_args(path, selection))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(spawn_error)?;

            let wait = child.wait_with_output();
            let output = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                    ProbeError::TimedOut {
                        tool: tool.clone(),
                        timeout: limit,
                    }
                })?,
                None => wait.await,
            };
            output.map_err(spawn_error)
        })?;

        if !output.status.success() {
            return Err(ProbeError::CommandFailed {
                tool: self.ffprobe_path.clone(),
                exit_code: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn engine(ffprobe_path: &str, runtime: &tokio::runtime::Runtime) -> FfprobeEngine {
        FfprobeEngine::new(ffprobe_path, runtime.handle().clone())
    }

    #[test]
    fn audio_selection_restricts_streams() {
        let args = FfprobeEngine::build_args(Path::new("video_0.mp4"), StreamSelection::Audio);
        assert_eq!(
            args,
            vec![
                "-v",
                "error",
                "-select_streams",
                "a",
                "-show_streams",
                "-of",
                "json",
                "video_0.mp4"
            ]
        );
    }

    #[test]
    fn all_selection_has_no_filter() {
        let args = FfprobeEngine::build_args(Path::new("final.mp4"), StreamSelection::All);
        assert!(!args.contains(&"-select_streams".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("final.mp4"));
    }

    #[test]
    fn missing_file_is_reported_before_spawning() {
        let dir = tempdir().unwrap();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let err = engine("/nonexistent/ffprobe", &runtime)
            .inspect(&dir.path().join("absent.mp4"), StreamSelection::Audio)
            .unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound(_)));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("video_0.mp4");
        std::fs::write(&clip, b"data").unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let err = engine("/nonexistent/ffprobe", &runtime)
            .inspect(&clip, StreamSelection::Audio)
            .unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn hung_ffprobe_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let clip = dir.path().join("video_0.mp4");
        std::fs::write(&clip, b"data").unwrap();
        let script = dir.path().join("ffprobe");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let started = std::time::Instant::now();
        let err = engine(script.to_str().unwrap(), &runtime)
            .with_timeout(Some(Duration::from_millis(200)))
            .inspect(&clip, StreamSelection::Audio)
            .unwrap_err();

        assert!(matches!(err, ProbeError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
