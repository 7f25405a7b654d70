//! Fake engines and fixtures shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::Settings;
use crate::encode::{EncodingEngine, EngineOutput};
use crate::fetch::{Downloader, FetchError, FetchResult};
use crate::logging::{JobLogger, LogConfig};
use crate::models::{JobSpec, LocalAsset, OverlaySpec};
use crate::orchestrator::{CancelHandle, Context, FetchOutput, JobState, ProbeOutput};
use crate::plan::build_pipeline_plan;
use crate::probe::{InspectionEngine, ProbeError, ProbeResult, StreamSelection};

const FAKE_CLIP: &[u8] = b"\x00\x00\x00\x18ftypmp42fake clip";

/// Downloader that writes a small file, optionally failing some locators
/// a set number of times first.
#[derive(Default)]
pub struct FakeDownloader {
    failures: Mutex<HashMap<String, u32>>,
    empty: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` downloads of `locator`.
    pub fn failing(self, locator: &str, times: u32) -> Self {
        self.failures.lock().insert(locator.to_string(), times);
        self
    }

    /// Report success for `locator` but leave an empty file.
    pub fn writing_empty(mut self, locator: &str) -> Self {
        self.empty.insert(locator.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, locator: &str, dest: &Path) -> FetchResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(remaining) = self.failures.lock().get_mut(locator) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::HttpStatus {
                    status: 503,
                    locator: locator.to_string(),
                });
            }
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let body: &[u8] = if self.empty.contains(locator) { b"" } else { FAKE_CLIP };
        fs::write(dest, body)?;
        Ok(())
    }
}

/// Inspection engine answering from canned reports keyed by file name.
#[derive(Default)]
pub struct FakeInspector {
    with_audio: HashSet<String>,
    failing: HashSet<String>,
    outputs: HashSet<String>,
}

impl FakeInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an AAC stream for `file_name`.
    pub fn with_audio(mut self, file_name: &str) -> Self {
        self.with_audio.insert(file_name.to_string());
        self
    }

    /// Fail every inspection of `file_name`.
    pub fn failing(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Report a 1080x1920 video plus stereo audio for `file_name`.
    pub fn with_output_streams(mut self, file_name: &str) -> Self {
        self.outputs.insert(file_name.to_string());
        self
    }
}

fn video_stream() -> Value {
    json!({
        "index": 0,
        "codec_type": "video",
        "codec_name": "h264",
        "width": 1080,
        "height": 1920,
        "duration": "20.000000"
    })
}

fn audio_stream() -> Value {
    json!({
        "index": 1,
        "codec_type": "audio",
        "codec_name": "aac",
        "sample_rate": "48000",
        "channels": 2
    })
}

impl InspectionEngine for FakeInspector {
    fn inspect(&self, path: &Path, selection: StreamSelection) -> ProbeResult<Value> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.failing.contains(&name) {
            return Err(ProbeError::CommandFailed {
                tool: "ffprobe".to_string(),
                exit_code: 1,
                message: "Invalid data found when processing input".to_string(),
            });
        }

        let has_audio = self.with_audio.contains(&name) || self.outputs.contains(&name);
        let mut streams = Vec::new();
        if selection == StreamSelection::All {
            streams.push(video_stream());
        }
        if has_audio {
            streams.push(audio_stream());
        }
        Ok(json!({ "streams": streams }))
    }
}

/// Encoding engine returning a canned outcome.
pub struct FakeEncoder {
    output: EngineOutput,
    write_bytes: Option<usize>,
    calls: AtomicUsize,
    last_args: Mutex<Option<Vec<String>>>,
}

impl FakeEncoder {
    pub fn new(output: EngineOutput) -> Self {
        Self {
            output,
            write_bytes: None,
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(None),
        }
    }

    /// Write `bytes` zero bytes to the output path (the last argument) on
    /// every run, whatever the outcome.
    pub fn writing(mut self, bytes: usize) -> Self {
        self.write_bytes = Some(bytes);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_args(&self) -> Option<Vec<String>> {
        self.last_args.lock().clone()
    }
}

impl EncodingEngine for FakeEncoder {
    fn program(&self) -> &str {
        "ffmpeg"
    }

    fn run(
        &self,
        args: &[String],
        _timeout: Option<Duration>,
        _cancel: &CancelHandle,
    ) -> io::Result<EngineOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock() = Some(args.to_vec());

        if let (Some(bytes), Some(output)) = (self.write_bytes, args.last()) {
            fs::write(output, vec![0u8; bytes])?;
        }
        Ok(self.output.clone())
    }
}

/// Settings rooted in `dir`, without fetch backoff.
pub fn test_settings(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.temp_root = dir.join("tmp").to_string_lossy().to_string();
    settings.paths.logs_folder = dir.join("logs").to_string_lossy().to_string();
    settings.fetch.backoff_secs = 0;
    settings
}

/// Context for a job with `inputs` locators, writing `dir/final.mp4`.
pub fn test_context(dir: &Path, inputs: usize) -> Context {
    let locators: Vec<String> = (0..inputs)
        .map(|i| format!("https://cdn.example/clip_{}.mp4", i))
        .collect();
    let spec = JobSpec::new(
        locators,
        OverlaySpec::with_default_style("HELLO", "WORLD"),
        dir.join("final.mp4"),
    );
    let logger = JobLogger::console_only("test", LogConfig::default(), None);

    Context::new(
        spec,
        test_settings(dir),
        "test",
        dir.join("work"),
        Arc::new(logger),
    )
}

/// State after a successful fetch of every input in `ctx`.
pub fn fetched_state(ctx: &Context) -> JobState {
    let mut assets = Vec::new();
    for input in &ctx.job_spec.inputs {
        let path = ctx.destination_for(input);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, FAKE_CLIP).unwrap();
        assets.push(LocalAsset::fetched(input.ordinal, path, FAKE_CLIP.len() as u64));
    }

    let mut state = JobState::new("test");
    state.fetch = Some(FetchOutput {
        total_attempts: assets.len() as u32,
        assets,
    });
    state
}

/// State after planning four silent inputs.
pub fn planned_state(ctx: &Context) -> JobState {
    let mut state = fetched_state(ctx);
    state.probe = Some(ProbeOutput {
        assets: state.assets().to_vec(),
        has_real_audio: false,
        failed_ordinals: Vec::new(),
    });
    let plan = build_pipeline_plan(state.assets(), &ctx.job_spec.overlay).unwrap();
    state.plan = Some(plan);
    state
}
