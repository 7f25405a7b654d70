//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{InputSpec, JobSpec, JobStage, LocalAsset, PipelinePlan};
use crate::probe::StreamSummary;

use super::pipeline::CancelHandle;

/// Read-only context passed to pipeline steps.
///
/// Contains job configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Job specification (inputs, captions, output path).
    pub job_spec: JobSpec,
    /// Application settings.
    pub settings: Settings,
    /// Job name/identifier.
    pub job_name: String,
    /// Job-specific working directory (under temp_root).
    pub work_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Cancellation shared with the pipeline running this job.
    pub cancel: CancelHandle,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        job_spec: JobSpec,
        settings: Settings,
        job_name: impl Into<String>,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        Self {
            job_spec,
            settings,
            job_name: job_name.into(),
            work_dir,
            logger,
            cancel: CancelHandle::new(),
        }
    }

    /// Share `cancel` with the steps, so long waits can stop early.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Where the given input is fetched to.
    pub fn destination_for(&self, input: &InputSpec) -> PathBuf {
        self.work_dir.join(input.local_file_name())
    }

    /// Destination paths of every input, in ordinal order.
    pub fn destination_paths(&self) -> Vec<PathBuf> {
        self.job_spec
            .inputs
            .iter()
            .map(|input| self.destination_for(input))
            .collect()
    }

    /// Final output path.
    pub fn output_path(&self) -> &Path {
        &self.job_spec.output_path
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// This is the "write-once manifest" - steps can add new data but
/// should not overwrite existing values. Each step's output is stored
/// in its own section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Current stage.
    pub stage: JobStage,
    /// Every stage entered, in order (starts with `Init`).
    pub stage_history: Vec<JobStage>,
    /// Fetch results (from Fetch step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchOutput>,
    /// Probe results (from Probe step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeOutput>,
    /// The pipeline plan (from Plan step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PipelinePlan>,
    /// Encode results (from Encode step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<EncodeOutput>,
    /// Verified output (from Verify step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<VerifyOutput>,
    /// Non-fatal notes collected along the way.
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            stage: JobStage::Init,
            stage_history: vec![JobStage::Init],
            fetch: None,
            probe: None,
            plan: None,
            encode: None,
            verify: None,
            diagnostics: Vec::new(),
        }
    }

    /// Move to `stage` and record it in the history.
    pub fn enter(&mut self, stage: JobStage) {
        self.stage = stage;
        self.stage_history.push(stage);
    }

    /// Add a diagnostic note.
    pub fn note(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    /// Current assets: probed if probing ran, else as fetched.
    pub fn assets(&self) -> &[LocalAsset] {
        if let Some(ref probe) = self.probe {
            &probe.assets
        } else if let Some(ref fetch) = self.fetch {
            &fetch.assets
        } else {
            &[]
        }
    }
}

/// Output from the Fetch step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutput {
    /// Fetched assets in ordinal order.
    pub assets: Vec<LocalAsset>,
    /// Total download attempts across all inputs.
    pub total_attempts: u32,
}

/// Output from the Probe step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutput {
    /// Assets with their audio reports.
    pub assets: Vec<LocalAsset>,
    /// Whether any asset has audio.
    pub has_real_audio: bool,
    /// Ordinals whose probe failed and were treated as silent.
    pub failed_ordinals: Vec<usize>,
}

/// Output from the Encode step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeOutput {
    /// Engine program that was run.
    pub program: String,
    /// Arguments passed to the engine.
    pub args: Vec<String>,
    /// Engine exit code.
    pub exit_code: i32,
}

/// Output from the Verify step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutput {
    pub output_path: PathBuf,
    pub output_size: u64,
    /// Streams of the output, when inspection ran and succeeded.
    #[serde(default)]
    pub streams: Vec<StreamSummary>,
}
