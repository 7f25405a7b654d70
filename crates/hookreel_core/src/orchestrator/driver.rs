//! Job driver: runs one assembly job through the standard pipeline.
//!
//! The driver owns the parts of the state machine that sit outside the
//! step sequence: the up-front input count check, cleanup (which runs
//! on every outcome) and the terminal `Done`/`Failed` transition.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::Settings;
use crate::encode::{EncodingEngine, FfmpegEngine};
use crate::fetch::{Downloader, FetchResult, HttpDownloader};
use crate::logging::JobLogger;
use crate::models::{JobResult, JobSpec, JobStage, REQUIRED_INPUTS};
use crate::probe::{FfprobeEngine, InspectionEngine};

use super::create_standard_pipeline;
use super::errors::{ErrorKind, PipelineError, PipelineResult};
use super::pipeline::{CancelHandle, Pipeline};
use super::types::{Context, JobState};

/// The external capabilities a job needs.
#[derive(Clone)]
pub struct Engines {
    pub downloader: Arc<dyn Downloader>,
    pub inspector: Arc<dyn InspectionEngine>,
    pub encoder: Arc<dyn EncodingEngine>,
}

impl Engines {
    /// reqwest downloader, ffprobe and ffmpeg as configured in `[tools]`.
    ///
    /// HTTP transfers and both engines run on `runtime`; the job itself must
    /// be driven from a thread outside that runtime.
    pub fn real(settings: &Settings, runtime: Handle) -> FetchResult<Self> {
        let tools = &settings.tools;
        let downloader = HttpDownloader::new(runtime.clone(), settings.fetch.request_timeout())?;
        let inspector = FfprobeEngine::new(&tools.ffprobe_path, runtime.clone())
            .with_timeout(tools.probe_timeout());
        Ok(Self {
            downloader: Arc::new(downloader),
            inspector: Arc::new(inspector),
            encoder: Arc::new(FfmpegEngine::new(&tools.ffmpeg_path, runtime)),
        })
    }
}

/// How a job ended.
#[derive(Debug)]
pub struct JobOutcome {
    /// Result with stages and diagnostics, for reporting.
    pub result: JobResult,
    /// The failure, if the job failed.
    pub error: Option<PipelineError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Failure classification, `None` on success.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(PipelineError::kind)
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        self.kind().map_or(0, |kind| kind.exit_code())
    }

    pub fn into_result(self) -> PipelineResult<JobResult> {
        match self.error {
            None => Ok(self.result),
            Some(e) => Err(e),
        }
    }
}

/// Runs a single job with fixed settings and engines.
///
/// # Example
///
/// ```ignore
/// let engines = Engines::real(&settings, runtime.handle().clone())?;
/// let driver = JobDriver::new(settings, &engines);
/// let outcome = driver.run("reel", job_spec, logger);
/// std::process::exit(outcome.exit_code() as i32);
/// ```
pub struct JobDriver {
    settings: Settings,
    pipeline: Pipeline,
}

impl JobDriver {
    /// Create a driver running the standard pipeline over `engines`.
    pub fn new(settings: Settings, engines: &Engines) -> Self {
        Self {
            settings,
            pipeline: create_standard_pipeline(engines),
        }
    }

    /// Handle to stop the job.
    ///
    /// A running encode or fetch backoff stops right away, anything else at
    /// the next stage boundary. Cleanup still runs after cancellation.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.pipeline.cancel_handle()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one job to a terminal stage.
    pub fn run(&self, job_name: &str, job_spec: JobSpec, logger: Arc<JobLogger>) -> JobOutcome {
        self.run_with_state(job_name, job_spec, logger).0
    }

    /// Run one job and also return the final job state.
    pub fn run_with_state(
        &self,
        job_name: &str,
        job_spec: JobSpec,
        logger: Arc<JobLogger>,
    ) -> (JobOutcome, JobState) {
        let temp_root = Path::new(&self.settings.paths.temp_root);
        // Only a temp root this job creates is removed again.
        let created_root = (!temp_root.exists()).then_some(temp_root);
        let work_dir = temp_root.join(job_name);
        let ctx = Context::new(job_spec, self.settings.clone(), job_name, work_dir, logger)
            .with_cancel(self.pipeline.cancel_handle());
        let mut state = JobState::new(job_name);

        ctx.logger.info(&format!("Starting job: {}", job_name));
        ctx.logger.info(&format!(
            "Inputs: {} | Output: {}",
            ctx.job_spec.inputs.len(),
            ctx.output_path().display()
        ));

        let run = self.run_steps(&ctx, &mut state);

        if run.is_err() && state.stage_history.contains(&JobStage::Executing) {
            remove_partial_output(&ctx, &mut state);
        }
        cleanup(&ctx, &mut state, created_root);

        let outcome = match run {
            Ok(()) => {
                state.enter(JobStage::Done);
                finish_success(&ctx, &state)
            }
            Err(e) => {
                state.enter(JobStage::Failed);
                let message = e.to_string();
                ctx.logger.error(&format!("Job failed [{}]: {}", e.kind(), message));

                let mut result = JobResult::failed(job_name, message);
                fill_trail(&mut result, &state);
                JobOutcome {
                    result,
                    error: Some(e),
                }
            }
        };

        ctx.logger.info(&format!(
            "Stages: {}",
            state
                .stage_history
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        ));
        ctx.logger.flush();

        (outcome, state)
    }

    fn run_steps(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<()> {
        if !ctx.job_spec.has_required_inputs() {
            return Err(PipelineError::input_count(
                &ctx.job_name,
                REQUIRED_INPUTS,
                ctx.job_spec.inputs.len(),
            ));
        }

        let run_result = self.pipeline.run(ctx, state)?;
        ctx.logger.debug(&format!(
            "Steps completed: {}",
            run_result.steps_completed.join(", ")
        ));

        if state.verify.is_none() {
            return Err(PipelineError::setup_failed(
                &ctx.job_name,
                "pipeline finished without verifying the output",
            ));
        }
        Ok(())
    }
}

fn finish_success(ctx: &Context, state: &JobState) -> JobOutcome {
    let mut result = match state.verify {
        Some(ref verify) => {
            JobResult::done(&ctx.job_name, verify.output_path.clone(), verify.output_size)
        }
        None => JobResult::done(&ctx.job_name, ctx.output_path().to_path_buf(), 0),
    };
    fill_trail(&mut result, state);

    if let Some(ref verify) = state.verify {
        for stream in &verify.streams {
            result.diagnostics.push(format!("output {}", stream.describe()));
        }
    }

    ctx.logger.success(&format!(
        "Job completed: {} ({} bytes)",
        ctx.output_path().display(),
        result.output_size.unwrap_or_default()
    ));

    JobOutcome {
        result,
        error: None,
    }
}

fn fill_trail(result: &mut JobResult, state: &JobState) {
    result.topology = state.plan.as_ref().map(|plan| plan.topology);
    result.stages = state.stage_history.clone();
    result.diagnostics.extend(state.diagnostics.iter().cloned());
}

/// A failed encode must not leave a file that looks like an output.
fn remove_partial_output(ctx: &Context, state: &mut JobState) {
    let output = ctx.output_path();
    match fs::remove_file(output) {
        Ok(()) => ctx
            .logger
            .info(&format!("Removed partial output {}", output.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            ctx.logger.warn(&format!(
                "Could not remove partial output {}: {}",
                output.display(),
                e
            ));
            state.note(format!("partial output left at {}", output.display()));
        }
    }
}

/// Best-effort removal of every fetched file, then the work directory and
/// a temp root created by this job, each only if empty. Never fails the job.
fn cleanup(ctx: &Context, state: &mut JobState, created_root: Option<&Path>) {
    state.enter(JobStage::Cleanup);
    ctx.logger.phase("Cleanup");

    for path in ctx.destination_paths() {
        match fs::remove_file(&path) {
            Ok(()) => ctx.logger.debug(&format!("Removed {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                ctx.logger
                    .warn(&format!("Could not remove {}: {}", path.display(), e));
                state.note(format!("cleanup: {}: {}", path.display(), e));
            }
        }
    }

    let dirs = std::iter::once(ctx.work_dir.as_path()).chain(created_root);
    for dir in dirs.filter(|dir| dir.is_dir()) {
        if let Err(e) = fs::remove_dir(dir) {
            ctx.logger
                .debug(&format!("Directory {} left in place: {}", dir.display(), e));
        }
    }
}
