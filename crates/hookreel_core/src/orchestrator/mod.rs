//! Pipeline orchestrator for coordinating job execution.
//!
//! This module provides the infrastructure for running the assembly job.
//! A job is a fixed sequence of steps that validate, execute, and record
//! their results in a shared [`JobState`].
//!
//! # Architecture
//!
//! ```text
//! JobDriver
//!     ├── input count check
//!     ├── Pipeline
//!     │     ├── Step: Fetch     (Fetching)
//!     │     ├── Step: Probe     (Probing)
//!     │     ├── Step: Plan      (Planning)
//!     │     ├── Step: Encode    (Executing)
//!     │     └── Step: Verify    (Verifying)
//!     ├── cleanup               (Cleanup, always)
//!     └── Done | Failed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hookreel_core::orchestrator::{Engines, JobDriver};
//!
//! let engines = Engines::real(&settings, runtime.handle().clone())?;
//! let driver = JobDriver::new(settings, &engines);
//!
//! let outcome = driver.run("reel", job_spec, logger);
//! println!("Stages: {:?}", outcome.result.stages);
//! ```

mod driver;
mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use driver::{Engines, JobDriver, JobOutcome};
pub use errors::{ErrorKind, PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{EncodeStep, FetchStep, PlanStep, ProbeStep, VerifyStep};
pub use types::{Context, EncodeOutput, FetchOutput, JobState, ProbeOutput, VerifyOutput};

/// Create the standard pipeline with all steps in the correct order.
///
/// 1. Fetch - download the four inputs with bounded retry
/// 2. Probe - report audio presence per input
/// 3. Plan - choose the topology and build the filter graph
/// 4. Encode - run ffmpeg once
/// 5. Verify - check the output exists and is non-empty
pub fn create_standard_pipeline(engines: &Engines) -> Pipeline {
    Pipeline::new()
        .with_step(FetchStep::new(engines.downloader.clone()))
        .with_step(ProbeStep::new(engines.inspector.clone()))
        .with_step(PlanStep::new())
        .with_step(EncodeStep::new(engines.encoder.clone()))
        .with_step(VerifyStep::new(Some(engines.inspector.clone())))
}
