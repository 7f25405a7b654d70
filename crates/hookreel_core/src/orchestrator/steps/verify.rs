//! Verify step - confirms the engine's success claim against the disk.

use std::sync::Arc;

use crate::encode::verify_output;
use crate::models::JobStage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, VerifyOutput};
use crate::probe::{inspect_output, InspectionEngine};

/// Verify step.
///
/// The output must exist and be non-empty. Stream inspection of the
/// output is optional and informational only.
pub struct VerifyStep {
    inspector: Option<Arc<dyn InspectionEngine>>,
}

impl VerifyStep {
    pub fn new(inspector: Option<Arc<dyn InspectionEngine>>) -> Self {
        Self { inspector }
    }
}

impl PipelineStep for VerifyStep {
    fn name(&self) -> &str {
        "Verify"
    }

    fn stage(&self) -> JobStage {
        JobStage::Verifying
    }

    fn description(&self) -> &str {
        "Check the output file"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        if state.encode.is_none() {
            return Err(StepError::precondition_failed("Encode has not run"));
        }

        let output_path = ctx.output_path().to_path_buf();
        let output_size = verify_output(&output_path)?;
        ctx.logger.info(&format!(
            "Output {} ({} bytes)",
            output_path.display(),
            output_size
        ));

        let mut streams = Vec::new();
        if let Some(ref inspector) = self.inspector {
            if ctx.settings.tools.inspect_output {
                match inspect_output(inspector.as_ref(), &output_path) {
                    Ok(found) => {
                        for stream in &found {
                            ctx.logger.info(&format!("  {}", stream.describe()));
                        }
                        streams = found;
                    }
                    Err(e) => {
                        ctx.logger
                            .warn(&format!("Could not inspect output streams: {}", e));
                    }
                }
            }
        }

        state.verify = Some(VerifyOutput {
            output_path,
            output_size,
            streams,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.verify.is_none() {
            return Err(StepError::invalid_output("Verification result not recorded"));
        }
        Ok(())
    }
}
