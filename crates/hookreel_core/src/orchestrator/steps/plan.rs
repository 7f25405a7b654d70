//! Plan step - selects the topology and builds the pipeline plan.

use crate::models::JobStage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState};
use crate::plan::build_pipeline_plan;

/// Plan step. Pure: reads probed assets, writes the plan.
pub struct PlanStep;

impl PlanStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanStep {
    fn name(&self) -> &str {
        "Plan"
    }

    fn stage(&self) -> JobStage {
        JobStage::Planning
    }

    fn description(&self) -> &str {
        "Build the filter-graph plan"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        if state.probe.is_none() {
            return Err(StepError::precondition_failed("Inputs have not been probed"));
        }

        let plan = build_pipeline_plan(state.assets(), &ctx.job_spec.overlay)?;

        ctx.logger.info(&format!("Topology: {}", plan.topology));
        if plan.drops_source_audio() {
            ctx.logger
                .warn("Not every input has audio; concatenating video only, output has no audio");
            state.note("source audio dropped: some inputs are silent");
        }
        for caption in &plan.overlay.captions {
            ctx.logger.debug(&format!(
                "Caption {}: {:?} during {}",
                caption.role,
                caption.text,
                caption.window.enable_expr()
            ));
        }

        if ctx.settings.logging.show_plan_json {
            ctx.logger.log_json("Pipeline plan", &plan);
        }

        state.plan = Some(plan);
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.plan.is_none() {
            return Err(StepError::invalid_output("Plan not recorded"));
        }
        Ok(())
    }
}
