//! Encode step - runs the single ffmpeg invocation for the plan.

use std::sync::Arc;

use crate::encode::{self, EncodingEngine};
use crate::models::JobStage;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, EncodeOutput, JobState};
use crate::plan::FfmpegCommandBuilder;

/// Encode step. Runs the engine exactly once; no retry.
pub struct EncodeStep {
    encoder: Arc<dyn EncodingEngine>,
}

impl EncodeStep {
    pub fn new(encoder: Arc<dyn EncodingEngine>) -> Self {
        Self { encoder }
    }
}

impl PipelineStep for EncodeStep {
    fn name(&self) -> &str {
        "Encode"
    }

    fn stage(&self) -> JobStage {
        JobStage::Executing
    }

    fn description(&self) -> &str {
        "Scale, concatenate, caption and encode"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let output = ctx.output_path();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StepError::io_error("creating output directory", e))?;
        }

        // A leftover file from an earlier run must not pass verification.
        if output.exists() {
            ctx.logger
                .debug(&format!("Removing stale output {}", output.display()));
            std::fs::remove_file(output)
                .map_err(|e| StepError::io_error("removing stale output", e))?;
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("No pipeline plan"))?;

        let args = FfmpegCommandBuilder::new(plan, ctx.output_path()).build();
        let program = self.encoder.program().to_string();
        let logging = &ctx.settings.logging;

        ctx.logger.command(&format!("{} {}", program, args.join(" ")));
        if logging.show_command_pretty {
            ctx.logger.log_command_pretty(&program, &args);
        }
        if logging.show_command_json {
            ctx.logger.log_command_json(&args);
        }

        let timeout = ctx.settings.tools.encode_timeout();
        ctx.logger.clear_tail();
        let result = encode::execute(
            self.encoder.as_ref(),
            &args,
            timeout,
            &ctx.cancel,
            logging.error_tail as usize,
            |line| ctx.logger.output_line(line, true),
        );

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                ctx.logger.show_tail(&format!("{} output", program));
                state.note(e.to_string());
                return Err(e.into());
            }
        };

        state.encode = Some(EncodeOutput {
            program,
            args,
            exit_code: output.exit_code.unwrap_or_default(),
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.encode {
            Some(ref encode) if encode.exit_code == 0 => Ok(()),
            Some(ref encode) => Err(StepError::invalid_output(format!(
                "Encode recorded exit code {}",
                encode.exit_code
            ))),
            None => Err(StepError::invalid_output("Encode results not recorded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EngineOutput;
    use crate::orchestrator::errors::ErrorKind;
    use crate::test_support::{planned_state, test_context, FakeEncoder};
    use tempfile::tempdir;

    #[test]
    fn runs_engine_once_with_planned_args() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = planned_state(&ctx);
        let encoder = Arc::new(FakeEncoder::new(EngineOutput::success("frame=600")).writing(64));
        let step = EncodeStep::new(encoder.clone());

        step.validate_input(&ctx).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        assert_eq!(encoder.call_count(), 1);
        let args = encoder.last_args().unwrap();
        assert_eq!(args.last().map(String::as_str), ctx.output_path().to_str());
        assert_eq!(state.encode.as_ref().unwrap().args, args);
    }

    #[test]
    fn non_zero_exit_is_encode_error_with_tail() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = planned_state(&ctx);
        let encoder =
            FakeEncoder::new(EngineOutput::failure(1, "Invalid argument\nConversion failed!"));
        let step = EncodeStep::new(Arc::new(encoder));

        let err = step.execute(&ctx, &mut state).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(err.to_string().contains("Conversion failed!"));
        assert!(state.encode.is_none());
        assert!(ctx.logger.get_tail().iter().any(|l| l.contains("Invalid argument")));
    }

    #[test]
    fn timeout_is_encode_error() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = planned_state(&ctx);
        let step = EncodeStep::new(Arc::new(FakeEncoder::new(EngineOutput::timed_out())));

        let err = step.execute(&ctx, &mut state).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn carriage_return_progress_stays_bounded() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = planned_state(&ctx);
        let mut stderr: String = (0..5_000)
            .map(|i| format!("frame={} fps=30 speed=1.0x\r", i))
            .collect();
        stderr.push_str("\nConversion failed!");
        let step = EncodeStep::new(Arc::new(FakeEncoder::new(EngineOutput::failure(1, stderr))));

        let err = step.execute(&ctx, &mut state).unwrap_err();

        assert!(err.to_string().len() < 8 * 1024);
        assert!(state.diagnostics.iter().all(|note| note.len() < 8 * 1024));
        let tail = ctx.logger.get_tail();
        assert_eq!(tail.last().map(String::as_str), Some("Conversion failed!"));
        assert!(tail.iter().all(|line| line.len() < 100));
    }

    #[test]
    fn cancellation_during_encode_is_not_an_encode_failure() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = planned_state(&ctx);
        let step = EncodeStep::new(Arc::new(FakeEncoder::new(EngineOutput::cancelled())));

        let err = step.execute(&ctx, &mut state).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn stale_output_is_removed_before_encode() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        std::fs::write(ctx.output_path(), b"old").unwrap();

        let step = EncodeStep::new(Arc::new(FakeEncoder::new(EngineOutput::success(""))));
        step.validate_input(&ctx).unwrap();

        assert!(!ctx.output_path().exists());
    }

    #[test]
    fn requires_plan() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = JobState::new("test");
        let encoder = Arc::new(FakeEncoder::new(EngineOutput::success("")));
        let step = EncodeStep::new(encoder.clone());

        assert!(step.execute(&ctx, &mut state).is_err());
        assert_eq!(encoder.call_count(), 0);
    }
}
