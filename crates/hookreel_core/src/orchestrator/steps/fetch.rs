//! Fetch step - downloads the four inputs into the job work directory.

use std::sync::Arc;

use crate::fetch::{fetch_all, Downloader, RetryPolicy};
use crate::models::{JobStage, REQUIRED_INPUTS};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, FetchOutput, JobState};

/// Fetch step for downloading inputs with bounded retry.
pub struct FetchStep {
    downloader: Arc<dyn Downloader>,
}

impl FetchStep {
    pub fn new(downloader: Arc<dyn Downloader>) -> Self {
        Self { downloader }
    }
}

impl PipelineStep for FetchStep {
    fn name(&self) -> &str {
        "Fetch"
    }

    fn stage(&self) -> JobStage {
        JobStage::Fetching
    }

    fn description(&self) -> &str {
        "Download input clips with retry"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.job_spec.has_required_inputs() {
            return Err(StepError::invalid_input(format!(
                "Expected {} inputs, got {}",
                REQUIRED_INPUTS,
                ctx.job_spec.inputs.len()
            )));
        }

        std::fs::create_dir_all(&ctx.work_dir)
            .map_err(|e| StepError::io_error("creating work directory", e))?;

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let fetch = &ctx.settings.fetch;
        let policy = RetryPolicy::from_settings(fetch);

        ctx.logger.info(&format!(
            "Fetching {} inputs ({}; {} attempt(s), {}s backoff)",
            ctx.job_spec.inputs.len(),
            if fetch.parallel { "parallel" } else { "sequential" },
            policy.max_attempts,
            policy.backoff.as_secs()
        ));
        for input in &ctx.job_spec.inputs {
            ctx.logger.debug(&format!(
                "Input {}: {} -> {}",
                input.ordinal,
                input.locator,
                ctx.destination_for(input).display()
            ));
        }

        let fetched = fetch_all(
            self.downloader.as_ref(),
            &ctx.job_spec.inputs,
            &ctx.work_dir,
            &policy,
            fetch.parallel,
            &ctx.cancel,
        )?;

        let mut assets = Vec::with_capacity(fetched.len());
        let mut total_attempts = 0;
        for item in fetched {
            for failure in &item.failures {
                ctx.logger
                    .warn(&format!("Input {} {}", item.asset.ordinal, failure));
                state.note(format!("fetch input {} {}", item.asset.ordinal, failure));
            }
            ctx.logger.info(&format!(
                "Input {}: {} bytes ({} attempt(s))",
                item.asset.ordinal, item.asset.size_bytes, item.attempts
            ));
            total_attempts += item.attempts;
            assets.push(item.asset);
        }

        state.fetch = Some(FetchOutput {
            assets,
            total_attempts,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let fetch = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Fetch results not recorded"))?;

        if fetch.assets.len() != REQUIRED_INPUTS {
            return Err(StepError::invalid_output(format!(
                "Expected {} fetched assets, got {}",
                REQUIRED_INPUTS,
                fetch.assets.len()
            )));
        }

        for asset in &fetch.assets {
            if !asset.path.exists() || asset.size_bytes == 0 {
                return Err(StepError::invalid_output(format!(
                    "Fetched file missing or empty: {}",
                    asset.path.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::errors::ErrorKind;
    use crate::test_support::{test_context, FakeDownloader};
    use tempfile::tempdir;

    #[test]
    fn fetch_step_has_correct_name() {
        let step = FetchStep::new(Arc::new(FakeDownloader::new()));
        assert_eq!(step.name(), "Fetch");
        assert_eq!(step.stage(), JobStage::Fetching);
    }

    #[test]
    fn fetches_all_inputs_in_order() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let step = FetchStep::new(Arc::new(FakeDownloader::new()));
        let mut state = JobState::new("test");

        step.validate_input(&ctx).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let ordinals: Vec<usize> = state.assets().iter().map(|a| a.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(state.fetch.as_ref().unwrap().total_attempts, 4);
    }

    #[test]
    fn exhausted_input_is_a_fetch_error() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let downloader = FakeDownloader::new().failing(&ctx.job_spec.inputs[2].locator, 3);
        let step = FetchStep::new(Arc::new(downloader));
        let mut state = JobState::new("test");

        let err = step.execute(&ctx, &mut state).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(state.fetch.is_none());
    }

    #[test]
    fn wrong_input_count_fails_validation() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 3);
        let step = FetchStep::new(Arc::new(FakeDownloader::new()));
        assert!(matches!(
            step.validate_input(&ctx),
            Err(StepError::InvalidInput(_))
        ));
    }
}
