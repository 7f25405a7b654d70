//! Probe step - reports audio presence for every fetched clip.

use std::sync::Arc;

use crate::models::{AudioInfo, JobStage};
use crate::orchestrator::errors::{ErrorKind, StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, ProbeOutput};
use crate::probe::{has_real_audio, probe_audio, InspectionEngine};

/// Probe step. Inspection failures count as "no audio".
pub struct ProbeStep {
    inspector: Arc<dyn InspectionEngine>,
}

impl ProbeStep {
    pub fn new(inspector: Arc<dyn InspectionEngine>) -> Self {
        Self { inspector }
    }
}

impl PipelineStep for ProbeStep {
    fn name(&self) -> &str {
        "Probe"
    }

    fn stage(&self) -> JobStage {
        JobStage::Probing
    }

    fn description(&self) -> &str {
        "Inspect clips for audio streams"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let fetched = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Inputs have not been fetched"))?
            .assets
            .clone();

        let mut assets = Vec::with_capacity(fetched.len());
        let mut failed_ordinals = Vec::new();

        for asset in fetched {
            let audio = match probe_audio(self.inspector.as_ref(), &asset.path) {
                Ok(audio) => audio,
                Err(e) => {
                    ctx.logger.warn(&format!(
                        "Probe of input {} failed, treating as silent: {}",
                        asset.ordinal, e
                    ));
                    state.note(format!("[{}] input {}: {}", ErrorKind::Probe, asset.ordinal, e));
                    failed_ordinals.push(asset.ordinal);
                    AudioInfo::absent()
                }
            };

            ctx.logger
                .info(&format!("Input {}: {}", asset.ordinal, audio.describe()));
            assets.push(asset.with_audio(audio));
        }

        let has_audio = has_real_audio(&assets);
        ctx.logger.info(&format!(
            "Source audio: {}",
            if has_audio { "present" } else { "none" }
        ));

        state.probe = Some(ProbeOutput {
            assets,
            has_real_audio: has_audio,
            failed_ordinals,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.probe.is_none() {
            return Err(StepError::invalid_output("Probe results not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fetched_state, test_context, FakeInspector};
    use tempfile::tempdir;

    #[test]
    fn records_audio_per_asset() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = fetched_state(&ctx);
        let step = ProbeStep::new(Arc::new(FakeInspector::new().with_audio("video_1.mp4")));

        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let probe = state.probe.as_ref().unwrap();
        assert!(probe.has_real_audio);
        let flags: Vec<bool> = probe.assets.iter().map(|a| a.has_audio()).collect();
        assert_eq!(flags, vec![false, true, false, false]);
    }

    #[test]
    fn probe_failure_degrades_to_no_audio() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = fetched_state(&ctx);
        let inspector = FakeInspector::new()
            .failing("video_0.mp4")
            .failing("video_1.mp4")
            .failing("video_2.mp4")
            .failing("video_3.mp4");
        let step = ProbeStep::new(Arc::new(inspector));

        step.execute(&ctx, &mut state).unwrap();

        let probe = state.probe.as_ref().unwrap();
        assert!(!probe.has_real_audio);
        assert_eq!(probe.failed_ordinals, vec![0, 1, 2, 3]);
        assert_eq!(state.diagnostics.len(), 4);
        assert!(state.diagnostics[0].starts_with("[probe]"));
    }

    #[test]
    fn requires_fetched_assets() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path(), 4);
        let mut state = JobState::new("test");
        let step = ProbeStep::new(Arc::new(FakeInspector::new()));

        assert!(matches!(
            step.execute(&ctx, &mut state),
            Err(StepError::PreconditionFailed(_))
        ));
    }
}
