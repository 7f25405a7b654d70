//! Core enums used throughout the job.

use serde::{Deserialize, Serialize};

/// Stage of the job state machine.
///
/// Stages advance strictly in declaration order. Any failure jumps to
/// `Cleanup` and then `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStage {
    Init,
    Fetching,
    Probing,
    Planning,
    Executing,
    Verifying,
    Cleanup,
    Done,
    Failed,
}

impl JobStage {
    /// Whether this stage ends the job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Done | JobStage::Failed)
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobStage::Init => "Init",
            JobStage::Fetching => "Fetching",
            JobStage::Probing => "Probing",
            JobStage::Planning => "Planning",
            JobStage::Executing => "Executing",
            JobStage::Verifying => "Verifying",
            JobStage::Cleanup => "Cleanup",
            JobStage::Done => "Done",
            JobStage::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

/// Filter-graph shape selected by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// No input carries audio: a tone track is synthesized (variant A).
    SynthesizedAudio,
    /// At least one input carries audio: source audio is kept (variant B).
    PreservedAudio,
}

impl Topology {
    /// Select the topology from the job-level audio decision.
    pub fn for_audio(has_real_audio: bool) -> Self {
        if has_real_audio {
            Topology::PreservedAudio
        } else {
            Topology::SynthesizedAudio
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Topology::SynthesizedAudio => "A (synthesized audio)",
            Topology::PreservedAudio => "B (preserved audio)",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How per-clip streams are paired in the concat stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioPairing {
    /// Each clip contributes a (video, audio) pair.
    Joint,
    /// Only video streams are concatenated.
    VideoOnly,
}

/// Which caption an overlay carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionRole {
    Hook,
    Title,
}

impl std::fmt::Display for CaptionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionRole::Hook => write!(f, "hook"),
            CaptionRole::Title => write!(f, "title"),
        }
    }
}

/// Final status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Output produced and verified.
    Done,
    /// Job failed with error.
    Failed,
}
