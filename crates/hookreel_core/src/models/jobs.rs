//! Job-related data structures (inputs, specs, results).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{JobStage, JobStatus, Topology};
use super::overlay::OverlaySpec;

/// Number of clips every job must receive.
pub const REQUIRED_INPUTS: usize = 4;

/// A single remote input and its fixed position in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Source locator (http(s) URL, file URL or local path).
    pub locator: String,
    /// Concatenation position, 0-based.
    pub ordinal: usize,
}

impl InputSpec {
    pub fn new(locator: impl Into<String>, ordinal: usize) -> Self {
        Self {
            locator: locator.into(),
            ordinal,
        }
    }

    /// File name the fetched clip is stored under inside the work dir.
    pub fn local_file_name(&self) -> String {
        format!("video_{}.mp4", self.ordinal)
    }
}

/// Specification for one assembly job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Inputs in ordinal order.
    pub inputs: Vec<InputSpec>,
    /// Caption overlays.
    pub overlay: OverlaySpec,
    /// Where the encoded file is written.
    pub output_path: PathBuf,
}

impl JobSpec {
    /// Build a job spec, assigning ordinals in the order locators are given.
    ///
    /// The count is not checked here; the job driver rejects anything other
    /// than [`REQUIRED_INPUTS`] before doing any work.
    pub fn new<I, S>(locators: I, overlay: OverlaySpec, output_path: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inputs = locators
            .into_iter()
            .enumerate()
            .map(|(ordinal, locator)| InputSpec::new(locator, ordinal))
            .collect();

        Self {
            inputs,
            overlay,
            output_path: output_path.into(),
        }
    }

    /// Whether the spec carries exactly the required number of inputs.
    pub fn has_required_inputs(&self) -> bool {
        self.inputs.len() == REQUIRED_INPUTS
    }
}

/// Result of a finished job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Final status.
    pub status: JobStatus,
    /// Job name/identifier.
    pub job_name: String,
    /// Path to the output file (only claimed on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Output size in bytes (only on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<u64>,
    /// Topology the planner selected, if planning was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<Topology>,
    /// Stages visited, in order.
    #[serde(default)]
    pub stages: Vec<JobStage>,
    /// Diagnostic trail (error message, engine tail, output streams).
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

impl JobResult {
    /// Create a successful result.
    pub fn done(job_name: impl Into<String>, output_path: PathBuf, output_size: u64) -> Self {
        Self {
            status: JobStatus::Done,
            job_name: job_name.into(),
            output_path: Some(output_path),
            output_size: Some(output_size),
            topology: None,
            stages: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Create a failed result.
    pub fn failed(job_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            job_name: job_name.into(),
            output_path: None,
            output_size: None,
            topology: None,
            stages: Vec::new(),
            diagnostics: vec![error.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_locator_order() {
        let spec = JobSpec::new(
            ["a", "b", "c", "d"],
            OverlaySpec::with_default_style("hook", "title"),
            "final.mp4",
        );
        let ordinals: Vec<usize> = spec.inputs.iter().map(|i| i.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(spec.inputs[2].locator, "c");
        assert!(spec.has_required_inputs());
    }

    #[test]
    fn wrong_count_is_reported() {
        let spec = JobSpec::new(
            ["a", "b", "c"],
            OverlaySpec::with_default_style("hook", "title"),
            "final.mp4",
        );
        assert!(!spec.has_required_inputs());
    }

    #[test]
    fn local_file_name_uses_ordinal() {
        assert_eq!(InputSpec::new("x", 3).local_file_name(), "video_3.mp4");
    }

    #[test]
    fn failed_result_claims_no_output() {
        let result = JobResult::failed("job", "boom");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"Failed\""));
        assert!(!json.contains("output_path"));
        assert!(!result.is_success());
    }
}
