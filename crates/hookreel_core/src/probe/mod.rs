//! Media inspection.
//!
//! Each fetched clip is probed once for audio streams; the job-level
//! decision is whether any clip has audio. Probe failures degrade to
//! "no audio" instead of failing the job. The finished output can be
//! inspected once more for the diagnostic trail.

mod engine;
mod report;
mod types;

pub use engine::{FfprobeEngine, InspectionEngine};
pub use report::{
    has_real_audio, inspect_output, parse_audio_report, probe_audio, summarize_streams,
};
pub use types::{ProbeError, ProbeResult, StreamSelection, StreamSummary};
