//! Encode execution.
//!
//! The engine is invoked exactly once per job. A non-zero exit or a timeout
//! is terminal; a reported success still has to leave a non-empty output
//! file behind.

mod engine;
mod outcome;
mod types;

pub use engine::{EncodingEngine, FfmpegEngine};
pub use outcome::{classify, diagnostic_tail, execute, verify_output};
pub use types::{EncodeError, EncodeResult, EngineOutput};
