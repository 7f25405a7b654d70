//! hookreel core - backend logic for assembling captioned vertical shorts.
//!
//! Fetches four clips, probes them for audio, plans an ffmpeg filter graph
//! (scale, concatenate, caption, encode) and runs it once. This crate has
//! no CLI dependencies; `hookreel_cli` wires it to the environment.

pub mod config;
pub mod encode;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod plan;
pub mod probe;

#[cfg(test)]
pub(crate) mod test_support;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
