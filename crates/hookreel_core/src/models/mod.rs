//! Data models for hookreel.
//!
//! This module contains the core data structures shared by every stage:
//! - Enums for job stages, topology variants and job status
//! - Input and job structures (locators, job spec, results)
//! - Media structures (fetched assets and their audio report)
//! - Caption overlays and the declarative pipeline plan

mod enums;
mod jobs;
mod media;
mod overlay;
mod plan;

pub use enums::{AudioPairing, CaptionRole, JobStage, JobStatus, Topology};
pub use jobs::{InputSpec, JobResult, JobSpec, REQUIRED_INPUTS};
pub use media::{AudioInfo, LocalAsset};
pub use overlay::{
    Caption, CaptionAnchor, OverlaySpec, TextStyle, TimeWindow, HOOK_WINDOW, TITLE_WINDOW,
};
pub use plan::{
    AssetStage, AudioResample, AudioSource, EncodeParams, FrameTarget, MergeStage, OverlayStage,
    PipelinePlan, ToneSpec,
};
