//! Pipeline planning for the encode invocation.
//!
//! # Architecture
//!
//! - **planner**: picks the topology from the probed assets and builds a
//!   declarative [`PipelinePlan`](crate::models::PipelinePlan)
//! - **graph**: renders the plan into `-filter_complex` syntax
//! - **command**: wraps the graph into the full ffmpeg argument vector
//! - **escape**: filter-option and filter-graph escaping for caption text

mod command;
mod escape;
mod graph;
mod planner;

pub use command::FfmpegCommandBuilder;
pub use escape::{escape_drawtext_text, escape_graph_value, escape_option_value};
pub use graph::{render_filter_graph, AUDIO_OUT, VIDEO_OUT};
pub use planner::{build_pipeline_plan, PlanError};
