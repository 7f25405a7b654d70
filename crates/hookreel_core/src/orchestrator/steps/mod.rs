//! Pipeline step implementations.
//!
//! Each step handles one stage of the assembly job.

mod encode;
mod fetch;
mod plan;
mod probe;
mod verify;

pub use encode::EncodeStep;
pub use fetch::FetchStep;
pub use plan::PlanStep;
pub use probe::ProbeStep;
pub use verify::VerifyStep;
