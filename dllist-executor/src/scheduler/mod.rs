//! Build scheduling.
//!
//! - [`BuildContext`] / [`PreparedContext`] - shared collaborators and the
//!   one-time preparation barrier
//! - [`Orchestrator`] - bounded-concurrency driver running one build per target

mod context;
mod orchestrator;

pub use context::{BuildContext, PreparedContext};
pub use orchestrator::{BuildOutcome, BuildReport, Orchestrator, OrchestratorConfig};
