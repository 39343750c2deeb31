//! dllist Executor - build orchestration for download lists.
//!
//! This crate drives list construction for every configured target:
//! - Data source seam ([`source::ListSource`]) and a JSON catalog source
//! - Per-target list builder running the tables in canonical order
//! - Artifact storage on disk or in memory
//! - Bounded-concurrency orchestrator with a one-time preparation barrier
//! - Logging setup

#![warn(missing_docs)]

pub mod builder;
pub mod observability;
pub mod scheduler;
pub mod source;
pub mod storage;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::ListBuilder;
    pub use crate::observability::{LogFormat, TracingConfig, TracingGuard, init_tracing};
    pub use crate::scheduler::{
        BuildContext, BuildOutcome, BuildReport, Orchestrator, OrchestratorConfig,
        PreparedContext,
    };
    pub use crate::source::{Catalog, CatalogSource, ListSource, SourceFuture};
    pub use crate::storage::{FsStorage, ListStorage, MemoryStorage};
}
