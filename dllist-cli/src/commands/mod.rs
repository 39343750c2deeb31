//! CLI command implementations.

pub mod build;
pub mod targets;
pub mod verify;
pub mod version;

use anyhow::{Context, Result};
use dllist_core::BuildPlan;
use std::path::Path;

/// Load the plan at `path`, or the default plan.
pub(crate) fn load_plan(path: Option<&Path>) -> Result<BuildPlan> {
    match path {
        Some(path) => BuildPlan::from_yaml_file(path)
            .with_context(|| format!("Failed to load plan: {}", path.display())),
        None => Ok(BuildPlan::default()),
    }
}
