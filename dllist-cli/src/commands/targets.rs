//! Targets command - list the (region, language) pairs a plan builds.

use anyhow::Result;
use std::path::Path;

/// Run the targets command.
pub fn run(plan: Option<&Path>) -> Result<()> {
    let plan = super::load_plan(plan)?;

    println!("{:<8} {:<10} {:<8} DIRECTORY", "REGION", "LANGUAGE", "RATINGS");
    for target in plan.targets() {
        println!(
            "{:<8} {:<10} {:<8} {}/{}",
            target.region.name(),
            target.language.name(),
            format!("{:?}", target.rating_group).to_lowercase(),
            target.region.code(),
            target.language.code()
        );
    }

    Ok(())
}
