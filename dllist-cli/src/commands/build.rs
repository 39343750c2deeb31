//! Build command - build every list in the plan and store it on disk.

use anyhow::{Context, Result};
use dllist_executor::scheduler::{BuildContext, Orchestrator, OrchestratorConfig};
use dllist_executor::source::CatalogSource;
use dllist_executor::storage::FsStorage;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments of the build command.
pub struct BuildArgs {
    /// Catalog JSON file.
    pub catalog: PathBuf,
    /// Plan YAML file.
    pub plan: Option<PathBuf>,
    /// Output directory override.
    pub output: Option<PathBuf>,
    /// Concurrency override.
    pub max_concurrent: Option<usize>,
}

/// Run the build command.
pub async fn run(args: BuildArgs) -> Result<()> {
    let plan = super::load_plan(args.plan.as_deref())?;

    let storage = args
        .output
        .map(FsStorage::new)
        .unwrap_or_else(FsStorage::from_env);

    let mut config = OrchestratorConfig::from_env();
    if let Some(max) = args.max_concurrent {
        config = config.with_max_concurrent_builds(max);
    }

    let targets = plan.targets();
    tracing::info!(
        catalog = %args.catalog.display(),
        output = %storage.root().display(),
        targets = targets.len(),
        max_concurrent = config.max_concurrent_builds,
        "Building lists"
    );

    let context = BuildContext::new(
        Arc::new(CatalogSource::from_path(&args.catalog)),
        Arc::new(storage),
    )
    .prepare()
    .await
    .with_context(|| format!("Failed to prepare catalog: {}", args.catalog.display()))?;

    let report = Orchestrator::new(context, config).run(targets).await?;

    println!(
        "{:<8} {:<10} {:>10} {:>12} {:>10} {:>8}  LOCATION",
        "REGION", "LANGUAGE", "FILESIZE", "CHECKSUM", "STORED", "IMAGES"
    );
    for outcome in &report.outcomes {
        println!(
            "{:<8} {:<10} {:>10} {:>#12x} {:>10} {:>8}  {}",
            outcome.target.region.name(),
            outcome.target.language.name(),
            outcome.filesize,
            outcome.checksum,
            outcome.compressed_len,
            outcome.image_len,
            outcome.location
        );
    }
    println!();
    println!(
        "Built {} list(s), at most {} at once",
        report.outcomes.len(),
        report.peak_in_flight
    );

    Ok(())
}
