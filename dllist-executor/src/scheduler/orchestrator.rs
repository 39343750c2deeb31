//! Bounded-concurrency build orchestration.
//!
//! ## Architecture
//!
//! Every target gets its own tokio task, but a task only starts building
//! once it holds a permit from the admission gate:
//! 1. Spawn one task per target into a `JoinSet`
//! 2. Each task waits for a gate permit, then builds, finalizes, compresses
//!    and stores its list
//! 3. The first failure closes the gate; tasks still waiting for a permit
//!    give up without building, tasks already building run to completion
//! 4. Wait for every task, then report the first failure or all outcomes
//!
//! Permits are owned by the task and released on every exit path,
//! including panics.

use super::context::PreparedContext;
use crate::builder::ListBuilder;
use dllist_core::error::{DllistError, Result};
use dllist_core::list::finalize;
use dllist_core::types::{BuildId, BuildTarget};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, instrument, warn};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum builds holding an admission permit at once.
    pub max_concurrent_builds: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_builds: 3,
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `DLLIST_MAX_CONCURRENT_BUILDS` (at least 1). Where lists are
    /// written is a storage concern; see
    /// [`FsStorage::from_env`](crate::storage::FsStorage::from_env).
    pub fn from_env() -> Self {
        let max_concurrent_builds = std::env::var("DLLIST_MAX_CONCURRENT_BUILDS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(Self::default().max_concurrent_builds)
            .max(1);

        Self {
            max_concurrent_builds,
        }
    }

    /// Set maximum concurrent builds.
    pub fn with_max_concurrent_builds(mut self, max: usize) -> Self {
        self.max_concurrent_builds = max.max(1); // At least 1
        self
    }
}

/// Result of one successful build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The target built.
    pub target: BuildTarget,
    /// Log correlation id of the build.
    pub build_id: BuildId,
    /// Uncompressed payload length.
    pub filesize: u32,
    /// Payload checksum.
    pub checksum: u32,
    /// Stored (compressed) length.
    pub compressed_len: usize,
    /// Length of the rating images stored beside the list.
    pub image_len: usize,
    /// Where storage put the artifact.
    pub location: String,
    /// Wall time of the build.
    pub elapsed: Duration,
}

/// Result of a successful run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// One outcome per target, in the order targets were given.
    pub outcomes: Vec<BuildOutcome>,
    /// Most builds that held an admission permit at the same time.
    pub peak_in_flight: usize,
}

impl BuildReport {
    /// Outcome for `target`.
    pub fn outcome(&self, target: &BuildTarget) -> Option<&BuildOutcome> {
        self.outcomes.iter().find(|o| &o.target == target)
    }
}

/// Decrements the in-flight counter however the build ends.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(current: &Arc<AtomicUsize>, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(current))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// What a spawned task reports back.
struct TaskResult {
    index: usize,
    target: BuildTarget,
    /// `None` when the gate closed before the build was admitted.
    result: Option<Result<BuildOutcome>>,
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return "build task was cancelled".to_string();
    }
    let payload = err.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "build task panicked".to_string())
}

/// Runs one build per target with at most N in flight.
pub struct Orchestrator {
    config: OrchestratorConfig,
    context: PreparedContext,
}

impl Orchestrator {
    /// Create an orchestrator over a prepared context.
    pub fn new(context: PreparedContext, config: OrchestratorConfig) -> Self {
        Self { config, context }
    }

    /// The configuration in use.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Build every target.
    ///
    /// Returns only once every spawned task has finished. On failure the
    /// first error is returned and targets not yet admitted are skipped.
    #[instrument(
        skip(self, targets),
        fields(
            targets = targets.len(),
            max_concurrent = self.config.max_concurrent_builds,
        )
    )]
    pub async fn run(&self, targets: Vec<BuildTarget>) -> Result<BuildReport> {
        let started = Instant::now();
        let gate = Arc::new(Semaphore::new(self.config.max_concurrent_builds));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks: JoinSet<TaskResult> = JoinSet::new();
        let total = targets.len();

        for (index, target) in targets.into_iter().enumerate() {
            let gate = Arc::clone(&gate);
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            let context = self.context.clone();

            tasks.spawn(async move {
                // A closed gate means an earlier build failed.
                let Ok(_permit) = Arc::clone(&gate).acquire_owned().await else {
                    return TaskResult {
                        index,
                        target,
                        result: None,
                    };
                };
                let _in_flight = InFlight::enter(&current, &peak);

                // Separate task so a panic is caught with its target known.
                let build = tokio::spawn(async move { Self::build_one(&context, target).await });
                let result = match build.await {
                    Ok(result) => result,
                    Err(join_error) => Err(DllistError::BuildPanic {
                        target: target.to_string(),
                        message: panic_message(join_error),
                    }),
                };

                // Close while still holding the permit so no waiter is
                // admitted on its release.
                if result.is_err() {
                    gate.close();
                }

                TaskResult {
                    index,
                    target,
                    result: Some(result),
                }
            });
        }

        let mut outcomes: Vec<(usize, BuildOutcome)> = Vec::with_capacity(total);
        let mut first_error: Option<DllistError> = None;
        let mut skipped = 0usize;

        while let Some(joined) = tasks.join_next().await {
            let task = match joined {
                Ok(task) => task,
                Err(join_error) => {
                    gate.close();
                    let err = DllistError::BuildPanic {
                        target: "unknown".to_string(),
                        message: panic_message(join_error),
                    };
                    error!(error = %err, "Build task failed");
                    first_error.get_or_insert(err);
                    continue;
                }
            };

            match task.result {
                Some(Ok(outcome)) => outcomes.push((task.index, outcome)),
                Some(Err(err)) => {
                    gate.close();
                    error!(
                        target_region = %task.target.region,
                        target_language = %task.target.language,
                        code = err.code(),
                        error = %err,
                        "Build failed"
                    );
                    first_error.get_or_insert(err);
                }
                None => skipped += 1,
            }
        }

        if let Some(err) = first_error {
            warn!(
                built = outcomes.len(),
                skipped,
                total,
                "Aborting run after build failure"
            );
            return Err(err);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let report = BuildReport {
            outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            peak_in_flight: peak.load(Ordering::SeqCst),
        };

        info!(
            built = report.outcomes.len(),
            peak_in_flight = report.peak_in_flight,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "All lists built"
        );
        Ok(report)
    }

    /// Build, finalize, compress and store the list for one target.
    pub async fn build_one(context: &PreparedContext, target: BuildTarget) -> Result<BuildOutcome> {
        let build_id = BuildId::new();
        let span = info_span!(
            "build",
            build_id = %build_id,
            region = %target.region,
            language = %target.language,
        );
        Self::build_in_span(context, target, build_id)
            .instrument(span)
            .await
    }

    async fn build_in_span(
        context: &PreparedContext,
        target: BuildTarget,
        build_id: BuildId,
    ) -> Result<BuildOutcome> {
        let started = Instant::now();
        info!("Build started");

        let list = ListBuilder::new(context.source()).build(target).await?;
        let finalized = finalize(list)?;
        let compressed = context.compressor().compress(finalized.payload())?;
        let images = finalized.list().image_bytes();
        let location = context
            .storage()
            .store(&target, &compressed, images)
            .await?;

        let outcome = BuildOutcome {
            target,
            build_id,
            filesize: finalized.filesize(),
            checksum: finalized.checksum(),
            compressed_len: compressed.len(),
            image_len: images.len(),
            location,
            elapsed: started.elapsed(),
        };

        info!(
            filesize = outcome.filesize,
            checksum = %format!("{:#010x}", outcome.checksum),
            compressed = outcome.compressed_len,
            image_bytes = outcome.image_len,
            location = %outcome.location,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Build finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_three_builds() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_concurrent_builds, 3);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let config = OrchestratorConfig::default().with_max_concurrent_builds(0);
        assert_eq!(config.max_concurrent_builds, 1);
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        // Unset in the test environment.
        let config = OrchestratorConfig::from_env();
        assert!(config.max_concurrent_builds >= 1);
    }

    #[test]
    fn in_flight_tracks_peak() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = AtomicUsize::new(0);

        let a = InFlight::enter(&current, &peak);
        let b = InFlight::enter(&current, &peak);
        drop(a);
        let _c = InFlight::enter(&current, &peak);
        drop(b);

        assert_eq!(current.load(Ordering::SeqCst), 1);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }
}
