//! Process-wide build state.

use crate::source::ListSource;
use crate::storage::ListStorage;
use dllist_core::compress::{Compressor, Lz10};
use dllist_core::error::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Collaborators shared by every build.
///
/// Must be prepared before the orchestrator accepts it; see
/// [`BuildContext::prepare`].
pub struct BuildContext {
    source: Arc<dyn ListSource>,
    storage: Arc<dyn ListStorage>,
    compressor: Arc<dyn Compressor>,
}

impl BuildContext {
    /// Create a context using the LZ10 compressor.
    pub fn new(source: Arc<dyn ListSource>, storage: Arc<dyn ListStorage>) -> Self {
        Self {
            source,
            storage,
            compressor: Arc::new(Lz10::new()),
        }
    }

    /// Replace the compressor.
    pub fn with_compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// Run the source's one-time preparation.
    ///
    /// Consumes the context so no build can observe it unprepared.
    pub async fn prepare(self) -> Result<PreparedContext> {
        let started = Instant::now();
        self.source.prepare().await?;
        info!(
            compressor = self.compressor.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Build context prepared"
        );
        Ok(PreparedContext {
            inner: Arc::new(self),
        })
    }
}

/// A [`BuildContext`] whose preparation has completed.
#[derive(Clone)]
pub struct PreparedContext {
    inner: Arc<BuildContext>,
}

impl PreparedContext {
    /// Data source.
    pub fn source(&self) -> &dyn ListSource {
        self.inner.source.as_ref()
    }

    /// Artifact storage.
    pub fn storage(&self) -> &dyn ListStorage {
        self.inner.storage.as_ref()
    }

    /// Payload compressor.
    pub fn compressor(&self) -> &dyn Compressor {
        self.inner.compressor.as_ref()
    }
}

impl std::fmt::Debug for PreparedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedContext")
            .field("compressor", &self.compressor().name())
            .finish_non_exhaustive()
    }
}
