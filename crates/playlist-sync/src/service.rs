//! Per-user synchronization: fetch the graph document, plan, execute.

use std::time::Instant;

use playlist_graph::{validate_document, PlanOptions, PlaylistGraph, PlaylistOperation};
use playlist_monitoring::SyncMetrics;
use playlist_store::{GraphDocumentStore, InMemoryGraphStore};
use tracing::{info, instrument, warn};

use crate::catalog::TrackCatalog;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::executor::{ExecutionReport, PlanExecutor};

/// Sync service over a document store and a track catalog
#[derive(Debug)]
pub struct SyncService<S, C> {
    store: S,
    executor: PlanExecutor<C>,
    options: PlanOptions,
}

impl<C: TrackCatalog> SyncService<InMemoryGraphStore, C> {
    /// Service over the configured service's collection of `backing`
    pub fn in_memory(config: &SyncConfig, backing: &InMemoryGraphStore, catalog: C) -> Self {
        Self::new(config, backing.collection_view(config.service.as_str()), catalog)
    }
}

impl<S: GraphDocumentStore, C: TrackCatalog> SyncService<S, C> {
    pub fn new(config: &SyncConfig, store: S, catalog: C) -> Self {
        Self {
            store,
            executor: PlanExecutor::new(catalog, config.max_batch_size),
            options: config.plan_options(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        self.executor.catalog()
    }

    /// Plan the operations for one user.
    ///
    /// Returns `Ok(None)` when the user's document contains a cycle; no plan
    /// exists for such a graph. Every other fault is an error.
    #[instrument(skip(self))]
    pub async fn plan_for_user(&self, user_id: &str) -> SyncResult<Option<Vec<PlaylistOperation>>> {
        let started = Instant::now();
        let document = self.store.fetch(user_id).await?;

        let graph = match validate_document(&document).and_then(|_| PlaylistGraph::build(&document)) {
            Ok(graph) => graph,
            Err(err) => {
                SyncMetrics::record_rejected_document(user_id, err.error_code());
                if err.is_cycle() {
                    warn!(error = %err, "No plan for cyclic graph document");
                    return Ok(None);
                }
                return Err(err.into());
            }
        };

        let operations = graph.order_of_operations(&self.options);
        SyncMetrics::record_plan(
            user_id,
            graph.len(),
            operations.len(),
            started.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(Some(operations))
    }

    /// Plan and execute for one user; `Ok(None)` when no plan exists
    #[instrument(skip(self))]
    pub async fn sync_user(&self, user_id: &str) -> SyncResult<Option<ExecutionReport>> {
        let Some(operations) = self.plan_for_user(user_id).await? else {
            return Ok(None);
        };

        let started = Instant::now();
        let report = self.executor.execute(user_id, &operations).await?;
        SyncMetrics::record_execution(
            user_id,
            report.playlists_updated(),
            report.total_tracks(),
            started.elapsed().as_secs_f64() * 1000.0,
        );
        info!(batches = report.batches_sent, "User sync complete");

        Ok(Some(report))
    }
}
