//! Sync metrics, recorded as structured log events.

use tracing::info;

/// Metrics emitted by the sync service
pub struct SyncMetrics;

impl SyncMetrics {
    /// Record a planning pass for one user
    pub fn record_plan(user_id: &str, playlists: usize, operations: usize, duration_ms: f64) {
        info!(
            metric = "plan",
            user_id,
            playlists,
            operations,
            duration_ms,
            "Sync plan computed"
        );
    }

    /// Record a document rejected before planning
    pub fn record_rejected_document(user_id: &str, error_code: &str) {
        info!(metric = "rejected_document", user_id, error_code, "Graph document rejected");
    }

    /// Record an executed plan
    pub fn record_execution(user_id: &str, playlists_updated: usize, tracks_added: usize, duration_ms: f64) {
        info!(
            metric = "execution",
            user_id,
            playlists_updated,
            tracks_added,
            duration_ms,
            "Sync plan executed"
        );
    }
}
