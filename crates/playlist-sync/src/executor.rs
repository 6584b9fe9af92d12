//! Execution of a synchronization plan against a [`TrackCatalog`].
//!
//! Operations arrive bottom-up, so by the time a playlist's own ADD operations run
//! every track destined for it has already been collected. Those pending tracks
//! bubble up into each parent together with the playlist's own tracks that pass
//! the edge's fence date. Nothing is written until the whole plan has been walked.

use std::collections::{BTreeMap, HashMap, HashSet};

use playlist_graph::{OperationKind, PlaylistOperation};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{TrackCatalog, TrackItem};
use crate::error::SyncResult;

/// Outcome of one plan execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Tracks added per destination playlist
    pub tracks_added: BTreeMap<String, usize>,

    /// Number of add calls sent to the catalog
    pub batches_sent: usize,

    /// REMOVE operations that were skipped
    pub removals_skipped: usize,
}

impl ExecutionReport {
    pub fn total_tracks(&self) -> usize {
        self.tracks_added.values().sum()
    }

    pub fn playlists_updated(&self) -> usize {
        self.tracks_added.len()
    }
}

/// Runs plans against a catalog
#[derive(Debug, Clone)]
pub struct PlanExecutor<C> {
    catalog: C,
    max_batch_size: usize,
}

impl<C: TrackCatalog> PlanExecutor<C> {
    /// Create an executor; a batch size of zero is treated as one
    pub fn new(catalog: C, max_batch_size: usize) -> Self {
        Self {
            catalog,
            max_batch_size: max_batch_size.max(1),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Execute `operations` for `user_id`
    pub async fn execute(&self, user_id: &str, operations: &[PlaylistOperation]) -> SyncResult<ExecutionReport> {
        let mut report = ExecutionReport::default();
        let mut listings: HashMap<String, Vec<TrackItem>> = HashMap::new();
        let mut pending: HashMap<String, Vec<TrackItem>> = HashMap::new();
        let mut destinations: Vec<String> = Vec::new();

        for operation in operations {
            if operation.kind == OperationKind::Remove {
                debug!(
                    source_id = %operation.source_id,
                    dest_id = %operation.dest_id,
                    "Skipping REMOVE operation"
                );
                report.removals_skipped += 1;
                continue;
            }

            if !pending.contains_key(&operation.dest_id) {
                destinations.push(operation.dest_id.clone());
                pending.insert(operation.dest_id.clone(), Vec::new());
            }

            let bubbled = pending.get(&operation.source_id).cloned().unwrap_or_default();
            let eligible = self.eligible_tracks(user_id, operation, &mut listings).await?;

            if let Some(queue) = pending.get_mut(&operation.dest_id) {
                queue.extend(bubbled);
                queue.extend(eligible);
            }
        }

        for playlist_id in destinations {
            let tracks = pending.remove(&playlist_id).unwrap_or_default();
            if tracks.is_empty() {
                continue;
            }

            let uris = ordered_unique_uris(tracks);
            info!(user_id, playlist_id = %playlist_id, tracks = uris.len(), "Adding tracks to playlist");

            for batch in uris.chunks(self.max_batch_size) {
                self.catalog.add_tracks(user_id, &playlist_id, batch).await?;
                report.batches_sent += 1;
            }
            report.tracks_added.insert(playlist_id, uris.len());
        }

        Ok(report)
    }

    /// Source tracks at or after the fence date that the destination does not hold
    async fn eligible_tracks(
        &self,
        user_id: &str,
        operation: &PlaylistOperation,
        listings: &mut HashMap<String, Vec<TrackItem>>,
    ) -> SyncResult<Vec<TrackItem>> {
        self.load_listing(user_id, &operation.source_id, listings).await?;
        self.load_listing(user_id, &operation.dest_id, listings).await?;

        let held: HashSet<&str> = listings
            .get(&operation.dest_id)
            .map(|tracks| tracks.iter().map(|track| track.track_id.as_str()).collect())
            .unwrap_or_default();

        let source = listings.get(&operation.source_id).map(Vec::as_slice).unwrap_or_default();
        Ok(source
            .iter()
            .filter(|track| track.added_at >= operation.after_date && !held.contains(track.track_id.as_str()))
            .cloned()
            .collect())
    }

    async fn load_listing(
        &self,
        user_id: &str,
        playlist_id: &str,
        listings: &mut HashMap<String, Vec<TrackItem>>,
    ) -> SyncResult<()> {
        if !listings.contains_key(playlist_id) {
            let tracks = self.catalog.playlist_tracks(user_id, playlist_id).await?;
            listings.insert(playlist_id.to_string(), tracks);
        }
        Ok(())
    }
}

/// Sort by `added_at` (stable) and keep the first occurrence of every URI
fn ordered_unique_uris(mut tracks: Vec<TrackItem>) -> Vec<String> {
    tracks.sort_by_key(|track| track.added_at);

    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.uri.clone()))
        .map(|track| track.uri)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryTrackCatalog;
    use chrono::{TimeZone, Utc};
    use playlist_graph::Timestamp;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()
    }

    fn track(id: &str, d: u32) -> TrackItem {
        TrackItem::new(id, format!("spotify:track:{id}"), day(d))
    }

    fn uri(id: &str) -> String {
        format!("spotify:track:{id}")
    }

    fn op(kind: OperationKind, source: &str, dest: &str, d: u32) -> PlaylistOperation {
        PlaylistOperation {
            kind,
            source_id: source.to_string(),
            dest_id: dest.to_string(),
            after_date: day(d),
        }
    }

    fn add(source: &str, dest: &str, d: u32) -> PlaylistOperation {
        op(OperationKind::Add, source, dest, d)
    }

    #[test]
    fn test_ordered_unique_uris() {
        let tracks = vec![track("b", 3), track("a", 1), track("b", 2), track("c", 2)];
        assert_eq!(ordered_unique_uris(tracks), vec![uri("a"), uri("b"), uri("c")]);
    }

    #[tokio::test]
    async fn test_fence_date_and_held_tracks_filter() {
        let catalog = InMemoryTrackCatalog::new();
        catalog.set_tracks("child", vec![track("old", 1), track("new", 10), track("dup", 12)]).await;
        catalog.set_tracks("parent", vec![track("dup", 2)]).await;

        let executor = PlanExecutor::new(catalog.clone(), 100);
        let report = executor.execute("u", &[add("child", "parent", 5)]).await.unwrap();

        assert_eq!(catalog.added_to("parent").await, vec![uri("new")]);
        assert_eq!(report.total_tracks(), 1);
        assert_eq!(report.playlists_updated(), 1);
    }

    #[tokio::test]
    async fn test_removals_are_skipped() {
        let catalog = InMemoryTrackCatalog::new();
        catalog.set_tracks("child", vec![track("t1", 10)]).await;
        catalog.set_tracks("parent", vec![]).await;

        let executor = PlanExecutor::new(catalog.clone(), 100);
        let operations = vec![
            op(OperationKind::Remove, "child", "parent", 1),
            add("child", "parent", 1),
        ];
        let report = executor.execute("u", &operations).await.unwrap();

        assert_eq!(report.removals_skipped, 1);
        assert_eq!(report.batches_sent, 1);
        assert_eq!(catalog.added_to("parent").await, vec![uri("t1")]);
    }

    #[tokio::test]
    async fn test_tracks_bubble_up_the_chain() {
        // leaf -> middle -> top
        let catalog = InMemoryTrackCatalog::new();
        catalog.set_tracks("leaf", vec![track("l1", 3), track("l2", 8)]).await;
        catalog.set_tracks("middle", vec![track("m1", 5)]).await;
        catalog.set_tracks("top", vec![]).await;

        let executor = PlanExecutor::new(catalog.clone(), 100);
        let report = executor
            .execute("u", &[add("leaf", "middle", 1), add("middle", "top", 4)])
            .await
            .unwrap();

        assert_eq!(catalog.added_to("middle").await, vec![uri("l1"), uri("l2")]);
        // pending leaf tracks bubble regardless of the upper fence date
        assert_eq!(catalog.added_to("top").await, vec![uri("l1"), uri("m1"), uri("l2")]);
        assert_eq!(report.tracks_added.get("top"), Some(&3));
    }

    #[tokio::test]
    async fn test_batches_respect_max_size() {
        let catalog = InMemoryTrackCatalog::new();
        let tracks: Vec<TrackItem> = (1..=5).map(|d| track(&format!("t{d}"), d)).collect();
        catalog.set_tracks("child", tracks).await;
        catalog.set_tracks("parent", vec![]).await;

        let executor = PlanExecutor::new(catalog.clone(), 2);
        let report = executor.execute("u", &[add("child", "parent", 1)]).await.unwrap();

        let sizes: Vec<usize> = catalog.added_batches().await.iter().map(|b| b.uris.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(report.batches_sent, 3);
    }

    #[tokio::test]
    async fn test_nothing_eligible_sends_nothing() {
        let catalog = InMemoryTrackCatalog::new();
        catalog.set_tracks("child", vec![track("t1", 1)]).await;
        catalog.set_tracks("parent", vec![]).await;

        let executor = PlanExecutor::new(catalog.clone(), 0);
        let report = executor.execute("u", &[add("child", "parent", 20)]).await.unwrap();

        assert!(catalog.added_batches().await.is_empty());
        assert_eq!(report, ExecutionReport::default());
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let catalog = InMemoryTrackCatalog::new();
        catalog.set_tracks("parent", vec![]).await;

        let executor = PlanExecutor::new(catalog, 100);
        let err = executor.execute("u", &[add("missing", "parent", 1)]).await.unwrap_err();
        assert_eq!(err.error_code(), "ERR_SYNC_CATALOG");
    }
}
