//! Music-service boundary used when executing a plan.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use playlist_graph::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{SyncError, SyncResult};

/// A track as listed in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackItem {
    pub track_id: String,

    /// Service URI used when adding the track elsewhere
    pub uri: String,

    /// When the track was added to the playlist it was listed from
    pub added_at: Timestamp,
}

impl TrackItem {
    pub fn new(track_id: impl Into<String>, uri: impl Into<String>, added_at: Timestamp) -> Self {
        Self {
            track_id: track_id.into(),
            uri: uri.into(),
            added_at,
        }
    }
}

/// Trait defining the contract for reading and extending playlists
#[async_trait]
pub trait TrackCatalog: Send + Sync + std::fmt::Debug {
    /// Every track currently in the playlist, pagination already resolved
    async fn playlist_tracks(&self, user_id: &str, playlist_id: &str) -> SyncResult<Vec<TrackItem>>;

    /// Append tracks, in order, to the playlist
    async fn add_tracks(&self, user_id: &str, playlist_id: &str, uris: &[String]) -> SyncResult<()>;
}

/// In-memory TrackCatalog for tests and dry runs
///
/// Add calls are recorded per call; playlist contents are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackCatalog {
    playlists: Arc<RwLock<HashMap<String, Vec<TrackItem>>>>,
    added: Arc<RwLock<Vec<AddedBatch>>>,
}

/// One recorded `add_tracks` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedBatch {
    pub user_id: String,
    pub playlist_id: String,
    pub uris: Vec<String>,
}

impl InMemoryTrackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listed contents of a playlist
    pub async fn set_tracks(&self, playlist_id: impl Into<String>, tracks: Vec<TrackItem>) {
        self.playlists.write().await.insert(playlist_id.into(), tracks);
    }

    /// Every add call received so far, in call order
    pub async fn added_batches(&self) -> Vec<AddedBatch> {
        self.added.read().await.clone()
    }

    /// All URIs added to `playlist_id`, flattened across calls
    pub async fn added_to(&self, playlist_id: &str) -> Vec<String> {
        self.added
            .read()
            .await
            .iter()
            .filter(|batch| batch.playlist_id == playlist_id)
            .flat_map(|batch| batch.uris.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl TrackCatalog for InMemoryTrackCatalog {
    async fn playlist_tracks(&self, _user_id: &str, playlist_id: &str) -> SyncResult<Vec<TrackItem>> {
        let playlists = self.playlists.read().await;
        playlists
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| SyncError::catalog(playlist_id, "playlist not found"))
    }

    async fn add_tracks(&self, user_id: &str, playlist_id: &str, uris: &[String]) -> SyncResult<()> {
        if !self.playlists.read().await.contains_key(playlist_id) {
            return Err(SyncError::catalog(playlist_id, "playlist not found"));
        }

        self.added.write().await.push(AddedBatch {
            user_id: user_id.to_string(),
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        });
        Ok(())
    }
}
