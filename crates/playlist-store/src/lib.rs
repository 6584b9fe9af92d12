//! Persistence boundary for playlist graph documents.
//!
//! Each user owns exactly one [`GraphDocument`]. Backends implement
//! [`GraphDocumentStore`]; the mutation wrappers are provided on top of
//! `fetch` and `store` so every backend gets them for free.

use async_trait::async_trait;
use playlist_graph::{GraphDocument, GraphError, PlaylistRef, Timestamp};
use thiserror::Error;
use tracing::debug;

pub mod memory;

pub use memory::InMemoryGraphStore;

/// Errors that can occur during document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No graph document stored for user: {0}")]
    NotFound(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Stable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "ERR_STORE_NOT_FOUND",
            StoreError::Graph(inner) => inner.error_code(),
            StoreError::Serialization(_) => "ERR_STORE_SERIALIZATION",
            StoreError::Backend(_) => "ERR_STORE_BACKEND",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// How a stored document is combined with an incoming one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace the stored document entirely
    #[default]
    Overwrite,
    /// Replace matching playlist entries and keep the rest
    Merge,
}

/// Trait defining the contract for graph document storage
#[async_trait]
pub trait GraphDocumentStore: Send + Sync + std::fmt::Debug {
    /// Fetch the document for a user, `NotFound` if none was ever stored
    async fn fetch(&self, user_id: &str) -> StoreResult<GraphDocument>;

    /// Write the document for a user
    async fn store(&self, user_id: &str, document: &GraphDocument, mode: WriteMode) -> StoreResult<()>;

    /// Reset the user's document to an empty one
    async fn clear(&self, user_id: &str) -> StoreResult<()>;

    /// Fetch the document, or an empty one when the user has none yet
    async fn fetch_or_default(&self, user_id: &str) -> StoreResult<GraphDocument> {
        match self.fetch(user_id).await {
            Err(StoreError::NotFound(_)) => Ok(GraphDocument::new()),
            other => other,
        }
    }

    /// Add unconnected playlists; fails without writing if any id already exists
    async fn add_playlists(&self, user_id: &str, playlists: Vec<PlaylistRef>) -> StoreResult<GraphDocument> {
        let count = playlists.len();
        let document = self.fetch_or_default(user_id).await?.add_playlists(playlists)?;
        self.store(user_id, &document, WriteMode::Overwrite).await?;
        debug!(user_id, added = count, "Playlists added to graph document");
        Ok(document)
    }

    /// Remove playlists together with every edge touching them
    async fn remove_playlists(&self, user_id: &str, playlist_ids: &[String]) -> StoreResult<GraphDocument> {
        let document = self.fetch(user_id).await?.remove_playlists(playlist_ids);
        self.store(user_id, &document, WriteMode::Overwrite).await?;
        debug!(user_id, removed = playlist_ids.len(), "Playlists removed from graph document");
        Ok(document)
    }

    /// Link `child` under `parent`, syncing tracks added at or after `after_date`
    async fn link(&self, user_id: &str, parent: &str, child: &str, after_date: Timestamp) -> StoreResult<GraphDocument> {
        let document = self.fetch(user_id).await?.link(parent, child, after_date)?;
        self.store(user_id, &document, WriteMode::Overwrite).await?;
        Ok(document)
    }

    /// Remove the edge between `parent` and `child`
    async fn unlink(&self, user_id: &str, parent: &str, child: &str) -> StoreResult<GraphDocument> {
        let document = self.fetch(user_id).await?.unlink(parent, child);
        self.store(user_id, &document, WriteMode::Overwrite).await?;
        Ok(document)
    }

    /// Set every edge date in the user's document, typically after a completed sync
    async fn touch_edge_dates(&self, user_id: &str, date: Timestamp) -> StoreResult<GraphDocument> {
        let document = self.fetch(user_id).await?.touch_edge_dates(date);
        self.store(user_id, &document, WriteMode::Overwrite).await?;
        debug!(user_id, date = %date, "Edge dates touched");
        Ok(document)
    }
}
