//! Error types for the sync service

use playlist_graph::GraphError;
use playlist_store::StoreError;
use thiserror::Error;

/// Sync service error types
#[derive(Error, Debug)]
pub enum SyncError {
    /// Document store failure
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// Graph document rejected or unusable
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Track catalog failure
    #[error("Track catalog error for playlist {playlist_id}: {message}")]
    Catalog {
        playlist_id: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn catalog(playlist_id: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Catalog {
            playlist_id: playlist_id.into(),
            message: message.into(),
        }
    }

    /// Stable code for this error; store and graph errors keep their own codes
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Store(inner) => inner.error_code(),
            SyncError::Graph(inner) => inner.error_code(),
            SyncError::Catalog { .. } => "ERR_SYNC_CATALOG",
            SyncError::Config(_) => "ERR_SYNC_CONFIG",
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
