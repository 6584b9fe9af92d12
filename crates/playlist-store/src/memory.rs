//! In-memory implementation of GraphDocumentStore
//!
//! Documents are kept in their JSON encoding so the codec is exercised the same
//! way a remote backend would exercise it. Intended for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use playlist_graph::GraphDocument;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{GraphDocumentStore, StoreError, StoreResult, WriteMode};

const DEFAULT_COLLECTION: &str = "spotify";

/// In-memory implementation of GraphDocumentStore
///
/// Documents live under a collection (one per music service). All data is lost
/// when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryGraphStore {
    collection: String,
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryGraphStore {
    /// Create an empty store using the default collection
    pub fn new() -> Self {
        Self::with_collection(DEFAULT_COLLECTION)
    }

    /// Create an empty store keyed under `collection`
    pub fn with_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A handle onto `collection` that shares this store's backing map
    pub fn collection_view(&self, collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: self.documents.clone(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of users with a stored document
    pub async fn user_count(&self) -> usize {
        let prefix = format!("{}:", self.collection);
        let store = self.documents.read().await;
        store.keys().filter(|key| key.starts_with(&prefix)).count()
    }

    fn document_key(&self, user_id: &str) -> String {
        format!("{}:{}", self.collection, user_id)
    }

    fn decode(data: &[u8]) -> StoreResult<GraphDocument> {
        serde_json::from_slice(data).map_err(StoreError::Serialization)
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphDocumentStore for InMemoryGraphStore {
    async fn fetch(&self, user_id: &str) -> StoreResult<GraphDocument> {
        let key = self.document_key(user_id);
        let store = self.documents.read().await;

        match store.get(&key) {
            Some(data) => Self::decode(data),
            None => Err(StoreError::NotFound(user_id.to_string())),
        }
    }

    async fn store(&self, user_id: &str, document: &GraphDocument, mode: WriteMode) -> StoreResult<()> {
        let key = self.document_key(user_id);
        let mut store = self.documents.write().await;

        let merged = match (mode, store.get(&key)) {
            (WriteMode::Merge, Some(existing)) => Self::decode(existing)?.merge(document.clone()),
            _ => document.clone(),
        };
        let data = serde_json::to_vec(&merged)?;
        store.insert(key, data);

        debug!(user_id, ?mode, playlists = merged.len(), "Graph document stored");
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> StoreResult<()> {
        let key = self.document_key(user_id);
        let data = serde_json::to_vec(&GraphDocument::new())?;
        let mut store = self.documents.write().await;
        store.insert(key, data);

        debug!(user_id, "Graph document cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_graph::PlaylistRef;
    use pretty_assertions::assert_eq;

    fn playlist(id: &str) -> PlaylistRef {
        PlaylistRef::new(id, id.to_uppercase(), true)
    }

    #[tokio::test]
    async fn test_fetch_missing_document() {
        let store = InMemoryGraphStore::new();
        let result = store.fetch("nobody").await;
        assert!(matches!(result, Err(StoreError::NotFound(user)) if user == "nobody"));
    }

    #[tokio::test]
    async fn test_store_and_fetch() {
        let store = InMemoryGraphStore::new();
        let document = GraphDocument::new().add_playlists(vec![playlist("a"), playlist("b")]).unwrap();

        store.store("user-1", &document, WriteMode::Overwrite).await.unwrap();

        assert_eq!(store.fetch("user-1").await.unwrap(), document);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_document() {
        let store = InMemoryGraphStore::new();
        let first = GraphDocument::new().add_playlist(playlist("a")).unwrap();
        let second = GraphDocument::new().add_playlist(playlist("b")).unwrap();

        store.store("u", &first, WriteMode::Overwrite).await.unwrap();
        store.store("u", &second, WriteMode::Overwrite).await.unwrap();

        let fetched = store.fetch("u").await.unwrap();
        assert_eq!(fetched.ids().cloned().collect::<Vec<_>>(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_merge_keeps_other_entries() {
        let store = InMemoryGraphStore::new();
        let first = GraphDocument::new().add_playlists(vec![playlist("a"), playlist("b")]).unwrap();
        let renamed = GraphDocument::new()
            .add_playlist(PlaylistRef::new("b", "Renamed", false))
            .unwrap();

        store.store("u", &first, WriteMode::Overwrite).await.unwrap();
        store.store("u", &renamed, WriteMode::Merge).await.unwrap();

        let fetched = store.fetch("u").await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.get("b").unwrap().playlist_ref.name, "Renamed");
    }

    #[tokio::test]
    async fn test_merge_into_empty_store() {
        let store = InMemoryGraphStore::new();
        let document = GraphDocument::new().add_playlist(playlist("a")).unwrap();

        store.store("u", &document, WriteMode::Merge).await.unwrap();

        assert_eq!(store.fetch("u").await.unwrap(), document);
    }

    #[tokio::test]
    async fn test_clear_leaves_empty_document() {
        let store = InMemoryGraphStore::new();
        let document = GraphDocument::new().add_playlist(playlist("a")).unwrap();
        store.store("u", &document, WriteMode::Overwrite).await.unwrap();

        store.clear("u").await.unwrap();
        store.clear("u").await.unwrap();

        assert!(store.fetch("u").await.unwrap().is_empty());
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let documents = InMemoryGraphStore::with_collection("spotify");
        let other = documents.collection_view("tidal");
        let document = GraphDocument::new().add_playlist(playlist("a")).unwrap();

        documents.store("u", &document, WriteMode::Overwrite).await.unwrap();

        assert!(other.fetch("u").await.unwrap_err().is_not_found());
        assert_eq!(other.user_count().await, 0);
        assert_eq!(documents.collection(), "spotify");
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_serialization_error() {
        let store = InMemoryGraphStore::new();
        store
            .documents
            .write()
            .await
            .insert(store.document_key("u"), b"{not json".to_vec());

        let err = store.fetch("u").await.unwrap_err();
        assert_eq!(err.error_code(), "ERR_STORE_SERIALIZATION");
    }
}
