use chrono::{TimeZone, Utc};
use playlist_graph::{GraphDocument, PlaylistGraph, PlaylistRef, Timestamp};
use playlist_store::{GraphDocumentStore, InMemoryGraphStore, StoreError, WriteMode};
use pretty_assertions::assert_eq;

fn day(d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn playlists(ids: &[&str]) -> Vec<PlaylistRef> {
    ids.iter().map(|id| PlaylistRef::new(*id, format!("Playlist {id}"), true)).collect()
}

#[tokio::test]
async fn test_edit_session_round_trip() {
    let store = InMemoryGraphStore::new();

    store.add_playlists("user-1", playlists(&["mix", "rock", "jazz"])).await.unwrap();
    store.link("user-1", "mix", "rock", day(1)).await.unwrap();
    let document = store.link("user-1", "mix", "jazz", day(2)).await.unwrap();

    assert_eq!(document.edge_count(), 2);
    assert_eq!(store.fetch("user-1").await.unwrap(), document);

    let graph = PlaylistGraph::build(&document).unwrap();
    let mix = graph.node("mix").unwrap();
    let children: Vec<&str> = graph.children_of(mix).map(|node| node.id()).collect();
    assert_eq!(children, vec!["rock", "jazz"]);
}

#[tokio::test]
async fn test_add_existing_playlist_leaves_document_untouched() {
    let store = InMemoryGraphStore::new();
    store.add_playlists("u", playlists(&["a"])).await.unwrap();

    let err = store.add_playlists("u", playlists(&["b", "a"])).await.unwrap_err();
    assert_eq!(err.error_code(), "ERR_GRAPH_DUPLICATE_PLAYLIST");

    let stored = store.fetch("u").await.unwrap();
    assert_eq!(stored.ids().cloned().collect::<Vec<_>>(), vec!["a".to_string()]);
}

#[tokio::test]
async fn test_remove_playlists_drops_incident_edges() {
    let store = InMemoryGraphStore::new();
    store.add_playlists("u", playlists(&["a", "b", "c"])).await.unwrap();
    store.link("u", "a", "b", day(1)).await.unwrap();
    store.link("u", "b", "c", day(1)).await.unwrap();

    let document = store.remove_playlists("u", &["b".to_string()]).await.unwrap();

    assert_eq!(document.len(), 2);
    assert_eq!(document.edge_count(), 0);
    assert!(document.get("a").unwrap().children.is_empty());
    assert!(document.get("c").unwrap().parents.is_empty());
}

#[tokio::test]
async fn test_touch_and_unlink() {
    let store = InMemoryGraphStore::new();
    store.add_playlists("u", playlists(&["a", "b", "c"])).await.unwrap();
    store.link("u", "a", "b", day(1)).await.unwrap();
    store.link("u", "a", "c", day(2)).await.unwrap();

    let touched = store.touch_edge_dates("u", day(20)).await.unwrap();
    for (_, node) in touched.iter() {
        assert!(node.parents.iter().all(|edge| edge.after_date == day(20)));
    }

    let unlinked = store.unlink("u", "a", "b").await.unwrap();
    assert_eq!(unlinked.get("a").unwrap().children, vec!["c".to_string()]);
    assert_eq!(store.fetch("u").await.unwrap().edge_count(), 1);
}

#[tokio::test]
async fn test_mutations_require_existing_document() {
    let store = InMemoryGraphStore::new();

    let err = store.touch_edge_dates("ghost", day(1)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store.link("ghost", "a", "b", day(1)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_link_unknown_playlist_is_rejected() {
    let store = InMemoryGraphStore::new();
    store.add_playlists("u", playlists(&["a"])).await.unwrap();

    let err = store.link("u", "a", "missing", day(1)).await.unwrap_err();
    assert_eq!(err.error_code(), "ERR_GRAPH_UNKNOWN_PLAYLIST");
}

#[tokio::test]
async fn test_concurrent_users_through_shared_handle() {
    let store = InMemoryGraphStore::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let user = format!("user-{i}");
                let document = GraphDocument::new().add_playlists(playlists(&["a", "b"])).unwrap();
                store.store(&user, &document, WriteMode::Overwrite).await.unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.user_count().await, 8);
}
