//! The persisted adjacency document and its JSON codec.
//!
//! A [`GraphDocument`] is what the storage layer hands us: a map from playlist id to
//! a descriptor listing the playlist's child ids and its parent edges. Entries are
//! kept ordered by id so every traversal over a document is deterministic.
//!
//! The mutation helpers consume the document and return the updated one; they keep
//! both sides of an edge in step but perform no structural validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::types::{timestamp, PlaylistRef, Timestamp};

/// An upstream edge as stored on the child: "tracks flow from `id` into me"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEdge {
    /// Id of the parent (source) playlist
    pub id: String,

    /// Only tracks added to the parent at or after this date propagate
    #[serde(with = "timestamp")]
    pub after_date: Timestamp,
}

impl ParentEdge {
    /// Create a new parent edge
    pub fn new(id: impl Into<String>, after_date: Timestamp) -> Self {
        Self {
            id: id.into(),
            after_date,
        }
    }
}

/// One entry of the graph document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// The playlist this node stands for
    pub playlist_ref: PlaylistRef,

    /// Ids of downstream playlists
    #[serde(default)]
    pub children: Vec<String>,

    /// Upstream edges with their fence dates
    #[serde(default)]
    pub parents: Vec<ParentEdge>,
}

impl NodeDocument {
    /// Create an unconnected node for a playlist
    pub fn new(playlist_ref: PlaylistRef) -> Self {
        Self {
            playlist_ref,
            children: Vec::new(),
            parents: Vec::new(),
        }
    }
}

/// Mapping from playlist id to node descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphDocument {
    playlists: BTreeMap<String, NodeDocument>,
}

impl GraphDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a document from its JSON form
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let document: GraphDocument = serde_json::from_str(json)?;
        debug!(playlists = document.len(), "Decoded graph document");
        Ok(document)
    }

    /// Decode a document from an already-parsed JSON value
    pub fn from_value(value: serde_json::Value) -> GraphResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Encode the document as pretty-printed JSON
    pub fn to_json_pretty(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Encode the document as a JSON value
    pub fn to_value(&self) -> GraphResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Number of playlists in the document
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// True if the document holds no playlists
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Look up a node descriptor by playlist id
    pub fn get(&self, playlist_id: &str) -> Option<&NodeDocument> {
        self.playlists.get(playlist_id)
    }

    /// True if the document has an entry for `playlist_id`
    pub fn contains(&self, playlist_id: &str) -> bool {
        self.playlists.contains_key(playlist_id)
    }

    /// Iterate entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeDocument)> {
        self.playlists.iter()
    }

    /// Iterate playlist ids in order
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.playlists.keys()
    }

    /// Total number of declared parent edges
    pub fn edge_count(&self) -> usize {
        self.playlists.values().map(|node| node.parents.len()).sum()
    }

    /// Insert or replace a raw entry, keyed by the descriptor's playlist id
    pub fn insert(&mut self, node: NodeDocument) -> Option<NodeDocument> {
        self.playlists.insert(node.playlist_ref.id.clone(), node)
    }

    /// Merge another document into this one; entries in `other` win
    pub fn merge(mut self, other: GraphDocument) -> Self {
        self.playlists.extend(other.playlists);
        self
    }

    /// Add a playlist as an unconnected node
    pub fn add_playlist(self, playlist: PlaylistRef) -> GraphResult<Self> {
        self.add_playlists(std::iter::once(playlist))
    }

    /// Add several unconnected playlists; fails if any id is already present
    pub fn add_playlists<I>(mut self, playlists: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = PlaylistRef>,
    {
        for playlist in playlists {
            if self.playlists.contains_key(&playlist.id) {
                return Err(GraphError::DuplicatePlaylist(playlist.id));
            }
            self.playlists
                .insert(playlist.id.clone(), NodeDocument::new(playlist));
        }
        Ok(self)
    }

    /// Remove a playlist and every edge touching it
    pub fn remove_playlist(self, playlist_id: &str) -> Self {
        self.remove_playlists(&[playlist_id])
    }

    /// Remove playlists and their incident edges; unknown ids are skipped
    pub fn remove_playlists<S: AsRef<str>>(mut self, playlist_ids: &[S]) -> Self {
        for playlist_id in playlist_ids {
            let playlist_id = playlist_id.as_ref();
            if self.playlists.remove(playlist_id).is_none() {
                continue;
            }

            for node in self.playlists.values_mut() {
                node.parents.retain(|edge| edge.id != playlist_id);
                node.children.retain(|child| child != playlist_id);
            }
        }
        self
    }

    /// Set the fence date of every edge to `date`
    pub fn touch_edge_dates(mut self, date: Timestamp) -> Self {
        for edge in self
            .playlists
            .values_mut()
            .flat_map(|node| node.parents.iter_mut())
        {
            edge.after_date = date;
        }
        self
    }

    /// Connect `parent` to `child`, recording both sides of the edge
    pub fn link(mut self, parent: &str, child: &str, after_date: Timestamp) -> GraphResult<Self> {
        if !self.playlists.contains_key(parent) {
            return Err(GraphError::unknown_playlist(parent, child));
        }
        let child_node = self
            .playlists
            .get_mut(child)
            .ok_or_else(|| GraphError::unknown_playlist(child, parent))?;

        if child_node.parents.iter().any(|edge| edge.id == parent) {
            return Err(GraphError::DuplicateEdge {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        child_node.parents.push(ParentEdge::new(parent, after_date));

        if let Some(parent_node) = self.playlists.get_mut(parent) {
            if !parent_node.children.iter().any(|id| id == child) {
                parent_node.children.push(child.to_string());
            }
        }
        Ok(self)
    }

    /// Drop the edge `parent` -> `child` from both sides, if present
    pub fn unlink(mut self, parent: &str, child: &str) -> Self {
        if let Some(parent_node) = self.playlists.get_mut(parent) {
            parent_node.children.retain(|id| id != child);
        }
        if let Some(child_node) = self.playlists.get_mut(child) {
            child_node.parents.retain(|edge| edge.id != parent);
        }
        self
    }
}

impl FromIterator<NodeDocument> for GraphDocument {
    fn from_iter<T: IntoIterator<Item = NodeDocument>>(iter: T) -> Self {
        let mut document = GraphDocument::new();
        for node in iter {
            document.insert(node);
        }
        document
    }
}
