use serde::Serialize;

use crate::types::{timestamp, PlaylistRef, Timestamp};

/// An upstream edge of a built node: the parent's id and the fence date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentLink {
    /// Id of the parent node, resolvable through the owning graph
    pub id: String,

    /// Fence date carried by the edge
    #[serde(with = "timestamp")]
    pub after_date: Timestamp,
}

/// A playlist inside a built [`PlaylistGraph`](crate::PlaylistGraph)
///
/// Nodes never own each other. Parent and child links are playlist ids that
/// resolve through the graph's node map, so the graph is the single owner of
/// every node however many paths reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    playlist: PlaylistRef,
    parents: Vec<ParentLink>,
    children: Vec<String>,
}

impl GraphNode {
    pub(crate) fn new(playlist: PlaylistRef, parents: Vec<ParentLink>) -> Self {
        Self {
            playlist,
            parents,
            children: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child_id: impl Into<String>) {
        self.children.push(child_id.into());
    }

    /// Id of the wrapped playlist
    pub fn id(&self) -> &str {
        &self.playlist.id
    }

    /// The wrapped playlist reference
    pub fn playlist(&self) -> &PlaylistRef {
        &self.playlist
    }

    /// Upstream edges, in document order
    pub fn parents(&self) -> &[ParentLink] {
        &self.parents
    }

    /// Ids of downstream nodes, in the order they were linked during construction
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// A node without parents
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// A node without children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
