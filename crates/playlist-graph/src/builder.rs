//! Graph construction from a [`GraphDocument`].
//!
//! Every document entry becomes exactly one [`GraphNode`]. Nodes are created only
//! after all of their parents exist, so a playlist shared by several downstream
//! paths (a diamond) is built once and linked from each of them.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::document::{GraphDocument, NodeDocument, ParentEdge};
use crate::error::{GraphError, GraphResult};
use crate::node::{GraphNode, ParentLink};
use crate::planner::{self, PlanOptions, PlaylistOperation};
use crate::validation::{find_cycle, IdentityValidator, Validator};

/// The built dependency graph of one user's playlists
///
/// Owns every node, keyed by playlist id, and remembers the order nodes were
/// created in. The graph may be a forest with several roots. It is read-only once
/// built.
#[derive(Debug, Clone, Default)]
pub struct PlaylistGraph {
    nodes: HashMap<String, GraphNode>,
    insertion_order: Vec<String>,
}

impl PlaylistGraph {
    /// Build a graph from a document
    ///
    /// Fails with [`GraphError::CyclicGraph`] if the document contains a cycle,
    /// whether or not the caller validated it first, with
    /// [`GraphError::MalformedDocument`] if an entry is keyed by an id other than
    /// its playlist's, and with [`GraphError::UnknownPlaylist`] if a parent id has
    /// no entry. No partial graph is ever returned.
    pub fn build(document: &GraphDocument) -> GraphResult<Self> {
        let mismatched = IdentityValidator.validate(document);
        if !mismatched.is_empty() {
            warn!(issues = mismatched.len(), "Cannot build graph - entries keyed by a foreign id");
            return Err(GraphError::MalformedDocument(mismatched));
        }

        if let Some(path) = find_cycle(document) {
            warn!(cycle = ?path, "Cannot build graph - document contains a cycle");
            return Err(GraphError::cyclic(path));
        }

        let mut graph = PlaylistGraph {
            nodes: HashMap::with_capacity(document.len()),
            insertion_order: Vec::with_capacity(document.len()),
        };
        let mut in_progress: HashSet<&str> = HashSet::new();

        for (playlist_id, entry) in document.iter() {
            if graph.contains(playlist_id) {
                continue;
            }

            // Each frame is a node waiting on its parents and the index of the
            // next parent edge to resolve.
            in_progress.insert(playlist_id.as_str());
            let mut stack: Vec<(&str, &NodeDocument, usize)> = vec![(playlist_id.as_str(), entry, 0)];

            while let Some(frame) = stack.last_mut() {
                let (current, current_entry) = (frame.0, frame.1);
                let pending = current_entry.parents.get(frame.2);
                frame.2 += 1;

                match pending {
                    Some(edge) => {
                        let parent_id = edge.id.as_str();
                        if graph.contains(parent_id) {
                            continue;
                        }
                        if in_progress.contains(parent_id) {
                            let begin = stack
                                .iter()
                                .position(|(id, _, _)| *id == parent_id)
                                .unwrap_or(0);
                            let mut path: Vec<String> =
                                stack[begin..].iter().map(|(id, _, _)| id.to_string()).collect();
                            path.reverse();
                            return Err(GraphError::cyclic(path));
                        }
                        let parent_entry = document
                            .get(parent_id)
                            .ok_or_else(|| GraphError::unknown_playlist(parent_id, current))?;

                        in_progress.insert(parent_id);
                        stack.push((parent_id, parent_entry, 0));
                    }
                    None => {
                        stack.pop();
                        in_progress.remove(current);
                        graph.attach(current, current_entry);
                    }
                }
            }
        }

        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            roots = graph.roots().count(),
            "Built playlist graph"
        );
        Ok(graph)
    }

    /// Create the node for `playlist_id` and link it under each of its parents.
    /// All parents must already be in the graph.
    fn attach(&mut self, playlist_id: &str, entry: &NodeDocument) {
        let parents: Vec<ParentLink> = entry
            .parents
            .iter()
            .map(|edge| ParentLink {
                id: edge.id.clone(),
                after_date: edge.after_date,
            })
            .collect();

        for link in &parents {
            if let Some(parent) = self.nodes.get_mut(&link.id) {
                parent.push_child(playlist_id);
            }
        }

        self.nodes.insert(
            playlist_id.to_string(),
            GraphNode::new(entry.playlist_ref.clone(), parents),
        );
        self.insertion_order.push(playlist_id.to_string());
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of parent edges across all nodes
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.parents().len()).sum()
    }

    /// True if a node exists for `playlist_id`
    pub fn contains(&self, playlist_id: &str) -> bool {
        self.nodes.contains_key(playlist_id)
    }

    /// Look up a node by playlist id
    pub fn node(&self, playlist_id: &str) -> Option<&GraphNode> {
        self.nodes.get(playlist_id)
    }

    /// Nodes in creation order (every parent precedes its children)
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.insertion_order
            .iter()
            .filter_map(move |id| self.nodes.get(id))
    }

    /// Nodes without parents, in creation order
    pub fn roots(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes().filter(|node| node.is_root())
    }

    /// Resolve the children of `node`
    pub fn children_of<'a>(&'a self, node: &'a GraphNode) -> impl Iterator<Item = &'a GraphNode> + 'a {
        node.children().iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Resolve the parents of `node`, paired with each edge's fence date
    pub fn parents_of<'a>(
        &'a self,
        node: &'a GraphNode,
    ) -> impl Iterator<Item = (&'a GraphNode, &'a ParentLink)> + 'a {
        node.parents()
            .iter()
            .filter_map(move |link| self.nodes.get(&link.id).map(|parent| (parent, link)))
    }

    /// Produce the ordered synchronization plan for this graph
    pub fn order_of_operations(&self, options: &PlanOptions) -> Vec<PlaylistOperation> {
        planner::plan(self, options)
    }

    /// Convert the graph back into its exchange document
    pub fn to_document(&self) -> GraphDocument {
        self.nodes()
            .map(|node| NodeDocument {
                playlist_ref: node.playlist().clone(),
                children: node.children().to_vec(),
                parents: node
                    .parents()
                    .iter()
                    .map(|link| ParentEdge::new(link.id.clone(), link.after_date))
                    .collect(),
            })
            .collect()
    }
}

impl TryFrom<&GraphDocument> for PlaylistGraph {
    type Error = GraphError;

    fn try_from(document: &GraphDocument) -> GraphResult<Self> {
        PlaylistGraph::build(document)
    }
}
