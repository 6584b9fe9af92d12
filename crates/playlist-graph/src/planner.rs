//! Ordering of synchronization operations over a built graph.
//!
//! The plan is produced bottom-up: a node's own operations are emitted only after
//! every node below it has been finalized, so whatever a playlist pushes upstream
//! already reflects the settled state of everything it feeds from. Traversal uses
//! an explicit stack; long chains never grow the call stack.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::PlaylistGraph;
use crate::node::GraphNode;
use crate::types::{timestamp, Timestamp};

/// What an operation asks the executor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Drop previously synced tracks before re-adding
    Remove,
    /// Propagate eligible tracks
    Add,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Remove => write!(f, "REMOVE"),
            OperationKind::Add => write!(f, "ADD"),
        }
    }
}

/// One step of the synchronization plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,

    /// Playlist whose tracks are read
    pub source_id: String,

    /// Playlist receiving the tracks
    pub dest_id: String,

    /// Fence date of the edge
    #[serde(with = "timestamp")]
    pub after_date: Timestamp,
}

/// Options controlling plan generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Emit a REMOVE ahead of every ADD. When disabled the plan holds ADD
    /// operations only, in the same order.
    #[serde(default = "default_emit_removals")]
    pub emit_removals: bool,
}

fn default_emit_removals() -> bool {
    true
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            emit_removals: default_emit_removals(),
        }
    }
}

impl PlanOptions {
    /// Options producing ADD operations only
    pub fn additions_only() -> Self {
        Self {
            emit_removals: false,
        }
    }
}

/// Walk the graph in post-order and emit operations for every parent edge.
///
/// Roots of the walk are taken in node creation order, skipping nodes already
/// finalized by an earlier walk. A node reached again through another parent
/// (diamond) is finalized once; the `computed` set enforces that.
pub fn plan(graph: &PlaylistGraph, options: &PlanOptions) -> Vec<PlaylistOperation> {
    let per_edge = if options.emit_removals { 2 } else { 1 };
    let mut operations = Vec::with_capacity(graph.edge_count() * per_edge);

    let mut computed: HashSet<&str> = HashSet::with_capacity(graph.len());
    let mut expanded: HashSet<&str> = HashSet::with_capacity(graph.len());
    let mut stack: Vec<&GraphNode> = Vec::new();

    for start in graph.nodes() {
        if computed.contains(start.id()) {
            continue;
        }

        stack.push(start);
        while let Some(&node) = stack.last() {
            if !node.is_leaf() && !expanded.contains(node.id()) {
                stack.extend(graph.children_of(node));
                expanded.insert(node.id());
                continue;
            }

            stack.pop();
            if !computed.insert(node.id()) {
                continue;
            }

            for link in node.parents() {
                let operation = |kind: OperationKind| PlaylistOperation {
                    kind,
                    source_id: node.id().to_string(),
                    dest_id: link.id.clone(),
                    after_date: link.after_date,
                };
                if options.emit_removals {
                    operations.push(operation(OperationKind::Remove));
                }
                operations.push(operation(OperationKind::Add));
            }
        }
    }

    debug!(
        operations = operations.len(),
        nodes = computed.len(),
        emit_removals = options.emit_removals,
        "Planned playlist operations"
    );
    operations
}
