//! # Playlist Graph
//!
//! Playlists can feed into one another: when playlist P is a parent of playlist C,
//! tracks added to P after the edge's fence date propagate into C. This crate turns
//! a user's persisted adjacency document into a dependency graph and derives the
//! ordered list of synchronization operations an executor has to run.
//!
//! ## Features
//!
//! * JSON codec for the graph document exchanged with storage
//! * Structural validation (duplicate edges, parent/child symmetry, cycles)
//! * Graph construction that shares nodes reached through several paths
//! * Deterministic bottom-up REMOVE/ADD operation planning
//!
//! ## Example
//!
//! ```
//! use playlist_graph::{plan_document, OperationKind, PlanOptions};
//!
//! let json = r#"{
//!   "mix": {
//!     "playlist_ref": {"id": "mix", "name": "Mix", "can_edit": true},
//!     "children": ["chill"],
//!     "parents": []
//!   },
//!   "chill": {
//!     "playlist_ref": {"id": "chill", "name": "Chill", "can_edit": true},
//!     "children": [],
//!     "parents": [{"id": "mix", "after_date": "2024-01-01T00:00:00Z"}]
//!   }
//! }"#;
//!
//! let operations = plan_document(json, &PlanOptions::default()).unwrap();
//! assert_eq!(operations.len(), 2);
//! assert_eq!(operations[0].kind, OperationKind::Remove);
//! assert_eq!(operations[1].kind, OperationKind::Add);
//! assert_eq!(operations[1].source_id, "chill");
//! assert_eq!(operations[1].dest_id, "mix");
//! ```

mod builder;
mod error;
mod node;
mod planner;
mod types;

pub mod document;
pub mod validation;

pub use builder::PlaylistGraph;
pub use document::{GraphDocument, NodeDocument, ParentEdge};
pub use error::{GraphError, GraphResult};
pub use node::{GraphNode, ParentLink};
pub use planner::{plan, OperationKind, PlanOptions, PlaylistOperation};
pub use types::{PlaylistRef, Timestamp};
pub use validation::{
    has_cycle, has_duplicate_edges, has_valid_relationships, validate_document, ValidationError,
};

/// Decode, validate, build and plan a JSON graph document in one call.
///
/// # Errors
///
/// * [`GraphError::Codec`] for JSON that does not match the document shape
/// * [`GraphError::MalformedDocument`] for duplicate or one-sided edges
/// * [`GraphError::CyclicGraph`] for documents containing a cycle
///
/// ```
/// use playlist_graph::{plan_document, PlanOptions};
///
/// let json = r#"{
///   "a": {"playlist_ref": {"id": "a", "name": "A"}, "children": ["b"],
///         "parents": [{"id": "b", "after_date": "2024-01-01T00:00:00Z"}]},
///   "b": {"playlist_ref": {"id": "b", "name": "B"}, "children": ["a"],
///         "parents": [{"id": "a", "after_date": "2024-01-01T00:00:00Z"}]}
/// }"#;
///
/// let err = plan_document(json, &PlanOptions::default()).unwrap_err();
/// assert!(err.is_cycle());
/// ```
pub fn plan_document(json: &str, options: &PlanOptions) -> GraphResult<Vec<PlaylistOperation>> {
    let document = GraphDocument::from_json(json)?;
    validate_document(&document)?;
    let graph = PlaylistGraph::build(&document)?;
    Ok(graph.order_of_operations(options))
}

/// Returns a version string for the playlist-graph crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
