use std::fmt;
use std::error::Error;

use serde::Serialize;
use tracing::warn;

use crate::document::GraphDocument;
use crate::error::{GraphError, GraphResult};

mod cycles;
mod edges;
mod relationships;

pub use cycles::{find_cycle, has_cycle, CycleValidator};
pub use edges::{
    find_duplicate_edges, find_repeated_parent_entries, has_duplicate_edges, DuplicateEdge,
    DuplicateEdgeValidator,
};
pub use relationships::{
    find_asymmetric_relationships, has_valid_relationships, Asymmetry, RelationshipValidator,
};

/// Represents a structural fault found in a graph document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the location of the error (e.g., "playlist_b.parents[1]")
    pub path: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// The same ordered (parent, child) pair is declared more than once
    pub const DUPLICATE_EDGE: &str = "ERR_GRAPH_VALIDATION_DUPLICATE_EDGE";

    /// A child or parent declaration lacks its counterpart on the other node
    pub const ASYMMETRIC_RELATIONSHIP: &str = "ERR_GRAPH_VALIDATION_ASYMMETRIC_RELATIONSHIP";

    /// An edge points at a playlist id with no document entry
    pub const UNKNOWN_PLAYLIST: &str = "ERR_GRAPH_VALIDATION_UNKNOWN_PLAYLIST";

    /// Circular dependency detected
    pub const CIRCULAR_DEPENDENCY: &str = "ERR_GRAPH_VALIDATION_CIRCULAR_DEPENDENCY";

    /// An entry's key differs from the id of the playlist it holds
    pub const MISMATCHED_ID: &str = "ERR_GRAPH_VALIDATION_MISMATCHED_ID";
}

/// A trait for validators that check one structural aspect of a graph document
pub trait Validator {
    /// Validate the document and return a list of validation errors (if any)
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError>;
}

/// Checks that every entry is keyed by its own playlist id
pub struct IdentityValidator;

impl Validator for IdentityValidator {
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError> {
        document
            .iter()
            .filter(|(key, node)| key.as_str() != node.playlist_ref.id)
            .map(|(key, node)| ValidationError {
                code: error_codes::MISMATCHED_ID,
                message: format!(
                    "Entry '{}' holds playlist '{}'",
                    key, node.playlist_ref.id
                ),
                path: Some(format!("{}.playlist_ref.id", key)),
            })
            .collect()
    }
}

/// Run every validator, including cycle detection, and return all findings
pub fn collect_findings(document: &GraphDocument) -> Vec<ValidationError> {
    let validators: Vec<Box<dyn Validator>> = vec![
        Box::new(IdentityValidator),
        Box::new(DuplicateEdgeValidator),
        Box::new(RelationshipValidator),
        Box::new(CycleValidator),
    ];

    validators
        .iter()
        .flat_map(|validator| validator.validate(document))
        .collect()
}

/// Validate a graph document before construction
///
/// Structural faults (mismatched ids, duplicate edges, asymmetric relationships)
/// are reported together as [`GraphError::MalformedDocument`]. A structurally
/// sound document that contains a cycle yields [`GraphError::CyclicGraph`].
pub fn validate_document(document: &GraphDocument) -> GraphResult<()> {
    let structural: Vec<Box<dyn Validator>> = vec![
        Box::new(IdentityValidator),
        Box::new(DuplicateEdgeValidator),
        Box::new(RelationshipValidator),
    ];

    let mut errors = Vec::new();
    for validator in structural {
        errors.extend(validator.validate(document));
    }

    if !errors.is_empty() {
        warn!(issues = errors.len(), "Rejecting malformed graph document");
        return Err(GraphError::MalformedDocument(errors));
    }

    if let Some(path) = find_cycle(document) {
        warn!(cycle = ?path, "Rejecting cyclic graph document");
        return Err(GraphError::cyclic(path));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use crate::document::{GraphDocument, NodeDocument, ParentEdge};
    use crate::types::{PlaylistRef, Timestamp};

    pub fn at_hour(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(1970, 1, 1, hour, 0, 0).unwrap()
    }

    /// Build a raw entry without any consistency fix-ups
    pub fn node(id: &str, children: &[&str], parents: &[(&str, u32)]) -> NodeDocument {
        NodeDocument {
            playlist_ref: PlaylistRef::new(id, format!("Playlist {}", id), true),
            children: children.iter().map(|c| c.to_string()).collect(),
            parents: parents
                .iter()
                .map(|(p, hour)| ParentEdge::new(*p, at_hour(*hour)))
                .collect(),
        }
    }

    pub fn document(nodes: Vec<NodeDocument>) -> GraphDocument {
        nodes.into_iter().collect()
    }
}
