use thiserror::Error;
use crate::validation::ValidationError;
use std::fmt;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// All possible errors raised while decoding, validating or building a playlist graph
#[derive(Error, Debug)]
pub enum GraphError {
    /// The document contains a cycle (a self-loop counts)
    #[error("Cannot build graph: document contains a cycle ({})", CyclePathFormat(.path))]
    CyclicGraph {
        /// Playlist ids forming the cycle, in edge order
        path: Vec<String>,
    },

    /// Structural faults found by the validators
    #[error("{}", MalformedFormat(.0))]
    MalformedDocument(Vec<ValidationError>),

    /// A referenced playlist id has no entry in the document
    #[error("Playlist '{playlist_id}' referenced by '{referenced_by}' is not part of the graph")]
    UnknownPlaylist {
        /// The missing playlist id
        playlist_id: String,
        /// The playlist holding the dangling reference
        referenced_by: String,
    },

    /// A playlist id was added twice
    #[error("Playlist already exists in graph: {0}")]
    DuplicatePlaylist(String),

    /// An edge between the same ordered pair already exists
    #[error("Edge '{parent}' -> '{child}' already exists")]
    DuplicateEdge {
        /// Upstream playlist id
        parent: String,
        /// Downstream playlist id
        child: String,
    },

    /// Errors that occur while encoding or decoding the JSON exchange document
    #[error("Graph document codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

struct CyclePathFormat<'a>(&'a [String]);

impl fmt::Display for CyclePathFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.first() {
            Some(first) => write!(f, "{} → {}", self.0.join(" → "), first),
            None => write!(f, "unknown cycle"),
        }
    }
}

struct MalformedFormat<'a>(&'a [ValidationError]);

impl fmt::Display for MalformedFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed graph document ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl GraphError {
    /// Creates a cycle error from the offending path
    pub fn cyclic(path: Vec<String>) -> Self {
        Self::CyclicGraph { path }
    }

    /// Creates an unknown playlist error
    pub fn unknown_playlist(playlist_id: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::UnknownPlaylist {
            playlist_id: playlist_id.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// True when the failure is a cycle in the document
    pub fn is_cycle(&self) -> bool {
        matches!(self, GraphError::CyclicGraph { .. })
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::CyclicGraph { .. } => "ERR_GRAPH_CYCLIC",
            GraphError::MalformedDocument(_) => "ERR_GRAPH_MALFORMED_DOCUMENT",
            GraphError::UnknownPlaylist { .. } => "ERR_GRAPH_UNKNOWN_PLAYLIST",
            GraphError::DuplicatePlaylist(_) => "ERR_GRAPH_DUPLICATE_PLAYLIST",
            GraphError::DuplicateEdge { .. } => "ERR_GRAPH_DUPLICATE_EDGE",
            GraphError::Codec(_) => "ERR_GRAPH_CODEC",
        }
    }
}
