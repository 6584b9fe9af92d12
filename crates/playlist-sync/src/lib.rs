//! Synchronization service for playlist feed graphs.
//!
//! Ties the graph planner to a [`GraphDocumentStore`](playlist_store::GraphDocumentStore)
//! and a [`TrackCatalog`], and carries the configuration shared by the
//! `playlist-sync` binary.

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod service;

pub use catalog::{AddedBatch, InMemoryTrackCatalog, TrackCatalog, TrackItem};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use executor::{ExecutionReport, PlanExecutor};
pub use service::SyncService;
