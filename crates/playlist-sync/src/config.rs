//! Configuration for the sync service
//!
//! Values come from environment variables, or from a YAML file for local runs.

use std::env;
use std::path::Path;

use playlist_graph::PlanOptions;
use playlist_monitoring::MonitoringConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};

/// Sync service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Emit a REMOVE ahead of every ADD in generated plans
    #[serde(default = "default_emit_removals")]
    pub emit_removals: bool,

    /// Maximum number of tracks sent in one add call
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Log filter
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// Music service whose document collection is used
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_emit_removals() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    100
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_service() -> String {
    "spotify".to_string()
}

impl SyncConfig {
    /// Load configuration from environment variables
    pub fn load() -> SyncResult<Self> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn load_from<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(emit) = lookup("PLAYLIST_SYNC_EMIT_REMOVALS") {
            match parse_flag(&emit) {
                Some(value) => config.emit_removals = value,
                None => warn!("Invalid PLAYLIST_SYNC_EMIT_REMOVALS value: {}", emit),
            }
        }

        if let Some(batch) = lookup("PLAYLIST_SYNC_MAX_BATCH_SIZE") {
            if let Ok(size) = batch.parse::<usize>() {
                config.max_batch_size = size;
            } else {
                warn!("Invalid PLAYLIST_SYNC_MAX_BATCH_SIZE value: {}", batch);
            }
        }

        if let Some(filter) = lookup("LOG_FILTER") {
            config.log_filter = filter;
        }

        if let Some(json) = lookup("PLAYLIST_SYNC_JSON_LOGS") {
            match parse_flag(&json) {
                Some(value) => config.json_logs = value,
                None => warn!("Invalid PLAYLIST_SYNC_JSON_LOGS value: {}", json),
            }
        }

        if let Some(service) = lookup("PLAYLIST_SYNC_SERVICE") {
            if service.trim().is_empty() {
                warn!("Empty PLAYLIST_SYNC_SERVICE value, keeping {}", config.service);
            } else {
                config.service = service.trim().to_string();
            }
        }

        config.validate()?;
        info!(service = %config.service, "Loaded sync configuration");
        Ok(config)
    }

    /// Read configuration from a YAML file; missing keys take their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: SyncConfig = serde_yaml::from_str(&raw)
            .map_err(|e| SyncError::Config(format!("Invalid YAML in {}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_batch_size == 0 {
            return Err(SyncError::Config("max_batch_size must be at least 1".to_string()));
        }
        if self.service.is_empty() {
            return Err(SyncError::Config("service must not be empty".to_string()));
        }
        Ok(())
    }

    /// Planning options derived from this configuration
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            emit_removals: self.emit_removals,
        }
    }

    /// Logging setup derived from this configuration
    pub fn monitoring_config(&self) -> MonitoringConfig {
        MonitoringConfig {
            log_filter: self.log_filter.clone(),
            enable_json_logging: self.json_logs,
            ..MonitoringConfig::default()
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            emit_removals: default_emit_removals(),
            max_batch_size: default_max_batch_size(),
            log_filter: default_log_filter(),
            json_logs: false,
            service: default_service(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
