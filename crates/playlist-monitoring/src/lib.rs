//! Monitoring module for the playlist graph services.
//!
//! Logging goes through `tracing`; library crates only emit events and the
//! binary installs the subscriber once via [`init`].

use serde::{Deserialize, Serialize};
use tracing::info;

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogExt};
pub use metrics::SyncMetrics;

/// Configuration for initializing the monitoring system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Log level filter (e.g., "info,playlist_graph=debug"); `RUST_LOG` wins when set
    pub log_filter: String,
    /// Emit JSON lines instead of human-readable output
    pub enable_json_logging: bool,
    /// Optional file that receives a JSON copy of every event, rotated daily
    pub log_file: Option<String>,
    /// Environment (dev, staging, prod)
    pub environment: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "playlist-sync".to_string(),
            log_filter: "info".to_string(),
            enable_json_logging: false,
            log_file: None,
            environment: "dev".to_string(),
        }
    }
}

/// Initialize monitoring system
pub fn init(config: &MonitoringConfig) -> anyhow::Result<()> {
    init_logging(config)?;

    info!(
        service_name = %config.service_name,
        environment = %config.environment,
        "Monitoring initialized"
    );

    Ok(())
}

/// Shutdown the monitoring system
pub fn shutdown() {
    info!("Shutting down monitoring system");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MonitoringConfig::default();
        assert_eq!(config.service_name, "playlist-sync");
        assert_eq!(config.log_filter, "info");
        assert!(!config.enable_json_logging);
        assert!(config.log_file.is_none());
    }
}
