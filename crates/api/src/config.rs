//! Dashboard Configuration
//!
//! Read from an optional TOML file; every key has a default.

use analyzer::{AnalyzerConfig, ChartConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "impact-dashboard.toml";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// What the dashboard shows by default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Include uncertainty in analysis responses
    pub show_uncertainty: bool,
    /// Include the simulated historical context cloud
    pub show_historical: bool,
    pub charts: ChartConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_uncertainty: true,
            show_historical: true,
            charts: ChartConfig::default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to INFO for unknown names
    pub fn level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
    pub analyzer: AnalyzerConfig,
}

impl DashboardConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .build()?
            .try_deserialize()
    }
}
