//! Configuration loading and defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level PageMark configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<CoordinatorConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Delay between injecting the page agent and the single retry, giving
    /// the agent time to register its listener.
    #[serde(default = "default_inject_delay_ms")]
    pub inject_delay_ms: u64,
}

fn default_inject_delay_ms() -> u64 {
    100
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            inject_delay_ms: default_inject_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "pagemark_coordinator=debug").
    #[serde(default)]
    pub filters: Vec<String>,
}

impl Config {
    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::PageMarkError::Io)?;
        let config: Config = json5::from_str(&raw)
            .map_err(|e| crate::error::PageMarkError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Effective injection-retry delay in milliseconds.
    pub fn inject_delay_ms(&self) -> u64 {
        self.coordinator
            .as_ref()
            .map(|c| c.inject_delay_ms)
            .unwrap_or_else(default_inject_delay_ms)
    }
}
