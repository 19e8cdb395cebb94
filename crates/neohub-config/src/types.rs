//! Configuration struct definitions.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event hub options.
    pub hub: HubConfig,
    /// Logging options.
    pub logging: LoggingConfig,
}

/// Event hub options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Treat `*` segments in patterns as wildcards.
    pub wildcard: bool,
    /// Segment delimiter for event names and patterns.
    pub delimiter: char,
    /// Per-pattern listener count that triggers a warning (0 = never).
    pub max_listeners: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            wildcard: true,
            delimiter: '.',
            max_listeners: 0,
        }
    }
}

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter: trace, debug, info, warn or error.
    pub level: String,
    /// Output format: pretty, compact, json or full.
    pub format: String,
    /// Extra filter directives such as `neohub_events=trace`.
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
