//! Environment variable overrides.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Overrides `hub.wildcard`.
pub const ENV_HUB_WILDCARD: &str = "NEOHUB_HUB_WILDCARD";
/// Overrides `hub.delimiter`.
pub const ENV_HUB_DELIMITER: &str = "NEOHUB_HUB_DELIMITER";
/// Overrides `hub.max_listeners`.
pub const ENV_HUB_MAX_LISTENERS: &str = "NEOHUB_HUB_MAX_LISTENERS";
/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "NEOHUB_LOG_LEVEL";
/// Overrides `logging.format`.
pub const ENV_LOG_FORMAT: &str = "NEOHUB_LOG_FORMAT";
/// Alternate home directory for user-level config.
pub const ENV_HOME: &str = "NEOHUB_HOME";

/// Snapshot the `NEOHUB_*` variables of the current process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("NEOHUB_"))
        .collect()
}

/// Apply overrides from `env` on top of `config`.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a variable cannot be parsed.
pub fn apply_env_overrides(config: &mut Config, env: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(raw) = env.get(ENV_HUB_WILDCARD) {
        config.hub.wildcard = parse_bool(ENV_HUB_WILDCARD, raw)?;
        debug!(var = ENV_HUB_WILDCARD, "Applied env override");
    }

    if let Some(raw) = env.get(ENV_HUB_DELIMITER) {
        let mut chars = raw.chars();
        config.hub.delimiter = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ConfigError::EnvError {
                    var: ENV_HUB_DELIMITER.to_owned(),
                    message: format!("expected a single character, got '{raw}'"),
                });
            },
        };
        debug!(var = ENV_HUB_DELIMITER, "Applied env override");
    }

    if let Some(raw) = env.get(ENV_HUB_MAX_LISTENERS) {
        config.hub.max_listeners = raw.trim().parse().map_err(|e| ConfigError::EnvError {
            var: ENV_HUB_MAX_LISTENERS.to_owned(),
            message: format!("{e}"),
        })?;
        debug!(var = ENV_HUB_MAX_LISTENERS, "Applied env override");
    }

    if let Some(raw) = env.get(ENV_LOG_LEVEL) {
        config.logging.level = raw.trim().to_lowercase();
        debug!(var = ENV_LOG_LEVEL, "Applied env override");
    }

    if let Some(raw) = env.get(ENV_LOG_FORMAT) {
        config.logging.format = raw.trim().to_lowercase();
        debug!(var = ENV_LOG_FORMAT, "Applied env override");
    }

    Ok(())
}

fn parse_bool(var: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::EnvError {
            var: var.to_owned(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}
