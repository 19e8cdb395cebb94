//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `{home}/config.toml` (user), if present
//! 3. Merge the explicit file, if given (must exist)
//! 4. Deserialize merged tree → `Config`
//! 5. Apply `NEOHUB_*` environment overrides
//! 6. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{ENV_HOME, apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Config files above this size are rejected.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Name of the config file inside the home directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration using the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is malformed, an environment
/// override cannot be parsed, or the result fails validation.
pub fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<Config> {
    load_with_env(explicit, home_override, &collect_env_vars())
}

/// Load configuration with an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(
    explicit: Option<&Path>,
    home_override: Option<&Path>,
    env: &HashMap<String, String>,
) -> ConfigResult<Config> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    // 2. User layer.
    let home = match home_override {
        Some(h) => Some(h.to_path_buf()),
        None => home_directory(env).ok(),
    };
    if let Some(home) = home {
        let user_file = home.join(CONFIG_FILE_NAME);
        if user_file.is_file() {
            let layer = read_toml(&user_file)?;
            deep_merge(&mut merged, layer);
            info!(path = %user_file.display(), "Loaded user config");
        } else {
            debug!(path = %user_file.display(), "No user config");
        }
    }

    // 3. Explicit layer.
    if let Some(path) = explicit {
        let layer = read_toml(path)?;
        deep_merge(&mut merged, layer);
        info!(path = %path.display(), "Loaded config file");
    }

    // 4. Deserialize.
    let mut config: Config = merged.try_into().map_err(|e| ConfigError::ParseError {
        path: "<merged config>".to_owned(),
        source: e,
    })?;

    // 5. Environment.
    apply_env_overrides(&mut config, env)?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(config)
}

/// Load configuration from a single file on top of the defaults, without
/// user or environment layers.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    deep_merge(&mut merged, read_toml(path)?);

    let config: Config = merged.try_into().map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

fn read_toml(path: &Path) -> ConfigResult<toml::Value> {
    // Check file size before reading to prevent OOM.
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value replaces the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    },
                }
            }
        },
        (base, overlay) => *base = overlay,
    }
}

/// Directory holding the user config: `$NEOHUB_HOME`, else `~/.neohub`.
fn home_directory(env: &HashMap<String, String>) -> ConfigResult<PathBuf> {
    if let Some(home) = env.get(ENV_HOME) {
        return Ok(PathBuf::from(home));
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".neohub"))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_parse() {
        let val: toml::Value = toml::from_str(DEFAULTS_TOML).unwrap();
        assert!(val.as_table().unwrap().contains_key("hub"));
        assert!(val.as_table().unwrap().contains_key("logging"));
    }

    #[test]
    fn test_defaults_match_default_impl() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_with_empty_home() {
        let home = tempfile::tempdir().unwrap();
        let config = load_with_env(None, Some(home.path()), &HashMap::new()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_user_layer_then_explicit_layer() {
        let home = tempfile::tempdir().unwrap();
        write_file(
            home.path(),
            CONFIG_FILE_NAME,
            "[hub]\nmax_listeners = 8\n\n[logging]\nlevel = \"debug\"\n",
        );
        let work = tempfile::tempdir().unwrap();
        let explicit = write_file(work.path(), "hub.toml", "[logging]\nlevel = \"warn\"\n");

        let config = load_with_env(Some(&explicit), Some(home.path()), &HashMap::new()).unwrap();

        assert_eq!(config.hub.max_listeners, 8);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.hub.wildcard);
    }

    #[test]
    fn test_env_wins_over_files() {
        let home = tempfile::tempdir().unwrap();
        write_file(home.path(), CONFIG_FILE_NAME, "[hub]\nwildcard = true\n");
        let env: HashMap<String, String> =
            [("NEOHUB_HUB_WILDCARD".to_owned(), "false".to_owned())].into();

        let config = load_with_env(None, Some(home.path()), &env).unwrap();
        assert!(!config.hub.wildcard);
    }

    #[test]
    fn test_neohub_home_env() {
        let home = tempfile::tempdir().unwrap();
        write_file(home.path(), CONFIG_FILE_NAME, "[hub]\ndelimiter = \"/\"\n");
        let env: HashMap<String, String> =
            [("NEOHUB_HOME".to_owned(), home.path().display().to_string())].into();

        let config = load_with_env(None, None, &env).unwrap();
        assert_eq!(config.hub.delimiter, '/');
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let home = tempfile::tempdir().unwrap();
        let result = load_with_env(
            Some(Path::new("/nonexistent/neohub.toml")),
            Some(home.path()),
            &HashMap::new(),
        );
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.toml", "[hub\nwildcard = ");
        assert!(matches!(load_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.toml", "[hub]\nwildcard = \"yes\"\n");
        assert!(matches!(load_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.toml", "[logging]\nlevel = \"loud\"\n");
        assert!(matches!(
            load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        // one byte over the limit
        let padding = "#".repeat(1_048_577);
        let path = write_file(dir.path(), "big.toml", &padding);
        assert!(matches!(
            load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_deep_merge_nested() {
        let mut base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\nz = 4\n").unwrap();
        deep_merge(&mut base, overlay);

        let a = base.get("a").unwrap();
        assert_eq!(a.get("x").unwrap().as_integer(), Some(1));
        assert_eq!(a.get("y").unwrap().as_integer(), Some(3));
        assert_eq!(a.get("z").unwrap().as_integer(), Some(4));
    }
}
