//! Configuration file resolution.
//!
//! Resolution order (highest to lowest priority):
//! 1. Explicit `--config` path
//! 2. `TRAJSEG_CONFIG` environment variable (file path)
//! 3. `TRAJSEG_CONFIG_DIR/config.json`
//! 4. `$XDG_CONFIG_HOME/trajseg/config.json`
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::CONFIG_FILE_NAME;

/// Application directory name under the XDG config home.
pub const APP_NAME: &str = "trajseg";

/// Environment variable naming a config file directly.
pub const ENV_CONFIG_FILE: &str = "TRAJSEG_CONFIG";

/// Environment variable naming a directory that holds `config.json`.
pub const ENV_CONFIG_DIR: &str = "TRAJSEG_CONFIG_DIR";

/// Where a configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    CliArgument,
    Environment,
    XdgConfig,
    BuiltinDefault,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Resolve which config file to load, if any.
///
/// An explicit path or `TRAJSEG_CONFIG` is returned even if the file does not
/// exist, so that loading reports the missing file instead of silently
/// falling back. Directory-based candidates are only used when present.
pub fn resolve_config_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), ConfigSource::CliArgument);
    }

    // 2. Environment variable (file)
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        if !path.is_empty() {
            return (Some(PathBuf::from(path)), ConfigSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(dir).join(CONFIG_FILE_NAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    // 5. Built-in default
    (None, ConfigSource::BuiltinDefault)
}

/// Get the XDG config directory for trajseg.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_wins() {
        let (path, source) = resolve_config_path(Some(Path::new("/tmp/explicit.json")));
        assert_eq!(path, Some(PathBuf::from("/tmp/explicit.json")));
        assert_eq!(source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ConfigSource::BuiltinDefault).unwrap(),
            "\"builtin_default\""
        );
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }
}
