//! Configuration loading with provenance.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::PipelineConfig;
use crate::resolve::{resolve_config_path, ConfigSource};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_config, ValidationError};

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl From<ConfigError> for trajseg_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(ValidationError::InvalidValue { field, message }) => {
                trajseg_common::Error::InvalidConfig { field, message }
            }
            ConfigError::ValidationError(ValidationError::VersionMismatch {
                expected,
                actual,
            }) => trajseg_common::Error::ConfigVersion { expected, actual },
            other => trajseg_common::Error::Config(other.to_string()),
        }
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit config file path (highest priority).
    pub config_path: Option<PathBuf>,
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: PipelineConfig,
    pub source: ConfigSource,
    /// Path of the loaded file (None if using defaults).
    pub path: Option<PathBuf>,
    raw: Option<String>,
}

impl ResolvedConfig {
    /// Built-in defaults with no backing file.
    pub fn defaults() -> Self {
        Self {
            config: PipelineConfig::default(),
            source: ConfigSource::BuiltinDefault,
            path: None,
            raw: None,
        }
    }

    /// Create a config snapshot for run summaries.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(
            &self.config,
            self.source,
            self.path.clone(),
            self.raw.as_deref(),
        )
    }
}

/// Load configuration with the standard resolution order and validate it.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let (path, source) = resolve_config_path(options.config_path.as_deref());
    let Some(path) = path else {
        return Ok(ResolvedConfig::defaults());
    };

    let (config, raw) = load_config_file(&path)?;
    Ok(ResolvedConfig {
        config,
        source,
        path: Some(path),
        raw: Some(raw),
    })
}

/// Load and validate a single config file, returning the parsed config and
/// the raw content.
pub fn load_config_file(path: &Path) -> Result<(PipelineConfig, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: PipelineConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    validate_config(&config)?;
    Ok((config, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_file_is_not_found() {
        let options = ConfigOptions {
            config_path: Some(PathBuf::from("/nonexistent/trajseg/config.json")),
        };
        let err = load_config(&options).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        let common: trajseg_common::Error = err.into();
        assert_eq!(common.code(), 10);
    }

    #[test]
    fn invalid_value_maps_to_invalid_config() {
        let err = ConfigError::ValidationError(ValidationError::InvalidValue {
            field: "segmentation.max_segments".to_string(),
            message: "must be at least 1".to_string(),
        });
        let common: trajseg_common::Error = err.into();
        assert!(matches!(
            common,
            trajseg_common::Error::InvalidConfig { ref field, .. } if field == "segmentation.max_segments"
        ));
    }

    #[test]
    fn defaults_snapshot_is_builtin() {
        let snap = ResolvedConfig::defaults().snapshot();
        assert_eq!(snap.source, ConfigSource::BuiltinDefault);
        assert!(snap.path.is_none());
    }
}
