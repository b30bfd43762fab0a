//! Configuration snapshots for run summaries and reproducibility.
//!
//! A snapshot captures which configuration a run used, allowing results to
//! be audited and reproduced later.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;
use crate::resolve::ConfigSource;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Schema version of the configuration.
    pub schema_version: String,

    /// Where the configuration came from.
    pub source: ConfigSource,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// SHA-256 of the raw file content.
    #[serde(default)]
    pub content_hash: Option<String>,

    /// SHA-256 of the effective configuration serialized as JSON.
    pub effective_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub accel_step: f64,
    pub heading_bin: u32,
    pub accel_influence: f64,
    pub min_trip_length: usize,
    pub max_segments: usize,
}

impl ConfigSnapshot {
    /// Create a snapshot of an effective configuration.
    pub fn new(
        config: &PipelineConfig,
        source: ConfigSource,
        path: Option<PathBuf>,
        raw_content: Option<&str>,
    ) -> Self {
        let effective = serde_json::to_string(config).unwrap_or_default();
        ConfigSnapshot {
            schema_version: config.schema_version.clone(),
            source,
            path,
            content_hash: raw_content.map(hash_content),
            effective_hash: hash_content(&effective),
            summary: ConfigSummary {
                accel_step: config.quantization.accel_step,
                heading_bin: config.quantization.heading_bin,
                accel_influence: config.regularization.accel_influence,
                min_trip_length: config.transform.min_trip_length,
                max_segments: config.segmentation.max_segments,
            },
        }
    }
}

/// Hex-encoded SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
