//! Trajectory segmentation configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for `config.json` with built-in defaults
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for run summaries
//! - JSON schema export

pub mod load;
pub mod pipeline;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use load::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
pub use pipeline::{
    FeatureRange, FeatureRanges, PipelineConfig, QuantizationConfig, RegularizationConfig,
    SegmentationConfig, TransformConfig,
};
pub use resolve::{resolve_config_path, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// File name looked up inside config directories.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Render the JSON schema of [`PipelineConfig`].
pub fn config_json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(PipelineConfig);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_every_section() {
        let schema = config_json_schema();
        let props = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .expect("schema has properties");
        for key in [
            "schema_version",
            "quantization",
            "regularization",
            "features",
            "transform",
            "segmentation",
        ] {
            assert!(props.contains_key(key), "missing {key}");
        }
    }
}
