//! Pipeline configuration types.
//!
//! Every section and field is optional in `config.json`; missing values take
//! the defaults below.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    pub quantization: QuantizationConfig,

    pub regularization: RegularizationConfig,

    pub features: FeatureRanges,

    pub transform: TransformConfig,

    pub segmentation: SegmentationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            quantization: QuantizationConfig::default(),
            regularization: RegularizationConfig::default(),
            features: FeatureRanges::default(),
            transform: TransformConfig::default(),
            segmentation: SegmentationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration document.
    pub fn from_json_str(content: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }
}

/// How raw kinematics are bucketed into states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct QuantizationConfig {
    /// Acceleration bin width.
    pub accel_step: f64,

    /// Heading bin width in whole degrees.
    pub heading_bin: u32,
}

impl Default for QuantizationConfig {
    fn default() -> Self {
        Self {
            accel_step: 0.25,
            heading_bin: 1,
        }
    }
}

/// Neighborhood shape and weighting used when smoothing the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RegularizationConfig {
    /// Largest speed offset explored (stride 1).
    pub max_speed_delta: u32,

    /// Largest acceleration offset explored (stride = accel_step).
    pub max_accel_delta: f64,

    /// Largest heading offset explored.
    pub max_heading_delta: u32,

    /// Heading offset stride in degrees; not tied to `quantization.heading_bin`.
    pub heading_stride: u32,

    /// Weight of the acceleration offset in the neighbor distance.
    pub accel_influence: f64,
}

impl Default for RegularizationConfig {
    fn default() -> Self {
        Self {
            max_speed_delta: 3,
            max_accel_delta: 0.25,
            max_heading_delta: 6,
            heading_stride: 6,
            accel_influence: 2.0,
        }
    }
}

/// Inclusive normalization range of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Min-max ranges used by the feature distance.
///
/// `heading` scales the circular heading difference, so its natural range is
/// `[0, 180]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureRanges {
    pub speed: FeatureRange,
    pub acceleration: FeatureRange,
    pub heading: FeatureRange,
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self {
            speed: FeatureRange::new(0.0, 180.0),
            acceleration: FeatureRange::new(-16.0, 19.0),
            heading: FeatureRange::new(0.0, 180.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Trips with fewer points are not transformed.
    pub min_trip_length: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self { min_trip_length: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationConfig {
    /// Upper bound on the number of segments per trip.
    pub max_segments: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self { max_segments: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.schema_version, crate::CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{"regularization": {"accel_influence": 3.5}, "segmentation": {"max_segments": 8}}"#,
        )
        .unwrap();
        assert_eq!(config.regularization.accel_influence, 3.5);
        assert_eq!(config.regularization.max_speed_delta, 3);
        assert_eq!(config.regularization.heading_stride, 6);
        assert_eq!(config.segmentation.max_segments, 8);
        assert_eq!(config.quantization.accel_step, 0.25);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"quantisation": {}}"#).unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn feature_range_span() {
        assert_eq!(FeatureRanges::default().acceleration.span(), 35.0);
    }
}
