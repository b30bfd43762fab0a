//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::pipeline::{FeatureRange, PipelineConfig};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 10,
            ValidationError::InvalidValue { .. } => 11,
            ValidationError::VersionMismatch { .. } => 12,
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration semantically.
///
/// Returns the first violation found, naming the offending field by its
/// dotted path.
pub fn validate_config(config: &PipelineConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    let q = &config.quantization;
    validate_positive("quantization.accel_step", q.accel_step)?;
    if q.heading_bin == 0 {
        return Err(ValidationError::invalid(
            "quantization.heading_bin",
            "must be at least 1",
        ));
    }

    let r = &config.regularization;
    validate_non_negative("regularization.max_accel_delta", r.max_accel_delta)?;
    validate_non_negative("regularization.accel_influence", r.accel_influence)?;
    if r.heading_stride == 0 {
        return Err(ValidationError::invalid(
            "regularization.heading_stride",
            "must be at least 1",
        ));
    }

    validate_range("features.speed", &config.features.speed)?;
    validate_range("features.acceleration", &config.features.acceleration)?;
    validate_range("features.heading", &config.features.heading)?;

    if config.transform.min_trip_length == 0 {
        return Err(ValidationError::invalid(
            "transform.min_trip_length",
            "must be at least 1",
        ));
    }

    if config.segmentation.max_segments == 0 {
        return Err(ValidationError::invalid(
            "segmentation.max_segments",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid(
            field,
            format!("must be positive and finite, got {value}"),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid(
            field,
            format!("must be non-negative and finite, got {value}"),
        ));
    }
    Ok(())
}

fn validate_range(field: &str, range: &FeatureRange) -> ValidationResult<()> {
    if !range.min.is_finite() || !range.max.is_finite() {
        return Err(ValidationError::invalid(field, "bounds must be finite"));
    }
    if range.min >= range.max {
        return Err(ValidationError::invalid(
            field,
            format!("min ({}) must be below max ({})", range.min, range.max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn zero_accel_step_rejected() {
        let mut config = PipelineConfig::default();
        config.quantization.accel_step = 0.0;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                field: "quantization.accel_step".to_string(),
                message: "must be positive and finite, got 0".to_string(),
            }
        );
        assert_eq!(err.code(), 11);
    }

    #[test]
    fn nan_influence_rejected() {
        let mut config = PipelineConfig::default();
        config.regularization.accel_influence = f64::NAN;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { field, .. }) if field == "regularization.accel_influence"
        ));
    }

    #[test]
    fn inverted_range_rejected() {
        let mut config = PipelineConfig::default();
        config.features.speed = FeatureRange::new(10.0, 10.0);
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { field, .. }) if field == "features.speed"
        ));
    }

    #[test]
    fn zero_segments_rejected() {
        let mut config = PipelineConfig::default();
        config.segmentation.max_segments = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn version_mismatch_reported() {
        let config = PipelineConfig {
            schema_version: "0.9.0".to_string(),
            ..PipelineConfig::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), 12);
        assert!(err.to_string().contains("0.9.0"));
    }
}
