//! Trajectory segmentation common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - State and trip identity types
//! - The unified error type with stable codes
//! - Output format specifications
//! - Run-summary schema versioning

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use id::{StateId, TripId};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
