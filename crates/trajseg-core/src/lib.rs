//! Trajectory Segmentation Core Library
//!
//! This library provides the core functionality for trajectory segmentation:
//! - State quantization and interning
//! - Transition counting and probability estimation
//! - Graph regularization over state neighborhoods
//! - Dissimilarity signals from the regularized graph
//! - MDL-optimal segmentation by dynamic programming
//! - Tabular artifacts, logging, exit codes and run summaries
//!
//! The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod regularize;
pub mod segment;
pub mod state;
pub mod summary;
pub mod trajectory;
pub mod transform;

pub use pipeline::{GraphArtifacts, Pipeline};
