//! Empirical transition model: counting and probability estimation.

pub mod counts;
pub mod estimate;
pub mod graph;

pub use counts::{count_transitions, TransitionCounts};
pub use estimate::{estimate_probabilities, TransitionModel};
pub use graph::{TransitionGraph, TransitionRow};
