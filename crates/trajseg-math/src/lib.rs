//! Trajectory segmentation math utilities.

pub mod math;

pub use math::angles::*;
pub use math::gaussian::*;
pub use math::summation::*;
