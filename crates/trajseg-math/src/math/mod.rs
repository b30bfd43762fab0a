//! Core math modules.

pub mod angles;
pub mod gaussian;
pub mod summation;
