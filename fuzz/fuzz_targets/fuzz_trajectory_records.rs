//! Fuzz target for trajectory and signal table parsing.
//!
//! Readers must turn any byte stream into accepted or skipped records,
//! never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use trajseg_core::io::{read_segmentation, read_signals, read_trajectories};

fuzz_target!(|data: &[u8]| {
    if let Ok(parsed) = read_trajectories(data) {
        let points: usize = parsed.data.iter().map(|t| t.len()).sum();
        assert_eq!(points as u64, parsed.diagnostics.accepted);
    }
    let _ = read_signals(data);
    let _ = read_segmentation(data);
});
