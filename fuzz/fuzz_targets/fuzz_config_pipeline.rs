//! Fuzz target for config.json parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use trajseg_config::{validate_config, PipelineConfig};

fuzz_target!(|data: &[u8]| {
    // Parsing and validation return errors, never panic.
    if let Ok(config) = serde_json::from_slice::<PipelineConfig>(data) {
        let _ = validate_config(&config);
    }
});
