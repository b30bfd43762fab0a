//! Fuzz target for state key parsing.
//!
//! Keys that parse must re-serialize to a key that parses to the same state.

#![no_main]

use libfuzzer_sys::fuzz_target;
use trajseg_core::state::Quantizer;

fuzz_target!(|data: &str| {
    let quantizer = Quantizer::default();
    if let Ok(state) = quantizer.parse_key(data) {
        let again = quantizer.parse_key(&state.key());
        assert_eq!(again.ok(), Some(state));
    }
});
