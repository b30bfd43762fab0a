//! Fuzz target for the headerless model tables.

#![no_main]

use libfuzzer_sys::fuzz_target;
use trajseg_core::io::{read_counts, read_graph, read_probabilities};
use trajseg_core::state::{Quantizer, StateInterner};

fuzz_target!(|data: &[u8]| {
    let quantizer = Quantizer::default();

    let mut interner = StateInterner::new();
    let _ = read_counts(data, &quantizer, &mut interner);

    let mut interner = StateInterner::new();
    let _ = read_probabilities(data, &quantizer, &mut interner);

    let mut interner = StateInterner::new();
    if let Ok(parsed) = read_graph(data, &quantizer, &mut interner) {
        // Every edge endpoint must have been interned.
        for (src, dst, _) in parsed.data.edges() {
            assert!(interner.resolve(src).is_some());
            assert!(interner.resolve(dst).is_some());
        }
    }
});
