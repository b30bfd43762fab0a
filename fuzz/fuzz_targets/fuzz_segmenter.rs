//! Fuzz target for MDL segmentation of arbitrary signals.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trajseg_core::segment::Segmenter;

#[derive(Debug, Arbitrary)]
struct Input {
    max_segments: u8,
    values: Vec<i16>,
}

fuzz_target!(|input: Input| {
    let signal: Vec<f64> = input
        .values
        .iter()
        .take(256)
        .map(|&v| f64::from(v) / 64.0)
        .collect();
    let result = Segmenter::new(usize::from(input.max_segments)).segment(&signal);

    assert_eq!(result.start_flags().len(), signal.len());
    if let Some(first) = result.segments.first() {
        assert_eq!(first.start, 0);
    }
});
