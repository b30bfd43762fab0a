//! Tabular artifacts and record-level diagnostics.

pub mod records;
pub mod tables;

pub use records::{ParseDiagnostics, RecordError, SkipReason, SkippedRecord};
pub use tables::{
    create_table, open_table, read_counts, read_graph, read_probabilities, read_segmentation,
    read_signals, read_trajectories, write_counts, write_graph, write_probabilities,
    write_segmentation, write_signals, Artifact, Parsed, SegmentedSignal,
    SEGMENTATION_HEADER, SIGNAL_HEADER, TRAJECTORY_HEADER,
};
