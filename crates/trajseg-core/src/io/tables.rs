//! Readers and writers for the comma-delimited stage artifacts.
//!
//! | Artifact | Header | Fields |
//! |---|---|---|
//! | trajectories | yes | trip, time step, speed, acceleration, heading change, lat, lng |
//! | transitions | no | source key, destination key, count |
//! | probabilities | no | source key, destination key, probability, source total |
//! | regularized | no | source key, destination key, probability |
//! | dissimilarities | yes | trip, time step, dissimilarity, lat, lng, speed, acceleration, heading |
//! | segmentation | yes | trip, time step, speed, acceleration, heading change, lat, lng, dissimilarity, start flag |
//!
//! Readers of headed tables skip exactly the first line. Model tables intern
//! their state keys through the caller's [`StateInterner`] after
//! re-quantizing them, so keys round-trip exactly.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use trajseg_common::{Error, Result, TripId};

use super::records::{
    parse_count, parse_f64, parse_time_step, split_fields, ParseDiagnostics, RecordError,
    SkipReason,
};
use crate::model::{TransitionCounts, TransitionGraph, TransitionModel};
use crate::segment::Segmentation;
use crate::state::{Quantizer, State, StateInterner};
use crate::trajectory::{group_trips, TrajectoryPoint, Trip};
use crate::transform::{Signal, SignalPoint};

pub const TRAJECTORY_HEADER: &str =
    "TripId,Time_Step,Speed,Acceleration,HeadingChange,Latitude,Longitude";
pub const SIGNAL_HEADER: &str =
    "TripId,TimeStep,ProbDissimilarity,Lat,Lng,Speed,Acceleration,Heading";
pub const SEGMENTATION_HEADER: &str =
    "TripId,TimeStep,Speed,Acceleration,HeadingChange,Latitude,Longitude,PMD,StartOfSegment";

/// The tables exchanged between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Trajectories,
    Transitions,
    Probabilities,
    Regularized,
    Dissimilarities,
    Segmentation,
}

impl Artifact {
    pub fn name(self) -> &'static str {
        match self {
            Artifact::Trajectories => "trajectories",
            Artifact::Transitions => "transitions",
            Artifact::Probabilities => "probabilities",
            Artifact::Regularized => "regularized",
            Artifact::Dissimilarities => "dissimilarities",
            Artifact::Segmentation => "segmentation",
        }
    }

    /// File name used inside a run output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Trajectories => "trajectories.csv",
            Artifact::Transitions => "transitions.csv",
            Artifact::Probabilities => "probabilities.csv",
            Artifact::Regularized => "regularized.csv",
            Artifact::Dissimilarities => "dissimilarities.csv",
            Artifact::Segmentation => "segmentation.csv",
        }
    }

    pub fn header(self) -> Option<&'static str> {
        match self {
            Artifact::Trajectories => Some(TRAJECTORY_HEADER),
            Artifact::Dissimilarities => Some(SIGNAL_HEADER),
            Artifact::Segmentation => Some(SEGMENTATION_HEADER),
            Artifact::Transitions | Artifact::Probabilities | Artifact::Regularized => None,
        }
    }
}

/// Data read from a table and what happened to each line.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub data: T,
    pub diagnostics: ParseDiagnostics,
}

/// A signal with its per-point segment start flags.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedSignal {
    pub signal: Signal,
    pub starts: Vec<bool>,
}

impl SegmentedSignal {
    pub fn new(signal: Signal, segmentation: &Segmentation) -> Self {
        Self {
            starts: segmentation.start_flags(),
            signal,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.starts.iter().filter(|&&s| s).count()
    }
}

/// Open a table for reading.
pub fn open_table(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| Error::Input(format!("cannot open {}: {e}", path.display())))?;
    Ok(BufReader::new(file))
}

/// Create (or truncate) a table for writing.
pub fn create_table(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Feed every data line to `parse`, recording accepted and skipped lines.
fn read_lines<R, F>(reader: R, artifact: Artifact, mut parse: F) -> Result<ParseDiagnostics>
where
    R: BufRead,
    F: FnMut(&str) -> std::result::Result<(), RecordError>,
{
    let mut diagnostics = ParseDiagnostics::new(artifact.name());
    let skip_header = artifact.header().is_some();

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        if skip_header && idx == 0 {
            continue;
        }
        let line_no = idx + 1;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.strip_suffix('\r').unwrap_or(line),
            Err(e) => {
                diagnostics.skip(line_no, RecordError::new(SkipReason::Encoding, e.to_string()));
                continue;
            }
        };
        match parse(line) {
            Ok(()) => diagnostics.accept(),
            Err(err) => diagnostics.skip(line_no, err),
        }
    }

    Ok(diagnostics)
}

fn parse_trip_id(value: &str) -> std::result::Result<TripId, RecordError> {
    if value.is_empty() {
        return Err(RecordError::new(SkipReason::Empty, "empty trip id"));
    }
    Ok(TripId::from(value))
}

/// Group `(trip, item)` records by trip in first-appearance order.
fn group_by_trip<T>(records: Vec<(TripId, T)>) -> Vec<(TripId, Vec<T>)> {
    let mut groups: Vec<(TripId, Vec<T>)> = Vec::new();
    let mut index: HashMap<TripId, usize> = HashMap::new();
    for (trip_id, item) in records {
        let slot = *index.entry(trip_id.clone()).or_insert_with(|| {
            groups.push((trip_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(item);
    }
    groups
}

// ============================================================================
// Trajectories
// ============================================================================

fn parse_trajectory_record(
    line: &str,
) -> std::result::Result<(TripId, TrajectoryPoint), RecordError> {
    let f = split_fields(line, 7)?;
    let point = TrajectoryPoint {
        time_step: parse_time_step(f[1])?,
        speed: parse_f64("speed", f[2])?,
        acceleration: parse_f64("acceleration", f[3])?,
        heading: parse_f64("heading", f[4])?,
        latitude: parse_f64("latitude", f[5])?,
        longitude: parse_f64("longitude", f[6])?,
    };
    Ok((parse_trip_id(f[0])?, point))
}

/// Read raw trajectory samples grouped into trips.
pub fn read_trajectories<R: BufRead>(reader: R) -> Result<Parsed<Vec<Trip>>> {
    let mut records = Vec::new();
    let diagnostics = read_lines(reader, Artifact::Trajectories, |line| {
        records.push(parse_trajectory_record(line)?);
        Ok(())
    })?;
    Ok(Parsed {
        data: group_trips(records),
        diagnostics,
    })
}

// ============================================================================
// Model tables
// ============================================================================

fn parse_edge_keys(
    src: &str,
    dst: &str,
    quantizer: &Quantizer,
) -> std::result::Result<(State, State), RecordError> {
    Ok((quantizer.parse_key(src)?, quantizer.parse_key(dst)?))
}

/// Read a frequency table. Repeated pairs accumulate.
pub fn read_counts<R: BufRead>(
    reader: R,
    quantizer: &Quantizer,
    interner: &mut StateInterner,
) -> Result<Parsed<TransitionCounts>> {
    let mut counts = TransitionCounts::new();
    let diagnostics = read_lines(reader, Artifact::Transitions, |line| {
        let f = split_fields(line, 3)?;
        let (src, dst) = parse_edge_keys(f[0], f[1], quantizer)?;
        let n = parse_count(f[2])?;
        let src = interner.intern(src);
        let dst = interner.intern(dst);
        counts.add(src, dst, n);
        Ok(())
    })?;
    Ok(Parsed {
        data: counts,
        diagnostics,
    })
}

pub fn write_counts<W: Write>(
    mut writer: W,
    counts: &TransitionCounts,
    interner: &StateInterner,
) -> Result<usize> {
    let mut rows = 0;
    for (src, dst, n) in counts.iter() {
        writeln!(writer, "{},{},{}", interner[src], interner[dst], n)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// Read a probability table with its per-source totals.
pub fn read_probabilities<R: BufRead>(
    reader: R,
    quantizer: &Quantizer,
    interner: &mut StateInterner,
) -> Result<Parsed<TransitionModel>> {
    let mut model = TransitionModel::default();
    let diagnostics = read_lines(reader, Artifact::Probabilities, |line| {
        let f = split_fields(line, 4)?;
        let (src, dst) = parse_edge_keys(f[0], f[1], quantizer)?;
        let probability = parse_f64("probability", f[2])?;
        let total = parse_count(f[3])?;
        let src = interner.intern(src);
        let dst = interner.intern(dst);
        model.graph.set_weight(src, dst, probability);
        model.source_totals.insert(src, total);
        Ok(())
    })?;
    Ok(Parsed {
        data: model,
        diagnostics,
    })
}

pub fn write_probabilities<W: Write>(
    mut writer: W,
    model: &TransitionModel,
    interner: &StateInterner,
) -> Result<usize> {
    let mut rows = 0;
    for (src, dst, p) in model.graph.edges() {
        let total = model.source_total(src).unwrap_or(0);
        writeln!(writer, "{},{},{},{}", interner[src], interner[dst], p, total)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// Read a regularized probability table.
pub fn read_graph<R: BufRead>(
    reader: R,
    quantizer: &Quantizer,
    interner: &mut StateInterner,
) -> Result<Parsed<TransitionGraph>> {
    let mut graph = TransitionGraph::new();
    let diagnostics = read_lines(reader, Artifact::Regularized, |line| {
        let f = split_fields(line, 3)?;
        let (src, dst) = parse_edge_keys(f[0], f[1], quantizer)?;
        let probability = parse_f64("probability", f[2])?;
        let src = interner.intern(src);
        let dst = interner.intern(dst);
        graph.set_weight(src, dst, probability);
        Ok(())
    })?;
    Ok(Parsed {
        data: graph,
        diagnostics,
    })
}

pub fn write_graph<W: Write>(
    mut writer: W,
    graph: &TransitionGraph,
    interner: &StateInterner,
) -> Result<usize> {
    let mut rows = 0;
    for (src, dst, p) in graph.edges() {
        writeln!(writer, "{},{},{}", interner[src], interner[dst], p)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

// ============================================================================
// Signals and segmentation
// ============================================================================

fn parse_signal_record(line: &str) -> std::result::Result<(TripId, SignalPoint), RecordError> {
    let f = split_fields(line, 8)?;
    let dissimilarity = parse_f64("dissimilarity", f[2])?;
    let point = TrajectoryPoint {
        time_step: parse_time_step(f[1])?,
        latitude: parse_f64("latitude", f[3])?,
        longitude: parse_f64("longitude", f[4])?,
        speed: parse_f64("speed", f[5])?,
        acceleration: parse_f64("acceleration", f[6])?,
        heading: parse_f64("heading", f[7])?,
    };
    Ok((
        parse_trip_id(f[0])?,
        SignalPoint {
            point,
            dissimilarity,
        },
    ))
}

/// Read a dissimilarity table grouped into per-trip signals.
pub fn read_signals<R: BufRead>(reader: R) -> Result<Parsed<Vec<Signal>>> {
    let mut records = Vec::new();
    let diagnostics = read_lines(reader, Artifact::Dissimilarities, |line| {
        records.push(parse_signal_record(line)?);
        Ok(())
    })?;
    let data = group_by_trip(records)
        .into_iter()
        .map(|(trip_id, points)| Signal { trip_id, points })
        .collect();
    Ok(Parsed { data, diagnostics })
}

pub fn write_signals<W: Write>(mut writer: W, signals: &[Signal]) -> Result<usize> {
    writeln!(writer, "{SIGNAL_HEADER}")?;
    let mut rows = 0;
    for signal in signals {
        for sp in &signal.points {
            let p = &sp.point;
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                signal.trip_id,
                p.time_step,
                sp.dissimilarity,
                p.latitude,
                p.longitude,
                p.speed,
                p.acceleration,
                p.heading
            )?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn parse_start_flag(value: &str) -> std::result::Result<bool, RecordError> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(RecordError::new(
            SkipReason::NotANumber,
            format!("start flag: {other:?}"),
        )),
    }
}

fn parse_segmentation_record(
    line: &str,
) -> std::result::Result<(TripId, (SignalPoint, bool)), RecordError> {
    let f = split_fields(line, 9)?;
    let point = TrajectoryPoint {
        time_step: parse_time_step(f[1])?,
        speed: parse_f64("speed", f[2])?,
        acceleration: parse_f64("acceleration", f[3])?,
        heading: parse_f64("heading", f[4])?,
        latitude: parse_f64("latitude", f[5])?,
        longitude: parse_f64("longitude", f[6])?,
    };
    let dissimilarity = parse_f64("dissimilarity", f[7])?;
    let start = parse_start_flag(f[8])?;
    Ok((
        parse_trip_id(f[0])?,
        (
            SignalPoint {
                point,
                dissimilarity,
            },
            start,
        ),
    ))
}

/// Read a segmentation table back into flagged signals.
pub fn read_segmentation<R: BufRead>(reader: R) -> Result<Parsed<Vec<SegmentedSignal>>> {
    let mut records = Vec::new();
    let diagnostics = read_lines(reader, Artifact::Segmentation, |line| {
        records.push(parse_segmentation_record(line)?);
        Ok(())
    })?;
    let data = group_by_trip(records)
        .into_iter()
        .map(|(trip_id, rows)| {
            let (points, starts) = rows.into_iter().unzip();
            SegmentedSignal {
                signal: Signal { trip_id, points },
                starts,
            }
        })
        .collect();
    Ok(Parsed { data, diagnostics })
}

pub fn write_segmentation<W: Write>(mut writer: W, trips: &[SegmentedSignal]) -> Result<usize> {
    writeln!(writer, "{SEGMENTATION_HEADER}")?;
    let mut rows = 0;
    for trip in trips {
        for (sp, &start) in trip.signal.points.iter().zip(&trip.starts) {
            let p = &sp.point;
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{},{}",
                trip.signal.trip_id,
                p.time_step,
                p.speed,
                p.acceleration,
                p.heading,
                p.latitude,
                p.longitude,
                sp.dissimilarity,
                u8::from(start)
            )?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}
