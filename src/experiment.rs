//! ## Accuracy experiment
//! Runs several random streams through a [`Sketch`] and an exact distinct counter side by side,
//! recording both at stream checkpoints. Results can be written as CSV and summarized per
//! checkpoint step to compare the observed error with the theoretical `1.04 / sqrt(m)`.
//!
//! With `median_of = k > 1` every stream feeds `k` sketches keyed with consecutive hash seeds and
//! each checkpoint records the median of their estimates. [`compare_last_step`] then reports how
//! much that narrows the spread of the relative error against a single-sketch run.

use std::collections::HashSet;
use std::io::{self, Write};

use tracing::{debug, info};

use crate::fingerprint::fnv1a32;
use crate::sketch::{Sketch, DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
use crate::stream::RandomStream;

/// CSV header written by `write_csv`
pub const CSV_HEADER: &str = "stream_id,step,fraction,processed,true_f0,estimate";
/// Seed offset between consecutive streams
const STREAM_SEED_STRIDE: u64 = 1000;

/// Experiment parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentConfig {
    /// Number of independent streams
    pub streams: usize,
    /// Number of items in each stream
    pub stream_len: usize,
    /// Distance between checkpoints in percent of the stream
    pub step_percent: i32,
    /// Sketch precision
    pub precision: u8,
    /// Seed of the first stream, stream `i` uses `seed + i * 1000`
    pub seed: u64,
    /// Seed of the fingerprint function, shared by all streams
    pub hash_seed: u32,
    /// Number of independently keyed sketches per stream, the median estimate is recorded
    pub median_of: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            streams: 20,
            stream_len: 200_000,
            step_percent: 5,
            precision: DEFAULT_PRECISION,
            seed: 12345,
            hash_seed: 777,
            median_of: 1,
        }
    }
}

/// Exact and estimated distinct counts at one stream checkpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub stream_id: usize,
    pub step: usize,
    /// Processed share of the stream in `[0..1]`
    pub fraction: f64,
    pub processed: usize,
    pub true_f0: usize,
    pub estimate: f64,
}

impl Checkpoint {
    /// Signed relative error of the estimate, 0 for an empty prefix
    pub fn relative_error(&self) -> f64 {
        if self.true_f0 == 0 {
            return 0.0;
        }
        (self.estimate - self.true_f0 as f64) / self.true_f0 as f64
    }
}

/// Per-step aggregate over all streams.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSummary {
    pub step: usize,
    pub fraction: f64,
    pub mean_estimate: f64,
    pub std_estimate: f64,
    pub mean_relative_error: f64,
    pub std_relative_error: f64,
}

/// Error spread at the last checkpoint of a baseline run and a median-of-k run.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub base_mean_relative_error: f64,
    pub base_std_relative_error: f64,
    pub improved_mean_relative_error: f64,
    pub improved_std_relative_error: f64,
}

impl Comparison {
    /// Ratio of baseline to improved standard deviation, `None` when the improved one is 0
    pub fn std_improvement_factor(&self) -> Option<f64> {
        if self.improved_std_relative_error == 0.0 {
            return None;
        }
        Some(self.base_std_relative_error / self.improved_std_relative_error)
    }
}

/// Run a single stream, recording a `Checkpoint` whenever the processed prefix reaches one of
/// `checkpoints`.
///
/// Items are fed to `median_of` sketches, sketch `j` keyed with `hash_seed + j`. A checkpoint
/// listed at prefix 0 is recorded before the first item.
pub fn run_stream(
    stream_id: usize,
    stream: &RandomStream,
    checkpoints: &[usize],
    hash_seed: u32,
    precision: u8,
    median_of: usize,
) -> Vec<Checkpoint> {
    let mut sketches = KeyedSketches::new(median_of, hash_seed, precision);
    let mut exact: HashSet<&str> = HashSet::with_capacity(stream.len());
    let mut results = Vec::with_capacity(checkpoints.len());
    let mut pending = checkpoints.iter().copied().peekable();

    // checkpoints at an empty prefix
    while let Some(processed) = pending.next_if_eq(&0) {
        let step = results.len();
        results.push(checkpoint(stream_id, step, stream.len(), processed, &exact, &sketches));
    }

    for (i, item) in stream.items().iter().enumerate() {
        exact.insert(item.as_str());
        sketches.add(item.as_bytes());

        while let Some(processed) = pending.next_if_eq(&(i + 1)) {
            let step = results.len();
            results.push(checkpoint(stream_id, step, stream.len(), processed, &exact, &sketches));
        }
    }

    results
}

fn checkpoint(
    stream_id: usize,
    step: usize,
    stream_len: usize,
    processed: usize,
    exact: &HashSet<&str>,
    sketches: &KeyedSketches,
) -> Checkpoint {
    let fraction = if stream_len == 0 {
        0.0
    } else {
        processed as f64 / stream_len as f64
    };

    Checkpoint {
        stream_id,
        step,
        fraction,
        processed,
        true_f0: exact.len(),
        estimate: sketches.estimate(),
    }
}

/// Sketches fed with the same items under consecutive hash seeds
struct KeyedSketches {
    hash_seed: u32,
    sketches: Vec<Sketch>,
}

impl KeyedSketches {
    fn new(count: usize, hash_seed: u32, precision: u8) -> Self {
        Self {
            hash_seed,
            sketches: (0..count.max(1)).map(|_| Sketch::new(precision)).collect(),
        }
    }

    fn add(&mut self, item: &[u8]) {
        let mut seed = self.hash_seed;
        for sketch in &mut self.sketches {
            sketch.add(fnv1a32(seed, item));
            seed = seed.wrapping_add(1);
        }
    }

    /// Median estimate, the mean of the two middle ones for an even count
    fn estimate(&self) -> f64 {
        let mut estimates: Vec<f64> = self.sketches.iter().map(Sketch::estimate).collect();
        estimates.sort_by(f64::total_cmp);
        let mid = estimates.len() / 2;
        if estimates.len() % 2 == 0 {
            (estimates[mid - 1] + estimates[mid]) / 2.0
        } else {
            estimates[mid]
        }
    }
}

/// Run all streams described by `config`
pub fn run(config: &ExperimentConfig) -> Vec<Checkpoint> {
    info!(
        streams = config.streams,
        stream_len = config.stream_len,
        precision = config.precision,
        median_of = config.median_of,
        "Starting cardinality experiment."
    );

    let mut results = Vec::new();
    for stream_id in 0..config.streams {
        let seed = config
            .seed
            .wrapping_add((stream_id as u64).wrapping_mul(STREAM_SEED_STRIDE));
        let stream = RandomStream::generate(config.stream_len, seed);
        let checkpoints = stream.checkpoints_by_percent(config.step_percent);
        let rows = run_stream(
            stream_id,
            &stream,
            &checkpoints,
            config.hash_seed,
            config.precision,
            config.median_of,
        );

        if let Some(last) = rows.last() {
            debug!(
                stream_id,
                true_f0 = last.true_f0,
                estimate = last.estimate,
                "Finished stream."
            );
        }
        results.extend(rows);
    }

    results
}

/// Write checkpoints as CSV
pub fn write_csv<W: Write>(mut writer: W, rows: &[Checkpoint]) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            row.stream_id, row.step, row.fraction, row.processed, row.true_f0, row.estimate
        )?;
    }
    writer.flush()
}

/// Aggregate checkpoints with the same step across streams
pub fn summarize_by_step(rows: &[Checkpoint]) -> Vec<StepSummary> {
    let steps = rows.iter().map(|row| row.step + 1).max().unwrap_or(0);
    (0..steps)
        .filter_map(|step| {
            let items: Vec<&Checkpoint> = rows.iter().filter(|row| row.step == step).collect();
            let first = items.first()?;
            let (mean_estimate, std_estimate) = mean_and_pstdev(items.iter().map(|r| r.estimate));
            let (mean_relative_error, std_relative_error) =
                mean_and_pstdev(items.iter().map(|r| r.relative_error()));
            Some(StepSummary {
                step,
                fraction: first.fraction,
                mean_estimate,
                std_estimate,
                mean_relative_error,
                std_relative_error,
            })
        })
        .collect()
}

/// Compare relative error at the last checkpoint step of a baseline and an improved run
pub fn compare_last_step(base: &[Checkpoint], improved: &[Checkpoint]) -> Comparison {
    let last_error = |rows: &[Checkpoint]| {
        summarize_by_step(rows)
            .last()
            .map_or((0.0, 0.0), |s| (s.mean_relative_error, s.std_relative_error))
    };
    let (base_mean_relative_error, base_std_relative_error) = last_error(base);
    let (improved_mean_relative_error, improved_std_relative_error) = last_error(improved);

    Comparison {
        base_mean_relative_error,
        base_std_relative_error,
        improved_mean_relative_error,
        improved_std_relative_error,
    }
}

/// Theoretical relative standard error of a sketch with `2^precision` registers
pub fn theoretical_error(precision: u8) -> f64 {
    let precision = precision.clamp(MIN_PRECISION, MAX_PRECISION);
    1.04 / f64::from(1u32 << precision).sqrt()
}

/// Mean and population standard deviation
fn mean_and_pstdev<I: Iterator<Item = f64> + Clone>(values: I) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    (mean, variance.sqrt())
}
