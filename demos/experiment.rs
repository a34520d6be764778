use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use cardinality_sketch::experiment::{self, ExperimentConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compare sketch estimates against exact distinct counts over random streams.
#[derive(Parser)]
#[command(about)]
struct Cli {
    /// Number of independent streams.
    #[arg(long, default_value_t = 20)]
    streams: usize,

    /// Number of items in each stream.
    #[arg(long, default_value_t = 200_000)]
    stream_len: usize,

    /// Distance between checkpoints, in percent of the stream.
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    step_percent: i32,

    /// Sketch precision, clamped into [4..16].
    #[arg(long, default_value_t = 10)]
    precision: u8,

    /// Seed of the first stream.
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Seed of the fingerprint function.
    #[arg(long, default_value_t = 777)]
    hash_seed: u32,

    /// Number of independently keyed sketches whose median estimate is recorded.
    ///
    /// Values above 1 also run a single-sketch baseline and log the error reduction.
    #[arg(long, default_value_t = 1)]
    median_of: usize,

    /// Path of the CSV report.
    #[arg(long, default_value = "results.csv")]
    output: PathBuf,
}

impl From<&Cli> for ExperimentConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            streams: cli.streams,
            stream_len: cli.stream_len,
            step_percent: cli.step_percent,
            precision: cli.precision,
            seed: cli.seed,
            hash_seed: cli.hash_seed,
            median_of: cli.median_of,
        }
    }
}

fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = ExperimentConfig::from(&cli);
    let rows = experiment::run(&config);
    experiment::write_csv(BufWriter::new(File::create(&cli.output)?), &rows)?;

    let theory = experiment::theoretical_error(config.precision);
    if let Some(last) = experiment::summarize_by_step(&rows).last() {
        info!(
            mean_relative_error = last.mean_relative_error,
            std_relative_error = last.std_relative_error,
            theory,
            "Final checkpoint error."
        );
    }
    info!(path = %cli.output.display(), rows = rows.len(), "Wrote results.");

    if config.median_of > 1 {
        let baseline = experiment::run(&ExperimentConfig {
            median_of: 1,
            ..config.clone()
        });
        let comparison = experiment::compare_last_step(&baseline, &rows);
        info!(
            median_of = config.median_of,
            base_std_relative_error = comparison.base_std_relative_error,
            improved_std_relative_error = comparison.improved_std_relative_error,
            std_improvement_factor = comparison.std_improvement_factor(),
            "Compared median-of-k against single sketch."
        );
    }

    Ok(())
}
