//! Benchmark runner: naive vs. cache-blocked matrix multiplication.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use cachemm::cache::{CacheProbe, FixedCache, SysfsProbe};
use cachemm::error::{BenchError, parse_positive};
use cachemm::harness::{self, BenchConfig, DEFAULT_LABEL, RunReport};
use cachemm::logging::init_logging;
use cachemm::matrix::Alignment;
use cachemm::timing::summary::speedup;
use cachemm::timing::{Strategy, SummaryRow, TimingLog, read_samples, summarize};
use clap::Parser;
use tracing::error;

/// Build-time vectorization label, e.g. `CACHEMM_VECTORIZE=enabled` for a
/// build with `-C target-cpu=native`.
const BUILD_LABEL: &str = match option_env!("CACHEMM_VECTORIZE") {
    Some(label) => label,
    None => DEFAULT_LABEL,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Times naive and cache-blocked matrix multiplication",
    allow_negative_numbers = true
)]
struct Opt {
    /// Matrix dimension N (matrices are N×N)
    #[arg(default_value = "2048", value_parser = parse_size)]
    size: usize,

    /// Number of timed repetitions per strategy
    #[arg(default_value = "1", value_parser = parse_repetitions)]
    repetitions: usize,

    /// Vectorization label written to each record
    #[arg(long, default_value = BUILD_LABEL)]
    label: String,

    /// Allocate with natural f64 alignment instead of 64-byte alignment
    #[arg(long)]
    unaligned: bool,

    /// Timing log, appended to
    #[arg(short, long, default_value = "timings.csv")]
    output: PathBuf,

    /// Use this L1 data cache size (bytes) instead of probing the host
    #[arg(long)]
    l1d_bytes: Option<usize>,

    /// Seed for the random input matrices
    #[arg(long)]
    seed: Option<u64>,

    /// Check that the tiled result matches the naive one after each repetition
    #[arg(long)]
    verify: bool,

    /// Print averaged timings from the log instead of running
    #[arg(long)]
    summarize: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_size(raw: &str) -> Result<usize, BenchError> {
    parse_positive("matrix size", raw)
}

fn parse_repetitions(raw: &str) -> Result<usize, BenchError> {
    parse_positive("repetition count", raw)
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    init_logging(opt.verbose);

    let result = if opt.summarize {
        summarize_log(&opt)
    } else {
        run(&opt)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(opt: &Opt) -> Result<(), BenchError> {
    let alignment = if opt.unaligned {
        Alignment::Natural
    } else {
        Alignment::CacheLine
    };
    let config = BenchConfig::new(opt.size, opt.repetitions, opt.label.clone())?
        .with_alignment(alignment)
        .with_verify(opt.verify)
        .with_seed(opt.seed);

    let probe: Box<dyn CacheProbe> = match opt.l1d_bytes {
        Some(bytes) => Box::new(FixedCache(bytes)),
        None => Box::new(SysfsProbe::new()),
    };
    let tile_size = harness::choose_tile_size(config.size, probe.as_ref());

    // Open the log before allocating so an unwritable path fails fast.
    let mut log = TimingLog::open_append(&opt.output)?;
    let report = harness::run(&config, tile_size, &mut log)?;

    print_run_summary(&config, &report);
    Ok(())
}

fn summarize_log(opt: &Opt) -> Result<(), BenchError> {
    let file = File::open(&opt.output).map_err(|source| BenchError::LogOpen {
        path: opt.output.clone(),
        source,
    })?;
    let samples = read_samples(BufReader::new(file))?;
    print_summary_table(&summarize(&samples));
    Ok(())
}

fn print_run_summary(config: &BenchConfig, report: &RunReport) {
    let (Some(naive), Some(cached)) = (
        report.mean_secs(Strategy::Naive),
        report.mean_secs(Strategy::Cached),
    ) else {
        return;
    };

    println!("\n{}", "=".repeat(60));
    println!(
        "N={}  tile={}  label={}  repetitions={}",
        config.size, report.tile_size, config.label, config.repetitions
    );
    println!("{}", "-".repeat(60));
    println!("{:<10} {:>14.6} s", "naive", naive);
    println!("{:<10} {:>14.6} s", "cached", cached);
    if cached > 0.0 {
        println!("{:<10} {:>14.2}×", "speedup", naive / cached);
    }
    if report.verified > 0 {
        println!("verified {} repetition(s) within {:e}", report.verified, cachemm::EPSILON);
    }
    println!("{}", "=".repeat(60));
}

fn print_summary_table(rows: &[SummaryRow]) {
    if rows.is_empty() {
        println!("No timing records.");
        return;
    }

    let mut sizes: Vec<usize> = rows.iter().map(|r| r.n).collect();
    sizes.dedup();

    for n in sizes {
        println!("\n{}", "=".repeat(60));
        println!("Matrix Multiplication Timings (N={})", n);
        println!("{}", "=".repeat(60));
        println!(
            "{:<20} {:>14} {:>8} {:>12}",
            "Label-Type", "Avg time (s)", "Runs", "Speedup"
        );
        println!("{}", "-".repeat(60));

        for row in rows.iter().filter(|r| r.n == n) {
            let name = format!("{}-{}", row.label, row.strategy);
            let ratio = match row.strategy {
                Strategy::Cached => speedup(rows, n, &row.label)
                    .map(|s| format!("{:.2}×", s))
                    .unwrap_or_default(),
                Strategy::Naive => String::new(),
            };
            println!(
                "{:<20} {:>14.6} {:>8} {:>12}",
                name, row.mean_secs, row.samples, ratio
            );
        }
    }
    println!("\nSpeedup = naive / cached for the same label. Higher is better.\n");
}
