//! Benchmark driver: allocate, fill, then time naive and tiled multiplies
//! back to back for each repetition.

use std::io::Write;
use std::mem;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::blocked::tile::select_tile_size;
use crate::cache::{CacheProbe, l1d_bytes_or_fallback};
use crate::error::{BenchError, Result};
use crate::matrix::{Alignment, Matrix};
use crate::timing::{Strategy, TimingLog, TimingSample};
use crate::{EPSILON, matrices_equal, multiply_naive, multiply_tiled};

/// Label used when the build doesn't set `CACHEMM_VECTORIZE`.
pub const DEFAULT_LABEL: &str = "disabled";

/// Everything that varies between benchmark runs.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub size: usize,
    pub repetitions: usize,
    /// Vectorization label written into every record.
    pub label: String,
    pub alignment: Alignment,
    /// Compare the two results after every repetition.
    pub verify: bool,
    /// Seed for the input fill; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl BenchConfig {
    /// # Errors
    ///
    /// `InvalidInput` if `size` or `repetitions` is 0, or if `label` is
    /// empty or would break the CSV record (comma or newline).
    pub fn new(size: usize, repetitions: usize, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if size == 0 {
            return Err(invalid("matrix size", size));
        }
        if repetitions == 0 {
            return Err(invalid("repetition count", repetitions));
        }
        if label.is_empty() || label.contains([',', '\n', '\r']) {
            return Err(BenchError::InvalidInput {
                what: "label",
                value: label,
            });
        }

        Ok(Self {
            size,
            repetitions,
            label,
            alignment: Alignment::CacheLine,
            verify: false,
            seed: None,
        })
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

fn invalid(what: &'static str, value: usize) -> BenchError {
    BenchError::InvalidInput {
        what,
        value: value.to_string(),
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub tile_size: usize,
    /// Every sample, in the order it was logged.
    pub samples: Vec<TimingSample>,
    /// Number of repetitions whose results were compared (and matched).
    pub verified: usize,
}

impl RunReport {
    pub fn mean_secs(&self, strategy: Strategy) -> Option<f64> {
        let times: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.strategy == strategy)
            .map(|s| s.elapsed_secs)
            .collect();
        (!times.is_empty()).then(|| times.iter().sum::<f64>() / times.len() as f64)
    }
}

/// Ask the probe for the L1d size and derive the tile size for `size`.
///
/// An unknown cache size is not an error: it yields a tile of 1.
pub fn choose_tile_size(size: usize, probe: &dyn CacheProbe) -> usize {
    let l1d = l1d_bytes_or_fallback(probe);
    info!(
        "L1 data cache size: {} bytes ({:.2} KiB)",
        l1d,
        l1d as f64 / 1024.0
    );

    let tile = select_tile_size(size, l1d, mem::size_of::<f64>());
    info!("Optimal block size: {}", tile);
    tile
}

/// Run the benchmark and append one record per multiply to `log`.
///
/// The inputs are filled once and reused by every repetition, so later
/// repetitions measure timing variance only, not different data. Each timed
/// interval covers the multiply call and nothing else.
///
/// # Errors
///
/// `Allocation` if a matrix can't be allocated, `Io` if a record can't be
/// written, `ResultMismatch` if verification is on and the tiled result
/// differs from the naive one by more than [`EPSILON`].
pub fn run<W: Write>(
    config: &BenchConfig,
    tile_size: usize,
    log: &mut TimingLog<W>,
) -> Result<RunReport> {
    let n = config.size;
    info!("Vectorization: {}", config.label);

    let mut a = Matrix::zeros(n, config.alignment)?;
    let mut b = Matrix::zeros(n, config.alignment)?;
    let mut naive_result = Matrix::zeros(n, config.alignment)?;
    let mut cached_result = Matrix::zeros(n, config.alignment)?;
    debug!(n, align = a.align(), "matrices allocated");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);

    let mut samples = Vec::with_capacity(config.repetitions * 2);
    let mut verified = 0;

    for rep in 1..=config.repetitions {
        naive_result.fill_zeros();
        cached_result.fill_zeros();

        let naive_secs = timed(|| multiply_naive(&a, &b, &mut naive_result));
        info!(
            rep,
            "Time passed to complete naive matrix multiplication: {:.6} seconds", naive_secs
        );
        samples.push(emit(log, config, Strategy::Naive, naive_secs)?);

        let cached_secs = timed(|| multiply_tiled(&a, &b, &mut cached_result, tile_size));
        info!(
            rep,
            "Time passed to complete cache-aware (tiling) matrix multiplication: {:.6} seconds",
            cached_secs
        );
        samples.push(emit(log, config, Strategy::Cached, cached_secs)?);

        if config.verify {
            if !matrices_equal(&naive_result, &cached_result, EPSILON) {
                return Err(BenchError::ResultMismatch { repetition: rep });
            }
            verified += 1;
            debug!(rep, "tiled result matches naive result");
        }
    }

    log.flush()?;

    Ok(RunReport {
        tile_size,
        samples,
        verified,
    })
}

fn timed<F: FnOnce()>(f: F) -> f64 {
    let start = Instant::now();
    f();
    start.elapsed().as_secs_f64()
}

fn emit<W: Write>(
    log: &mut TimingLog<W>,
    config: &BenchConfig,
    strategy: Strategy,
    elapsed_secs: f64,
) -> Result<TimingSample> {
    let sample = TimingSample {
        label: config.label.clone(),
        n: config.size,
        strategy,
        elapsed_secs,
    };
    log.record(&sample)?;
    Ok(sample)
}
