use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid {what}: {value:?} (must be a positive integer)")]
    InvalidInput { what: &'static str, value: String },
    #[error("failed to allocate {n}x{n} matrix ({bytes} bytes, align {align})")]
    Allocation { n: usize, bytes: usize, align: usize },
    #[error("couldn't open timing log {}: {source}", path.display())]
    LogOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("timing log I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed timing record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("tiled result diverged from naive result on repetition {repetition}")]
    ResultMismatch { repetition: usize },
}

pub type Result<T> = std::result::Result<T, BenchError>;

/// Parses a strictly positive integer, naming the offending argument on failure.
///
/// Used both by the CLI and by [`crate::harness::BenchConfig`], so `0` and
/// negative values are rejected before anything is allocated.
pub fn parse_positive(what: &'static str, raw: &str) -> Result<usize> {
    let invalid = || BenchError::InvalidInput {
        what,
        value: raw.to_string(),
    };
    let value: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if value <= 0 {
        return Err(invalid());
    }
    usize::try_from(value).map_err(|_| invalid())
}
