//! Timing samples and the CSV log they are appended to.

pub mod log;
pub mod summary;

use std::fmt;
use std::str::FromStr;

pub use log::TimingLog;
pub use summary::{SummaryRow, read_samples, summarize};

/// Which multiplier a sample measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    Naive,
    Cached,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Cached => "cached",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(Strategy::Naive),
            "cached" => Ok(Strategy::Cached),
            other => Err(format!("unknown strategy {:?}", other)),
        }
    }
}

/// One timed multiplier call.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    /// Vectorization label of the build that produced the sample.
    pub label: String,
    pub n: usize,
    pub strategy: Strategy,
    pub elapsed_secs: f64,
}

impl TimingSample {
    /// CSV line without the trailing newline: `label,N,strategy,seconds`.
    pub fn to_record(&self) -> String {
        format!(
            "{},{},{},{:.6}",
            self.label, self.n, self.strategy, self.elapsed_secs
        )
    }
}
