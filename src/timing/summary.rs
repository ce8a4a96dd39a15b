//! Reading a timing log back and averaging it.
//!
//! Samples are grouped by (N, label, strategy) and averaged over
//! repetitions and runs, which is what the timing plots are drawn from.

use std::collections::BTreeMap;
use std::io::BufRead;

use super::log::CSV_HEADER;
use super::{Strategy, TimingSample};
use crate::error::{BenchError, Result};

/// Mean time for one (N, label, strategy) group.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub n: usize,
    pub label: String,
    pub strategy: Strategy,
    pub mean_secs: f64,
    pub samples: usize,
}

/// Parse every record in a timing log. Header lines and blank lines are
/// skipped; anything else that doesn't parse is an error.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<TimingSample>> {
    let mut samples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line == CSV_HEADER {
            continue;
        }
        samples.push(parse_record(idx + 1, line)?);
    }
    Ok(samples)
}

fn parse_record(line_no: usize, line: &str) -> Result<TimingSample> {
    let malformed = |reason: String| BenchError::MalformedRecord {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(',').collect();
    let &[label, n, strategy, secs] = fields.as_slice() else {
        return Err(malformed(format!("expected 4 fields, got {}", fields.len())));
    };

    Ok(TimingSample {
        label: label.to_string(),
        n: n
            .parse()
            .map_err(|_| malformed(format!("bad dimension {:?}", n)))?,
        strategy: strategy.parse().map_err(malformed)?,
        elapsed_secs: secs
            .parse()
            .map_err(|_| malformed(format!("bad time {:?}", secs)))?,
    })
}

/// Average samples per (N, label, strategy), ordered by N, then label, then
/// naive before cached.
pub fn summarize(samples: &[TimingSample]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(usize, &str, Strategy), (f64, usize)> = BTreeMap::new();
    for s in samples {
        let entry = groups
            .entry((s.n, s.label.as_str(), s.strategy))
            .or_insert((0.0, 0));
        entry.0 += s.elapsed_secs;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((n, label, strategy), (total, count))| SummaryRow {
            n,
            label: label.to_string(),
            strategy,
            mean_secs: total / count as f64,
            samples: count,
        })
        .collect()
}

/// Naive mean divided by cached mean for one (N, label), if both exist.
pub fn speedup(rows: &[SummaryRow], n: usize, label: &str) -> Option<f64> {
    let mean = |strategy| {
        rows.iter()
            .find(|r| r.n == n && r.label == label && r.strategy == strategy)
            .map(|r| r.mean_secs)
    };
    let naive = mean(Strategy::Naive)?;
    let cached = mean(Strategy::Cached)?;
    (cached > 0.0).then(|| naive / cached)
}
