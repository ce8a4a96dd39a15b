use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::TimingSample;
use crate::error::{BenchError, Result};

/// Column names read back by the summary and plotting tools.
pub const CSV_HEADER: &str = "VECTORIZE,N,type,time";

/// Append-only sink for [`TimingSample`] records, one CSV line each.
#[derive(Debug)]
pub struct TimingLog<W: Write> {
    out: W,
    written: usize,
}

impl TimingLog<File> {
    /// Open `path` for appending, creating it if needed.
    ///
    /// Earlier runs are kept. A new or empty file gets [`CSV_HEADER`] first.
    pub fn open_append(path: &Path) -> Result<Self> {
        let open_err = |source| BenchError::LogOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let is_empty = file.metadata().map_err(open_err)?.len() == 0;

        let mut log = Self::new(file);
        if is_empty {
            writeln!(log.out, "{}", CSV_HEADER)?;
        }
        debug!(path = %path.display(), new = is_empty, "timing log opened");
        Ok(log)
    }
}

impl<W: Write> TimingLog<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn record(&mut self, sample: &TimingSample) -> Result<()> {
        writeln!(self.out, "{}", sample.to_record())?;
        self.written += 1;
        Ok(())
    }

    /// Number of samples recorded through this handle.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
