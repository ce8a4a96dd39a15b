//! L1 data cache geometry.
//!
//! The tile selector only needs one number, the L1d size in bytes. Where it
//! comes from is host specific, so it is hidden behind [`CacheProbe`]; tests
//! and the `--l1d-bytes` override use [`FixedCache`] or a closure instead of
//! the real machine.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Cache size used when the probe has nothing to report. Zero makes
/// [`select_tile_size`](crate::blocked::tile::select_tile_size) fall back to
/// a tile of 1.
pub const FALLBACK_L1D_BYTES: usize = 0;

const SYSFS_CPU0_CACHE: &str = "/sys/devices/system/cpu/cpu0/cache";

pub trait CacheProbe {
    /// L1 data cache size in bytes, or `None` if unknown.
    fn l1d_bytes(&self) -> Option<usize>;
}

impl<F> CacheProbe for F
where
    F: Fn() -> Option<usize>,
{
    fn l1d_bytes(&self) -> Option<usize> {
        self()
    }
}

/// A cache size known up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedCache(pub usize);

impl CacheProbe for FixedCache {
    fn l1d_bytes(&self) -> Option<usize> {
        Some(self.0)
    }
}

/// Reads the L1d size the Linux kernel exports under sysfs.
///
/// Each `index*` directory describes one cache; the one with `level` 1 and
/// `type` Data (or Unified, on cores without a split L1) wins. Anywhere
/// without that tree, this reports `None`.
#[derive(Debug, Clone)]
pub struct SysfsProbe {
    root: PathBuf,
}

impl SysfsProbe {
    pub fn new() -> Self {
        Self::with_root(SYSFS_CPU0_CACHE)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_index(dir: &Path) -> Option<usize> {
        let read = |name: &str| fs::read_to_string(dir.join(name)).ok();

        let level = read("level")?;
        if level.trim() != "1" {
            return None;
        }
        let kind = read("type")?;
        if !matches!(kind.trim(), "Data" | "Unified") {
            return None;
        }
        parse_cache_size(&read("size")?)
    }
}

impl Default for SysfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheProbe for SysfsProbe {
    fn l1d_bytes(&self) -> Option<usize> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "no sysfs cache info");
                return None;
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("index"))
            })
            .collect();
        dirs.sort();

        dirs.iter().find_map(|dir| Self::read_index(dir))
    }
}

/// Parse a sysfs cache size such as `32K`, `1M` or `49152`.
pub fn parse_cache_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let (digits, scale) = match raw.char_indices().last()? {
        (i, 'K' | 'k') => (&raw[..i], 1024),
        (i, 'M' | 'm') => (&raw[..i], 1024 * 1024),
        (i, 'G' | 'g') => (&raw[..i], 1024 * 1024 * 1024),
        _ => (raw, 1),
    };
    digits.trim().parse::<usize>().ok()?.checked_mul(scale)
}

/// Ask `probe` for the L1d size, substituting [`FALLBACK_L1D_BYTES`] when it
/// has no answer. Never fails.
pub fn l1d_bytes_or_fallback(probe: &dyn CacheProbe) -> usize {
    match probe.l1d_bytes() {
        Some(bytes) if bytes > 0 => bytes,
        _ => {
            warn!(
                fallback = FALLBACK_L1D_BYTES,
                "L1 data cache size unavailable, tiling falls back to 1x1 blocks"
            );
            FALLBACK_L1D_BYTES
        }
    }
}
