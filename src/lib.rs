//! Naive vs. cache-blocked matrix multiplication, and a harness to time them.
//!
//! The naive i-j-k loop walks B down its columns, so once N gets large
//! every inner iteration misses cache. The tiled version does the exact same
//! arithmetic in blocks sized so that one block each of A, B and C fits in
//! the L1 data cache. The block size comes from the host's cache geometry.
//!
//! ## Usage
//!
//! ```
//! use cachemm::matrix::{Alignment, Matrix};
//! use cachemm::{EPSILON, matrices_equal, multiply_naive, multiply_tiled};
//!
//! let data: Vec<f64> = (0..64 * 64).map(|i| (i % 10) as f64).collect();
//! let a = Matrix::from_row_major(64, &data, Alignment::CacheLine).unwrap();
//! let b = Matrix::identity(64, Alignment::CacheLine).unwrap();
//!
//! let mut naive = Matrix::zeros(64, Alignment::CacheLine).unwrap();
//! let mut tiled = Matrix::zeros(64, Alignment::CacheLine).unwrap();
//! multiply_naive(&a, &b, &mut naive);
//! multiply_tiled(&a, &b, &mut tiled, 16);
//!
//! assert!(matrices_equal(&naive, &tiled, EPSILON));
//! assert!(matrices_equal(&a, &tiled, EPSILON));
//! ```
//!
//! ## What's inside
//!
//! - Tile size selection from L1d size (`blocked::tile`)
//! - Tiled multiply (`blocked::tiled`) and its naive baseline (`matrix::naive_ijk`)
//! - L1d probing through sysfs, injectable for tests (`cache`)
//! - Timing harness and CSV log (`harness`, `timing`)

pub mod blocked;
pub mod cache;
pub mod error;
pub mod harness;
pub mod logging;
pub mod matrix;
pub mod timing;

pub use blocked::tile::select_tile_size;
pub use blocked::tiled::matmul_tiled;
pub use error::{BenchError, Result};
pub use matrix::equality::slices_equal;
pub use matrix::naive_ijk::matmul_naive_ijk;
pub use matrix::{Alignment, Matrix};

/// Largest per-element difference two results may have and still count as
/// equal.
pub const EPSILON: f64 = 1e-6;

/// Matrix multiply with the naive i-j-k loop: C += A * B.
///
/// C must be zeroed first unless accumulating is intended.
///
/// # Panics
///
/// Panics if the three matrices don't share one dimension.
pub fn multiply_naive(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    let n = check_dims(a, b, c);
    matmul_naive_ijk(a.as_slice(), b.as_slice(), c.as_mut_slice(), n);
}

/// Same as [`multiply_naive`] but blocked into `tile × tile` sub-problems.
///
/// # Panics
///
/// Panics on a dimension mismatch or if `tile` is 0.
pub fn multiply_tiled(a: &Matrix, b: &Matrix, c: &mut Matrix, tile: usize) {
    let n = check_dims(a, b, c);
    matmul_tiled(a.as_slice(), b.as_slice(), c.as_mut_slice(), n, tile);
}

/// True iff every element of `a` is within `epsilon` of the matching element
/// of `b`.
pub fn matrices_equal(a: &Matrix, b: &Matrix, epsilon: f64) -> bool {
    matrix::equality::matrices_equal(a, b, epsilon)
}

fn check_dims(a: &Matrix, b: &Matrix, c: &Matrix) -> usize {
    let n = a.dim();
    assert_eq!(b.dim(), n, "B: expected {}x{}, got {}x{}", n, n, b.dim(), b.dim());
    assert_eq!(c.dim(), n, "C: expected {}x{}, got {}x{}", n, n, c.dim(), c.dim());
    n
}
