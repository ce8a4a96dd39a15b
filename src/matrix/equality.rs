//! Tolerance-based comparison of result matrices.

use super::storage::Matrix;

/// True iff every pair of elements differs by at most `epsilon`.
///
/// Stops at the first element outside the tolerance. Slices of different
/// lengths are never equal.
pub fn slices_equal(a: &[f64], b: &[f64], epsilon: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= epsilon)
}

/// Matrix form of [`slices_equal`]. Matrices of different dimension are not
/// equal.
pub fn matrices_equal(a: &Matrix, b: &Matrix, epsilon: f64) -> bool {
    a.dim() == b.dim() && slices_equal(a.as_slice(), b.as_slice(), epsilon)
}
