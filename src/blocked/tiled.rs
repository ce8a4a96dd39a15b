//! Cache-blocked (tiled) square matrix multiplication.

/// Tiled matrix multiplication: C += A * B.
///
/// The i, j and k ranges are cut into blocks of `tile` (the last block in
/// each dimension is clamped to `n`). For every (i-block, j-block, k-block)
/// triple the plain i-j-k accumulation runs over just that sub-range, so the
/// three `tile × tile` blocks it touches stay in L1.
///
/// k-blocks are visited in ascending order, which means each `C[i][j]` adds
/// its k terms in exactly the same order as [`matmul_naive_ijk`]. The result
/// is bit-for-bit the naive result, only the memory access order changes.
///
/// # Arguments
///
/// * `a`, `b` - Input matrices (n × n), row-major
/// * `c` - Output matrix (n × n), row-major, accumulated into
/// * `n` - Side length
/// * `tile` - Block width, normally from
///   [`select_tile_size`](super::tile::select_tile_size)
///
/// # Panics
///
/// Panics if `tile` is 0.
///
/// [`matmul_naive_ijk`]: crate::matrix::naive_ijk::matmul_naive_ijk
pub fn matmul_tiled(a: &[f64], b: &[f64], c: &mut [f64], n: usize, tile: usize) {
    assert!(tile > 0, "tile size must be positive");

    for i0 in (0..n).step_by(tile) {
        let i_end = (i0 + tile).min(n);
        for j0 in (0..n).step_by(tile) {
            let j_end = (j0 + tile).min(n);
            for k0 in (0..n).step_by(tile) {
                let k_end = (k0 + tile).min(n);
                tile_kernel(a, b, c, n, i0..i_end, j0..j_end, k0..k_end);
            }
        }
    }
}

// Naive accumulation restricted to one block triple. The running sum lives
// in a register for the k loop but starts from and ends in C, so the
// addition order per element is unchanged.
#[inline(always)]
fn tile_kernel(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    n: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
    depth: std::ops::Range<usize>,
) {
    for i in rows {
        let a_row = &a[i * n..(i + 1) * n];
        for j in cols.clone() {
            let mut acc = c[i * n + j];
            for k in depth.clone() {
                acc += a_row[k] * b[k * n + j];
            }
            c[i * n + j] = acc;
        }
    }
}
