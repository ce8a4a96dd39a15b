/// Naive square matrix multiplication using i-j-k loop order.
///
/// This is the textbook triple loop. The innermost loop walks B with stride
/// `n` (down a column), so once a column of B no longer fits in cache every
/// iteration misses. It is the baseline the tiled version is measured
/// against.
///
/// # Arguments
///
/// * `a` - Matrix A (n × n), row-major
/// * `b` - Matrix B (n × n), row-major
/// * `c` - Matrix C (n × n), row-major, accumulated into (C += A * B)
/// * `n` - Side length of all three matrices
///
/// C is not cleared first. Zero it before calling unless accumulation is
/// what you want.
pub fn matmul_naive_ijk(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                c[i * n + j] += a[i * n + k] * b[k * n + j];
            }
        }
    }
}
