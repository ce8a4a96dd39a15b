//! Tile size selection from L1 data cache geometry.

/// Pick a square tile width for the blocked multiply.
///
/// One inner tile pass touches three `tile × tile` blocks (A, B and C), so
/// the largest tile that keeps them all in L1 satisfies
/// `3 * tile² * element_size <= cache_bytes`. That bound is clamped to `n`
/// and rounded down to a power of two.
///
/// A `cache_bytes` of 0 means the cache size is unknown and gives a tile of
/// 1: no blocking benefit, but the multiply is still correct.
///
/// # Example
///
/// ```
/// use cachemm::blocked::tile::select_tile_size;
///
/// // 32 KiB L1d, f64 elements: sqrt(32768 / 24) = 36, rounded down to 32.
/// assert_eq!(select_tile_size(100, 32 * 1024, 8), 32);
/// assert_eq!(select_tile_size(20, 32 * 1024, 8), 16);
/// assert_eq!(select_tile_size(100, 0, 8), 1);
/// ```
pub fn select_tile_size(n: usize, cache_bytes: usize, element_size: usize) -> usize {
    let limit = n.min(max_block_size(cache_bytes, element_size));

    let mut tile = 1;
    while tile * 2 <= limit {
        tile *= 2;
    }
    tile
}

/// `floor(sqrt(cache_bytes / (3 * element_size)))`, before clamping.
pub fn max_block_size(cache_bytes: usize, element_size: usize) -> usize {
    let per_tile = 3.0 * element_size.max(1) as f64;
    (cache_bytes as f64 / per_tile).sqrt() as usize
}
