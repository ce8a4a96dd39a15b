//! Criterion comparison of the naive and tiled multiplies.
//!
//! Tile sizes are swept explicitly so the effect of the cache-derived choice
//! can be compared against its neighbours.

use cachemm::cache::{SysfsProbe, l1d_bytes_or_fallback};
use cachemm::matrix::{Alignment, Matrix};
use cachemm::{multiply_naive, multiply_tiled, select_tile_size};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn inputs(n: usize) -> (Matrix, Matrix, Matrix) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut a = Matrix::zeros(n, Alignment::CacheLine).unwrap();
    let mut b = Matrix::zeros(n, Alignment::CacheLine).unwrap();
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);
    let c = Matrix::zeros(n, Alignment::CacheLine).unwrap();
    (a, b, c)
}

fn bench_naive_vs_tiled(c: &mut Criterion) {
    let l1d = l1d_bytes_or_fallback(&SysfsProbe::new());
    let mut group = c.benchmark_group("naive_vs_tiled");
    group.sample_size(10);

    for n in [128, 256, 512] {
        let (a, b, mut out) = inputs(n);
        let tile = select_tile_size(n, l1d, std::mem::size_of::<f64>());
        group.throughput(Throughput::Elements((2 * n * n * n) as u64));

        group.bench_with_input(BenchmarkId::new("naive", n), &n, |bencher, _| {
            bencher.iter(|| {
                out.fill_zeros();
                multiply_naive(black_box(&a), black_box(&b), &mut out);
            })
        });
        group.bench_with_input(BenchmarkId::new("tiled", n), &tile, |bencher, &tile| {
            bencher.iter(|| {
                out.fill_zeros();
                multiply_tiled(black_box(&a), black_box(&b), &mut out, tile);
            })
        });
    }
    group.finish();
}

fn bench_tile_sweep(c: &mut Criterion) {
    let n = 512;
    let (a, b, mut out) = inputs(n);
    let mut group = c.benchmark_group("tile_sweep_512");
    group.sample_size(10);

    for tile in [4, 8, 16, 32, 64, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(tile), &tile, |bencher, &tile| {
            bencher.iter(|| {
                out.fill_zeros();
                multiply_tiled(black_box(&a), black_box(&b), &mut out, tile);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_naive_vs_tiled, bench_tile_sweep);
criterion_main!(benches);
