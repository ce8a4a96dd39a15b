use cachemm::cache::FixedCache;
use cachemm::error::{BenchError, parse_positive};
use cachemm::harness::{self, BenchConfig};
use cachemm::matrix::{Alignment, Matrix};
use cachemm::timing::{Strategy, TimingLog, read_samples, summarize};
use cachemm::{
    EPSILON, matmul_naive_ijk, matmul_tiled, matrices_equal, multiply_naive, multiply_tiled,
    select_tile_size,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn assert_matrices_equal(expected: &[f64], actual: &[f64], name: &str) {
    assert_eq!(expected.len(), actual.len(), "{}: length mismatch", name);
    for i in 0..expected.len() {
        assert!(
            (expected[i] - actual[i]).abs() <= EPSILON,
            "{}: mismatch at index {}: expected {}, got {}",
            name,
            i,
            expected[i],
            actual[i]
        );
    }
}

fn random_matrix(n: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut m = Matrix::zeros(n, Alignment::CacheLine).unwrap();
    m.fill_random(&mut rng);
    m
}

fn powers_of_two_up_to(n: usize) -> Vec<usize> {
    std::iter::successors(Some(1), |t| Some(t * 2))
        .take_while(|&t| t <= n)
        .collect()
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn test_4x4_times_identity() {
    let data: Vec<f64> = (1..=16).map(|v| v as f64).collect();
    let a = Matrix::from_row_major(4, &data, Alignment::CacheLine).unwrap();
    let b = Matrix::identity(4, Alignment::CacheLine).unwrap();

    let mut c_naive = Matrix::zeros(4, Alignment::CacheLine).unwrap();
    let mut c_tiled = Matrix::zeros(4, Alignment::CacheLine).unwrap();

    multiply_naive(&a, &b, &mut c_naive);
    multiply_tiled(&a, &b, &mut c_tiled, 2);

    assert_eq!(c_naive.as_slice(), &data[..]);
    assert_eq!(c_tiled.as_slice(), &data[..]);
}

#[test]
fn test_single_element() {
    let a = Matrix::from_row_major(1, &[3.5], Alignment::Natural).unwrap();
    let b = Matrix::from_row_major(1, &[-2.0], Alignment::Natural).unwrap();

    let mut c_naive = Matrix::zeros(1, Alignment::Natural).unwrap();
    let mut c_tiled = Matrix::zeros(1, Alignment::Natural).unwrap();
    multiply_naive(&a, &b, &mut c_naive);
    multiply_tiled(&a, &b, &mut c_tiled, 1);

    assert_eq!(c_naive[(0, 0)], -7.0);
    assert_eq!(c_tiled[(0, 0)], -7.0);
}

#[test]
fn test_tile_size_for_32k_l1() {
    assert_eq!(select_tile_size(100, 32768, 8), 32);
}

// ============================================================
// Tiled vs naive
// ============================================================

#[test]
fn test_tiled_matches_naive_for_every_power_of_two_tile() {
    for n in [2, 5, 16, 31, 64] {
        let a = random_matrix(n, 1);
        let b = random_matrix(n, 2);
        let mut expected = Matrix::zeros(n, Alignment::CacheLine).unwrap();
        multiply_naive(&a, &b, &mut expected);

        for tile in powers_of_two_up_to(n) {
            let mut c = Matrix::zeros(n, Alignment::CacheLine).unwrap();
            multiply_tiled(&a, &b, &mut c, tile);
            assert!(
                matrices_equal(&expected, &c, EPSILON),
                "n={} tile={}",
                n,
                tile
            );
            assert_matrices_equal(
                expected.as_slice(),
                c.as_slice(),
                &format!("n{}_tile{}", n, tile),
            );
        }
    }
}

#[test]
fn test_tile_boundaries_not_dividing_n() {
    let test_sizes = [3, 7, 9, 15, 17, 33, 65];

    for n in test_sizes {
        let a: Vec<f64> = (0..n * n).map(|i| (i % 10) as f64).collect();
        let b: Vec<f64> = (0..n * n).map(|i| (i % 7) as f64).collect();

        let mut c_naive = vec![0.0; n * n];
        matmul_naive_ijk(&a, &b, &mut c_naive, n);

        for tile in [2, 4, 8, 16] {
            let mut c_tiled = vec![0.0; n * n];
            matmul_tiled(&a, &b, &mut c_tiled, n, tile);
            assert_matrices_equal(&c_naive, &c_tiled, &format!("size_{}_tile_{}", n, tile));
        }
    }
}

#[test]
fn test_tiled_is_bit_identical_to_naive() {
    let n = 48;
    let a = random_matrix(n, 10);
    let b = random_matrix(n, 11);

    let mut c_naive = Matrix::zeros(n, Alignment::Natural).unwrap();
    let mut c_tiled = Matrix::zeros(n, Alignment::Natural).unwrap();
    multiply_naive(&a, &b, &mut c_naive);
    multiply_tiled(&a, &b, &mut c_tiled, 16);

    assert_eq!(c_naive.as_slice(), c_tiled.as_slice());
}

#[test]
fn test_alignment_does_not_change_results() {
    let n = 20;
    let data: Vec<f64> = (0..n * n).map(|i| (i % 13) as f64 * 0.25).collect();

    let mut results = Vec::new();
    for alignment in [Alignment::Natural, Alignment::CacheLine] {
        let a = Matrix::from_row_major(n, &data, alignment).unwrap();
        let mut c = Matrix::zeros(n, alignment).unwrap();
        multiply_tiled(&a, &a, &mut c, 8);
        results.push(c.as_slice().to_vec());
    }
    assert_eq!(results[0], results[1]);
}

// ============================================================
// Accumulation and repeatability
// ============================================================

#[test]
fn test_accumulation() {
    let n = 16;
    let a = random_matrix(n, 3);
    let b = random_matrix(n, 4);

    let mut once = Matrix::zeros(n, Alignment::CacheLine).unwrap();
    multiply_naive(&a, &b, &mut once);

    // Without re-zeroing, a second pass doubles the result.
    let mut twice = Matrix::zeros(n, Alignment::CacheLine).unwrap();
    multiply_tiled(&a, &b, &mut twice, 4);
    multiply_tiled(&a, &b, &mut twice, 4);

    let doubled: Vec<f64> = once.as_slice().iter().map(|v| v * 2.0).collect();
    assert_matrices_equal(&doubled, twice.as_slice(), "accumulation");
}

#[test]
fn test_rezero_and_rerun_is_idempotent() {
    let n = 24;
    let a = random_matrix(n, 5);
    let b = random_matrix(n, 6);
    let mut c = Matrix::zeros(n, Alignment::CacheLine).unwrap();

    multiply_naive(&a, &b, &mut c);
    let first_naive = c.as_slice().to_vec();
    c.fill_zeros();
    multiply_naive(&a, &b, &mut c);
    assert_eq!(c.as_slice(), &first_naive[..]);

    c.fill_zeros();
    multiply_tiled(&a, &b, &mut c, 8);
    let first_tiled = c.as_slice().to_vec();
    c.fill_zeros();
    multiply_tiled(&a, &b, &mut c, 8);
    assert_eq!(c.as_slice(), &first_tiled[..]);
}

// ============================================================
// Equality checker
// ============================================================

#[test]
fn test_equality_reflexive_and_symmetric() {
    let a = random_matrix(8, 7);
    let mut b = random_matrix(8, 7);
    assert!(matrices_equal(&a, &a, 0.0));
    assert!(matrices_equal(&a, &b, 0.0));

    b[(3, 4)] += 1e-3;
    assert!(!matrices_equal(&a, &b, EPSILON));
    assert!(!matrices_equal(&b, &a, EPSILON));
    assert!(matrices_equal(&a, &b, 1e-2));
    assert!(matrices_equal(&b, &a, 1e-2));
}

#[test]
fn test_equality_dimension_mismatch() {
    let a = Matrix::zeros(2, Alignment::Natural).unwrap();
    let b = Matrix::zeros(3, Alignment::Natural).unwrap();
    assert!(!matrices_equal(&a, &b, 1.0));
}

#[test]
#[should_panic(expected = "B: expected 2x2")]
fn test_dimension_mismatch_panics() {
    let a = Matrix::zeros(2, Alignment::Natural).unwrap();
    let b = Matrix::zeros(3, Alignment::Natural).unwrap();
    let mut c = Matrix::zeros(2, Alignment::Natural).unwrap();
    multiply_naive(&a, &b, &mut c);
}

// ============================================================
// Input validation and harness
// ============================================================

#[test]
fn test_invalid_dimensions_rejected() {
    for raw in ["0", "-5"] {
        let err = parse_positive("matrix size", raw).unwrap_err();
        assert!(matches!(err, BenchError::InvalidInput { .. }), "{}", raw);
    }
    assert!(BenchConfig::new(0, 1, "disabled").is_err());
    assert!(BenchConfig::new(4, 0, "disabled").is_err());
}

#[test]
fn test_harness_end_to_end() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("timings.csv");

    let config = BenchConfig::new(32, 2, "enabled")
        .unwrap()
        .with_seed(Some(99))
        .with_verify(true);
    let tile = harness::choose_tile_size(config.size, &FixedCache(32768));
    assert_eq!(tile, 32);

    for _ in 0..2 {
        let mut log = TimingLog::open_append(&path).unwrap();
        let report = harness::run(&config, tile, &mut log).unwrap();
        assert_eq!(report.verified, 2);
    }

    let file = std::fs::File::open(&path).unwrap();
    let samples = read_samples(std::io::BufReader::new(file)).unwrap();
    assert_eq!(samples.len(), 8);
    assert!(samples.iter().all(|s| s.label == "enabled" && s.n == 32));

    let rows = summarize(&samples);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].strategy, Strategy::Naive);
    assert_eq!(rows[0].samples, 4);
    assert_eq!(rows[1].strategy, Strategy::Cached);
}

#[test]
fn test_harness_with_unknown_cache_still_correct() {
    let config = BenchConfig::new(12, 1, "disabled")
        .unwrap()
        .with_alignment(Alignment::Natural)
        .with_seed(Some(5))
        .with_verify(true);
    let tile = harness::choose_tile_size(config.size, &|| None::<usize>);
    assert_eq!(tile, 1);

    let mut log = TimingLog::new(Vec::new());
    let report = harness::run(&config, tile, &mut log).unwrap();
    assert_eq!(report.samples.len(), 2);
    assert_eq!(report.verified, 1);
}
