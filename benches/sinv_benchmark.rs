//! Sparse inverse benchmark
//!
//! Times the full pipeline (factorization + selected inversion) on 2D grid
//! Laplacians, comparing the natural ordering against AMD, and the cached
//! symbolic analysis of `SparseInverseSolver` against a fresh `sinv` call.
//!
//! ## Usage
//!
//! ```bash
//! cargo bench --bench sinv_benchmark
//! ```

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sparse_inverse::{
    CscMatrix, OrderingMethod, SinvConfig, SparseInverseSolver, init_logger, sinv_with_config,
};
use std::hint::black_box;
use tracing::info;

/// 5-point Laplacian on an `nx x ny` grid, shifted to be strictly diagonally dominant
fn grid_laplacian(nx: usize, ny: usize) -> CscMatrix {
    let idx = |x: usize, y: usize| y * nx + x;
    let mut triplets = Vec::with_capacity(5 * nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            triplets.push((idx(x, y), idx(x, y), 4.1));
            if x + 1 < nx {
                triplets.push((idx(x + 1, y), idx(x, y), -1.0));
                triplets.push((idx(x, y), idx(x + 1, y), -1.0));
            }
            if y + 1 < ny {
                triplets.push((idx(x, y + 1), idx(x, y), -1.0));
                triplets.push((idx(x, y), idx(x, y + 1), -1.0));
            }
        }
    }
    CscMatrix::from_triplets(nx * ny, nx * ny, &triplets).expect("valid grid triplets")
}

fn bench_orderings(c: &mut Criterion) {
    let mut group = c.benchmark_group("sinv_ordering");
    group.sample_size(20);

    for side in [16, 32, 64] {
        let a = grid_laplacian(side, side);
        for (name, ordering) in [
            ("natural", OrderingMethod::Natural),
            ("amd", OrderingMethod::Amd),
        ] {
            let config = SinvConfig::new().with_ordering(ordering);
            let nnz = sinv_with_config(&a, &config).expect("SPD grid").nnz();
            info!(
                "grid {}x{} ({}): nnz(A) = {}, nnz(Z) = {}",
                side,
                side,
                name,
                a.nnz(),
                nnz
            );

            group.bench_with_input(BenchmarkId::new(name, side * side), &a, |b, a| {
                b.iter(|| sinv_with_config(black_box(a), &config))
            });
        }
    }
    group.finish();
}

fn bench_cached_symbolic(c: &mut Criterion) {
    let a = grid_laplacian(48, 48);
    let config = SinvConfig::default();

    let mut group = c.benchmark_group("sinv_symbolic_reuse");
    group.bench_function("fresh", |b| {
        b.iter(|| sinv_with_config(black_box(&a), &config))
    });

    let mut solver = SparseInverseSolver::new(config.clone());
    group.bench_function("cached", |b| b.iter(|| solver.compute(black_box(&a))));
    group.finish();
}

fn criterion_benchmark(c: &mut Criterion) {
    init_logger();
    bench_orderings(c);
    bench_cached_symbolic(c);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
