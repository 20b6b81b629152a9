use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use visage_cloud::normals::{estimate_normals, NormalEstimationParams};

fn random_cloud(num_points: usize) -> Vec<[f64; 3]> {
    (0..num_points)
        .map(|_| {
            [
                rand::random::<f64>() * 0.2 - 0.1,
                rand::random::<f64>() * 0.2 - 0.1,
                rand::random::<f64>() * 0.1 + 0.25,
            ]
        })
        .collect()
}

fn bench_estimate_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_normals");
    let viewpoint = [0.0, 0.0, 0.0];
    let params = NormalEstimationParams::default();

    for num_points in [1_000, 10_000].iter() {
        let points = random_cloud(*num_points);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            &points,
            |b, points| {
                b.iter(|| {
                    let normals =
                        estimate_normals(black_box(points), black_box(&viewpoint), &params);
                    black_box(normals)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_estimate_normals);
criterion_main!(benches);
