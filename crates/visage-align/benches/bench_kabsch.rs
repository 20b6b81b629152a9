use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use visage_align::fit_rigid_transform;
use visage_cloud::linalg::transform_points;
use visage_cloud::transforms::{axis_angle_to_rotation_matrix, RigidTransform};

fn random_points(num_points: usize) -> Vec<[f64; 3]> {
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

fn bench_fit_rigid_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_rigid_transform");

    let rotation = axis_angle_to_rotation_matrix(&[0.2, 1.0, -0.3], 0.35)
        .expect("valid rotation axis");
    let transform = RigidTransform::new(rotation, [0.05, -0.02, 0.1]);

    for num_points in [6usize, 100, 1_000].iter() {
        let points_in_src = random_points(*num_points);
        let mut points_in_ref = vec![[0.0; 3]; *num_points];
        transform_points(
            &points_in_src,
            &transform.rotation,
            &transform.translation,
            &mut points_in_ref,
        );

        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            &(points_in_src, points_in_ref),
            |b, (src, dst)| {
                b.iter(|| {
                    let result = fit_rigid_transform(black_box(src), black_box(dst));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fit_rigid_transform);
criterion_main!(benches);
