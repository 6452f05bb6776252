use std::iter::repeat_with;

use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use ruppert::{Point, Settings, Triangulation};

const COUNTS: &[usize] = &[100, 1000, 10_000, 100_000];

fn bench(c: &mut Criterion) {
    let mut rng = StdRng::from_seed([0; 32]);

    let all_points: Vec<_> = repeat_with(|| rng.gen::<(f64, f64)>())
        .map(|(x, y)| Point::new(x, y))
        .take(*COUNTS.last().unwrap())
        .collect();

    let settings = Settings::default();
    let mut group = c.benchmark_group("triangulate");

    for &count in COUNTS {
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let points = all_points[..count].to_vec();
            b.iter(move || Triangulation::run(points.clone(), &[], &[], &[], &settings))
        });
    }

    group
        .sample_size(20)
        .plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
