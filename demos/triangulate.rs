use std::iter::repeat_with;

use ruppert::{Point, Settings, Triangulation};

const N: usize = 1_000_000;

fn main() {
    let positions: Vec<_> = repeat_with(rand::random)
        .map(|(x, y)| Point::new(x, y))
        .take(N)
        .collect();

    let settings = Settings::default();
    let now = std::time::Instant::now();
    let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
    let elapsed = now.elapsed();

    let triangulation = triangulation.expect("no triangulation exists for this input");
    println!(
        "Triangulated {} points in {}.{:03}s (status ok: {}).\nGenerated {} triangles. Convex hull size: {}",
        N,
        elapsed.as_secs(),
        elapsed.subsec_millis(),
        status.is_ok(),
        triangulation.len(),
        triangulation.hull.len()
    );
}
