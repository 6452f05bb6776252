//! End-to-end scenarios (§8) plus the universal invariants P1-P8, checked
//! directly against `Triangulation::run`'s output. The area-conservation
//! check (`validate`) is adapted from the teacher's own integration test.

use proptest::prelude::*;
use ruppert::{GeomKernel, Point, Settings, Status, Triangulation};

fn next(h: usize) -> usize {
    if h % 3 == 2 {
        h - 2
    } else {
        h + 1
    }
}

fn ccw_area2(a: Point<f64>, b: Point<f64>, c: Point<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// P1 (structure) + P2 (orientation): every halfedge twin is reciprocated
/// and every triangle is wound CCW.
fn assert_structure_and_orientation(t: &Triangulation<f64>) {
    for h in 0..t.halfedges.len() {
        if let Some(g) = t.halfedges[h].get() {
            assert_eq!(t.halfedges[g].get(), Some(h), "halfedge {} not reciprocated", h);
        }
    }
    for tri in 0..t.len() {
        let (a, b, c) = t.triangle_points(tri);
        assert!(ccw_area2(a, b, c) > 0.0, "triangle {} is not CCW", tri);
    }
}

/// P3/P4 (Delaunay / constrained Delaunay): no vertex lies strictly inside
/// the circumcircle of a triangle across a non-constrained edge.
fn assert_locally_delaunay(t: &Triangulation<f64>) {
    for h in 0..t.halfedges.len() {
        if t.constrained_halfedges[h] {
            continue;
        }
        if let Some(g) = t.halfedges[h].get() {
            let tri = h / 3;
            let (a, b, c) = t.triangle_points(tri);
            let opposite = t.triangles[next(g)];
            let p = t.positions[opposite];
            assert!(
                !f64::in_circle(a, b, c, p),
                "triangle {} is not locally Delaunay across halfedge {}",
                tri,
                h
            );
        }
    }
}

// Kahan-Babuska-Neumaier summation; accumulates less FP error than a plain
// fold, same as the teacher's own area-conservation check.
fn sum(x: &[f64]) -> f64 {
    let mut sum = x[0];
    let mut err = 0.0;
    for &k in x.iter().skip(1) {
        let m = sum + k;
        err += if sum.abs() >= k.abs() {
            sum - m + k
        } else {
            k - m + sum
        };
        sum = m;
    }
    sum + err
}

/// Checks that the triangles' total area matches the hull's area, the
/// teacher's own robustness check, still meaningful here for an
/// unconstrained, unrefined triangulation.
fn assert_area_conserved(t: &Triangulation<f64>) {
    let hull_area = {
        let mut areas = Vec::new();
        let mut j = t.hull.len() - 1;
        for i in 0..t.hull.len() {
            let p0 = t.positions[t.hull[j]];
            let p = t.positions[t.hull[i]];
            areas.push((p.x + p0.x) * (p.y - p0.y));
            j = i;
        }
        sum(&areas).abs() / 2.0
    };
    let triangles_area = {
        let mut areas = Vec::new();
        for tri in 0..t.len() {
            let (a, b, c) = t.triangle_points(tri);
            areas.push(ccw_area2(a, b, c).abs() / 2.0);
        }
        sum(&areas)
    };
    let err = ((hull_area - triangles_area) / hull_area).abs();
    assert!(
        err <= 1e-9,
        "triangulation area {} does not match hull area {}",
        triangles_area,
        hull_area
    );
}

#[test]
fn scenario_unit_square() {
    let positions = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let settings = Settings::default();
    let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
    assert!(status.is_ok());
    let triangulation = triangulation.unwrap();

    assert_eq!(triangulation.len(), 2);
    assert_eq!(triangulation.halfedges.len(), 6);
    let n_boundary = triangulation.halfedges.iter().filter(|h| h.is_none()).count();
    assert_eq!(n_boundary, 4);

    assert_structure_and_orientation(&triangulation);
    assert_locally_delaunay(&triangulation);
    assert_area_conserved(&triangulation);
}

#[test]
fn scenario_square_with_diagonal_constraint() {
    let positions = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let settings = Settings::default();
    let (status, triangulation) = Triangulation::run(positions, &[0, 2], &[], &[], &settings);
    assert!(status.is_ok());
    let triangulation = triangulation.unwrap();

    assert_eq!(triangulation.len(), 2);
    let has_constrained_diagonal = (0..triangulation.triangles.len()).any(|h| {
        let (a, b) = (triangulation.triangles[h], triangulation.triangles[next(h)]);
        triangulation.constrained_halfedges[h] && ((a, b) == (0, 2) || (a, b) == (2, 0))
    });
    assert!(has_constrained_diagonal);
}

#[test]
fn scenario_square_with_hole() {
    let positions = vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
        Point::new(1.0, 1.0),
        Point::new(3.0, 1.0),
        Point::new(3.0, 3.0),
        Point::new(1.0, 3.0),
    ];
    let constraint_edges = [0, 1, 1, 2, 2, 3, 3, 0, 4, 5, 5, 6, 6, 7, 7, 4];
    let mut settings = Settings::default();
    settings.restore_boundary = true;
    let (status, triangulation) = Triangulation::run(
        positions,
        &constraint_edges,
        &[Point::new(2.0, 2.0)],
        &[],
        &settings,
    );
    assert!(status.is_ok());
    let triangulation = triangulation.unwrap();

    for t in 0..triangulation.len() {
        let (a, b, c) = triangulation.triangle_points(t);
        assert!(!f64::point_in_triangle(Point::new(2.0, 2.0), a, b, c));
    }
}

#[test]
fn scenario_collinear_rejection() {
    let positions = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
    let settings = Settings::default();
    let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
    assert!(status.contains(Status::ERR_DELAUNAY_DUPLICATES_OR_COLLINEAR));
    assert!(triangulation.is_none());
}

#[test]
fn scenario_refine_thin_triangle() {
    let positions = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 0.1)];
    let mut settings = Settings::default();
    settings.refine_mesh = true;
    settings.refinement_threshold_angle = std::f64::consts::PI / 9.0;
    settings.refinement_threshold_area = 1.0;

    let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
    assert!(status.is_ok());
    let triangulation = triangulation.unwrap();

    assert!(triangulation.positions.len() > 3, "expected Steiner points to be added");

    for t in 0..triangulation.len() {
        let (a, b, c) = triangulation.triangle_points(t);
        let area2 = ccw_area2(a, b, c).abs();
        assert!(area2 / 2.0 <= 0.5 + 1e-9, "triangle {} area too large", t);

        let angle_at = |p: Point<f64>, q: Point<f64>, r: Point<f64>| -> f64 {
            let v0 = (q.x - p.x, q.y - p.y);
            let v1 = (r.x - p.x, r.y - p.y);
            let dot = v0.0 * v1.0 + v0.1 * v1.1;
            let len = ((v0.0 * v0.0 + v0.1 * v0.1) * (v1.0 * v1.0 + v1.1 * v1.1)).sqrt();
            (dot / len).clamp(-1.0, 1.0).acos()
        };
        let min_angle = angle_at(a, b, c).min(angle_at(b, c, a)).min(angle_at(c, a, b));
        assert!(
            min_angle >= std::f64::consts::PI / 9.0 - 1e-6,
            "triangle {} has too small an angle: {}",
            t,
            min_angle
        );
    }
}

#[test]
fn scenario_auto_holes() {
    let positions = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
        Point::new(4.0, 4.0),
        Point::new(6.0, 4.0),
        Point::new(6.0, 6.0),
        Point::new(4.0, 6.0),
    ];
    let constraint_edges = [0, 1, 1, 2, 2, 3, 3, 0, 4, 5, 5, 6, 6, 7, 7, 4];
    let mut settings = Settings::default();
    settings.auto_holes_and_boundary = true;
    let (status, triangulation) =
        Triangulation::run(positions, &constraint_edges, &[], &[], &settings);
    assert!(status.is_ok());
    let triangulation = triangulation.unwrap();

    for t in 0..triangulation.len() {
        let (a, b, c) = triangulation.triangle_points(t);
        assert!(!f64::point_in_triangle(Point::new(5.0, 5.0), a, b, c));
    }
}

#[test]
fn p7_and_p8_hold_after_refine_on_constrained_mesh() {
    let positions = vec![
        Point::new(0.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(20.0, 20.0),
        Point::new(0.0, 20.0),
    ];
    let constraint_edges = [0, 1, 1, 2, 2, 3, 3, 0];
    let mut settings = Settings::default();
    settings.refine_mesh = true;
    settings.refinement_threshold_angle = std::f64::consts::PI / 6.0;
    settings.refinement_threshold_area = 40.0;

    let (status, triangulation) =
        Triangulation::run(positions, &constraint_edges, &[], &[], &settings);
    assert!(status.is_ok());
    let triangulation = triangulation.unwrap();

    assert_structure_and_orientation(&triangulation);

    // P8: no constrained halfedge is encroached by either incident apex.
    for h in 0..triangulation.halfedges.len() {
        if !triangulation.constrained_halfedges[h] {
            continue;
        }
        let u = triangulation.triangles[h];
        let v = triangulation.triangles[next(h)];
        let pu = triangulation.positions[u];
        let pv = triangulation.positions[v];
        let apex = triangulation.triangles[next(next(h))];
        let pa = triangulation.positions[apex];
        let dot = (pu.x - pa.x) * (pv.x - pa.x) + (pu.y - pa.y) * (pv.y - pa.y);
        assert!(dot > 0.0, "constrained halfedge {} is encroached", h);
    }
}

proptest! {
    /// P9 (idempotence): re-running the pipeline on its own output, with
    /// validation and refinement off, adds nothing further.
    #[test]
    fn p9_idempotent_on_its_own_output(
        xs in prop::collection::vec(-50.0f64..50.0, 4..12),
        ys in prop::collection::vec(-50.0f64..50.0, 4..12),
    ) {
        let n = xs.len().min(ys.len());
        let positions: Vec<_> = (0..n).map(|i| Point::new(xs[i], ys[i])).collect();
        let settings = Settings::default();
        let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
        prop_assume!(status.is_ok());
        let first = triangulation.unwrap();

        let mut rerun_settings = Settings::default();
        rerun_settings.validate_input = false;
        let (status2, triangulation2) =
            Triangulation::run(first.positions.clone(), &[], &[], &[], &rerun_settings);
        prop_assert!(status2.is_ok());
        let second = triangulation2.unwrap();

        prop_assert_eq!(first.len(), second.len());
        prop_assert_eq!(first.positions.len(), second.positions.len());
    }

    /// P10 (determinism): with integer coordinates, repeated runs over the
    /// same input produce byte-identical output arrays.
    #[test]
    fn p10_integer_determinism(
        xs in prop::collection::vec(-1000i32..1000, 4..12),
        ys in prop::collection::vec(-1000i32..1000, 4..12),
    ) {
        let n = xs.len().min(ys.len());
        let positions: Vec<_> = (0..n).map(|i| Point::new(xs[i], ys[i])).collect();
        let settings = Settings::default();

        let (status1, t1) = Triangulation::run(positions.clone(), &[], &[], &[], &settings);
        let (status2, t2) = Triangulation::run(positions, &[], &[], &[], &settings);
        prop_assume!(status1.is_ok() && status2.is_ok());
        let t1 = t1.unwrap();
        let t2 = t2.unwrap();

        prop_assert_eq!(t1.triangles, t2.triangles);
        prop_assert_eq!(
            t1.halfedges.iter().map(|h| h.get()).collect::<Vec<_>>(),
            t2.halfedges.iter().map(|h| h.get()).collect::<Vec<_>>()
        );
        prop_assert_eq!(t1.constrained_halfedges, t2.constrained_halfedges);
    }
}
