#![allow(clippy::many_single_char_names)]

/*!
Constrained Delaunay triangulation with hole/boundary planting and Ruppert
refinement, over a generic coordinate [`scalar::Scalar`].

The pipeline (§2 of the design): validate input, build the Delaunay
triangulation via sweep-hull (a port of
[Delaunator](https://github.com/mapbox/delaunator)), force constraint edges
into the mesh (Sloan 1993), plant seeds to carve out holes/restore the outer
boundary, then optionally refine to Ruppert's quality bounds.

# Example

```rust
use ruppert::{Point, Settings, Triangulation};

let positions = vec![
    Point::new(0.0, 0.0),
    Point::new(1.0, 0.0),
    Point::new(1.0, 1.0),
    Point::new(0.0, 1.0),
];

let settings = Settings::<f64>::default();
let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
assert!(status.is_ok());
println!("{:?}", triangulation.unwrap().triangles);
```
*/

pub mod constraints;
pub mod delaunay;
pub mod elem;
pub mod geom;
mod hull;
pub mod iter;
pub mod mesh;
pub mod point;
pub mod refine;
pub mod scalar;
pub mod seed;
pub mod settings;
pub mod status;
pub mod util;
pub mod validate;

#[cfg(feature = "mint")]
mod mint;
#[cfg(feature = "serde")]
mod serde_impl;

pub use elem::{HalfEdge, Triangle, Vertex};
pub use geom::{Circle, GeomKernel, Orientation};
pub use mesh::Triangulation;
pub use point::Point;
pub use scalar::Scalar;
pub use settings::{Preprocessor, Settings};
pub use status::{Error, Status};

impl<T: GeomKernel> Triangulation<T> {
    /// Runs the full pipeline (§2's data-flow: InputValidator ->
    /// DelaunayBuilder -> ConstraintApplier -> SeedPlanter -> Refiner) and
    /// reports the additive-vs-fatal status word of §7.
    ///
    /// Validation errors never stop later stages from being attempted
    /// (they're collected additively into the returned `Status`). A failure
    /// to build the initial Delaunay triangulation is fatal: no
    /// triangulation is returned. A `ConstraintApplier`/`Refiner` failure
    /// (Sloan non-convergence, refinement unsupported for `T`) is also
    /// fatal, but the triangulation as of the failing stage is still
    /// returned so the caller can inspect how far the pipeline got.
    pub fn run(
        positions: Vec<Point<T>>,
        constraint_edges: &[usize],
        hole_seeds: &[Point<T>],
        ignore_constraint_for_planting: &[bool],
        settings: &Settings<T>,
    ) -> (Status, Option<Self>) {
        let mut status = Status::empty();

        if settings.validate_input {
            let (validation_status, _errors) = validate::validate_input(
                &positions,
                constraint_edges,
                hole_seeds,
                ignore_constraint_for_planting,
                settings,
            );
            status |= validation_status;
        }

        let mut triangulation = match Triangulation::build_delaunay(positions) {
            Ok(t) => t,
            Err(e) => {
                if settings.verbose {
                    log::error!("{}", e);
                }
                status.push(&e);
                return (status, None);
            }
        };

        let pairs: Vec<(usize, usize)> = constraint_edges
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        if !pairs.is_empty() {
            if let Err(e) =
                triangulation.apply_constraints(&pairs, ignore_constraint_for_planting, settings)
            {
                if settings.verbose {
                    log::error!("{}", e);
                }
                status.push(&e);
                status |= triangulation.status;
                return (status, Some(triangulation));
            }
        }
        if triangulation.status.is_cancelled() {
            status |= triangulation.status;
            return (status, Some(triangulation));
        }

        if !hole_seeds.is_empty() || settings.restore_boundary || settings.auto_holes_and_boundary
        {
            triangulation.plant_seeds(hole_seeds, settings);
        }
        if triangulation.status.is_cancelled() {
            status |= triangulation.status;
            return (status, Some(triangulation));
        }

        if settings.refine_mesh {
            if let Err(e) = triangulation.refine(settings) {
                if settings.verbose {
                    log::error!("{}", e);
                }
                status.push(&e);
                status |= triangulation.status;
                return (status, Some(triangulation));
            }
        }

        status |= triangulation.status;
        (status, Some(triangulation))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_run_unit_square() {
        let positions = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let settings = Settings::default();
        let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
        assert!(status.is_ok());
        let triangulation = triangulation.unwrap();
        assert_eq!(triangulation.len(), 2);
    }

    #[test]
    fn test_run_collinear_is_fatal() {
        let positions = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let settings = Settings::default();
        let (status, triangulation) = Triangulation::run(positions, &[], &[], &[], &settings);
        assert!(!status.is_ok());
        assert!(status.contains(Status::ERR_DELAUNAY_DUPLICATES_OR_COLLINEAR));
        assert!(triangulation.is_none());
    }

    #[test]
    fn test_run_hole_and_boundary() {
        let positions = vec![
            Point::new(0.0_f64, 0.0),
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
}
