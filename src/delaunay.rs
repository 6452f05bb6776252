//! DelaunayBuilder: the sweep-hull construction of the initial Delaunay
//! triangulation (Mapbox "Delaunator" lineage). Grounded in the teacher's
//! `triangulation.rs`/`hull.rs`, with the seed-triangle selection
//! reconstructed from `jeroentervoorde/delaunator-rs`'s self-contained
//! `find_seed_triangle` (the teacher's own retrieved `util.rs` was missing
//! this routine).

use log::debug;

use crate::geom::GeomKernel;
use crate::hull::Hull;
use crate::mesh::Triangulation;
use crate::point::Point;
use crate::status::Error;
use crate::util::{next_halfedge, prev_halfedge, OptionIndex};

/// Finds `(i0, i1, i2)`: `i0` nearest the bounding-box centroid, `i1`
/// nearest `i0`, and `i2` minimizing the circumradius of `(p0, p1, p2)`
/// among all candidates, oriented CCW. Returns `None` if no finite seed
/// triangle exists (all points duplicate or collinear).
fn find_seed_triangle<T: GeomKernel>(points: &[Point<T>]) -> Option<(usize, usize, usize)> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in points {
        let (x, y) = p.to_f64();
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let centroid = Point::new(
        T::from_f64((min_x + max_x) / 2.0),
        T::from_f64((min_y + max_y) / 2.0),
    );

    let mut i0 = 0;
    let mut min_dist = f64::MAX;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance_squared(centroid).to_f64();
        if d < min_dist {
            i0 = i;
            min_dist = d;
        }
    }
    let p0 = points[i0];

    let mut i1 = 0;
    let mut min_dist = f64::MAX;
    for (i, p) in points.iter().enumerate() {
        if i == i0 {
            continue;
        }
        let d = p.distance_squared(p0).to_f64();
        if d < min_dist && d > 0.0 {
            i1 = i;
            min_dist = d;
        }
    }
    if min_dist == f64::MAX {
        return None;
    }
    let p1 = points[i1];

    let mut i2 = 0;
    let mut min_radius = f64::MAX;
    for (i, p) in points.iter().enumerate() {
        if i == i0 || i == i1 {
            continue;
        }
        let r = T::circumradius_sq(p0, p1, *p).to_f64();
        if r.is_finite() && r < min_radius {
            i2 = i;
            min_radius = r;
        }
    }
    if min_radius == f64::MAX {
        return None;
    }
    let p2 = points[i2];

    if T::orient2d(p0, p1, p2).is_cw() {
        Some((i0, i2, i1))
    } else {
        Some((i0, i1, i2))
    }
}

impl<T: GeomKernel> Triangulation<T> {
    /// Builds the initial Delaunay triangulation of `positions` (§4.3).
    /// After this call I1-I5 hold and I6 holds everywhere, since no
    /// constraints exist yet.
    pub fn build_delaunay(positions: Vec<Point<T>>) -> Result<Self, Error> {
        let n = positions.len();
        let (i0, i1, i2) = find_seed_triangle(&positions)
            .ok_or(Error::DelaunayDuplicatesOrCollinear)?;

        let p0 = positions[i0];
        let p1 = positions[i1];
        let p2 = positions[i2];
        let center = T::circumcenter(p0, p1, p2);
        if !center.is_finite() {
            return Err(Error::DelaunayDuplicatesOrCollinear);
        }

        let mut triangulation = Triangulation::alloc(positions);
        triangulation.add_triangle(
            i0,
            i1,
            i2,
            OptionIndex::none(),
            OptionIndex::none(),
            OptionIndex::none(),
        );

        let points = &triangulation.positions;
        let mut dists: Vec<(usize, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, &p)| (i, p.distance_squared(center).to_f64()))
            .collect();
        dists.sort_unstable_by(|&(_, da), &(_, db)| da.partial_cmp(&db).unwrap());

        let mut hull = Hull::new(n, center, i0, i1, i2, points);

        for k in 0..dists.len() {
            let i = dists[k].0;
            let p = triangulation.positions[i];

            if k > 0 && p.nearly_equals(triangulation.positions[dists[k - 1].0]) {
                continue;
            }
            if i == i0 || i == i1 || i == i2 {
                continue;
            }

            let (e_opt, walk_back) = hull.find_visible_edge(p, &triangulation.positions);
            let mut e = match e_opt.get() {
                None => continue,
                Some(e) => e,
            };

            let t = triangulation.add_triangle(
                e,
                i,
                hull.next[e],
                OptionIndex::none(),
                OptionIndex::none(),
                hull.tri[e].into(),
            );

            hull.tri[i] = triangulation.legalize(t + 2, &mut hull);
            hull.tri[e] = t;

            let mut n_ = hull.next[e];
            loop {
                let q = hull.next[n_];
                if !T::orient2d(p, triangulation.positions[n_], triangulation.positions[q]).is_cw()
                {
                    break;
                }
                let t = triangulation.add_triangle(
                    n_,
                    i,
                    q,
                    hull.tri[i].into(),
                    OptionIndex::none(),
                    hull.tri[n_].into(),
                );
                hull.tri[i] = triangulation.legalize(t + 2, &mut hull);
                hull.next[n_] = usize::MAX; // mark removed from the hull
                n_ = q;
            }

            if walk_back {
                loop {
                    let q = hull.prev[e];
                    if !T::orient2d(p, triangulation.positions[q], triangulation.positions[e])
                        .is_cw()
                    {
                        break;
                    }
                    let t = triangulation.add_triangle(
                        q,
                        i,
                        e,
                        OptionIndex::none(),
                        hull.tri[e].into(),
                        hull.tri[q].into(),
                    );
                    triangulation.legalize(t + 2, &mut hull);
                    hull.tri[q] = t;
                    hull.next[e] = usize::MAX;
                    e = q;
                }
            }

            hull.prev[i] = e;
            hull.next[i] = n_;
            hull.prev[n_] = i;
            hull.next[e] = i;
            hull.start = e;

            hull.hash_edge(p, i);
            hull.hash_edge(triangulation.positions[e], e);
        }

        let mut e = hull.start;
        loop {
            triangulation.hull.push(e);
            e = hull.next[e];
            if e == hull.start {
                break;
            }
        }

        triangulation.triangles.shrink_to_fit();
        triangulation.halfedges.shrink_to_fit();
        triangulation.constrained_halfedges.shrink_to_fit();
        triangulation.ignored_halfedges_for_planting.shrink_to_fit();
        triangulation.circles.shrink_to_fit();

        debug!(
            "delaunay: {} points, {} triangles",
            n,
            triangulation.len()
        );

        Ok(triangulation)
    }

    /// Recursively flips `a`'s opposite edge while the Delaunay condition
    /// is violated, using an explicit call stack (recursion mirrors the
    /// teacher's `legalize`, bounded in practice by the local cavity size).
    fn legalize(&mut self, a: usize, hull: &mut Hull<T>) -> usize {
        let b = self.halfedges[a];

        let ar = prev_halfedge(a);

        let b = match b.get() {
            None => return ar,
            Some(b) => b,
        };

        let al = next_halfedge(a);
        let bl = prev_halfedge(b);

        let p0 = self.triangles[ar];
        let pr = self.triangles[a];
        let pl = self.triangles[al];
        let p1 = self.triangles[bl];

        let illegal = T::in_circle(
            self.positions[p0],
            self.positions[pr],
            self.positions[pl],
            self.positions[p1],
        );

        if illegal {
            self.triangles[a] = p1;
            self.triangles[b] = p0;

            let hbl = self.halfedges[bl];
            let har = self.halfedges[ar];

            if hbl.is_none() {
                hull.swap_halfedge(bl, a);
            }

            self.link(a, hbl);
            self.link(b, har);
            self.link(ar, bl.into());

            self.update_circle(a / 3);
            self.update_circle(b / 3);

            let br = next_halfedge(b);

            self.legalize(a, hull);
            return self.legalize(br, hull);
        }
        ar
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unit_square() {
        let points = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let triangulation = Triangulation::build_delaunay(points).unwrap();
        assert_eq!(triangulation.len(), 2);
        let n_boundary = triangulation
            .halfedges
            .iter()
            .filter(|h| h.is_none())
            .count();
        assert_eq!(n_boundary, 4);
    }

    #[test]
    fn test_collinear_rejected() {
        let points = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let result = Triangulation::build_delaunay(points);
        assert!(matches!(result, Err(Error::DelaunayDuplicatesOrCollinear)));
    }

    #[test]
    fn test_five_point_star() {
        let points = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
            Point::new(0.0, -1.0),
        ];
        let triangulation = Triangulation::build_delaunay(points).unwrap();
        assert_eq!(triangulation.len(), 4);
    }
}
