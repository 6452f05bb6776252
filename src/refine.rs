//! Refiner: Ruppert's algorithm (§4.6) — split encroached constrained
//! edges, then insert circumcenters of bad triangles, deferring to further
//! edge splits whenever a circumcenter would itself encroach a constrained
//! edge. Grounded in the teacher's `DelaunayBuilder` legalize/flip pattern
//! for the post-insertion Lawson pass, and in `gitnlsn/nlsn-delaunay-refine`
//! for the encroachment/quality tests and the star-polygon cavity shape.
//!
//! Point insertion here always goes through a single Bowyer-Watson-style
//! cavity (§4.6's "star-polygon" for an interior point, its boundary-edge
//! variant the "amphitheater" for a point on a constrained edge): collect
//! every triangle whose circumcircle contains the new point, reachable by
//! crossing only non-constrained edges from a known seed triangle, remove
//! them as one batch, then fan-triangulate the cavity from the new vertex.

use std::collections::HashMap;

use log::debug;

use crate::geom::GeomKernel;
use crate::mesh::Triangulation;
use crate::point::Point;
use crate::settings::Settings;
use crate::status::{Error, Status};
use crate::util::{next_halfedge, prev_halfedge, OptionIndex};

/// One boundary edge of a cavity, in walk order: `tail -> head` is the
/// surviving outer edge, `old_opposite` its old twin id (if any) before the
/// cavity's triangles were removed.
type CavityEdge = (usize, usize, Option<usize>, bool, bool);

impl<T: GeomKernel> Triangulation<T> {
    /// Runs the Refiner (§4.6) to convergence, or until `settings`'s
    /// cancellation flag is observed.
    pub fn refine(&mut self, settings: &Settings<T>) -> Result<(), Error> {
        if !T::supports_refinement() {
            return Err(Error::RefinementUnsupported);
        }

        for h in 0..self.halfedges.len() {
            if self.halfedges[h].is_none() {
                self.constrained_halfedges[h] = true;
            }
        }

        let mut edge_queue: Vec<usize> = (0..self.halfedges.len())
            .filter(|&h| self.constrained_halfedges[h] && self.is_encroached(h))
            .collect();
        self.drain_edge_queue(&mut edge_queue, settings)?;

        let mut triangle_queue: Vec<usize> = (0..self.len())
            .filter(|&t| self.is_bad_triangle(t, settings))
            .collect();

        while let Some(t) = triangle_queue.pop() {
            if settings.is_cancelled() {
                self.status |= Status::CANCELLED;
                return Ok(());
            }
            if t >= self.len() || !self.is_bad_triangle(t, settings) {
                continue;
            }

            let (a, b, c) = self.triangle_points(t);
            let center = T::circumcenter(a, b, c);
            if !center.is_finite() {
                continue;
            }

            let (in_cavity, boundary) = self.compute_cavity(center, t);
            let encroached: Vec<usize> = boundary
                .iter()
                .filter(|&&(tail, head, _, constrained, _)| {
                    constrained && self.segment_encroached_by(tail, head, center)
                })
                .filter_map(|&(tail, head, _, _, _)| self.find_existing_edge(tail, head))
                .collect();

            if !encroached.is_empty() {
                for h in encroached {
                    if !edge_queue.contains(&h) {
                        edge_queue.push(h);
                    }
                }
                self.drain_edge_queue(&mut edge_queue, settings)?;
                triangle_queue = (0..self.len())
                    .filter(|&t| self.is_bad_triangle(t, settings))
                    .collect();
                continue;
            }

            self.commit_cavity(in_cavity, boundary, center, true);
            triangle_queue = (0..self.len())
                .filter(|&t| self.is_bad_triangle(t, settings))
                .collect();
        }

        debug!("refine: {} triangles after refinement", self.len());
        Ok(())
    }

    fn drain_edge_queue(
        &mut self,
        queue: &mut Vec<usize>,
        settings: &Settings<T>,
    ) -> Result<(), Error> {
        while let Some(h) = queue.pop() {
            if settings.is_cancelled() {
                self.status |= Status::CANCELLED;
                return Ok(());
            }
            if h >= self.halfedges.len() || !self.constrained_halfedges[h] || !self.is_encroached(h)
            {
                continue;
            }
            self.split_constrained_edge(h, settings, queue);
        }
        Ok(())
    }

    fn split_constrained_edge(&mut self, h: usize, settings: &Settings<T>, queue: &mut Vec<usize>) {
        let (u, v) = self.edge_endpoints(h);
        let ignored = self.ignored_halfedges_for_planting[h];
        let p = self.compute_split_point(u, v, settings);

        // `h`'s edge sits on the boundary of both its incident triangles;
        // both must be removed together so the split vertex's two new
        // triangles (one per side) meet along `(u, new_vertex)` and
        // `(new_vertex, v)` instead of leaving the old full edge in place.
        let mut seeds = vec![h / 3];
        if let Some(g) = self.halfedges[h].get() {
            seeds.push(g / 3);
        }
        let (in_cavity, boundary) = self.compute_cavity_multi(p, &seeds);
        // If `h` had no twin, it still appears in `boundary` as an
        // "external" edge of its single incident triangle (nothing merged
        // it away). Rotate it to the end and drop it, turning the cyclic
        // chain into the open chain `v, ..., u` that should fan out to the
        // two new sub-segments instead of re-closing across the old edge.
        let (boundary, closed) = match boundary
            .iter()
            .position(|&(tail, head, _, _, _)| (tail == u && head == v) || (tail == v && head == u))
        {
            Some(pos) => {
                let mut boundary = boundary;
                boundary.rotate_left(pos + 1);
                boundary.pop();
                (boundary, false)
            }
            None => (boundary, true),
        };
        let new_vertex = self.commit_cavity(in_cavity, boundary, p, closed);

        if let Some(h1) = self.find_existing_edge(u, new_vertex) {
            self.mark_constrained_pair(h1, ignored);
        }
        if let Some(h2) = self.find_existing_edge(new_vertex, v) {
            self.mark_constrained_pair(h2, ignored);
        }

        for t in 0..self.len() {
            for s in 0..3 {
                let he = t * 3 + s;
                if self.constrained_halfedges[he] && self.is_encroached(he) && !queue.contains(&he)
                {
                    queue.push(he);
                }
            }
        }
    }

    fn mark_constrained_pair(&mut self, h: usize, ignored: bool) {
        self.constrained_halfedges[h] = true;
        self.ignored_halfedges_for_planting[h] = ignored;
        if let Some(g) = self.halfedges[h].get() {
            self.constrained_halfedges[g] = true;
            self.ignored_halfedges_for_planting[g] = ignored;
        }
    }

    /// Midpoint if both endpoints are the same "kind" (both input vertices
    /// or both Steiner); otherwise the concentric-shells point (§4.6) at
    /// `α = shells_parameter / d * 2^round(log2(d / (2*shells_parameter)))`
    /// from whichever endpoint is an input vertex.
    fn compute_split_point(&self, u: usize, v: usize, settings: &Settings<T>) -> Point<T> {
        let pu = self.positions[u];
        let pv = self.positions[v];
        let u_is_input = u < self.initial_points_count;
        let v_is_input = v < self.initial_points_count;

        if u_is_input == v_is_input {
            let (ux, uy) = pu.to_f64();
            let (vx, vy) = pv.to_f64();
            return Point::new(T::from_f64((ux + vx) / 2.0), T::from_f64((uy + vy) / 2.0));
        }

        let (input, other) = if u_is_input { (pu, pv) } else { (pv, pu) };
        let d = input.distance_squared(other).to_f64().sqrt();
        let shell = settings.concentric_shells_parameter.to_f64();

        if d <= 0.0 || shell <= 0.0 || !d.is_finite() {
            return Point::new(T::infinity(), T::infinity());
        }

        let k = (d / (2.0 * shell)).log2().round();
        let alpha = (shell / d * 2f64.powf(k)).clamp(0.0, 1.0);

        let (ix, iy) = input.to_f64();
        let (ox, oy) = other.to_f64();
        Point::new(
            T::from_f64(ix + alpha * (ox - ix)),
            T::from_f64(iy + alpha * (oy - iy)),
        )
    }

    fn segment_encroached_by(&self, u: usize, v: usize, p: Point<T>) -> bool {
        let (ux, uy) = self.positions[u].to_f64();
        let (vx, vy) = self.positions[v].to_f64();
        let (px, py) = p.to_f64();
        let d0 = (ux - px, uy - py);
        let d1 = (vx - px, vy - py);
        d0.0 * d1.0 + d0.1 * d1.1 <= 0.0
    }

    fn is_encroached(&self, h: usize) -> bool {
        if !self.constrained_halfedges[h] {
            return false;
        }
        let (u, v) = self.edge_endpoints(h);
        let apex = self.triangles[prev_halfedge(h)];
        if self.segment_encroached_by(u, v, self.positions[apex]) {
            return true;
        }
        if let Some(g) = self.halfedges[h].get() {
            let apex = self.triangles[prev_halfedge(g)];
            if self.segment_encroached_by(u, v, self.positions[apex]) {
                return true;
            }
        }
        false
    }

    fn is_bad_triangle(&self, t: usize, settings: &Settings<T>) -> bool {
        let (a, b, c) = self.triangle_points(t);
        let (ax, ay) = a.to_f64();
        let (bx, by) = b.to_f64();
        let (cx, cy) = c.to_f64();

        let area2 = ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).abs();
        if area2 > settings.refinement_threshold_area.to_f64() {
            return true;
        }

        let angle_at = |p: (f64, f64), q: (f64, f64), r: (f64, f64)| -> f64 {
            let v0 = (q.0 - p.0, q.1 - p.1);
            let v1 = (r.0 - p.0, r.1 - p.1);
            let dot = v0.0 * v1.0 + v0.1 * v1.1;
            let len = ((v0.0 * v0.0 + v0.1 * v0.1) * (v1.0 * v1.0 + v1.1 * v1.1)).sqrt();
            if len == 0.0 {
                return 0.0;
            }
            (dot / len).clamp(-1.0, 1.0).acos()
        };
        let min_angle = angle_at((ax, ay), (bx, by), (cx, cy))
            .min(angle_at((bx, by), (cx, cy), (ax, ay)))
            .min(angle_at((cx, cy), (ax, ay), (bx, by)));

        min_angle < settings.refinement_threshold_angle.to_f64()
    }

    /// Grows a Bowyer-Watson cavity from `seed` (which must contain or be
    /// adjacent to `p`): every triangle whose circumcircle contains `p`,
    /// reachable without crossing a constrained edge. Returns the
    /// membership mask and the cavity's boundary, walked into a single
    /// cyclic order starting from an arbitrary boundary edge.
    fn compute_cavity(&self, p: Point<T>, seed: usize) -> (Vec<bool>, Vec<CavityEdge>) {
        self.compute_cavity_multi(p, &[seed])
    }

    /// As [`Self::compute_cavity`], but grown from several seed triangles at
    /// once so a constrained edge's two incident triangles can be removed
    /// and re-fanned as a single cavity (the new vertex lies exactly on
    /// their shared edge, so splitting them independently would leave a
    /// degenerate triangle straddling it).
    fn compute_cavity_multi(&self, p: Point<T>, seeds: &[usize]) -> (Vec<bool>, Vec<CavityEdge>) {
        let n = self.len();
        let mut in_cavity = vec![false; n];
        let mut stack = Vec::new();
        for &seed in seeds {
            if !in_cavity[seed] {
                in_cavity[seed] = true;
                stack.push(seed);
            }
        }
        while let Some(t) = stack.pop() {
            for s in 0..3 {
                let h = t * 3 + s;
                if self.constrained_halfedges[h] {
                    continue;
                }
                if let Some(g) = self.halfedges[h].get() {
                    let nt = g / 3;
                    if in_cavity[nt] {
                        continue;
                    }
                    let (a, b, c) = self.triangle_points(nt);
                    if T::in_circle(a, b, c, p) {
                        in_cavity[nt] = true;
                        stack.push(nt);
                    }
                }
            }
        }

        let mut boundary = Vec::new();
        for t in 0..n {
            if !in_cavity[t] {
                continue;
            }
            for s in 0..3 {
                let h = t * 3 + s;
                let external = match self.halfedges[h].get() {
                    None => true,
                    Some(g) => !in_cavity[g / 3],
                };
                if external {
                    let (tail, head) = self.edge_endpoints(h);
                    boundary.push((
                        tail,
                        head,
                        self.halfedges[h].get(),
                        self.constrained_halfedges[h],
                        self.ignored_halfedges_for_planting[h],
                    ));
                }
            }
        }

        let mut by_tail: HashMap<usize, usize> = HashMap::new();
        for (i, e) in boundary.iter().enumerate() {
            by_tail.insert(e.0, i);
        }
        let mut ordered = Vec::with_capacity(boundary.len());
        let mut current = 0usize;
        for _ in 0..boundary.len() {
            ordered.push(boundary[current]);
            let head = boundary[current].1;
            current = by_tail[&head];
        }

        (in_cavity, ordered)
    }

    /// Removes the cavity's triangles, adds `p` as a new Steiner vertex,
    /// and fans new triangles from `p` to each retained boundary edge,
    /// legalizing the outer edge of each new triangle against the
    /// unchanged exterior. Returns the new vertex's id. `closed` is false
    /// only for a one-sided constrained-edge split, where the boundary
    /// chain is a path (`v, ..., u`), not a loop, and its two ends become
    /// new unlinked (mesh-boundary) edges meeting at `p` rather than
    /// wrapping around to each other.
    fn commit_cavity(
        &mut self,
        in_cavity: Vec<bool>,
        boundary: Vec<CavityEdge>,
        p: Point<T>,
        closed: bool,
    ) -> usize {
        let remap = self.remove_triangles(&in_cavity);

        let new_vertex = self.positions.len();
        self.positions.push(p);

        let m = boundary.len();
        let mut base = Vec::with_capacity(m);
        for &(tail, head, _, constrained, ignored) in &boundary {
            let t = self.add_triangle(
                tail,
                new_vertex,
                head,
                OptionIndex::none(),
                OptionIndex::none(),
                OptionIndex::none(),
            );
            // Slot t+2 (head -> tail) is the retained outer edge.
            self.constrained_halfedges[t + 2] = constrained;
            self.ignored_halfedges_for_planting[t + 2] = ignored;
            base.push(t);
        }

        for (i, &(_, _, old_opposite, _, _)) in boundary.iter().enumerate() {
            if let Some(old_g) = old_opposite {
                if let Some(new_g) = remap[old_g].get() {
                    self.link(base[i] + 2, new_g.into());
                }
            }
        }

        let fan_links = if closed { m } else { m.saturating_sub(1) };
        for i in 0..fan_links {
            let j = (i + 1) % m;
            self.link(base[i] + 1, (base[j]).into());
        }

        for &b in &base {
            self.legalize_non_constrained(b + 2);
        }

        new_vertex
    }

    fn legalize_non_constrained(&mut self, h: usize) {
        if self.constrained_halfedges[h] {
            return;
        }
        let g = match self.halfedges[h].get() {
            Some(g) => g,
            None => return,
        };
        let (oa, ob) = self.edge_endpoints(h);
        let op = self.triangles[prev_halfedge(h)];
        let gp = self.triangles[prev_halfedge(g)];

        let illegal = T::in_circle(
            self.positions[op],
            self.positions[oa],
            self.positions[ob],
            self.positions[gp],
        );

        if illegal {
            let recheck = next_halfedge(g);
            self.flip_edge(h, g);
            self.legalize_non_constrained(h);
            self.legalize_non_constrained(recheck);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_refine_splits_thin_triangle() {
        let positions = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.2),
        ];
        let mut triangulation = Triangulation::build_delaunay(positions).unwrap();
        let mut settings = Settings::<f64>::default();
        settings.refine_mesh = true;
        settings.refinement_threshold_area = 1000.0;
        settings.refinement_threshold_angle = std::f64::consts::PI / 8.0;

        let before = triangulation.len();
        triangulation.refine(&settings).unwrap();
        assert!(triangulation.len() > before);

        for t in 0..triangulation.len() {
            let (a, b, c) = triangulation.triangle_points(t);
            let area = {
                let (ax, ay) = a.to_f64();
                let (bx, by) = b.to_f64();
                let (cx, cy) = c.to_f64();
                ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).abs() / 2.0
            };
            assert!(area.is_finite());
        }
    }

    #[test]
    fn test_refine_respects_area_threshold() {
        let positions = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mut triangulation = Triangulation::build_delaunay(positions).unwrap();
        let mut settings = Settings::<f64>::default();
        settings.refine_mesh = true;
        settings.refinement_threshold_area = 0.05;
        settings.refinement_threshold_angle = 0.0;

        triangulation.refine(&settings).unwrap();

        for t in 0..triangulation.len() {
            let (a, b, c) = triangulation.triangle_points(t);
            let (ax, ay) = a.to_f64();
            let (bx, by) = b.to_f64();
            let (cx, cy) = c.to_f64();
            let area = ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).abs() / 2.0;
            assert!(area <= 0.025 + 1e-9);
        }
    }

    #[test]
    fn test_refine_unsupported_on_i32() {
        let positions = vec![
            Point::new(0_i32, 0),
            Point::new(10, 0),
            Point::new(10, 10),
        ];
        let mut triangulation = Triangulation::build_delaunay(positions).unwrap();
        let settings = Settings::<i32>::default();
        let err = triangulation.refine(&settings).unwrap_err();
        assert!(matches!(err, Error::RefinementUnsupported));
    }
}
