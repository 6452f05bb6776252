//! SeedPlanter: flood-fills "removed" regions (user hole seeds, the
//! restored outer boundary, or both auto-detected) and deletes the
//! visited triangles. Grounded in `gitnlsn/nlsn-delaunay-refine`'s
//! `triangulation_procedures::{boundary, hole}` pending-edge-stack flood
//! fill, adapted to flood over half-edge ids instead of `Rc<Edge>`
//! adjacency maps.

use log::debug;

use crate::elem::Vertex;
use crate::geom::GeomKernel;
use crate::mesh::Triangulation;
use crate::point::Point;
use crate::settings::Settings;
use crate::status::Status;
use crate::util::{next_halfedge, OptionIndex};

impl<T: GeomKernel> Triangulation<T> {
    /// Runs SeedPlanter (§4.5) over `hole_seeds`, honoring
    /// `settings.restore_boundary` and `settings.auto_holes_and_boundary`.
    pub fn plant_seeds(&mut self, hole_seeds: &[Point<T>], settings: &Settings<T>) {
        let mut removed = vec![false; self.len()];

        for &seed in hole_seeds {
            if settings.is_cancelled() {
                self.status |= Status::CANCELLED;
                return;
            }
            if let Some(t) = self.locate_triangle(seed) {
                self.flood_fill(t, &mut removed);
            }
        }

        if settings.restore_boundary || settings.auto_holes_and_boundary {
            for h in 0..self.halfedges.len() {
                if self.halfedges[h].is_none() && !self.is_planting_barrier(h) {
                    self.flood_fill(h / 3, &mut removed);
                }
            }
        }

        if settings.auto_holes_and_boundary {
            // First-level islands only (§4.5): every still-unvisited
            // constrained loop that isn't the hull boundary is walked once,
            // and whichever side is geometrically interior to it is
            // flooded — a fully enclosed loop needs no already-removed
            // neighbor to be detected as a hole.
            let vertex_to_he = self.build_vertex_to_halfedge();
            let mut loop_visited = vec![false; self.halfedges.len()];

            for h in 0..self.halfedges.len() {
                if loop_visited[h] || !self.is_planting_barrier(h) {
                    continue;
                }
                let twin = match self.halfedges[h].get() {
                    Some(g) => g,
                    None => continue,
                };
                loop_visited[h] = true;
                loop_visited[twin] = true;

                let ring = self.trace_constrained_loop(h, &vertex_to_he, &mut loop_visited);
                if ring.len() < 3 {
                    continue;
                }

                let mut signed_area2 = 0.0;
                for w in ring.windows(2) {
                    let (ax, ay) = self.positions[w[0]].to_f64();
                    let (bx, by) = self.positions[w[1]].to_f64();
                    signed_area2 += ax * by - bx * ay;
                }
                let (ax, ay) = self.positions[ring[ring.len() - 1]].to_f64();
                let (bx, by) = self.positions[ring[0]].to_f64();
                signed_area2 += ax * by - bx * ay;

                let interior_t = if signed_area2 > 0.0 { h / 3 } else { twin / 3 };
                if !removed[interior_t] {
                    self.flood_fill(interior_t, &mut removed);
                }
            }
        }

        let removed_count = removed.iter().filter(|&&r| r).count();
        self.remove_triangles(&removed);
        self.compact_orphan_steiner_vertices();

        debug!(
            "seed planting: removed {} of {} triangles",
            removed_count,
            removed.len()
        );
    }

    fn is_planting_barrier(&self, h: usize) -> bool {
        self.constrained_halfedges[h] && !self.ignored_halfedges_for_planting[h]
    }

    /// Walks the closed chain of constrained half-edges starting at `start`
    /// (tail vertex to tail vertex, following whichever barrier edge at
    /// each vertex isn't the one just arrived on), marking every half-edge
    /// crossed as visited. Returns the loop's distinct vertex ids in
    /// traversal order (not repeating the start vertex).
    fn trace_constrained_loop(
        &self,
        start: usize,
        vertex_to_he: &[OptionIndex],
        visited: &mut [bool],
    ) -> Vec<usize> {
        let start_vertex = self.triangles[start];
        let mut ring = vec![start_vertex];
        let mut current = start;

        loop {
            let v = self.triangles[next_halfedge(current)];
            if v == start_vertex {
                break;
            }
            ring.push(v);

            let came_from = self.halfedges[current].get();
            let fan_start = match vertex_to_he[v].get() {
                Some(he) => he,
                None => break,
            };
            let next_edge = Vertex { triangulation: self, index: fan_start }
                .edges()
                .map(|he| he.id())
                .find(|&he2| self.is_planting_barrier(he2) && Some(he2) != came_from);

            current = match next_edge {
                Some(he2) => he2,
                None => break,
            };
            visited[current] = true;
            if let Some(g) = self.halfedges[current].get() {
                visited[g] = true;
            }
        }

        ring
    }

    fn locate_triangle(&self, p: Point<T>) -> Option<usize> {
        (0..self.len()).find(|&t| {
            let (a, b, c) = self.triangle_points(t);
            T::point_in_triangle(p, a, b, c)
        })
    }

    /// BFS over triangles reachable from `start` crossing only edges that
    /// are neither a planting barrier nor the mesh boundary.
    fn flood_fill(&self, start: usize, removed: &mut [bool]) {
        if removed[start] {
            return;
        }
        removed[start] = true;
        let mut stack = vec![start];
        while let Some(t) = stack.pop() {
            for s in 0..3 {
                let h = t * 3 + s;
                if self.is_planting_barrier(h) {
                    continue;
                }
                if let Some(g) = self.halfedges[h].get() {
                    let nt = g / 3;
                    if !removed[nt] {
                        removed[nt] = true;
                        stack.push(nt);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hole_removal() {
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
        let mut triangulation = Triangulation::build_delaunay(positions).unwrap();
        let settings = Settings::<f64>::default();
        triangulation
            .apply_constraints(
                &[(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6), (6, 7), (7, 4)],
                &[false; 8],
                &settings,
            )
            .unwrap();

        let mut settings = settings;
        settings.restore_boundary = true;
        triangulation.plant_seeds(&[Point::new(2.0, 2.0)], &settings);

        for t in 0..triangulation.len() {
            let (a, b, c) = triangulation.triangle_points(t);
            assert!(!f64::point_in_triangle(Point::new(2.0, 2.0), a, b, c));
        }
    }

    #[test]
    fn test_auto_holes_detects_island_with_no_prior_removal() {
        // Outer square constraint coincides with the convex hull, so the
        // boundary flood (lines 34-39) removes nothing; the inner square's
        // hole must still be found by the loop trace alone.
        let positions = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(4.0, 4.0),
            Point::new(6.0, 4.0),
            Point::new(6.0, 6.0),
            Point::new(4.0, 6.0),
        ];
        let mut triangulation = Triangulation::build_delaunay(positions).unwrap();
        let settings = Settings::<f64>::default();
        triangulation
            .apply_constraints(
                &[(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6), (6, 7), (7, 4)],
                &[false; 8],
                &settings,
            )
            .unwrap();

        let mut settings = settings;
        settings.auto_holes_and_boundary = true;
        triangulation.plant_seeds(&[], &settings);

        assert!(triangulation.len() > 0);
        for t in 0..triangulation.len() {
            let (a, b, c) = triangulation.triangle_points(t);
            assert!(!f64::point_in_triangle(Point::new(5.0, 5.0), a, b, c));
        }
    }
}
