//! The half-edge mesh itself: the `Triangulation` context and the
//! operations every pipeline stage shares (triangle/half-edge bookkeeping,
//! bulk removal with index remapping). Grounded in the teacher's
//! `triangulation.rs`, generalized from a pure-Delaunay result struct into
//! the full mutable mesh context that all four pipeline stages share.

use crate::elem::{HalfEdge, Triangle};
use crate::geom::{Circle, GeomKernel};
use crate::iter::{HalfEdgeIter, TriangleIter};
use crate::point::Point;
use crate::status::Status;
use crate::util::{next_halfedge, prev_halfedge, OptionIndex};

/// The mutable half-edge mesh, alongside pipeline status. Every array is
/// indexed by half-edge id `h = 3*t + s` except `positions` (vertex ids)
/// and `circles` (triangle ids). See invariants I1-I7.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangulation<T: GeomKernel> {
    pub positions: Vec<Point<T>>,
    pub triangles: Vec<usize>,
    pub halfedges: Vec<OptionIndex>,
    pub constrained_halfedges: Vec<bool>,
    pub ignored_halfedges_for_planting: Vec<bool>,
    pub circles: Vec<Circle<T>>,
    /// The convex hull, counter-clockwise, as produced by the
    /// DelaunayBuilder. Stale after SeedPlanter/Refiner run; kept only for
    /// diagnostics, not relied on by later stages.
    pub hull: Vec<usize>,
    /// Vertex ids below this are input vertices; at or above are Steiner
    /// vertices introduced by the Refiner.
    pub initial_points_count: usize,
    /// Skipped by (de)serialization: pipeline status is a run-time outcome,
    /// not part of the mesh's persisted state. Reconstructed as `empty()`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub status: Status,
}

impl<T: GeomKernel> Triangulation<T> {
    pub(crate) fn alloc(positions: Vec<Point<T>>) -> Self {
        let n = positions.len();
        let max_triangles = if n >= 3 { 2 * n - 5 } else { 0 };
        Triangulation {
            initial_points_count: n,
            positions,
            triangles: Vec::with_capacity(max_triangles * 3),
            halfedges: Vec::with_capacity(max_triangles * 3),
            constrained_halfedges: Vec::with_capacity(max_triangles * 3),
            ignored_halfedges_for_planting: Vec::with_capacity(max_triangles * 3),
            circles: Vec::with_capacity(max_triangles),
            hull: Vec::new(),
            status: Status::empty(),
        }
    }

    /// The number of triangles currently in the mesh.
    pub fn len(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles_iter(&self) -> TriangleIter<'_, T> {
        TriangleIter {
            triangulation: self,
            index: 0,
            end: self.triangles.len(),
        }
    }

    pub fn half_edges(&self) -> HalfEdgeIter<'_, T> {
        HalfEdgeIter {
            triangulation: self,
            index: 0,
            end: self.halfedges.len(),
        }
    }

    pub fn get_triangle(&self, id: usize) -> Option<Triangle<'_, T>> {
        let index = 3 * id;
        if index < self.triangles.len() {
            Some(Triangle {
                triangulation: self,
                index,
            })
        } else {
            None
        }
    }

    pub fn get_half_edge(&self, id: usize) -> Option<HalfEdge<'_, T>> {
        if id < self.halfedges.len() {
            Some(HalfEdge {
                triangulation: self,
                index: id,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn next_halfedge(h: usize) -> usize {
        next_halfedge(h)
    }

    #[inline]
    pub fn prev_halfedge(h: usize) -> usize {
        prev_halfedge(h)
    }

    /// The `(tail, head)` vertex pair represented by half-edge `h`.
    pub(crate) fn edge_endpoints(&self, h: usize) -> (usize, usize) {
        (self.triangles[h], self.triangles[next_halfedge(h)])
    }

    /// The three vertex positions of triangle `t`.
    pub fn triangle_points(&self, t: usize) -> (Point<T>, Point<T>, Point<T>) {
        let h = 3 * t;
        (
            self.positions[self.triangles[h]],
            self.positions[self.triangles[h + 1]],
            self.positions[self.triangles[h + 2]],
        )
    }

    pub(crate) fn update_circle(&mut self, t: usize) {
        let (a, b, c) = self.triangle_points(t);
        self.circles[t] = Circle::of_triangle(a, b, c);
    }

    /// Appends a new triangle `(i0, i1, i2)` with opposite half-edges
    /// `a, b, c` (in `None`/`Some` form), linking back symmetrically, and
    /// computes its circumcircle. Returns the new triangle's first
    /// half-edge id (`3*t`).
    pub(crate) fn add_triangle(
        &mut self,
        i0: usize,
        i1: usize,
        i2: usize,
        a: OptionIndex,
        b: OptionIndex,
        c: OptionIndex,
    ) -> usize {
        let t = self.triangles.len();

        self.triangles.push(i0);
        self.triangles.push(i1);
        self.triangles.push(i2);

        self.halfedges.push(a);
        self.halfedges.push(b);
        self.halfedges.push(c);

        self.constrained_halfedges.push(false);
        self.constrained_halfedges.push(false);
        self.constrained_halfedges.push(false);

        self.ignored_halfedges_for_planting.push(false);
        self.ignored_halfedges_for_planting.push(false);
        self.ignored_halfedges_for_planting.push(false);

        if let Some(a) = a.get() {
            self.halfedges[a] = t.into();
        }
        if let Some(b) = b.get() {
            self.halfedges[b] = (t + 1).into();
        }
        if let Some(c) = c.get() {
            self.halfedges[c] = (t + 2).into();
        }

        self.circles.push(Circle {
            center: Point::new(T::zero(), T::zero()),
            radius_sq: T::zero(),
        });
        self.update_circle(t / 3);

        t
    }

    /// Sets `halfedges[h] = g` and, if `g` is a real half-edge, the
    /// reciprocal `halfedges[g] = h`.
    pub(crate) fn link(&mut self, h: usize, g: OptionIndex) {
        self.halfedges[h] = g;
        if let Some(g) = g.get() {
            self.halfedges[g] = h.into();
        }
    }

    /// A half-edge with tail vertex `v`, for every vertex that has one;
    /// built by a single scan of `triangles` (§4.4 step 1).
    pub fn build_vertex_to_halfedge(&self) -> Vec<OptionIndex> {
        let mut map = vec![OptionIndex::none(); self.positions.len()];
        for h in 0..self.triangles.len() {
            map[self.triangles[h]] = h.into();
        }
        map
    }

    /// Removes every triangle `t` for which `removed[t]` is `true`,
    /// compacting the flat arrays with the prefix-sum-over-triangles rule
    /// (§9, "Index invalidation during removal"). Boundary half-edges of
    /// surviving triangles whose twin was removed become `-1` (§4.5).
    ///
    /// Returns, for each *old* half-edge id, the corresponding *new*
    /// half-edge id (or `None` if its triangle was removed), so callers
    /// can patch their own work queues and vertex-to-halfedge maps.
    pub(crate) fn remove_triangles(&mut self, removed: &[bool]) -> Vec<OptionIndex> {
        let n_triangles = self.len();
        debug_assert_eq!(removed.len(), n_triangles);

        let mut new_triangle_id = vec![0usize; n_triangles];
        let mut next = 0usize;
        for (t, &is_removed) in removed.iter().enumerate() {
            if !is_removed {
                new_triangle_id[t] = next;
                next += 1;
            }
        }

        let remap_h = |h: usize| -> OptionIndex {
            let t = h / 3;
            if removed[t] {
                OptionIndex::none()
            } else {
                OptionIndex::some(new_triangle_id[t] * 3 + h % 3)
            }
        };

        let mut triangles = Vec::with_capacity(next * 3);
        let mut halfedges = Vec::with_capacity(next * 3);
        let mut constrained = Vec::with_capacity(next * 3);
        let mut ignored = Vec::with_capacity(next * 3);
        let mut circles = Vec::with_capacity(next);

        for (t, &is_removed) in removed.iter().enumerate() {
            if is_removed {
                continue;
            }
            for s in 0..3 {
                let h = t * 3 + s;
                triangles.push(self.triangles[h]);
                let new_opp = match self.halfedges[h].get() {
                    Some(g) => remap_h(g),
                    None => OptionIndex::none(),
                };
                halfedges.push(new_opp);
                constrained.push(self.constrained_halfedges[h]);
                ignored.push(self.ignored_halfedges_for_planting[h]);
            }
            circles.push(self.circles[t]);
        }

        self.triangles = triangles;
        self.halfedges = halfedges;
        self.constrained_halfedges = constrained;
        self.ignored_halfedges_for_planting = ignored;
        self.circles = circles;

        (0..n_triangles * 3).map(remap_h).collect()
    }

    /// Removes vertices with id `>= initial_points_count` that no surviving
    /// triangle references, renumbering all remaining vertex references by
    /// prefix sum (§4.5's final compaction step). Only ever shrinks Steiner
    /// vertices; input vertices are never removed.
    pub(crate) fn compact_orphan_steiner_vertices(&mut self) {
        let n = self.positions.len();
        let mut referenced = vec![false; n];
        for &v in &self.triangles {
            referenced[v] = true;
        }
        for v in 0..self.initial_points_count {
            referenced[v] = true;
        }

        let mut new_id = vec![0usize; n];
        let mut next = 0usize;
        let mut kept_positions = Vec::with_capacity(n);
        for v in 0..n {
            if referenced[v] {
                new_id[v] = next;
                kept_positions.push(self.positions[v]);
                next += 1;
            }
        }

        if next == n {
            return;
        }

        for v in &mut self.triangles {
            *v = new_id[*v];
        }
        self.positions = kept_positions;
    }
}
