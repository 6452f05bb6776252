//! ConstraintApplier: forces constraint edges into the mesh via Sloan's
//! (1993) algorithm — locate crossings, then repeatedly flip convex
//! quadrilaterals until the edge appears. Grounded in the fan-walk +
//! bounded-flip-pass approach shown in `dima634/baby_shark`'s
//! `constrained_delaunay.rs` (`insert_edge`/`flip_edge`/`unsafe_flips`),
//! adapted here to the flat-array half-edge representation instead of
//! `baby_shark`'s struct mesh.

use log::{debug, trace};

use crate::elem::Vertex;
use crate::geom::GeomKernel;
use crate::mesh::Triangulation;
use crate::settings::Settings;
use crate::status::{Error, Status};
use crate::util::{next_halfedge, prev_halfedge, OptionIndex};

enum Crossing {
    /// The edge already exists as some half-edge `h` with
    /// `{triangles[h], triangles[next(h)]} = {u, v}`.
    AlreadyExists,
    /// A chain of crossed diagonal half-edges from `u` toward `v`.
    Found(Vec<usize>),
    /// Neither direction around `u` reached `v` without hitting a mesh
    /// boundary first.
    HitBoundary,
}

impl<T: GeomKernel> Triangulation<T> {
    /// Runs ConstraintApplier (§4.4) over every `(u, v)` pair in
    /// `constraint_edges`, honoring `ignore_for_planting` (same length,
    /// one entry per pair).
    pub fn apply_constraints(
        &mut self,
        constraint_edges: &[(usize, usize)],
        ignore_for_planting: &[bool],
        settings: &Settings<T>,
    ) -> Result<(), Error> {
        let mut point_to_halfedge = self.build_vertex_to_halfedge();

        for (idx, &(u, v)) in constraint_edges.iter().enumerate() {
            if settings.is_cancelled() {
                self.status |= Status::CANCELLED;
                return Ok(());
            }

            let ignored = ignore_for_planting.get(idx).copied().unwrap_or(false);
            self.apply_one_constraint(u, v, ignored, settings, &mut point_to_halfedge)?;
        }

        debug!(
            "constraints: applied {} pairs, {} triangles",
            constraint_edges.len(),
            self.len()
        );
        Ok(())
    }

    fn fan_around(&self, start_he: usize) -> crate::iter::VertexEdgeIter<'_, T> {
        Vertex {
            triangulation: self,
            index: start_he,
        }
        .edges()
    }

    fn find_crossings(&self, u: usize, v: usize, start_he: usize) -> Crossing {
        let pu = self.positions[u];
        let pv = self.positions[v];

        let mut first = None;
        for h in self.fan_around(start_he) {
            let o = next_halfedge(h.id());
            let (a, b) = self.edge_endpoints(o);
            if a == v || b == v {
                return Crossing::AlreadyExists;
            }
            if T::segments_properly_intersect(pu, pv, self.positions[a], self.positions[b]) {
                first = Some(o);
                break;
            }
        }

        let mut o = match first {
            Some(o) => o,
            None => return Crossing::HitBoundary,
        };

        let mut crossings = vec![o];
        loop {
            let g = match self.halfedges[o].get() {
                Some(g) => g,
                None => return Crossing::HitBoundary,
            };
            let cand0 = next_halfedge(g);
            let cand1 = prev_halfedge(g);

            let (a0, b0) = self.edge_endpoints(cand0);
            if a0 == v || b0 == v {
                return Crossing::Found(crossings);
            }
            let (a1, b1) = self.edge_endpoints(cand1);
            if a1 == v || b1 == v {
                return Crossing::Found(crossings);
            }

            o = if T::segments_properly_intersect(pu, pv, self.positions[a0], self.positions[b0]) {
                cand0
            } else {
                cand1
            };
            crossings.push(o);
        }
    }

    fn apply_one_constraint(
        &mut self,
        u: usize,
        v: usize,
        ignored: bool,
        settings: &Settings<T>,
        point_to_halfedge: &mut [OptionIndex],
    ) -> Result<(), Error> {
        if let Some(existing) = self.find_existing_edge(u, v) {
            self.mark_constrained(existing, ignored);
            return Ok(());
        }

        let start_he = match point_to_halfedge[u].get() {
            Some(h) => h,
            None => return Ok(()), // isolated vertex, nothing to do
        };

        let mut pending = match self.find_crossings(u, v, start_he) {
            Crossing::AlreadyExists => {
                if let Some(existing) = self.find_existing_edge(u, v) {
                    self.mark_constrained(existing, ignored);
                }
                return Ok(());
            }
            Crossing::HitBoundary => {
                trace!("constraint ({}, {}) never crosses the mesh interior", u, v);
                return Ok(());
            }
            Crossing::Found(pending) => pending,
        };

        let mut pass = 0u32;
        while !pending.is_empty() {
            if settings.is_cancelled() {
                self.status |= Status::CANCELLED;
                return Ok(());
            }
            if pass >= settings.sloan_max_iters {
                return Err(Error::SloanItersExceeded(settings.sloan_max_iters));
            }
            pass += 1;

            let mut next_pending = Vec::new();
            for &h in &pending {
                // The half-edge may have been relocated by an earlier flip
                // in this same pass; `h` always still identifies a live
                // diagonal because flips only ever touch the two slots of
                // the quad they resolve and we re-queue by slot id.
                let g = match self.halfedges[h].get() {
                    Some(g) => g,
                    None => continue, // became a boundary edge somehow; drop it
                };

                let (oa, ob) = self.edge_endpoints(h);
                let op = self.triangles[prev_halfedge(h)];
                let gp = self.triangles[prev_halfedge(g)];

                let pa = self.positions[oa];
                let pb = self.positions[ob];
                let pop = self.positions[op];
                let pgp = self.positions[gp];

                if !T::is_convex_quadrilateral(pb, pop, pa, pgp) {
                    next_pending.push(h);
                    continue;
                }

                let (ar, bl) = self.flip_edge(h, g);

                let new_diag_is_c =
                    (op == u && gp == v) || (op == v && gp == u);
                if new_diag_is_c {
                    self.mark_constrained(ar, ignored);
                } else if T::segments_properly_intersect(
                    self.positions[u],
                    self.positions[v],
                    pop,
                    pgp,
                ) {
                    next_pending.push(ar);
                }
            }
            pending = next_pending;
        }

        for v in point_to_halfedge.iter_mut() {
            if let Some(h) = v.get() {
                if h >= self.triangles.len() {
                    *v = OptionIndex::none();
                }
            }
        }
        *point_to_halfedge = self.build_vertex_to_halfedge();

        Ok(())
    }

    pub(crate) fn find_existing_edge(&self, u: usize, v: usize) -> Option<usize> {
        for h in 0..self.triangles.len() {
            let (a, b) = self.edge_endpoints(h);
            if (a == u && b == v) || (a == v && b == u) {
                return Some(h);
            }
        }
        None
    }

    fn mark_constrained(&mut self, h: usize, ignored: bool) {
        self.constrained_halfedges[h] = true;
        self.ignored_halfedges_for_planting[h] = ignored;
        if let Some(g) = self.halfedges[h].get() {
            self.constrained_halfedges[g] = true;
            self.ignored_halfedges_for_planting[g] = ignored;
        }
    }

    /// Flips the shared diagonal of the two triangles meeting at `o`/`g`
    /// (`g` must equal `halfedges[o]`), rewriting both triangles in place
    /// and propagating the displaced `ar`/`bl` edges' constraint flags to
    /// their new homes. Returns the new diagonal's two twin slots. Shared
    /// with the Refiner's post-split legalization pass.
    pub(crate) fn flip_edge(&mut self, o: usize, g: usize) -> (usize, usize) {
        let ar = prev_halfedge(o);
        let al = next_halfedge(o);
        let bl = prev_halfedge(g);
        let nr = next_halfedge(g);

        let op = self.triangles[ar];
        let oa = self.triangles[o];
        let gp = self.triangles[bl];
        debug_assert_eq!(self.triangles[al], self.triangles[g]);
        let _ob = self.triangles[al];
        debug_assert_eq!(self.triangles[nr], oa);

        let ar_constrained = self.constrained_halfedges[ar];
        let ar_ignored = self.ignored_halfedges_for_planting[ar];
        let bl_constrained = self.constrained_halfedges[bl];
        let bl_ignored = self.ignored_halfedges_for_planting[bl];

        let har = self.halfedges[ar];
        let hbl = self.halfedges[bl];

        self.triangles[o] = gp;
        self.triangles[g] = op;

        self.link(o, hbl);
        self.link(g, har);
        self.link(ar, bl.into());

        if let Some(har) = har.get() {
            self.constrained_halfedges[har] = ar_constrained;
            self.ignored_halfedges_for_planting[har] = ar_ignored;
        }
        self.constrained_halfedges[g] = ar_constrained;
        self.ignored_halfedges_for_planting[g] = ar_ignored;

        if let Some(hbl) = hbl.get() {
            self.constrained_halfedges[hbl] = bl_constrained;
            self.ignored_halfedges_for_planting[hbl] = bl_ignored;
        }
        self.constrained_halfedges[o] = bl_constrained;
        self.ignored_halfedges_for_planting[o] = bl_ignored;

        self.constrained_halfedges[ar] = false;
        self.constrained_halfedges[bl] = false;
        self.ignored_halfedges_for_planting[ar] = false;
        self.ignored_halfedges_for_planting[bl] = false;

        self.update_circle(o / 3);
        self.update_circle(g / 3);

        (ar, bl)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::point::Point;

    #[test]
    fn test_square_diagonal_constraint() {
        let points = vec![
            Point::new(0.0_f64, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mut triangulation = Triangulation::build_delaunay(points).unwrap();
        let settings = Settings::<f64>::default();
        triangulation
            .apply_constraints(&[(0, 2)], &[false], &settings)
            .unwrap();

        let has_constrained_diagonal = (0..triangulation.triangles.len()).any(|h| {
            let (a, b) = triangulation.edge_endpoints(h);
            triangulation.constrained_halfedges[h] && ((a, b) == (0, 2) || (a, b) == (2, 0))
        });
        assert!(has_constrained_diagonal);
    }
}
