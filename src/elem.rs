//! Accessor views over a [`crate::mesh::Triangulation`]: `Triangle`,
//! `HalfEdge`, and `Vertex`, generalized from the teacher's `elem.rs` over
//! `T: GeomKernel` and extended with the constraint-flag and circumcircle
//! accessors a pure-Delaunay build didn't need.

use crate::geom::{Circle, GeomKernel};
use crate::iter::*;
use crate::mesh::Triangulation;
use crate::point::Point;
use crate::util::{next_halfedge, prev_halfedge};

/// One triangle within a [`Triangulation`].
pub struct Triangle<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
}

impl<'a, T: GeomKernel> Triangle<'a, T> {
    /// A fixed identifier for this triangle, usable with
    /// [`Triangulation::get_triangle`].
    pub fn id(&self) -> usize {
        self.index / 3
    }

    pub fn edges(&self) -> TriangleEdgeIter<'a, T> {
        TriangleEdgeIter {
            triangulation: self.triangulation,
            index: self.index,
            end: self.index + 3,
        }
    }

    pub fn vertices(&self) -> TriangleVertexIter<'a, T> {
        TriangleVertexIter {
            triangulation: self.triangulation,
            index: self.index,
            end: self.index + 3,
        }
    }

    pub fn a(&self) -> Vertex<'a, T> {
        Vertex {
            triangulation: self.triangulation,
            index: self.index,
        }
    }

    pub fn b(&self) -> Vertex<'a, T> {
        Vertex {
            triangulation: self.triangulation,
            index: self.index + 1,
        }
    }

    pub fn c(&self) -> Vertex<'a, T> {
        Vertex {
            triangulation: self.triangulation,
            index: self.index + 2,
        }
    }

    pub fn ab(&self) -> HalfEdge<'a, T> {
        HalfEdge {
            triangulation: self.triangulation,
            index: self.index,
        }
    }

    pub fn bc(&self) -> HalfEdge<'a, T> {
        HalfEdge {
            triangulation: self.triangulation,
            index: self.index + 1,
        }
    }

    pub fn ca(&self) -> HalfEdge<'a, T> {
        HalfEdge {
            triangulation: self.triangulation,
            index: self.index + 2,
        }
    }

    /// This triangle's circumcircle, as computed on its last creation or
    /// update.
    pub fn circle(&self) -> Circle<T> {
        self.triangulation.circles[self.id()]
    }
}

/// One half-edge within a [`Triangulation`].
#[derive(Clone, Copy)]
pub struct HalfEdge<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
}

impl<'a, T: GeomKernel> HalfEdge<'a, T> {
    pub fn id(&self) -> usize {
        self.index
    }

    /// The corresponding half-edge in the other direction for the adjacent
    /// triangle, or `None` if this half-edge is on the mesh boundary.
    pub fn twin(&self) -> Option<HalfEdge<'a, T>> {
        self.triangulation.halfedges[self.index]
            .get()
            .map(|index| HalfEdge {
                triangulation: self.triangulation,
                index,
            })
    }

    pub fn next(&self) -> HalfEdge<'a, T> {
        HalfEdge {
            triangulation: self.triangulation,
            index: next_halfedge(self.index),
        }
    }

    pub fn prev(&self) -> HalfEdge<'a, T> {
        HalfEdge {
            triangulation: self.triangulation,
            index: prev_halfedge(self.index),
        }
    }

    pub fn start(&self) -> Vertex<'a, T> {
        Vertex {
            triangulation: self.triangulation,
            index: self.index,
        }
    }

    pub fn end(&self) -> Vertex<'a, T> {
        Vertex {
            triangulation: self.triangulation,
            index: next_halfedge(self.index),
        }
    }

    pub fn left(&self) -> Triangle<'a, T> {
        Triangle {
            triangulation: self.triangulation,
            index: self.index - self.index % 3,
        }
    }

    pub fn right(&self) -> Option<Triangle<'a, T>> {
        self.triangulation.halfedges[self.index]
            .get()
            .map(|j| Triangle {
                triangulation: self.triangulation,
                index: j - j % 3,
            })
    }

    /// Whether this half-edge (and its twin, if any) lies on an enforced
    /// constraint edge.
    pub fn is_constrained(&self) -> bool {
        self.triangulation.constrained_halfedges[self.index]
    }

    /// Whether this half-edge was constrained from an input constraint the
    /// caller marked as not a region barrier (SeedPlanter flood fill
    /// crosses it freely even though it is constrained).
    pub fn is_ignored_for_planting(&self) -> bool {
        self.triangulation.ignored_halfedges_for_planting[self.index]
    }

    pub fn is_boundary(&self) -> bool {
        self.triangulation.halfedges[self.index].is_none()
    }
}

/// One vertex within a [`Triangulation`].
#[derive(Clone, Copy)]
pub struct Vertex<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
}

impl<'a, T: GeomKernel> Vertex<'a, T> {
    /// A fixed identifier for this vertex, usable as an index into
    /// `positions`.
    pub fn id(&self) -> usize {
        self.triangulation.triangles[self.index]
    }

    pub fn position(&self) -> Point<T> {
        self.triangulation.positions[self.id()]
    }

    pub fn is_steiner(&self) -> bool {
        self.id() >= self.triangulation.initial_points_count
    }

    pub fn edges(&self) -> VertexEdgeIter<'a, T> {
        VertexEdgeIter {
            triangulation: self.triangulation,
            start: self.index.into(),
            index: self.index.into(),
        }
    }

    pub fn triangles(&self) -> VertexTriangleIter<'a, T> {
        VertexTriangleIter { inner: self.edges() }
    }
}
