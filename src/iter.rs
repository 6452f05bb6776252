//! Iterators over a [`crate::mesh::Triangulation`]'s vertices, half-edges,
//! and triangles, generalized from the teacher's `iter.rs` over
//! `T: GeomKernel`.

use std::iter::FusedIterator;

use crate::elem::*;
use crate::geom::GeomKernel;
use crate::mesh::Triangulation;
use crate::util::{next_halfedge, prev_halfedge, OptionIndex};

/// Iterates over all half-edges that start at a vertex.
///
/// Order of iteration is undefined (generally counter-clockwise, but will
/// switch to clockwise if the iteration hits the mesh boundary).
///
/// Note that on the boundary, one half-edge connected to the vertex does
/// not start at that vertex and therefore will not be visited.
#[derive(Clone, Copy)]
pub struct VertexEdgeIter<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) start: OptionIndex,
    pub(crate) index: OptionIndex,
}

impl<'a, T: GeomKernel> Iterator for VertexEdgeIter<'a, T> {
    type Item = HalfEdge<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.index.get(), self.start.get()) {
            (None, _) => None,
            (Some(index), None) => {
                let e = self.triangulation.halfedges[index].get();
                self.index = e.map(next_halfedge).into();

                Some(HalfEdge {
                    triangulation: self.triangulation,
                    index,
                })
            }
            (Some(index), Some(start)) => {
                self.index = match self.triangulation.halfedges[prev_halfedge(index)].get() {
                    None => {
                        let e = self.triangulation.halfedges[start].get();
                        self.start = OptionIndex::none();
                        e.map(next_halfedge)
                    }
                    Some(e) if e == start => None,
                    e => e,
                }
                .into();

                Some(HalfEdge {
                    triangulation: self.triangulation,
                    index,
                })
            }
        }
    }
}

impl<'a, T: GeomKernel> FusedIterator for VertexEdgeIter<'a, T> {}

/// Iterates over the triangles adjacent to a vertex.
#[derive(Clone, Copy)]
pub struct VertexTriangleIter<'a, T: GeomKernel> {
    pub(crate) inner: VertexEdgeIter<'a, T>,
}

impl<'a, T: GeomKernel> Iterator for VertexTriangleIter<'a, T> {
    type Item = Triangle<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| e.left())
    }
}

impl<'a, T: GeomKernel> FusedIterator for VertexTriangleIter<'a, T> {}

/// Iterates over the three half-edges of a triangle.
#[derive(Clone, Copy)]
pub struct TriangleEdgeIter<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
    pub(crate) end: usize,
}

impl<'a, T: GeomKernel> Iterator for TriangleEdgeIter<'a, T> {
    type Item = HalfEdge<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.end {
            let index = self.index;
            self.index += 1;
            Some(HalfEdge {
                triangulation: self.triangulation,
                index,
            })
        } else {
            None
        }
    }
}

impl<'a, T: GeomKernel> FusedIterator for TriangleEdgeIter<'a, T> {}

impl<'a, T: GeomKernel> ExactSizeIterator for TriangleEdgeIter<'a, T> {
    fn len(&self) -> usize {
        self.end - self.index
    }
}

/// Iterates over the three vertices of a triangle.
#[derive(Clone, Copy)]
pub struct TriangleVertexIter<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
    pub(crate) end: usize,
}

impl<'a, T: GeomKernel> Iterator for TriangleVertexIter<'a, T> {
    type Item = Vertex<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.end {
            let index = self.index;
            self.index += 1;
            Some(Vertex {
                triangulation: self.triangulation,
                index,
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl<'a, T: GeomKernel> FusedIterator for TriangleVertexIter<'a, T> {}

impl<'a, T: GeomKernel> ExactSizeIterator for TriangleVertexIter<'a, T> {
    fn len(&self) -> usize {
        self.end - self.index
    }
}

/// Iterates over every triangle in a [`Triangulation`].
#[derive(Clone, Copy)]
pub struct TriangleIter<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
    pub(crate) end: usize,
}

impl<'a, T: GeomKernel> Iterator for TriangleIter<'a, T> {
    type Item = Triangle<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.end {
            let index = self.index;
            self.index += 3;
            Some(Triangle {
                triangulation: self.triangulation,
                index,
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl<'a, T: GeomKernel> FusedIterator for TriangleIter<'a, T> {}

impl<'a, T: GeomKernel> ExactSizeIterator for TriangleIter<'a, T> {
    fn len(&self) -> usize {
        (self.triangulation.triangles.len() - self.index) / 3
    }
}

/// Iterates over every half-edge in a [`Triangulation`].
#[derive(Clone, Copy)]
pub struct HalfEdgeIter<'a, T: GeomKernel> {
    pub(crate) triangulation: &'a Triangulation<T>,
    pub(crate) index: usize,
    pub(crate) end: usize,
}

impl<'a, T: GeomKernel> Iterator for HalfEdgeIter<'a, T> {
    type Item = HalfEdge<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.end {
            let index = self.index;
            self.index += 1;
            Some(HalfEdge {
                triangulation: self.triangulation,
                index,
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl<'a, T: GeomKernel> FusedIterator for HalfEdgeIter<'a, T> {}

impl<'a, T: GeomKernel> ExactSizeIterator for HalfEdgeIter<'a, T> {
    fn len(&self) -> usize {
        self.end - self.index
    }
}
