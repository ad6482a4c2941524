//! Mesh queries consumed by the partitioner and the local system builder.
//!
//! The preconditioner only needs connectivity (element → vertices), nodal coordinates and
//! bounding boxes. [`Mesh`] captures those queries; [`CartesianMesh`] is the structured
//! implementation used for the subdomain and absorbing-layer meshes.

use bitflags::bitflags;

pub mod cartesian;
pub use cartesian::CartesianMesh;

/// How element geometry is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryKind {
    /// Straight-sided elements defined by their vertices.
    #[default]
    Linear,
    /// High-order nodal geometry.
    Curved { order: usize },
    /// NURBS patches.
    Nurbs,
}

bitflags! {
    /// Sides of an axis-aligned box.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        const X_LOW = 1;
        const X_HIGH = 1 << 1;
        const Y_LOW = 1 << 2;
        const Y_HIGH = 1 << 3;
        const Z_LOW = 1 << 4;
        const Z_HIGH = 1 << 5;
    }
}

impl Sides {
    /// Lower side of `axis`.
    pub fn low(axis: usize) -> Sides {
        Sides::from_bits_truncate(1 << (2 * axis))
    }

    /// Upper side of `axis`.
    pub fn high(axis: usize) -> Sides {
        Sides::from_bits_truncate(1 << (2 * axis + 1))
    }

    /// Every side of a `dim`-dimensional box.
    pub fn all_for(dim: usize) -> Sides {
        (0..dim.min(3)).fold(Sides::empty(), |acc, axis| acc | Sides::low(axis) | Sides::high(axis))
    }
}

/// Axis-aligned bounding box. Unused axes stay at zero extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub dim: usize,
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    /// An empty box that grows with [`BoundingBox::include`].
    pub fn empty(dim: usize) -> Self {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for d in 0..dim {
            min[d] = f64::INFINITY;
            max[d] = f64::NEG_INFINITY;
        }
        BoundingBox { dim, min, max }
    }

    pub fn new(dim: usize, min: [f64; 3], max: [f64; 3]) -> Self {
        BoundingBox { dim, min, max }
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &[f64]) {
        for d in 0..self.dim {
            self.min[d] = self.min[d].min(p[d]);
            self.max[d] = self.max[d].max(p[d]);
        }
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Largest extent over the active axes.
    pub fn diameter(&self) -> f64 {
        (0..self.dim).map(|d| self.extent(d)).fold(0.0, f64::max)
    }

    /// Inclusive containment test with an absolute tolerance.
    pub fn contains(&self, p: &[f64], tol: f64) -> bool {
        (0..self.dim).all(|d| p[d] >= self.min[d] - tol && p[d] <= self.max[d] + tol)
    }
}

/// Connectivity and coordinate queries on a conforming mesh.
pub trait Mesh {
    /// Spatial dimension (1, 2 or 3).
    fn dimension(&self) -> usize;
    fn num_elements(&self) -> usize;
    fn num_vertices(&self) -> usize;
    /// Vertices of element `e`.
    fn element_vertices(&self, e: usize) -> &[usize];
    /// Coordinates of vertex `v` (length = dimension).
    fn vertex(&self, v: usize) -> &[f64];
    fn geometry(&self) -> GeometryKind;

    /// Vertex average of element `e`.
    fn element_centroid(&self, e: usize) -> [f64; 3] {
        let verts = self.element_vertices(e);
        let mut c = [0.0; 3];
        for &v in verts {
            for (d, x) in self.vertex(v).iter().enumerate() {
                c[d] += x;
            }
        }
        let nv = verts.len().max(1) as f64;
        c.iter_mut().for_each(|x| *x /= nv);
        c
    }

    fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty(self.dimension());
        for v in 0..self.num_vertices() {
            bbox.include(self.vertex(v));
        }
        bbox
    }

    /// Bounding box of a subset of elements.
    fn elements_bounding_box(&self, elements: &[usize]) -> BoundingBox {
        let mut bbox = BoundingBox::empty(self.dimension());
        for &e in elements {
            for &v in self.element_vertices(e) {
                bbox.include(self.vertex(v));
            }
        }
        bbox
    }
}
