//! Structured axis-aligned meshes of segments, quadrilaterals or hexahedra.
//!
//! Vertices are numbered lexicographically with x fastest; element vertices are listed in
//! tensor order, bit `d` of the corner index selecting the upper node along axis `d`.

use super::{BoundingBox, GeometryKind, Mesh, Sides};
use crate::error::KError;

/// Relative tolerance (in units of the element size) used to match coordinates to vertices.
const LOCATE_TOL: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct CartesianMesh {
    dim: usize,
    cells: [usize; 3],
    origin: [f64; 3],
    spacing: [f64; 3],
    coords: Vec<f64>,
    elements: Vec<usize>,
    geometry: GeometryKind,
}

impl CartesianMesh {
    /// Mesh the box `[origin, origin + lengths]` with `cells[d]` elements along axis `d`.
    pub fn new(origin: &[f64], lengths: &[f64], cells: &[usize]) -> Result<Self, KError> {
        let dim = cells.len();
        if !(1..=3).contains(&dim) || origin.len() != dim || lengths.len() != dim {
            return Err(KError::InvalidConfig(format!(
                "mesh needs matching origin/lengths/cells of dimension 1..=3, got {}/{}/{}",
                origin.len(),
                lengths.len(),
                dim
            )));
        }
        if cells.iter().any(|&c| c == 0) || lengths.iter().any(|&l| !(l > 0.0 && l.is_finite())) {
            return Err(KError::InvalidConfig("mesh needs positive cell counts and lengths".into()));
        }

        let mut o = [0.0; 3];
        let mut h = [1.0; 3];
        let mut n = [1usize; 3];
        for d in 0..dim {
            o[d] = origin[d];
            h[d] = lengths[d] / cells[d] as f64;
            n[d] = cells[d];
        }

        let nv = [n[0] + 1, if dim > 1 { n[1] + 1 } else { 1 }, if dim > 2 { n[2] + 1 } else { 1 }];
        let mut coords = Vec::with_capacity(nv[0] * nv[1] * nv[2] * dim);
        for k in 0..nv[2] {
            for j in 0..nv[1] {
                for i in 0..nv[0] {
                    let ijk = [i, j, k];
                    for d in 0..dim {
                        coords.push(o[d] + ijk[d] as f64 * h[d]);
                    }
                }
            }
        }

        let corners = 1usize << dim;
        let ne = n[0] * n[1] * n[2];
        let mut elements = Vec::with_capacity(ne * corners);
        for ck in 0..n[2] {
            for cj in 0..n[1] {
                for ci in 0..n[0] {
                    for b in 0..corners {
                        let i = ci + (b & 1);
                        let j = cj + ((b >> 1) & 1);
                        let k = ck + ((b >> 2) & 1);
                        elements.push(i + nv[0] * (j + nv[1] * k));
                    }
                }
            }
        }

        Ok(CartesianMesh { dim, cells: n, origin: o, spacing: h, coords, elements, geometry: GeometryKind::Linear })
    }

    /// Mesh a box given by its corners with element spacing `h` per axis.
    pub fn from_box(bbox: &BoundingBox, spacing: &[f64; 3]) -> Result<Self, KError> {
        let dim = bbox.dim;
        let mut cells = Vec::with_capacity(dim);
        let mut lengths = Vec::with_capacity(dim);
        for d in 0..dim {
            let c = (bbox.extent(d) / spacing[d]).round() as usize;
            cells.push(c.max(1));
            lengths.push(c.max(1) as f64 * spacing[d]);
        }
        CartesianMesh::new(&bbox.min[..dim], &lengths, &cells)
    }

    /// Tag the geometry representation (used to reject unsupported inputs).
    pub fn with_geometry(mut self, geometry: GeometryKind) -> Self {
        self.geometry = geometry;
        self
    }

    /// Elements per axis (1 on unused axes).
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    /// Element size per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    fn vertices_per_axis(&self) -> [usize; 3] {
        let mut nv = [1; 3];
        for d in 0..self.dim {
            nv[d] = self.cells[d] + 1;
        }
        nv
    }

    pub fn vertex_index(&self, ijk: [usize; 3]) -> usize {
        let nv = self.vertices_per_axis();
        ijk[0] + nv[0] * (ijk[1] + nv[1] * ijk[2])
    }

    /// Vertex at coordinates `p`, if one lies within tolerance.
    pub fn locate_vertex(&self, p: &[f64]) -> Option<usize> {
        let nv = self.vertices_per_axis();
        let mut ijk = [0usize; 3];
        for d in 0..self.dim {
            let t = (p[d] - self.origin[d]) / self.spacing[d];
            let r = t.round();
            if (t - r).abs() > LOCATE_TOL || r < 0.0 || r as usize >= nv[d] {
                return None;
            }
            ijk[d] = r as usize;
        }
        Some(self.vertex_index(ijk))
    }

    /// Vertices lying on the requested sides of the mesh box.
    pub fn boundary_vertices(&self, sides: Sides) -> Vec<usize> {
        let nv = self.vertices_per_axis();
        let mut out = Vec::new();
        for k in 0..nv[2] {
            for j in 0..nv[1] {
                for i in 0..nv[0] {
                    let ijk = [i, j, k];
                    let on_side = (0..self.dim).any(|d| {
                        (ijk[d] == 0 && sides.contains(Sides::low(d)))
                            || (ijk[d] == nv[d] - 1 && sides.contains(Sides::high(d)))
                    });
                    if on_side {
                        out.push(self.vertex_index(ijk));
                    }
                }
            }
        }
        out
    }
}

impl Mesh for CartesianMesh {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn num_elements(&self) -> usize {
        self.elements.len() >> self.dim
    }

    fn num_vertices(&self) -> usize {
        self.coords.len() / self.dim
    }

    fn element_vertices(&self, e: usize) -> &[usize] {
        let nc = 1usize << self.dim;
        &self.elements[e * nc..(e + 1) * nc]
    }

    fn vertex(&self, v: usize) -> &[f64] {
        &self.coords[v * self.dim..(v + 1) * self.dim]
    }

    fn geometry(&self) -> GeometryKind {
        self.geometry
    }

    fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new(self.dim, [0.0; 3], [0.0; 3]);
        for d in 0..self.dim {
            bbox.min[d] = self.origin[d];
            bbox.max[d] = self.origin[d] + self.cells[d] as f64 * self.spacing[d];
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_numbering_2d() {
        let m = CartesianMesh::new(&[0.0, 0.0], &[2.0, 1.0], &[4, 2]).unwrap();
        assert_eq!(m.num_elements(), 8);
        assert_eq!(m.num_vertices(), 15);
        // first element: corners (0,0),(1,0),(0,1),(1,1) in tensor order
        assert_eq!(m.element_vertices(0), &[0, 1, 5, 6]);
        assert_eq!(m.vertex(6), &[0.5, 0.5]);
        assert_eq!(m.locate_vertex(&[1.5, 1.0]), Some(13));
        assert_eq!(m.locate_vertex(&[1.25, 1.0]), None);
    }

    #[test]
    fn boundary_vertices_1d() {
        let m = CartesianMesh::new(&[0.0], &[1.0], &[4]).unwrap();
        assert_eq!(m.boundary_vertices(Sides::all_for(1)), vec![0, 4]);
        assert_eq!(m.boundary_vertices(Sides::X_HIGH), vec![4]);
    }

    #[test]
    fn rejects_bad_shape() {
        assert!(CartesianMesh::new(&[0.0], &[1.0], &[0]).is_err());
        assert!(CartesianMesh::new(&[0.0, 0.0], &[1.0], &[2, 2]).is_err());
    }
}
