//! Index maps between global, subdomain and absorbing-layer unknowns.
//!
//! For every subdomain a [`DofMapEntry`] holds the subdomain's own space, the space on the
//! subdomain box grown by its absorbing layers, and two maps:
//! - `dof2global[i]`: global unknown of local unknown `i`;
//! - `dof2pml[i]`: unknown of the extended space sitting at the same point as local unknown `i`.
//!
//! All vector operations use the `[re; im]` block layout of [`crate::utils::blockvec`].

use log::debug;

use crate::error::KError;
use crate::mesh::{BoundingBox, CartesianMesh, Mesh};
use crate::partition::Partition;
use crate::pml::LayerThickness;
use crate::space::{DiscreteSpace, H1Space};
use crate::utils::blockvec;

/// Maps and spaces of one subdomain.
#[derive(Debug, Clone)]
pub struct DofMapEntry {
    space: H1Space,
    pml_space: H1Space,
    thickness: LayerThickness,
    dof2global: Vec<usize>,
    dof2pml: Vec<usize>,
}

impl DofMapEntry {
    /// Physical subdomain space.
    pub fn space(&self) -> &H1Space {
        &self.space
    }

    /// Space on the absorbing-layer-extended box.
    pub fn pml_space(&self) -> &H1Space {
        &self.pml_space
    }

    /// Absorbing thickness actually meshed (whole element layers).
    pub fn thickness(&self) -> &LayerThickness {
        &self.thickness
    }

    /// Physical bounding box of the subdomain.
    pub fn bbox(&self) -> BoundingBox {
        self.space.mesh().bounding_box()
    }

    pub fn dof2global(&self) -> &[usize] {
        &self.dof2global
    }

    pub fn dof2pml(&self) -> &[usize] {
        &self.dof2pml
    }

    /// Number of physical local unknowns.
    pub fn size(&self) -> usize {
        self.dof2global.len()
    }

    /// Number of unknowns of the extended space.
    pub fn pml_size(&self) -> usize {
        self.pml_space.true_vsize()
    }

    /// Local restriction of a global block vector.
    pub fn gather(&self, global: &[f64], local: &mut [f64]) {
        blockvec::gather(global, &self.dof2global, local);
    }

    /// Assign local values to their global positions.
    pub fn scatter(&self, local: &[f64], global: &mut [f64]) {
        blockvec::scatter(local, &self.dof2global, global);
    }

    /// Accumulate local values into their global positions.
    pub fn scatter_add(&self, local: &[f64], global: &mut [f64]) {
        blockvec::scatter_add(local, &self.dof2global, global);
    }

    /// Zero extension of a physical local vector into the extended space.
    pub fn extend(&self, local: &[f64], pml: &mut [f64]) {
        pml.iter_mut().for_each(|x| *x = 0.0);
        blockvec::scatter(local, &self.dof2pml, pml);
    }

    /// Restriction of an extended-space vector to the physical unknowns.
    pub fn restrict(&self, pml: &[f64], local: &mut [f64]) {
        blockvec::gather(pml, &self.dof2pml, local);
    }
}

/// Per-subdomain maps for one partition of a global space.
#[derive(Debug, Clone)]
pub struct DofMap {
    global_size: usize,
    entries: Vec<DofMapEntry>,
}

impl DofMap {
    /// Maps without absorbing layers; `dof2pml` is the identity.
    pub fn new(global: &H1Space, partition: &Partition) -> Result<Self, KError> {
        let thickness = vec![LayerThickness::zero(); partition.len()];
        DofMap::with_absorbing_layers(global, partition, &thickness)
    }

    /// Maps whose extended spaces are grown by `thickness[p]` around subdomain `p`.
    ///
    /// Thicknesses are rounded up to whole element layers of the global mesh, so a nonzero
    /// thickness always meshes at least one layer.
    pub fn with_absorbing_layers(
        global: &H1Space,
        partition: &Partition,
        thickness: &[LayerThickness],
    ) -> Result<Self, KError> {
        if thickness.len() != partition.len() {
            return Err(KError::DimensionMismatch { expected: partition.len(), found: thickness.len() });
        }
        let mesh = global.mesh();
        let spacing = mesh.spacing();
        let mut entries = Vec::with_capacity(partition.len());
        for (sub, t) in partition.subdomains().iter().zip(thickness) {
            let sub_mesh = CartesianMesh::from_box(&sub.bbox, &spacing)?;
            if sub_mesh.num_elements() != sub.elements.len() {
                return Err(KError::Unsupported("subdomain is not an axis-aligned box of global elements"));
            }
            let dof2global = locate_all(&sub_mesh, mesh)?;

            let snapped = snap(t, &spacing, mesh.dimension());
            if snapped != *t {
                debug!("subdomain {}: absorbing thickness {:?} meshed as {:?}", sub.id, t, snapped);
            }
            let pml_mesh = CartesianMesh::from_box(&snapped.extend(&sub.bbox), &spacing)?;
            let dof2pml = locate_all(&sub_mesh, &pml_mesh)?;
            debug!(
                "subdomain {}: {} local unknowns, {} with absorbing layers",
                sub.id,
                dof2global.len(),
                pml_mesh.num_vertices()
            );
            entries.push(DofMapEntry {
                space: H1Space::new(sub_mesh),
                pml_space: H1Space::new(pml_mesh),
                thickness: snapped,
                dof2global,
                dof2pml,
            });
        }
        Ok(DofMap { global_size: global.true_vsize(), entries })
    }

    /// True size of the global space.
    pub fn global_size(&self) -> usize {
        self.global_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DofMapEntry] {
        &self.entries
    }

    pub fn entry(&self, p: usize) -> &DofMapEntry {
        &self.entries[p]
    }
}

/// For every vertex of `from`, the vertex of `into` at the same point.
fn locate_all(from: &CartesianMesh, into: &CartesianMesh) -> Result<Vec<usize>, KError> {
    (0..from.num_vertices())
        .map(|v| {
            into.locate_vertex(from.vertex(v))
                .ok_or(KError::Unsupported("subdomain vertices do not coincide with the enclosing mesh"))
        })
        .collect()
}

/// Round each thickness up to whole layers of `spacing`.
fn snap(t: &LayerThickness, spacing: &[f64; 3], dim: usize) -> LayerThickness {
    // multiples of h up to rounding noise keep their layer count
    let layers = |len: f64, h: f64| (len / h - 1e-9).ceil().max(0.0);
    let mut out = LayerThickness::zero();
    for d in 0..dim {
        out.lower[d] = layers(t.lower[d], spacing[d]) * spacing[d];
        out.upper[d] = layers(t.upper[d], spacing[d]) * spacing[d];
    }
    out
}
