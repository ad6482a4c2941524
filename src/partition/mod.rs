//! Geometric partitioning of a mesh into an ordered sequence of subdomains.
//!
//! Elements are assigned to the cells of a logical `nx × ny × nz` grid by centroid. The
//! overlapping variants grow those slabs by layers of vertex-adjacent elements.

use crate::error::KError;
use crate::mesh::{BoundingBox, GeometryKind, Mesh};

/// Logical subdomain grid. Axes that are not decomposed have count 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridShape {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        GridShape { nx, ny, nz }
    }

    /// `n` subdomains along `axis`, one along the others.
    pub fn along(axis: usize, n: usize) -> Self {
        let mut c = [1; 3];
        c[axis.min(2)] = n;
        GridShape::new(c[0], c[1], c[2])
    }

    pub fn count(&self, axis: usize) -> usize {
        [self.nx, self.ny, self.nz][axis]
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Axes with more than one subdomain.
    pub fn active_axes(&self) -> Vec<usize> {
        (0..3).filter(|&a| self.count(a) > 1).collect()
    }

    /// Linear id `i + nx (j + ny k)`.
    pub fn id(&self, ijk: [usize; 3]) -> usize {
        ijk[0] + self.nx * (ijk[1] + self.ny * ijk[2])
    }

    /// Inverse of [`GridShape::id`].
    pub fn ijk(&self, id: usize) -> [usize; 3] {
        let i = id % self.nx;
        let j = (id / self.nx) % self.ny;
        let k = id / (self.nx * self.ny);
        [i, j, k]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    NonOverlapping,
    /// Slabs grown forward along the decomposed axis; one subdomain per internal interface.
    OverlappingOneSided,
    /// Slabs grown in every direction.
    OverlappingTwoSided,
}

/// One subdomain: its element set, grid coordinate and bounding box.
#[derive(Debug, Clone)]
pub struct Subdomain {
    pub id: usize,
    pub ijk: [usize; 3],
    pub elements: Vec<usize>,
    pub bbox: BoundingBox,
}

/// Ordered subdomains of one partition kind. Immutable once built.
#[derive(Debug, Clone)]
pub struct Partition {
    kind: PartitionKind,
    grid: GridShape,
    subdomains: Vec<Subdomain>,
}

impl Partition {
    pub fn kind(&self) -> PartitionKind {
        self.kind
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.subdomains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty()
    }

    pub fn subdomains(&self) -> &[Subdomain] {
        &self.subdomains
    }

    pub fn subdomain(&self, id: usize) -> &Subdomain {
        &self.subdomains[id]
    }
}

/// Check that `slabs` has exactly one more subdomain than `overlapping`.
pub fn validate_sweep_pair(overlapping: &Partition, slabs: &Partition) -> Result<(), KError> {
    if slabs.len() != overlapping.len() + 1 {
        return Err(KError::PartitionMismatch { overlapping: overlapping.len(), non_overlapping: slabs.len() });
    }
    Ok(())
}

/// Builds partitions of a mesh on a fixed subdomain grid.
#[derive(Debug, Clone)]
pub struct Partitioner {
    grid: GridShape,
    overlap_layers: usize,
}

impl Partitioner {
    pub fn new(grid: GridShape) -> Self {
        Partitioner { grid, overlap_layers: 1 }
    }

    /// Element layers added by the overlapping kinds.
    pub fn with_overlap(mut self, layers: usize) -> Self {
        self.overlap_layers = layers;
        self
    }

    pub fn partition<M: Mesh>(&self, mesh: &M, kind: PartitionKind) -> Result<Partition, KError> {
        match mesh.geometry() {
            GeometryKind::Linear => {}
            GeometryKind::Curved { .. } => {
                return Err(KError::UnsupportedGeometry("curved element geometry cannot be partitioned"));
            }
            GeometryKind::Nurbs => return Err(KError::UnsupportedGeometry("NURBS meshes cannot be partitioned")),
        }
        let dim = mesh.dimension();
        if self.grid.is_empty() || (dim..3).any(|a| self.grid.count(a) != 1) {
            return Err(KError::InvalidConfig(format!(
                "grid {:?} does not fit a {}-dimensional mesh",
                self.grid, dim
            )));
        }

        let bbox = mesh.bounding_box();
        let slabs = self.slabs(mesh, &bbox)?;

        let (grid, sets) = match kind {
            PartitionKind::NonOverlapping => (self.grid, slabs),
            PartitionKind::OverlappingOneSided => {
                let axes = self.grid.active_axes();
                if axes.len() != 1 {
                    return Err(KError::Unsupported("one-sided overlap needs exactly one decomposed axis"));
                }
                let axis = axes[0];
                let n = self.grid.count(axis);
                let width = bbox.extent(axis) / n as f64;
                let adjacency = vertex_elements(mesh);
                let sets: Vec<Vec<usize>> = (0..n - 1)
                    .map(|p| {
                        let cut = bbox.min[axis] + (p + 1) as f64 * width;
                        grow(mesh, &slabs[p], self.overlap_layers, &adjacency, |e| {
                            mesh.element_centroid(e)[axis] > cut
                        })
                    })
                    .collect();
                (GridShape::along(axis, n - 1), sets)
            }
            PartitionKind::OverlappingTwoSided => {
                let adjacency = vertex_elements(mesh);
                let sets: Vec<Vec<usize>> = slabs
                    .iter()
                    .map(|slab| grow(mesh, slab, self.overlap_layers, &adjacency, |_| true))
                    .collect();
                (self.grid, sets)
            }
        };

        let subdomains = sets
            .into_iter()
            .enumerate()
            .map(|(id, elements)| Subdomain { id, ijk: grid.ijk(id), bbox: mesh.elements_bounding_box(&elements), elements })
            .collect();
        Ok(Partition { kind, grid, subdomains })
    }

    /// Non-overlapping element sets indexed by grid id.
    fn slabs<M: Mesh>(&self, mesh: &M, bbox: &BoundingBox) -> Result<Vec<Vec<usize>>, KError> {
        let mut sets = vec![Vec::new(); self.grid.len()];
        for e in 0..mesh.num_elements() {
            let c = mesh.element_centroid(e);
            let mut ijk = [0usize; 3];
            for a in 0..mesh.dimension() {
                let n = self.grid.count(a);
                let width = bbox.extent(a) / n as f64;
                let cell = ((c[a] - bbox.min[a]) / width).floor().max(0.0) as usize;
                ijk[a] = cell.min(n - 1);
            }
            sets[self.grid.id(ijk)].push(e);
        }
        if let Some(id) = sets.iter().position(|s| s.is_empty()) {
            return Err(KError::InvalidConfig(format!("subdomain {} of grid {:?} holds no elements", id, self.grid)));
        }
        Ok(sets)
    }
}

/// Elements touching each vertex.
fn vertex_elements<M: Mesh>(mesh: &M) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); mesh.num_vertices()];
    for e in 0..mesh.num_elements() {
        for &v in mesh.element_vertices(e) {
            adj[v].push(e);
        }
    }
    adj
}

/// Grow `seed` by `layers` rings of vertex-adjacent elements accepted by `admit`.
fn grow<M: Mesh>(
    mesh: &M,
    seed: &[usize],
    layers: usize,
    adjacency: &[Vec<usize>],
    admit: impl Fn(usize) -> bool,
) -> Vec<usize> {
    let mut inside = vec![false; mesh.num_elements()];
    seed.iter().for_each(|&e| inside[e] = true);
    let mut front = seed.to_vec();
    for _ in 0..layers {
        let mut next = Vec::new();
        for &e in &front {
            for &v in mesh.element_vertices(e) {
                for &nb in &adjacency[v] {
                    if !inside[nb] && admit(nb) {
                        inside[nb] = true;
                        next.push(nb);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        front = next;
    }
    (0..inside.len()).filter(|&e| inside[e]).collect()
}
