//! Discretization spaces.
//!
//! Each space carries an explicit [`SpaceTag`] set at construction; consumers consult the tag
//! instead of inspecting the concrete space type.

use crate::mesh::{CartesianMesh, Mesh, Sides};

/// Inter-element continuity class of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// Continuous (nodal Lagrange).
    H1,
    /// Discontinuous.
    L2,
}

/// Polynomial order and continuity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceTag {
    pub order: usize,
    pub continuity: Continuity,
}

impl SpaceTag {
    /// True for spaces whose unknowns are point values at mesh vertices.
    pub fn is_vertex_nodal(&self) -> bool {
        self.order == 1 && self.continuity == Continuity::H1
    }
}

/// Unknown counts and numbering of a discretization space.
pub trait DiscreteSpace {
    fn tag(&self) -> SpaceTag;
    /// Number of true (globally addressable) unknowns.
    fn true_vsize(&self) -> usize;
    /// Unknowns attached to element `e`, in the element's local order.
    fn element_dofs(&self, e: usize) -> &[usize];
    /// Unknowns on the given boundary sides.
    fn essential_true_dofs(&self, sides: Sides) -> Vec<usize>;
}

/// Order-1 continuous Lagrange space on a [`CartesianMesh`]; true unknowns are vertices.
#[derive(Debug, Clone)]
pub struct H1Space {
    mesh: CartesianMesh,
    tag: SpaceTag,
}

impl H1Space {
    pub fn new(mesh: CartesianMesh) -> Self {
        H1Space { mesh, tag: SpaceTag { order: 1, continuity: Continuity::H1 } }
    }

    pub fn mesh(&self) -> &CartesianMesh {
        &self.mesh
    }

    /// Coordinates of unknown `i`.
    pub fn dof_coordinates(&self, i: usize) -> &[f64] {
        self.mesh.vertex(i)
    }
}

impl DiscreteSpace for H1Space {
    fn tag(&self) -> SpaceTag {
        self.tag
    }

    fn true_vsize(&self) -> usize {
        self.mesh.num_vertices()
    }

    fn element_dofs(&self, e: usize) -> &[usize] {
        self.mesh.element_vertices(e)
    }

    fn essential_true_dofs(&self, sides: Sides) -> Vec<usize> {
        self.mesh.boundary_vertices(sides)
    }
}
