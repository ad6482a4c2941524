//! Absorbing-layer subdomain systems.
//!
//! For each overlapping subdomain the [`LocalSystemBuilder`] assembles the stretched Helmholtz
//! operator on the absorbing-layer-extended space, eliminates its outer boundary, converts it
//! to real block form and factorizes it once. The resulting [`LocalSystem`] is read-only.

use std::sync::Arc;

use log::debug;

use crate::assembly::{Coefficient, HelmholtzAssembler};
use crate::dofmap::DofMapEntry;
use crate::error::KError;
use crate::matrix::{CsrMatrix, SparseMatrix};
use crate::mesh::{BoundingBox, Mesh, Sides};
use crate::pml::{CartesianPml, LayerThickness};
use crate::solver::SparseLuSolver;
use crate::space::{DiscreteSpace, H1Space};

/// Absorbing thickness of overlapping subdomain `p` out of `nrpatch` along `axis`.
///
/// Every side of the sweep axis gets `layers · h`; the sides terminating the domain (lower side
/// of the first subdomain, upper side of the last) and all transverse sides get `global`.
pub fn layer_thickness(
    p: usize,
    nrpatch: usize,
    axis: usize,
    layers: usize,
    h: f64,
    global: &LayerThickness,
) -> LayerThickness {
    let mut out = *global;
    let local = layers as f64 * h;
    out.lower[axis] = if p == 0 { global.lower[axis] } else { local };
    out.upper[axis] = if p + 1 == nrpatch { global.upper[axis] } else { local };
    out
}

/// Builds and factorizes subdomain systems.
#[derive(Clone)]
pub struct LocalSystemBuilder {
    omega: f64,
    material: Arc<dyn Coefficient>,
    threshold: f64,
}

impl LocalSystemBuilder {
    pub fn new(omega: f64, material: Arc<dyn Coefficient>, threshold: f64) -> Self {
        LocalSystemBuilder { omega, material, threshold }
    }

    /// Real block matrix of the stretched operator on `pml_space`, whose physical part is
    /// `inner` and whose layers have the given thickness.
    pub fn assemble(
        &self,
        pml_space: &H1Space,
        inner: BoundingBox,
        thickness: LayerThickness,
    ) -> Result<CsrMatrix<f64>, KError> {
        let pml = CartesianPml::new(inner, thickness, self.omega);
        let complex = HelmholtzAssembler::new(self.omega, self.material.as_ref()).assemble(pml_space, &pml)?;
        let essential = pml_space.essential_true_dofs(Sides::all_for(pml_space.mesh().dimension()));
        complex.eliminate_dofs(&essential)?.to_real_block(self.threshold)
    }

    /// Assemble and factorize the system of subdomain `p`.
    pub fn build(&self, p: usize, entry: &DofMapEntry) -> Result<LocalSystem, KError> {
        let matrix = self.assemble(entry.pml_space(), entry.bbox(), *entry.thickness())?;
        let mut solver = SparseLuSolver::new();
        solver
            .factorize(&matrix)
            .map_err(|e| KError::SingularSystem { subdomain: p, reason: e.to_string() })?;
        debug!("subdomain {p}: factorized {} x {} system with {} nonzeros", matrix.nrows(), matrix.ncols(), matrix.nnz());
        Ok(LocalSystem { id: p, matrix, solver })
    }
}

/// A factorized subdomain system in real block form.
pub struct LocalSystem {
    id: usize,
    matrix: CsrMatrix<f64>,
    solver: SparseLuSolver,
}

impl LocalSystem {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Block size `2 n` of the extended space.
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// `x = A⁻¹ b` with the cached factorization.
    pub fn solve(&self, b: &[f64], x: &mut [f64]) -> Result<(), KError> {
        self.solver.solve_cached(b, x)
    }

    /// `y = A x`.
    pub fn apply(&self, x: &[f64], y: &mut [f64]) {
        #[cfg(feature = "rayon")]
        self.matrix.spmv_parallel(x, y);
        #[cfg(not(feature = "rayon"))]
        self.matrix.spmv(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_subdomains_take_global_thickness() {
        let global = LayerThickness::uniform(2, 2.0);
        let first = layer_thickness(0, 3, 0, 4, 0.25, &global);
        assert_eq!((first.lower[0], first.upper[0]), (2.0, 1.0));
        let mid = layer_thickness(1, 3, 0, 4, 0.125, &global);
        assert_eq!((mid.lower[0], mid.upper[0]), (0.5, 0.5));
        assert_eq!(mid.lower[1], 2.0);
        let last = layer_thickness(2, 3, 0, 4, 0.125, &global);
        assert_eq!((last.lower[0], last.upper[0]), (0.5, 2.0));
        let only = layer_thickness(0, 1, 0, 4, 0.125, &global);
        assert_eq!((only.lower[0], only.upper[0]), (2.0, 2.0));
    }
}
