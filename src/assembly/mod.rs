//! Assembly of the coordinate-stretched Helmholtz operator
//!
//! ```text
//! a(u, v) = ∫ (det J · J⁻¹J⁻ᵀ) ∇u · ∇v  −  ω² ws det J u v
//! ```
//!
//! on order-1 tensor-product elements of an [`H1Space`], with the stretch `J` of a
//! [`CartesianPml`] and material coefficient `ws`.

pub mod coefficient;
pub mod quadrature;

pub use coefficient::{Coefficient, ConstantCoefficient};

use num_complex::Complex64;

use crate::error::KError;
use crate::matrix::CsrMatrix;
use crate::mesh::Mesh;
use crate::pml::CartesianPml;
use crate::space::{DiscreteSpace, H1Space};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Assembles the stretched Helmholtz sesquilinear form.
pub struct HelmholtzAssembler<'a> {
    omega: f64,
    material: &'a dyn Coefficient,
}

impl<'a> HelmholtzAssembler<'a> {
    pub fn new(omega: f64, material: &'a dyn Coefficient) -> Self {
        HelmholtzAssembler { omega, material }
    }

    /// Global complex matrix of `space` under the stretch `pml`.
    pub fn assemble(&self, space: &H1Space, pml: &CartesianPml) -> Result<CsrMatrix<Complex64>, KError> {
        let mesh = space.mesh();
        let ne = mesh.num_elements();
        let rule = quadrature::tensor_rule(mesh.dimension(), space.tag().order + 2);

        #[cfg(feature = "rayon")]
        let locals: Vec<_> = (0..ne).into_par_iter().map(|e| self.element_matrix(space, pml, &rule, e)).collect();
        #[cfg(not(feature = "rayon"))]
        let locals: Vec<_> = (0..ne).map(|e| self.element_matrix(space, pml, &rule, e)).collect();

        let mut triplets = Vec::with_capacity(locals.iter().map(|l| l.len()).sum());
        locals.into_iter().for_each(|l| triplets.extend(l));
        let n = space.true_vsize();
        CsrMatrix::from_triplets(n, n, triplets)
    }

    fn element_matrix(
        &self,
        space: &H1Space,
        pml: &CartesianPml,
        rule: &[([f64; 3], f64)],
        e: usize,
    ) -> Vec<(usize, usize, Complex64)> {
        let mesh = space.mesh();
        let dim = mesh.dimension();
        let h = mesh.spacing();
        let dofs = space.element_dofs(e);
        let nb = dofs.len();
        let corner = mesh.vertex(dofs[0]);
        let volume: f64 = h[..dim].iter().product();
        let omega2 = self.omega * self.omega;

        let mut local = vec![Complex64::new(0.0, 0.0); nb * nb];
        let mut phi = vec![0.0; nb];
        let mut grad = vec![[0.0; 3]; nb];
        let mut x = [0.0; 3];
        for (xi, w) in rule {
            for d in 0..dim {
                x[d] = corner[d] + xi[d] * h[d];
            }
            shape(dim, xi, &h, &mut phi, &mut grad);

            let jw = w * volume;
            let tensor = pml.stiffness_tensor(&x[..dim]);
            let mass = -omega2 * self.material.eval(&x[..dim]) * pml.det_j(&x[..dim]);
            for a in 0..nb {
                for b in 0..nb {
                    let mut k = mass * (phi[a] * phi[b]);
                    for d in 0..dim {
                        k += tensor[d] * (grad[a][d] * grad[b][d]);
                    }
                    local[a * nb + b] += k * jw;
                }
            }
        }

        let mut out = Vec::with_capacity(nb * nb);
        for a in 0..nb {
            for b in 0..nb {
                out.push((dofs[a], dofs[b], local[a * nb + b]));
            }
        }
        out
    }
}

/// Q1 shape values and physical gradients at reference point `xi`, corners in tensor order.
fn shape(dim: usize, xi: &[f64; 3], h: &[f64; 3], phi: &mut [f64], grad: &mut [[f64; 3]]) {
    for (b, (p, g)) in phi.iter_mut().zip(grad.iter_mut()).enumerate() {
        let mut value = 1.0;
        let mut factors = [0.0; 3];
        let mut slopes = [0.0; 3];
        for d in 0..dim {
            let upper = (b >> d) & 1 == 1;
            factors[d] = if upper { xi[d] } else { 1.0 - xi[d] };
            slopes[d] = if upper { 1.0 / h[d] } else { -1.0 / h[d] };
            value *= factors[d];
        }
        *p = value;
        for d in 0..dim {
            g[d] = (0..dim).filter(|&k| k != d).fold(slopes[d], |acc, k| acc * factors[k]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh;
    use crate::pml::LayerThickness;
    use approx::assert_relative_eq;

    #[test]
    fn laplacian_1d_stencil() {
        let space = H1Space::new(CartesianMesh::new(&[0.0], &[1.0], &[4]).unwrap());
        let pml = CartesianPml::new(space.mesh().bounding_box(), LayerThickness::zero(), 0.0);
        let ws = ConstantCoefficient(1.0);
        let a = HelmholtzAssembler::new(0.0, &ws).assemble(&space, &pml).unwrap();
        // 1/h = 4
        assert_relative_eq!(a.get(2, 2).re, 8.0, epsilon = 1e-12);
        assert_relative_eq!(a.get(2, 1).re, -4.0, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 0).re, 4.0, epsilon = 1e-12);
        assert_eq!(a.get(2, 2).im, 0.0);
    }

    #[test]
    fn mass_term_integrates_material() {
        let space = H1Space::new(CartesianMesh::new(&[0.0, 0.0], &[1.0, 1.0], &[2, 2]).unwrap());
        let pml = CartesianPml::new(space.mesh().bounding_box(), LayerThickness::zero(), 2.0);
        let ws = ConstantCoefficient(3.0);
        let a = HelmholtzAssembler::new(2.0, &ws).assemble(&space, &pml).unwrap();
        // row sums of the stiffness vanish, so the total is -ω² ∫ ws = -12
        let total: f64 = a.triplets().iter().map(|t| t.2.re).sum();
        assert_relative_eq!(total, -12.0, epsilon = 1e-10);
    }
}
