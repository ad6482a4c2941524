//! Perfectly matched layers on axis-aligned boxes.
//!
//! A [`CartesianPml`] surrounds a physical box with absorbing layers of prescribed thickness.
//! Inside a layer the coordinate along its axis is stretched by
//! `s(d) = 1 + i (n c / (ω Lⁿ)) dⁿ⁻¹` with `n = 2`, `c = 5`, where `d` is the depth into the
//! layer and `L` its thickness.

use num_complex::Complex64;

use crate::mesh::BoundingBox;

/// Polynomial degree of the absorption profile.
const PROFILE_POWER: i32 = 2;
/// Absorption strength.
const PROFILE_STRENGTH: f64 = 5.0;

/// Absorbing thickness on the lower and upper side of each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerThickness {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl LayerThickness {
    pub fn zero() -> Self {
        LayerThickness::default()
    }

    /// The same thickness on both sides of the first `dim` axes.
    pub fn uniform(dim: usize, t: f64) -> Self {
        let mut out = LayerThickness::zero();
        for d in 0..dim.min(3) {
            out.lower[d] = t;
            out.upper[d] = t;
        }
        out
    }

    pub fn is_valid(&self) -> bool {
        self.lower.iter().chain(self.upper.iter()).all(|t| t.is_finite() && *t >= 0.0)
    }

    /// `inner` grown by this thickness.
    pub fn extend(&self, inner: &BoundingBox) -> BoundingBox {
        let mut out = *inner;
        for d in 0..inner.dim {
            out.min[d] -= self.lower[d];
            out.max[d] += self.upper[d];
        }
        out
    }
}

/// Complex coordinate stretch around a physical box.
#[derive(Debug, Clone)]
pub struct CartesianPml {
    inner: BoundingBox,
    thickness: LayerThickness,
    omega: f64,
}

impl CartesianPml {
    /// `inner` is the physical (unstretched) box; `thickness` the layers around it.
    pub fn new(inner: BoundingBox, thickness: LayerThickness, omega: f64) -> Self {
        CartesianPml { inner, thickness, omega }
    }

    pub fn outer(&self) -> BoundingBox {
        self.thickness.extend(&self.inner)
    }

    /// Stretch factors `s_d(x)` per axis; 1 on unused axes and outside the layers.
    pub fn stretch(&self, x: &[f64]) -> [Complex64; 3] {
        let mut s = [Complex64::new(1.0, 0.0); 3];
        if self.omega <= 0.0 {
            return s;
        }
        for d in 0..self.inner.dim {
            let (depth, width) = if x[d] > self.inner.max[d] {
                (x[d] - self.inner.max[d], self.thickness.upper[d])
            } else if x[d] < self.inner.min[d] {
                (self.inner.min[d] - x[d], self.thickness.lower[d])
            } else {
                continue;
            };
            if width <= 0.0 {
                continue;
            }
            let coeff = PROFILE_POWER as f64 * PROFILE_STRENGTH / (self.omega * width.powi(PROFILE_POWER));
            s[d] = Complex64::new(1.0, coeff * depth.powi(PROFILE_POWER - 1));
        }
        s
    }

    /// Jacobian determinant `Π s_d`.
    pub fn det_j(&self, x: &[f64]) -> Complex64 {
        self.stretch(x).iter().take(self.inner.dim).product()
    }

    /// Diagonal of `det J · J⁻¹ J⁻ᵀ`, i.e. `det J / s_d²`.
    pub fn stiffness_tensor(&self, x: &[f64]) -> [Complex64; 3] {
        let s = self.stretch(x);
        let det: Complex64 = s.iter().take(self.inner.dim).product();
        let mut out = [Complex64::new(0.0, 0.0); 3];
        for d in 0..self.inner.dim {
            out[d] = det / (s[d] * s[d]);
        }
        out
    }
}
