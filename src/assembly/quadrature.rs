//! Gauss-Legendre rules on the unit interval and their tensor products.

use std::f64::consts::PI;

/// Newton iterations for the Legendre roots.
const MAX_NEWTON: usize = 100;

/// `n`-point Gauss-Legendre rule on `[0, 1]` as `(points, weights)`.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(1);
    let mut x = vec![0.0; n];
    let mut w = vec![0.0; n];
    for i in 0..n.div_ceil(2) {
        // Chebyshev-like initial guess for the i-th root on [-1, 1]
        let mut z = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..MAX_NEWTON {
            let (p, d) = legendre(n, z);
            let dz = p / d;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre(n, z);
        let weight = 2.0 / ((1.0 - z * z) * dp * dp);
        // map [-1, 1] to [0, 1]
        x[i] = 0.5 * (1.0 - z);
        x[n - 1 - i] = 0.5 * (1.0 + z);
        w[i] = 0.5 * weight;
        w[n - 1 - i] = 0.5 * weight;
    }
    (x, w)
}

/// `P_n(z)` and `P_n'(z)` by the three-term recurrence.
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = z;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let p2 = ((2 * k - 1) as f64 * z * p1 - (k - 1) as f64 * p0) / k as f64;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (z * p1 - p0) / (z * z - 1.0);
    (p1, dp)
}

/// Tensor-product rule on `[0, 1]^dim` with `n` points per axis.
pub fn tensor_rule(dim: usize, n: usize) -> Vec<([f64; 3], f64)> {
    let (x, w) = gauss_legendre(n);
    let total = n.pow(dim as u32);
    let mut rule = Vec::with_capacity(total);
    for flat in 0..total {
        let mut p = [0.0; 3];
        let mut weight = 1.0;
        let mut rest = flat;
        for pd in p.iter_mut().take(dim) {
            let k = rest % n;
            rest /= n;
            *pd = x[k];
            weight *= w[k];
        }
        rule.push((p, weight));
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn integrates_polynomials_exactly() {
        for n in 1..6 {
            let (x, w) = gauss_legendre(n);
            assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-13);
            // degree 2n - 1 is exact
            let deg = 2 * n - 1;
            let integral: f64 = x.iter().zip(&w).map(|(xi, wi)| wi * xi.powi(deg as i32)).sum();
            assert_relative_eq!(integral, 1.0 / (deg as f64 + 1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn tensor_rule_weights_sum_to_one() {
        let rule = tensor_rule(3, 3);
        assert_eq!(rule.len(), 27);
        assert_relative_eq!(rule.iter().map(|(_, w)| w).sum::<f64>(), 1.0, epsilon = 1e-13);
    }
}
