//! Direct sparse solver using Faer's sparse LU factorization.
//!
//! The factorization is computed once by [`SparseLuSolver::factorize`] and then reused by
//! [`SparseLuSolver::solve_cached`] for any number of right-hand sides. After factorizing, a
//! probe solve against a vector of ones checks the factors: non-finite output means the matrix
//! is numerically singular.
//!
//! # References
//! - Faer documentation: https://github.com/sarah-ek/faer-rs
//! - Davis, T. A. (2006). Direct Methods for Sparse Linear Systems. SIAM.

use crate::error::KError;
use crate::matrix::{CsrMatrix, SparseMatrix};
use crate::solver::LinearSolver;
use crate::utils::convergence::SolveStats;
use faer::linalg::solvers::SolveCore;
use faer::sparse::linalg::solvers::Lu;
use faer::{Conj, MatMut};

/// Sparse LU solver with a cached factorization.
pub struct SparseLuSolver {
    factor: Option<Lu<usize, f64>>,
    n: usize,
}

impl SparseLuSolver {
    /// Create a new solver (no factorization yet).
    pub fn new() -> Self {
        SparseLuSolver { factor: None, n: 0 }
    }

    pub fn is_factored(&self) -> bool {
        self.factor.is_some()
    }

    /// Order of the factored matrix.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Factorize `a`, replacing any previous factorization.
    pub fn factorize(&mut self, a: &CsrMatrix<f64>) -> Result<(), KError> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(KError::DimensionMismatch { expected: n, found: a.ncols() });
        }
        let lu = a.inner().sp_lu().map_err(|e| KError::FactorError(format!("{e:?}")))?;
        self.factor = Some(lu);
        self.n = n;

        let mut probe = vec![1.0; n];
        let ones = probe.clone();
        self.solve_cached(&ones, &mut probe)?;
        if probe.iter().any(|v| !v.is_finite()) {
            self.factor = None;
            return Err(KError::FactorError("probe solve produced non-finite values".into()));
        }
        Ok(())
    }

    /// Solve using the cached LU factorization.
    ///
    /// # Arguments
    /// * `b` - Right-hand side vector
    /// * `x` - Output vector (solution)
    pub fn solve_cached(&self, b: &[f64], x: &mut [f64]) -> Result<(), KError> {
        let factor = self
            .factor
            .as_ref()
            .ok_or_else(|| KError::SolveError("solve_cached called before factorization".into()))?;
        if b.len() != self.n || x.len() != self.n {
            return Err(KError::DimensionMismatch { expected: self.n, found: b.len().min(x.len()) });
        }
        x.copy_from_slice(b);
        let x_mat = MatMut::from_column_major_slice_mut(x, self.n, 1);
        factor.solve_in_place_with_conj(Conj::No, x_mat);
        Ok(())
    }
}

impl Default for SparseLuSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSolver<CsrMatrix<f64>, Vec<f64>> for SparseLuSolver {
    type Error = KError;
    type Scalar = f64;

    /// Factorize `a` and solve Ax = b.
    ///
    /// # Returns
    /// * `Ok(SolveStats)` with the residual norm of the computed solution
    fn solve(&mut self, a: &CsrMatrix<f64>, b: &Vec<f64>, x: &mut Vec<f64>) -> Result<SolveStats<f64>, KError> {
        self.factorize(a)?;
        x.resize(b.len(), 0.0);
        self.solve_cached(b, x)?;
        let mut ax = vec![0.0; b.len()];
        a.spmv(x, &mut ax);
        let res = ax.iter().zip(b).map(|(l, r)| (l - r) * (l - r)).sum::<f64>().sqrt();
        Ok(SolveStats::direct(res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lu_solver_solves_sparse_system() {
        // 3x3 system: [[2,1,1],[1,3,2],[1,0,0]] x = [4,5,6]
        // True solution: [6,15,-23]
        let a = CsrMatrix::from_triplets(
            3,
            3,
            vec![(0, 0, 2.0), (0, 1, 1.0), (0, 2, 1.0), (1, 0, 1.0), (1, 1, 3.0), (1, 2, 2.0), (2, 0, 1.0)],
        )
        .unwrap();
        let b = vec![4.0, 5.0, 6.0];
        let mut x = vec![0.0; 3];
        let mut solver = SparseLuSolver::new();
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        let expected = [6.0, 15.0, -23.0];
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < 1e-10, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged);
        assert!(stats.final_residual < 1e-10);
    }

    #[test]
    fn cached_factorization_is_reused() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 4.0), (1, 1, 2.0)]).unwrap();
        let mut solver = SparseLuSolver::new();
        solver.factorize(&a).unwrap();
        let mut x = vec![0.0; 2];
        solver.solve_cached(&[8.0, 2.0], &mut x).unwrap();
        assert_eq!(x, vec![2.0, 1.0]);
        solver.solve_cached(&[4.0, 4.0], &mut x).unwrap();
        assert_eq!(x, vec![1.0, 2.0]);
    }

    #[test]
    fn solve_before_factorize_is_an_error() {
        let solver = SparseLuSolver::new();
        let mut x = vec![0.0; 1];
        assert!(solver.solve_cached(&[1.0], &mut x).is_err());
    }
}
