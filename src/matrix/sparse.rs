// SparseMatrix trait and the faer-backed CSR storage used for local systems

use faer::sparse::linalg::matmul::dense_sparse_matmul;
use faer::sparse::{SparseRowMat, Triplet};
use faer::traits::ComplexField;
use faer::{Accum, MatMut, MatRef, Par};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::ops::Mul;

use crate::error::KError;

/// A read‐only sparse matrix supporting y = A * x.
pub trait SparseMatrix<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]);
}

/// Compressed sparse row matrix over faer's `SparseRowMat`, with sorted, duplicate-free
/// column indices per row.
#[derive(Debug, Clone)]
pub struct CsrMatrix<T> {
    inner: SparseRowMat<usize, T>,
}

impl<T: ComplexField + Copy + Zero> CsrMatrix<T> {
    /// Build from `(row, col, value)` entries; duplicates are summed.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, T)>) -> Result<Self, KError> {
        let entries: Vec<Triplet<usize, usize, T>> =
            triplets.into_iter().map(|(i, j, v)| Triplet::new(i, j, v)).collect();
        let inner = SparseRowMat::try_new_from_triplets(nrows, ncols, &entries)
            .map_err(|e| KError::MatrixError(format!("{e:?}")))?;
        Ok(Self { inner })
    }

    /// The underlying faer matrix.
    pub fn inner(&self) -> &SparseRowMat<usize, T> {
        &self.inner
    }

    pub fn nnz(&self) -> usize {
        self.inner.val().len()
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[T]) {
        (self.inner.symbolic().col_idx_of_row_raw(i), self.inner.val_of_row(i))
    }

    /// Entry `(i, j)`, zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> T {
        self.inner.get(i, j).copied().unwrap_or_else(T::zero)
    }

    /// All stored entries in row-major order.
    pub fn triplets(&self) -> Vec<(usize, usize, T)> {
        self.inner.triplet_iter().map(|t| (t.row, t.col, *t.val)).collect()
    }
}

impl<T: ComplexField + Copy + Zero + One> CsrMatrix<T> {
    /// Essential elimination: zero the rows and columns of `dofs` and put 1 on their diagonal.
    pub fn eliminate_dofs(&self, dofs: &[usize]) -> Result<Self, KError> {
        let mut essential = vec![false; self.nrows().max(self.ncols())];
        dofs.iter().for_each(|&d| essential[d] = true);
        let mut kept: Vec<_> =
            self.triplets().into_iter().filter(|&(i, j, _)| !essential[i] && !essential[j]).collect();
        kept.extend(dofs.iter().map(|&d| (d, d, T::one())));
        CsrMatrix::from_triplets(self.nrows(), self.ncols(), kept)
    }
}

impl CsrMatrix<Complex64> {
    /// Real block form `[[Re, −Im], [Im, Re]]` acting on `[re; im]` vectors.
    ///
    /// Entries with magnitude not above `threshold` are dropped.
    pub fn to_real_block(&self, threshold: f64) -> Result<CsrMatrix<f64>, KError> {
        let (n, m) = (self.nrows(), self.ncols());
        let mut out = Vec::with_capacity(4 * self.nnz());
        for (i, j, v) in self.triplets() {
            if v.re.abs() > threshold {
                out.push((i, j, v.re));
                out.push((i + n, j + m, v.re));
            }
            if v.im.abs() > threshold {
                out.push((i, j + m, -v.im));
                out.push((i + n, j, v.im));
            }
        }
        CsrMatrix::from_triplets(2 * n, 2 * m, out)
    }
}

impl<T: ComplexField + Copy + Zero + One> SparseMatrix<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        // (A x)ᵀ = xᵀ Aᵀ, with Aᵀ a column-major view of the same storage
        let (n, m) = (self.nrows(), self.ncols());
        let xt = MatRef::from_row_major_slice(x, 1, m);
        let yt = MatMut::from_row_major_slice_mut(y, 1, n);
        dense_sparse_matmul(yt, Accum::Replace, xt, self.inner.as_ref().transpose(), T::one(), Par::Seq);
    }
}

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "rayon")]
impl<T: ComplexField + Copy + Zero + Mul<Output = T> + Send + Sync> CsrMatrix<T> {
    /// Parallel SpMV using Rayon
    pub fn spmv_parallel(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.inner.ncols());
        assert_eq!(y.len(), self.inner.nrows());
        y.par_iter_mut().enumerate().for_each(|(i, yi)| {
            let (cols, vals) = self.row(i);
            *yi = cols.iter().zip(vals).fold(T::zero(), |acc, (&j, &v)| acc + v * x[j]);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiagonal() -> CsrMatrix<f64> {
        CsrMatrix::from_triplets(
            3,
            3,
            vec![(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0), (1, 2, -1.0), (2, 1, -1.0), (2, 2, 2.0)],
        )
        .unwrap()
    }

    #[test]
    fn identity_spmv() {
        let m = CsrMatrix::from_triplets(3, 3, vec![(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0)]).unwrap();
        let x = vec![2.0, 3.0, 5.0];
        let mut y = vec![0.0; 3];
        m.spmv(&x, &mut y);
        assert_eq!(y, x);
    }

    #[test]
    fn triplets_sum_duplicates() {
        // 2×3 matrix [[1,2,0],[0,3,4]] with the (1,1) entry split in two
        let m = CsrMatrix::from_triplets(2, 3, vec![(1, 2, 4.0), (0, 1, 2.0), (1, 1, 1.0), (0, 0, 1.0), (1, 1, 2.0)])
            .unwrap();
        assert_eq!(m.nnz(), 4);
        assert_eq!(m.get(1, 1), 3.0);
        assert_eq!(m.get(0, 2), 0.0);
        assert_eq!(m.row(1), (&[1usize, 2][..], &[3.0, 4.0][..]));
        let mut y = vec![0.0; 2];
        m.spmv(&[1.0, 1.0, 1.0], &mut y);
        assert_eq!(y, vec![3.0, 7.0]);
    }

    #[test]
    fn out_of_range_entry_is_an_error() {
        let r = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (2, 1, 1.0)]);
        assert!(matches!(r, Err(KError::MatrixError(_))));
    }

    #[test]
    fn elimination_keeps_unit_diagonal() {
        let e = tridiagonal().eliminate_dofs(&[0]).unwrap();
        assert_eq!(e.get(0, 0), 1.0);
        assert_eq!(e.get(0, 1), 0.0);
        assert_eq!(e.get(1, 0), 0.0);
        assert_eq!(e.get(1, 1), 2.0);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_spmv_matches_serial() {
        let m = tridiagonal();
        let x = [1.0, -2.0, 0.5];
        let (mut y, mut z) = ([0.0; 3], [0.0; 3]);
        m.spmv(&x, &mut y);
        m.spmv_parallel(&x, &mut z);
        assert_eq!(y, z);
        assert_eq!(y, [4.0, -5.5, 3.0]);
    }

    #[test]
    fn real_block_matches_complex_product() {
        let a = CsrMatrix::from_triplets(
            2,
            2,
            vec![(0, 0, Complex64::new(1.0, 2.0)), (0, 1, Complex64::new(0.0, -1.0)), (1, 1, Complex64::new(3.0, 0.0))],
        )
        .unwrap();
        let x = [Complex64::new(1.0, 1.0), Complex64::new(-2.0, 0.5)];
        let mut y = [Complex64::new(0.0, 0.0); 2];
        a.spmv(&x, &mut y);

        let b = a.to_real_block(0.0).unwrap();
        assert_eq!(b.nrows(), 4);
        let xr = [x[0].re, x[1].re, x[0].im, x[1].im];
        let mut yr = [0.0; 4];
        b.spmv(&xr, &mut yr);
        for i in 0..2 {
            assert!((yr[i] - y[i].re).abs() < 1e-14);
            assert!((yr[i + 2] - y[i].im).abs() < 1e-14);
        }
    }
}
