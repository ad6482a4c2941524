//! Complex vectors stored as two real blocks `[re; im]`.
//!
//! Index maps act on both halves at once: index `i` in a map of a vector of true size `n`
//! addresses entries `i` and `i + n`.

use num_complex::Complex64;

/// A real vector of length `2n` holding the real parts then the imaginary parts.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockVec {
    data: Vec<f64>,
}

impl BlockVec {
    pub fn zeros(n: usize) -> Self {
        BlockVec { data: vec![0.0; 2 * n] }
    }

    /// Wrap an existing `[re; im]` buffer. Its length must be even.
    pub fn from_vec(data: Vec<f64>) -> Self {
        debug_assert!(data.len() % 2 == 0);
        BlockVec { data }
    }

    pub fn from_complex(values: &[Complex64]) -> Self {
        let n = values.len();
        let mut data = vec![0.0; 2 * n];
        for (i, v) in values.iter().enumerate() {
            data[i] = v.re;
            data[i + n] = v.im;
        }
        BlockVec { data }
    }

    /// True size `n`.
    pub fn half_len(&self) -> usize {
        self.data.len() / 2
    }

    pub fn get(&self, i: usize) -> Complex64 {
        let n = self.half_len();
        Complex64::new(self.data[i], self.data[i + n])
    }

    pub fn set(&mut self, i: usize, v: Complex64) {
        let n = self.half_len();
        self.data[i] = v.re;
        self.data[i + n] = v.im;
    }

    pub fn to_complex(&self) -> Vec<Complex64> {
        (0..self.half_len()).map(|i| self.get(i)).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Euclidean norm over both halves.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// `dst[i] = src[idx[i]]` on both halves.
pub fn gather(src: &[f64], idx: &[usize], dst: &mut [f64]) {
    let n = src.len() / 2;
    let m = idx.len();
    debug_assert_eq!(dst.len(), 2 * m);
    for (i, &g) in idx.iter().enumerate() {
        dst[i] = src[g];
        dst[i + m] = src[g + n];
    }
}

/// `dst[idx[i]] = src[i]` on both halves. Entries of `dst` not in `idx` are untouched.
pub fn scatter(src: &[f64], idx: &[usize], dst: &mut [f64]) {
    let n = dst.len() / 2;
    let m = idx.len();
    debug_assert_eq!(src.len(), 2 * m);
    for (i, &g) in idx.iter().enumerate() {
        dst[g] = src[i];
        dst[g + n] = src[i + m];
    }
}

/// `dst[idx[i]] += src[i]` on both halves.
pub fn scatter_add(src: &[f64], idx: &[usize], dst: &mut [f64]) {
    let n = dst.len() / 2;
    let m = idx.len();
    debug_assert_eq!(src.len(), 2 * m);
    for (i, &g) in idx.iter().enumerate() {
        dst[g] += src[i];
        dst[g + n] += src[i + m];
    }
}

/// Copy entries listed in `idx` from `src` into `dst` (both of true size `n`).
pub fn copy_entries(src: &[f64], idx: &[usize], dst: &mut [f64]) {
    let n = dst.len() / 2;
    debug_assert_eq!(src.len(), dst.len());
    for &g in idx {
        dst[g] = src[g];
        dst[g + n] = src[g + n];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_then_scatter_restores_selection() {
        let src = vec![1.0, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 40.0];
        let idx = [3, 1];
        let mut local = vec![0.0; 4];
        gather(&src, &idx, &mut local);
        assert_eq!(local, vec![4.0, 2.0, 40.0, 20.0]);

        let mut back = vec![0.0; 8];
        scatter(&local, &idx, &mut back);
        assert_eq!(back, vec![0.0, 2.0, 0.0, 4.0, 0.0, 20.0, 0.0, 40.0]);
        scatter_add(&local, &idx, &mut back);
        assert_eq!(back[3], 8.0);
        assert_eq!(back[5], 40.0);
    }

    #[test]
    fn complex_view() {
        let v = BlockVec::from_complex(&[Complex64::new(1.0, -1.0), Complex64::new(0.5, 2.0)]);
        assert_eq!(v.as_slice(), &[1.0, 0.5, -1.0, 2.0]);
        assert_eq!(v.get(1), Complex64::new(0.5, 2.0));
        assert_eq!(v.to_complex().len(), 2);
    }
}
