//! Direct solver interfaces.

use crate::utils::convergence::SolveStats;

/// Common interface for any direct or iterative solver.
pub trait LinearSolver<M, V> {
    type Error;
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Solve A·x = b, writing result into `x`.
    /// Returns solve stats (including convergence info).
    fn solve(&mut self, a: &M, b: &V, x: &mut V) -> Result<SolveStats<Self::Scalar>, Self::Error>;
}

pub mod sparse_lu;
pub use sparse_lu::SparseLuSolver;
