//! Statistics reported by a solve.

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T> SolveStats<T> {
    /// Stats of a direct solve: one step, converged.
    pub fn direct(final_residual: T) -> Self {
        SolveStats { iterations: 1, final_residual, converged: true }
    }
}
