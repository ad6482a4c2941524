//! Small helpers shared by the preconditioner: block real/imaginary vectors and solve stats.

pub mod blockvec;
pub mod convergence;

pub use blockvec::BlockVec;
