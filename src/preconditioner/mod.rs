//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait and the source-transfer sweeping
//! preconditioner built from a cutoff window and a sweep engine.

use crate::error::KError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), KError>;
    /// Length of the vectors `apply` accepts.
    fn size(&self) -> usize;
}

pub mod cutoff;
pub mod source_transfer;
pub mod sweep;

// Re-exports for convenience
pub use cutoff::{CutoffWindow, Direction};
pub use source_transfer::SourceTransfer;
pub use sweep::{SweepEngine, SweepStep};
