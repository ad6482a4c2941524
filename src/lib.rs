//! sourcesweep: source-transfer sweeping preconditioner over Faer
//!
//! This crate provides a domain-decomposition preconditioner for complex Helmholtz systems.
//! The domain is cut into a chain of overlapping subdomains, each surrounded by perfectly
//! matched layers and factorized once with a sparse direct solver; every application sweeps
//! the residual through the chain, transferring sources between neighbours.

pub mod assembly;
pub mod config;
pub mod dofmap;
pub mod error;
pub mod local;
pub mod matrix;
pub mod mesh;
pub mod partition;
pub mod pml;
pub mod preconditioner;
pub mod solver;
pub mod space;
pub mod utils;

// Re-exports for convenience
pub use assembly::{Coefficient, ConstantCoefficient, HelmholtzAssembler};
pub use config::{SweepMode, SweepOptions};
pub use dofmap::{DofMap, DofMapEntry};
pub use error::KError;
pub use local::{LocalSystem, LocalSystemBuilder};
pub use matrix::{CsrMatrix, SparseMatrix};
pub use mesh::{BoundingBox, CartesianMesh, GeometryKind, Mesh, Sides};
pub use partition::{GridShape, Partition, PartitionKind, Partitioner, Subdomain};
pub use pml::{CartesianPml, LayerThickness};
pub use preconditioner::{CutoffWindow, Direction, Preconditioner, SourceTransfer, SweepEngine};
pub use solver::{LinearSolver, SparseLuSolver};
pub use space::{DiscreteSpace, H1Space, SpaceTag};
pub use utils::BlockVec;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
