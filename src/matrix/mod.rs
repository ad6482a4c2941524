//! Matrix module: sparse storage and the `SparseMatrix` trait.

pub mod sparse;
pub use sparse::{CsrMatrix, SparseMatrix};
