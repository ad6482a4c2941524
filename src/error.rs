use thiserror::Error;

// Unified error type for sourcesweep

#[derive(Error, Debug)]
pub enum KError {
    #[error("factorization error: {0}")]
    FactorError(String),
    #[error("singular local system on subdomain {subdomain}: {reason}")]
    SingularSystem { subdomain: usize, reason: String },
    #[error("sparse matrix construction failed: {0}")]
    MatrixError(String),
    #[error("solve error: {0}")]
    SolveError(String),
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(&'static str),
    #[error("partition mismatch: {overlapping} overlapping subdomains against {non_overlapping} slabs (expected one more slab than subdomains)")]
    PartitionMismatch { overlapping: usize, non_overlapping: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
