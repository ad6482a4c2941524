//! Construction-time configuration.

pub mod options;
pub use options::{SweepMode, SweepOptions};
