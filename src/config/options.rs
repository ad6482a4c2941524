//! Options for the source-transfer preconditioner.
//!
//! This module provides the `SweepOptions` struct, which fixes everything the preconditioner
//! needs at setup: the frequency, how the domain is cut into subdomains along the sweep axis,
//! the absorbing layers around each subdomain and which directions are swept.

use crate::error::KError;
use crate::pml::LayerThickness;

/// Sweep directions run by one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// A single sweep in the increasing direction of the axis.
    #[default]
    Forward,
    /// Increasing and decreasing sweeps, averaged.
    ForwardBackward,
}

/// Preconditioner setup parameters.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Angular frequency ω.
    pub omega: f64,

    /// Number of overlapping subdomains (`nrpatch`); the axis is cut into `nrpatch + 1` slabs.
    pub subdomains: usize,

    /// Sweep axis.
    pub axis: usize,

    /// Absorbing element layers around interior subdomain sides.
    pub absorbing_layers: usize,

    /// Element layers each subdomain extends into the next slab; `None` covers the whole slab.
    pub overlap_layers: Option<usize>,

    /// Absorbing thickness on the sides terminating the global domain.
    pub pml_length: LayerThickness,

    pub mode: SweepMode,

    /// Entries of the local block matrices with magnitude at most this are dropped.
    pub threshold: f64,
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions {
            omega: 1.0,
            subdomains: 2,
            axis: 0,
            absorbing_layers: 4,
            overlap_layers: None,
            pml_length: LayerThickness::zero(),
            mode: SweepMode::Forward,
            threshold: 0.0,
        }
    }
}

impl SweepOptions {
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_subdomains(mut self, n: usize) -> Self {
        self.subdomains = n;
        self
    }

    pub fn with_axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_absorbing_layers(mut self, layers: usize) -> Self {
        self.absorbing_layers = layers;
        self
    }

    pub fn with_overlap_layers(mut self, layers: usize) -> Self {
        self.overlap_layers = Some(layers);
        self
    }

    pub fn with_pml_length(mut self, thickness: LayerThickness) -> Self {
        self.pml_length = thickness;
        self
    }

    pub fn with_mode(mut self, mode: SweepMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Check the options against a mesh of dimension `dim`.
    pub fn validate(&self, dim: usize) -> Result<(), KError> {
        if !(self.omega.is_finite() && self.omega >= 0.0) {
            return Err(KError::InvalidConfig(format!("omega must be finite and non-negative, got {}", self.omega)));
        }
        if self.subdomains == 0 {
            return Err(KError::InvalidConfig("at least one subdomain is required".into()));
        }
        if self.axis >= dim {
            return Err(KError::InvalidConfig(format!("sweep axis {} out of range for dimension {}", self.axis, dim)));
        }
        if self.absorbing_layers == 0 {
            return Err(KError::InvalidConfig("absorbing_layers must be at least 1".into()));
        }
        if self.overlap_layers == Some(0) {
            return Err(KError::InvalidConfig("overlap_layers must be at least 1".into()));
        }
        if !self.pml_length.is_valid() {
            return Err(KError::InvalidConfig("pml_length must be finite and non-negative".into()));
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(KError::InvalidConfig("threshold must be finite and non-negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_and_validation() {
        let opts = SweepOptions::default().with_omega(10.0).with_subdomains(3).with_overlap_layers(2);
        assert!(opts.validate(1).is_ok());
        assert!(opts.clone().with_axis(1).validate(1).is_err());
        assert!(opts.clone().with_omega(f64::NAN).validate(2).is_err());
        assert!(opts.clone().with_threshold(1e-14).validate(1).is_ok());
        assert!(opts.clone().with_threshold(-1.0).validate(1).is_err());
        assert!(opts.with_subdomains(0).validate(2).is_err());
    }
}
