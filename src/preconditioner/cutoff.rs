//! Smooth cutoff windows used to pass a subdomain's field on to its neighbour.
//!
//! The window is supported on the receiving subdomain's box. Along every axis it rises from 0
//! to 1 across a band whose width is the offset between the receiver's and the source's
//! matching edges. The band on the side the sweep is heading towards is dropped, so the
//! window only truncates content travelling back towards the source.

use crate::error::KError;
use crate::mesh::BoundingBox;
use crate::space::{DiscreteSpace, H1Space};

/// A sweep direction: one of −1, 0, +1 per axis, not all zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction(pub [i8; 3]);

impl Direction {
    /// `sign` (±1) along `axis`.
    pub fn along(axis: usize, sign: i8) -> Self {
        let mut d = [0; 3];
        d[axis] = sign.signum();
        Direction(d)
    }

    pub fn component(&self, axis: usize) -> i8 {
        self.0[axis]
    }

    /// The single axis this direction moves along, if there is exactly one.
    pub fn axis(&self) -> Option<usize> {
        let mut active = (0..3).filter(|&a| self.0[a] != 0);
        match (active.next(), active.next()) {
            (Some(a), None) => Some(a),
            _ => None,
        }
    }
}

/// Smoothstep `t² (3 − 2t)` on `[0, 1]`.
fn profile(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// A partition-of-unity style window on a support box.
#[derive(Debug, Clone)]
pub struct CutoffWindow {
    support: BoundingBox,
    lower: [f64; 3],
    upper: [f64; 3],
    tol: f64,
}

impl CutoffWindow {
    /// Window transferring from `source` into `receiver` while sweeping along `direction`.
    pub fn new(direction: Direction, receiver: &BoundingBox, source: &BoundingBox) -> Self {
        let mut lower = [0.0; 3];
        let mut upper = [0.0; 3];
        for d in 0..receiver.dim {
            lower[d] = (receiver.min[d] - source.min[d]).abs();
            upper[d] = (receiver.max[d] - source.max[d]).abs();
            match direction.component(d) {
                1 => upper[d] = 0.0,
                -1 => lower[d] = 0.0,
                _ => {}
            }
        }
        let tol = 1e-10 * receiver.diameter().max(1.0);
        CutoffWindow { support: *receiver, lower, upper, tol }
    }

    /// Transition band widths `(lower, upper)` along `axis`.
    pub fn bands(&self, axis: usize) -> (f64, f64) {
        (self.lower[axis], self.upper[axis])
    }

    /// Window value at `x`, in `[0, 1]`.
    pub fn value(&self, x: &[f64]) -> f64 {
        if !self.support.contains(x, self.tol) {
            return 0.0;
        }
        let mut w = 1.0;
        for d in 0..self.support.dim {
            if self.lower[d] > 0.0 {
                w *= profile((x[d] - self.support.min[d]) / self.lower[d]);
            }
            if self.upper[d] > 0.0 {
                w *= profile((self.support.max[d] - x[d]) / self.upper[d]);
            }
        }
        w
    }

    /// Multiply a block `[re; im]` field on `space` by the window and project back onto the
    /// space. Only nodal order-1 continuous spaces are supported, where the projection is
    /// pointwise.
    pub fn apply(&self, space: &H1Space, field: &mut [f64]) -> Result<(), KError> {
        if !space.tag().is_vertex_nodal() {
            return Err(KError::Unsupported("cutoff projection needs a nodal order-1 continuous space"));
        }
        let n = space.true_vsize();
        if field.len() != 2 * n {
            return Err(KError::DimensionMismatch { expected: 2 * n, found: field.len() });
        }
        for i in 0..n {
            let w = self.value(space.dof_coordinates(i));
            field[i] *= w;
            field[i + n] *= w;
        }
        Ok(())
    }
}
