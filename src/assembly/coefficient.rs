//! Scalar material fields.

/// A real field evaluated at physical points.
pub trait Coefficient: Send + Sync {
    fn eval(&self, x: &[f64]) -> f64;
}

/// A field with the same value everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantCoefficient(pub f64);

impl Coefficient for ConstantCoefficient {
    fn eval(&self, _x: &[f64]) -> f64 {
        self.0
    }
}

impl<F> Coefficient for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn eval(&self, x: &[f64]) -> f64 {
        self(x)
    }
}
