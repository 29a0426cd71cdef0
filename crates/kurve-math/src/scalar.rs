//! Scalar types the spline algorithms are written over.
//!
//! Every construction step (slopes, derivative estimates, shape filters,
//! Hermite coefficients) is generic over [`SplineScalar`]. Running it with
//! `f64` produces coefficients; running it with [`Tangent`] additionally
//! carries the gradient of each intermediate with respect to the input
//! values, which is how coefficient sensitivities are obtained.

use nalgebra::DVector;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Arithmetic needed by the spline builders.
pub trait SplineScalar:
    Clone
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
{
    /// The primal value.
    fn value(&self) -> f64;

    /// A constant of the same shape as `self` (zero gradient for tangents).
    fn constant(&self, value: f64) -> Self;

    /// Whether the primal value is finite and so is every tracked partial.
    fn is_finite(&self) -> bool;

    /// Absolute value, differentiated branchwise.
    fn abs(self) -> Self {
        if self.value() < 0.0 {
            -self
        } else {
            self
        }
    }

    /// Sign of the primal value: -1, 0 or 1.
    fn sign(&self) -> f64 {
        let v = self.value();
        if v > 0.0 {
            1.0
        } else if v < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    /// The smaller operand by primal value; ties keep `self`.
    fn min_value(self, other: Self) -> Self {
        if other.value() < self.value() {
            other
        } else {
            self
        }
    }

    /// The larger operand by primal value; ties keep `self`.
    fn max_value(self, other: Self) -> Self {
        if other.value() > self.value() {
            other
        } else {
            self
        }
    }
}

impl SplineScalar for f64 {
    fn value(&self) -> f64 {
        *self
    }

    fn constant(&self, value: f64) -> Self {
        value
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

/// A value together with its gradient with respect to the input data.
#[derive(Debug, Clone, PartialEq)]
pub struct Tangent {
    /// Primal value.
    pub value: f64,
    /// Partial derivatives with respect to each input value.
    pub grad: DVector<f64>,
}

impl Tangent {
    /// Creates a tangent from a value and gradient.
    pub fn new(value: f64, grad: DVector<f64>) -> Self {
        Self { value, grad }
    }

    /// The `index`-th independent variable of a problem with `size` inputs.
    pub fn variable(value: f64, index: usize, size: usize) -> Self {
        let mut grad = DVector::zeros(size);
        grad[index] = 1.0;
        Self { value, grad }
    }

    /// Seeds one independent variable per input value.
    pub fn seed(values: &[f64]) -> Vec<Self> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Self::variable(*v, i, values.len()))
            .collect()
    }
}

impl SplineScalar for Tangent {
    fn value(&self) -> f64 {
        self.value
    }

    fn constant(&self, value: f64) -> Self {
        Self {
            value,
            grad: DVector::zeros(self.grad.len()),
        }
    }

    fn is_finite(&self) -> bool {
        self.value.is_finite() && self.grad.iter().all(|g| g.is_finite())
    }
}

impl Add for Tangent {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value, self.grad + rhs.grad)
    }
}

impl Sub for Tangent {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value, self.grad - rhs.grad)
    }
}

impl Mul for Tangent {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let grad = &self.grad * rhs.value + &rhs.grad * self.value;
        Self::new(self.value * rhs.value, grad)
    }
}

impl Div for Tangent {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let value = self.value / rhs.value;
        let grad = (&self.grad - &rhs.grad * value) / rhs.value;
        Self::new(value, grad)
    }
}

impl Neg for Tangent {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.value, -self.grad)
    }
}

impl Add<f64> for Tangent {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        Self::new(self.value + rhs, self.grad)
    }
}

impl Sub<f64> for Tangent {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        Self::new(self.value - rhs, self.grad)
    }
}

impl Mul<f64> for Tangent {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs, self.grad * rhs)
    }
}

impl Div<f64> for Tangent {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.value / rhs, self.grad / rhs)
    }
}
