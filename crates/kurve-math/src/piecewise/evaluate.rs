//! Point queries on piecewise polynomial results.
//!
//! All queries share the interval search of [`KnotSequence::interval_index`]
//! and evaluate with Horner's scheme in `s = x - knots[i]`.

use super::{PiecewisePolynomialResult, PiecewisePolynomialResultWithSensitivity};
use crate::error::{MathError, MathResult};
use crate::knots::KnotSequence;
use nalgebra::{DMatrix, DVector};

/// Evaluates `c[0] s^(n-1) + ... + c[n-1]`.
pub(crate) fn horner(coefficients: &[f64], s: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc.mul_add(s, *c))
}

/// Evaluates the `order`-th derivative of the polynomial with coefficients `c`.
pub(crate) fn horner_derivative(coefficients: &[f64], s: f64, order: usize) -> f64 {
    let n = coefficients.len();
    if order >= n {
        return 0.0;
    }
    let mut acc = 0.0;
    for (j, c) in coefficients.iter().take(n - order).enumerate() {
        acc = acc * s + c * falling_factorial(n - 1 - j, order);
    }
    acc
}

/// `d (d-1) ... (d-k+1)`, the factor a degree-`d` monomial picks up after
/// `k` differentiations.
fn falling_factorial(degree: usize, k: usize) -> f64 {
    (0..k).map(|i| (degree - i) as f64).product()
}

fn check_point(x: f64) -> MathResult<()> {
    if x.is_finite() {
        Ok(())
    } else {
        Err(MathError::invalid_input(format!(
            "evaluation point must be finite, got {x}"
        )))
    }
}

impl PiecewisePolynomialResult {
    /// Values of every stacked curve at `x`.
    pub fn evaluate_dimensions(&self, x: f64) -> MathResult<Vec<f64>> {
        self.derivative_dimensions(x, 0)
    }

    /// First derivatives of every stacked curve at `x`.
    pub fn differentiate_dimensions(&self, x: f64) -> MathResult<Vec<f64>> {
        self.derivative_dimensions(x, 1)
    }

    /// Value of a one-dimensional result at `x`.
    ///
    /// Points outside the knots are evaluated on the first or last piece.
    ///
    /// # Example
    ///
    /// ```rust
    /// use kurve_math::spline::{SplineInterpolator, SplineVariant};
    ///
    /// let spline = SplineInterpolator::new(SplineVariant::NotAKnot);
    /// let result = spline
    ///     .interpolate(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 8.0, 27.0])
    ///     .unwrap();
    ///
    /// assert!((result.evaluate(1.5).unwrap() - 3.375).abs() < 1e-12);
    /// ```
    pub fn evaluate(&self, x: f64) -> MathResult<f64> {
        self.scalar_derivative(x, 0)
    }

    /// Values of a one-dimensional result at each point of `xs`.
    pub fn evaluate_many(&self, xs: &[f64]) -> MathResult<Vec<f64>> {
        xs.iter().map(|x| self.evaluate(*x)).collect()
    }

    /// First derivative of a one-dimensional result at `x`.
    pub fn differentiate(&self, x: f64) -> MathResult<f64> {
        self.scalar_derivative(x, 1)
    }

    /// Second derivative of a one-dimensional result at `x`.
    pub fn differentiate_twice(&self, x: f64) -> MathResult<f64> {
        self.scalar_derivative(x, 2)
    }

    /// Integral of a one-dimensional result over `[from, to]`.
    pub fn integrate(&self, from: f64, to: f64) -> MathResult<f64> {
        let primitive = self.antiderivative(0.0)?;
        Ok(primitive.evaluate(to)? - primitive.evaluate(from)?)
    }

    /// The continuous antiderivative taking `initial_value` at the first knot.
    ///
    /// The result has one more coefficient per interval; each stacked curve
    /// is integrated separately.
    pub fn antiderivative(&self, initial_value: f64) -> MathResult<Self> {
        let order = self.order + 1;
        let intervals = self.interval_count();
        let widths = self.knots.intervals();
        let mut coefficients = DMatrix::zeros(self.coefficients.nrows(), order);
        for dim in 0..self.dimensions {
            let mut constant = initial_value;
            for (i, width) in widths.iter().enumerate() {
                let row = i * self.dimensions + dim;
                for j in 0..self.order {
                    let power = (self.order - j) as f64;
                    coefficients[(row, j)] = self.coefficients[(row, j)] / power;
                }
                coefficients[(row, self.order)] = constant;
                if i + 1 < intervals {
                    let integrated: Vec<f64> = coefficients.row(row).iter().copied().collect();
                    constant = horner(&integrated, *width);
                }
            }
        }
        Self::new(self.knots.clone(), coefficients, order, self.dimensions)
    }

    fn scalar_derivative(&self, x: f64, order: usize) -> MathResult<f64> {
        if self.dimensions != 1 {
            return Err(MathError::invalid_input(format!(
                "scalar evaluation needs a one-dimensional result, this one has {} curves",
                self.dimensions
            )));
        }
        Ok(self.derivative_dimensions(x, order)?[0])
    }

    fn derivative_dimensions(&self, x: f64, order: usize) -> MathResult<Vec<f64>> {
        check_point(x)?;
        let interval = self.knots.interval_index(x);
        let s = x - self.knots.as_slice()[interval];
        let values = (0..self.dimensions)
            .map(|dim| {
                let row = self.coefficients.row(interval * self.dimensions + dim);
                let coefs: Vec<f64> = row.iter().copied().collect();
                horner_derivative(&coefs, s, order)
            })
            .collect();
        Ok(values)
    }
}

impl PiecewisePolynomialResultWithSensitivity {
    /// Value at `x`.
    pub fn evaluate(&self, x: f64) -> MathResult<f64> {
        self.result().evaluate(x)
    }

    /// First derivative at `x`.
    pub fn differentiate(&self, x: f64) -> MathResult<f64> {
        self.result().differentiate(x)
    }

    /// Second derivative at `x`.
    pub fn differentiate_twice(&self, x: f64) -> MathResult<f64> {
        self.result().differentiate_twice(x)
    }

    /// Derivative of the value at `x` with respect to each input value.
    pub fn node_sensitivity(&self, x: f64) -> MathResult<DVector<f64>> {
        self.sensitivity_derivative(x, 0)
    }

    /// Derivative of the first derivative at `x` with respect to each input value.
    pub fn differentiate_node_sensitivity(&self, x: f64) -> MathResult<DVector<f64>> {
        self.sensitivity_derivative(x, 1)
    }

    /// Derivative of the second derivative at `x` with respect to each input value.
    pub fn differentiate_twice_node_sensitivity(&self, x: f64) -> MathResult<DVector<f64>> {
        self.sensitivity_derivative(x, 2)
    }

    fn sensitivity_derivative(&self, x: f64, order: usize) -> MathResult<DVector<f64>> {
        check_point(x)?;
        let knots: &KnotSequence = self.result().knots();
        let interval = knots.interval_index(x);
        let s = x - knots.as_slice()[interval];
        let matrix = &self.sensitivities()[interval];
        let n = matrix.nrows();

        let mut acc = DVector::zeros(matrix.ncols());
        if order >= n {
            return Ok(acc);
        }
        for j in 0..n - order {
            let factor = falling_factorial(n - 1 - j, order);
            acc = acc * s + matrix.row(j).transpose() * factor;
        }
        Ok(acc)
    }
}
