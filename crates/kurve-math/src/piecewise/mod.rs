//! Piecewise polynomial results and their evaluation.
//!
//! A [`PiecewisePolynomialResult`] is what every spline variant produces: a
//! knot sequence plus one row of coefficients per interval (and per curve,
//! for stacked multi-curve results), highest degree first, expressed in the
//! local variable `x - knots[i]`.

mod evaluate;

use crate::error::{MathError, MathResult};
use crate::knots::KnotSequence;
use crate::scalar::{SplineScalar, Tangent};
use nalgebra::DMatrix;

#[cfg(test)]
pub(crate) use evaluate::horner;

/// Knots plus coefficient table describing one or more stacked splines.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePolynomialResult {
    knots: KnotSequence,
    coefficients: DMatrix<f64>,
    order: usize,
    dimensions: usize,
}

impl PiecewisePolynomialResult {
    /// Creates a result, checking the coefficient table against the knots.
    ///
    /// Row `i * dimensions + j` holds interval `i` of curve `j`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not have `dimensions` rows per
    /// interval and `order` columns, or contains non-finite coefficients.
    pub fn new(
        knots: KnotSequence,
        coefficients: DMatrix<f64>,
        order: usize,
        dimensions: usize,
    ) -> MathResult<Self> {
        if order == 0 || dimensions == 0 {
            return Err(MathError::invalid_input(
                "order and dimensions must be positive",
            ));
        }
        let expected_rows = dimensions * knots.interval_count();
        if coefficients.nrows() != expected_rows || coefficients.ncols() != order {
            return Err(MathError::DimensionMismatch {
                rows1: coefficients.nrows(),
                cols1: coefficients.ncols(),
                rows2: expected_rows,
                cols2: order,
            });
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MathError::numeric_overflow("piecewise polynomial coefficients"));
        }
        Ok(Self {
            knots,
            coefficients,
            order,
            dimensions,
        })
    }

    /// Builds a one-dimensional result from per-interval coefficient rows.
    pub(crate) fn from_rows(knots: KnotSequence, rows: &[Vec<f64>]) -> MathResult<Self> {
        let order = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != order) {
            return Err(MathError::invalid_input(
                "coefficient rows must share one order",
            ));
        }
        let coefficients = DMatrix::from_fn(rows.len(), order, |i, j| rows[i][j]);
        Self::new(knots, coefficients, order, 1)
    }

    /// Stacks one-dimensional results sharing the same knots and order.
    pub(crate) fn interleave(results: Vec<Self>) -> MathResult<Self> {
        let Some(first) = results.first() else {
            return Err(MathError::insufficient_data(1, 0));
        };
        let knots = first.knots.clone();
        let order = first.order;
        let dims = results.len();
        let intervals = knots.interval_count();
        if results
            .iter()
            .any(|r| r.dimensions != 1 || r.order != order || r.knots != knots)
        {
            return Err(MathError::invalid_input(
                "stacked results must be one-dimensional with identical knots and order",
            ));
        }
        let coefficients = DMatrix::from_fn(dims * intervals, order, |row, col| {
            results[row % dims].coefficients[(row / dims, col)]
        });
        Self::new(knots, coefficients, order, dims)
    }

    /// Returns the knots.
    pub fn knots(&self) -> &KnotSequence {
        &self.knots
    }

    /// Returns the coefficient table.
    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    /// Number of coefficients per interval (degree + 1).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of stacked curves.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of polynomial pieces per curve.
    pub fn interval_count(&self) -> usize {
        self.knots.interval_count()
    }

    /// Coefficients of interval `interval` for curve `dimension`, or `None`
    /// when either index is out of range.
    pub fn interval_coefficients(&self, interval: usize, dimension: usize) -> Option<Vec<f64>> {
        if interval >= self.interval_count() || dimension >= self.dimensions {
            return None;
        }
        Some(
            self.coefficients
                .row(interval * self.dimensions + dimension)
                .iter()
                .copied()
                .collect(),
        )
    }
}

/// A one-dimensional result together with coefficient sensitivities.
///
/// Interval `i` carries an `order x n_data` matrix whose entry `(j, k)` is
/// the derivative of coefficient `j` with respect to input value `y[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePolynomialResultWithSensitivity {
    result: PiecewisePolynomialResult,
    sensitivities: Vec<DMatrix<f64>>,
}

impl PiecewisePolynomialResultWithSensitivity {
    /// Attaches coefficient sensitivities to a one-dimensional result.
    ///
    /// # Errors
    ///
    /// Returns an error for multi-dimensional results or when the matrices
    /// do not match the intervals and order.
    pub fn new(
        result: PiecewisePolynomialResult,
        sensitivities: Vec<DMatrix<f64>>,
    ) -> MathResult<Self> {
        if result.dimensions() != 1 {
            return Err(MathError::invalid_input(
                "coefficient sensitivities require a one-dimensional result",
            ));
        }
        if sensitivities.len() != result.interval_count() {
            return Err(MathError::invalid_input(format!(
                "expected {} sensitivity matrices, got {}",
                result.interval_count(),
                sensitivities.len()
            )));
        }
        let data_points = sensitivities.first().map_or(0, DMatrix::ncols);
        if sensitivities
            .iter()
            .any(|m| m.nrows() != result.order() || m.ncols() != data_points)
        {
            return Err(MathError::invalid_input(
                "sensitivity matrices must be order x data points",
            ));
        }
        if sensitivities.iter().any(|m| m.iter().any(|v| !v.is_finite())) {
            return Err(MathError::numeric_overflow("coefficient sensitivities"));
        }
        Ok(Self {
            result,
            sensitivities,
        })
    }

    /// Builds a result from per-interval tangent coefficients.
    pub(crate) fn from_tangent_rows(knots: KnotSequence, rows: &[Vec<Tangent>]) -> MathResult<Self> {
        let values: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| r.iter().map(SplineScalar::value).collect())
            .collect();
        let result = PiecewisePolynomialResult::from_rows(knots, &values)?;
        let sensitivities = rows
            .iter()
            .map(|r| {
                let data_points = r.first().map_or(0, |t| t.grad.len());
                DMatrix::from_fn(r.len(), data_points, |j, k| r[j].grad[k])
            })
            .collect();
        Self::new(result, sensitivities)
    }

    /// The underlying result.
    pub fn result(&self) -> &PiecewisePolynomialResult {
        &self.result
    }

    /// Consumes the wrapper and returns the underlying result.
    pub fn into_result(self) -> PiecewisePolynomialResult {
        self.result
    }

    /// Coefficient sensitivity matrices, one per interval.
    pub fn sensitivities(&self) -> &[DMatrix<f64>] {
        &self.sensitivities
    }

    /// Number of input data points the sensitivities refer to.
    pub fn data_points(&self) -> usize {
        self.sensitivities.first().map_or(0, DMatrix::ncols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knots() -> KnotSequence {
        KnotSequence::new(vec![0.0, 1.0, 2.0]).unwrap()
    }

    #[test]
    fn test_shape_checked() {
        let coefs = DMatrix::zeros(3, 2);
        assert!(matches!(
            PiecewisePolynomialResult::new(knots(), coefs, 2, 1),
            Err(MathError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_non_finite_coefficients_rejected() {
        let mut coefs = DMatrix::zeros(2, 2);
        coefs[(1, 0)] = f64::INFINITY;
        assert!(matches!(
            PiecewisePolynomialResult::new(knots(), coefs, 2, 1),
            Err(MathError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_interleave_rows() {
        let a = PiecewisePolynomialResult::from_rows(knots(), &[vec![1.0, 0.0], vec![2.0, 1.0]])
            .unwrap();
        let b = PiecewisePolynomialResult::from_rows(knots(), &[vec![3.0, 0.0], vec![4.0, 3.0]])
            .unwrap();

        let stacked = PiecewisePolynomialResult::interleave(vec![a, b]).unwrap();

        assert_eq!(stacked.dimensions(), 2);
        assert_eq!(stacked.coefficients().nrows(), 4);
        assert_eq!(stacked.interval_coefficients(0, 1), Some(vec![3.0, 0.0]));
        assert_eq!(stacked.interval_coefficients(0, 2), None);
        assert_eq!(stacked.interval_coefficients(2, 0), None);
        assert_eq!(stacked.interval_coefficients(1, 0), Some(vec![2.0, 1.0]));
    }

    #[test]
    fn test_sensitivity_requires_one_dimension() {
        let a = PiecewisePolynomialResult::from_rows(knots(), &[vec![1.0], vec![2.0]]).unwrap();
        let stacked = PiecewisePolynomialResult::interleave(vec![a.clone(), a]).unwrap();
        let sens = vec![DMatrix::zeros(1, 3), DMatrix::zeros(1, 3)];

        assert!(PiecewisePolynomialResultWithSensitivity::new(stacked, sens).is_err());
    }

    #[test]
    fn test_from_tangent_rows() {
        let y = Tangent::seed(&[1.0, 2.0, 4.0]);
        let rows = vec![
            vec![y[1].clone() - y[0].clone(), y[0].clone()],
            vec![y[2].clone() - y[1].clone(), y[1].clone()],
        ];

        let with_sens =
            PiecewisePolynomialResultWithSensitivity::from_tangent_rows(knots(), &rows).unwrap();

        assert_eq!(with_sens.data_points(), 3);
        assert_eq!(
            with_sens.result().interval_coefficients(1, 0),
            Some(vec![2.0, 2.0])
        );
        assert_eq!(with_sens.sensitivities()[1][(0, 1)], -1.0);
        assert_eq!(with_sens.sensitivities()[1][(0, 2)], 1.0);
    }
}
