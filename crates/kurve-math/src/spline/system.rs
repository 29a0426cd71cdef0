//! Second-derivative systems for the classical cubic splines.
//!
//! The unknowns are the second derivatives `M` at the knots. Interior rows
//! express continuity of the first derivative; the two boundary rows come
//! from the end condition.

use crate::error::{MathError, MathResult};
use crate::scalar::SplineScalar;
use crate::spline::hermite::check_finite;
use nalgebra::{DMatrix, DVector};

/// Boundary condition closing the cubic spline system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndCondition {
    /// Zero second derivative at both ends.
    Natural,
    /// Third derivative continuous at the first and last interior knots.
    NotAKnot,
    /// Prescribed first derivatives at both ends.
    Clamped {
        /// Derivative at the first knot.
        left: f64,
        /// Derivative at the last knot.
        right: f64,
    },
}

/// A banded spline system `A M = b` and the Jacobian `db/dy`.
#[derive(Debug, Clone)]
pub struct SplineSystem {
    /// Square system matrix.
    pub matrix: DMatrix<f64>,
    /// Right-hand side for the current values.
    pub rhs: DVector<f64>,
    /// Derivative of the right-hand side with respect to each value.
    pub rhs_jacobian: DMatrix<f64>,
}

/// Builds the second-derivative system for `y` on knots with spacings `intervals`.
///
/// Needs at least 3 knots (4 for not-a-knot); smaller problems have closed
/// forms handled by the caller.
///
/// # Errors
///
/// Returns an error if there are too few knots for `end`.
pub fn build_system(intervals: &[f64], y: &[f64], end: EndCondition) -> MathResult<SplineSystem> {
    let n = y.len();
    let required = match end {
        EndCondition::NotAKnot => 4,
        EndCondition::Natural | EndCondition::Clamped { .. } => 3,
    };
    if n < required {
        return Err(MathError::insufficient_data(required, n));
    }
    if intervals.len() + 1 != n {
        return Err(MathError::invalid_input(format!(
            "expected {} intervals for {} values, got {}",
            n - 1,
            n,
            intervals.len()
        )));
    }

    let h = intervals;
    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);
    let mut jac = DMatrix::zeros(n, n);

    for i in 1..n - 1 {
        matrix[(i, i - 1)] = h[i - 1];
        matrix[(i, i)] = 2.0 * (h[i - 1] + h[i]);
        matrix[(i, i + 1)] = h[i];

        let left = (y[i] - y[i - 1]) / h[i - 1];
        let right = (y[i + 1] - y[i]) / h[i];
        rhs[i] = 6.0 * (right - left);
        jac[(i, i - 1)] = 6.0 / h[i - 1];
        jac[(i, i)] = -6.0 / h[i - 1] - 6.0 / h[i];
        jac[(i, i + 1)] = 6.0 / h[i];
    }

    let last = n - 1;
    match end {
        EndCondition::Natural => {
            matrix[(0, 0)] = 1.0;
            matrix[(last, last)] = 1.0;
        }
        EndCondition::NotAKnot => {
            matrix[(0, 0)] = -h[1];
            matrix[(0, 1)] = h[0] + h[1];
            matrix[(0, 2)] = -h[0];

            let (a, b) = (h[last - 2], h[last - 1]);
            matrix[(last, last - 2)] = -b;
            matrix[(last, last - 1)] = a + b;
            matrix[(last, last)] = -a;
        }
        EndCondition::Clamped { left, right } => {
            matrix[(0, 0)] = 2.0 * h[0];
            matrix[(0, 1)] = h[0];
            rhs[0] = 6.0 * ((y[1] - y[0]) / h[0] - left);
            jac[(0, 0)] = -6.0 / h[0];
            jac[(0, 1)] = 6.0 / h[0];

            let hl = h[last - 1];
            matrix[(last, last - 1)] = hl;
            matrix[(last, last)] = 2.0 * hl;
            rhs[last] = 6.0 * (right - (y[last] - y[last - 1]) / hl);
            jac[(last, last - 1)] = 6.0 / hl;
            jac[(last, last)] = -6.0 / hl;
        }
    }

    Ok(SplineSystem {
        matrix,
        rhs,
        rhs_jacobian: jac,
    })
}

/// Cubic rows from knot second derivatives `m`.
///
/// Row `i` is `[(m[i+1]-m[i])/(6h), m[i]/2, s[i] - h(2m[i]+m[i+1])/6, y[i]]`.
pub fn rows_from_second_derivatives<T: SplineScalar>(
    y: &[T],
    intervals: &[f64],
    slopes: &[T],
    m: &[T],
) -> MathResult<Vec<Vec<T>>> {
    let rows: Vec<Vec<T>> = intervals
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let cubic = (m[i + 1].clone() - m[i].clone()) / (6.0 * h);
            let quadratic = m[i].clone() / 2.0;
            let linear =
                slopes[i].clone() - (m[i].clone() * 2.0 + m[i + 1].clone()) * (h / 6.0);
            vec![cubic, quadratic, linear, y[i].clone()]
        })
        .collect();
    check_finite(&rows, "cubic spline coefficients")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear_algebra::solve_linear_system;
    use approx::assert_relative_eq;

    #[test]
    fn test_interior_rows() {
        let system = build_system(&[1.0, 2.0, 1.0], &[0.0, 1.0, 5.0, 6.0], EndCondition::Natural)
            .unwrap();

        assert_eq!(system.matrix[(0, 0)], 1.0);
        assert_eq!(system.matrix[(1, 0)], 1.0);
        assert_eq!(system.matrix[(1, 1)], 6.0);
        assert_eq!(system.matrix[(1, 2)], 2.0);
        // 6 * (2 - 1)
        assert_relative_eq!(system.rhs[1], 6.0);
        assert_relative_eq!(system.rhs[0], 0.0);
    }

    #[test]
    fn test_rhs_jacobian_matches_rhs() {
        let h = [0.5, 1.0, 1.5, 1.0];
        let y = [1.0, -2.0, 0.5, 3.0, 2.0];
        let end = EndCondition::Clamped {
            left: 0.3,
            right: -0.7,
        };
        let system = build_system(&h, &y, end).unwrap();
        let bump = 1e-6;

        for k in 0..y.len() {
            let mut up = y;
            up[k] += bump;
            let bumped = build_system(&h, &up, end).unwrap();
            for row in 0..y.len() {
                let fd = (bumped.rhs[row] - system.rhs[row]) / bump;
                assert_relative_eq!(system.rhs_jacobian[(row, k)], fd, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_not_a_knot_reproduces_cubic() {
        let x: [f64; 5] = [0.0, 1.0, 2.5, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| v.powi(3) - 2.0 * v).collect();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let system = build_system(&h, &y, EndCondition::NotAKnot).unwrap();
        let m = solve_linear_system(&system.matrix, &system.rhs).unwrap();

        for (xi, mi) in x.iter().zip(m.iter()) {
            assert_relative_eq!(*mi, 6.0 * xi, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_too_few_points() {
        assert!(build_system(&[1.0, 1.0], &[0.0, 1.0, 0.0], EndCondition::NotAKnot).is_err());
    }
}
