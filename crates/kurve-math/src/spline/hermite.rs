//! Hermite coefficient construction.
//!
//! Given values, secant slopes and derivatives at the knots, these routines
//! produce the local polynomial of every interval in closed form. They are
//! generic over [`SplineScalar`], so running them on tangents yields the
//! coefficient sensitivities alongside the coefficients.

use crate::error::{MathError, MathResult};
use crate::scalar::SplineScalar;

/// Secant slopes `(y[i+1] - y[i]) / h[i]`.
pub fn secant_slopes<T: SplineScalar>(y: &[T], intervals: &[f64]) -> Vec<T> {
    intervals
        .iter()
        .enumerate()
        .map(|(i, h)| (y[i + 1].clone() - y[i].clone()) / *h)
        .collect()
}

/// Cubic Hermite coefficients `[a, b, c, d]` of one interval.
///
/// The polynomial `a s^3 + b s^2 + c s + d` takes `y0` and derivative `d0`
/// at `s = 0` and `y0 + slope h` and derivative `d1` at `s = h`.
pub fn cubic_hermite<T: SplineScalar>(y0: &T, d0: &T, d1: &T, slope: &T, h: f64) -> Vec<T> {
    let a = (d0.clone() + d1.clone() - slope.clone() * 2.0) / (h * h);
    let b = (slope.clone() * 3.0 - d0.clone() * 2.0 - d1.clone()) / h;
    vec![a, b, d0.clone(), y0.clone()]
}

/// Quintic Hermite coefficients `[a5, a4, a3, a2, a1, a0]` of one interval.
///
/// Matches value, first and second derivative (`e0`, `e1`) at both ends.
pub fn quintic_hermite<T: SplineScalar>(
    y0: &T,
    d0: &T,
    d1: &T,
    e0: &T,
    e1: &T,
    slope: &T,
    h: f64,
) -> Vec<T> {
    let h2 = h * h;
    // remainder after the quadratic Taylor part at s = 0, and its derivatives at s = h
    let delta = (slope.clone() - d0.clone()) * h - e0.clone() * (h2 / 2.0);
    let delta_d = d1.clone() - d0.clone() - e0.clone() * h;
    let delta_dd = e1.clone() - e0.clone();

    let a3 = delta.clone() * (10.0 / (h2 * h)) - delta_d.clone() * (4.0 / h2)
        + delta_dd.clone() / (2.0 * h);
    let a4 = (delta_d.clone() * (7.0 * h) - delta.clone() * 15.0 - delta_dd.clone() * h2)
        / (h2 * h2);
    let a5 = (delta * 6.0 - delta_d * (3.0 * h) + delta_dd * (h2 / 2.0)) / (h2 * h2 * h);

    vec![a5, a4, a3, e0.clone() / 2.0, d0.clone(), y0.clone()]
}

/// Cubic Hermite rows for every interval.
///
/// # Errors
///
/// Returns [`MathError::NumericOverflow`] when a coefficient is not finite.
pub fn cubic_hermite_rows<T: SplineScalar>(
    y: &[T],
    intervals: &[f64],
    slopes: &[T],
    first: &[T],
) -> MathResult<Vec<Vec<T>>> {
    let rows: Vec<Vec<T>> = intervals
        .iter()
        .enumerate()
        .map(|(i, h)| cubic_hermite(&y[i], &first[i], &first[i + 1], &slopes[i], *h))
        .collect();
    check_finite(&rows, "cubic Hermite coefficients")?;
    Ok(rows)
}

/// Quintic Hermite rows for every interval.
pub fn quintic_hermite_rows<T: SplineScalar>(
    y: &[T],
    intervals: &[f64],
    slopes: &[T],
    first: &[T],
    second: &[T],
) -> MathResult<Vec<Vec<T>>> {
    let rows: Vec<Vec<T>> = intervals
        .iter()
        .enumerate()
        .map(|(i, h)| {
            quintic_hermite(
                &y[i],
                &first[i],
                &first[i + 1],
                &second[i],
                &second[i + 1],
                &slopes[i],
                *h,
            )
        })
        .collect();
    check_finite(&rows, "quintic Hermite coefficients")?;
    Ok(rows)
}

/// Straight-line rows `[slope, y]`.
pub fn linear_rows<T: SplineScalar>(y: &[T], slopes: &[T]) -> MathResult<Vec<Vec<T>>> {
    let rows: Vec<Vec<T>> = slopes
        .iter()
        .zip(y)
        .map(|(s, v)| vec![s.clone(), v.clone()])
        .collect();
    check_finite(&rows, "linear coefficients")?;
    Ok(rows)
}

/// Fails with a numeric overflow if any coefficient is not finite.
pub fn check_finite<T: SplineScalar>(rows: &[Vec<T>], context: &str) -> MathResult<()> {
    if rows.iter().flatten().all(SplineScalar::is_finite) {
        Ok(())
    } else {
        Err(MathError::numeric_overflow(context))
    }
}

/// Evaluates the `order`-th derivative of a generic coefficient row at `s`.
pub(crate) fn row_derivative<T: SplineScalar>(row: &[T], s: f64, order: usize) -> T {
    let n = row.len();
    let mut acc = row[0].constant(0.0);
    if order >= n {
        return acc;
    }
    for (j, c) in row.iter().take(n - order).enumerate() {
        let degree = n - 1 - j;
        let factor: f64 = (0..order).map(|k| (degree - k) as f64).product();
        acc = acc * s + c.clone() * factor;
    }
    acc
}

/// Derivatives of order `order` of a spline at each of its knots.
///
/// Interior knots read the piece starting there; the last knot evaluates
/// the final piece at its right end.
pub(crate) fn knot_derivatives<T: SplineScalar>(
    rows: &[Vec<T>],
    intervals: &[f64],
    order: usize,
) -> Vec<T> {
    let last = rows.len() - 1;
    let mut out: Vec<T> = rows.iter().map(|r| row_derivative(r, 0.0, order)).collect();
    out.push(row_derivative(&rows[last], intervals[last], order));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piecewise::horner;
    use crate::scalar::Tangent;
    use approx::assert_relative_eq;

    fn poly(coefs: &[f64], s: f64, k: usize) -> f64 {
        row_derivative(coefs, s, k)
    }

    #[test]
    fn test_cubic_hermite_end_conditions() {
        let h = 2.0;
        let (y0, y1, d0, d1) = (1.0, 3.0, -1.0, 4.0);
        let row = cubic_hermite(&y0, &d0, &d1, &((y1 - y0) / h), h);

        assert_relative_eq!(horner(&row, 0.0), y0);
        assert_relative_eq!(horner(&row, h), y1, epsilon = 1e-12);
        assert_relative_eq!(poly(&row, 0.0, 1), d0);
        assert_relative_eq!(poly(&row, h, 1), d1, epsilon = 1e-12);
    }

    #[test]
    fn test_quintic_hermite_reproduces_monomials() {
        // s^5 on [0, 1]: value, slope and curvature at both ends
        let row = quintic_hermite(&0.0, &0.0, &5.0, &0.0, &20.0, &1.0, 1.0);
        let expected = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        for (c, e) in row.iter().zip(expected) {
            assert_relative_eq!(*c, e, epsilon = 1e-12);
        }

        // s^4 on [0, 2]
        let row = quintic_hermite(&0.0, &0.0, &32.0, &0.0, &48.0, &8.0, 2.0);
        let expected = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        for (c, e) in row.iter().zip(expected) {
            assert_relative_eq!(*c, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quintic_hermite_end_conditions() {
        let h = 0.5;
        let (y0, y1, d0, d1, e0, e1) = (2.0, -1.0, 0.3, 1.7, -4.0, 6.0);
        let row = quintic_hermite(&y0, &d0, &d1, &e0, &e1, &((y1 - y0) / h), h);

        assert_relative_eq!(poly(&row, h, 0), y1, epsilon = 1e-11);
        assert_relative_eq!(poly(&row, h, 1), d1, epsilon = 1e-11);
        assert_relative_eq!(poly(&row, h, 2), e1, epsilon = 1e-10);
        assert_relative_eq!(poly(&row, 0.0, 2), e0);
    }

    #[test]
    fn test_slope_sensitivity() {
        let y = Tangent::seed(&[1.0, 2.0, 4.0]);
        let slopes = secant_slopes(&y, &[0.5, 2.0]);

        assert_relative_eq!(slopes[0].value, 2.0);
        assert_relative_eq!(slopes[0].grad[0], -2.0);
        assert_relative_eq!(slopes[0].grad[1], 2.0);
        assert_relative_eq!(slopes[1].grad[1], -0.5);
        assert_relative_eq!(slopes[1].grad[2], 0.5);
        assert_relative_eq!(slopes[1].grad[0], 0.0);
    }

    #[test]
    fn test_overflow_detected() {
        let y = vec![0.0, 1e308];
        let slopes = secant_slopes(&y, &[1e-300]);
        let first = vec![0.0, 0.0];

        assert!(matches!(
            cubic_hermite_rows(&y, &[1e-300], &slopes, &first),
            Err(MathError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_knot_derivatives() {
        let rows = vec![vec![1.0, 0.0, 0.0, 0.0], vec![1.0, 3.0, 3.0, 1.0]];
        let first = knot_derivatives(&rows, &[1.0, 1.0], 1);
        assert_eq!(first, vec![0.0, 3.0, 12.0]);
        let second = knot_derivatives(&rows, &[1.0, 1.0], 2);
        assert_eq!(second, vec![0.0, 6.0, 12.0]);
    }
}
