//! Nonnegativity preserving derivative filters.
//!
//! Each knot derivative is clamped so that the Bernstein coefficients of
//! the adjacent Hermite pieces keep the sign of the knot value. A zero knot
//! value forces a flat first derivative there.

use crate::error::{MathError, MathResult};
use crate::filter::monotonicity::three_point;
use crate::scalar::SplineScalar;

/// Clamps `tau * d` into `[-factor |y| / h_right, factor |y| / h_left]`.
fn clamp_first<T: SplineScalar>(y: &T, d: &T, h_left: f64, h_right: f64, factor: f64) -> T {
    let tau = y.sign();
    if tau == 0.0 {
        return d.constant(0.0);
    }
    let lower = y.clone() * (-factor * tau / h_right);
    let upper = y.clone() * (factor * tau / h_left);
    (d.clone() * tau).max_value(lower).min_value(upper) * tau
}

/// Filters knot first derivatives so cubic Hermite pieces keep the sign of
/// the data.
///
/// Ends start from the three-point estimate; at least three knots are
/// required.
pub fn cubic_first_derivatives<T: SplineScalar>(
    y: &[T],
    intervals: &[f64],
    slopes: &[T],
    initial: &[T],
) -> Vec<T> {
    let n = y.len();
    let h = intervals;
    let mut d: Vec<T> = Vec::with_capacity(n);

    let start = three_point(h[0], h[1], &slopes[0], &slopes[1]);
    d.push(clamp_first(&y[0], &start, h[0], h[0], 3.0));
    for i in 1..n - 1 {
        d.push(clamp_first(&y[i], &initial[i], h[i - 1], h[i], 3.0));
    }
    let end = three_point(h[n - 2], h[n - 3], &slopes[n - 2], &slopes[n - 3]);
    d.push(clamp_first(&y[n - 1], &end, h[n - 2], h[n - 2], 3.0));
    d
}

/// Filters first and second knot derivatives for quintic Hermite pieces
/// that keep the sign of the data.
///
/// End first derivatives start from the three-point estimate, as in the
/// cubic filter.
///
/// # Errors
///
/// Returns an error for fewer than three knots.
pub fn quintic_derivatives<T: SplineScalar>(
    y: &[T],
    intervals: &[f64],
    slopes: &[T],
    initial_first: &[T],
    initial_second: &[T],
) -> MathResult<(Vec<T>, Vec<T>)> {
    let n = y.len();
    if n < 3 {
        return Err(MathError::insufficient_data(3, n));
    }
    let h = intervals;

    let d: Vec<T> = (0..n)
        .map(|i| {
            let (left, right) = neighbour_intervals(h, i);
            let start = match i {
                0 => three_point(h[0], h[1], &slopes[0], &slopes[1]),
                i if i == n - 1 => three_point(h[n - 2], h[n - 3], &slopes[n - 2], &slopes[n - 3]),
                i => initial_first[i].clone(),
            };
            clamp_first(&y[i], &start, left, right, 5.0)
        })
        .collect();

    let e: Vec<T> = (0..n)
        .map(|i| {
            let (left, right) = neighbour_intervals(h, i);
            let tau = y[i].sign();
            let init = &initial_second[i];
            if tau == 0.0 {
                let neighbours = match i {
                    0 => y[1].value(),
                    i if i == n - 1 => y[n - 2].value(),
                    i => y[i - 1].value() + y[i + 1].value(),
                };
                let tau = SplineScalar::sign(&neighbours);
                if tau == 0.0 {
                    return init.constant(0.0);
                }
                return (init.clone() * tau).max_value(init.constant(0.0)) * tau;
            }
            let from_left =
                (d[i].clone() * 8.0 / left - y[i].clone() * (20.0 / (left * left))) * tau;
            let from_right =
                (-d[i].clone() * 8.0 / right - y[i].clone() * (20.0 / (right * right))) * tau;
            (init.clone() * tau).max_value(from_left.max_value(from_right)) * tau
        })
        .collect();

    Ok((d, e))
}

/// Interval lengths on either side of knot `i`, repeating the single
/// adjacent interval at the ends.
fn neighbour_intervals(h: &[f64], i: usize) -> (f64, f64) {
    let last = h.len();
    if i == 0 {
        (h[0], h[0])
    } else if i == last {
        (h[last - 1], h[last - 1])
    } else {
        (h[i - 1], h[i])
    }
}
