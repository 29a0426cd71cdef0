//! Monotonicity preserving derivative filters.
//!
//! The cubic filter is the Dougherty-Edelman-Hyman extension of Hyman's
//! filter. The quintic filter starts from the cubic derivatives and then
//! bounds the knot second derivatives so that every Bernstein coefficient
//! of the quartic first derivative keeps the sign of the interval slope.

use crate::error::{MathError, MathResult};
use crate::scalar::SplineScalar;
use log::trace;

/// Iteration cap for the quintic first-derivative adjustment.
const MAX_QUINTIC_ITERATIONS: usize = 100;

/// Relative tolerance when comparing admissible second-derivative ranges.
const RANGE_TOLERANCE: f64 = 1e-12;

/// Three-point end derivative with Hyman's sign and magnitude correction.
///
/// `h1`, `s1` belong to the end interval, `h2`, `s2` to its neighbour.
pub fn endpoint_derivative<T: SplineScalar>(h1: f64, h2: f64, s1: &T, s2: &T) -> T {
    let val = three_point(h1, h2, s1, s2);
    if SplineScalar::sign(&val) != s1.sign() {
        s1.constant(0.0)
    } else if s1.sign() != s2.sign() && val.value().abs() > 3.0 * s1.value().abs() {
        s1.clone() * 3.0
    } else {
        val
    }
}

/// The uncorrected three-point end derivative `((2h1 + h2) s1 - h1 s2) / (h1 + h2)`.
pub fn three_point<T: SplineScalar>(h1: f64, h2: f64, s1: &T, s2: &T) -> T {
    (s1.clone() * (2.0 * h1 + h2) - s2.clone() * h1) / (h1 + h2)
}

/// Filters knot first derivatives so cubic Hermite pieces stay monotone
/// wherever the data are.
///
/// `initial` holds the primary spline's knot derivatives; at least three
/// knots are required.
pub fn cubic_first_derivatives<T: SplineScalar>(
    intervals: &[f64],
    slopes: &[T],
    initial: &[T],
) -> Vec<T> {
    let n = initial.len();
    let h = intervals;
    let s = slopes;
    let mut d: Vec<T> = Vec::with_capacity(n);

    d.push(endpoint_derivative(h[0], h[1], &s[0], &s[1]));

    for i in 1..n - 1 {
        let p = (s[i - 1].clone() * h[i] + s[i].clone() * h[i - 1]) / (h[i - 1] + h[i]);
        let mut bound = s[i - 1]
            .clone()
            .abs()
            .min_value(s[i].clone().abs())
            .min_value(p.clone().abs())
            * 3.0;

        if i >= 2 {
            let p_left = (s[i - 1].clone() * (2.0 * h[i - 1] + h[i - 2])
                - s[i - 2].clone() * h[i - 1])
                / (h[i - 2] + h[i - 1]);
            let widen = p.sign() == p_left.sign()
                && p.sign() == sign_of(s[i - 1].value() - s[i - 2].value())
                && p.sign() == sign_of(s[i].value() - s[i - 1].value());
            if widen {
                let wide = p.clone().abs().min_value(p_left.abs()) * 1.5;
                bound = bound.max_value(wide);
            }
        }
        if i + 3 <= n {
            let p_right = (s[i].clone() * (2.0 * h[i] + h[i + 1]) - s[i + 1].clone() * h[i])
                / (h[i] + h[i + 1]);
            let widen = -p.sign() == -p_right.sign()
                && -p.sign() == sign_of(s[i + 1].value() - s[i].value())
                && -p.sign() == sign_of(s[i].value() - s[i - 1].value());
            if widen {
                let wide = p.clone().abs().min_value(p_right.abs()) * 1.5;
                bound = bound.max_value(wide);
            }
        }

        let init = &initial[i];
        let sigma = init.sign();
        if sigma != p.sign() {
            d.push(init.constant(0.0));
        } else {
            d.push(init.clone().abs().min_value(bound) * sigma);
        }
    }

    d.push(endpoint_derivative(h[n - 2], h[n - 3], &s[n - 2], &s[n - 3]));
    d
}

/// Filters first and second knot derivatives for monotone quintic Hermite
/// pieces.
///
/// # Errors
///
/// Returns [`MathError::ConvergenceFailed`] when the first derivatives
/// cannot be made compatible within the iteration cap.
pub fn quintic_derivatives<T: SplineScalar>(
    intervals: &[f64],
    slopes: &[T],
    initial_first: &[T],
    initial_second: &[T],
) -> MathResult<(Vec<T>, Vec<T>)> {
    let n = initial_first.len();
    if n < 3 {
        return Err(MathError::insufficient_data(3, n));
    }
    let h = intervals;
    let s = slopes;
    let mut d = cubic_first_derivatives(h, s, initial_first);

    for i in 0..n - 1 {
        let sigma = s[i].sign();
        let total = d[i].clone() + d[i + 1].clone();
        if sigma != 0.0 && sigma * total.value() > 5.0 * sigma * s[i].value() {
            let ratio = s[i].clone() * 5.0 / total;
            d[i] = d[i].clone() * ratio.clone();
            d[i + 1] = d[i + 1].clone() * ratio;
        }
    }

    let mut iterations = 0;
    loop {
        let mut adjusted = false;
        for i in 1..n - 1 {
            if s[i - 1].value() * s[i].value() <= 0.0 {
                continue;
            }
            let (lo_b, hi_b) = right_range(h[i - 1], &s[i - 1], &d[i - 1], &d[i]);
            let (lo_a, hi_a) = left_range(h[i], &s[i], &d[i], &d[i + 1]);
            let lo = lo_b.max_value(lo_a);
            let hi = hi_b.min_value(hi_a);
            if !exceeds(lo.value(), hi.value()) {
                continue;
            }

            let blended = ((s[i - 1].clone() * 10.0 - d[i - 1].clone() * 2.0) / h[i - 1]
                + (s[i].clone() * 10.0 - d[i + 1].clone() * 2.0) / h[i])
                / (6.0 * (1.0 / h[i - 1] + 1.0 / h[i]));
            let sigma = s[i].sign();
            let current = d[i].clone();
            d[i] = if blended.sign() != sigma {
                current.constant(0.0)
            } else {
                (current * sigma).min_value(blended * sigma) * sigma
            };
            trace!("monotone quintic: first derivative at knot {} reduced to {:?}", i, d[i].value());
            adjusted = true;
        }
        if !adjusted {
            break;
        }
        iterations += 1;
        if iterations >= MAX_QUINTIC_ITERATIONS {
            return Err(MathError::spline_not_found(iterations));
        }
    }

    let mut e: Vec<T> = Vec::with_capacity(n);
    let (lo, hi) = left_range(h[0], &s[0], &d[0], &d[1]);
    e.push(clamp_into(&initial_second[0], lo, hi));

    for i in 1..n - 1 {
        if s[i - 1].value() * s[i].value() < 0.0 {
            e.push(initial_second[i].clone());
            continue;
        }
        let (lo_b, hi_b) = right_range(h[i - 1], &s[i - 1], &d[i - 1], &d[i]);
        let (lo_a, hi_a) = left_range(h[i], &s[i], &d[i], &d[i + 1]);
        e.push(clamp_into(
            &initial_second[i],
            lo_b.max_value(lo_a),
            hi_b.min_value(hi_a),
        ));
    }

    let last = n - 2;
    let (lo, hi) = right_range(h[last], &s[last], &d[last], &d[last + 1]);
    e.push(clamp_into(&initial_second[n - 1], lo, hi));

    Ok((d, e))
}

fn sign_of(v: f64) -> f64 {
    SplineScalar::sign(&v)
}

fn ordered<T: SplineScalar>(a: T, b: T) -> (T, T) {
    if b.value() < a.value() {
        (b, a)
    } else {
        (a, b)
    }
}

/// Admissible second derivatives at the left knot of an interval.
fn left_range<T: SplineScalar>(h: f64, s: &T, d0: &T, d1: &T) -> (T, T) {
    ordered(
        d0.clone() * (-4.0 / h),
        (s.clone() * 10.0 - d0.clone() * 6.0 - d1.clone() * 2.0) / h,
    )
}

/// Admissible second derivatives at the right knot of an interval.
fn right_range<T: SplineScalar>(h: f64, s: &T, d0: &T, d1: &T) -> (T, T) {
    ordered(
        (d1.clone() * 6.0 + d0.clone() * 2.0 - s.clone() * 10.0) / h,
        d1.clone() * (4.0 / h),
    )
}

fn exceeds(lo: f64, hi: f64) -> bool {
    lo > hi + RANGE_TOLERANCE * lo.abs().max(hi.abs()).max(1.0)
}

fn clamp_into<T: SplineScalar>(value: &T, lo: T, hi: T) -> T {
    if lo.value() > hi.value() {
        (lo + hi) / 2.0
    } else {
        value.clone().max_value(lo).min_value(hi)
    }
}
