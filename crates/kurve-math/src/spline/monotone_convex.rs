//! Monotone convex (Hagan-West) construction.
//!
//! Inputs are times `t_i > 0` and spot rates `r_i`. The discrete forwards
//! `(r_i t_i - r_{i-1} t_{i-1}) / h_i` (with `r_0 t_0 = 0` at `t_0 = 0`) are
//! reproduced exactly on average by a piecewise quadratic instantaneous
//! forward curve. The result is its antiderivative `F(t) = r(t) t`.
//!
//! Reference: Hagan, P. & West, G. (2006) "Interpolation Methods for Curve Construction"

use crate::error::{MathError, MathResult};
use crate::knots::KnotSequence;
use crate::piecewise::PiecewisePolynomialResult;
use log::debug;

/// Split points closer than this fraction to an interval end are dropped
/// in favour of the single-piece form.
const SPLIT_TOLERANCE: f64 = 1e-9;

/// Builds `F(t) = r(t) t` for sorted, distinct, positive `times`.
///
/// The returned result has order 4 and its knots start at `0`; extra knots
/// appear inside intervals where the forward curve needs a flat section.
///
/// # Errors
///
/// Returns an error if the first time is not positive or fewer than two
/// points are given.
pub fn monotone_convex(times: &[f64], rates: &[f64]) -> MathResult<PiecewisePolynomialResult> {
    let n = times.len();
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }
    if times[0] <= 0.0 {
        return Err(MathError::invalid_input(format!(
            "monotone convex times must be positive, got {}",
            times[0]
        )));
    }

    let mut nodes = Vec::with_capacity(n + 1);
    nodes.push(0.0);
    nodes.extend_from_slice(times);
    let h: Vec<f64> = nodes.windows(2).map(|w| w[1] - w[0]).collect();

    // discrete forwards, one per interval
    let mut discrete = Vec::with_capacity(n);
    let mut previous = 0.0;
    for i in 0..n {
        let area = rates[i] * times[i];
        discrete.push((area - previous) / h[i]);
        previous = area;
    }

    let forwards = node_forwards(&h, &discrete);
    debug!(
        "monotone convex: {} intervals, node forwards {:?}",
        n, forwards
    );

    let mut knots = vec![0.0];
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(2 * n);
    for i in 0..n {
        let fd = discrete[i];
        let g0 = forwards[i] - fd;
        let g1 = forwards[i + 1] - fd;
        for (length, row) in interval_pieces(h[i], fd, g0, g1) {
            let start = *knots.last().unwrap_or(&0.0);
            knots.push(start + length);
            rows.push(row);
        }
        // pin the interval end to the input time
        if let Some(last) = knots.last_mut() {
            *last = nodes[i + 1];
        }
    }

    let forward_curve = PiecewisePolynomialResult::from_rows(KnotSequence::new(knots)?, &rows)?;
    forward_curve.antiderivative(0.0)
}

/// Instantaneous forwards at the nodes, with the positivity collar applied
/// when every discrete forward is nonnegative.
fn node_forwards(h: &[f64], discrete: &[f64]) -> Vec<f64> {
    let n = discrete.len();
    let mut f = vec![0.0; n + 1];
    for i in 1..n {
        f[i] = (h[i - 1] * discrete[i] + h[i] * discrete[i - 1]) / (h[i - 1] + h[i]);
    }
    f[0] = discrete[0] - (f[1] - discrete[0]) / 2.0;
    f[n] = discrete[n - 1] - (f[n - 1] - discrete[n - 1]) / 2.0;

    if discrete.iter().all(|fd| *fd >= 0.0) {
        f[0] = f[0].clamp(0.0, 2.0 * discrete[0]);
        for i in 1..n {
            f[i] = f[i].clamp(0.0, 2.0 * discrete[i - 1].min(discrete[i]));
        }
        f[n] = f[n].clamp(0.0, 2.0 * discrete[n - 1]);
    }
    f
}

/// Quadratic forward pieces `(length, [a, b, c])` covering one interval.
///
/// `g0`, `g1` are the node forwards minus the discrete forward `fd`; every
/// shape integrates `g` to zero over the interval.
fn interval_pieces(h: f64, fd: f64, g0: f64, g1: f64) -> Vec<(f64, Vec<f64>)> {
    let single = |g0: f64, g1: f64| {
        vec![(
            h,
            vec![
                (3.0 * g0 + 3.0 * g1) / (h * h),
                (-4.0 * g0 - 2.0 * g1) / h,
                fd + g0,
            ],
        )]
    };
    if g0 == 0.0 || g1 == 0.0 {
        return single(g0, g1);
    }

    let q = g1 / g0;
    let split = |eta: f64| eta > SPLIT_TOLERANCE && eta < 1.0 - SPLIT_TOLERANCE;

    if q > 0.0 {
        let eta = g1 / (g1 + g0);
        if !split(eta) {
            return single(g0, g1);
        }
        let a = -g0 * g1 / (g0 + g1);
        let (l1, l2) = (eta * h, (1.0 - eta) * h);
        vec![
            (l1, vec![(g0 - a) / (l1 * l1), -2.0 * (g0 - a) / l1, fd + g0]),
            (l2, vec![(g1 - a) / (l2 * l2), 0.0, fd + a]),
        ]
    } else if q < -2.0 {
        let eta = (g1 + 2.0 * g0) / (g1 - g0);
        if !split(eta) {
            return single(g0, g1);
        }
        let l2 = (1.0 - eta) * h;
        vec![
            (eta * h, vec![0.0, 0.0, fd + g0]),
            (l2, vec![(g1 - g0) / (l2 * l2), 0.0, fd + g0]),
        ]
    } else if q > -0.5 {
        let eta = 3.0 * g1 / (g1 - g0);
        if !split(eta) {
            return single(g0, g1);
        }
        let l1 = eta * h;
        vec![
            (l1, vec![(g0 - g1) / (l1 * l1), -2.0 * (g0 - g1) / l1, fd + g0]),
            ((1.0 - eta) * h, vec![0.0, 0.0, fd + g1]),
        ]
    } else {
        single(g0, g1)
    }
}
