//! Shape-preserving C2 cubic spline with extra knots.
//!
//! Each data interval is split at `θh` and `(1-θ)h`. The second derivative
//! is piecewise linear through the data knots and the two extra knots, so
//! the curve is C2 while the second derivative keeps the sign the data's
//! second differences ask for. Knot first derivatives are chosen first so
//! that a cubic Hermite piece on every interval already has end curvatures
//! of the right sign and, where the data are monotone, stays monotone. The
//! extra knots then carry the knot second derivatives across.
//!
//! `θ` starts at 1/3 and shrinks until every piece keeps the required
//! shape. As `θ` goes to zero the three pieces approach that Hermite cubic,
//! so the search ends in a valid split or at a floor where the construction
//! fails. Monotonicity is dropped only for data that change direction and
//! admit no derivatives satisfying both constraints.

use crate::error::{MathError, MathResult};
use crate::filter::monotonicity::three_point;
use crate::knots::KnotSequence;
use crate::piecewise::PiecewisePolynomialResult;
use crate::scalar::SplineScalar;
use log::{debug, trace};

const INITIAL_THETA: f64 = 1.0 / 3.0;
const THETA_SHRINK: f64 = 0.8;

/// Smallest split fraction tried before an interval is declared infeasible.
const MIN_THETA: f64 = 1e-16;

const TOLERANCE: f64 = 1e-12;

/// `p u + q v <= c` on the derivative pair `(u, v)` of one interval.
#[derive(Debug, Clone, Copy)]
struct HalfPlane {
    p: f64,
    q: f64,
    c: f64,
}

impl HalfPlane {
    fn new(p: f64, q: f64, c: f64) -> Self {
        Self { p, q, c }
    }

    fn holds(&self, u: f64, v: f64, scale: f64) -> bool {
        self.p * u + self.q * v <= self.c + TOLERANCE * (self.c.abs() + scale)
    }
}

/// Builds the shape-preserving cubic for sorted, distinct `x`.
///
/// # Errors
///
/// Returns an error for fewer than three points, and
/// [`MathError::ConvergenceFailed`] when no knot derivatives satisfy the
/// shape constraints or some interval admits no split down to the
/// smallest `θ`.
pub fn shape_preserving_cubic(x: &[f64], y: &[f64]) -> MathResult<PiecewisePolynomialResult> {
    let n = x.len();
    if n < 3 {
        return Err(MathError::insufficient_data(3, n));
    }
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    let mut beta = vec![0.0; n];
    for i in 1..n - 1 {
        beta[i] = sign(s[i] - s[i - 1]);
    }
    beta[0] = beta[1];
    beta[n - 1] = beta[n - 2];

    let mut initial = Vec::with_capacity(n);
    initial.push(three_point(h[0], h[1], &s[0], &s[1]));
    for i in 1..n - 1 {
        if s[i - 1] * s[i] > 0.0 {
            initial.push(2.0 * s[i - 1] * s[i] / (s[i - 1] + s[i]));
        } else {
            initial.push(0.0);
        }
    }
    initial.push(three_point(h[n - 2], h[n - 3], &s[n - 2], &s[n - 3]));

    let (d, monotone) = match admissible_derivatives(&s, &beta, &initial, true) {
        Some(d) => (d, true),
        None if changes_direction(&s) => {
            debug!("shape preserving cubic: local monotonicity cannot be kept, keeping convexity");
            let d = admissible_derivatives(&s, &beta, &initial, false)
                .ok_or_else(|| MathError::spline_not_found(2))?;
            (d, false)
        }
        None => return Err(MathError::spline_not_found(1)),
    };

    let m = knot_curvatures(&h, &s, &d, &beta);

    let mut knots = Vec::with_capacity(3 * n - 2);
    let mut rows = Vec::with_capacity(3 * (n - 1));
    for i in 0..n - 1 {
        let split = split_interval(&h, &s, &d, &m, &beta, i, monotone)?;

        knots.push(x[i]);
        knots.push(x[i] + split.lengths[0]);
        knots.push(x[i + 1] - split.lengths[2]);

        let (mut value, mut slope) = (y[i], d[i]);
        for (k, length) in split.lengths.iter().enumerate() {
            let (a, b) = (split.curvature[k], split.curvature[k + 1]);
            rows.push(vec![(b - a) / (6.0 * length), a / 2.0, slope, value]);
            value += slope * length + length * length * (2.0 * a + b) / 6.0;
            slope += length * (a + b) / 2.0;
        }
    }
    knots.push(x[n - 1]);

    debug!(
        "shape preserving cubic: {} points, {} pieces, monotone = {}",
        n,
        rows.len(),
        monotone
    );
    PiecewisePolynomialResult::from_rows(KnotSequence::new(knots)?, &rows)
}

fn sign(v: f64) -> f64 {
    SplineScalar::sign(&v)
}

fn changes_direction(s: &[f64]) -> bool {
    s.windows(2).any(|w| w[0] * w[1] < 0.0)
}

/// End-curvature and optional monotonicity constraints of one interval.
fn interval_constraints(
    kappa_left: f64,
    kappa_right: f64,
    slope: f64,
    monotone: bool,
) -> Vec<HalfPlane> {
    let target = 3.0 * slope;
    let mut planes = Vec::with_capacity(8);
    // sign of the cubic's second derivative at the left end
    if kappa_left != 0.0 {
        planes.push(HalfPlane::new(
            2.0 * kappa_left,
            kappa_left,
            kappa_left * target,
        ));
    }
    // and at the right end
    if kappa_right != 0.0 {
        planes.push(HalfPlane::new(
            -kappa_right,
            -2.0 * kappa_right,
            -kappa_right * target,
        ));
    }
    if monotone {
        let sigma = sign(slope);
        if sigma == 0.0 {
            planes.extend([
                HalfPlane::new(1.0, 0.0, 0.0),
                HalfPlane::new(-1.0, 0.0, 0.0),
                HalfPlane::new(0.0, 1.0, 0.0),
                HalfPlane::new(0.0, -1.0, 0.0),
            ]);
        } else {
            // 0 <= σu, σv <= 3|s| keeps the Hermite cubic monotone
            planes.extend([
                HalfPlane::new(-sigma, 0.0, 0.0),
                HalfPlane::new(0.0, -sigma, 0.0),
                HalfPlane::new(sigma, 0.0, target.abs()),
                HalfPlane::new(0.0, sigma, target.abs()),
            ]);
        }
    }
    planes
}

/// Range of `v` reachable from some `u` in `[lo, hi]`, found from the
/// vertices of the feasible polygon.
fn reachable_range(
    planes: &[HalfPlane],
    (lo, hi): (f64, f64),
    bound: f64,
    scale: f64,
) -> Option<(f64, f64)> {
    let mut all = planes.to_vec();
    all.extend([
        HalfPlane::new(1.0, 0.0, hi),
        HalfPlane::new(-1.0, 0.0, -lo),
        HalfPlane::new(0.0, 1.0, bound),
        HalfPlane::new(0.0, -1.0, bound),
    ]);

    let mut range: Option<(f64, f64)> = None;
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            let det = a.p * b.q - b.p * a.q;
            if det.abs() < 1e-14 {
                continue;
            }
            let u = (a.c * b.q - b.c * a.q) / det;
            let v = (a.p * b.c - b.p * a.c) / det;
            if all.iter().all(|plane| plane.holds(u, v, scale)) {
                range = Some(match range {
                    Some((low, high)) => (low.min(v), high.max(v)),
                    None => (v, v),
                });
            }
        }
    }
    range
}

/// Admissible `u` once `v` is fixed.
fn admissible_left(planes: &[HalfPlane], v: f64) -> (f64, f64) {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;
    for plane in planes {
        let rest = plane.c - plane.q * v;
        if plane.p > 0.0 {
            hi = hi.min(rest / plane.p);
        } else if plane.p < 0.0 {
            lo = lo.max(rest / plane.p);
        }
    }
    (lo, hi)
}

/// Knot first derivatives closest to `initial` satisfying every interval's
/// constraints: a forward pass propagates the reachable range of each knot
/// derivative, a backward pass picks values.
fn admissible_derivatives(
    s: &[f64],
    beta: &[f64],
    initial: &[f64],
    monotone: bool,
) -> Option<Vec<f64>> {
    let n = initial.len();
    let scale = s.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())) + 1.0;
    let bound = 1e3 * scale;

    let planes: Vec<Vec<HalfPlane>> = (0..n - 1)
        .map(|i| interval_constraints(beta[i], beta[i + 1], s[i], monotone))
        .collect();

    let mut ranges = Vec::with_capacity(n);
    ranges.push((-bound, bound));
    for (i, interval) in planes.iter().enumerate() {
        ranges.push(reachable_range(interval, ranges[i], bound, scale)?);
    }

    let mut d = vec![0.0; n];
    let (lo, hi) = ranges[n - 1];
    d[n - 1] = initial[n - 1].clamp(lo, hi);
    for i in (0..n - 1).rev() {
        let (lo, hi) = admissible_left(&planes[i], d[i + 1]);
        let lo = lo.max(ranges[i].0);
        let hi = hi.min(ranges[i].1);
        d[i] = if lo > hi {
            (lo + hi) / 2.0
        } else {
            initial[i].clamp(lo, hi)
        };
    }
    Some(d)
}

/// Second derivatives at the data knots: the smaller of the two adjacent
/// cubic end curvatures when both carry the knot's sign, zero otherwise.
fn knot_curvatures(h: &[f64], s: &[f64], d: &[f64], beta: &[f64]) -> Vec<f64> {
    let n = d.len();
    (0..n)
        .map(|i| {
            let mut candidates = Vec::with_capacity(2);
            if i < n - 1 {
                candidates.push((6.0 * s[i] - 4.0 * d[i] - 2.0 * d[i + 1]) / h[i]);
            }
            if i > 0 {
                candidates.push((-6.0 * s[i - 1] + 2.0 * d[i - 1] + 4.0 * d[i]) / h[i - 1]);
            }
            if beta[i] != 0.0 && candidates.iter().all(|c| sign(*c) == beta[i]) {
                beta[i] * candidates.iter().fold(f64::INFINITY, |acc, c| acc.min(c.abs()))
            } else {
                0.0
            }
        })
        .collect()
}

/// One data interval cut into three cubic pieces.
#[derive(Debug, Clone, Copy)]
struct Split {
    lengths: [f64; 3],
    /// Second derivatives at the interval ends and the two extra knots.
    curvature: [f64; 4],
}

impl Split {
    /// First derivative at every knot of the split, plus its extremum
    /// wherever the second derivative changes sign inside a piece.
    fn slope_extrema(&self, d0: f64) -> Vec<f64> {
        let mut slopes = Vec::with_capacity(7);
        let mut slope = d0;
        slopes.push(slope);
        for (k, length) in self.lengths.iter().enumerate() {
            let (a, b) = (self.curvature[k], self.curvature[k + 1]);
            if a * b < 0.0 {
                let t = length * a / (a - b);
                slopes.push(slope + t * a / 2.0);
            }
            slope += length * (a + b) / 2.0;
            slopes.push(slope);
        }
        slopes
    }
}

/// Finds `θ` and the second derivatives at the two extra knots of interval
/// `i`, shrinking `θ` until both carry the sign of their nearer data knot
/// and, for monotone construction, the first derivative keeps the sign of
/// the interval's secant.
fn split_interval(
    h: &[f64],
    s: &[f64],
    d: &[f64],
    m: &[f64],
    beta: &[f64],
    i: usize,
    monotone: bool,
) -> MathResult<Split> {
    let (h, s, d0, d1, m0, m1) = (h[i], s[i], d[i], d[i + 1], m[i], m[i + 1]);
    let curvature_scale = m0.abs() + m1.abs() + (s.abs() + d0.abs() + d1.abs()) / h;
    let slope_scale = curvature_scale * h;
    let sigma = sign(s);

    let mut theta = INITIAL_THETA;
    let mut shrinks = 0;
    while theta >= MIN_THETA {
        let p = (2.0 * (d1 - d0) / h - theta * (m0 + m1)) / (1.0 - theta);
        let q = 6.0
            * ((s - d0) / h - (theta / 2.0 - theta * theta / 6.0) * m0 - theta * theta * m1 / 6.0)
            / (1.0 - theta);
        let (left, right) = (q - p, 2.0 * p - q);
        let split = Split {
            lengths: [theta * h, (1.0 - 2.0 * theta) * h, theta * h],
            curvature: [m0, left, right, m1],
        };

        let convex = beta[i] * left >= -TOLERANCE * curvature_scale
            && beta[i + 1] * right >= -TOLERANCE * curvature_scale;
        let keeps_direction = !monotone
            || split.slope_extrema(d0).iter().all(|v| {
                if sigma == 0.0 {
                    v.abs() <= TOLERANCE * slope_scale
                } else {
                    sigma * v >= -TOLERANCE * slope_scale
                }
            });
        if convex && keeps_direction {
            if shrinks > 0 {
                trace!(
                    "shape preserving cubic: interval {} split at theta = {:e} after {} shrinks",
                    i,
                    theta,
                    shrinks
                );
            }
            return Ok(split);
        }
        theta *= THETA_SHRINK;
        shrinks += 1;
    }
    Err(MathError::spline_not_found(shrinks))
}
