//! Piecewise polynomial spline construction.
//!
//! A [`SplineInterpolator`] combines a [`SplineVariant`] (how the knot
//! derivatives or second derivatives are found) with an optional
//! [`ShapeFilter`] (how they are adjusted afterwards). Every variant except
//! the monotone convex and shape-preserving cubic constructions is written
//! once over [`SplineScalar`]; running it on [`Tangent`] values yields the
//! coefficient sensitivities with respect to the input values.
//!
//! # Example
//!
//! ```rust
//! use kurve_math::filter::ShapeFilter;
//! use kurve_math::spline::{SplineInterpolator, SplineVariant};
//!
//! let spline = SplineInterpolator::new(SplineVariant::Natural)
//!     .with_filter(ShapeFilter::MonotonicityCubic);
//! let result = spline
//!     .interpolate(&[0.0, 1.0, 2.0, 3.0], &[0.0, 0.0, 1.0, 1.0])
//!     .unwrap();
//!
//! let mid = result.evaluate(1.5).unwrap();
//! assert!(mid > 0.0 && mid < 1.0);
//! ```

pub mod hermite;
pub mod local;
pub mod monotone_convex;
pub mod shape_preserving;
pub mod system;

use crate::error::{MathError, MathResult};
use crate::filter::ShapeFilter;
use crate::knots::KnotSequence;
use crate::linear_algebra::{solve_linear_system, solve_linear_system_multi};
use crate::piecewise::{PiecewisePolynomialResult, PiecewisePolynomialResultWithSensitivity};
use crate::scalar::{SplineScalar, Tangent};
use hermite::{cubic_hermite, cubic_hermite_rows, linear_rows, secant_slopes};
use local::{akima_derivatives, constrained_derivatives};
use log::{debug, warn};
use monotone_convex::monotone_convex;
use nalgebra::DMatrix;
use shape_preserving::shape_preserving_cubic;
use system::{build_system, rows_from_second_derivatives, EndCondition, SplineSystem};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Knot values closer to zero than this make the nonnegativity quintic
/// sensitivities fall back to finite differences.
const ZERO_VALUE: f64 = 1e-14;

/// Relative bump for finite-difference sensitivities.
const FD_BUMP: f64 = 1e-6;

/// How knot derivatives are obtained from the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplineVariant {
    /// Straight lines between knots.
    Linear,
    /// Cubic spline with zero second derivative at both ends.
    Natural,
    /// Cubic spline whose third derivative is continuous at the first and
    /// last interior knots.
    NotAKnot,
    /// Cubic spline with prescribed end derivatives.
    Clamped {
        /// First derivative at the first knot.
        left_derivative: f64,
        /// First derivative at the last knot.
        right_derivative: f64,
    },
    /// Kruger's constrained cubic spline.
    Constrained,
    /// Akima's semi-local cubic spline.
    SemiLocal,
    /// Hagan-West monotone convex construction on spot rates.
    MonotoneConvex,
    /// C2 shape-preserving cubic with two extra knots per interval.
    ShapePreservingCubic,
}

impl SplineVariant {
    /// Minimum number of data points.
    pub fn minimum_points(self) -> usize {
        match self {
            SplineVariant::Linear
            | SplineVariant::Natural
            | SplineVariant::Clamped { .. }
            | SplineVariant::MonotoneConvex => 2,
            SplineVariant::NotAKnot
            | SplineVariant::Constrained
            | SplineVariant::SemiLocal
            | SplineVariant::ShapePreservingCubic => 3,
        }
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            SplineVariant::Linear => "linear",
            SplineVariant::Natural => "natural cubic",
            SplineVariant::NotAKnot => "not-a-knot cubic",
            SplineVariant::Clamped { .. } => "clamped cubic",
            SplineVariant::Constrained => "constrained cubic",
            SplineVariant::SemiLocal => "semi-local cubic",
            SplineVariant::MonotoneConvex => "monotone convex",
            SplineVariant::ShapePreservingCubic => "shape preserving cubic",
        }
    }

    /// Whether the result's knots are exactly the input points, which is
    /// what a [`ShapeFilter`] needs from its primary.
    pub fn keeps_input_knots(self) -> bool {
        !matches!(
            self,
            SplineVariant::MonotoneConvex | SplineVariant::ShapePreservingCubic
        )
    }

    /// Whether analytic coefficient sensitivities are available.
    pub fn supports_sensitivity(self) -> bool {
        self.keeps_input_knots()
    }
}

/// Scalars the generic construction can be finished with.
pub(crate) trait SolveScalar: SplineScalar {
    /// What the coefficient rows are assembled into.
    type Assembled;

    fn assemble(knots: KnotSequence, rows: &[Vec<Self>]) -> MathResult<Self::Assembled>;

    /// Solves a second-derivative system for the knot second derivatives.
    fn solve_moments(system: &SplineSystem, y: &[Self]) -> MathResult<Vec<Self>>;
}

impl SolveScalar for f64 {
    type Assembled = PiecewisePolynomialResult;

    fn assemble(knots: KnotSequence, rows: &[Vec<f64>]) -> MathResult<Self::Assembled> {
        PiecewisePolynomialResult::from_rows(knots, rows)
    }

    fn solve_moments(system: &SplineSystem, _y: &[f64]) -> MathResult<Vec<f64>> {
        let m = solve_linear_system(&system.matrix, &system.rhs)?;
        Ok(m.iter().copied().collect())
    }
}

impl SolveScalar for Tangent {
    type Assembled = PiecewisePolynomialResultWithSensitivity;

    fn assemble(knots: KnotSequence, rows: &[Vec<Tangent>]) -> MathResult<Self::Assembled> {
        PiecewisePolynomialResultWithSensitivity::from_tangent_rows(knots, rows)
    }

    fn solve_moments(system: &SplineSystem, y: &[Tangent]) -> MathResult<Vec<Tangent>> {
        let values = solve_linear_system(&system.matrix, &system.rhs)?;
        // dM/dy = A^-1 B, chained with the gradients the values already carry
        let dm_dy = solve_linear_system_multi(&system.matrix, &system.rhs_jacobian)?;
        let size = y.first().map_or(0, |t| t.grad.len());
        let y_grad = DMatrix::from_fn(y.len(), size, |k, j| y[k].grad[j]);
        let grads = dm_dy * y_grad;
        Ok(values
            .iter()
            .enumerate()
            .map(|(j, v)| Tangent::new(*v, grads.row(j).transpose()))
            .collect())
    }
}

/// Validated data ready for a solve.
#[derive(Debug, Clone)]
struct SortedData {
    knots: KnotSequence,
    values: Vec<f64>,
    /// Input position of each sorted point.
    positions: Vec<usize>,
    /// End derivatives for the clamped variant.
    ends: Option<(f64, f64)>,
}

/// Builds piecewise polynomial interpolants of one-dimensional data.
///
/// Instances are immutable and hold no scratch state, so one interpolator
/// can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineInterpolator {
    variant: SplineVariant,
    filter: Option<ShapeFilter>,
    knot_tolerance: f64,
}

impl SplineInterpolator {
    /// Creates an interpolator for `variant` with no filter.
    pub fn new(variant: SplineVariant) -> Self {
        Self {
            variant,
            filter: None,
            knot_tolerance: 0.0,
        }
    }

    /// Applies `filter` on top of the variant.
    #[must_use]
    pub fn with_filter(mut self, filter: ShapeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Rejects x values closer together than `tolerance` as duplicates.
    #[must_use]
    pub fn with_knot_tolerance(mut self, tolerance: f64) -> Self {
        self.knot_tolerance = tolerance;
        self
    }

    /// The primary variant.
    pub fn variant(&self) -> SplineVariant {
        self.variant
    }

    /// The shape filter, if any.
    pub fn filter(&self) -> Option<ShapeFilter> {
        self.filter
    }

    /// Minimum separation of x values.
    pub fn knot_tolerance(&self) -> f64 {
        self.knot_tolerance
    }

    /// Minimum number of data points accepted.
    pub fn minimum_points(&self) -> usize {
        let filter = self.filter.map_or(0, ShapeFilter::minimum_points);
        self.variant.minimum_points().max(filter)
    }

    /// Whether [`interpolate_with_sensitivity`](Self::interpolate_with_sensitivity)
    /// is available.
    pub fn supports_sensitivity(&self) -> bool {
        self.variant.supports_sensitivity()
    }

    /// Description used in logs and error messages.
    pub fn name(&self) -> String {
        match self.filter {
            Some(filter) => format!("{} over {}", filter.name(), self.variant.name()),
            None => self.variant.name().to_string(),
        }
    }

    /// Interpolates `y` at the points `x`.
    ///
    /// The points need not be sorted; pairs are sorted by `x` first. For a
    /// clamped variant `y` may carry two extra entries, the first and last
    /// being the end derivatives.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched lengths, NaN or infinite values, too
    /// few points, duplicate x values, non-finite coefficients, or when a
    /// shape-preserving construction cannot be found.
    pub fn interpolate(&self, x: &[f64], y: &[f64]) -> MathResult<PiecewisePolynomialResult> {
        let data = self.prepare(x, y)?;
        debug!("building {} spline on {} points", self.name(), x.len());

        match self.variant {
            SplineVariant::MonotoneConvex => monotone_convex(data.knots.as_slice(), &data.values),
            SplineVariant::ShapePreservingCubic => {
                shape_preserving_cubic(data.knots.as_slice(), &data.values)
            }
            _ => {
                let rows = self.solve_rows(&data.knots, &data.values, data.ends)?;
                <f64 as SolveScalar>::assemble(data.knots, &rows)
            }
        }
    }

    /// Interpolates several curves sharing the same `x`.
    ///
    /// Each row of `rows` is one curve; the result stacks them with row
    /// `i * rows.len() + j` holding interval `i` of curve `j`. With the
    /// `parallel` feature the curves are solved on the rayon pool.
    ///
    /// # Errors
    ///
    /// Returns an error if any curve fails, if `rows` is empty, or for the
    /// monotone convex and shape-preserving cubic variants.
    pub fn interpolate_multi(
        &self,
        x: &[f64],
        rows: &[Vec<f64>],
    ) -> MathResult<PiecewisePolynomialResult> {
        if !self.variant.keeps_input_knots() {
            return Err(MathError::unsupported(format!(
                "multi-dimensional {} splines",
                self.variant.name()
            )));
        }
        if rows.is_empty() {
            return Err(MathError::insufficient_data(1, 0));
        }
        debug!("building {} curves of {} spline", rows.len(), self.name());

        #[cfg(feature = "parallel")]
        let results: MathResult<Vec<_>> = rows.par_iter().map(|y| self.interpolate(x, y)).collect();
        #[cfg(not(feature = "parallel"))]
        let results: MathResult<Vec<_>> = rows.iter().map(|y| self.interpolate(x, y)).collect();

        PiecewisePolynomialResult::interleave(results?)
    }

    /// Interpolates and returns coefficient sensitivities to the knot values.
    ///
    /// Column `k` of each sensitivity matrix refers to the value paired with
    /// `x[k]` in the caller's order. End derivatives passed through the
    /// clamped convention are held fixed.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::Unsupported`] for the monotone convex and
    /// shape-preserving cubic variants, and the errors of
    /// [`interpolate`](Self::interpolate) otherwise.
    pub fn interpolate_with_sensitivity(
        &self,
        x: &[f64],
        y: &[f64],
    ) -> MathResult<PiecewisePolynomialResultWithSensitivity> {
        if !self.supports_sensitivity() {
            return Err(MathError::unsupported(format!(
                "node sensitivity of {} splines",
                self.variant.name()
            )));
        }
        let data = self.prepare(x, y)?;

        if self.filter == Some(ShapeFilter::NonnegativityQuintic)
            && data.values.iter().any(|v| v.abs() < ZERO_VALUE)
        {
            warn!(
                "{}: knot value at zero, using finite-difference sensitivities",
                self.name()
            );
            return self.finite_difference_sensitivity(x, y);
        }

        debug!(
            "building {} spline with sensitivities on {} points",
            self.name(),
            x.len()
        );
        let n = data.values.len();
        let seeded: Vec<Tangent> = data
            .values
            .iter()
            .zip(&data.positions)
            .map(|(v, position)| Tangent::variable(*v, *position, n))
            .collect();
        let rows = self.solve_rows(&data.knots, &seeded, data.ends)?;
        Tangent::assemble(data.knots, &rows)
    }

    /// Centered finite differences of the whole construction, bumping each
    /// knot value in turn.
    fn finite_difference_sensitivity(
        &self,
        x: &[f64],
        y: &[f64],
    ) -> MathResult<PiecewisePolynomialResultWithSensitivity> {
        let result = self.interpolate(x, y)?;
        let n = x.len();
        let offset = usize::from(y.len() == n + 2);
        let order = result.order();
        let mut sensitivities = vec![DMatrix::zeros(order, n); result.interval_count()];

        for k in 0..n {
            let index = k + offset;
            let bump = if y[index].abs() < ZERO_VALUE {
                FD_BUMP
            } else {
                FD_BUMP * y[index].abs()
            };
            let mut up = y.to_vec();
            up[index] += bump;
            let mut down = y.to_vec();
            down[index] -= bump;
            let up = self.interpolate(x, &up)?;
            let down = self.interpolate(x, &down)?;

            for (i, matrix) in sensitivities.iter_mut().enumerate() {
                for j in 0..order {
                    matrix[(j, k)] =
                        (up.coefficients()[(i, j)] - down.coefficients()[(i, j)]) / (2.0 * bump);
                }
            }
        }

        PiecewisePolynomialResultWithSensitivity::new(result, sensitivities)
    }

    fn prepare(&self, x: &[f64], y: &[f64]) -> MathResult<SortedData> {
        if let Some(filter) = self.filter {
            if !self.variant.keeps_input_knots() {
                return Err(MathError::invalid_input(format!(
                    "{} filter cannot be applied to {} splines",
                    filter.name(),
                    self.variant.name()
                )));
            }
        }

        let n = x.len();
        let clamped = matches!(self.variant, SplineVariant::Clamped { .. });
        let with_ends = clamped && y.len() == n + 2;
        if y.len() != n && !with_ends {
            return Err(MathError::invalid_input(format!(
                "x and y values must have the same length: {} vs {}",
                n,
                y.len()
            )));
        }
        check_values(x, "x")?;
        check_values(y, "y")?;
        if n < self.minimum_points() {
            return Err(MathError::insufficient_data(self.minimum_points(), n));
        }

        let values = if with_ends { &y[1..=n] } else { y };
        let mut positions: Vec<usize> = (0..n).collect();
        positions.sort_by(|a, b| x[*a].total_cmp(&x[*b]));
        let sorted_x: Vec<f64> = positions.iter().map(|k| x[*k]).collect();
        let sorted_y: Vec<f64> = positions.iter().map(|k| values[*k]).collect();

        let knots = KnotSequence::with_tolerance(sorted_x, self.knot_tolerance)?;

        let ends = match self.variant {
            SplineVariant::Clamped { .. } if with_ends => Some((y[0], y[n + 1])),
            SplineVariant::Clamped {
                left_derivative,
                right_derivative,
            } => Some((left_derivative, right_derivative)),
            _ => None,
        };

        Ok(SortedData {
            knots,
            values: sorted_y,
            positions,
            ends,
        })
    }

    fn solve_rows<T: SolveScalar>(
        &self,
        knots: &KnotSequence,
        y: &[T],
        ends: Option<(f64, f64)>,
    ) -> MathResult<Vec<Vec<T>>> {
        let h = knots.intervals();
        let slopes = secant_slopes(y, &h);
        let primary = self.primary_rows(y, &h, &slopes, ends)?;
        match self.filter {
            Some(filter) => filter.apply(y, &h, &slopes, &primary),
            None => Ok(primary),
        }
    }

    fn primary_rows<T: SolveScalar>(
        &self,
        y: &[T],
        h: &[f64],
        slopes: &[T],
        ends: Option<(f64, f64)>,
    ) -> MathResult<Vec<Vec<T>>> {
        let n = y.len();
        match self.variant {
            SplineVariant::Linear => linear_rows(y, slopes),
            SplineVariant::Natural => match n {
                2 => linear_rows(y, slopes),
                3 => {
                    let zero = y[0].constant(0.0);
                    let middle =
                        (slopes[1].clone() - slopes[0].clone()) * (3.0 / (h[0] + h[1]));
                    rows_from_second_derivatives(y, h, slopes, &[zero.clone(), middle, zero])
                }
                _ => moment_rows(y, h, slopes, EndCondition::Natural),
            },
            SplineVariant::NotAKnot => {
                if n == 3 {
                    quadratic_rows(y, h, slopes)
                } else {
                    moment_rows(y, h, slopes, EndCondition::NotAKnot)
                }
            }
            SplineVariant::Clamped {
                left_derivative,
                right_derivative,
            } => {
                let (left, right) = ends.unwrap_or((left_derivative, right_derivative));
                if n == 2 {
                    let d0 = y[0].constant(left);
                    let d1 = y[0].constant(right);
                    let row = cubic_hermite(&y[0], &d0, &d1, &slopes[0], h[0]);
                    hermite::check_finite(std::slice::from_ref(&row), "clamped cubic")?;
                    Ok(vec![row])
                } else {
                    moment_rows(y, h, slopes, EndCondition::Clamped { left, right })
                }
            }
            SplineVariant::Constrained => {
                cubic_hermite_rows(y, h, slopes, &constrained_derivatives(slopes))
            }
            SplineVariant::SemiLocal => {
                cubic_hermite_rows(y, h, slopes, &akima_derivatives(slopes))
            }
            SplineVariant::MonotoneConvex | SplineVariant::ShapePreservingCubic => {
                Err(MathError::unsupported(format!(
                    "generic construction of {} splines",
                    self.variant.name()
                )))
            }
        }
    }
}

impl Default for SplineInterpolator {
    fn default() -> Self {
        Self::new(SplineVariant::Natural)
    }
}

fn check_values(values: &[f64], name: &str) -> MathResult<()> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(MathError::invalid_input(format!("{name} values contain NaN")));
    }
    if values.iter().any(|v| v.is_infinite()) {
        return Err(MathError::invalid_input(format!(
            "{name} values contain infinite values"
        )));
    }
    Ok(())
}

fn moment_rows<T: SolveScalar>(
    y: &[T],
    h: &[f64],
    slopes: &[T],
    end: EndCondition,
) -> MathResult<Vec<Vec<T>>> {
    let values: Vec<f64> = y.iter().map(SplineScalar::value).collect();
    let system = build_system(h, &values, end)?;
    let m = T::solve_moments(&system, y)?;
    rows_from_second_derivatives(y, h, slopes, &m)
}

/// The parabola through three points, written on both intervals.
fn quadratic_rows<T: SplineScalar>(y: &[T], h: &[f64], slopes: &[T]) -> MathResult<Vec<Vec<T>>> {
    let q = (slopes[1].clone() - slopes[0].clone()) / (h[0] + h[1]);
    let rows = vec![
        vec![
            q.clone(),
            slopes[0].clone() - q.clone() * h[0],
            y[0].clone(),
        ],
        vec![q.clone(), slopes[1].clone() - q * h[1], y[1].clone()],
    ];
    hermite::check_finite(&rows, "not-a-knot quadratic")?;
    Ok(rows)
}
