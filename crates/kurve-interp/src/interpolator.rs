//! One-dimensional interpolators over a [`DataBundle`].
//!
//! # Available Methods
//!
//! - [`Interpolator1D::Linear`]: straight lines between points
//! - [`Interpolator1D::LogLinear`]: linear in the logarithm of the values
//! - [`Interpolator1D::NaturalCubic`]: classic natural cubic spline
//! - [`Interpolator1D::MonotoneConvex`]: Hagan-West on spot rates
//! - [`Interpolator1D::Spline`]: any [`SplineInterpolator`], with or without
//!   a shape filter
//!
//! | Method | Smoothness | Node sensitivities |
//! |--------|------------|--------------------|
//! | Linear | C0 | Analytic |
//! | Log-Linear | C0 | Analytic |
//! | Natural Cubic | C2 | Analytic |
//! | Monotone Convex | C1 | Finite difference |
//! | Spline | C1 to C2 | Analytic or finite difference |

use crate::bundle::{DataBundle, SolvedState, SplineFit};
use crate::error::{InterpResult, InterpolationError};
use kurve_math::linear_algebra::solve_tridiagonal;
use kurve_math::prelude::*;
use log::debug;
use nalgebra::DMatrix;

/// Relative bump for finite-difference node sensitivities.
const FD_BUMP: f64 = 1e-6;

/// Values smaller than this are bumped as if they had this magnitude.
const FD_FLOOR: f64 = 1e-2;

/// How node sensitivities of a spline interpolator are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SensitivityMethod {
    /// Propagated through the construction alongside the coefficients.
    #[default]
    Analytic,
    /// Centered differences of the whole construction.
    FiniteDifference,
}

/// A one-dimensional interpolation method.
///
/// Interpolators hold configuration only; the data and any solved state
/// live in the [`DataBundle`] passed to each query.
///
/// # Example
///
/// ```rust
/// use kurve_interp::Interpolator1D;
///
/// let interp = Interpolator1D::NaturalCubic;
/// let bundle = interp
///     .data_bundle(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0])
///     .unwrap();
///
/// let y = interp.interpolate(&bundle, 1.5).unwrap();
/// assert!(y > 1.0 && y < 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolator1D {
    /// Linear interpolation.
    Linear,
    /// Linear interpolation of `ln(y)`; values must be positive.
    LogLinear,
    /// Natural cubic spline solved with the Thomas algorithm.
    NaturalCubic,
    /// Monotone convex interpolation of spot rates; keys must be positive.
    MonotoneConvex,
    /// A piecewise polynomial spline.
    Spline {
        /// Variant and filter.
        spline: SplineInterpolator,
        /// Sensitivity strategy.
        sensitivity: SensitivityMethod,
    },
}

impl Interpolator1D {
    /// A spline interpolator with analytic sensitivities.
    pub fn spline(spline: SplineInterpolator) -> Self {
        Self::Spline {
            spline,
            sensitivity: SensitivityMethod::Analytic,
        }
    }

    /// Selects the sensitivity strategy; only spline interpolators have a choice.
    #[must_use]
    pub fn with_sensitivity_method(self, method: SensitivityMethod) -> Self {
        match self {
            Self::Spline { spline, .. } => Self::Spline {
                spline,
                sensitivity: method,
            },
            other => other,
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::LogLinear => "log-linear".to_string(),
            Self::NaturalCubic => "natural cubic".to_string(),
            Self::MonotoneConvex => "monotone convex".to_string(),
            Self::Spline { spline, .. } => format!("{} spline", spline.name()),
        }
    }

    /// Minimum number of data points.
    pub fn minimum_points(&self) -> usize {
        match self {
            Self::Spline { spline, .. } => spline.minimum_points(),
            _ => 2,
        }
    }

    /// Whether [`node_sensitivities`](Self::node_sensitivities) is analytic.
    pub fn has_analytic_sensitivities(&self) -> bool {
        match self {
            Self::Linear | Self::LogLinear | Self::NaturalCubic => true,
            Self::MonotoneConvex => false,
            Self::Spline {
                spline,
                sensitivity,
            } => *sensitivity == SensitivityMethod::Analytic && spline.supports_sensitivity(),
        }
    }

    /// Sorts and validates data for this interpolator.
    pub fn data_bundle(&self, keys: &[f64], values: &[f64]) -> InterpResult<DataBundle> {
        let bundle = DataBundle::new(keys.to_vec(), values.to_vec())?;
        self.validate(&bundle)?;
        Ok(bundle)
    }

    /// Validates data whose keys are already strictly increasing.
    pub fn data_bundle_from_sorted(
        &self,
        keys: &[f64],
        values: &[f64],
    ) -> InterpResult<DataBundle> {
        let bundle = DataBundle::from_sorted(keys.to_vec(), values.to_vec())?;
        self.validate(&bundle)?;
        Ok(bundle)
    }

    /// Checks that `bundle` meets this interpolator's requirements.
    pub fn validate(&self, bundle: &DataBundle) -> InterpResult<()> {
        if bundle.size() < self.minimum_points() {
            return Err(MathError::insufficient_data(self.minimum_points(), bundle.size()).into());
        }
        match self {
            Self::LogLinear => {
                if let Some(bad) = bundle.values().iter().find(|v| **v <= 0.0) {
                    return Err(MathError::invalid_input(format!(
                        "log-linear interpolation needs positive values, got {bad}"
                    ))
                    .into());
                }
            }
            Self::MonotoneConvex => {
                if bundle.first_key() <= 0.0 {
                    return Err(MathError::invalid_input(format!(
                        "monotone convex interpolation needs positive keys, got {}",
                        bundle.first_key()
                    ))
                    .into());
                }
            }
            Self::Spline { spline, .. } => {
                if spline.variant() == SplineVariant::MonotoneConvex {
                    return Err(MathError::invalid_input(
                        "the monotone convex variant returns r(t) t; use Interpolator1D::MonotoneConvex",
                    )
                    .into());
                }
            }
            Self::Linear | Self::NaturalCubic => {}
        }
        Ok(())
    }

    /// Interpolated value at `value`.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::OutOfRange`] outside the keys, and any
    /// error from solving the bundle.
    pub fn interpolate(&self, bundle: &DataBundle, value: f64) -> InterpResult<f64> {
        check_interior(bundle, value)?;
        let i = bundle.interval_index(value);
        let (keys, values) = (bundle.keys(), bundle.values());
        match self {
            Self::Linear => {
                let w = (value - keys[i]) / (keys[i + 1] - keys[i]);
                Ok(values[i] + w * (values[i + 1] - values[i]))
            }
            Self::LogLinear => {
                let w = (value - keys[i]) / (keys[i + 1] - keys[i]);
                let (l0, l1) = (values[i].ln(), values[i + 1].ln());
                Ok((l0 + w * (l1 - l0)).exp())
            }
            _ => match self.solved(bundle)? {
                SolvedState::NaturalCubic {
                    second_derivatives, ..
                } => {
                    let c = CubicPiece::new(bundle, second_derivatives, i, value);
                    Ok(c.value())
                }
                SolvedState::MonotoneConvex(result) => Ok(result.evaluate(value)? / value),
                SolvedState::Spline { fit, .. } => Ok(fit.result().evaluate(value)?),
            },
        }
    }

    /// First derivative at `value`.
    pub fn first_derivative(&self, bundle: &DataBundle, value: f64) -> InterpResult<f64> {
        check_interior(bundle, value)?;
        let i = bundle.interval_index(value);
        let (keys, values) = (bundle.keys(), bundle.values());
        match self {
            Self::Linear => Ok((values[i + 1] - values[i]) / (keys[i + 1] - keys[i])),
            Self::LogLinear => {
                let slope = (values[i + 1].ln() - values[i].ln()) / (keys[i + 1] - keys[i]);
                Ok(self.interpolate(bundle, value)? * slope)
            }
            _ => match self.solved(bundle)? {
                SolvedState::NaturalCubic {
                    second_derivatives, ..
                } => {
                    let c = CubicPiece::new(bundle, second_derivatives, i, value);
                    Ok(c.derivative())
                }
                SolvedState::MonotoneConvex(result) => {
                    let area = result.evaluate(value)?;
                    Ok((result.differentiate(value)? - area / value) / value)
                }
                SolvedState::Spline { fit, .. } => Ok(fit.result().differentiate(value)?),
            },
        }
    }

    /// Sensitivities of the interpolated value to each data value.
    ///
    /// Analytic where the method supports it, finite differences otherwise.
    ///
    /// # Errors
    ///
    /// A spline configured for analytic sensitivities whose variant has
    /// none returns [`MathError::Unsupported`].
    pub fn node_sensitivities(&self, bundle: &DataBundle, value: f64) -> InterpResult<Vec<f64>> {
        check_interior(bundle, value)?;
        let i = bundle.interval_index(value);
        let n = bundle.size();
        let keys = bundle.keys();
        match self {
            Self::Linear => {
                let w = (value - keys[i]) / (keys[i + 1] - keys[i]);
                let mut sens = vec![0.0; n];
                sens[i] = 1.0 - w;
                sens[i + 1] = w;
                Ok(sens)
            }
            Self::LogLinear => {
                let values = bundle.values();
                let w = (value - keys[i]) / (keys[i + 1] - keys[i]);
                let y = self.interpolate(bundle, value)?;
                let mut sens = vec![0.0; n];
                sens[i] = y * (1.0 - w) / values[i];
                sens[i + 1] = y * w / values[i + 1];
                Ok(sens)
            }
            Self::MonotoneConvex => self.finite_difference_sensitivities(bundle, value),
            Self::NaturalCubic => match self.solved(bundle)? {
                SolvedState::NaturalCubic {
                    second_derivatives,
                    jacobian,
                } => {
                    let c = CubicPiece::new(bundle, second_derivatives, i, value);
                    Ok(c.value_sensitivities(jacobian))
                }
                _ => Err(mismatch(self)),
            },
            Self::Spline { sensitivity, .. } => match self.solved(bundle)? {
                SolvedState::Spline {
                    fit: SplineFit::WithSensitivity(with_sens),
                    ..
                } => Ok(with_sens.node_sensitivity(value)?.iter().copied().collect()),
                _ if *sensitivity == SensitivityMethod::FiniteDifference => {
                    self.finite_difference_sensitivities(bundle, value)
                }
                _ => Err(MathError::unsupported(format!(
                    "analytic node sensitivities of {}",
                    self.description()
                ))
                .into()),
            },
        }
    }

    /// Sensitivities of the first derivative to each data value.
    pub fn first_derivative_node_sensitivities(
        &self,
        bundle: &DataBundle,
        value: f64,
    ) -> InterpResult<Vec<f64>> {
        check_interior(bundle, value)?;
        let i = bundle.interval_index(value);
        let n = bundle.size();
        let keys = bundle.keys();
        match self {
            Self::Linear => {
                let h = keys[i + 1] - keys[i];
                let mut sens = vec![0.0; n];
                sens[i] = -1.0 / h;
                sens[i + 1] = 1.0 / h;
                Ok(sens)
            }
            Self::LogLinear => {
                let values = bundle.values();
                let h = keys[i + 1] - keys[i];
                let slope = (values[i + 1].ln() - values[i].ln()) / h;
                let y = self.interpolate(bundle, value)?;
                let mut sens = self.node_sensitivities(bundle, value)?;
                sens.iter_mut().for_each(|s| *s *= slope);
                sens[i] -= y / (h * values[i]);
                sens[i + 1] += y / (h * values[i + 1]);
                Ok(sens)
            }
            Self::NaturalCubic => match self.solved(bundle)? {
                SolvedState::NaturalCubic {
                    second_derivatives,
                    jacobian,
                } => {
                    let c = CubicPiece::new(bundle, second_derivatives, i, value);
                    Ok(c.derivative_sensitivities(jacobian))
                }
                _ => Err(mismatch(self)),
            },
            _ => match self.solved(bundle)? {
                SolvedState::Spline {
                    fit: SplineFit::WithSensitivity(with_sens),
                    ..
                } => Ok(with_sens
                    .differentiate_node_sensitivity(value)?
                    .iter()
                    .copied()
                    .collect()),
                _ => self.finite_difference(bundle, value, Self::first_derivative),
            },
        }
    }

    /// Node sensitivities by centered finite differences, bumping each value
    /// of the bundle in turn.
    ///
    /// Always available; used as the fallback where no analytic form exists.
    pub fn finite_difference_sensitivities(
        &self,
        bundle: &DataBundle,
        value: f64,
    ) -> InterpResult<Vec<f64>> {
        check_interior(bundle, value)?;
        self.finite_difference(bundle, value, Self::interpolate)
    }

    fn finite_difference<F>(&self, bundle: &DataBundle, value: f64, query: F) -> InterpResult<Vec<f64>>
    where
        F: Fn(&Self, &DataBundle, f64) -> InterpResult<f64>,
    {
        bundle
            .values()
            .iter()
            .enumerate()
            .map(|(k, y)| {
                let bump = FD_BUMP * y.abs().max(FD_FLOOR);
                let up = bundle.with_value_at_index(k, y + bump)?;
                let down = bundle.with_value_at_index(k, y - bump)?;
                Ok((query(self, &up, value)? - query(self, &down, value)?) / (2.0 * bump))
            })
            .collect()
    }

    fn solved<'a>(&self, bundle: &'a DataBundle) -> InterpResult<&'a SolvedState> {
        let state = bundle.state_or_init(|| self.solve(bundle))?;
        let matches = match (self, state) {
            (Self::NaturalCubic, SolvedState::NaturalCubic { .. })
            | (Self::MonotoneConvex, SolvedState::MonotoneConvex(_)) => true,
            (Self::Spline { spline, .. }, SolvedState::Spline { spline: solved, fit }) => {
                let needs_sensitivity = self.has_analytic_sensitivities();
                spline == solved
                    && (!needs_sensitivity || matches!(fit, SplineFit::WithSensitivity(_)))
            }
            _ => false,
        };
        if matches {
            Ok(state)
        } else {
            Err(mismatch(self))
        }
    }

    fn solve(&self, bundle: &DataBundle) -> InterpResult<SolvedState> {
        self.validate(bundle)?;
        debug!(
            "solving {} interpolator on {} points",
            self.description(),
            bundle.size()
        );
        match self {
            Self::NaturalCubic => natural_cubic_state(bundle.keys(), bundle.values()),
            Self::MonotoneConvex => {
                let result = SplineInterpolator::new(SplineVariant::MonotoneConvex)
                    .interpolate(bundle.keys(), bundle.values())?;
                Ok(SolvedState::MonotoneConvex(result))
            }
            Self::Spline { spline, .. } => {
                let fit = if self.has_analytic_sensitivities() {
                    SplineFit::WithSensitivity(
                        spline.interpolate_with_sensitivity(bundle.keys(), bundle.values())?,
                    )
                } else {
                    SplineFit::Plain(spline.interpolate(bundle.keys(), bundle.values())?)
                };
                Ok(SolvedState::Spline {
                    spline: *spline,
                    fit,
                })
            }
            Self::Linear | Self::LogLinear => Err(MathError::unsupported(format!(
                "solved state for {} interpolation",
                self.description()
            ))
            .into()),
        }
    }
}

fn check_interior(bundle: &DataBundle, value: f64) -> InterpResult<()> {
    if !value.is_finite() {
        return Err(MathError::invalid_input(format!("query point must be finite, got {value}")).into());
    }
    if value < bundle.first_key() || value > bundle.last_key() {
        return Err(InterpolationError::out_of_range(
            "interpolation",
            value,
            bundle.first_key(),
            bundle.last_key(),
        ));
    }
    Ok(())
}

fn mismatch(interpolator: &Interpolator1D) -> InterpolationError {
    InterpolationError::bundle_mismatch(format!(
        "bundle was solved for another interpolator than {}",
        interpolator.description()
    ))
}

/// Second derivatives of the natural cubic and their value Jacobian.
fn natural_cubic_state(keys: &[f64], values: &[f64]) -> InterpResult<SolvedState> {
    let n = keys.len();
    let h: Vec<f64> = keys.windows(2).map(|w| w[1] - w[0]).collect();

    let mut lower = vec![0.0; n - 1];
    let mut diagonal = vec![1.0; n];
    let mut upper = vec![0.0; n - 1];
    let mut rhs_jacobian = DMatrix::zeros(n, n);
    for i in 1..n - 1 {
        lower[i - 1] = h[i - 1];
        diagonal[i] = 2.0 * (h[i - 1] + h[i]);
        upper[i] = h[i];
        rhs_jacobian[(i, i - 1)] = 6.0 / h[i - 1];
        rhs_jacobian[(i, i)] = -6.0 / h[i - 1] - 6.0 / h[i];
        rhs_jacobian[(i, i + 1)] = 6.0 / h[i];
    }

    let rhs: Vec<f64> = (0..n)
        .map(|i| (0..n).map(|k| rhs_jacobian[(i, k)] * values[k]).sum())
        .collect();
    let second_derivatives = solve_tridiagonal(&lower, &diagonal, &upper, &rhs)?;

    let mut jacobian = DMatrix::zeros(n, n);
    for k in 0..n {
        let column: Vec<f64> = rhs_jacobian.column(k).iter().copied().collect();
        let solved = solve_tridiagonal(&lower, &diagonal, &upper, &column)?;
        for (i, v) in solved.into_iter().enumerate() {
            jacobian[(i, k)] = v;
        }
    }

    Ok(SolvedState::NaturalCubic {
        second_derivatives,
        jacobian,
    })
}

/// One interval of the classic natural cubic in its symmetric form.
struct CubicPiece {
    index: usize,
    size: usize,
    h: f64,
    a: f64,
    b: f64,
    y0: f64,
    y1: f64,
    m0: f64,
    m1: f64,
}

impl CubicPiece {
    fn new(bundle: &DataBundle, second_derivatives: &[f64], i: usize, x: f64) -> Self {
        let (keys, values) = (bundle.keys(), bundle.values());
        let h = keys[i + 1] - keys[i];
        Self {
            index: i,
            size: keys.len(),
            h,
            a: (keys[i + 1] - x) / h,
            b: (x - keys[i]) / h,
            y0: values[i],
            y1: values[i + 1],
            m0: second_derivatives[i],
            m1: second_derivatives[i + 1],
        }
    }

    fn value(&self) -> f64 {
        let (a, b, h) = (self.a, self.b, self.h);
        a * self.y0 + b * self.y1 + ((a * a * a - a) * self.m0 + (b * b * b - b) * self.m1) * h * h / 6.0
    }

    fn derivative(&self) -> f64 {
        let (a, b, h) = (self.a, self.b, self.h);
        (self.y1 - self.y0) / h - (3.0 * a * a - 1.0) / 6.0 * h * self.m0
            + (3.0 * b * b - 1.0) / 6.0 * h * self.m1
    }

    fn value_sensitivities(&self, jacobian: &DMatrix<f64>) -> Vec<f64> {
        let (a, b, h, i) = (self.a, self.b, self.h, self.index);
        let mut sens: Vec<f64> = (0..self.size)
            .map(|k| {
                ((a * a * a - a) * jacobian[(i, k)] + (b * b * b - b) * jacobian[(i + 1, k)]) * h
                    * h
                    / 6.0
            })
            .collect();
        sens[i] += a;
        sens[i + 1] += b;
        sens
    }

    fn derivative_sensitivities(&self, jacobian: &DMatrix<f64>) -> Vec<f64> {
        let (a, b, h, i) = (self.a, self.b, self.h, self.index);
        let mut sens: Vec<f64> = (0..self.size)
            .map(|k| {
                -(3.0 * a * a - 1.0) / 6.0 * h * jacobian[(i, k)]
                    + (3.0 * b * b - 1.0) / 6.0 * h * jacobian[(i + 1, k)]
            })
            .collect();
        sens[i] -= 1.0 / h;
        sens[i + 1] += 1.0 / h;
        sens
    }
}
