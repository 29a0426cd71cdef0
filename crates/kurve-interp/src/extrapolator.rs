//! Extrapolators answering queries outside the data.
//!
//! Each extrapolator is anchored at the boundary point of the side being
//! queried. Apart from [`Extrapolator1D::Flat`] and
//! [`Extrapolator1D::Exponential`], the tail matches both the value and the
//! first derivative of the base interpolator at that point.

use crate::bundle::DataBundle;
use crate::error::{InterpResult, InterpolationError};
use crate::interpolator::Interpolator1D;
use kurve_math::MathError;

/// Which side of the data a query falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Below the first key.
    Left,
    /// Above the last key.
    Right,
}

impl Side {
    /// Lower-case name for messages.
    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Space in which a tail is a straight line.
///
/// Linear, log-linear and reciprocal extrapolation share one linear tail
/// evaluator and differ only in this basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TailBasis {
    /// `g = y`.
    Identity,
    /// `g = ln(y)`; the boundary value must be positive.
    Log,
    /// `g = x y`; the query point must not be zero.
    Product,
}

/// A one-dimensional extrapolator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extrapolator1D {
    /// The boundary value, constant.
    Flat,
    /// A straight line with the boundary slope.
    Linear,
    /// A straight line in `ln(y)`.
    LogLinear,
    /// `anchor + a x + b x^2` through the first point with its slope.
    /// Only defined on the left.
    QuadraticLeft {
        /// Value of the quadratic at `x = 0`.
        anchor: f64,
    },
    /// `exp(lambda x)` through the boundary point. Matches the value only.
    Exponential,
    /// A straight line in `x y`, so that `y` decays like `1 / x`.
    Reciprocal,
}

impl Extrapolator1D {
    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Linear => "linear",
            Self::LogLinear => "log-linear",
            Self::QuadraticLeft { .. } => "quadratic left",
            Self::Exponential => "exponential",
            Self::Reciprocal => "reciprocal",
        }
    }

    /// Whether the first derivative is continuous at the boundary.
    pub fn is_smooth(&self) -> bool {
        !matches!(self, Self::Flat | Self::Exponential)
    }

    fn tail_basis(&self) -> Option<TailBasis> {
        match self {
            Self::Linear => Some(TailBasis::Identity),
            Self::LogLinear => Some(TailBasis::Log),
            Self::Reciprocal => Some(TailBasis::Product),
            _ => None,
        }
    }

    /// Extrapolated value at `value`.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::OutOfRange`] when `value` lies within
    /// the data.
    pub fn extrapolate(
        &self,
        bundle: &DataBundle,
        value: f64,
        interpolator: &Interpolator1D,
    ) -> InterpResult<f64> {
        let side = locate(bundle, value)?;
        let (x_b, y_b) = boundary(bundle, side);
        match self {
            Self::Flat => Ok(y_b),
            Self::Exponential => Ok((exponent(side, x_b, y_b)? * value).exp()),
            Self::QuadraticLeft { anchor } => {
                let q = Quadratic::fit(side, *anchor, x_b, y_b, interpolator.first_derivative(bundle, x_b)?)?;
                Ok(q.value(value))
            }
            _ => {
                let basis = self.basis()?;
                let slope = interpolator.first_derivative(bundle, x_b)?;
                let tail = basis.tail(x_b, y_b, slope)?;
                basis.value(tail.level(value), value)
            }
        }
    }

    /// First derivative of the extrapolation at `value`.
    pub fn first_derivative(
        &self,
        bundle: &DataBundle,
        value: f64,
        interpolator: &Interpolator1D,
    ) -> InterpResult<f64> {
        let side = locate(bundle, value)?;
        let (x_b, y_b) = boundary(bundle, side);
        match self {
            Self::Flat => Ok(0.0),
            Self::Exponential => {
                let lambda = exponent(side, x_b, y_b)?;
                Ok(lambda * (lambda * value).exp())
            }
            Self::QuadraticLeft { anchor } => {
                let q = Quadratic::fit(side, *anchor, x_b, y_b, interpolator.first_derivative(bundle, x_b)?)?;
                Ok(q.derivative(value))
            }
            _ => {
                let basis = self.basis()?;
                let slope = interpolator.first_derivative(bundle, x_b)?;
                let tail = basis.tail(x_b, y_b, slope)?;
                let f = basis.value(tail.level(value), value)?;
                Ok(basis.derivative(f, tail.slope, value))
            }
        }
    }

    /// Sensitivities of the extrapolated value to each data value.
    pub fn node_sensitivities(
        &self,
        bundle: &DataBundle,
        value: f64,
        interpolator: &Interpolator1D,
    ) -> InterpResult<Vec<f64>> {
        Ok(self.sensitivities(bundle, value, interpolator)?.value)
    }

    /// Sensitivities of the first derivative to each data value.
    pub fn first_derivative_node_sensitivities(
        &self,
        bundle: &DataBundle,
        value: f64,
        interpolator: &Interpolator1D,
    ) -> InterpResult<Vec<f64>> {
        Ok(self.sensitivities(bundle, value, interpolator)?.derivative)
    }

    fn basis(&self) -> InterpResult<TailBasis> {
        self.tail_basis().ok_or_else(|| {
            MathError::unsupported(format!("linear tail for {} extrapolation", self.description()))
                .into()
        })
    }

    fn sensitivities(
        &self,
        bundle: &DataBundle,
        value: f64,
        interpolator: &Interpolator1D,
    ) -> InterpResult<Sensitivities> {
        let side = locate(bundle, value)?;
        let (x_b, y_b) = boundary(bundle, side);
        let n = bundle.size();
        let index = match side {
            Side::Left => 0,
            Side::Right => n - 1,
        };
        let mut unit = vec![0.0; n];
        unit[index] = 1.0;

        match self {
            Self::Flat => Ok(Sensitivities {
                value: unit,
                derivative: vec![0.0; n],
            }),
            Self::Exponential => {
                let lambda = exponent(side, x_b, y_b)?;
                let f = (lambda * value).exp();
                let d_lambda = 1.0 / (y_b * x_b);
                let value_sens: Vec<f64> = unit.iter().map(|u| f * value * d_lambda * u).collect();
                let derivative = unit
                    .iter()
                    .zip(&value_sens)
                    .map(|(u, df)| d_lambda * u * f + lambda * df)
                    .collect();
                Ok(Sensitivities {
                    value: value_sens,
                    derivative,
                })
            }
            Self::QuadraticLeft { anchor } => {
                let slope = interpolator.first_derivative(bundle, x_b)?;
                let slope_sens = interpolator.first_derivative_node_sensitivities(bundle, x_b)?;
                Quadratic::fit(side, *anchor, x_b, y_b, slope)?;
                let x0_sq = x_b * x_b;
                let mut value_sens = Vec::with_capacity(n);
                let mut derivative = Vec::with_capacity(n);
                for (dy, dd) in unit.iter().zip(&slope_sens) {
                    let db = (x_b * dd - dy) / x0_sq;
                    let da = dd - 2.0 * x_b * db;
                    value_sens.push(da * value + db * value * value);
                    derivative.push(da + 2.0 * db * value);
                }
                Ok(Sensitivities {
                    value: value_sens,
                    derivative,
                })
            }
            _ => {
                let basis = self.basis()?;
                let slope = interpolator.first_derivative(bundle, x_b)?;
                let slope_sens = interpolator.first_derivative_node_sensitivities(bundle, x_b)?;
                let tail = basis.tail(x_b, y_b, slope)?;
                let f = basis.value(tail.level(value), value)?;

                let mut value_sens = Vec::with_capacity(n);
                let mut derivative = Vec::with_capacity(n);
                for (dy, dd) in unit.iter().zip(&slope_sens) {
                    let (d_level, d_slope) = basis.tail_sensitivity(x_b, y_b, slope, *dy, *dd);
                    let d_g = d_level + d_slope * (value - x_b);
                    let (df, df_prime) = basis.value_sensitivity(f, tail.slope, value, d_g, d_slope);
                    value_sens.push(df);
                    derivative.push(df_prime);
                }
                Ok(Sensitivities {
                    value: value_sens,
                    derivative,
                })
            }
        }
    }
}

struct Sensitivities {
    value: Vec<f64>,
    derivative: Vec<f64>,
}

/// A straight line in the transformed space.
#[derive(Debug, Clone, Copy)]
struct Tail {
    key: f64,
    level: f64,
    slope: f64,
}

impl Tail {
    fn level(&self, x: f64) -> f64 {
        self.level + self.slope * (x - self.key)
    }
}

impl TailBasis {
    /// Boundary level and slope in the transformed space.
    fn tail(self, x_b: f64, y_b: f64, slope: f64) -> InterpResult<Tail> {
        let (level, slope) = match self {
            TailBasis::Identity => (y_b, slope),
            TailBasis::Log => {
                if y_b <= 0.0 {
                    return Err(MathError::invalid_input(format!(
                        "log-linear extrapolation needs a positive boundary value, got {y_b}"
                    ))
                    .into());
                }
                (y_b.ln(), slope / y_b)
            }
            TailBasis::Product => (x_b * y_b, y_b + x_b * slope),
        };
        Ok(Tail {
            key: x_b,
            level,
            slope,
        })
    }

    /// Sensitivities of the transformed level and slope, given those of the
    /// boundary value and derivative.
    fn tail_sensitivity(self, x_b: f64, y_b: f64, slope: f64, dy: f64, dd: f64) -> (f64, f64) {
        match self {
            TailBasis::Identity => (dy, dd),
            TailBasis::Log => (dy / y_b, dd / y_b - slope * dy / (y_b * y_b)),
            TailBasis::Product => (x_b * dy, dy + x_b * dd),
        }
    }

    /// Maps a transformed level back to a value.
    fn value(self, g: f64, x: f64) -> InterpResult<f64> {
        match self {
            TailBasis::Identity => Ok(g),
            TailBasis::Log => Ok(g.exp()),
            TailBasis::Product => {
                if x == 0.0 {
                    return Err(MathError::invalid_input(
                        "reciprocal extrapolation is undefined at zero",
                    )
                    .into());
                }
                Ok(g / x)
            }
        }
    }

    fn derivative(self, f: f64, g_slope: f64, x: f64) -> f64 {
        match self {
            TailBasis::Identity => g_slope,
            TailBasis::Log => f * g_slope,
            TailBasis::Product => (g_slope - f) / x,
        }
    }

    fn value_sensitivity(self, f: f64, g_slope: f64, x: f64, d_g: f64, d_slope: f64) -> (f64, f64) {
        match self {
            TailBasis::Identity => (d_g, d_slope),
            TailBasis::Log => {
                let df = f * d_g;
                (df, df * g_slope + f * d_slope)
            }
            TailBasis::Product => {
                let df = d_g / x;
                (df, (d_slope - df) / x)
            }
        }
    }
}

/// `anchor + a x + b x^2` matching value and slope at the first key.
struct Quadratic {
    anchor: f64,
    a: f64,
    b: f64,
}

impl Quadratic {
    fn fit(side: Side, anchor: f64, x0: f64, y0: f64, d0: f64) -> InterpResult<Self> {
        if side == Side::Right {
            return Err(MathError::unsupported("quadratic extrapolation right of the data").into());
        }
        if x0 == 0.0 {
            return Err(MathError::invalid_input(
                "quadratic extrapolation needs a nonzero first key",
            )
            .into());
        }
        let b = (d0 * x0 - y0 + anchor) / (x0 * x0);
        Ok(Self {
            anchor,
            a: d0 - 2.0 * b * x0,
            b,
        })
    }

    fn value(&self, x: f64) -> f64 {
        self.anchor + self.a * x + self.b * x * x
    }

    fn derivative(&self, x: f64) -> f64 {
        self.a + 2.0 * self.b * x
    }
}

/// `ln(y_b) / x_b` for the exponential tail.
fn exponent(side: Side, x_b: f64, y_b: f64) -> InterpResult<f64> {
    if y_b <= 0.0 || x_b == 0.0 {
        return Err(MathError::invalid_input(format!(
            "exponential extrapolation on the {} needs a positive value at a nonzero key, got {y_b} at {x_b}",
            side.name()
        ))
        .into());
    }
    Ok(y_b.ln() / x_b)
}

fn boundary(bundle: &DataBundle, side: Side) -> (f64, f64) {
    match side {
        Side::Left => (bundle.first_key(), bundle.values()[0]),
        Side::Right => (bundle.last_key(), bundle.values()[bundle.size() - 1]),
    }
}

/// Side of the data `value` falls on.
pub(crate) fn locate(bundle: &DataBundle, value: f64) -> InterpResult<Side> {
    if !value.is_finite() {
        return Err(MathError::invalid_input(format!("query point must be finite, got {value}")).into());
    }
    if value < bundle.first_key() {
        Ok(Side::Left)
    } else if value > bundle.last_key() {
        Ok(Side::Right)
    } else {
        Err(InterpolationError::out_of_range(
            "extrapolation",
            value,
            bundle.first_key(),
            bundle.last_key(),
        ))
    }
}
