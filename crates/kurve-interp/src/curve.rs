//! A data bundle bound to its interpolator and extrapolators.

use crate::bundle::DataBundle;
use crate::combined::CombinedInterpolatorExtrapolator;
use crate::error::InterpResult;
use crate::traits::Interpolator;

/// Data plus the methods that answer queries on it.
///
/// The solved state is built on the first query and reused until a value
/// changes.
///
/// # Example
///
/// ```rust
/// use kurve_interp::prelude::*;
///
/// let combined = CombinedInterpolatorExtrapolator::with_extrapolator(
///     Interpolator1D::LogLinear,
///     Extrapolator1D::LogLinear,
/// );
/// let curve = InterpolatedCurve::new(
///     &[1.0, 2.0, 5.0],
///     &[0.98, 0.955, 0.88],
///     combined,
/// )
/// .unwrap();
///
/// assert!(curve.allows_extrapolation());
/// assert!(curve.interpolate(10.0).unwrap() < 0.88);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedCurve {
    bundle: DataBundle,
    combined: CombinedInterpolatorExtrapolator,
}

impl InterpolatedCurve {
    /// Sorts and validates the data for `combined`.
    pub fn new(
        keys: &[f64],
        values: &[f64],
        combined: CombinedInterpolatorExtrapolator,
    ) -> InterpResult<Self> {
        Ok(Self {
            bundle: combined.data_bundle(keys, values)?,
            combined,
        })
    }

    /// The underlying data.
    pub fn bundle(&self) -> &DataBundle {
        &self.bundle
    }

    /// The query methods.
    pub fn combined(&self) -> &CombinedInterpolatorExtrapolator {
        &self.combined
    }

    /// Sensitivities of the value at `x` to each data value, in key order.
    pub fn node_sensitivities(&self, x: f64) -> InterpResult<Vec<f64>> {
        self.combined.node_sensitivities(&self.bundle, x)
    }

    /// Sensitivities of the first derivative at `x` to each data value.
    pub fn derivative_node_sensitivities(&self, x: f64) -> InterpResult<Vec<f64>> {
        self.combined
            .first_derivative_node_sensitivities(&self.bundle, x)
    }

    /// Replaces one value; the curve is solved again on the next query.
    ///
    /// On error the curve is left unchanged.
    pub fn set_value_at_index(&mut self, index: usize, value: f64) -> InterpResult<()> {
        let mut bundle = self.bundle.clone();
        bundle.set_value_at_index(index, value)?;
        self.combined.interpolator().validate(&bundle)?;
        self.bundle = bundle;
        Ok(())
    }
}

impl Interpolator for InterpolatedCurve {
    fn interpolate(&self, x: f64) -> InterpResult<f64> {
        self.combined.interpolate(&self.bundle, x)
    }

    fn derivative(&self, x: f64) -> InterpResult<f64> {
        self.combined.first_derivative(&self.bundle, x)
    }

    fn allows_extrapolation(&self) -> bool {
        self.combined.left_extrapolator().is_some() || self.combined.right_extrapolator().is_some()
    }

    fn min_x(&self) -> f64 {
        self.bundle.first_key()
    }

    fn max_x(&self) -> f64 {
        self.bundle.last_key()
    }
}
