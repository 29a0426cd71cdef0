//! An interpolator with optional extrapolators on either side.

use crate::bundle::DataBundle;
use crate::error::{InterpResult, InterpolationError};
use crate::extrapolator::{Extrapolator1D, Side};
use crate::interpolator::Interpolator1D;
use kurve_math::MathError;

/// Where a query point lies relative to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Below the first key.
    Left,
    /// Between the first and last key, both included.
    Interior,
    /// Above the last key.
    Right,
}

impl Region {
    /// Classifies `value` against `bundle`.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not finite.
    pub fn locate(bundle: &DataBundle, value: f64) -> InterpResult<Self> {
        if !value.is_finite() {
            return Err(
                MathError::invalid_input(format!("query point must be finite, got {value}")).into(),
            );
        }
        Ok(if value < bundle.first_key() {
            Region::Left
        } else if value > bundle.last_key() {
            Region::Right
        } else {
            Region::Interior
        })
    }
}

/// Dispatches interior queries to an interpolator and exterior queries to
/// the extrapolator configured for that side.
///
/// # Example
///
/// ```rust
/// use kurve_interp::{CombinedInterpolatorExtrapolator, Extrapolator1D, Interpolator1D};
///
/// let combined = CombinedInterpolatorExtrapolator::new(Interpolator1D::Linear)
///     .with_left(Extrapolator1D::Flat)
///     .with_right(Extrapolator1D::Linear);
/// let bundle = combined.data_bundle(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
///
/// assert_eq!(combined.interpolate(&bundle, 0.0).unwrap(), 1.0);
/// assert_eq!(combined.interpolate(&bundle, 3.0).unwrap(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedInterpolatorExtrapolator {
    interpolator: Interpolator1D,
    left: Option<Extrapolator1D>,
    right: Option<Extrapolator1D>,
}

impl CombinedInterpolatorExtrapolator {
    /// An interpolator without extrapolation.
    pub fn new(interpolator: Interpolator1D) -> Self {
        Self {
            interpolator,
            left: None,
            right: None,
        }
    }

    /// The same extrapolator on both sides.
    pub fn with_extrapolator(interpolator: Interpolator1D, extrapolator: Extrapolator1D) -> Self {
        Self::with_extrapolators(interpolator, extrapolator, extrapolator)
    }

    /// Separate extrapolators on each side.
    pub fn with_extrapolators(
        interpolator: Interpolator1D,
        left: Extrapolator1D,
        right: Extrapolator1D,
    ) -> Self {
        Self {
            interpolator,
            left: Some(left),
            right: Some(right),
        }
    }

    /// Sets the left extrapolator.
    #[must_use]
    pub fn with_left(mut self, extrapolator: Extrapolator1D) -> Self {
        self.left = Some(extrapolator);
        self
    }

    /// Sets the right extrapolator.
    #[must_use]
    pub fn with_right(mut self, extrapolator: Extrapolator1D) -> Self {
        self.right = Some(extrapolator);
        self
    }

    /// The interior interpolator.
    pub fn interpolator(&self) -> &Interpolator1D {
        &self.interpolator
    }

    /// The left extrapolator, if any.
    pub fn left_extrapolator(&self) -> Option<&Extrapolator1D> {
        self.left.as_ref()
    }

    /// The right extrapolator, if any.
    pub fn right_extrapolator(&self) -> Option<&Extrapolator1D> {
        self.right.as_ref()
    }

    /// Whether queries on both sides of the data are answered.
    pub fn extrapolates_both_sides(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Sorts and validates data for the interpolator.
    pub fn data_bundle(&self, keys: &[f64], values: &[f64]) -> InterpResult<DataBundle> {
        self.interpolator.data_bundle(keys, values)
    }

    /// Validates data whose keys are already strictly increasing.
    pub fn data_bundle_from_sorted(
        &self,
        keys: &[f64],
        values: &[f64],
    ) -> InterpResult<DataBundle> {
        self.interpolator.data_bundle_from_sorted(keys, values)
    }

    /// Value at any point covered by the interpolator or an extrapolator.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::NoExtrapolator`] for a point outside
    /// the data on a side with no extrapolator.
    pub fn interpolate(&self, bundle: &DataBundle, value: f64) -> InterpResult<f64> {
        match self.extrapolator_at(bundle, value)? {
            None => self.interpolator.interpolate(bundle, value),
            Some(e) => e.extrapolate(bundle, value, &self.interpolator),
        }
    }

    /// First derivative at any covered point.
    pub fn first_derivative(&self, bundle: &DataBundle, value: f64) -> InterpResult<f64> {
        match self.extrapolator_at(bundle, value)? {
            None => self.interpolator.first_derivative(bundle, value),
            Some(e) => e.first_derivative(bundle, value, &self.interpolator),
        }
    }

    /// Sensitivities of the value to each data value at any covered point.
    pub fn node_sensitivities(&self, bundle: &DataBundle, value: f64) -> InterpResult<Vec<f64>> {
        match self.extrapolator_at(bundle, value)? {
            None => self.interpolator.node_sensitivities(bundle, value),
            Some(e) => e.node_sensitivities(bundle, value, &self.interpolator),
        }
    }

    /// Sensitivities of the first derivative at any covered point.
    pub fn first_derivative_node_sensitivities(
        &self,
        bundle: &DataBundle,
        value: f64,
    ) -> InterpResult<Vec<f64>> {
        match self.extrapolator_at(bundle, value)? {
            None => self
                .interpolator
                .first_derivative_node_sensitivities(bundle, value),
            Some(e) => e.first_derivative_node_sensitivities(bundle, value, &self.interpolator),
        }
    }

    /// `None` for interior points.
    fn extrapolator_at(
        &self,
        bundle: &DataBundle,
        value: f64,
    ) -> InterpResult<Option<&Extrapolator1D>> {
        let (configured, side) = match Region::locate(bundle, value)? {
            Region::Interior => return Ok(None),
            Region::Left => (self.left.as_ref(), Side::Left),
            Region::Right => (self.right.as_ref(), Side::Right),
        };
        configured
            .map(Some)
            .ok_or(InterpolationError::NoExtrapolator {
                value,
                side: side.name(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_region() {
        let bundle = DataBundle::new(vec![1.0, 2.0, 3.0], vec![0.0; 3]).unwrap();
        assert_eq!(Region::locate(&bundle, 0.5).unwrap(), Region::Left);
        assert_eq!(Region::locate(&bundle, 1.0).unwrap(), Region::Interior);
        assert_eq!(Region::locate(&bundle, 3.0).unwrap(), Region::Interior);
        assert_eq!(Region::locate(&bundle, 3.5).unwrap(), Region::Right);
        assert!(Region::locate(&bundle, f64::INFINITY).is_err());
    }

    #[test]
    fn test_dispatch() {
        let combined = CombinedInterpolatorExtrapolator::with_extrapolators(
            Interpolator1D::Linear,
            Extrapolator1D::Flat,
            Extrapolator1D::Linear,
        );
        let bundle = combined.data_bundle(&[1.0, 2.0, 4.0], &[1.0, 2.0, 3.0]).unwrap();

        assert_relative_eq!(combined.interpolate(&bundle, 0.0).unwrap(), 1.0);
        assert_relative_eq!(combined.interpolate(&bundle, 3.0).unwrap(), 2.5);
        assert_relative_eq!(combined.interpolate(&bundle, 6.0).unwrap(), 4.0);
        assert_relative_eq!(combined.first_derivative(&bundle, 0.0).unwrap(), 0.0);
        assert_relative_eq!(combined.first_derivative(&bundle, 6.0).unwrap(), 0.5);

        let sens = combined.node_sensitivities(&bundle, 6.0).unwrap();
        assert_relative_eq!(sens[1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(sens[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_extrapolator() {
        let combined = CombinedInterpolatorExtrapolator::new(Interpolator1D::Linear)
            .with_right(Extrapolator1D::Flat);
        let bundle = combined.data_bundle(&[1.0, 2.0], &[1.0, 2.0]).unwrap();

        assert!(!combined.extrapolates_both_sides());
        assert_eq!(
            combined.interpolate(&bundle, 0.0),
            Err(InterpolationError::NoExtrapolator {
                value: 0.0,
                side: "left"
            })
        );
        assert_relative_eq!(combined.interpolate(&bundle, 5.0).unwrap(), 2.0);
    }
}
