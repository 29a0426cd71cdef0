//! Point-query interface shared by everything that answers curve queries.

use crate::error::InterpResult;

/// A curve that can be queried point by point.
///
/// Implementations are immutable once built, so one instance can be shared
/// across threads.
pub trait Interpolator: Send + Sync {
    /// Returns the value at x.
    fn interpolate(&self, x: f64) -> InterpResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> InterpResult<f64>;

    /// Returns true if points outside the data are answered.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the data.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}
