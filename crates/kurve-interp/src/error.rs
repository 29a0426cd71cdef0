//! Error types for the interpolator layer.

use kurve_math::MathError;
use thiserror::Error;

/// A specialized Result type for interpolator operations.
pub type InterpResult<T> = Result<T, InterpolationError>;

/// Errors raised while building bundles or answering point queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// The query point is on the wrong side of the data for the operation.
    #[error("{value} is out of range for {context}: data covers [{min}, {max}]")]
    OutOfRange {
        /// Which operation rejected the point.
        context: &'static str,
        /// The query point.
        value: f64,
        /// First key of the data.
        min: f64,
        /// Last key of the data.
        max: f64,
    },

    /// A query fell outside the data and no extrapolator covers that side.
    #[error("{value} is {side} of the data and there is no {side} extrapolator")]
    NoExtrapolator {
        /// The query point.
        value: f64,
        /// `"left"` or `"right"`.
        side: &'static str,
    },

    /// A registry lookup found nothing under the given name.
    #[error("Unknown {kind} name: {name}")]
    UnknownName {
        /// `"interpolator"` or `"extrapolator"`.
        kind: &'static str,
        /// The name looked up.
        name: String,
    },

    /// A data bundle does not fit the interpolator it is used with.
    #[error("Data bundle mismatch: {reason}")]
    BundleMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Failure in the underlying spline construction or evaluation.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl InterpolationError {
    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(context: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            context,
            value,
            min,
            max,
        }
    }

    /// Creates a bundle mismatch error.
    #[must_use]
    pub fn bundle_mismatch(reason: impl Into<String>) -> Self {
        Self::BundleMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an unknown-name error.
    #[must_use]
    pub fn unknown_name(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownName {
            kind,
            name: name.into(),
        }
    }
}
