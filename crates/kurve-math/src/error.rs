//! Error types for spline construction and evaluation.

use thiserror::Error;

/// A specialized Result type for spline operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur while building or evaluating piecewise polynomials.
///
/// Every variant is fatal: a curve either interpolates the data with the
/// requested properties or it is not built at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Invalid input data (NaN, infinite, duplicated or mismatched arrays).
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Not enough data points for the requested method.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// A computed coefficient or intermediate value is not finite.
    #[error("Numerical overflow in {context}: too large input")]
    NumericOverflow {
        /// Where the non-finite value was produced.
        context: String,
    },

    /// The operation is not available for this spline variant.
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// The operation that was requested.
        operation: String,
    },

    /// An iterative shape-preserving construction did not converge.
    #[error("Convergence failed after {iterations} iterations: {reason}")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
        /// Description of the failure.
        reason: String,
    },

    /// Matrix is singular (not invertible).
    #[error("Singular matrix: cannot invert")]
    SingularMatrix,

    /// Matrix dimensions are incompatible.
    #[error("Incompatible matrix dimensions: ({rows1}x{cols1}) and ({rows2}x{cols2})")]
    DimensionMismatch {
        /// Rows in first matrix.
        rows1: usize,
        /// Columns in first matrix.
        cols1: usize,
        /// Rows in second matrix.
        rows2: usize,
        /// Columns in second matrix.
        cols2: usize,
    },
}

impl MathError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates a numeric overflow error.
    #[must_use]
    pub fn numeric_overflow(context: impl Into<String>) -> Self {
        Self::NumericOverflow {
            context: context.into(),
        }
    }

    /// Creates an unsupported operation error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Creates the error raised when a shape-preserving spline cannot be found.
    #[must_use]
    pub fn spline_not_found(iterations: usize) -> Self {
        Self::ConvergenceFailed {
            iterations,
            reason: "spline not found".to_string(),
        }
    }
}
