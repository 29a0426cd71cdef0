//! # Kurve Math
//!
//! Piecewise polynomial splines for one-dimensional data.
//!
//! This crate provides:
//!
//! - **Spline variants**: linear, natural, not-a-knot and clamped cubics,
//!   Kruger's constrained cubic, Akima's semi-local cubic, Hagan-West
//!   monotone convex and a C2 shape-preserving cubic
//! - **Shape filters**: monotonicity and nonnegativity preserving cubic and
//!   quintic Hermite adjustments on top of a primary spline
//! - **Results**: knots plus coefficient tables, with evaluation,
//!   derivatives, integrals and optional coefficient sensitivities
//! - **Multi-curve solves**: several curves over the same knots, in parallel
//!   with the `parallel` feature
//!
//! ## Design Philosophy
//!
//! - **One algorithm, two scalars**: constructions are written once over
//!   [`scalar::SplineScalar`] and yield sensitivities when run on tangents
//! - **Fail loudly**: invalid data and non-finite coefficients are errors,
//!   never silently repaired
//! - **Immutable results**: built once, shared freely between threads
//!
//! ## Example
//!
//! ```rust
//! use kurve_math::prelude::*;
//!
//! let spline = SplineInterpolator::new(SplineVariant::NotAKnot);
//! let result = spline
//!     .interpolate(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 8.0, 27.0])
//!     .unwrap();
//!
//! assert!((result.evaluate(1.5).unwrap() - 3.375).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::if_not_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::single_match_else)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod filter;
pub mod knots;
pub mod linear_algebra;
pub mod piecewise;
pub mod scalar;
pub mod spline;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::filter::ShapeFilter;
    pub use crate::knots::KnotSequence;
    pub use crate::piecewise::{
        PiecewisePolynomialResult, PiecewisePolynomialResultWithSensitivity,
    };
    pub use crate::scalar::{SplineScalar, Tangent};
    pub use crate::spline::{SplineInterpolator, SplineVariant};
}

pub use error::{MathError, MathResult};
pub use piecewise::{PiecewisePolynomialResult, PiecewisePolynomialResultWithSensitivity};
pub use spline::{SplineInterpolator, SplineVariant};
