//! # Kurve Interp
//!
//! Point-by-point interpolation and extrapolation on top of `kurve-math`.
//!
//! This crate provides:
//!
//! - **Data bundles**: sorted data with lazily solved interpolator state
//! - **Interpolators**: linear, log-linear, natural cubic, monotone convex
//!   and every spline of `kurve-math`, each with node sensitivities
//! - **Extrapolators**: flat, linear, log-linear, quadratic, exponential and
//!   reciprocal tails matched to the interpolator at the boundary
//! - **Registry**: methods looked up by name, with aliases
//!
//! ## Example
//!
//! ```rust
//! use kurve_interp::prelude::*;
//!
//! let combined = CombinedInterpolatorExtrapolator::with_extrapolator(
//!     registry::interpolator("MonotonicCubicSpline").unwrap(),
//!     registry::extrapolator("FlatExtrapolator").unwrap(),
//! );
//! let bundle = combined
//!     .data_bundle(&[1.0, 2.0, 3.0, 5.0], &[0.01, 0.015, 0.015, 0.02])
//!     .unwrap();
//!
//! let y = combined.interpolate(&bundle, 2.5).unwrap();
//! assert!((y - 0.015).abs() < 1e-12);
//! assert_eq!(combined.interpolate(&bundle, 9.0).unwrap(), 0.02);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::float_cmp)]

pub mod bundle;
pub mod combined;
pub mod curve;
pub mod error;
pub mod extrapolator;
pub mod interpolator;
pub mod registry;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bundle::DataBundle;
    pub use crate::combined::{CombinedInterpolatorExtrapolator, Region};
    pub use crate::curve::InterpolatedCurve;
    pub use crate::error::{InterpResult, InterpolationError};
    pub use crate::extrapolator::{Extrapolator1D, Side, TailBasis};
    pub use crate::interpolator::{Interpolator1D, SensitivityMethod};
    pub use crate::registry;
    pub use crate::traits::Interpolator;
}

pub use bundle::DataBundle;
pub use combined::{CombinedInterpolatorExtrapolator, Region};
pub use curve::InterpolatedCurve;
pub use error::{InterpResult, InterpolationError};
pub use extrapolator::{Extrapolator1D, TailBasis};
pub use interpolator::{Interpolator1D, SensitivityMethod};
pub use traits::Interpolator;
