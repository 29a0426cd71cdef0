//! Kurve Configuration Layer
//!
//! Selects interpolators and extrapolators by registered name, validates the
//! selection and builds a ready-to-use `CombinedInterpolatorExtrapolator`.
//!
//! # Features
//!
//! - **Interpolation Configuration**: interpolator, extrapolators, sensitivity
//!   mode, knot tolerance, clamped end derivatives, quadratic anchor
//! - **File Formats**: JSON and TOML, with serde defaults for omitted fields
//! - **Configuration Sets**: named configurations with read-only presets
//!
//! # Example
//!
//! ```rust
//! use kurve_config::{InterpolationConfig, SensitivityMode};
//!
//! let config = InterpolationConfig::new("MY.CURVE")
//!     .with_interpolator("MonotonicCubicSpline")
//!     .with_extrapolators("FlatExtrapolator", "LinearExtrapolator")
//!     .with_sensitivity(SensitivityMode::Analytic);
//!
//! let combined = config.build().unwrap();
//! let bundle = combined
//!     .data_bundle(&[1.0, 2.0, 3.0], &[0.01, 0.02, 0.025])
//!     .unwrap();
//! assert_eq!(combined.interpolate(&bundle, 0.0).unwrap(), 0.01);
//! ```
//!
//! # Standard Configurations
//!
//! - `LINEAR.FLAT` - linear, flat tails
//! - `RATES.MONOTONE_CONVEX` - monotone convex spot rates, flat tails
//! - `DISCOUNT.LOG_LINEAR` - log-linear discount factors
//! - `SMOOTH.NATURAL_CUBIC` - natural cubic, linear tails
//! - `MONOTONE.HYMAN` - monotonicity preserving cubic, flat tails

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod interpolation;
mod set;

pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use interpolation::{InterpolationConfig, SensitivityMode};
pub use set::InterpolationConfigSet;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult, Validate};
    pub use crate::interpolation::{InterpolationConfig, SensitivityMode};
    pub use crate::set::InterpolationConfigSet;
}
