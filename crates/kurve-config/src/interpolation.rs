//! Interpolation configuration.
//!
//! A configuration names its methods the way the registry does, so files
//! stay readable and aliases keep working.

use std::path::Path;

use kurve_interp::prelude::*;
use kurve_math::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, Validate, ValidationError};

// =============================================================================
// SENSITIVITY MODE
// =============================================================================

/// How node sensitivities are computed for spline interpolators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SensitivityMode {
    /// Propagated through the construction.
    #[default]
    Analytic,
    /// Centered differences of the construction.
    FiniteDifference,
}

impl From<SensitivityMode> for SensitivityMethod {
    fn from(mode: SensitivityMode) -> Self {
        match mode {
            SensitivityMode::Analytic => SensitivityMethod::Analytic,
            SensitivityMode::FiniteDifference => SensitivityMethod::FiniteDifference,
        }
    }
}

impl std::fmt::Display for SensitivityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Analytic => "Analytic",
            Self::FiniteDifference => "Finite Difference",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// INTERPOLATION CONFIG
// =============================================================================

/// Selection of an interpolator and its extrapolators.
///
/// # Example
///
/// ```rust
/// use kurve_config::InterpolationConfig;
///
/// let config = InterpolationConfig::from_toml(r#"
///     name = "RATES"
///     interpolator = "MonotoneConvex"
///     left_extrapolator = "FlatExtrapolator"
///     right_extrapolator = "FlatExtrapolator"
/// "#).unwrap();
///
/// let combined = config.build().unwrap();
/// let bundle = combined.data_bundle(&[1.0, 2.0], &[0.02, 0.03]).unwrap();
/// assert_eq!(combined.interpolate(&bundle, 5.0).unwrap(), 0.03);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Configuration name.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Registered interpolator name.
    #[serde(default = "default_interpolator")]
    pub interpolator: String,

    /// Registered extrapolator name for points below the data.
    #[serde(default)]
    pub left_extrapolator: Option<String>,

    /// Registered extrapolator name for points above the data.
    #[serde(default)]
    pub right_extrapolator: Option<String>,

    /// Sensitivity computation for spline interpolators.
    #[serde(default)]
    pub sensitivity: SensitivityMode,

    /// Minimum spacing between distinct keys.
    #[serde(default)]
    pub knot_tolerance: f64,

    /// End derivatives of a clamped spline, left then right.
    #[serde(default)]
    pub end_derivatives: Option<(f64, f64)>,

    /// Value at zero of the quadratic left extrapolator.
    #[serde(default)]
    pub quadratic_anchor: Option<f64>,

    /// Whether this configuration is read-only.
    #[serde(default)]
    pub read_only: bool,
}

fn default_interpolator() -> String {
    "NaturalCubicSpline".to_string()
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self::new("DEFAULT")
    }
}

impl InterpolationConfig {
    /// Creates a configuration with the default interpolator and no extrapolation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            interpolator: default_interpolator(),
            left_extrapolator: None,
            right_extrapolator: None,
            sensitivity: SensitivityMode::default(),
            knot_tolerance: 0.0,
            end_derivatives: None,
            quadratic_anchor: None,
            read_only: false,
        }
    }

    /// Linear interpolation with flat ends.
    pub fn linear() -> Self {
        Self::new("LINEAR.FLAT")
            .with_description("Linear interpolation, flat beyond the data")
            .with_interpolator("Linear")
            .with_extrapolator("FlatExtrapolator")
            .read_only()
    }

    /// Monotone convex on spot rates with flat ends.
    pub fn spot_rates() -> Self {
        Self::new("RATES.MONOTONE_CONVEX")
            .with_description("Monotone convex spot rates, flat beyond the data")
            .with_interpolator("MonotoneConvex")
            .with_extrapolator("FlatExtrapolator")
            .read_only()
    }

    /// Log-linear discount factors anchored at one on the left.
    pub fn discount_factors() -> Self {
        Self::new("DISCOUNT.LOG_LINEAR")
            .with_description("Log-linear discount factors, quadratic to 1 at time zero")
            .with_interpolator("LogLinear")
            .with_extrapolators("QuadraticLeftExtrapolator", "LogLinearExtrapolator")
            .with_quadratic_anchor(1.0)
            .read_only()
    }

    /// Natural cubic spline with linear tails.
    pub fn smooth() -> Self {
        Self::new("SMOOTH.NATURAL_CUBIC")
            .with_description("Natural cubic spline, linear beyond the data")
            .with_interpolator("NaturalCubicSpline")
            .with_extrapolator("LinearExtrapolator")
            .read_only()
    }

    /// Hyman monotone cubic with flat ends.
    pub fn monotone() -> Self {
        Self::new("MONOTONE.HYMAN")
            .with_description("Monotonicity preserving cubic, flat beyond the data")
            .with_interpolator("MonotonicityPreservingCubicSpline")
            .with_extrapolator("FlatExtrapolator")
            .read_only()
    }

    /// Every standard configuration.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::linear(),
            Self::spot_rates(),
            Self::discount_factors(),
            Self::smooth(),
            Self::monotone(),
        ]
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the interpolator by registered name.
    #[must_use]
    pub fn with_interpolator(mut self, name: impl Into<String>) -> Self {
        self.interpolator = name.into();
        self
    }

    /// Uses the same extrapolator on both sides.
    #[must_use]
    pub fn with_extrapolator(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.left_extrapolator = Some(name.clone());
        self.right_extrapolator = Some(name);
        self
    }

    /// Sets both extrapolators.
    #[must_use]
    pub fn with_extrapolators(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_extrapolator = Some(left.into());
        self.right_extrapolator = Some(right.into());
        self
    }

    /// Sets the sensitivity mode.
    #[must_use]
    pub fn with_sensitivity(mut self, mode: SensitivityMode) -> Self {
        self.sensitivity = mode;
        self
    }

    /// Sets the knot tolerance.
    #[must_use]
    pub fn with_knot_tolerance(mut self, tolerance: f64) -> Self {
        self.knot_tolerance = tolerance;
        self
    }

    /// Sets the clamped end derivatives.
    #[must_use]
    pub fn with_end_derivatives(mut self, left: f64, right: f64) -> Self {
        self.end_derivatives = Some((left, right));
        self
    }

    /// Sets the quadratic left anchor.
    #[must_use]
    pub fn with_quadratic_anchor(mut self, anchor: f64) -> Self {
        self.quadratic_anchor = Some(anchor);
        self
    }

    /// Marks the configuration read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a configuration from TOML.
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file; `.toml` files are TOML, anything else JSON.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!("loading interpolation config from {}", path.display());
        if is_toml(path) {
            Self::from_toml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes to TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Validates the configuration and builds the interpolator with its
    /// extrapolators.
    pub fn build(&self) -> ConfigResult<CombinedInterpolatorExtrapolator> {
        self.validate_or_error()?;

        let interpolator = self.interpolator()?;
        let mut combined = CombinedInterpolatorExtrapolator::new(interpolator);
        if let Some(name) = &self.left_extrapolator {
            combined = combined.with_left(self.extrapolator(name)?);
        }
        if let Some(name) = &self.right_extrapolator {
            combined = combined.with_right(self.extrapolator(name)?);
        }
        debug!(
            "built '{}': {} with {:?}/{:?} extrapolation",
            self.name,
            interpolator.description(),
            self.left_extrapolator,
            self.right_extrapolator
        );
        Ok(combined)
    }

    fn interpolator(&self) -> ConfigResult<Interpolator1D> {
        let found = registry::interpolator(&self.interpolator)?;
        let Interpolator1D::Spline { spline, .. } = found else {
            return Ok(found);
        };
        let variant = match (spline.variant(), self.end_derivatives) {
            (SplineVariant::Clamped { .. }, Some((left, right))) => SplineVariant::Clamped {
                left_derivative: left,
                right_derivative: right,
            },
            (variant, _) => variant,
        };
        let mut configured = SplineInterpolator::new(variant).with_knot_tolerance(self.knot_tolerance);
        if let Some(filter) = spline.filter() {
            configured = configured.with_filter(filter);
        }
        Ok(Interpolator1D::spline(configured).with_sensitivity_method(self.sensitivity.into()))
    }

    fn extrapolator(&self, name: &str) -> ConfigResult<Extrapolator1D> {
        Ok(match registry::extrapolator(name)? {
            Extrapolator1D::QuadraticLeft { anchor } => Extrapolator1D::QuadraticLeft {
                anchor: self.quadratic_anchor.unwrap_or(anchor),
            },
            other => other,
        })
    }

    fn is_clamped(&self) -> bool {
        matches!(
            registry::interpolator(&self.interpolator),
            Ok(Interpolator1D::Spline { spline, .. })
                if matches!(spline.variant(), SplineVariant::Clamped { .. })
        )
    }
}

impl Validate for InterpolationConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ValidationError::new("name", "Name cannot be empty"));
        }

        if let Err(err) = registry::interpolator(&self.interpolator) {
            errors.push(ValidationError::with_rule(
                "interpolator",
                err.to_string(),
                "registered_name",
            ));
        }

        for (field, name) in [
            ("left_extrapolator", &self.left_extrapolator),
            ("right_extrapolator", &self.right_extrapolator),
        ] {
            let Some(name) = name else { continue };
            match registry::extrapolator(name) {
                Err(err) => errors.push(ValidationError::with_rule(
                    field,
                    err.to_string(),
                    "registered_name",
                )),
                Ok(Extrapolator1D::QuadraticLeft { .. }) if field == "right_extrapolator" => {
                    errors.push(ValidationError::with_rule(
                        field,
                        "Quadratic extrapolation is only defined left of the data",
                        "left_only",
                    ));
                }
                Ok(_) => {}
            }
        }

        if !self.knot_tolerance.is_finite() || self.knot_tolerance < 0.0 {
            errors.push(ValidationError::with_rule(
                "knot_tolerance",
                "Knot tolerance must be finite and non-negative",
                "valid_tolerance",
            ));
        }

        if let Some((left, right)) = self.end_derivatives {
            if !left.is_finite() || !right.is_finite() {
                errors.push(ValidationError::with_rule(
                    "end_derivatives",
                    "End derivatives must be finite",
                    "finite",
                ));
            }
            if !self.is_clamped() {
                errors.push(ValidationError::with_rule(
                    "end_derivatives",
                    "End derivatives only apply to a clamped spline",
                    "clamped_only",
                ));
            }
        }

        if let Some(anchor) = self.quadratic_anchor {
            if !anchor.is_finite() {
                errors.push(ValidationError::with_rule(
                    "quadratic_anchor",
                    "Quadratic anchor must be finite",
                    "finite",
                ));
            }
        }

        errors
    }
}

pub(crate) fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_configs_build() {
        for config in InterpolationConfig::standard() {
            assert!(config.is_valid(), "{} is invalid", config.name);
            assert!(config.read_only);
            let combined = config.build().unwrap();
            assert!(combined.extrapolates_both_sides());
        }
    }

    #[test]
    fn test_discount_factor_preset() {
        let combined = InterpolationConfig::discount_factors().build().unwrap();
        let bundle = combined
            .data_bundle(&[0.5, 1.0, 2.0, 5.0], &[0.99, 0.98, 0.955, 0.88])
            .unwrap();

        assert_relative_eq!(combined.interpolate(&bundle, 0.0).unwrap(), 1.0, epsilon = 1e-14);
        assert!(combined.interpolate(&bundle, 10.0).unwrap() < 0.88);
    }

    #[test]
    fn test_json_defaults() {
        let config = InterpolationConfig::from_json(r#"{ "name": "MINIMAL" }"#).unwrap();
        assert_eq!(config.interpolator, "NaturalCubicSpline");
        assert_eq!(config.sensitivity, SensitivityMode::Analytic);
        assert!(config.left_extrapolator.is_none());
        assert!(!config.read_only);

        let combined = config.build().unwrap();
        assert_eq!(*combined.interpolator(), Interpolator1D::NaturalCubic);
        assert!(combined.left_extrapolator().is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = InterpolationConfig::new("CLAMPED")
            .with_interpolator("ClampedCubicSpline")
            .with_end_derivatives(0.5, -0.25)
            .with_sensitivity(SensitivityMode::FiniteDifference)
            .with_knot_tolerance(1e-10);
        let text = config.to_toml().unwrap();
        assert_eq!(InterpolationConfig::from_toml(&text).unwrap(), config);

        let combined = config.build().unwrap();
        let Interpolator1D::Spline { spline, sensitivity } = *combined.interpolator() else {
            panic!("expected a spline interpolator");
        };
        assert_eq!(sensitivity, SensitivityMethod::FiniteDifference);
        assert_eq!(spline.knot_tolerance(), 1e-10);
        assert_eq!(
            spline.variant(),
            SplineVariant::Clamped {
                left_derivative: 0.5,
                right_derivative: -0.25
            }
        );
    }

    #[test]
    fn test_validation_errors() {
        let config = InterpolationConfig::new("")
            .with_interpolator("Bicubic")
            .with_extrapolators("FlatExtrapolator", "QuadraticLeftExtrapolator")
            .with_knot_tolerance(-1.0)
            .with_end_derivatives(0.0, 0.0);

        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "interpolator",
                "right_extrapolator",
                "knot_tolerance",
                "end_derivatives"
            ]
        );
        assert!(matches!(
            config.build(),
            Err(ConfigError::MultipleValidationErrors(_))
        ));
    }

    #[test]
    fn test_aliases_accepted() {
        let config = InterpolationConfig::new("AKIMA")
            .with_interpolator("akimacubicspline")
            .with_extrapolator("LinearExtrapolator");
        assert!(config.is_valid());
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_sensitivity_mode_display() {
        assert_eq!(SensitivityMode::FiniteDifference.to_string(), "Finite Difference");
    }
}
