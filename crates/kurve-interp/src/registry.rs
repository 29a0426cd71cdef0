//! Named interpolators and extrapolators.
//!
//! Forward lookup accepts every registered name and alias, ignoring ASCII
//! case. Reverse lookup returns the canonical name, which is the first name
//! registered for a method.
//!
//! ```rust
//! use kurve_interp::registry;
//!
//! let hyman = registry::interpolator("HymanMonotoneCubicSpline").unwrap();
//! assert_eq!(
//!     registry::interpolator_name(&hyman),
//!     Some("MonotonicityPreservingCubicSpline")
//! );
//! ```

use crate::error::{InterpResult, InterpolationError};
use crate::extrapolator::Extrapolator1D;
use crate::interpolator::{Interpolator1D, SensitivityMethod};
use kurve_math::prelude::*;
use once_cell::sync::Lazy;

/// Anchor of the registered quadratic left extrapolator, the value of a
/// discount factor at time zero.
pub const QUADRATIC_LEFT_ANCHOR: f64 = 1.0;

struct Registry {
    interpolators: Vec<(&'static str, Interpolator1D)>,
    extrapolators: Vec<(&'static str, Extrapolator1D)>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let spline = |variant| Interpolator1D::spline(SplineInterpolator::new(variant));
    let filtered =
        |variant, filter| Interpolator1D::spline(SplineInterpolator::new(variant).with_filter(filter));
    let monotone_cubic = filtered(SplineVariant::Natural, ShapeFilter::MonotonicityCubic);
    let clamped = spline(SplineVariant::Clamped {
        left_derivative: 0.0,
        right_derivative: 0.0,
    });

    let interpolators = vec![
        ("Linear", Interpolator1D::Linear),
        ("LogLinear", Interpolator1D::LogLinear),
        ("NaturalCubicSpline", Interpolator1D::NaturalCubic),
        ("MonotoneConvex", Interpolator1D::MonotoneConvex),
        ("MonotoneConvexSpline", Interpolator1D::MonotoneConvex),
        ("NaturalSpline", spline(SplineVariant::Natural)),
        ("NotAKnotCubicSpline", spline(SplineVariant::NotAKnot)),
        ("CubicSpline", spline(SplineVariant::NotAKnot)),
        ("ClampedCubicSpline", clamped),
        ("ConstrainedCubicSpline", spline(SplineVariant::Constrained)),
        ("SemiLocalCubicSpline", spline(SplineVariant::SemiLocal)),
        ("AkimaCubicSpline", spline(SplineVariant::SemiLocal)),
        ("ShapePreservingCubicSpline", spline(SplineVariant::ShapePreservingCubic)),
        ("MonotonicityPreservingCubicSpline", monotone_cubic),
        ("MonotonicCubicSpline", monotone_cubic),
        ("MonotonicNaturalCubicSpline", monotone_cubic),
        ("NaturalCubicMonotone", monotone_cubic),
        ("HymanMonotoneCubicSpline", monotone_cubic),
        (
            "MonotonicityPreservingQuinticSpline",
            filtered(SplineVariant::NotAKnot, ShapeFilter::MonotonicityQuintic),
        ),
        (
            "NonnegativityPreservingCubicSpline",
            filtered(SplineVariant::Natural, ShapeFilter::NonnegativityCubic),
        ),
        (
            "NonnegativityPreservingQuinticSpline",
            filtered(SplineVariant::Natural, ShapeFilter::NonnegativityQuintic),
        ),
    ];

    let extrapolators = vec![
        ("FlatExtrapolator", Extrapolator1D::Flat),
        ("LinearExtrapolator", Extrapolator1D::Linear),
        ("LogLinearExtrapolator", Extrapolator1D::LogLinear),
        (
            "QuadraticLeftExtrapolator",
            Extrapolator1D::QuadraticLeft {
                anchor: QUADRATIC_LEFT_ANCHOR,
            },
        ),
        ("ExponentialExtrapolator", Extrapolator1D::Exponential),
        ("ReciprocalExtrapolator", Extrapolator1D::Reciprocal),
    ];

    Registry {
        interpolators,
        extrapolators,
    }
});

/// Interpolator registered under `name`.
///
/// # Errors
///
/// Returns [`InterpolationError::UnknownName`] for an unregistered name.
pub fn interpolator(name: &str) -> InterpResult<Interpolator1D> {
    REGISTRY
        .interpolators
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, i)| *i)
        .ok_or_else(|| InterpolationError::unknown_name("interpolator", name))
}

/// Extrapolator registered under `name`.
///
/// # Errors
///
/// Returns [`InterpolationError::UnknownName`] for an unregistered name.
pub fn extrapolator(name: &str) -> InterpResult<Extrapolator1D> {
    REGISTRY
        .extrapolators
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, e)| *e)
        .ok_or_else(|| InterpolationError::unknown_name("extrapolator", name))
}

/// Canonical name of an interpolator.
///
/// The sensitivity method, knot tolerance and clamped end derivatives do
/// not take part in the match.
pub fn interpolator_name(interpolator: &Interpolator1D) -> Option<&'static str> {
    let wanted = registered_form(interpolator);
    REGISTRY
        .interpolators
        .iter()
        .find(|(_, i)| *i == wanted)
        .map(|(n, _)| *n)
}

/// Canonical name of an extrapolator; the quadratic anchor is ignored.
pub fn extrapolator_name(extrapolator: &Extrapolator1D) -> Option<&'static str> {
    let wanted = match extrapolator {
        Extrapolator1D::QuadraticLeft { .. } => Extrapolator1D::QuadraticLeft {
            anchor: QUADRATIC_LEFT_ANCHOR,
        },
        other => *other,
    };
    REGISTRY
        .extrapolators
        .iter()
        .find(|(_, e)| *e == wanted)
        .map(|(n, _)| *n)
}

/// Every registered interpolator name, aliases included.
pub fn interpolator_names() -> Vec<&'static str> {
    REGISTRY.interpolators.iter().map(|(n, _)| *n).collect()
}

/// Every registered extrapolator name.
pub fn extrapolator_names() -> Vec<&'static str> {
    REGISTRY.extrapolators.iter().map(|(n, _)| *n).collect()
}

fn registered_form(interpolator: &Interpolator1D) -> Interpolator1D {
    match interpolator {
        Interpolator1D::Spline { spline, .. } => {
            let variant = match spline.variant() {
                SplineVariant::Clamped { .. } => SplineVariant::Clamped {
                    left_derivative: 0.0,
                    right_derivative: 0.0,
                },
                other => other,
            };
            let mut plain = SplineInterpolator::new(variant);
            if let Some(filter) = spline.filter() {
                plain = plain.with_filter(filter);
            }
            Interpolator1D::Spline {
                spline: plain,
                sensitivity: SensitivityMethod::Analytic,
            }
        }
        other => *other,
    }
}
