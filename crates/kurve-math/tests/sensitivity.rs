//! Coefficient sensitivities checked against centered finite differences.

use approx::assert_relative_eq;
use kurve_math::prelude::*;

// =============================================================================
// HELPERS
// =============================================================================

const X: [f64; 6] = [0.0, 0.7, 1.5, 2.2, 3.6, 4.1];
const Y: [f64; 6] = [1.0, 1.8, 1.6, 2.9, 3.3, 2.7];

/// Centered difference of every coefficient with respect to `y[k]`.
fn bumped_coefficients(spline: &SplineInterpolator, x: &[f64], y: &[f64], k: usize) -> Vec<f64> {
    let bump = 1e-6 * y[k].abs().max(1.0);
    let mut up = y.to_vec();
    up[k] += bump;
    let mut down = y.to_vec();
    down[k] -= bump;
    let up = spline.interpolate(x, &up).unwrap();
    let down = spline.interpolate(x, &down).unwrap();
    up.coefficients()
        .iter()
        .zip(down.coefficients().iter())
        .map(|(u, d)| (u - d) / (2.0 * bump))
        .collect()
}

fn check_against_finite_differences(spline: SplineInterpolator, x: &[f64], y: &[f64]) {
    let with_sens = spline.interpolate_with_sensitivity(x, y).unwrap();
    let plain = spline.interpolate(x, y).unwrap();
    assert_eq!(with_sens.result(), &plain, "{}", spline.name());
    assert_eq!(with_sens.data_points(), x.len());

    let intervals = plain.interval_count();
    let order = plain.order();
    for k in 0..x.len() {
        // column-major, like the coefficient table itself
        let fd = bumped_coefficients(&spline, x, y, k);
        for i in 0..intervals {
            for j in 0..order {
                let analytic = with_sens.sensitivities()[i][(j, k)];
                let numeric = fd[j * intervals + i];
                assert_relative_eq!(
                    analytic,
                    numeric,
                    epsilon = 1e-5,
                    max_relative = 1e-4
                );
            }
        }
    }
}

// =============================================================================
// PRIMARY VARIANTS
// =============================================================================

#[test]
fn test_linear_sensitivity() {
    check_against_finite_differences(SplineInterpolator::new(SplineVariant::Linear), &X, &Y);
}

#[test]
fn test_moment_cubic_sensitivities() {
    for variant in [
        SplineVariant::Natural,
        SplineVariant::NotAKnot,
        SplineVariant::Clamped {
            left_derivative: 0.3,
            right_derivative: -1.2,
        },
    ] {
        check_against_finite_differences(SplineInterpolator::new(variant), &X, &Y);
    }
}

#[test]
fn test_small_system_sensitivities() {
    // three points take the closed forms
    let x = [0.0, 1.0, 2.5];
    let y = [0.5, 2.0, 1.0];
    for variant in [SplineVariant::Natural, SplineVariant::NotAKnot] {
        check_against_finite_differences(SplineInterpolator::new(variant), &x, &y);
    }
}

#[test]
fn test_local_cubic_sensitivities() {
    for variant in [SplineVariant::Constrained, SplineVariant::SemiLocal] {
        check_against_finite_differences(SplineInterpolator::new(variant), &X, &Y);
    }
}

// =============================================================================
// FILTERS
// =============================================================================

#[test]
fn test_filter_sensitivities() {
    for filter in [
        ShapeFilter::MonotonicityCubic,
        ShapeFilter::NonnegativityCubic,
        ShapeFilter::MonotonicityQuintic,
        ShapeFilter::NonnegativityQuintic,
    ] {
        let spline = SplineInterpolator::new(SplineVariant::NotAKnot).with_filter(filter);
        check_against_finite_differences(spline, &X, &Y);
    }
}

#[test]
fn test_nonnegative_quintic_zero_value_falls_back() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [2.0, 0.5, 0.0, 0.3, 1.5];
    let spline = SplineInterpolator::new(SplineVariant::Natural)
        .with_filter(ShapeFilter::NonnegativityQuintic);

    let with_sens = spline.interpolate_with_sensitivity(&x, &y).unwrap();

    assert_eq!(with_sens.result(), &spline.interpolate(&x, &y).unwrap());
    assert_eq!(with_sens.sensitivities().len(), 4);
    assert_eq!(with_sens.data_points(), 5);
    // the constant term of the first piece is y[0]
    assert_relative_eq!(with_sens.sensitivities()[0][(5, 0)], 1.0, epsilon = 1e-6);
}

// =============================================================================
// POINT SENSITIVITIES
// =============================================================================

#[test]
fn test_node_sensitivity_matches_bumped_values() {
    let spline = SplineInterpolator::new(SplineVariant::Natural);
    let with_sens = spline.interpolate_with_sensitivity(&X, &Y).unwrap();

    for t in [0.3, 1.0, 2.2, 3.9] {
        let sens = with_sens.node_sensitivity(t).unwrap();
        for k in 0..X.len() {
            let mut up = Y.to_vec();
            up[k] += 1e-6;
            let mut down = Y.to_vec();
            down[k] -= 1e-6;
            let fd = (spline.interpolate(&X, &up).unwrap().evaluate(t).unwrap()
                - spline.interpolate(&X, &down).unwrap().evaluate(t).unwrap())
                / 2e-6;
            assert_relative_eq!(sens[k], fd, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_node_sensitivity_sums_to_one() {
    // a constant shift of every value shifts the curve by the same amount
    let spline = SplineInterpolator::new(SplineVariant::NotAKnot);
    let with_sens = spline.interpolate_with_sensitivity(&X, &Y).unwrap();

    for t in [0.1, 1.7, 4.0] {
        assert_relative_eq!(with_sens.node_sensitivity(t).unwrap().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            with_sens.differentiate_node_sensitivity(t).unwrap().sum(),
            0.0,
            epsilon = 1e-10
        );
    }
}

#[test]
fn test_clamped_extra_entries_hold_end_derivatives_fixed() {
    let spline = SplineInterpolator::new(SplineVariant::Clamped {
        left_derivative: 0.0,
        right_derivative: 0.0,
    });
    let mut y = vec![0.4];
    y.extend_from_slice(&Y);
    y.push(-0.6);

    let with_sens = spline.interpolate_with_sensitivity(&X, &y).unwrap();

    assert_eq!(with_sens.data_points(), X.len());
    // the first derivative at the left end never moves
    let d0 = with_sens.differentiate_node_sensitivity(0.0).unwrap();
    for v in d0.iter() {
        assert!(v.abs() < 1e-12);
    }
}
