//! End-to-end behaviour of registered methods on a rate curve.

use approx::assert_relative_eq;
use kurve_interp::prelude::*;

const TIMES: [f64; 7] = [0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0];
const RATES: [f64; 7] = [0.02, 0.025, 0.03, 0.033, 0.036, 0.038, 0.039];

fn bumped(bundle: &DataBundle, k: usize, bump: f64) -> DataBundle {
    let mut values = bundle.values().to_vec();
    values[k] += bump;
    DataBundle::from_sorted(bundle.keys().to_vec(), values).unwrap()
}

#[test]
fn test_every_registered_interpolator_reproduces_the_data() {
    for name in registry::interpolator_names() {
        let interp = registry::interpolator(name).unwrap();
        let bundle = interp.data_bundle(&TIMES, &RATES).unwrap();
        for (t, r) in TIMES.iter().zip(&RATES) {
            let y = interp.interpolate(&bundle, *t).unwrap();
            assert!((y - r).abs() < 1e-12, "{name} misses ({t}, {r}): {y}");
        }
    }
}

#[test]
fn test_smooth_extrapolation_is_c1_at_both_ends() {
    let eps = 1e-8;
    for interp_name in ["NaturalCubicSpline", "MonotoneConvex", "AkimaCubicSpline", "HymanMonotoneCubicSpline"] {
        for extrap_name in ["LinearExtrapolator", "LogLinearExtrapolator", "ReciprocalExtrapolator"] {
            let combined = CombinedInterpolatorExtrapolator::with_extrapolator(
                registry::interpolator(interp_name).unwrap(),
                registry::extrapolator(extrap_name).unwrap(),
            );
            let bundle = combined.data_bundle(&TIMES, &RATES).unwrap();
            for (inside, outside) in [(0.5 + eps, 0.5 - eps), (10.0 - eps, 10.0 + eps)] {
                let v_in = combined.interpolate(&bundle, inside).unwrap();
                let v_out = combined.interpolate(&bundle, outside).unwrap();
                assert!((v_in - v_out).abs() < 1e-9, "{interp_name}/{extrap_name} jumps");

                let d_in = combined.first_derivative(&bundle, inside).unwrap();
                let d_out = combined.first_derivative(&bundle, outside).unwrap();
                assert!(
                    (d_in - d_out).abs() < 1e-6,
                    "{interp_name}/{extrap_name} kinks: {d_in} vs {d_out}"
                );
            }
        }
    }
}

#[test]
fn test_sensitivities_across_regions_match_bumps() {
    let combined = CombinedInterpolatorExtrapolator::with_extrapolators(
        registry::interpolator("NotAKnotCubicSpline").unwrap(),
        registry::extrapolator("QuadraticLeftExtrapolator").unwrap(),
        registry::extrapolator("LogLinearExtrapolator").unwrap(),
    );
    let bundle = combined.data_bundle(&TIMES, &RATES).unwrap();
    let bump = 1e-7;

    for x in [0.1, 0.5, 1.7, 6.2, 10.0, 14.0] {
        let analytic = combined.node_sensitivities(&bundle, x).unwrap();
        let derivative = combined.first_derivative_node_sensitivities(&bundle, x).unwrap();
        for k in 0..TIMES.len() {
            let up = bumped(&bundle, k, bump);
            let down = bumped(&bundle, k, -bump);
            let numeric = (combined.interpolate(&up, x).unwrap()
                - combined.interpolate(&down, x).unwrap())
                / (2.0 * bump);
            assert_relative_eq!(analytic[k], numeric, epsilon = 1e-6);

            let numeric = (combined.first_derivative(&up, x).unwrap()
                - combined.first_derivative(&down, x).unwrap())
                / (2.0 * bump);
            assert_relative_eq!(derivative[k], numeric, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_finite_difference_configuration_agrees_with_analytic() {
    let analytic = registry::interpolator("MonotonicityPreservingQuinticSpline").unwrap();
    let numeric = analytic.with_sensitivity_method(SensitivityMethod::FiniteDifference);
    let a = analytic.data_bundle(&TIMES, &RATES).unwrap();
    let n = numeric.data_bundle(&TIMES, &RATES).unwrap();

    assert!(analytic.has_analytic_sensitivities());
    assert!(!numeric.has_analytic_sensitivities());
    for x in [0.8, 2.5, 4.0, 9.0] {
        let sa = analytic.node_sensitivities(&a, x).unwrap();
        let sn = numeric.node_sensitivities(&n, x).unwrap();
        for (p, q) in sa.iter().zip(&sn) {
            assert_relative_eq!(p, q, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_curve_shared_between_threads() {
    let combined = CombinedInterpolatorExtrapolator::with_extrapolator(
        Interpolator1D::NaturalCubic,
        Extrapolator1D::Flat,
    );
    let curve = InterpolatedCurve::new(&TIMES, &RATES, combined).unwrap();
    let expected: Vec<f64> = (0..40)
        .map(|i| curve.interpolate(0.3 * f64::from(i)).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (i, e) in expected.iter().enumerate() {
                    let t = 0.3 * i as f64;
                    assert_eq!(curve.interpolate(t).unwrap(), *e);
                }
            });
        }
    });
}

#[test]
fn test_missing_side_reports_the_side() {
    let combined = CombinedInterpolatorExtrapolator::new(Interpolator1D::Linear)
        .with_left(Extrapolator1D::Flat);
    let curve = InterpolatedCurve::new(&TIMES, &RATES, combined).unwrap();

    assert_eq!(curve.interpolate(0.0).unwrap(), 0.02);
    assert!(matches!(
        curve.interpolate(11.0),
        Err(InterpolationError::NoExtrapolator { side: "right", .. })
    ));
}
