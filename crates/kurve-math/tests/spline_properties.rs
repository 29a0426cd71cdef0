//! Property-based tests for spline construction.
//!
//! These tests check properties that must hold for any valid data:
//! - Every variant passes through the data points
//! - Cubic Hermite variants are C1, moment-based cubics are C2
//! - Monotonicity and nonnegativity filters keep the shape of the data
//! - The shape-preserving cubic stays monotone on increasing data
//! - Input order does not matter

use kurve_math::prelude::*;
use proptest::prelude::*;

// =============================================================================
// DATA GENERATORS
// =============================================================================

/// Sorted, well separated points with values in `[-5, 5]`.
fn curve_data(min: usize, max: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.1f64..2.0, -5.0f64..5.0), min..max).prop_map(|pairs| {
        let mut x = Vec::with_capacity(pairs.len());
        let mut position = 0.0;
        for (gap, _) in &pairs {
            position += gap;
            x.push(position);
        }
        let y = pairs.iter().map(|(_, v)| *v).collect();
        (x, y)
    })
}

/// Sorted points with nondecreasing values.
fn monotone_data(min: usize, max: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.1f64..2.0, 0.0f64..3.0), min..max).prop_map(|pairs| {
        let mut x = Vec::with_capacity(pairs.len());
        let mut y = Vec::with_capacity(pairs.len());
        let (mut position, mut level) = (0.0, -1.0);
        for (gap, rise) in pairs {
            position += gap;
            level += rise;
            x.push(position);
            y.push(level);
        }
        (x, y)
    })
}

/// Sorted points with strictly increasing values.
fn increasing_data(min: usize, max: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.1f64..2.0, 0.05f64..3.0), min..max).prop_map(|pairs| {
        let mut x = Vec::with_capacity(pairs.len());
        let mut y = Vec::with_capacity(pairs.len());
        let (mut position, mut level) = (0.0, 0.0);
        for (gap, rise) in pairs {
            position += gap;
            level += rise;
            x.push(position);
            y.push(level);
        }
        (x, y)
    })
}

/// Sorted points with positive values.
fn positive_data(min: usize, max: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.1f64..2.0, 0.01f64..5.0), min..max).prop_map(|pairs| {
        let mut x = Vec::with_capacity(pairs.len());
        let mut position = 0.0;
        for (gap, _) in &pairs {
            position += gap;
            x.push(position);
        }
        let y = pairs.iter().map(|(_, v)| *v).collect();
        (x, y)
    })
}

fn knot_aware_variants() -> Vec<SplineVariant> {
    vec![
        SplineVariant::Linear,
        SplineVariant::Natural,
        SplineVariant::NotAKnot,
        SplineVariant::Clamped {
            left_derivative: 0.5,
            right_derivative: -0.5,
        },
        SplineVariant::Constrained,
        SplineVariant::SemiLocal,
    ]
}

/// Points inside `[x0, x1]` at which a curve is sampled.
fn samples(x: &[f64], per_interval: usize) -> Vec<f64> {
    let mut points = Vec::new();
    for pair in x.windows(2) {
        for k in 0..=per_interval {
            let t = k as f64 / per_interval as f64;
            points.push(pair[0] + t * (pair[1] - pair[0]));
        }
    }
    points
}

/// Derivative of order `order` of interval `i` at its right end.
fn left_limit(result: &PiecewisePolynomialResult, i: usize, order: usize) -> f64 {
    let knots = result.knots().as_slice();
    let h = knots[i + 1] - knots[i];
    let row = result.interval_coefficients(i, 0).unwrap();
    let degree = row.len() - 1;
    row.iter()
        .enumerate()
        .filter(|(j, _)| degree - j >= order)
        .map(|(j, c)| {
            let power = degree - j;
            let factor: f64 = (0..order).map(|m| (power - m) as f64).product();
            c * factor * h.powi((power - order) as i32)
        })
        .sum()
}

// =============================================================================
// INTERPOLATION
// =============================================================================

proptest! {
    #[test]
    fn prop_variants_interpolate((x, y) in curve_data(4, 12)) {
        for variant in knot_aware_variants() {
            let result = SplineInterpolator::new(variant).interpolate(&x, &y).unwrap();
            for (xi, yi) in x.iter().zip(&y) {
                let value = result.evaluate(*xi).unwrap();
                prop_assert!((value - yi).abs() <= 1e-9 * (1.0 + yi.abs()),
                    "{:?} gives {} at {}, expected {}", variant, value, xi, yi);
            }
        }
    }

    #[test]
    fn prop_filters_interpolate((x, y) in positive_data(4, 12)) {
        let filters = [
            ShapeFilter::MonotonicityCubic,
            ShapeFilter::MonotonicityQuintic,
            ShapeFilter::NonnegativityCubic,
            ShapeFilter::NonnegativityQuintic,
        ];
        for filter in filters {
            let spline = SplineInterpolator::new(SplineVariant::NotAKnot).with_filter(filter);
            let result = spline.interpolate(&x, &y).unwrap();
            for (xi, yi) in x.iter().zip(&y) {
                prop_assert!((result.evaluate(*xi).unwrap() - yi).abs() <= 1e-9 * (1.0 + yi.abs()));
            }
        }
    }

    #[test]
    fn prop_input_order_does_not_matter((x, y) in curve_data(4, 10), seed in 0usize..1000) {
        let n = x.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.rotate_left(seed % n);
        order.swap(0, n - 1);
        let shuffled_x: Vec<f64> = order.iter().map(|k| x[*k]).collect();
        let shuffled_y: Vec<f64> = order.iter().map(|k| y[*k]).collect();

        for variant in knot_aware_variants() {
            let spline = SplineInterpolator::new(variant);
            prop_assert_eq!(
                spline.interpolate(&x, &y).unwrap(),
                spline.interpolate(&shuffled_x, &shuffled_y).unwrap()
            );
        }
    }
}

// =============================================================================
// SMOOTHNESS
// =============================================================================

proptest! {
    #[test]
    fn prop_cubic_variants_are_c1((x, y) in curve_data(4, 12)) {
        let variants = [
            SplineVariant::Natural,
            SplineVariant::NotAKnot,
            SplineVariant::Constrained,
            SplineVariant::SemiLocal,
        ];
        for variant in variants {
            let result = SplineInterpolator::new(variant).interpolate(&x, &y).unwrap();
            for i in 1..x.len() - 1 {
                let left = left_limit(&result, i - 1, 1);
                let right = result.differentiate(x[i]).unwrap();
                prop_assert!((left - right).abs() <= 1e-8 * (1.0 + right.abs()),
                    "{:?} derivative jumps at {}: {} vs {}", variant, x[i], left, right);
            }
        }
    }

    #[test]
    fn prop_moment_cubics_are_c2((x, y) in curve_data(4, 12)) {
        for variant in [SplineVariant::Natural, SplineVariant::NotAKnot] {
            let result = SplineInterpolator::new(variant).interpolate(&x, &y).unwrap();
            for i in 1..x.len() - 1 {
                let left = left_limit(&result, i - 1, 2);
                let right = result.differentiate_twice(x[i]).unwrap();
                prop_assert!((left - right).abs() <= 1e-7 * (1.0 + right.abs()));
            }
        }
    }
}

// =============================================================================
// SHAPE PRESERVATION
// =============================================================================

proptest! {
    #[test]
    fn prop_monotone_filter_keeps_monotone_data((x, y) in monotone_data(3, 10)) {
        for variant in [SplineVariant::Natural, SplineVariant::NotAKnot, SplineVariant::SemiLocal] {
            for filter in [ShapeFilter::MonotonicityCubic, ShapeFilter::MonotonicityQuintic] {
                let spline = SplineInterpolator::new(variant).with_filter(filter);
                if x.len() < spline.minimum_points() {
                    continue;
                }
                let result = spline.interpolate(&x, &y).unwrap();
                let values = result.evaluate_many(&samples(&x, 16)).unwrap();
                for pair in values.windows(2) {
                    prop_assert!(pair[1] >= pair[0] - 1e-10, "{} not monotone", spline.name());
                }
            }
        }
    }

    #[test]
    fn prop_nonnegative_filter_keeps_sign((x, y) in positive_data(3, 10)) {
        for filter in [ShapeFilter::NonnegativityCubic, ShapeFilter::NonnegativityQuintic] {
            let spline = SplineInterpolator::new(SplineVariant::Natural).with_filter(filter);
            let result = spline.interpolate(&x, &y).unwrap();
            for value in result.evaluate_many(&samples(&x, 16)).unwrap() {
                prop_assert!(value >= -1e-12, "{} goes negative", filter.name());
            }
        }
    }

    #[test]
    fn prop_shape_preserving_cubic_keeps_increasing_data((x, y) in increasing_data(3, 10)) {
        // some increasing data admit no monotone shape-preserving spline at all
        let built = SplineInterpolator::new(SplineVariant::ShapePreservingCubic).interpolate(&x, &y);
        prop_assume!(built.is_ok());
        let result = built.unwrap();

        let scale = x
            .windows(2)
            .zip(y.windows(2))
            .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
            .fold(0.0_f64, f64::max);
        for t in samples(&x, 40) {
            let slope = result.differentiate(t).unwrap();
            prop_assert!(slope >= -1e-9 * scale, "slope {} at {}", slope, t);
        }
        for (xi, yi) in x.iter().zip(&y) {
            prop_assert!((result.evaluate(*xi).unwrap() - yi).abs() <= 1e-9 * (1.0 + yi.abs()));
        }
    }

    #[test]
    fn prop_monotone_convex_reproduces_rates(
        points in prop::collection::vec((0.1f64..3.0, 0.001f64..0.08), 2..10)
    ) {
        let mut times = Vec::with_capacity(points.len());
        let mut t = 0.0;
        for (gap, _) in &points {
            t += gap;
            times.push(t);
        }
        let rates: Vec<f64> = points.iter().map(|(_, r)| *r).collect();

        let result = SplineInterpolator::new(SplineVariant::MonotoneConvex)
            .interpolate(&times, &rates)
            .unwrap();
        for (t, r) in times.iter().zip(&rates) {
            prop_assert!((result.evaluate(*t).unwrap() / t - r).abs() < 1e-10);
        }
    }
}

// =============================================================================
// FIXED EXAMPLES
// =============================================================================

#[test]
fn test_monotone_step_stays_flat() {
    let spline =
        SplineInterpolator::new(SplineVariant::Natural).with_filter(ShapeFilter::MonotonicityCubic);
    let result = spline
        .interpolate(&[0.0, 1.0, 2.0, 3.0], &[0.0, 0.0, 1.0, 1.0])
        .unwrap();

    for k in 0..=20 {
        let t = f64::from(k) / 20.0;
        assert!(result.evaluate(t).unwrap().abs() < 1e-14);
        assert!((result.evaluate(2.0 + t).unwrap() - 1.0).abs() < 1e-14);
    }
    let mid = result.evaluate(1.5).unwrap();
    assert!(mid > 0.0 && mid < 1.0);
}

#[test]
fn test_monotone_quintic_on_monotone_data() {
    let x = [0.0, 0.5, 1.5, 2.0, 3.5, 4.0];
    let y = [0.0, 0.1, 1.8, 1.9, 2.0, 4.5];
    let spline = SplineInterpolator::new(SplineVariant::NotAKnot)
        .with_filter(ShapeFilter::MonotonicityQuintic);
    let result = spline.interpolate(&x, &y).unwrap();

    assert_eq!(result.order(), 6);
    let values = result.evaluate_many(&samples(&x, 50)).unwrap();
    for pair in values.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-10);
    }
    for (xi, yi) in x.iter().zip(&y) {
        assert!((result.evaluate(*xi).unwrap() - yi).abs() < 1e-12);
    }
}

#[test]
fn test_nonnegative_quintic_touching_zero() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [2.0, 0.5, 0.0, 0.3, 1.5];
    let spline = SplineInterpolator::new(SplineVariant::Natural)
        .with_filter(ShapeFilter::NonnegativityQuintic);
    let result = spline.interpolate(&x, &y).unwrap();

    for value in result.evaluate_many(&samples(&x, 50)).unwrap() {
        assert!(value >= -1e-12);
    }
    assert!(result.differentiate(2.0).unwrap().abs() < 1e-14);
}

#[test]
fn test_shape_preserving_cubic_on_convex_monotone_data() {
    let x = [0.0, 1.0, 1.5, 3.0, 4.0, 6.0];
    let y: Vec<f64> = x.iter().map(|t: &f64| 0.5 * t * t + t).collect();
    let result = SplineInterpolator::new(SplineVariant::ShapePreservingCubic)
        .interpolate(&x, &y)
        .unwrap();

    assert_eq!(result.interval_count(), 3 * (x.len() - 1));
    for t in samples(&x, 40) {
        assert!(result.differentiate(t).unwrap() >= -1e-10);
        assert!(result.differentiate_twice(t).unwrap() >= -1e-9);
    }
    for (xi, yi) in x.iter().zip(&y) {
        assert!((result.evaluate(*xi).unwrap() - yi).abs() < 1e-10);
    }
}

#[test]
fn test_multi_curve_rows_are_independent() {
    let x = [0.0, 1.0, 2.0, 3.0, 5.0];
    let rows = vec![
        vec![1.0, 2.0, 1.5, 0.5, 0.0],
        vec![0.0, 0.1, 0.4, 0.9, 2.5],
        vec![3.0, 3.0, 3.0, 3.0, 3.0],
    ];
    let spline = SplineInterpolator::new(SplineVariant::SemiLocal);
    let stacked = spline.interpolate_multi(&x, &rows).unwrap();

    assert_eq!(stacked.dimensions(), 3);
    assert!(stacked.evaluate(1.0).is_err());
    for t in samples(&x, 7) {
        let values = stacked.evaluate_dimensions(t).unwrap();
        for (row, value) in rows.iter().zip(values) {
            let single = spline.interpolate(&x, row).unwrap().evaluate(t).unwrap();
            assert!((single - value).abs() < 1e-14);
        }
    }
}
