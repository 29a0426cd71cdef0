//! Local derivative estimates for the cubic Hermite variants.
//!
//! Both estimators read only neighbouring secant slopes, so moving one data
//! point changes at most a handful of pieces.

use crate::scalar::SplineScalar;

/// Knot derivatives of the constrained (Kruger) cubic spline.
///
/// Interior knots take the harmonic mean of the adjacent slopes when they
/// share a strict sign and zero otherwise, which keeps the curve from
/// overshooting. The end derivatives make the second derivative vanish
/// at both ends.
///
/// `slopes` must hold at least two entries.
pub fn constrained_derivatives<T: SplineScalar>(slopes: &[T]) -> Vec<T> {
    let m = slopes.len();
    let mut d: Vec<T> = Vec::with_capacity(m + 1);
    d.push(slopes[0].constant(0.0));

    for i in 1..m {
        let (left, right) = (&slopes[i - 1], &slopes[i]);
        if left.value() * right.value() > 0.0 {
            let harmonic =
                left.clone() * right.clone() * 2.0 / (left.clone() + right.clone());
            d.push(harmonic);
        } else {
            d.push(left.constant(0.0));
        }
    }

    d[0] = slopes[0].clone() * 1.5 - d[1].clone() / 2.0;
    let end = slopes[m - 1].clone() * 1.5 - d[m - 1].clone() / 2.0;
    d.push(end);
    d
}

/// Knot derivatives of Akima's semi-local cubic spline.
///
/// Two phantom slopes are extrapolated linearly past each end. Each knot
/// derivative is a weighted mean of its two adjacent slopes, weighted by
/// the slope changes one interval further out. When both weights vanish
/// the plain average is used.
///
/// `slopes` must hold at least two entries.
pub fn akima_derivatives<T: SplineScalar>(slopes: &[T]) -> Vec<T> {
    let m = slopes.len();
    let mut ext: Vec<T> = Vec::with_capacity(m + 4);
    ext.push(slopes[0].clone() * 3.0 - slopes[1].clone() * 2.0);
    ext.push(slopes[0].clone() * 2.0 - slopes[1].clone());
    ext.extend(slopes.iter().cloned());
    ext.push(slopes[m - 1].clone() * 2.0 - slopes[m - 2].clone());
    ext.push(slopes[m - 1].clone() * 3.0 - slopes[m - 2].clone() * 2.0);

    (0..=m)
        .map(|i| {
            let (far_left, left, right, far_right) = (&ext[i], &ext[i + 1], &ext[i + 2], &ext[i + 3]);
            let w_left = (far_right.clone() - right.clone()).abs();
            let w_right = (left.clone() - far_left.clone()).abs();
            let total = w_left.clone() + w_right.clone();
            if total.value() <= 0.0 {
                (left.clone() + right.clone()) / 2.0
            } else {
                (w_left * left.clone() + w_right * right.clone()) / total
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constrained_interior() {
        let d = constrained_derivatives(&[1.0, 3.0, -1.0]);

        assert_relative_eq!(d[1], 1.5);
        assert_relative_eq!(d[2], 0.0);
        assert_relative_eq!(d[0], 1.5 - 0.75);
        assert_relative_eq!(d[3], -1.5);
    }

    #[test]
    fn test_constrained_linear_data() {
        let d = constrained_derivatives(&[2.0, 2.0, 2.0]);
        for v in d {
            assert_relative_eq!(v, 2.0);
        }
    }

    #[test]
    fn test_akima_weights() {
        // slopes 0, 0, 1, 1: the step in the middle
        let d = akima_derivatives(&[0.0, 0.0, 1.0, 1.0]);

        assert_eq!(d.len(), 5);
        assert_relative_eq!(d[0], 0.0);
        assert_relative_eq!(d[1], 0.0);
        // both weights vanish at the centre knot
        assert_relative_eq!(d[2], 0.5);
        assert_relative_eq!(d[3], 1.0);
        assert_relative_eq!(d[4], 1.0);
    }

    #[test]
    fn test_akima_zero_weights_average() {
        let d = akima_derivatives(&[1.0, 1.0]);
        for v in d {
            assert_relative_eq!(v, 1.0);
        }
    }
}
