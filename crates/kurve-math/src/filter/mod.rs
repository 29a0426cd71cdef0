//! Shape-preserving filters applied on top of a primary spline.
//!
//! A filter reads the knot derivatives of the primary spline, adjusts them
//! and rebuilds every interval in Hermite form. Knot values are untouched,
//! so the filtered curve still interpolates the data.
//!
//! - [`ShapeFilter::MonotonicityCubic`]: monotone wherever the data are
//! - [`ShapeFilter::MonotonicityQuintic`]: the same with a C2 quintic
//! - [`ShapeFilter::NonnegativityCubic`]: never crosses zero between
//!   same-signed knots
//! - [`ShapeFilter::NonnegativityQuintic`]: the same with a C2 quintic

pub mod monotonicity;
pub mod nonnegativity;

use crate::error::{MathError, MathResult};
use crate::scalar::SplineScalar;
use crate::spline::hermite::{
    cubic_hermite_rows, knot_derivatives, linear_rows, quintic_hermite_rows,
};
use log::trace;

/// Derivative filter composed with a primary spline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeFilter {
    /// Monotonicity preserving cubic Hermite.
    MonotonicityCubic,
    /// Monotonicity preserving quintic Hermite.
    MonotonicityQuintic,
    /// Nonnegativity preserving cubic Hermite.
    NonnegativityCubic,
    /// Nonnegativity preserving quintic Hermite.
    NonnegativityQuintic,
}

impl ShapeFilter {
    /// Minimum number of data points the filter accepts.
    pub fn minimum_points(self) -> usize {
        match self {
            ShapeFilter::MonotonicityCubic | ShapeFilter::NonnegativityCubic => 2,
            ShapeFilter::MonotonicityQuintic | ShapeFilter::NonnegativityQuintic => 3,
        }
    }

    /// Whether the filter also needs the primary's second derivatives.
    pub fn is_quintic(self) -> bool {
        matches!(
            self,
            ShapeFilter::MonotonicityQuintic | ShapeFilter::NonnegativityQuintic
        )
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            ShapeFilter::MonotonicityCubic => "monotonicity preserving cubic",
            ShapeFilter::MonotonicityQuintic => "monotonicity preserving quintic",
            ShapeFilter::NonnegativityCubic => "nonnegativity preserving cubic",
            ShapeFilter::NonnegativityQuintic => "nonnegativity preserving quintic",
        }
    }

    /// Rebuilds the primary rows with filtered knot derivatives.
    ///
    /// # Errors
    ///
    /// Returns an error when a quintic filter sees a primary of order below
    /// three, when there are too few points, or when the quintic monotone
    /// adjustment does not converge.
    pub fn apply<T: SplineScalar>(
        self,
        y: &[T],
        intervals: &[f64],
        slopes: &[T],
        primary: &[Vec<T>],
    ) -> MathResult<Vec<Vec<T>>> {
        let n = y.len();
        if n < self.minimum_points() {
            return Err(MathError::insufficient_data(self.minimum_points(), n));
        }
        let primary_order = primary.first().map_or(0, Vec::len);
        if self.is_quintic() && primary_order < 3 {
            return Err(MathError::invalid_input(format!(
                "{} filter needs a primary spline of order 3 or more, got order {}",
                self.name(),
                primary_order
            )));
        }
        trace!("applying {} filter to {} points", self.name(), n);

        if n == 2 {
            return linear_rows(y, slopes);
        }

        let first = knot_derivatives(primary, intervals, 1);
        match self {
            ShapeFilter::MonotonicityCubic => {
                let d = monotonicity::cubic_first_derivatives(intervals, slopes, &first);
                cubic_hermite_rows(y, intervals, slopes, &d)
            }
            ShapeFilter::NonnegativityCubic => {
                let d = nonnegativity::cubic_first_derivatives(y, intervals, slopes, &first);
                cubic_hermite_rows(y, intervals, slopes, &d)
            }
            ShapeFilter::MonotonicityQuintic => {
                let second = knot_derivatives(primary, intervals, 2);
                let (d, e) =
                    monotonicity::quintic_derivatives(intervals, slopes, &first, &second)?;
                quintic_hermite_rows(y, intervals, slopes, &d, &e)
            }
            ShapeFilter::NonnegativityQuintic => {
                let second = knot_derivatives(primary, intervals, 2);
                let (d, e) = nonnegativity::quintic_derivatives(y, intervals, slopes, &first, &second)?;
                quintic_hermite_rows(y, intervals, slopes, &d, &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piecewise::horner;
    use crate::spline::hermite::secant_slopes;
    use approx::assert_relative_eq;

    fn natural_like_rows(y: &[f64], h: &[f64], s: &[f64]) -> Vec<Vec<f64>> {
        // a deliberately overshooting primary: derivatives twice the slopes
        let d: Vec<f64> = (0..y.len())
            .map(|i| 2.0 * s[i.min(s.len() - 1)])
            .collect();
        cubic_hermite_rows(y, h, s, &d).unwrap()
    }

    #[test]
    fn test_filtered_rows_interpolate() {
        let y = [0.0, 0.1, 3.0, 3.2, 3.3];
        let h = [1.0, 1.0, 0.5, 2.0];
        let s = secant_slopes(&y, &h);
        let primary = natural_like_rows(&y, &h, &s);

        for filter in [ShapeFilter::MonotonicityCubic, ShapeFilter::NonnegativityCubic] {
            let rows = filter.apply(&y, &h, &s, &primary).unwrap();
            for (i, row) in rows.iter().enumerate() {
                assert_relative_eq!(horner(row, 0.0), y[i], epsilon = 1e-12);
                assert_relative_eq!(horner(row, h[i]), y[i + 1], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_two_points_give_line() {
        let y = [1.0, 3.0];
        let h = [2.0];
        let s = secant_slopes(&y, &h);
        let primary = vec![vec![0.5, -1.0, 1.0, 1.0]];

        let rows = ShapeFilter::MonotonicityCubic
            .apply(&y, &h, &s, &primary)
            .unwrap();
        assert_eq!(rows, vec![vec![1.0, 1.0]]);
    }

    #[test]
    fn test_quintic_needs_cubic_primary() {
        let y = [1.0, 3.0, 4.0];
        let h = [1.0, 1.0];
        let s = secant_slopes(&y, &h);
        let primary = linear_rows(&y, &s).unwrap();

        assert!(matches!(
            ShapeFilter::MonotonicityQuintic.apply(&y, &h, &s, &primary),
            Err(MathError::InvalidInput { .. })
        ));
    }
}
