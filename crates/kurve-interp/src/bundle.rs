//! Sorted data plus lazily solved interpolator state.

use crate::error::InterpResult;
use kurve_math::prelude::*;
use nalgebra::DMatrix;
use once_cell::sync::OnceCell;

/// State an interpolator solves once per bundle and reuses for every query.
#[derive(Debug, Clone)]
pub(crate) enum SolvedState {
    /// Knot second derivatives of the classic natural cubic and their
    /// Jacobian with respect to the values.
    NaturalCubic {
        second_derivatives: Vec<f64>,
        jacobian: DMatrix<f64>,
    },
    /// `F(t) = r(t) t` from the monotone convex construction.
    MonotoneConvex(PiecewisePolynomialResult),
    /// A spline result, with sensitivities when they are solved analytically.
    Spline {
        spline: SplineInterpolator,
        fit: SplineFit,
    },
}

#[derive(Debug, Clone)]
pub(crate) enum SplineFit {
    Plain(PiecewisePolynomialResult),
    WithSensitivity(PiecewisePolynomialResultWithSensitivity),
}

impl SplineFit {
    pub(crate) fn result(&self) -> &PiecewisePolynomialResult {
        match self {
            SplineFit::Plain(result) => result,
            SplineFit::WithSensitivity(with_sens) => with_sens.result(),
        }
    }
}

/// Keys and values of one curve, sorted by key.
///
/// The only mutation is [`set_value_at_index`](Self::set_value_at_index),
/// which discards any solved state.
#[derive(Debug, Clone)]
pub struct DataBundle {
    keys: Vec<f64>,
    values: Vec<f64>,
    state: OnceCell<SolvedState>,
}

impl DataBundle {
    /// Creates a bundle, sorting the pairs by key.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched lengths, fewer than two points,
    /// NaN or infinite entries, or repeated keys.
    pub fn new(keys: Vec<f64>, values: Vec<f64>) -> InterpResult<Self> {
        check_entries(&keys, &values)?;
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|a, b| keys[*a].total_cmp(&keys[*b]));
        let sorted_keys = order.iter().map(|i| keys[*i]).collect();
        let sorted_values = order.iter().map(|i| values[*i]).collect();
        Self::from_sorted(sorted_keys, sorted_values)
    }

    /// Creates a bundle from keys that are already strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched lengths, fewer than two points,
    /// NaN or infinite entries, or keys that are not strictly increasing.
    pub fn from_sorted(keys: Vec<f64>, values: Vec<f64>) -> InterpResult<Self> {
        check_entries(&keys, &values)?;
        for pair in keys.windows(2) {
            if pair[1] <= pair[0] {
                return Err(MathError::invalid_input(format!(
                    "keys should be distinct and increasing: {} followed by {}",
                    pair[0], pair[1]
                ))
                .into());
            }
        }
        Ok(Self {
            keys,
            values,
            state: OnceCell::new(),
        })
    }

    /// The smallest key.
    pub fn first_key(&self) -> f64 {
        self.keys[0]
    }

    /// The largest key.
    pub fn last_key(&self) -> f64 {
        self.keys[self.keys.len() - 1]
    }

    /// Sorted keys.
    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    /// Values in key order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// Index of the largest key not above `value`, or 0 below the first key.
    pub fn lower_bound_index(&self, value: f64) -> usize {
        self.keys.partition_point(|k| *k <= value).saturating_sub(1)
    }

    /// Index of the interval holding `value`, clamped to the existing intervals.
    pub fn interval_index(&self, value: f64) -> usize {
        self.lower_bound_index(value).min(self.keys.len() - 2)
    }

    /// Whether `key` is one of the keys exactly.
    pub fn contains_key(&self, key: f64) -> bool {
        self.keys.binary_search_by(|k| k.total_cmp(&key)).is_ok()
    }

    /// Replaces the value at `index` and discards solved state.
    ///
    /// # Errors
    ///
    /// Returns an error when `index` is out of bounds or `value` is not finite.
    pub fn set_value_at_index(&mut self, index: usize, value: f64) -> InterpResult<()> {
        if index >= self.values.len() {
            return Err(MathError::invalid_input(format!(
                "index {} out of bounds for {} values",
                index,
                self.values.len()
            ))
            .into());
        }
        if !value.is_finite() {
            return Err(MathError::invalid_input(format!("value {value} is not finite")).into());
        }
        self.values[index] = value;
        self.state = OnceCell::new();
        Ok(())
    }

    /// A copy with one value replaced, without the solved state.
    pub(crate) fn with_value_at_index(&self, index: usize, value: f64) -> InterpResult<Self> {
        let mut bumped = Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            state: OnceCell::new(),
        };
        bumped.set_value_at_index(index, value)?;
        Ok(bumped)
    }

    pub(crate) fn state_or_init<F>(&self, init: F) -> InterpResult<&SolvedState>
    where
        F: FnOnce() -> InterpResult<SolvedState>,
    {
        self.state.get_or_try_init(init)
    }
}

/// Two bundles are equal when their data are; solved state is ignored.
impl PartialEq for DataBundle {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.values == other.values
    }
}

fn check_entries(keys: &[f64], values: &[f64]) -> InterpResult<()> {
    if keys.len() != values.len() {
        return Err(MathError::invalid_input(format!(
            "keys and values must have the same length: {} vs {}",
            keys.len(),
            values.len()
        ))
        .into());
    }
    if keys.len() < 2 {
        return Err(MathError::insufficient_data(2, keys.len()).into());
    }
    for (name, entries) in [("keys", keys), ("values", values)] {
        if entries.iter().any(|v| v.is_nan()) {
            return Err(MathError::invalid_input(format!("{name} contain NaN")).into());
        }
        if entries.iter().any(|v| v.is_infinite()) {
            return Err(MathError::invalid_input(format!("{name} contain infinite values")).into());
        }
    }
    Ok(())
}
