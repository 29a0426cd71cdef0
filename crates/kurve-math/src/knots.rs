//! Strictly increasing knot sequences.

use crate::error::{MathError, MathResult};

/// An ordered, strictly increasing sequence of knots.
///
/// Consecutive knots must be separated by more than the tolerance given at
/// construction; the sequence is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotSequence {
    knots: Vec<f64>,
}

impl KnotSequence {
    /// Creates a knot sequence requiring strictly increasing values.
    pub fn new(knots: Vec<f64>) -> MathResult<Self> {
        Self::with_tolerance(knots, 0.0)
    }

    /// Creates a knot sequence where neighbours closer than `tolerance` are
    /// rejected as duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than 2 knots, non-finite values, or knots
    /// that are not increasing by more than `tolerance`.
    pub fn with_tolerance(knots: Vec<f64>, tolerance: f64) -> MathResult<Self> {
        if knots.len() < 2 {
            return Err(MathError::insufficient_data(2, knots.len()));
        }
        if let Some(bad) = knots.iter().find(|k| !k.is_finite()) {
            return Err(MathError::invalid_input(format!(
                "knots contain non-finite value {bad}"
            )));
        }
        for (i, pair) in knots.windows(2).enumerate() {
            if pair[1] - pair[0] <= tolerance {
                return Err(MathError::invalid_input(format!(
                    "knots must be strictly increasing: knots[{}] = {} and knots[{}] = {}",
                    i,
                    pair[0],
                    i + 1,
                    pair[1]
                )));
            }
        }
        Ok(Self { knots })
    }

    /// Returns the number of knots.
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Always false: a sequence holds at least two knots.
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Returns the number of intervals between knots.
    pub fn interval_count(&self) -> usize {
        self.knots.len() - 1
    }

    /// Returns the knots as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.knots
    }

    /// First knot.
    pub fn first(&self) -> f64 {
        self.knots[0]
    }

    /// Last knot.
    pub fn last(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// Interval lengths `knots[i+1] - knots[i]`.
    pub fn intervals(&self) -> Vec<f64> {
        self.knots.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Locates the interval used to evaluate `x`.
    ///
    /// Returns the largest `i` with `knots[i] <= x`, clamped to
    /// `[0, interval_count - 1]`, so points left of the first knot use the
    /// first polynomial and points right of the last knot use the last one.
    pub fn interval_index(&self, x: f64) -> usize {
        let above = self.knots.partition_point(|k| *k <= x);
        above.saturating_sub(1).min(self.interval_count() - 1)
    }
}

impl AsRef<[f64]> for KnotSequence {
    fn as_ref(&self) -> &[f64] {
        &self.knots
    }
}
