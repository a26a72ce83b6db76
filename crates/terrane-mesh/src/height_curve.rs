//! Monotonic piecewise-linear remapping of normalized heights.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`HeightCurve`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeightCurveError {
    #[error("height curve has no keys")]
    Empty,
    /// Key inputs must strictly increase and outputs must never decrease.
    #[error("height curve key {index} breaks monotonicity")]
    NonMonotonic { index: usize },
    #[error("height curve key {index} is not finite")]
    NotFinite { index: usize },
}

/// One key of a [`HeightCurve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Normalized input height.
    pub t: f32,
    /// Remapped output.
    pub value: f32,
}

impl CurveKey {
    pub const fn new(t: f32, value: f32) -> Self {
        Self { t, value }
    }
}

/// Validated monotonic curve, linear between keys and flat outside them.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl HeightCurve {
    /// Builds a curve from keys ordered by `t`.
    ///
    /// # Errors
    ///
    /// Fails if `keys` is empty, contains non-finite values, or is not
    /// monotonic.
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, HeightCurveError> {
        if keys.is_empty() {
            return Err(HeightCurveError::Empty);
        }
        for (index, key) in keys.iter().enumerate() {
            if !key.t.is_finite() || !key.value.is_finite() {
                return Err(HeightCurveError::NotFinite { index });
            }
            if index > 0 {
                let prev = keys[index - 1];
                if key.t <= prev.t || key.value < prev.value {
                    return Err(HeightCurveError::NonMonotonic { index });
                }
            }
        }
        Ok(Self { keys })
    }

    /// The identity mapping on `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluates the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return t;
        };
        // NaN heights clamp to the bottom of the curve.
        if t.is_nan() || t <= first.t {
            return first.value;
        }
        // Index of the first key strictly right of `t`.
        let upper = self.keys.partition_point(|k| k.t <= t);
        if upper == self.keys.len() {
            return self.keys[upper - 1].value;
        }
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let f = (t - a.t) / (b.t - a.t);
        a.value + (b.value - a.value) * f
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}
