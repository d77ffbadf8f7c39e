//! Non-negative real-valued quantities (cpus, mem, disk).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fractional digits kept by scalar arithmetic.
pub const SCALAR_PRECISION: f64 = 1000.0;

/// A scalar quantity.
///
/// Sums and differences are rounded to three decimal places, so repeated
/// arithmetic on values like 0.1 lands on the same quantity instead of
/// drifting. Arithmetic never clamps: a subtraction that goes below zero
/// yields a negative value, which makes the owning resource fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scalar(pub f64);

impl Scalar {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn add(&self, other: &Scalar) -> Scalar {
        Scalar(round(self.0 + other.0))
    }

    pub fn subtract(&self, other: &Scalar) -> Scalar {
        Scalar(round(self.0 - other.0))
    }

    /// Numeric ordering. Incomparable values (NaN) compare as equal.
    pub fn compare(&self, other: &Scalar) -> Ordering {
        if self.0 < other.0 {
            Ordering::Less
        } else if self.0 > other.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

fn round(value: f64) -> f64 {
    (value * SCALAR_PRECISION).round() / SCALAR_PRECISION
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Scalar {
    // f64's Display is the shortest round-trip form without exponent: 5, 12.5
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
