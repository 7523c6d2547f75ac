//! Declared occurrence ranges

use serde::{Deserialize, Serialize};

/// A declared (min, max) cardinality constraint.
///
/// An absent maximum means "unlimited". `max_unknown` mirrors the explicit
/// "maximum unknown" marker descriptors may carry instead of a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceRange {
    #[serde(default, rename = "min_occurrence", alias = "min")]
    pub min: Option<i64>,

    #[serde(default, rename = "max_occurrence", alias = "max")]
    pub max: Option<i64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub max_unknown: bool,
}

impl OccurrenceRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            min,
            max,
            max_unknown: false,
        }
    }

    /// No minimum, no maximum
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// At least `min`, unlimited
    pub fn at_least(min: i64) -> Self {
        Self::new(Some(min), None)
    }

    /// At most `max`
    pub fn at_most(max: i64) -> Self {
        Self::new(None, Some(max))
    }

    pub fn between(min: i64, max: i64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Explicitly unknown maximum
    pub fn unknown_max() -> Self {
        Self {
            min: None,
            max: None,
            max_unknown: true,
        }
    }

    /// Whether `count` is below the declared minimum
    pub fn is_below_min(&self, count: usize) -> bool {
        self.min.is_some_and(|min| (count as i128) < i128::from(min))
    }

    /// Whether `count` exceeds a declared (positive) maximum
    pub fn is_above_max(&self, count: usize) -> bool {
        self.max
            .is_some_and(|max| max > 0 && (count as i128) > i128::from(max))
    }
}
