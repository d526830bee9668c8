//! Three-point (PERT) duration estimates.
//!
//! Durations are measured in days. A task whose optimistic value is missing
//! has no estimate at all; callers render it as `N/A` and the scheduler gives
//! it zero duration.

use crate::error::{EstimateError, EstimateField};

/// Divisor of the weighted PERT mean `(o + 4m + p) / 6`.
const PERT_WEIGHT: f64 = 6.0;

/// Largest accepted value for any point of an estimate, in days.
///
/// Keeps the weighted sum, the variance and finish offsets summed along any
/// chain of tasks finite.
pub const MAX_ESTIMATE_DAYS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimate {
    pub optimistic: Option<f64>,
    pub most_likely: Option<f64>,
    pub pessimistic: Option<f64>,
}

/// An estimate with every point filled in and validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreePoint {
    pub optimistic: f64,
    pub most_likely: f64,
    pub pessimistic: f64,
}

impl ThreePoint {
    pub fn expected(&self) -> f64 {
        (self.optimistic + 4.0 * self.most_likely + self.pessimistic) / PERT_WEIGHT
    }

    pub fn std_dev(&self) -> f64 {
        (self.pessimistic - self.optimistic).abs() / PERT_WEIGHT
    }

    pub fn variance(&self) -> f64 {
        self.std_dev() * self.std_dev()
    }
}

impl Estimate {
    pub fn new(optimistic: f64, most_likely: f64, pessimistic: f64) -> Self {
        Self {
            optimistic: Some(optimistic),
            most_likely: Some(most_likely),
            pessimistic: Some(pessimistic),
        }
    }

    /// Validates every supplied point and fills the gaps.
    ///
    /// A missing most-likely value takes the optimistic one, a missing
    /// pessimistic value takes the resolved most-likely one.
    pub fn resolve(&self) -> Result<Option<ThreePoint>, EstimateError> {
        let optimistic = check(EstimateField::Optimistic, self.optimistic)?;
        let most_likely = check(EstimateField::MostLikely, self.most_likely)?;
        let pessimistic = check(EstimateField::Pessimistic, self.pessimistic)?;

        let Some(optimistic) = optimistic else {
            return Ok(None);
        };
        let most_likely = most_likely.unwrap_or(optimistic);
        let pessimistic = pessimistic.unwrap_or(most_likely);

        Ok(Some(ThreePoint {
            optimistic,
            most_likely,
            pessimistic,
        }))
    }

    pub fn expected(&self) -> Result<Option<f64>, EstimateError> {
        Ok(self.resolve()?.map(|points| points.expected()))
    }

    pub fn variance(&self) -> Result<Option<f64>, EstimateError> {
        Ok(self.resolve()?.map(|points| points.variance()))
    }

    pub fn std_dev(&self) -> Result<Option<f64>, EstimateError> {
        Ok(self.resolve()?.map(|points| points.std_dev()))
    }

    pub fn is_estimated(&self) -> bool {
        self.optimistic.is_some()
    }
}

fn check(field: EstimateField, value: Option<f64>) -> Result<Option<f64>, EstimateError> {
    match value {
        Some(v) if !(0.0..=MAX_ESTIMATE_DAYS).contains(&v) => {
            Err(EstimateError { field, value: v })
        }
        other => Ok(other),
    }
}

/// Expected duration in days, or `None` when the task is not estimated.
pub fn expected_duration(
    optimistic: Option<f64>,
    most_likely: Option<f64>,
    pessimistic: Option<f64>,
) -> Result<Option<f64>, EstimateError> {
    Estimate {
        optimistic,
        most_likely,
        pessimistic,
    }
    .expected()
}

/// Rounds a duration or offset to whole days for display.
pub fn round_days(days: f64) -> i64 {
    days.round() as i64
}

/// `N/A` for unestimated tasks, whole days otherwise.
pub fn format_days(days: Option<f64>) -> String {
    match days {
        Some(d) => format!("{}d", round_days(d)),
        None => "N/A".to_string(),
    }
}
