//! Energy expenditure calculation.
//!
//! MET exercises burn `MET × weight (kg) × hours × intensity multiplier`;
//! per-minute exercises burn `calories/minute × minutes` regardless of weight.

use crate::{CostFunction, Error, ExerciseDefinition, IntensityLevel, Result};
use chrono::Duration;

/// Calories burned performing `exercise` for `duration_minutes`
///
/// Fails with [`Error::InvalidInput`] when the weight is not positive or the
/// duration is negative.
pub fn calories_burned(
    exercise: &ExerciseDefinition,
    weight_kg: f64,
    intensity: IntensityLevel,
    duration_minutes: f64,
) -> Result<f64> {
    calories_for_cost(&exercise.cost, weight_kg, intensity, duration_minutes)
}

/// Same as [`calories_burned`] but against a bare cost function
pub fn calories_for_cost(
    cost: &CostFunction,
    weight_kg: f64,
    intensity: IntensityLevel,
    duration_minutes: f64,
) -> Result<f64> {
    validate_weight(weight_kg)?;
    if !duration_minutes.is_finite() || duration_minutes < 0.0 {
        return Err(Error::InvalidInput(format!(
            "duration must be zero or more minutes, got {}",
            duration_minutes
        )));
    }

    if duration_minutes == 0.0 {
        return Ok(0.0);
    }

    Ok(cost.cost_per_minute(intensity, weight_kg) * duration_minutes)
}

/// Calories for a wall-clock span; negative spans count as zero
pub fn calories_for_elapsed(
    cost: &CostFunction,
    weight_kg: f64,
    intensity: IntensityLevel,
    elapsed: Duration,
) -> Result<f64> {
    calories_for_cost(cost, weight_kg, intensity, duration_to_minutes(elapsed))
}

pub(crate) fn duration_to_minutes(elapsed: Duration) -> f64 {
    (elapsed.num_milliseconds().max(0) as f64) / 60_000.0
}

pub(crate) fn validate_weight(weight_kg: f64) -> Result<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "weight must be positive, got {} kg",
            weight_kg
        )));
    }
    Ok(())
}
