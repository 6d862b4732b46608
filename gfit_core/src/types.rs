//! Core domain types for the GFit workout core.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their metabolic cost functions
//! - Intensity levels
//! - Workout plans and their sections
//! - Session states and workout summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Intensity
// ============================================================================

/// Effort level selected before a workout starts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Low,
    #[default]
    Moderate,
    High,
}

impl IntensityLevel {
    pub const ALL: [IntensityLevel; 3] = [
        IntensityLevel::Low,
        IntensityLevel::Moderate,
        IntensityLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityLevel::Low => "low",
            IntensityLevel::Moderate => "moderate",
            IntensityLevel::High => "high",
        }
    }
}

impl fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntensityLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(IntensityLevel::Low),
            "moderate" => Ok(IntensityLevel::Moderate),
            "high" => Ok(IntensityLevel::High),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown intensity '{}' (expected low, moderate or high)",
                other
            ))),
        }
    }
}

/// One value per intensity level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntensityTable {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
}

impl IntensityTable {
    pub const fn new(low: f64, moderate: f64, high: f64) -> Self {
        Self {
            low,
            moderate,
            high,
        }
    }

    pub fn get(&self, intensity: IntensityLevel) -> f64 {
        match intensity {
            IntensityLevel::Low => self.low,
            IntensityLevel::Moderate => self.moderate,
            IntensityLevel::High => self.high,
        }
    }

    pub fn values(&self) -> [f64; 3] {
        [self.low, self.moderate, self.high]
    }
}

// ============================================================================
// Exercise Types
// ============================================================================

/// How an exercise's amount is measured
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    Reps,
    Duration,
}

/// Metabolic cost of an exercise.
///
/// Both variants resolve to calories per minute through
/// [`CostFunction::cost_per_minute`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostFunction {
    /// Calories per minute looked up by intensity; independent of body weight
    PerMinuteTable { table: IntensityTable },
    /// MET value scaled by body weight and an intensity multiplier
    Met {
        met: f64,
        multipliers: IntensityTable,
    },
}

impl CostFunction {
    /// Calories burned per minute at the given intensity and body weight
    pub fn cost_per_minute(&self, intensity: IntensityLevel, weight_kg: f64) -> f64 {
        match self {
            CostFunction::PerMinuteTable { table } => table.get(intensity),
            CostFunction::Met { met, multipliers } => {
                met * weight_kg / 60.0 * multipliers.get(intensity)
            }
        }
    }
}

/// A catalog entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseDefinition {
    pub name: String,
    pub icon: String,
    pub cost: CostFunction,
    pub unit: MeasurementUnit,
    pub reps_per_minute: Option<u32>,
}

/// The set of exercises one calculator works from
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: Vec<ExerciseDefinition>,
}

// ============================================================================
// Plan Types
// ============================================================================

/// Section of a balanced workout plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanSectionKind {
    Cardio,
    Strength,
    Flexibility,
}

impl PlanSectionKind {
    pub const ALL: [PlanSectionKind; 3] = [
        PlanSectionKind::Cardio,
        PlanSectionKind::Strength,
        PlanSectionKind::Flexibility,
    ];

    /// Share of the calorie target allocated to this section
    pub fn weight(&self) -> f64 {
        match self {
            PlanSectionKind::Cardio => 0.5,
            PlanSectionKind::Strength => 0.3,
            PlanSectionKind::Flexibility => 0.2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlanSectionKind::Cardio => "Cardio",
            PlanSectionKind::Strength => "Strength",
            PlanSectionKind::Flexibility => "Flexibility",
        }
    }
}

/// Unit attached to a planned amount
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanUnit {
    Minutes,
    Seconds,
    Reps,
}

impl fmt::Display for PlanUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanUnit::Minutes => "minutes",
            PlanUnit::Seconds => "sec",
            PlanUnit::Reps => "reps",
        })
    }
}

/// An exercise with its computed amount
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    pub amount: u32,
    pub unit: PlanUnit,
    /// Calories this exercise is expected to burn; `None` for fixed stretches
    pub calorie_budget: Option<f64>,
    /// Cost used while this exercise is active in a session
    pub cost: Option<CostFunction>,
    /// Set for rep-counted exercises so amounts can be recomputed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_per_minute: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanSection {
    pub kind: PlanSectionKind,
    pub name: String,
    pub calorie_allocation: f64,
    pub exercises: Vec<PlannedExercise>,
}

/// A balanced workout plan meeting a calorie target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub total_calorie_target: f64,
    pub intensity: IntensityLevel,
    pub sections: Vec<PlanSection>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Lifecycle state of a workout session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Resting,
    Finished,
}

/// Which tool drove the session; becomes the summary's type tag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    ExerciseCalculator,
    BalancedWorkout,
}

impl WorkoutKind {
    pub fn tag(&self) -> &'static str {
        match self {
            WorkoutKind::ExerciseCalculator => "Exercise Calculator",
            WorkoutKind::BalancedWorkout => "Balanced Workout",
        }
    }
}

/// An exercise queued in a session
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveExercise {
    pub name: String,
    /// Section label in balanced mode
    pub section: Option<PlanSectionKind>,
    /// `None` means the exercise accrues no calories (fixed stretches)
    pub cost: Option<CostFunction>,
}

impl From<&ExerciseDefinition> for ActiveExercise {
    fn from(def: &ExerciseDefinition) -> Self {
        ActiveExercise {
            name: def.name.clone(),
            section: None,
            cost: Some(def.cost.clone()),
        }
    }
}

/// Finalized record of a completed workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub date: DateTime<Utc>,
    /// Wall-clock duration as `HH:MM:SS`
    pub duration: String,
    #[serde(rename = "type")]
    pub workout_type: String,
    pub intensity: IntensityLevel,
    pub calories_burned: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<IntensityLevel>().unwrap(), IntensityLevel::High);
        assert_eq!(" low ".parse::<IntensityLevel>().unwrap(), IntensityLevel::Low);
        assert!("extreme".parse::<IntensityLevel>().is_err());
    }

    #[test]
    fn test_met_cost_per_minute() {
        let cost = CostFunction::Met {
            met: 6.0,
            multipliers: IntensityTable::new(0.5, 1.0, 2.0),
        };
        assert!((cost.cost_per_minute(IntensityLevel::Moderate, 60.0) - 6.0).abs() < 1e-9);
        assert!((cost.cost_per_minute(IntensityLevel::High, 60.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_table_cost_ignores_weight() {
        let cost = CostFunction::PerMinuteTable {
            table: IntensityTable::new(1.0, 2.0, 3.0),
        };
        assert_eq!(cost.cost_per_minute(IntensityLevel::Low, 40.0), 1.0);
        assert_eq!(cost.cost_per_minute(IntensityLevel::Low, 120.0), 1.0);
    }

    #[test]
    fn test_summary_wire_format() {
        let summary = WorkoutSummary {
            date: "2025-03-01T10:00:00Z".parse().unwrap(),
            duration: "00:12:30".into(),
            workout_type: WorkoutKind::BalancedWorkout.tag().into(),
            intensity: IntensityLevel::High,
            calories_burned: 150,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["type"], "Balanced Workout");
        assert_eq!(json["caloriesBurned"], 150);
        assert_eq!(json["intensity"], "high");
        assert_eq!(json["duration"], "00:12:30");
    }
}
