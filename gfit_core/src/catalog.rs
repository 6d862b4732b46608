//! Built-in exercise catalogs.
//!
//! Two catalogs share the same exercise names but price them differently:
//! the exercise calculator uses MET values from the Compendium of Physical
//! Activities, the balanced workout generator uses calories per minute.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Intensity multipliers applied to every MET entry
pub const MET_MULTIPLIERS: IntensityTable = IntensityTable::new(0.7, 1.0, 1.3);

static MET_CATALOG: Lazy<Catalog> = Lazy::new(build_met_catalog);
static PER_MINUTE_CATALOG: Lazy<Catalog> = Lazy::new(build_per_minute_catalog);

/// Catalog used by the exercise calculator (MET × weight)
pub fn met_catalog() -> &'static Catalog {
    &MET_CATALOG
}

/// Catalog used by the balanced workout generator (calories per minute)
pub fn per_minute_catalog() -> &'static Catalog {
    &PER_MINUTE_CATALOG
}

// name, icon, reps per minute (None for duration exercises)
const EXERCISES: [(&str, &str, Option<u32>); 8] = [
    ("Push-ups", "💪", Some(20)),
    ("Squats", "🦵", Some(15)),
    ("Sit-ups", "🔄", Some(20)),
    ("Jumping Jacks", "⭐", None),
    ("Running", "🏃", None),
    ("Cycling", "🚴", None),
    ("Swimming", "🏊", None),
    ("Jump Rope", "⚡", None),
];

fn definition(
    name: &str,
    icon: &str,
    reps_per_minute: Option<u32>,
    cost: CostFunction,
) -> ExerciseDefinition {
    ExerciseDefinition {
        name: name.into(),
        icon: icon.into(),
        cost,
        unit: if reps_per_minute.is_some() {
            MeasurementUnit::Reps
        } else {
            MeasurementUnit::Duration
        },
        reps_per_minute,
    }
}

/// Builds the MET catalog
pub fn build_met_catalog() -> Catalog {
    let mets = [8.0, 5.0, 8.0, 8.0, 9.8, 7.0, 7.0, 12.3];

    let exercises = EXERCISES
        .iter()
        .zip(mets)
        .map(|(&(name, icon, rpm), met)| {
            definition(
                name,
                icon,
                rpm,
                CostFunction::Met {
                    met,
                    multipliers: MET_MULTIPLIERS,
                },
            )
        })
        .collect();

    Catalog { exercises }
}

/// Builds the calories-per-minute catalog
pub fn build_per_minute_catalog() -> Catalog {
    let tables = [
        IntensityTable::new(7.0, 8.5, 10.0),
        IntensityTable::new(8.0, 10.0, 12.0),
        IntensityTable::new(6.0, 7.5, 10.0),
        IntensityTable::new(8.0, 10.0, 12.0),
        IntensityTable::new(11.0, 13.5, 16.0),
        IntensityTable::new(9.0, 11.0, 13.0),
        IntensityTable::new(10.0, 12.0, 14.0),
        IntensityTable::new(12.0, 14.0, 16.0),
    ];

    let exercises = EXERCISES
        .iter()
        .zip(tables)
        .map(|(&(name, icon, rpm), table)| {
            definition(name, icon, rpm, CostFunction::PerMinuteTable { table })
        })
        .collect();

    Catalog { exercises }
}

impl Catalog {
    /// Look up an exercise by exact name
    pub fn get(&self, name: &str) -> Result<&ExerciseDefinition> {
        self.exercises
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::NotFound(format!("exercise '{}' is not in the catalog", name)))
    }

    /// Look up several exercises, preserving the requested order
    pub fn get_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&ExerciseDefinition>> {
        names.iter().map(|n| self.get(n.as_ref())).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|e| e.name.as_str())
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            let name = &exercise.name;
            if name.is_empty() {
                errors.push("Exercise has empty name".to_string());
            }
            if !seen.insert(name.as_str()) {
                errors.push(format!("Duplicate exercise '{}'", name));
            }

            let costs = match &exercise.cost {
                CostFunction::PerMinuteTable { table } => table.values().to_vec(),
                CostFunction::Met { met, multipliers } => {
                    let mut v = vec![*met];
                    v.extend(multipliers.values());
                    v
                }
            };
            if costs.iter().any(|c| !c.is_finite() || *c <= 0.0) {
                errors.push(format!("Exercise '{}' has a non-positive cost", name));
            }

            match (exercise.unit, exercise.reps_per_minute) {
                (MeasurementUnit::Reps, None) | (MeasurementUnit::Reps, Some(0)) => {
                    errors.push(format!("Reps exercise '{}' has no reps per minute", name));
                }
                (MeasurementUnit::Duration, Some(_)) => {
                    errors.push(format!(
                        "Duration exercise '{}' should not define reps per minute",
                        name
                    ));
                }
                _ => {}
            }
        }

        errors
    }
}
