//! Balanced workout plan generation.
//!
//! A calorie target is split 50/30/20 across cardio, strength and
//! flexibility. Cardio and strength budgets are shared evenly by a fixed
//! exercise list and converted into whole minutes or reps; flexibility is a
//! fixed stretching routine.

use crate::catalog::per_minute_catalog;
use crate::{
    ActiveExercise, Catalog, CostFunction, Error, IntensityLevel, MeasurementUnit, PlanSection,
    PlanSectionKind, PlanUnit, PlannedExercise, Result, WorkoutPlan,
};

/// Cardio exercises, in plan order
pub const CARDIO_EXERCISES: [&str; 5] =
    ["Jumping Jacks", "Running", "Cycling", "Swimming", "Jump Rope"];

/// Strength exercises, in plan order
pub const STRENGTH_EXERCISES: [&str; 3] = ["Push-ups", "Squats", "Sit-ups"];

/// Fixed stretching routine: name, amount, unit
pub const FLEXIBILITY_ROUTINE: [(&str, u32, PlanUnit); 4] = [
    ("Hamstring Stretch", 30, PlanUnit::Seconds),
    ("Shoulder Stretch", 30, PlanUnit::Seconds),
    ("Hip Flexor Stretch", 30, PlanUnit::Seconds),
    ("Cat-Cow Stretch", 10, PlanUnit::Reps),
];

/// Generate a plan from the built-in calories-per-minute catalog
pub fn generate_plan(total_calories: f64, intensity: IntensityLevel) -> Result<WorkoutPlan> {
    generate_plan_with(per_minute_catalog(), total_calories, intensity)
}

/// Generate a plan pricing exercises from `catalog`
///
/// A non-positive or non-finite target is rejected rather than producing an
/// empty plan.
pub fn generate_plan_with(
    catalog: &Catalog,
    total_calories: f64,
    intensity: IntensityLevel,
) -> Result<WorkoutPlan> {
    if !total_calories.is_finite() || total_calories <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "calorie target must be positive, got {}",
            total_calories
        )));
    }

    let sections = PlanSectionKind::ALL
        .iter()
        .map(|&kind| {
            let allocation = total_calories * kind.weight();
            let exercises = match kind {
                PlanSectionKind::Cardio => {
                    priced_exercises(catalog, &CARDIO_EXERCISES, allocation, intensity)?
                }
                PlanSectionKind::Strength => {
                    priced_exercises(catalog, &STRENGTH_EXERCISES, allocation, intensity)?
                }
                PlanSectionKind::Flexibility => flexibility_exercises(),
            };
            Ok(PlanSection {
                kind,
                name: kind.name().to_string(),
                calorie_allocation: allocation,
                exercises,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Generated {} plan for {:.0} calories",
        intensity,
        total_calories
    );

    Ok(WorkoutPlan {
        total_calorie_target: total_calories,
        intensity,
        sections,
    })
}

fn priced_exercises(
    catalog: &Catalog,
    names: &[&str],
    allocation: f64,
    intensity: IntensityLevel,
) -> Result<Vec<PlannedExercise>> {
    let per_exercise = allocation / names.len() as f64;

    catalog
        .get_all(names)?
        .into_iter()
        .map(|def| {
            let reps_per_minute = match def.unit {
                MeasurementUnit::Reps => def.reps_per_minute,
                MeasurementUnit::Duration => None,
            };
            let (amount, unit) =
                priced_amount(&def.name, &def.cost, reps_per_minute, per_exercise, intensity)?;

            Ok(PlannedExercise {
                name: def.name.clone(),
                amount,
                unit,
                calorie_budget: Some(per_exercise),
                cost: Some(def.cost.clone()),
                reps_per_minute,
            })
        })
        .collect()
}

/// Whole minutes or reps needed to burn `budget` calories
fn priced_amount(
    name: &str,
    cost: &CostFunction,
    reps_per_minute: Option<u32>,
    budget: f64,
    intensity: IntensityLevel,
) -> Result<(u32, PlanUnit)> {
    // Plans are priced per minute; weight only matters for MET entries
    let per_minute = cost.cost_per_minute(intensity, DEFAULT_PLAN_WEIGHT_KG);
    if per_minute <= 0.0 {
        return Err(Error::CatalogValidation(format!(
            "exercise '{}' has no positive cost at {} intensity",
            name, intensity
        )));
    }
    let minutes = budget / per_minute;

    Ok(match reps_per_minute {
        Some(rpm) => ((minutes * rpm as f64).ceil() as u32, PlanUnit::Reps),
        None => (minutes.ceil() as u32, PlanUnit::Minutes),
    })
}

/// Reference weight for pricing MET catalogs in a plan
const DEFAULT_PLAN_WEIGHT_KG: f64 = 70.0;

fn flexibility_exercises() -> Vec<PlannedExercise> {
    FLEXIBILITY_ROUTINE
        .iter()
        .map(|&(name, amount, unit)| PlannedExercise {
            name: name.to_string(),
            amount,
            unit,
            calorie_budget: None,
            cost: None,
            reps_per_minute: None,
        })
        .collect()
}

impl WorkoutPlan {
    /// Reprice amounts for another intensity, keeping the section layout
    ///
    /// Each exercise is repriced with the cost it was planned with, so a plan
    /// built from a MET catalog stays MET-priced.
    pub fn with_intensity(&self, intensity: IntensityLevel) -> Result<WorkoutPlan> {
        let mut plan = self.clone();
        plan.intensity = intensity;

        for exercise in plan.sections.iter_mut().flat_map(|s| s.exercises.iter_mut()) {
            let (Some(cost), Some(budget)) = (&exercise.cost, exercise.calorie_budget) else {
                continue;
            };
            let (amount, unit) = priced_amount(
                &exercise.name,
                cost,
                exercise.reps_per_minute,
                budget,
                intensity,
            )?;
            exercise.amount = amount;
            exercise.unit = unit;
        }

        Ok(plan)
    }

    /// Flatten the plan into a session queue, section by section
    pub fn exercise_queue(&self) -> Vec<ActiveExercise> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.exercises.iter().map(move |ex| ActiveExercise {
                    name: ex.name.clone(),
                    section: Some(section.kind),
                    cost: ex.cost.clone(),
                })
            })
            .collect()
    }

    /// Sum of all section allocations
    pub fn allocated_calories(&self) -> f64 {
        self.sections.iter().map(|s| s.calorie_allocation).sum()
    }

    pub fn section(&self, kind: PlanSectionKind) -> Option<&PlanSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::met_catalog;

    fn amount_of(plan: &WorkoutPlan, kind: PlanSectionKind, name: &str) -> u32 {
        plan.section(kind)
            .unwrap()
            .exercises
            .iter()
            .find(|e| e.name == name)
            .unwrap()
            .amount
    }

    #[test]
    fn test_three_sections_in_order() {
        let plan = generate_plan(1000.0, IntensityLevel::Moderate).unwrap();
        let names: Vec<_> = plan.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Cardio", "Strength", "Flexibility"]);
    }

    #[test]
    fn test_cardio_budget_split_across_five() {
        let plan = generate_plan(1000.0, IntensityLevel::Moderate).unwrap();
        let cardio = plan.section(PlanSectionKind::Cardio).unwrap();
        assert_eq!(cardio.calorie_allocation, 500.0);
        assert_eq!(cardio.exercises.len(), 5);
        for ex in &cardio.exercises {
            assert_eq!(ex.calorie_budget, Some(100.0));
            assert_eq!(ex.unit, PlanUnit::Minutes);
        }
        // ceil(100 / 13.5)
        assert_eq!(amount_of(&plan, PlanSectionKind::Cardio, "Running"), 8);
        // ceil(100 / 10)
        assert_eq!(amount_of(&plan, PlanSectionKind::Cardio, "Jumping Jacks"), 10);
    }

    #[test]
    fn test_strength_amounts_are_reps() {
        let plan = generate_plan(1000.0, IntensityLevel::Moderate).unwrap();
        let strength = plan.section(PlanSectionKind::Strength).unwrap();
        assert!(strength.exercises.iter().all(|e| e.unit == PlanUnit::Reps));
        // 100 cal / 8.5 cal/min × 20 reps/min = 235.29 → 236
        assert_eq!(amount_of(&plan, PlanSectionKind::Strength, "Push-ups"), 236);
        // 100 / 10 × 15 = 150
        assert_eq!(amount_of(&plan, PlanSectionKind::Strength, "Squats"), 150);
    }

    #[test]
    fn test_flexibility_is_fixed() {
        let small = generate_plan(100.0, IntensityLevel::Low).unwrap();
        let large = generate_plan(5000.0, IntensityLevel::High).unwrap();
        let a = small.section(PlanSectionKind::Flexibility).unwrap();
        let b = large.section(PlanSectionKind::Flexibility).unwrap();
        assert_eq!(a.exercises, b.exercises);
        assert_eq!(a.exercises.len(), 4);
        assert!(a.exercises.iter().all(|e| e.cost.is_none()));
        assert_eq!(a.exercises[3].unit, PlanUnit::Reps);
    }

    #[test]
    fn test_allocations_sum_to_target() {
        for target in [1.0, 250.0, 1000.0, 1234.5] {
            let plan = generate_plan(target, IntensityLevel::Moderate).unwrap();
            assert!((plan.allocated_calories() - target).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = generate_plan(750.0, IntensityLevel::High).unwrap();
        let b = generate_plan(750.0, IntensityLevel::High).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_intensity_change_keeps_structure() {
        let moderate = generate_plan(1000.0, IntensityLevel::Moderate).unwrap();
        let high = moderate.with_intensity(IntensityLevel::High).unwrap();

        assert_eq!(high.intensity, IntensityLevel::High);
        assert_eq!(moderate.sections.len(), high.sections.len());
        for (a, b) in moderate.sections.iter().zip(&high.sections) {
            let names_a: Vec<_> = a.exercises.iter().map(|e| &e.name).collect();
            let names_b: Vec<_> = b.exercises.iter().map(|e| &e.name).collect();
            assert_eq!(names_a, names_b);
        }
        // ceil(100 / 16)
        assert_eq!(amount_of(&high, PlanSectionKind::Cardio, "Running"), 7);
    }

    #[test]
    fn test_rejects_non_positive_target() {
        for target in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                generate_plan(target, IntensityLevel::Moderate),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_met_catalog_can_price_a_plan() {
        let plan = generate_plan_with(met_catalog(), 1000.0, IntensityLevel::Moderate).unwrap();
        // 9.8 MET × 70 kg / 60 = 11.43 cal/min → ceil(100 / 11.43) = 9
        assert_eq!(amount_of(&plan, PlanSectionKind::Cardio, "Running"), 9);
    }

    #[test]
    fn test_intensity_change_keeps_pricing_model() {
        let met_plan = generate_plan_with(met_catalog(), 1000.0, IntensityLevel::Moderate).unwrap();
        let high = met_plan.with_intensity(IntensityLevel::High).unwrap();

        assert_eq!(
            high,
            generate_plan_with(met_catalog(), 1000.0, IntensityLevel::High).unwrap()
        );
        // 9.8 × 1.3 × 70 / 60 = 14.86 cal/min → ceil(100 / 14.86) = 7
        assert_eq!(amount_of(&high, PlanSectionKind::Cardio, "Running"), 7);
        // Per-minute pricing would give 100 / 10 × 20 = 200 push-ups
        // MET: 8.0 × 1.3 × 70 / 60 = 12.13 cal/min → ceil(100 / 12.13 × 20) = 165
        assert_eq!(amount_of(&high, PlanSectionKind::Strength, "Push-ups"), 165);

        let back = high.with_intensity(IntensityLevel::Moderate).unwrap();
        assert_eq!(back, met_plan);
    }

    #[test]
    fn test_exercise_queue_flattens_sections() {
        let plan = generate_plan(600.0, IntensityLevel::Low).unwrap();
        let queue = plan.exercise_queue();
        assert_eq!(queue.len(), 5 + 3 + 4);
        assert_eq!(queue[0].name, "Jumping Jacks");
        assert_eq!(queue[0].section, Some(PlanSectionKind::Cardio));
        assert_eq!(queue[5].section, Some(PlanSectionKind::Strength));
        assert!(queue[11].cost.is_none());
    }
}
