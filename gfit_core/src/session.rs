//! Workout session lifecycle.
//!
//! A session moves `Idle → Running ⇄ Resting → Finished`. Every change is
//! driven by a [`SessionEvent`] carrying its own timestamp, so the state
//! machine never reads a clock and can be replayed at any speed.
//!
//! Calories for the active exercise are recomputed on each tick from the time
//! elapsed since its segment started and added to the total of the segments
//! already closed. Nothing accrues while resting.

use crate::energy::{calories_for_elapsed, validate_weight};
use crate::summary::format_duration;
use crate::{
    ActiveExercise, Error, ExerciseDefinition, IntensityLevel, Result, SessionState,
    WorkoutKind, WorkoutPlan, WorkoutSummary,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Input to [`WorkoutSession::apply`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Start { at: DateTime<Utc> },
    Tick { at: DateTime<Utc> },
    NextExercise { at: DateTime<Utc> },
    End { at: DateTime<Utc> },
}

impl SessionEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match *self {
            SessionEvent::Start { at }
            | SessionEvent::Tick { at }
            | SessionEvent::NextExercise { at }
            | SessionEvent::End { at } => at,
        }
    }
}

/// A single workout, from start to summary
#[derive(Clone, Debug)]
pub struct WorkoutSession {
    kind: WorkoutKind,
    intensity: IntensityLevel,
    weight_kg: f64,
    rest_duration: Duration,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    segment_started_at: Option<DateTime<Utc>>,
    rest_started_at: Option<DateTime<Utc>>,
    elapsed_closed: Duration,
    elapsed_open: Duration,
    calories_closed: f64,
    calories_open: f64,
    remaining: VecDeque<ActiveExercise>,
}

impl WorkoutSession {
    /// Session over user-selected exercises (the exercise calculator)
    pub fn calculator(
        exercises: &[&ExerciseDefinition],
        weight_kg: f64,
        intensity: IntensityLevel,
        rest_duration: Duration,
    ) -> Result<Self> {
        let queue = exercises.iter().map(|&def| ActiveExercise::from(def)).collect();
        Self::new(
            WorkoutKind::ExerciseCalculator,
            queue,
            weight_kg,
            intensity,
            rest_duration,
        )
    }

    /// Session walking a balanced plan section by section
    pub fn balanced(plan: &WorkoutPlan, weight_kg: f64, rest_duration: Duration) -> Result<Self> {
        Self::new(
            WorkoutKind::BalancedWorkout,
            plan.exercise_queue(),
            weight_kg,
            plan.intensity,
            rest_duration,
        )
    }

    pub fn new(
        kind: WorkoutKind,
        exercises: Vec<ActiveExercise>,
        weight_kg: f64,
        intensity: IntensityLevel,
        rest_duration: Duration,
    ) -> Result<Self> {
        validate_weight(weight_kg)?;
        if exercises.is_empty() {
            return Err(Error::InvalidInput(
                "a workout needs at least one exercise".into(),
            ));
        }
        if rest_duration < Duration::zero() {
            return Err(Error::InvalidInput("rest duration cannot be negative".into()));
        }

        Ok(Self {
            kind,
            intensity,
            weight_kg,
            rest_duration,
            state: SessionState::Idle,
            started_at: None,
            segment_started_at: None,
            rest_started_at: None,
            elapsed_closed: Duration::zero(),
            elapsed_open: Duration::zero(),
            calories_closed: 0.0,
            calories_open: 0.0,
            remaining: exercises.into(),
        })
    }

    /// Change intensity before the workout starts
    pub fn set_intensity(&mut self, intensity: IntensityLevel) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(Error::State(
                "intensity is fixed once the workout has started".into(),
            ));
        }
        self.intensity = intensity;
        Ok(())
    }

    /// Feed one event into the state machine
    ///
    /// Returns the summary when the event finishes the workout. Rejected
    /// events leave the session untouched.
    pub fn apply(&mut self, event: SessionEvent) -> Result<Option<WorkoutSummary>> {
        match (self.state, event) {
            (SessionState::Idle, SessionEvent::Start { at }) => {
                self.start(at);
                Ok(None)
            }
            (SessionState::Running, SessionEvent::Tick { at }) => {
                self.accrue(at)?;
                Ok(None)
            }
            (SessionState::Resting, SessionEvent::Tick { at }) => {
                self.check_rest(at);
                Ok(None)
            }
            (SessionState::Running, SessionEvent::NextExercise { at }) => {
                self.advance(at)?;
                Ok(None)
            }
            (SessionState::Running, SessionEvent::End { at })
            | (SessionState::Resting, SessionEvent::End { at }) => self.finish(at).map(Some),
            (state, event) => Err(Error::State(format!(
                "{:?} is not accepted while {:?}",
                event, state
            ))),
        }
    }

    fn start(&mut self, at: DateTime<Utc>) {
        self.state = SessionState::Running;
        self.started_at = Some(at);
        self.segment_started_at = Some(at);
        self.rest_started_at = None;
        self.elapsed_closed = Duration::zero();
        self.elapsed_open = Duration::zero();
        self.calories_closed = 0.0;
        self.calories_open = 0.0;

        tracing::info!(
            "Started {} at {} intensity with {} exercises",
            self.kind.tag(),
            self.intensity,
            self.remaining.len()
        );
    }

    /// Recompute the open segment up to `at`; never moves backwards
    fn accrue(&mut self, at: DateTime<Utc>) -> Result<()> {
        let Some(segment_start) = self.segment_started_at else {
            return Ok(());
        };
        let elapsed = at - segment_start;

        let calories = match self.remaining.front().and_then(|e| e.cost.as_ref()) {
            Some(cost) => calories_for_elapsed(cost, self.weight_kg, self.intensity, elapsed)?,
            None => 0.0,
        };

        self.calories_open = self.calories_open.max(calories);
        self.elapsed_open = self.elapsed_open.max(elapsed);
        Ok(())
    }

    fn close_segment(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.accrue(at)?;
        self.calories_closed += self.calories_open;
        self.elapsed_closed = self.elapsed_closed + self.elapsed_open;
        self.calories_open = 0.0;
        self.elapsed_open = Duration::zero();
        self.segment_started_at = None;
        Ok(())
    }

    fn advance(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.remaining.len() < 2 {
            return Err(Error::State("no next exercise to move on to".into()));
        }

        self.close_segment(at)?;
        if let Some(done) = self.remaining.pop_front() {
            tracing::debug!("Finished {}, resting", done.name);
        }
        self.state = SessionState::Resting;
        self.rest_started_at = Some(at);
        Ok(())
    }

    fn check_rest(&mut self, at: DateTime<Utc>) {
        let Some(rest_start) = self.rest_started_at else {
            return;
        };
        if at - rest_start >= self.rest_duration {
            self.state = SessionState::Running;
            self.rest_started_at = None;
            self.segment_started_at = Some(at);
            tracing::debug!(
                "Rest over, starting {}",
                self.current_exercise().map(|e| e.name.as_str()).unwrap_or("?")
            );
        }
    }

    fn finish(&mut self, at: DateTime<Utc>) -> Result<WorkoutSummary> {
        if self.state == SessionState::Running {
            self.close_segment(at)?;
        }
        self.state = SessionState::Finished;
        self.rest_started_at = None;

        let started_at = self.started_at.unwrap_or(at);
        let summary = WorkoutSummary {
            date: at,
            duration: format_duration(at - started_at),
            workout_type: self.kind.tag().to_string(),
            intensity: self.intensity,
            calories_burned: self.calories_closed.max(0.0).round() as u32,
        };

        tracing::info!(
            "Finished {}: {} in {}",
            summary.workout_type,
            summary.calories_burned,
            summary.duration
        );
        Ok(summary)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub fn intensity(&self) -> IntensityLevel {
        self.intensity
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Calories burned so far, including the active exercise up to the last tick
    pub fn calories(&self) -> f64 {
        self.calories_closed + self.calories_open
    }

    /// Time spent exercising, excluding rests
    pub fn elapsed_active(&self) -> Duration {
        self.elapsed_closed + self.elapsed_open
    }

    pub fn current_exercise(&self) -> Option<&ActiveExercise> {
        self.remaining.front()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &ActiveExercise> {
        self.remaining.iter()
    }

    pub fn can_advance(&self) -> bool {
        self.state == SessionState::Running && self.remaining.len() >= 2
    }

    /// Rest left at `at`, or `None` when not resting
    pub fn rest_remaining(&self, at: DateTime<Utc>) -> Option<Duration> {
        let rest_start = self.rest_started_at?;
        Some((self.rest_duration - (at - rest_start)).max(Duration::zero()))
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }
}
