//! Single-threaded driver for a live workout session.
//!
//! The runner is the only writer to its [`WorkoutSession`]. It waits on a
//! command channel with the tick interval as timeout: a timeout becomes a
//! `Tick`, a command becomes `NextExercise` or `End`. Once the session is
//! finished the loop returns, so no tick can follow the summary.

use crate::session::{SessionEvent, WorkoutSession};
use crate::sync::{ProfileSync, ProfileUpdate, SyncScheduler, WorkoutRecorder};
use crate::{Error, Result, SessionState, WorkoutSummary};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Source of event timestamps
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// User actions forwarded to the runner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Next,
    End,
}

#[derive(Clone, Debug)]
pub struct RunnerOptions {
    pub tick_interval: Duration,
    pub sync_interval: Duration,
    /// End the workout automatically after this many ticks
    pub max_ticks: Option<u64>,
    /// Profile key for background and final sync
    pub email: Option<String>,
    /// Calorie target pushed alongside the final summary
    pub daily_calories: Option<f64>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            sync_interval: Duration::from_secs(10),
            max_ticks: None,
            email: None,
            daily_calories: None,
        }
    }
}

pub struct SessionRunner<'a> {
    clock: &'a dyn Clock,
    options: RunnerOptions,
    recorder: &'a mut dyn WorkoutRecorder,
    profile: Option<&'a mut dyn ProfileSync>,
}

impl<'a> SessionRunner<'a> {
    pub fn new(
        clock: &'a dyn Clock,
        options: RunnerOptions,
        recorder: &'a mut dyn WorkoutRecorder,
    ) -> Self {
        Self {
            clock,
            options,
            recorder,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: &'a mut dyn ProfileSync) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Run `session` to completion
    ///
    /// `on_update` is called after every accepted event with the session and
    /// the event time. A closed command channel ends the workout.
    pub fn run<F>(
        &mut self,
        mut session: WorkoutSession,
        commands: &Receiver<SessionCommand>,
        mut on_update: F,
    ) -> Result<WorkoutSummary>
    where
        F: FnMut(&WorkoutSession, DateTime<Utc>),
    {
        let started = self.clock.now();
        session.apply(SessionEvent::Start { at: started })?;
        on_update(&session, started);

        let mut scheduler = SyncScheduler::new(self.options.sync_interval);
        let mut ticks = 0u64;

        let end_at = loop {
            match commands.recv_timeout(self.options.tick_interval) {
                Ok(SessionCommand::Next) => {
                    let at = self.clock.now();
                    match session.apply(SessionEvent::NextExercise { at }) {
                        Ok(_) => on_update(&session, at),
                        Err(Error::State(msg)) => tracing::warn!("Ignoring next exercise: {}", msg),
                        Err(e) => return Err(e),
                    }
                }
                Ok(SessionCommand::End) => break self.clock.now(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Command channel closed, ending workout");
                    break self.clock.now();
                }
                Err(RecvTimeoutError::Timeout) => {
                    let at = self.clock.now();
                    session.apply(SessionEvent::Tick { at })?;
                    ticks += 1;
                    on_update(&session, at);
                    self.background_sync(&mut scheduler, &session, at);

                    if self.options.max_ticks.is_some_and(|max| ticks >= max) {
                        break at;
                    }
                }
            }
        };

        let summary = session
            .apply(SessionEvent::End { at: end_at })?
            .ok_or_else(|| Error::State("workout ended without a summary".into()))?;
        debug_assert_eq!(session.state(), SessionState::Finished);
        on_update(&session, end_at);

        self.recorder.record_workout(&summary)?;
        self.final_sync(&summary);

        Ok(summary)
    }

    fn background_sync(
        &mut self,
        scheduler: &mut SyncScheduler,
        session: &WorkoutSession,
        at: DateTime<Utc>,
    ) {
        let (Some(profile), Some(email)) = (self.profile.as_deref_mut(), self.options.email.as_deref())
        else {
            return;
        };
        let update = ProfileUpdate {
            calories_burned: Some(session.calories().round()),
            ..ProfileUpdate::default()
        };
        scheduler.maybe_sync(at, profile, email, &update);
    }

    fn final_sync(&mut self, summary: &WorkoutSummary) {
        let (Some(profile), Some(email)) = (self.profile.as_deref_mut(), self.options.email.as_deref())
        else {
            return;
        };
        let result = ProfileUpdate::finished_workout(summary, self.options.daily_calories)
            .and_then(|update| profile.update_profile(email, &update));
        if let Err(e) = result {
            tracing::warn!("Failed to store recent workout for {}: {}", email, e);
        }
    }
}
