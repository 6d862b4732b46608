//! Interfaces to the profile and workout persistence collaborators.
//!
//! Background profile sync is fire-and-forget: a failed push is logged and
//! dropped, never retried, and never reaches the session.

use crate::{Result, WorkoutSummary};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Partial profile write; `None` fields are left as they are
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<f64>,
    /// JSON-encoded [`WorkoutSummary`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_workout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.daily_calories.is_none()
            && self.calories_burned.is_none()
            && self.recent_workout.is_none()
            && self.progress.is_none()
    }

    /// Update sent when a workout finishes
    pub fn finished_workout(summary: &WorkoutSummary, daily_calories: Option<f64>) -> Result<Self> {
        Ok(Self {
            daily_calories,
            recent_workout: Some(summary.to_json()?),
            ..Self::default()
        })
    }
}

/// Profile writer keyed by user identity (upsert, last write wins)
pub trait ProfileSync {
    fn update_profile(&mut self, email: &str, update: &ProfileUpdate) -> Result<()>;
}

/// Sink for finished workouts
pub trait WorkoutRecorder {
    fn record_workout(&mut self, summary: &WorkoutSummary) -> Result<()>;
}

/// Decides when a periodic sync is due and swallows its failures
#[derive(Debug)]
pub struct SyncScheduler {
    interval: Duration,
    last_attempt: Option<DateTime<Utc>>,
    failures: u32,
}

impl SyncScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_attempt: None,
            failures: 0,
        }
    }

    /// True when no sync has been attempted yet or the interval has passed
    ///
    /// `now` comes from the session clock; a clock stepping backwards counts
    /// as no time elapsed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => (now - last).to_std().unwrap_or_default() >= self.interval,
        }
    }

    /// Push `update` if due; errors are logged and counted, not returned
    pub fn maybe_sync<S: ProfileSync + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        sink: &mut S,
        email: &str,
        update: &ProfileUpdate,
    ) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_attempt = Some(now);
        fire_and_forget(sink, email, update, &mut self.failures)
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

fn fire_and_forget<S: ProfileSync + ?Sized>(
    sink: &mut S,
    email: &str,
    update: &ProfileUpdate,
    failures: &mut u32,
) -> bool {
    match sink.update_profile(email, update) {
        Ok(()) => {
            tracing::debug!("Synced profile for {}", email);
            true
        }
        Err(e) => {
            *failures += 1;
            tracing::warn!("Profile sync for {} failed: {}", email, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct RecordingSync {
        updates: Vec<(String, ProfileUpdate)>,
        fail: bool,
    }

    impl ProfileSync for RecordingSync {
        fn update_profile(&mut self, email: &str, update: &ProfileUpdate) -> Result<()> {
            if self.fail {
                return Err(Error::Other("offline".into()));
            }
            self.updates.push((email.to_string(), update.clone()));
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        "2025-03-01T06:30:00Z".parse().unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    fn burned(calories: f64) -> ProfileUpdate {
        ProfileUpdate {
            calories_burned: Some(calories),
            ..ProfileUpdate::default()
        }
    }

    #[test]
    fn test_first_sync_is_immediate_then_spaced() {
        let mut scheduler = SyncScheduler::new(Duration::from_secs(10));
        let mut sink = RecordingSync::default();
        let start = t0();

        assert!(scheduler.maybe_sync(start, &mut sink, "a@b.c", &burned(1.0)));
        assert!(!scheduler.maybe_sync(start + secs(5), &mut sink, "a@b.c", &burned(2.0)));
        assert!(scheduler.maybe_sync(start + secs(10), &mut sink, "a@b.c", &burned(3.0)));

        let pushed: Vec<_> = sink.updates.iter().map(|(_, u)| u.calories_burned).collect();
        assert_eq!(pushed, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_failures_are_swallowed_and_not_retried() {
        let mut scheduler = SyncScheduler::new(Duration::from_secs(10));
        let mut sink = RecordingSync {
            fail: true,
            ..RecordingSync::default()
        };
        let start = t0();

        assert!(!scheduler.maybe_sync(start, &mut sink, "a@b.c", &burned(1.0)));
        // Not retried before the next interval
        assert!(!scheduler.is_due(start + secs(1)));
        assert_eq!(scheduler.failures(), 1);
    }

    #[test]
    fn test_backwards_clock_is_not_due() {
        let mut scheduler = SyncScheduler::new(Duration::from_secs(10));
        let mut sink = RecordingSync::default();

        assert!(scheduler.maybe_sync(t0(), &mut sink, "a@b.c", &burned(1.0)));
        assert!(!scheduler.is_due(t0() - secs(60)));
        assert!(scheduler.is_due(t0() + secs(10)));
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let json = serde_json::to_value(burned(42.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "caloriesBurned": 42.0 }));
        assert!(ProfileUpdate::default().is_empty());
    }
}
