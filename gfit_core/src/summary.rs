//! Workout summary formatting and the dashboard's "recent workout" card.
//!
//! The profile stores the last summary as a JSON string. Reading it back is
//! allowed to fail: a malformed value is shown as "no data" and never touches
//! session state.

use crate::{Error, Result, WorkoutSummary};
use chrono::Duration;

/// Format a span as `HH:MM:SS`; hours are not wrapped, negative spans read as zero
pub fn format_duration(span: Duration) -> String {
    let total = span.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parse an `HH:MM:SS` string back into a span
pub fn parse_duration(text: &str) -> Result<Duration> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(Error::Parse(format!("duration '{}' is not HH:MM:SS", text)));
    }

    let mut fields = [0i64; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        *slot = part
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .ok_or_else(|| Error::Parse(format!("duration '{}' is not HH:MM:SS", text)))?;
    }
    let [hours, minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return Err(Error::Parse(format!("duration '{}' is out of range", text)));
    }

    Ok(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

impl WorkoutSummary {
    /// Serialize for the profile's `recentWorkout` field
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored `recentWorkout` value
    pub fn from_json(raw: &str) -> Result<Self> {
        let summary: WorkoutSummary = serde_json::from_str(raw)
            .map_err(|e| Error::Parse(format!("invalid workout summary: {}", e)))?;
        parse_duration(&summary.duration)?;
        Ok(summary)
    }
}

/// What the recent workout card should show
#[derive(Clone, Debug, PartialEq)]
pub enum RecentWorkoutView {
    Summary(WorkoutSummary),
    NoData,
}

/// Resolve the stored `recentWorkout` value for display
///
/// Empty and malformed values both fall back to [`RecentWorkoutView::NoData`].
pub fn display_recent_workout(raw: Option<&str>) -> RecentWorkoutView {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return RecentWorkoutView::NoData;
    };

    match WorkoutSummary::from_json(raw) {
        Ok(summary) => RecentWorkoutView::Summary(summary),
        Err(e) => {
            tracing::warn!("Ignoring stored recent workout: {}", e);
            RecentWorkoutView::NoData
        }
    }
}
