//! Append-only log of finished workouts.
//!
//! Summaries are appended to a JSONL (JSON Lines) file under an exclusive
//! file lock.

use crate::sync::WorkoutRecorder;
use crate::{Result, WorkoutSummary};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One line of the workout log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedWorkout {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: WorkoutSummary,
}

/// JSONL-based workout recorder with file locking
pub struct WorkoutLog {
    path: PathBuf,
}

impl WorkoutLog {
    /// Create a new log writer for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append an already-identified entry
    pub fn append(&mut self, entry: &LoggedWorkout) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended workout {} to log", entry.id);
        Ok(())
    }
}

impl WorkoutRecorder for WorkoutLog {
    fn record_workout(&mut self, summary: &WorkoutSummary) -> Result<()> {
        self.append(&LoggedWorkout {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            summary: summary.clone(),
        })
    }
}

/// Read all workouts from a log file
///
/// Malformed lines are skipped with a warning.
pub fn read_workouts(path: &Path) -> Result<Vec<LoggedWorkout>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut workouts = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LoggedWorkout>(&line) {
            Ok(workout) => workouts.push(workout),
            Err(e) => {
                tracing::warn!("Failed to parse workout at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workouts from log", workouts.len());
    Ok(workouts)
}

/// Most recently finished workout in the log
pub fn latest_workout(path: &Path) -> Result<Option<LoggedWorkout>> {
    Ok(read_workouts(path)?
        .into_iter()
        .max_by_key(|w| w.summary.date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntensityLevel;
    use chrono::Duration;

    fn summary(minutes_ago: i64, calories: u32) -> WorkoutSummary {
        WorkoutSummary {
            date: Utc::now() - Duration::minutes(minutes_ago),
            duration: "00:20:00".into(),
            workout_type: "Exercise Calculator".into(),
            intensity: IntensityLevel::Moderate,
            calories_burned: calories,
        }
    }

    #[test]
    fn test_record_and_read_single_workout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("workouts.jsonl");

        let mut log = WorkoutLog::new(&log_path);
        log.record_workout(&summary(0, 180)).unwrap();

        let workouts = read_workouts(&log_path).unwrap();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].summary.calories_burned, 180);

        let raw = std::fs::read_to_string(&log_path).unwrap();
        assert!(raw.contains("\"caloriesBurned\":180"));
        assert!(raw.contains("\"type\":\"Exercise Calculator\""));
    }

    #[test]
    fn test_append_multiple_workouts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nested/workouts.jsonl");

        let mut log = WorkoutLog::new(&log_path);
        for i in 0..5 {
            log.record_workout(&summary(i, 100 + i as u32)).unwrap();
        }

        let workouts = read_workouts(&log_path).unwrap();
        assert_eq!(workouts.len(), 5);
        let latest = latest_workout(&log_path).unwrap().unwrap();
        assert_eq!(latest.summary.calories_burned, 100);
    }

    #[test]
    fn test_corrupted_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("workouts.jsonl");

        let mut log = WorkoutLog::new(&log_path);
        log.record_workout(&summary(3, 90)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
            writeln!(file, "{{ not a workout").unwrap();
            writeln!(file).unwrap();
        }
        log.record_workout(&summary(1, 95)).unwrap();

        let workouts = read_workouts(&log_path).unwrap();
        assert_eq!(workouts.len(), 2);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nonexistent.jsonl");

        assert!(read_workouts(&log_path).unwrap().is_empty());
        assert!(latest_workout(&log_path).unwrap().is_none());
    }
}
