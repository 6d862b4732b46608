//! CSV rollup of the workout log.
//!
//! The log is copied into a long-lived CSV file, synced, and only then
//! renamed out of the way so a crash never loses a workout.

use crate::workout_log::{read_workouts, LoggedWorkout};
use crate::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: String,
    recorded_at: String,
    date: String,
    duration: &'a str,
    #[serde(rename = "type")]
    workout_type: &'a str,
    intensity: &'static str,
    calories_burned: u32,
}

impl<'a> From<&'a LoggedWorkout> for CsvRow<'a> {
    fn from(entry: &'a LoggedWorkout) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            recorded_at: entry.recorded_at.to_rfc3339(),
            date: entry.summary.date.to_rfc3339(),
            duration: &entry.summary.duration,
            workout_type: &entry.summary.workout_type,
            intensity: entry.summary.intensity.as_str(),
            calories_burned: entry.summary.calories_burned,
        }
    }
}

/// Roll the workout log into CSV and archive the log
///
/// Returns the number of workouts written. The log is renamed to
/// `<name>.<timestamp>.processed` after the CSV has been synced.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let workouts = read_workouts(log_path)?;

    if workouts.is_empty() {
        tracing::info!("No workouts in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only go into a fresh file
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &workouts {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} workouts to CSV", workouts.len());

    let processed_path = archived_path(log_path);
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived workout log to {:?}", processed_path);

    Ok(workouts.len())
}

fn archived_path(log_path: &Path) -> PathBuf {
    let name = log_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workouts".into());
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.f");
    log_path.with_file_name(format!("{}.{}.processed", name, stamp))
}

/// Remove archived logs from `dir`
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed logs", count);
    }

    Ok(count)
}
