#![forbid(unsafe_code)]

//! Core workout model for the GFit fitness tracker.
//!
//! This crate provides:
//! - Domain types (exercises, intensity, plans, sessions, summaries)
//! - Exercise catalogs and the energy expenditure calculator
//! - Balanced workout plan generation
//! - The workout session state machine and its single-threaded runner
//! - Persistence adapters (profile store, workout log, CSV rollup)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod energy;
pub mod plan;
pub mod session;
pub mod summary;
pub mod sync;
pub mod profile;
pub mod workout_log;
pub mod rollup;
pub mod runner;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{met_catalog, per_minute_catalog};
pub use config::Config;
pub use energy::calories_burned;
pub use plan::generate_plan;
pub use session::{SessionEvent, WorkoutSession};
pub use summary::{display_recent_workout, format_duration, RecentWorkoutView};
pub use sync::{ProfileSync, ProfileUpdate, WorkoutRecorder};
pub use profile::{Profile, ProfileStore};
pub use workout_log::WorkoutLog;
pub use runner::{Clock, RunnerOptions, SessionCommand, SessionRunner, SystemClock};
