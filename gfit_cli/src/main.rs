use clap::{Parser, Subcommand};
use gfit_core::rollup::{cleanup_processed_logs, log_to_csv_and_archive};
use gfit_core::workout_log::latest_workout;
use gfit_core::*;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};

#[derive(Parser)]
#[command(name = "gfit")]
#[command(about = "Workout calorie calculator and session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Profile to sync (defaults to subject.email in the config)
    #[arg(long, global = true)]
    email: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate calories for one exercise
    Calories {
        /// Exercise name, e.g. "Running"
        #[arg(long)]
        exercise: String,

        /// Duration in minutes
        #[arg(long)]
        minutes: f64,

        /// Body weight in kg (defaults to the profile, then the config)
        #[arg(long)]
        weight: Option<f64>,

        /// low, moderate or high
        #[arg(long)]
        intensity: Option<String>,
    },

    /// Generate a balanced workout plan for a calorie target
    Plan {
        /// Calorie target
        #[arg(long)]
        calories: f64,

        /// low, moderate or high
        #[arg(long)]
        intensity: Option<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a live workout session
    Workout {
        /// Exercises for a calculator workout, in order
        #[arg(long = "exercise", conflicts_with = "plan_calories")]
        exercises: Vec<String>,

        /// Walk a balanced plan for this calorie target instead
        #[arg(long)]
        plan_calories: Option<f64>,

        /// low, moderate or high
        #[arg(long)]
        intensity: Option<String>,

        /// Body weight in kg (defaults to the profile, then the config)
        #[arg(long)]
        weight: Option<f64>,

        /// End automatically after this many ticks (no keyboard input)
        #[arg(long)]
        auto_end_after: Option<u64>,

        /// Override the tick interval in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Override the rest between exercises in seconds
        #[arg(long)]
        rest_secs: Option<u64>,
    },

    /// Show the most recent workout
    Recent,

    /// Roll up the workout log to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

struct Paths {
    log: PathBuf,
    csv: PathBuf,
    profiles: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            log: data_dir.join("workouts.jsonl"),
            csv: data_dir.join("workouts.csv"),
            profiles: data_dir.join("profiles.json"),
        }
    }
}

fn main() -> Result<()> {
    gfit_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let email = cli.email.or_else(|| config.subject.email.clone());

    match cli.command {
        Commands::Calories {
            exercise,
            minutes,
            weight,
            intensity,
        } => {
            let weight_kg = resolve_weight(&config, &data_dir, email.as_deref(), weight)?;
            cmd_calories(&config, &exercise, minutes, weight_kg, intensity.as_deref())
        }
        Commands::Plan {
            calories,
            intensity,
            json,
        } => cmd_plan(&config, calories, intensity.as_deref(), json),
        Commands::Workout {
            exercises,
            plan_calories,
            intensity,
            weight,
            auto_end_after,
            tick_ms,
            rest_secs,
        } => {
            let mut session_config = config.session.clone();
            if let Some(ms) = tick_ms {
                session_config.tick_interval_ms = ms.max(1);
            }
            if let Some(secs) = rest_secs {
                session_config.rest_duration_ms = secs.saturating_mul(1000);
            }
            let request = WorkoutRequest {
                exercises,
                plan_calories,
                intensity: resolve_intensity(&config, intensity.as_deref())?,
                weight_kg: resolve_weight(&config, &data_dir, email.as_deref(), weight)?,
                auto_end_after,
            };
            cmd_workout(&data_dir, email, &session_config, request)
        }
        Commands::Recent => cmd_recent(&data_dir, email.as_deref()),
        Commands::Rollup { cleanup } => cmd_rollup(&data_dir, cleanup),
    }
}

fn resolve_intensity(config: &Config, raw: Option<&str>) -> Result<IntensityLevel> {
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(config.plan.default_intensity),
    }
}

/// Body weight from the flag, then the user's profile, then the config
fn resolve_weight(
    config: &Config,
    data_dir: &Path,
    email: Option<&str>,
    flag: Option<f64>,
) -> Result<f64> {
    if let Some(weight) = flag {
        return Ok(weight);
    }
    if let Some(email) = email {
        let profile = ProfileStore::new(Paths::new(data_dir).profiles).load(email)?;
        if let Some(weight) = profile.and_then(|p| p.weight_kg()) {
            tracing::debug!("Using profile weight {} kg for {}", weight, email);
            return Ok(weight);
        }
    }
    Ok(config.subject.weight_kg)
}

fn cmd_calories(
    config: &Config,
    exercise: &str,
    minutes: f64,
    weight_kg: f64,
    intensity: Option<&str>,
) -> Result<()> {
    let intensity = resolve_intensity(config, intensity)?;
    let definition = met_catalog().get(exercise)?;

    let calories = calories_burned(definition, weight_kg, intensity, minutes)?;

    println!(
        "{} {} for {} min at {} kg ({} intensity): {:.2} calories",
        definition.icon, definition.name, minutes, weight_kg, intensity, calories
    );
    Ok(())
}

fn cmd_plan(config: &Config, calories: f64, intensity: Option<&str>, json: bool) -> Result<()> {
    let intensity = resolve_intensity(config, intensity)?;
    let plan = generate_plan(calories, intensity)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BALANCED WORKOUT: {:.0} calories", plan.total_calorie_target);
    println!("╰─────────────────────────────────────────╯");
    println!("  Intensity: {}", plan.intensity);

    for section in &plan.sections {
        println!();
        println!("  {} ({:.0} cal)", section.name, section.calorie_allocation);
        for exercise in &section.exercises {
            println!("    → {:<20} {} {}", exercise.name, exercise.amount, exercise.unit);
        }
    }
    println!();
    Ok(())
}

struct WorkoutRequest {
    exercises: Vec<String>,
    plan_calories: Option<f64>,
    intensity: IntensityLevel,
    weight_kg: f64,
    auto_end_after: Option<u64>,
}

fn cmd_workout(
    data_dir: &Path,
    email: Option<String>,
    session_config: &gfit_core::config::SessionConfig,
    request: WorkoutRequest,
) -> Result<()> {
    let paths = Paths::new(data_dir);
    std::fs::create_dir_all(data_dir)?;

    let session = match request.plan_calories {
        Some(target) => {
            let plan = generate_plan(target, request.intensity)?;
            WorkoutSession::balanced(&plan, request.weight_kg, session_config.rest_duration())?
        }
        None => {
            if request.exercises.is_empty() {
                return Err(Error::InvalidInput(
                    "pick at least one --exercise or a --plan-calories target".into(),
                ));
            }
            let exercises = met_catalog().get_all(&request.exercises)?;
            WorkoutSession::calculator(
                &exercises,
                request.weight_kg,
                request.intensity,
                session_config.rest_duration(),
            )?
        }
    };

    tracing::info!(
        "Starting {} workout ({} exercises, {} intensity)",
        session.kind().tag(),
        session.remaining().count(),
        session.intensity()
    );

    let options = RunnerOptions {
        tick_interval: session_config.tick_interval(),
        sync_interval: session_config.sync_interval(),
        max_ticks: request.auto_end_after,
        email,
        daily_calories: request.plan_calories,
    };

    let (tx, rx) = channel();
    // Keep a sender alive in auto mode so the channel never closes early
    let _keep_open = match request.auto_end_after {
        Some(_) => Some(tx),
        None => {
            println!("Enter 'n' for the next exercise, 'e' to end the workout");
            spawn_input_reader(tx);
            None
        }
    };

    let clock = SystemClock;
    let mut log = WorkoutLog::new(&paths.log);
    let mut profiles = ProfileStore::new(&paths.profiles);
    let mut last_state = None;

    let summary = SessionRunner::new(&clock, options, &mut log)
        .with_profile(&mut profiles)
        .run(session, &rx, |session, at| {
            if last_state != Some(session.state()) {
                last_state = Some(session.state());
                display_state(session, at);
            }
        })?;

    display_summary(&summary);
    println!("\n✓ Workout logged!");
    Ok(())
}

fn spawn_input_reader(tx: Sender<SessionCommand>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim().to_lowercase().as_str() {
                "n" | "next" => SessionCommand::Next,
                "e" | "end" | "q" => SessionCommand::End,
                _ => continue,
            };
            if tx.send(command).is_err() || command == SessionCommand::End {
                break;
            }
        }
    });
}

fn display_state(session: &WorkoutSession, at: chrono::DateTime<chrono::Utc>) {
    let elapsed = session
        .started_at()
        .map(|start| format_duration(at - start))
        .unwrap_or_default();

    match session.state() {
        SessionState::Running => {
            let name = session
                .current_exercise()
                .map(|e| e.name.as_str())
                .unwrap_or("-");
            println!("[{}] ▶ {} ({:.0} cal so far)", elapsed, name, session.calories());
        }
        SessionState::Resting => {
            let rest = session
                .rest_remaining(at)
                .map(|d| d.num_seconds())
                .unwrap_or(0);
            println!("[{}] ⏸ Rest {}s ({:.0} cal so far)", elapsed, rest, session.calories());
        }
        SessionState::Finished => println!("[{}] ■ Finished", elapsed),
        SessionState::Idle => {}
    }
}

fn display_summary(summary: &WorkoutSummary) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", summary.workout_type.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!("  Date:      {}", summary.date.to_rfc3339());
    println!("  Duration:  {}", summary.duration);
    println!("  Intensity: {}", summary.intensity);
    println!("  Burned:    {} calories", summary.calories_burned);
}

fn cmd_recent(data_dir: &Path, email: Option<&str>) -> Result<()> {
    let paths = Paths::new(data_dir);

    let view = match email {
        Some(email) => {
            let profile = ProfileStore::new(&paths.profiles).load(email)?;
            display_recent_workout(profile.as_ref().map(|p| p.recent_workout.as_str()))
        }
        None => match latest_workout(&paths.log)? {
            Some(entry) => RecentWorkoutView::Summary(entry.summary),
            None => RecentWorkoutView::NoData,
        },
    };

    match view {
        RecentWorkoutView::Summary(summary) => display_summary(&summary),
        RecentWorkoutView::NoData => {
            println!("No recent workout yet. Start a workout to track your progress!")
        }
    }
    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let paths = Paths::new(data_dir);

    if !paths.log.exists() {
        tracing::debug!("No workout log at {:?}", paths.log);
        println!("No workout log found - nothing to roll up.");
        return Ok(());
    }

    let count = log_to_csv_and_archive(&paths.log, &paths.csv)?;

    println!("✓ Rolled up {} workouts to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = cleanup_processed_logs(data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed logs", cleaned);
        }
    }

    Ok(())
}
