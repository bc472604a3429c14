//! DoseWatch - medicine reminder daemon and CLI.
//!
//! The binary is a thin shell over the engine crate: subcommands cover the
//! add/view/edit/delete reminder flows and the adherence views, and `run`
//! starts the recurring notification tick.
//!
//! # Environment Variables
//!
//! See the [`dosewatch::config`] module for available configuration options.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dosewatch::config::Config;
use dosewatch::engine::AdherenceEngine;
use dosewatch::occurrence::date_key;
use dosewatch::scheduler::{LogSink, NotificationScheduler};
use dosewatch::types::{DoseStatus, Reminder};

/// DoseWatch - medicine reminder and adherence tracker.
///
/// Schedules single-occurrence medicine reminders, tracks taken/missed
/// adherence, and raises notifications when a dose is due.
#[derive(Parser, Debug)]
#[command(name = "dosewatch")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    DOSEWATCH_DATA_DIR    State directory (default: ~/.dosewatch)
    DOSEWATCH_TICK_SECS   Scheduler tick period (default: 60)

EXAMPLES:
    # Add a reminder for today
    dosewatch add Aspirin '8:00 AM'

    # Add a reminder for a specific date
    dosewatch add Aspirin '8:00 AM' --date 2024-01-01

    # Mark this morning's dose as taken
    dosewatch mark Aspirin taken

    # Show the dashboard and start the notification daemon
    dosewatch dashboard
    dosewatch run
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Add a reminder.
    Add {
        /// Medicine name.
        medicine: String,

        /// 12-hour clock time, e.g. '8:00 AM'.
        time: String,

        /// Calendar date (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List reminders in schedule order.
    List,

    /// Rename the medicine on an existing reminder.
    ///
    /// The time and date of a reminder are fixed once created.
    Edit {
        /// Position in the `list` output (1-based).
        position: usize,

        /// New medicine name.
        #[arg(short, long)]
        medicine: String,
    },

    /// Delete a reminder.
    Remove {
        /// Position in the `list` output (1-based).
        position: usize,
    },

    /// Mark a dose as taken or missed.
    ///
    /// A dose already marked keeps its first status; marking again is a
    /// no-op.
    Mark {
        /// Medicine name.
        medicine: String,

        /// 'taken' or 'missed'.
        status: String,

        /// Occurrence date (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show the dashboard summary.
    Dashboard,

    /// Show today's adherence tracker.
    Tracker,

    /// Show or change notification settings.
    Settings {
        /// Enable or disable notification sound.
        #[arg(long)]
        sound: Option<bool>,

        /// Enable or disable vibration.
        #[arg(long)]
        vibration: Option<bool>,

        /// Enable or disable notification delivery entirely.
        #[arg(long)]
        notifications: Option<bool>,

        /// Enable or disable dark mode.
        #[arg(long)]
        dark_mode: Option<bool>,
    },

    /// Run the notification daemon.
    Run,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    std::fs::create_dir_all(config.data_dir())
        .with_context(|| format!("Failed to create {}", config.data_dir().display()))?;

    match cli.command {
        Command::Add {
            medicine,
            time,
            date,
        } => run_add(&config, medicine, time, date),
        Command::List => run_list(&config),
        Command::Edit { position, medicine } => run_edit(&config, position, &medicine),
        Command::Remove { position } => run_remove(&config, position),
        Command::Mark {
            medicine,
            status,
            date,
        } => run_mark(&config, &medicine, &status, date),
        Command::Dashboard => run_dashboard(&config),
        Command::Tracker => run_tracker(&config),
        Command::Settings {
            sound,
            vibration,
            notifications,
            dark_mode,
        } => run_settings(&config, sound, vibration, notifications, dark_mode),
        Command::Run => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;
            runtime.block_on(run_daemon(&config))
        }
    }
}

/// Adds a reminder after creation-time validation.
fn run_add(config: &Config, medicine: String, time: String, date: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(today);
    let reminder = Reminder::new(medicine, time, date);
    reminder.validate()?;

    config.reminder_store().append(reminder.clone())?;
    println!(
        "Added: {} - {} at {}",
        reminder.medicine, reminder.date, reminder.time
    );
    Ok(())
}

/// Prints all reminders in schedule order, unparseable schedules first.
fn run_list(config: &Config) -> Result<()> {
    let engine = engine_for(config);
    let reminders = engine.raw_list();

    if reminders.is_empty() {
        println!("No reminders yet.");
        return Ok(());
    }

    for (position, reminder) in reminders.iter().enumerate() {
        println!(
            "{:>3}. {} - {} at {}",
            position + 1,
            reminder.medicine,
            reminder.date,
            reminder.time
        );
    }
    Ok(())
}

/// Renames the medicine on the reminder at a display position.
fn run_edit(config: &Config, position: usize, medicine: &str) -> Result<()> {
    let engine = engine_for(config);
    let reminder = resolve_position(&engine, position)?;

    let updated = Reminder {
        medicine: medicine.to_string(),
        ..reminder.clone()
    };
    updated.validate()?;

    // Mutate by stable id: display positions shift as the list changes.
    config.reminder_store().update(reminder.id, updated)?;
    println!("Updated: {} -> {}", reminder.medicine, medicine);
    Ok(())
}

/// Deletes the reminder at a display position.
fn run_remove(config: &Config, position: usize) -> Result<()> {
    let engine = engine_for(config);
    let reminder = resolve_position(&engine, position)?;

    let removed = config.reminder_store().remove(reminder.id)?;
    println!("Deleted: {} reminder", removed.medicine);
    Ok(())
}

/// Marks an occurrence taken or missed.
fn run_mark(config: &Config, medicine: &str, status: &str, date: Option<String>) -> Result<()> {
    let status: DoseStatus = status.parse()?;
    let date = date.unwrap_or_else(today);

    let mut engine = engine_for(config);
    if engine.mark(medicine, &date, status)? {
        println!("Marked {medicine} as {status} for {date}");
    } else {
        println!("{medicine} is already marked for {date}; keeping the first status");
    }
    Ok(())
}

/// Prints the dashboard summary.
fn run_dashboard(config: &Config) -> Result<()> {
    let mut engine = engine_for(config);
    let view = engine.dashboard_view(Local::now().naive_local());

    println!("Active reminders: {}", view.active_count);
    println!("Today's medicines: {}", view.today_meds.len());
    for med in &view.today_meds {
        println!("  {med}");
    }
    match view.next_reminder {
        Some(next) => println!("Next reminder: {} - {}", next.medicine, next.time),
        None => println!("Next reminder: none"),
    }
    Ok(())
}

/// Prints today's adherence tracker.
fn run_tracker(config: &Config) -> Result<()> {
    let mut engine = engine_for(config);
    let view = engine.tracker_view(Local::now().naive_local());

    println!("{}", today());
    println!("Taken: {}  Missed: {}", view.taken_count, view.missed_count);
    for item in &view.items {
        let status = match item.status {
            dosewatch::ResolvedStatus::Pending if item.actionable => "pending",
            dosewatch::ResolvedStatus::Pending => "pending (locked)",
            dosewatch::ResolvedStatus::Taken => "taken",
            dosewatch::ResolvedStatus::Missed => "missed",
        };
        println!("  {} ({}) - {}", item.medicine, item.date, status);
    }
    Ok(())
}

/// Shows the settings record, applying any requested changes first.
fn run_settings(
    config: &Config,
    sound: Option<bool>,
    vibration: Option<bool>,
    notifications: Option<bool>,
    dark_mode: Option<bool>,
) -> Result<()> {
    let store = config.settings_store();
    let mut settings = store.load();

    let changed = sound.is_some() || vibration.is_some() || notifications.is_some() || dark_mode.is_some();
    if let Some(sound) = sound {
        settings.sound = sound;
    }
    if let Some(vibration) = vibration {
        settings.vibration = vibration;
    }
    if let Some(notifications) = notifications {
        settings.notifications = notifications;
    }
    if let Some(dark_mode) = dark_mode {
        settings.dark_mode = dark_mode;
    }
    if changed {
        store.save(&settings)?;
    }

    println!("Sound:         {}", on_off(settings.sound));
    println!("Vibration:     {}", on_off(settings.vibration));
    println!("Notifications: {}", on_off(settings.notifications));
    println!("Dark mode:     {}", on_off(settings.dark_mode));
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Runs the notification daemon until interrupted.
async fn run_daemon(config: &Config) -> Result<()> {
    info!(
        data_dir = %config.data_dir().display(),
        tick_secs = config.tick_secs,
        "Starting DoseWatch daemon"
    );

    let reminder_store = config.reminder_store();
    let settings = config.settings_store().load();
    let mut engine = AdherenceEngine::new(reminder_store.clone(), config.tracker_store());
    let mut scheduler = NotificationScheduler::new(settings);
    let sink = LogSink;

    let mut interval = tokio::time::interval(Duration::from_secs(config.tick_secs));

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }

            _ = interval.tick() => {
                let now = Local::now().naive_local();

                // The tick path and the evaluation path share one task, so
                // their tracker read-modify-writes never interleave.
                let reminders = reminder_store.load();
                let events = scheduler.tick(now, &reminders, &sink);
                for event in &events {
                    debug!(medicine = %event.medicine, sound = event.sound, "Raised notification");
                }

                let view = engine.dashboard_view(now);
                debug!(
                    active = view.active_count,
                    today = view.today_meds.len(),
                    pending = scheduler.pending_count(),
                    "Tick complete"
                );
            }
        }
    }

    // Surface anything the user never acknowledged before exiting.
    let unacknowledged = scheduler.pending_medicines();
    if !unacknowledged.is_empty() {
        for medicine in &unacknowledged {
            println!("Please take your {medicine} medicine");
        }
        scheduler.acknowledge();
    }

    info!("Daemon stopped");
    Ok(())
}

/// Resolves a 1-based display position into its reminder.
fn resolve_position(engine: &AdherenceEngine, position: usize) -> Result<Reminder> {
    let reminders = engine.raw_list();
    if position == 0 || position > reminders.len() {
        bail!(
            "position {position} is out of range (have {} reminders); run 'dosewatch list'",
            reminders.len()
        );
    }
    Ok(reminders[position - 1].clone())
}

/// Builds an engine over the configured stores.
fn engine_for(config: &Config) -> AdherenceEngine {
    AdherenceEngine::new(config.reminder_store(), config.tracker_store())
}

/// Today's date in storage format.
fn today() -> String {
    date_key(Local::now().date_naive())
}

/// Initializes the logging subsystem.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}
