//! Geofence Monitor CLI - Command-line interface
//!
//! Manage circular geofences, inspect the event history and run tracking
//! sessions against a replayed track or a fixed position.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use geofence_monitor::config::default_config_path;

use commands::config::ConfigCommands;
use commands::track::{PositionSource, TrackArgs};
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "geofence-monitor")]
#[command(about = "Entry and exit notifications for circular geofences", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.geofence-monitor/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a geofence
    Add {
        /// Display name
        name: String,

        /// Center latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Center longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Radius in meters
        #[arg(long)]
        radius: f64,
    },

    /// List geofences
    List,

    /// Remove a geofence
    Remove {
        /// Geofence id
        id: String,
    },

    /// Resume monitoring a geofence
    Enable {
        /// Geofence id
        id: String,
    },

    /// Pause monitoring a geofence
    Disable {
        /// Geofence id
        id: String,
    },

    /// Rename a geofence or change its radius
    Update {
        /// Geofence id
        id: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New radius in meters
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Show recorded entry and exit events, newest first
    Events {
        /// Show at most this many events
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete all recorded events
    ClearEvents,

    /// Show data locations and counts
    Status,

    /// Run a tracking session in the foreground
    ///
    /// Geofences are read once at startup. Changes made from another
    /// terminal apply after the session is restarted.
    Track {
        /// Replay positions from a JSON track file
        #[arg(long, value_name = "FILE", conflicts_with_all = ["lat", "lon"])]
        replay: Option<PathBuf>,

        /// Fixed latitude in degrees
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Fixed longitude in degrees
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Accuracy reported with a fixed position, in meters
        #[arg(long, default_value_t = 10.0)]
        accuracy: f64,

        /// Seconds between samples (overrides tracking.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands must work even when the current file fails to load.
    if let Commands::Config { command } = cli.command {
        let path = cli.config.unwrap_or_else(default_config_path);
        return commands::config::run(command, &path);
    }

    let runner = CliRunner::new(cli.config, cli.verbose)?;
    run_with(&runner, cli.command)
}

fn run_with(runner: &CliRunner, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Add {
            name,
            lat,
            lon,
            radius,
        } => {
            runner.log_startup("add");
            commands::geofences::add(&*runner.open_store()?, name, lat, lon, radius)
        }
        Commands::List => commands::geofences::list(&*runner.open_store()?),
        Commands::Remove { id } => {
            runner.log_startup("remove");
            commands::geofences::remove(&*runner.open_store()?, &id)
        }
        Commands::Enable { id } => {
            commands::geofences::set_active(&*runner.open_store()?, &id, true)
        }
        Commands::Disable { id } => {
            commands::geofences::set_active(&*runner.open_store()?, &id, false)
        }
        Commands::Update { id, name, radius } => {
            commands::geofences::update(&*runner.open_store()?, &id, name, radius)
        }
        Commands::Events { limit } => commands::events::list(&*runner.open_log()?, limit),
        Commands::ClearEvents => commands::events::clear(&*runner.open_log()?),
        Commands::Status => {
            commands::status::run(runner, &*runner.open_store()?, &*runner.open_log()?)
        }
        Commands::Track {
            replay,
            lat,
            lon,
            accuracy,
            interval,
        } => {
            runner.log_startup("track");
            let source = match (replay, lat, lon) {
                (Some(path), _, _) => PositionSource::Replay(path),
                (None, Some(latitude), Some(longitude)) => PositionSource::Fixed {
                    latitude,
                    longitude,
                    accuracy,
                },
                _ => {
                    return Err(CliError::InvalidInput(
                        "track needs --replay <FILE> or both --lat and --lon".to_string(),
                    ))
                }
            };
            commands::track::run(
                runner,
                TrackArgs {
                    source,
                    interval_secs: interval,
                },
            )
        }
        Commands::Config { command } => {
            commands::config::run(command, runner.config_path())
        }
    }
}
