//! Operator CLI for the bench database.
//!
//! # Responsibility
//! - Prepare the database file and seed sample benches.
//! - Inspect and mark benches without running the web server.

use benchwatch_core::{availability_label, BenchService, ANONYMOUS, DEFAULT_DB_FILE_NAME};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sample benches inserted by `seed`.
const SAMPLE_BENCHES: &[(f64, f64, &str)] = &[
    (37.7749, -122.4194, "Bench in Golden Gate Park"),
    (37.7849, -122.4094, "Bench near the playground"),
];
const SAMPLE_REPORTER: &str = "TestUser";

#[derive(Parser, Debug)]
#[command(name = "benchwatch", version, about = "Manage the bench database")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "BENCHWATCH_DB", default_value = DEFAULT_DB_FILE_NAME, global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the tables if they are missing
    Init,
    /// Insert the sample benches
    Seed,
    /// Print every bench
    List,
    /// Add one bench
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = ANONYMOUS)]
        added_by: String,
    },
    /// Mark a bench available or occupied
    Mark {
        id: i64,
        #[arg(value_enum)]
        state: Availability,
        #[arg(long, default_value = ANONYMOUS)]
        by: String,
    },
    /// Print the availability history of a bench
    History { id: i64 },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Availability {
    Available,
    Occupied,
}

impl Availability {
    fn is_available(self) -> bool {
        self == Self::Available
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("benchwatch: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let service = BenchService::new(cli.db.clone());
    service.initialize_schema().map_err(|err| err.to_string())?;

    match cli.command {
        Command::Init => {
            println!("database ready at {}", cli.db.display());
        }
        Command::Seed => {
            for &(lat, lon, description) in SAMPLE_BENCHES {
                let id = service
                    .create_bench(lat, lon, description, SAMPLE_REPORTER)
                    .map_err(|err| err.to_string())?;
                println!("added bench {id}: {description}");
            }
        }
        Command::List => {
            let benches = service.list_benches().map_err(|err| err.to_string())?;
            if benches.is_empty() {
                println!("no benches yet");
            }
            for bench in benches {
                println!(
                    "#{} {} ({}, {}) {} since {}, added by {}",
                    bench.id,
                    bench.description,
                    bench.latitude,
                    bench.longitude,
                    bench.status_label(),
                    bench.last_updated,
                    bench.added_by
                );
            }
        }
        Command::Add {
            lat,
            lon,
            description,
            added_by,
        } => {
            let id = service
                .create_bench(lat, lon, &description, &added_by)
                .map_err(|err| err.to_string())?;
            println!("added bench {id}");
        }
        Command::Mark { id, state, by } => {
            let is_available = state.is_available();
            service
                .update_availability(id, is_available, &by)
                .map_err(|err| err.to_string())?;
            println!("bench {id} marked {}", availability_label(is_available));
        }
        Command::History { id } => {
            let history = service.bench_history(id).map_err(|err| err.to_string())?;
            for update in history {
                println!(
                    "{} {} by {}",
                    update.updated_at,
                    availability_label(update.is_available),
                    update.updated_by
                );
            }
        }
    }

    Ok(())
}
