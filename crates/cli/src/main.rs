//! Royal Barber CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! rb-cli migrate
//!
//! # Load the demo catalog and bookings
//! rb-cli seed
//!
//! # Free slots for a barber and service on a date
//! rb-cli availability --barber 1 --service 3 --date 2025-03-12
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load demo data into an empty database
//! - `availability` - Print free slots

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use royal_barber_core::{BarberId, ServiceId};

mod commands;

#[derive(Parser)]
#[command(name = "rb-cli")]
#[command(author, version, about = "Royal Barber CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load demo barbers, services and bookings
    Seed {
        /// Day to place the demo bookings from (first open Wednesday on or after it), defaults to today
        #[arg(short, long)]
        day: Option<String>,
    },
    /// Print the free slots of a barber for a service on a date
    Availability {
        /// Barber id
        #[arg(short, long)]
        barber: BarberId,

        /// Service id
        #[arg(short, long)]
        service: ServiceId,

        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { day } => commands::seed::run(day.as_deref()).await?,
        Commands::Availability {
            barber,
            service,
            date,
        } => commands::availability::run(barber, service, &date).await?,
    }
    Ok(())
}
