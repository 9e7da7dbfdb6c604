mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use contactbook_core::clock::SystemClock;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contactbook")]
#[command(about = "Manage contactbook accounts and see upcoming birthdays and anniversaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account (prompts for a password)
    Register { email: String },
    /// List events in the upcoming window
    Upcoming {
        /// Account e-mail
        #[arg(short, long)]
        user: String,

        /// Lookahead in days (defaults to reminders.window_days)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Show a year calendar with contact events
    Calendar {
        /// Account e-mail
        #[arg(short, long)]
        user: String,

        /// Year to show (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Export all contacts as JSON
    Export {
        /// Account e-mail
        #[arg(short, long)]
        user: String,

        /// Output file (stdout if omitted)
        file: Option<PathBuf>,
    },
    /// Import contacts from a JSON export
    Import {
        /// Account e-mail
        #[arg(short, long)]
        user: String,

        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Register { email } => commands::register::run(&email),
        Commands::Upcoming { user, days } => commands::upcoming::run(&SystemClock, &user, days),
        Commands::Calendar { user, year } => commands::calendar::run(&SystemClock, &user, year),
        Commands::Export { user, file } => commands::transfer::export(&user, file.as_deref()),
        Commands::Import { user, file } => commands::transfer::import(&user, &file),
    }
}
