//! Command-line surface for mealroll.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Per-person meal list generator with one-shot skips and overrides
#[derive(Parser, Debug)]
#[command(name = "mealroll")]
#[command(version)]
pub struct Cli {
    /// JSON config file (defaults to ./mealroll.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite record store path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Use a sheet file as the record store instead of SQLite
    #[arg(long, global = true, conflicts_with = "db")]
    pub sheet: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one meal for everyone, save the store, print who gets what
    Run {
        /// Meal slot label (e.g. BF, Lunch, Dinner) or breakfast|lunch|dinner
        slot: String,
        /// Resolve as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// List every person with their slot fields
    List,
    /// Show one person by "Name (Address)"
    Show {
        key: String,
    },
    /// Find people whose "Name (Address)" contains every term
    Search {
        terms: Vec<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Edit one meal slot of one person
    Set {
        /// Person as "Name (Address)"
        key: String,
        /// Meal slot label
        slot: String,
        /// One-shot instruction: a dish, "-", "no", or "-N"
        #[arg(long)]
        today: Option<String>,
        /// Standing order
        #[arg(long)]
        default: Option<String>,
        /// Suppress the slot until this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_skip")]
        skip_until: Option<NaiveDate>,
        /// Remove any skip-until date
        #[arg(long)]
        clear_skip: bool,
    },
    /// Add a person with empty meal slots
    Add {
        name: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Replace the active store with the rows of a sheet file
    Import {
        sheet: PathBuf,
    },
    /// Write the active store to a sheet file
    Export {
        sheet: PathBuf,
    },
    /// Fill an empty store with sample people covering every command form
    Seed {
        /// Overwrite a store that already has records
        #[arg(long)]
        force: bool,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
