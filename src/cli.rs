use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "airline-db")]
#[command(version, about = "Manage the airline database (flights, aircraft, pilots)")]
pub struct Cli {
    /// SQLite database path (default: platform data directory)
    #[arg(long, global = true, env = "AIRLINE_DB")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert one or more rows; all are validated before any is written
    Insert {
        /// Table name (flight, aircraft, pilot)
        table: String,

        /// Comma-separated rows in column order; empty fields are NULL.
        /// Several rows may also be joined with ';'
        #[arg(required = true)]
        rows: Vec<String>,
    },

    /// Change attributes of one row
    Update {
        /// Table name
        table: String,

        /// Primary key of the row to change
        pk: String,

        /// name=value pairs; `name=` sets the attribute to NULL
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Delete one row by primary key
    Delete {
        /// Table name
        table: String,

        /// Primary key of the row to delete
        pk: String,
    },

    /// Show rows of a table or of flight_overview (alias: all)
    Query {
        /// Table or view name
        source: String,

        /// name=value equality filters, combined with AND
        filters: Vec<String>,
    },

    /// Show a statistics report (1-5)
    Stat {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        number: u8,
    },

    /// List tables and their columns
    Tables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
