//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

/// easyjob timecard client.
///
/// Talks to an easyjob server's timecard and resource-plan endpoints:
/// clock in and out, inspect the current time card, list calendar items,
/// and set resource states.
#[derive(Debug, Parser)]
#[command(name = "ejt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the current time-card status.
    Status {
        /// Date to query instead of today (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start a work session.
    Start,

    /// Close the running work session.
    Stop,

    /// List resource-plan calendar items.
    Calendar {
        /// Days to look ahead.
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// Include items hidden by the configured denylist.
        #[arg(long)]
        all: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the selectable resource states.
    ResourceStates,

    /// Save a resource state over a time range.
    SetResourceState {
        /// Caption of the resource state, as listed by `resource-states`.
        state: String,

        /// Start timestamp (YYYY-MM-DDTHH:MM:SS).
        start: NaiveDateTime,

        /// End timestamp (YYYY-MM-DDTHH:MM:SS).
        end: NaiveDateTime,
    },

    /// Validate credentials and timecard eligibility.
    Check,

    /// Poll the server continuously, logging each cycle.
    Watch,
}
