//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::record::RecordArgs;

/// Screen-time usage reports.
///
/// Aggregates per-application foreground time over the last 24 hours and
/// serves it to a UI process over a JSON method channel.
#[derive(Debug, Parser)]
#[command(name = "st", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show foreground usage per app for the last 24 hours.
    Today {
        /// Output as JSON in the channel wire shape.
        #[arg(long)]
        json: bool,

        /// End of the window (ISO 8601 or relative, e.g. '2 hours ago').
        #[arg(long)]
        now: Option<String>,
    },

    /// Record a foreground interval for an app.
    Record(RecordArgs),

    /// Dispatch a single method call and print the reply.
    Call {
        /// Method name (e.g., getTodayUsage).
        method: String,

        /// Call arguments as JSON.
        #[arg(long)]
        arguments: Option<String>,
    },

    /// Serve method calls as JSON lines on stdin/stdout.
    Serve,

    /// Open the usage access settings screen.
    OpenSettings,
}
