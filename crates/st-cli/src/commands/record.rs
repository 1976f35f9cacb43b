//! Record command for storing a foreground interval.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use st_db::{Database, IntervalRecord};

use super::util::{format_minutes, parse_datetime};

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Application identifier (e.g., com.example.app).
    #[arg(long)]
    pub package: String,

    /// Interval start (ISO 8601 or relative, e.g. '2 hours ago').
    #[arg(long)]
    pub start: String,

    /// Interval end (ISO 8601 or relative). Defaults to now.
    #[arg(long, default_value = "now")]
    pub end: String,

    /// Foreground time within the interval. Defaults to the whole interval.
    #[arg(long)]
    pub foreground_ms: Option<i64>,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &RecordArgs) -> Result<()> {
    let start = parse_datetime(&args.start)?;
    let end = parse_datetime(&args.end)?;
    if end < start {
        bail!("interval end {end} is before start {start}");
    }

    let foreground_ms = args
        .foreground_ms
        .unwrap_or_else(|| (end - start).num_milliseconds());
    let package = Some(args.package.trim())
        .filter(|p| !p.is_empty())
        .map(String::from);

    db.insert_intervals(&[IntervalRecord {
        package: package.clone(),
        interval_start: start,
        interval_end: end,
        foreground_ms,
    }])?;

    writeln!(
        writer,
        "Recorded {} for {}",
        format_minutes(foreground_ms / st_core::MILLIS_PER_MINUTE),
        package.as_deref().unwrap_or("(unknown app)")
    )?;
    Ok(())
}
