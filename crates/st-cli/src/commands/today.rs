//! Today command for showing per-app usage over the last 24 hours.
//!
//! This module implements `st today` with human-readable and JSON output.
//! The JSON form is the same shape `getTodayUsage` returns over the channel.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use st_core::Report;

use super::util::format_minutes;
use crate::channel::Host;

/// Formats a report for terminal output, most used apps first.
pub fn format_report(report: &Report) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Screen time, last 24 hours: {}",
        format_minutes(report.total_minutes)
    );

    if report.apps.is_empty() {
        let _ = writeln!(output, "No app usage recorded.");
        return output;
    }

    for app in report.ranked() {
        let _ = writeln!(
            output,
            "- {}: {}",
            app.application_id,
            format_minutes(app.minutes)
        );
    }
    output
}

pub fn run<W: Write, H: Host + ?Sized>(writer: &mut W, host: &H, json: bool) -> Result<()> {
    let report = host.today_usage()?;
    tracing::debug!(
        apps = report.apps.len(),
        total_minutes = report.total_minutes,
        "aggregated usage"
    );

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(writer, "{}", format_report(&report))?;
    }
    Ok(())
}
