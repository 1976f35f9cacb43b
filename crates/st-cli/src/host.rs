//! Native host backed by the local usage database.

use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use st_core::{LookbackWindow, Report, UsageProvider, aggregate};
use st_db::Database;

use crate::Config;
use crate::channel::Host;

/// Serves channel methods from a [`Database`].
pub struct NativeHost {
    db: Database,
    settings_command: Option<Vec<String>>,
    now: Option<DateTime<Utc>>,
}

impl NativeHost {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            settings_command: config.settings_command.clone(),
            now: None,
        }
    }

    /// Pins the end of the lookback window instead of using the wall clock.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

impl Host for NativeHost {
    fn today_usage(&self) -> Result<Report> {
        let window = LookbackWindow::ending_at(self.now());
        let records = self
            .db
            .query_usage(&window)
            .context("failed to query usage statistics")?;
        Ok(aggregate(records))
    }

    fn open_usage_access_settings(&self) -> Result<()> {
        let Some((program, args)) = self
            .settings_command
            .as_deref()
            .and_then(<[String]>::split_first)
        else {
            bail!("no usage access settings command configured");
        };

        tracing::debug!(%program, ?args, "opening usage access settings");
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("failed to run {program}"))?;
        if !status.success() {
            bail!("{program} exited with {status}");
        }
        Ok(())
    }
}
