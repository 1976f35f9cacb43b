//! Usage aggregation.
//!
//! Turns the raw per-interval records a usage-statistics provider yields into a
//! per-application report in whole minutes.
//!
//! # Algorithm Summary
//!
//! 1. Drop records without an application ID
//! 2. Sum foreground milliseconds per application ID
//! 3. Convert each sum to minutes, truncating any partial minute
//! 4. Total the per-application minutes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::AppId;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// One raw interval entry from a usage-statistics provider.
///
/// A provider may emit several records for the same application (one per
/// sub-interval), so records are never assumed to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Package or bundle identifier. May be absent or empty.
    #[serde(default)]
    pub application_id: Option<String>,
    /// Time the application spent in the foreground during the interval.
    pub foreground_duration_millis: i64,
}

impl UsageRecord {
    pub fn new(application_id: impl Into<String>, foreground_duration_millis: i64) -> Self {
        Self {
            application_id: Some(application_id.into()),
            foreground_duration_millis,
        }
    }
}

/// Foreground time for a single application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsage {
    #[serde(rename = "package")]
    pub application_id: AppId,
    pub minutes: i64,
}

/// Per-application usage totals for one query.
///
/// `apps` is ordered by application ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Sum of every entry's `minutes`.
    pub total_minutes: i64,
    pub apps: Vec<AppUsage>,
}

impl Report {
    /// Returns the entries ordered by minutes (most used first), ties broken by ID.
    #[must_use]
    pub fn ranked(&self) -> Vec<&AppUsage> {
        let mut apps: Vec<&AppUsage> = self.apps.iter().collect();
        apps.sort_by(|a, b| {
            b.minutes
                .cmp(&a.minutes)
                .then_with(|| a.application_id.cmp(&b.application_id))
        });
        apps
    }
}

/// Aggregates raw usage records into a [`Report`].
///
/// Records without an application ID are skipped. Durations for the same ID
/// are summed before conversion, so sub-minute intervals still count once they
/// add up. Input order does not affect the result.
pub fn aggregate<I>(records: I) -> Report
where
    I: IntoIterator<Item = UsageRecord>,
{
    let mut totals: BTreeMap<AppId, i64> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(id) = record.application_id.and_then(|id| AppId::new(id).ok()) else {
            dropped += 1;
            continue;
        };
        let total = totals.entry(id).or_insert(0);
        *total = total.saturating_add(record.foreground_duration_millis);
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped usage records without an application ID");
    }

    let apps: Vec<AppUsage> = totals
        .into_iter()
        .map(|(application_id, millis)| AppUsage {
            application_id,
            minutes: millis / MILLIS_PER_MINUTE,
        })
        .collect();
    let total_minutes = apps
        .iter()
        .fold(0i64, |sum, app| sum.saturating_add(app.minutes));

    Report {
        total_minutes,
        apps,
    }
}
