//! Lookback windows for usage queries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Length of the window a usage report covers.
pub const LOOKBACK: Duration = Duration::hours(24);

/// A closed time range `[start, end]` over which usage is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl LookbackWindow {
    /// Creates a window, rejecting one whose start is after its end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The [`LOOKBACK`] window ending at `now`.
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            start: now - LOOKBACK,
            end: now,
        }
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether the half-open interval `[from, to)` touches this window.
    ///
    /// Providers report whole buckets, so any bucket that overlaps the window
    /// counts in full.
    #[must_use]
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        from <= self.end && to > self.start
    }
}
