//! Core domain logic for screen-time usage reports.
//!
//! This crate contains the fundamental types and logic for:
//! - Aggregation: merging raw per-interval usage records into a per-app report
//! - Lookback windows: the time range a report covers
//! - The [`UsageProvider`] seam through which raw records are fetched

mod provider;
pub mod types;
mod usage;
pub mod window;

pub use provider::UsageProvider;
pub use types::{AppId, ValidationError};
pub use usage::{AppUsage, MILLIS_PER_MINUTE, Report, UsageRecord, aggregate};
pub use window::{LOOKBACK, LookbackWindow};
