//! Source of raw usage records.

use crate::usage::UsageRecord;
use crate::window::LookbackWindow;

/// A usage-statistics provider.
///
/// This trait lets report generation work with different record sources
/// (e.g., the SQLite store in st-db, or test fixtures).
pub trait UsageProvider {
    /// Error raised when records cannot be fetched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every raw record for intervals overlapping `window`.
    ///
    /// Records may repeat an application ID; callers merge them.
    fn query_usage(&self, window: &LookbackWindow) -> Result<Vec<UsageRecord>, Self::Error>;
}
