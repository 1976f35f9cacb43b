//! Storage layer for usage statistics.
//!
//! Persists raw foreground intervals using `rusqlite` and serves them back as
//! [`UsageRecord`]s through the [`UsageProvider`] trait.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Interval bounds are stored as TEXT in ISO 8601 format with millisecond
//! precision (e.g., `2024-01-15T10:30:00.000Z`). Every row uses the same
//! format, so lexicographic ordering matches chronological ordering and range
//! queries can compare the text directly.
//!
//! ## Package Column
//!
//! `package` is nullable. Providers sometimes report intervals without an
//! application identifier; those rows are kept and returned with an absent ID,
//! and dropping them is left to aggregation.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use st_core::{LookbackWindow, UsageProvider, UsageRecord};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An interval that ends before it starts.
    #[error("interval ends before it starts: {start} > {end}")]
    InvertedInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Failed to parse a stored interval timestamp.
    #[error("invalid timestamp for interval {interval_id}: {timestamp}")]
    TimestampParse {
        interval_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A foreground interval ready to be stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    pub package: Option<String>,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub foreground_ms: i64,
}

/// An interval read back from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredInterval {
    pub id: i64,
    pub record: IntervalRecord,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Raw foreground intervals as a usage-statistics provider reports them
            -- package: application identifier, NULL when the provider omitted it
            -- foreground_ms: time in the foreground during the interval
            CREATE TABLE IF NOT EXISTS usage_intervals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                package TEXT,
                interval_start TEXT NOT NULL,
                interval_end TEXT NOT NULL,
                foreground_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_usage_intervals_start ON usage_intervals(interval_start);
            CREATE INDEX IF NOT EXISTS idx_usage_intervals_end ON usage_intervals(interval_end);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of intervals in one transaction.
    ///
    /// The whole batch is rejected if any interval ends before it starts.
    pub fn insert_intervals(&mut self, intervals: &[IntervalRecord]) -> Result<usize, DbError> {
        if intervals.is_empty() {
            return Ok(0);
        }
        if let Some(bad) = intervals
            .iter()
            .find(|interval| interval.interval_end < interval.interval_start)
        {
            return Err(DbError::InvertedInterval {
                start: bad.interval_start,
                end: bad.interval_end,
            });
        }

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO usage_intervals (package, interval_start, interval_end, foreground_ms)
                VALUES (?, ?, ?, ?)
                ",
            )?;
            for interval in intervals {
                inserted += stmt.execute(params![
                    interval.package,
                    format_timestamp(interval.interval_start),
                    format_timestamp(interval.interval_end),
                    interval.foreground_ms,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, "stored usage intervals");
        Ok(inserted)
    }

    /// Lists all intervals ordered by start time then ID.
    pub fn list_intervals(&self) -> Result<Vec<StoredInterval>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, package, interval_start, interval_end, foreground_ms
            FROM usage_intervals
            ORDER BY interval_start ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;
        let mut intervals = Vec::new();
        for row in rows {
            let (id, package, start, end, foreground_ms) = row?;
            intervals.push(StoredInterval {
                id,
                record: IntervalRecord {
                    package,
                    interval_start: parse_timestamp(&start, id)?,
                    interval_end: parse_timestamp(&end, id)?,
                    foreground_ms,
                },
            });
        }
        Ok(intervals)
    }

    /// Lists raw usage records for every interval overlapping `window`.
    ///
    /// Each overlapping interval contributes its full foreground duration.
    pub fn usage_in_window(&self, window: &LookbackWindow) -> Result<Vec<UsageRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT package, foreground_ms
            FROM usage_intervals
            WHERE interval_start <= ? AND interval_end > ?
            ORDER BY interval_start ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![format_timestamp(window.end()), format_timestamp(window.start())],
            |row| {
                Ok(UsageRecord {
                    application_id: row.get(0)?,
                    foreground_duration_millis: row.get(1)?,
                })
            },
        )?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        tracing::debug!(
            count = records.len(),
            start = %window.start(),
            end = %window.end(),
            "queried usage records"
        );
        Ok(records)
    }
}

impl UsageProvider for Database {
    type Error = DbError;

    fn query_usage(&self, window: &LookbackWindow) -> Result<Vec<UsageRecord>, Self::Error> {
        self.usage_in_window(window)
    }
}

fn parse_timestamp(timestamp: &str, interval_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            interval_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
