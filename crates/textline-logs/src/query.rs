//! Query engine over a [`LogStore`].
//!
//! A [`LogQuery`] selects entries by correlation id (when given) or from the
//! whole store, then narrows by level, time window and free-text search, and
//! finally truncates to the limit. Results are always newest first.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::store::LogStore;
use crate::types::{iso_millis, LevelFilter, LogEntry, LogLevel};

/// Limit used when the caller supplies none.
pub const DEFAULT_LIMIT: usize = 100;

/// Reads the leading integer of `raw`, ignoring trailing text.
///
/// `"10abc"` reads as 10; input without leading digits reads as `None`.
/// Magnitudes beyond `i64` saturate.
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first().copied() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses a user-supplied limit permissively.
///
/// Unparseable or non-positive input yields `default`; anything above `max`
/// is clamped to `max`.
#[must_use]
pub fn parse_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    raw.and_then(leading_int)
        .filter(|n| *n > 0)
        .map_or(default, |n| usize::try_from(n).unwrap_or(max))
        .min(max)
}

/// Parses a user-supplied hour window permissively.
///
/// Unparseable or non-positive input yields `default`.
#[must_use]
pub fn parse_hours(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(leading_int)
        .filter(|n| *n > 0)
        .map_or(default, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// A query specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Level restriction
    pub level: LevelFilter,
    /// Maximum number of entries returned
    pub limit: usize,
    /// Case-insensitive text matched against message and payload
    pub search: Option<String>,
    /// Correlation id; switches primary selection to that request's entries
    pub request_id: Option<String>,
    /// Only entries newer than this many hours
    pub hours_window: Option<u32>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            level: LevelFilter::All,
            limit: DEFAULT_LIMIT,
            search: None,
            request_id: None,
            hours_window: None,
        }
    }
}

impl LogQuery {
    /// Creates a query matching everything, limited to [`DEFAULT_LIMIT`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level restriction.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<LevelFilter>) -> Self {
        self.level = level.into();
        self
    }

    /// Sets the limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the search text. Empty text is ignored.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.is_empty()).then_some(search);
        self
    }

    /// Sets the correlation id. Empty text is ignored.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        self.request_id = (!request_id.is_empty()).then_some(request_id);
        self
    }

    /// Restricts results to the last `hours`.
    #[must_use]
    pub const fn with_hours_window(mut self, hours: u32) -> Self {
        self.hours_window = Some(hours);
        self
    }

    /// Runs the query against `store` using the current time.
    #[must_use]
    pub fn execute(&self, store: &LogStore) -> QueryResult {
        self.execute_at(store, Utc::now())
    }

    /// Runs the query with an explicit notion of "now" for the time window.
    #[must_use]
    pub fn execute_at(&self, store: &LogStore, now: DateTime<Utc>) -> QueryResult {
        let primary = match self.request_id.as_deref() {
            Some(request_id) => {
                let mut entries = store.query_by_correlation(request_id);
                entries.reverse();
                entries
            }
            None => store.snapshot(),
        };

        // A window reaching past the representable range admits everything.
        let cutoff = self
            .hours_window
            .and_then(|hours| Duration::try_hours(i64::from(hours)))
            .and_then(|window| now.checked_sub_signed(window));
        let needle = self.search.as_ref().map(|s| s.to_lowercase());

        let entries = primary
            .into_iter()
            .filter(|e| self.level.admits(e.level))
            .filter(|e| cutoff.is_none_or(|c| e.timestamp >= c))
            .filter(|e| needle.as_deref().is_none_or(|n| e.matches_search(n)))
            .take(self.limit)
            .collect();

        QueryResult::new(entries)
    }
}

/// Per-level counts over a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    /// ERROR entries
    pub error: usize,
    /// WARN entries
    pub warn: usize,
    /// INFO entries
    pub info: usize,
    /// DEBUG entries
    pub debug: usize,
}

impl LevelCounts {
    /// Counts the levels of `entries`.
    #[must_use]
    pub fn tally(entries: &[LogEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.level {
                LogLevel::Error => counts.error += 1,
                LogLevel::Warn => counts.warn += 1,
                LogLevel::Info => counts.info += 1,
                LogLevel::Debug => counts.debug += 1,
            }
        }
        counts
    }

    /// Returns the count for one level.
    #[must_use]
    pub const fn get(&self, level: LogLevel) -> usize {
        match level {
            LogLevel::Error => self.error,
            LogLevel::Warn => self.warn,
            LogLevel::Info => self.info,
            LogLevel::Debug => self.debug,
        }
    }
}

/// Oldest and newest timestamps in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Oldest returned entry
    pub from: Option<String>,
    /// Newest returned entry
    pub to: Option<String>,
}

/// Metadata describing a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    /// Number of entries returned
    pub total: usize,
    /// Entries per level
    pub counts: LevelCounts,
    /// Time range covered
    pub time_range: TimeSpan,
}

/// The canonical result of a query, rendered by the functions in [`crate::render`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matching entries, newest first
    pub entries: Vec<LogEntry>,
    /// Summary of `entries`
    pub stats: QueryStats,
}

impl QueryResult {
    /// Wraps a newest-first list of entries, computing its stats.
    #[must_use]
    pub fn new(entries: Vec<LogEntry>) -> Self {
        let time_range = TimeSpan {
            from: entries.last().map(|e| iso_millis::format(&e.timestamp)),
            to: entries.first().map(|e| iso_millis::format(&e.timestamp)),
        };
        let stats = QueryStats {
            total: entries.len(),
            counts: LevelCounts::tally(&entries),
            time_range,
        };
        Self { entries, stats }
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
