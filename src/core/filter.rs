//! Filter result tables by topic and date range.
//!
//! This module provides [`filter_by_topic`] for the common single-topic case
//! and [`TableFilter`] for combining a topic query with date bounds.
//!
//! # Filter Types
//!
//! | Filter | Method | Description |
//! |--------|--------|-------------|
//! | Topic | [`with_topic`](TableFilter::with_topic) | Label contains the query (case-insensitive) |
//! | Date from | [`with_date_from`](TableFilter::with_date_from) | Rows on or after date |
//! | Date to | [`with_date_to`](TableFilter::with_date_to) | Rows on or before date |
//!
//! # Examples
//!
//! ```
//! use chatlens::core::filter::{TableFilter, filter_by_topic};
//! use chatlens::core::table::{ResultTable, TableRow};
//! use chatlens::Sentiment;
//! use chrono::NaiveDate;
//!
//! # fn main() -> chatlens::Result<()> {
//! let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
//! let table = ResultTable::from_rows(vec![
//!     TableRow::new(day(1), Sentiment::Neutral, "World News"),
//!     TableRow::new(day(2), Sentiment::Positive, "Local News"),
//!     TableRow::new(day(3), Sentiment::Negative, "Economy"),
//! ])?;
//!
//! assert_eq!(filter_by_topic(&table, "news").len(), 2);
//!
//! let filter = TableFilter::new()
//!     .with_topic("news")
//!     .with_date_from("2024-06-02")?;
//! assert_eq!(filter.apply(&table).len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - Topic matching is a substring test on Unicode-lowercased text
//! - An empty topic query matches every row
//! - Multiple filters are combined with AND logic
//! - The source table is never modified; results are reindexed from zero

use chrono::NaiveDate;

use crate::core::table::{ResultTable, TableRow};
use crate::error::{ChatlensError, Result};

/// Returns the rows whose `Label` contains `query`, ignoring case.
///
/// An empty query returns every row.
pub fn filter_by_topic(table: &ResultTable, query: &str) -> ResultTable {
    let needle = query.to_lowercase();
    table.filter_rows(|row| topic_matches(row, &needle))
}

fn topic_matches(row: &TableRow, needle: &str) -> bool {
    needle.is_empty() || row.label.to_lowercase().contains(needle)
}

/// Configuration for filtering a [`ResultTable`].
///
/// Filters are combined with AND logic: a row must match all active
/// filters to be included in the result.
///
/// # Examples
///
/// ```
/// use chatlens::core::filter::TableFilter;
///
/// # fn main() -> chatlens::Result<()> {
/// let by_topic = TableFilter::new().with_topic("Politics");
///
/// let by_date = TableFilter::new()
///     .with_date_from("2024-01-01")?
///     .with_date_to("2024-12-31")?;
///
/// assert!(by_topic.is_active());
/// assert!(by_date.has_date_filter());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Include only rows whose label contains this text (case-insensitive).
    pub topic: Option<String>,

    /// Include only rows on or after this date.
    pub from: Option<NaiveDate>,

    /// Include only rows on or before this date.
    pub to: Option<NaiveDate>,
}

impl TableFilter {
    /// Creates a new empty filter; every row passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the topic query.
    #[must_use]
    pub fn with_topic(mut self, query: impl Into<String>) -> Self {
        self.topic = Some(query.into());
        self
    }

    /// Sets the start date (inclusive). Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InvalidDate`] if the format is invalid.
    pub fn with_date_from(mut self, date_str: &str) -> Result<Self> {
        self.from = Some(parse_filter_date(date_str)?);
        Ok(self)
    }

    /// Sets the end date (inclusive). Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InvalidDate`] if the format is invalid.
    pub fn with_date_to(mut self, date_str: &str) -> Result<Self> {
        self.to = Some(parse_filter_date(date_str)?);
        Ok(self)
    }

    /// Returns `true` if any filter is active.
    pub fn is_active(&self) -> bool {
        self.topic.is_some() || self.has_date_filter()
    }

    /// Returns `true` if date filters are active.
    pub fn has_date_filter(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Returns the matching rows as a new table.
    ///
    /// If no filter is active, the result is a copy of `table`.
    pub fn apply(&self, table: &ResultTable) -> ResultTable {
        if !self.is_active() {
            return table.clone();
        }
        let needle = self.topic.as_deref().map(str::to_lowercase);
        table.filter_rows(|row| {
            if let Some(needle) = &needle {
                if !topic_matches(row, needle) {
                    return false;
                }
            }
            if self.from.is_some_and(|from| row.date < from) {
                return false;
            }
            if self.to.is_some_and(|to| row.date > to) {
                return false;
            }
            true
        })
    }
}

/// Parse a date string in YYYY-MM-DD format.
fn parse_filter_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| ChatlensError::invalid_date(date_str))
}
