//! Message records extracted from chat exports.
//!
//! This module provides [`MessageRecord`], the normalized representation of one
//! channel post, and [`Sentiment`], the closed label set of the sentiment stage.
//!
//! # Overview
//!
//! A record consists of:
//! - **Fixed at extraction**: `text` and `date`
//! - **Filled by classifier stages**: `sentiment`, `topic`, `sensitive_topic`
//!
//! # Examples
//!
//! ```
//! use chatlens::{MessageRecord, Sentiment};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let mut record = MessageRecord::new("  Markets rally  ", date)?;
//! assert_eq!(record.text(), "Markets rally");
//! assert_eq!(record.date_string(), "15/03/2024");
//!
//! record.set_sentiment(Sentiment::Positive);
//! assert_eq!(record.sentiment(), Some(Sentiment::Positive));
//! # Ok::<(), chatlens::ChatlensError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ChatlensError, Result};

/// Display and CSV format of record dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Sentiment label produced by the sentiment stage.
///
/// The declaration order matches the class order of index-based sentiment
/// models: `0 = Neutral`, `1 = Positive`, `2 = Negative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Neutral,
    Positive,
    Negative,
}

impl Sentiment {
    /// Labels in model class-index order.
    pub const CLASS_ORDER: [Sentiment; 3] =
        [Sentiment::Neutral, Sentiment::Positive, Sentiment::Negative];

    /// Labels in chart axis order.
    pub const AXIS_ORDER: [Sentiment; 3] =
        [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Numeric weight used by timeline aggregations.
    ///
    /// ```
    /// use chatlens::Sentiment;
    ///
    /// assert_eq!(Sentiment::Negative.score(), -1);
    /// assert_eq!(Sentiment::Neutral.score(), 0);
    /// assert_eq!(Sentiment::Positive.score(), 1);
    /// ```
    pub fn score(self) -> i64 {
        match self {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        }
    }

    /// Maps a model class index to a label.
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::CLASS_ORDER.get(index).copied()
    }

    /// Returns the label as written in CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neutral" => Ok(Sentiment::Neutral),
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(format!(
                "Unknown sentiment: '{}'. Expected one of: Neutral, Positive, Negative",
                s
            )),
        }
    }
}

/// One extracted channel message.
///
/// `text` and `date` are fixed when the record is created; the three stage
/// fields start unset and are filled by the analysis stages.
///
/// | Field | Type | Set by |
/// |-------|------|--------|
/// | `text` | `String` | extractor (trimmed, never empty) |
/// | `date` | `NaiveDate` | extractor |
/// | `sentiment` | `Option<Sentiment>` | sentiment stage |
/// | `topic` | `Option<String>` | topic stage |
/// | `sensitive_topic` | `Option<String>` | sensitive-topic stage |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    text: String,
    date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensitive_topic: Option<String>,
}

impl MessageRecord {
    /// Creates a record from raw text and a calendar date.
    ///
    /// The text is trimmed; whitespace-only text is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::Config`] when the trimmed text is empty.
    pub fn new(text: impl AsRef<str>, date: NaiveDate) -> Result<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(ChatlensError::config("message text must not be empty"));
        }
        Ok(Self {
            text: text.to_string(),
            date,
            sentiment: None,
            topic: None,
            sensitive_topic: None,
        })
    }

    /// Creates a record from text and a raw export date title such as
    /// `"15.03.2024 10:30:00 UTC+03:00"`.
    ///
    /// Returns `None` if the text is empty or the date cannot be normalized.
    pub fn from_export(text: &str, date_title: &str) -> Option<Self> {
        let date = normalize_date(date_title)?;
        Self::new(text, date).ok()
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the calendar date of the message.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the date as `DD/MM/YYYY`.
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn sensitive_topic(&self) -> Option<&str> {
        self.sensitive_topic.as_deref()
    }

    // =========================================================================
    // Stage results
    // =========================================================================

    pub fn set_sentiment(&mut self, sentiment: Sentiment) {
        self.sentiment = Some(sentiment);
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = Some(topic.into());
    }

    pub fn set_sensitive_topic(&mut self, label: impl Into<String>) {
        self.sensitive_topic = Some(label.into());
    }

    /// Builder variant of [`set_sentiment`](Self::set_sentiment).
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.set_sentiment(sentiment);
        self
    }

    /// Builder variant of [`set_topic`](Self::set_topic).
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.set_topic(topic);
        self
    }

    /// Builder variant of [`set_sensitive_topic`](Self::set_sensitive_topic).
    #[must_use]
    pub fn with_sensitive_topic(mut self, label: impl Into<String>) -> Self {
        self.set_sensitive_topic(label);
        self
    }

    /// Returns `true` once both mandatory stages have written their result.
    pub fn is_classified(&self) -> bool {
        self.sentiment.is_some() && self.topic.is_some()
    }
}

/// Normalizes an export date title to a calendar date.
///
/// Only the first 10 characters are kept, `.` separators become `/`, and the
/// result is parsed as `DD/MM/YYYY`.
///
/// # Example
///
/// ```
/// use chatlens::message::normalize_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(
///     normalize_date("15.03.2024 10:30:00"),
///     NaiveDate::from_ymd_opt(2024, 3, 15)
/// );
/// assert_eq!(normalize_date("yesterday"), None);
/// ```
pub fn normalize_date(title: &str) -> Option<NaiveDate> {
    let head: String = title
        .trim()
        .chars()
        .take(10)
        .map(|c| if c == '.' { '/' } else { c })
        .collect();
    NaiveDate::parse_from_str(&head, DATE_FORMAT).ok()
}

/// Parses a `DD/MM/YYYY` string, as found in CSV output.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
