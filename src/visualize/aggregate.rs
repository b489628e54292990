//! Chart-ready aggregations of a [`ResultTable`].
//!
//! Everything here is a pure function of the table. Renderers and the JSON
//! export consume the resulting series without touching rows again.
//!
//! Sentiment is weighted `Negative = -1`, `Neutral = 0`, `Positive = +1`;
//! timelines sum those weights per period over a continuous range, so a
//! period without messages shows up as `0` rather than being skipped.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::classify::TopicVocabulary;
use crate::core::table::ResultTable;
use crate::message::Sentiment;

/// Result of a per-topic aggregation.
///
/// A topic with no rows is a normal outcome, reported as
/// [`NotFound`](TopicLookup::NotFound) instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicLookup<T> {
    Found(T),
    NotFound(String),
}

impl<T> TopicLookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, TopicLookup::Found(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            TopicLookup::Found(value) => Some(value),
            TopicLookup::NotFound(_) => None,
        }
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            TopicLookup::Found(value) => Some(value),
            TopicLookup::NotFound(_) => None,
        }
    }
}

/// One period of a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    /// Day, or first day of the month for monthly series
    pub date: NaiveDate,
    pub value: i64,
}

/// Sentiment sums over a continuous run of periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last period.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }

    /// Smallest and largest value.
    pub fn value_range(&self) -> Option<(i64, i64)> {
        let min = self.points.iter().map(|p| p.value).min()?;
        let max = self.points.iter().map(|p| p.value).max()?;
        Some((min, max))
    }

    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Value of the period starting at `date`.
    pub fn value_at(&self, date: NaiveDate) -> Option<i64> {
        self.points.iter().find(|p| p.date == date).map(|p| p.value)
    }
}

/// Message counts per sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl SentimentCounts {
    fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Positive => self.positive += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }

    /// Counts on the fixed axis `[Negative, Neutral, Positive]`.
    pub fn by_axis(&self) -> [(Sentiment, usize); 3] {
        Sentiment::AXIS_ORDER.map(|s| (s, self.get(s)))
    }

    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }
}

/// Topic of every row plotted against its date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicScatter {
    /// Y axis: topic id `i` is `topics[i]`
    pub topics: Vec<String>,
    /// One `(date, topic id)` per row
    pub points: Vec<(NaiveDate, usize)>,
    /// Full continuous date range of the table
    pub range: Option<(NaiveDate, NaiveDate)>,
}

/// Number of rows per topic label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

// ============================================================================
// Timelines
// ============================================================================

/// Daily sentiment sum over the table's full date range.
///
/// # Example
///
/// ```
/// use chatlens::core::table::{ResultTable, TableRow};
/// use chatlens::visualize::aggregate::daily_sentiment;
/// use chatlens::Sentiment;
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let table = ResultTable::from_rows(vec![
///     TableRow::new(day(1), Sentiment::Positive, "Economy"),
///     TableRow::new(day(1), Sentiment::Positive, "Economy"),
///     TableRow::new(day(3), Sentiment::Negative, "Economy"),
/// ])?;
///
/// let values: Vec<i64> = daily_sentiment(&table).values().collect();
/// assert_eq!(values, vec![2, 0, -1]);
/// # Ok::<(), chatlens::ChatlensError>(())
/// ```
pub fn daily_sentiment(table: &ResultTable) -> TimeSeries {
    daily_series(
        table
            .dates()
            .iter()
            .zip(table.sentiments())
            .map(|(date, sentiment)| (*date, sentiment.score())),
        table.date_range(),
    )
}

/// Monthly sentiment sum, keyed by the first day of each month.
pub fn monthly_sentiment(table: &ResultTable) -> TimeSeries {
    let mut sums: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (date, sentiment) in table.dates().iter().zip(table.sentiments()) {
        *sums.entry(month_start(*date)).or_default() += sentiment.score();
    }

    let (Some(first), Some(last)) = (sums.keys().next().copied(), sums.keys().last().copied())
    else {
        return TimeSeries::default();
    };

    let mut points = Vec::new();
    let mut month = first;
    while month <= last {
        points.push(SeriesPoint {
            date: month,
            value: sums.get(&month).copied().unwrap_or(0),
        });
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    TimeSeries { points }
}

/// Daily sentiment sum of the rows labelled `topic` (case-insensitive
/// equality), over the whole table's date range so it lines up with
/// [`daily_sentiment`]. Days without a matching row are 0.
pub fn topic_sentiment_timeline(table: &ResultTable, topic: &str) -> TopicLookup<TimeSeries> {
    let wanted = topic.to_lowercase();
    let matching: Vec<(NaiveDate, i64)> = table
        .dates()
        .iter()
        .zip(table.sentiments())
        .zip(table.labels())
        .filter(|(_, label)| label.to_lowercase() == wanted)
        .map(|((date, sentiment), _)| (*date, sentiment.score()))
        .collect();

    if matching.is_empty() {
        return TopicLookup::NotFound(topic.to_string());
    }
    TopicLookup::Found(daily_series(matching, table.date_range()))
}

/// Sums `values` per day and fills every day of `range` (or of the values'
/// own span when `None`).
fn daily_series(
    values: impl IntoIterator<Item = (NaiveDate, i64)>,
    range: Option<(NaiveDate, NaiveDate)>,
) -> TimeSeries {
    let mut sums: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (date, value) in values {
        *sums.entry(date).or_default() += value;
    }
    let span = match (sums.keys().next(), sums.keys().last()) {
        (Some(first), Some(last)) => Some((*first, *last)),
        _ => None,
    };
    let Some((first, last)) = range.or(span) else {
        return TimeSeries::default();
    };

    let points = first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|date| SeriesPoint {
            date,
            value: sums.get(&date).copied().unwrap_or(0),
        })
        .collect();
    TimeSeries { points }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

// ============================================================================
// Topic views
// ============================================================================

/// Orders topic labels: vocabulary labels first, in vocabulary order, then
/// labels outside the vocabulary in first-appearance order.
fn topic_axis(table: &ResultTable, vocabulary: Option<&TopicVocabulary>) -> Vec<String> {
    let mut axis: Vec<String> = vocabulary
        .map(|v| v.iter().map(str::to_string).collect())
        .unwrap_or_default();
    for label in table.labels() {
        if !axis.contains(label) {
            axis.push(label.clone());
        }
    }
    axis
}

/// Topic of each row against its date.
pub fn topic_scatter(table: &ResultTable, vocabulary: Option<&TopicVocabulary>) -> TopicScatter {
    let topics = topic_axis(table, vocabulary);
    let ids: HashMap<&str, usize> = topics
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let points = table
        .dates()
        .iter()
        .zip(table.labels())
        .filter_map(|(date, label)| ids.get(label.as_str()).map(|id| (*date, *id)))
        .collect();

    TopicScatter {
        points,
        range: table.date_range(),
        topics,
    }
}

/// Sentiment counts of the whole table, or of the rows labelled `topic`
/// (case-insensitive equality).
pub fn sentiment_histogram(table: &ResultTable, topic: Option<&str>) -> TopicLookup<SentimentCounts> {
    let wanted = topic.map(str::to_lowercase);
    let labels = table.labels();
    let mut counts = SentimentCounts::default();
    for (index, sentiment) in table.sentiments().iter().enumerate() {
        let matches = match wanted.as_deref() {
            None => true,
            Some(w) => labels.get(index).is_some_and(|label| label.to_lowercase() == w),
        };
        if matches {
            counts.add(*sentiment);
        }
    }

    match topic {
        Some(topic) if counts.total() == 0 => TopicLookup::NotFound(topic.to_string()),
        _ => TopicLookup::Found(counts),
    }
}

/// Rows per topic, reindexed over the vocabulary (absent topics count 0).
pub fn topic_frequency(table: &ResultTable, vocabulary: Option<&TopicVocabulary>) -> Vec<TopicCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in table.labels() {
        *counts.entry(label.as_str()).or_default() += 1;
    }
    topic_axis(table, vocabulary)
        .into_iter()
        .map(|topic| TopicCount {
            count: counts.get(topic.as_str()).copied().unwrap_or(0),
            topic,
        })
        .collect()
}

// ============================================================================
// Export bundle
// ============================================================================

/// Every aggregation computed by one `visualize` run, for JSON export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_timeline: Option<TimeSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_timeline: Option<TimeSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_histogram: Option<SentimentCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_dynamics: Option<TopicScatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_frequency: Option<Vec<TopicCount>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub topic_timelines: BTreeMap<String, TimeSeries>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub topic_histograms: BTreeMap<String, SentimentCounts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_topics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

impl AggregationBundle {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
