//! Charts of an analysed table.
//!
//! - [`aggregate`] - pure aggregations (timelines, histograms, topic views)
//! - [`render`] - the [`ChartRenderer`] seam and the [`Visualizer`] driving it
//! - [`SvgRenderer`] - SVG charts drawn with `plotters` (feature `charts`)
//!
//! Every chart is identified by a [`ChartKind`], which also fixes the file
//! name it is written to.
//!
//! # Example
//!
//! ```rust
//! use chatlens::visualize::ChartKind;
//!
//! assert_eq!(ChartKind::GeneralTimeline.file_name(), "general_timeline.svg");
//! assert_eq!(ChartKind::TopicTimeline("World News".into()).file_name(), "World_News_timeline.svg");
//! ```

pub mod aggregate;
pub mod render;
#[cfg(feature = "charts")]
mod svg;

use std::fmt;

use crate::classify::TopicVocabulary;
use crate::core::table::{COL_DATE, COL_LABEL, COL_SENTIMENT, ResultTable};

pub use aggregate::{
    AggregationBundle, SentimentCounts, TimeSeries, TopicCount, TopicLookup, TopicScatter,
};
pub use render::{ChartOutcome, ChartRenderer, Visualizer};
#[cfg(feature = "charts")]
pub use svg::SvgRenderer;

/// A chart the visualizer can draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// Daily sentiment sum over the whole table
    GeneralTimeline,
    /// Monthly sentiment sum over the whole table
    MonthlyTimeline,
    /// Sentiment counts over the whole table
    GeneralHistogram,
    /// Topic of every message against its date
    TopicDynamics,
    /// Messages per topic
    TopicFrequency,
    /// Daily sentiment sum of one topic
    TopicTimeline(String),
    /// Sentiment counts of one topic
    TopicHistogram(String),
}

impl ChartKind {
    /// File name the chart is written to.
    pub fn file_name(&self) -> String {
        match self {
            ChartKind::GeneralTimeline => "general_timeline.svg".to_string(),
            ChartKind::MonthlyTimeline => "monthly_timeline.svg".to_string(),
            ChartKind::GeneralHistogram => "general_histogram.svg".to_string(),
            ChartKind::TopicDynamics => "topic_dynamics_timeline.svg".to_string(),
            ChartKind::TopicFrequency => "topic_frequency_histogram.svg".to_string(),
            ChartKind::TopicTimeline(topic) => format!("{}_timeline.svg", sanitize_topic(topic)),
            ChartKind::TopicHistogram(topic) => format!("{}_histogram.svg", sanitize_topic(topic)),
        }
    }

    /// Chart title.
    pub fn title(&self) -> String {
        match self {
            ChartKind::GeneralTimeline => "Sentiment timeline".to_string(),
            ChartKind::MonthlyTimeline => "Monthly sentiment timeline".to_string(),
            ChartKind::GeneralHistogram => "Sentiment distribution".to_string(),
            ChartKind::TopicDynamics => "Topic dynamics".to_string(),
            ChartKind::TopicFrequency => "Topic frequency".to_string(),
            ChartKind::TopicTimeline(topic) => format!("Sentiment timeline: {}", topic),
            ChartKind::TopicHistogram(topic) => format!("Sentiment distribution: {}", topic),
        }
    }

    /// Table columns the chart is computed from.
    pub fn required_columns(&self) -> Vec<&'static str> {
        match self {
            ChartKind::GeneralTimeline | ChartKind::MonthlyTimeline => vec![COL_DATE, COL_SENTIMENT],
            ChartKind::GeneralHistogram => vec![COL_SENTIMENT],
            ChartKind::TopicDynamics => vec![COL_DATE, COL_LABEL],
            ChartKind::TopicFrequency => vec![COL_LABEL],
            ChartKind::TopicTimeline(_) => vec![COL_DATE, COL_SENTIMENT, COL_LABEL],
            ChartKind::TopicHistogram(_) => vec![COL_SENTIMENT, COL_LABEL],
        }
    }

    /// The topic a per-topic chart is about.
    pub fn topic(&self) -> Option<&str> {
        match self {
            ChartKind::TopicTimeline(topic) | ChartKind::TopicHistogram(topic) => Some(topic.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

/// Makes a topic label safe to use in a file name.
///
/// Letters, digits, `-` and `_` are kept; everything else becomes `_`.
pub fn sanitize_topic(topic: &str) -> String {
    let cleaned: String = topic
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "topic".to_string()
    } else {
        cleaned
    }
}

/// The aggregation behind one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartData {
    Timeline(TimeSeries),
    Scatter(TopicScatter),
    Sentiment(SentimentCounts),
    Frequency(Vec<TopicCount>),
    /// The requested topic has no rows
    NotFound(String),
    /// The table lacks a column the chart needs
    MissingColumn(&'static str),
}

/// Computes the aggregation `kind` needs.
///
/// A table lacking one of [`ChartKind::required_columns`] yields
/// [`ChartData::MissingColumn`].
pub fn chart_data(
    table: &ResultTable,
    kind: &ChartKind,
    vocabulary: Option<&TopicVocabulary>,
) -> ChartData {
    if let Some(column) = table.missing_column(&kind.required_columns()) {
        return ChartData::MissingColumn(column);
    }
    match kind {
        ChartKind::GeneralTimeline => ChartData::Timeline(aggregate::daily_sentiment(table)),
        ChartKind::MonthlyTimeline => ChartData::Timeline(aggregate::monthly_sentiment(table)),
        ChartKind::GeneralHistogram => match aggregate::sentiment_histogram(table, None) {
            TopicLookup::Found(counts) => ChartData::Sentiment(counts),
            TopicLookup::NotFound(topic) => ChartData::NotFound(topic),
        },
        ChartKind::TopicDynamics => ChartData::Scatter(aggregate::topic_scatter(table, vocabulary)),
        ChartKind::TopicFrequency => {
            ChartData::Frequency(aggregate::topic_frequency(table, vocabulary))
        }
        ChartKind::TopicTimeline(topic) => match aggregate::topic_sentiment_timeline(table, topic) {
            TopicLookup::Found(series) => ChartData::Timeline(series),
            TopicLookup::NotFound(topic) => ChartData::NotFound(topic),
        },
        ChartKind::TopicHistogram(topic) => {
            match aggregate::sentiment_histogram(table, Some(topic.as_str())) {
                TopicLookup::Found(counts) => ChartData::Sentiment(counts),
                TopicLookup::NotFound(topic) => ChartData::NotFound(topic),
            }
        }
    }
}

/// Computes the aggregations of every chart in `kinds`.
pub fn collect_aggregations(
    table: &ResultTable,
    kinds: &[ChartKind],
    vocabulary: Option<&TopicVocabulary>,
) -> AggregationBundle {
    let mut bundle = AggregationBundle::default();
    for kind in kinds {
        match (kind, chart_data(table, kind, vocabulary)) {
            (_, ChartData::NotFound(topic)) => {
                if !bundle.missing_topics.contains(&topic) {
                    bundle.missing_topics.push(topic);
                }
            }
            (_, ChartData::MissingColumn(column)) => {
                if !bundle.missing_columns.iter().any(|c| c == column) {
                    bundle.missing_columns.push(column.to_string());
                }
            }
            (ChartKind::GeneralTimeline, ChartData::Timeline(series)) => {
                bundle.general_timeline = Some(series);
            }
            (ChartKind::MonthlyTimeline, ChartData::Timeline(series)) => {
                bundle.monthly_timeline = Some(series);
            }
            (ChartKind::TopicTimeline(topic), ChartData::Timeline(series)) => {
                bundle.topic_timelines.insert(topic.clone(), series);
            }
            (ChartKind::TopicHistogram(topic), ChartData::Sentiment(counts)) => {
                bundle.topic_histograms.insert(topic.clone(), counts);
            }
            (_, ChartData::Sentiment(counts)) => bundle.general_histogram = Some(counts),
            (_, ChartData::Scatter(scatter)) => bundle.topic_dynamics = Some(scatter),
            (_, ChartData::Frequency(freq)) => bundle.topic_frequency = Some(freq),
            (_, ChartData::Timeline(_)) => {}
        }
    }
    bundle
}
