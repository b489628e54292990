//! Chart rendering seam.
//!
//! [`Visualizer`] turns a [`ChartKind`] into an aggregation and hands it to
//! a [`ChartRenderer`], which only knows how to draw series to a file. The
//! SVG renderer lives behind the `charts` feature; tests plug in their own.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::aggregate::{SentimentCounts, TimeSeries, TopicCount, TopicScatter};
use super::{ChartData, ChartKind, chart_data};
use crate::classify::TopicVocabulary;
use crate::core::table::ResultTable;
use crate::error::Result;

/// Draws aggregated data to a file.
///
/// # Implementation Notes
///
/// Each method must either write `path` completely or return
/// [`ChatlensError::Render`](crate::ChatlensError::Render).
pub trait ChartRenderer {
    /// Line chart of a sentiment time series.
    fn timeline(&self, path: &Path, title: &str, series: &TimeSeries) -> Result<()>;

    /// Scatter plot of topic ids against dates.
    fn scatter(&self, path: &Path, title: &str, scatter: &TopicScatter) -> Result<()>;

    /// Bar chart of sentiment counts on the `[Negative, Neutral, Positive]` axis.
    fn sentiment_bars(&self, path: &Path, title: &str, counts: &SentimentCounts) -> Result<()>;

    /// Bar chart of message counts per topic.
    fn topic_bars(&self, path: &Path, title: &str, counts: &[TopicCount]) -> Result<()>;
}

/// What happened to one requested chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    /// The chart was written to this file
    Written(PathBuf),
    /// The requested topic has no rows; nothing was written
    NotFound(String),
    /// The table lacks this column; nothing was written
    MissingColumn(&'static str),
}

/// Draws charts of a table into an output directory.
///
/// # Example
///
/// ```rust,no_run
/// # #[cfg(feature = "charts")]
/// # fn main() -> chatlens::Result<()> {
/// use chatlens::core::output::read_table;
/// use chatlens::visualize::{ChartKind, SvgRenderer, Visualizer};
/// use std::path::Path;
///
/// let table = read_table(Path::new("Output/output.csv"), '|')?;
/// let visualizer = Visualizer::new(SvgRenderer::default(), "Output");
/// visualizer.draw(&table, &ChartKind::GeneralTimeline)?;
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "charts"))]
/// # fn main() {}
/// ```
pub struct Visualizer<R: ChartRenderer> {
    renderer: R,
    output_dir: PathBuf,
    vocabulary: Option<TopicVocabulary>,
}

impl<R: ChartRenderer> Visualizer<R> {
    pub fn new(renderer: R, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output_dir: output_dir.into(),
            vocabulary: None,
        }
    }

    /// Orders topic axes by `vocabulary`.
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: TopicVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path `kind` is written to.
    pub fn path_for(&self, kind: &ChartKind) -> PathBuf {
        self.output_dir.join(kind.file_name())
    }

    /// Draws one chart.
    ///
    /// A per-topic chart whose topic has no rows yields
    /// [`ChartOutcome::NotFound`], and a chart whose input column is absent
    /// yields [`ChartOutcome::MissingColumn`]. Neither writes anything.
    pub fn draw(&self, table: &ResultTable, kind: &ChartKind) -> Result<ChartOutcome> {
        let data = match chart_data(table, kind, self.vocabulary.as_ref()) {
            ChartData::NotFound(topic) => {
                warn!(topic = %topic, chart = %kind.file_name(), "topic not found, chart skipped");
                return Ok(ChartOutcome::NotFound(topic));
            }
            ChartData::MissingColumn(column) => {
                warn!(column, chart = %kind.file_name(), "column missing, chart skipped");
                return Ok(ChartOutcome::MissingColumn(column));
            }
            data => data,
        };

        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(kind);
        let title = kind.title();
        match &data {
            ChartData::Timeline(series) => self.renderer.timeline(&path, &title, series)?,
            ChartData::Scatter(scatter) => self.renderer.scatter(&path, &title, scatter)?,
            ChartData::Sentiment(counts) => self.renderer.sentiment_bars(&path, &title, counts)?,
            ChartData::Frequency(counts) => self.renderer.topic_bars(&path, &title, counts)?,
            ChartData::NotFound(_) | ChartData::MissingColumn(_) => {}
        }
        info!(path = %path.display(), "chart written");
        Ok(ChartOutcome::Written(path))
    }

    /// Draws every chart in `kinds`, in order.
    pub fn draw_all(&self, table: &ResultTable, kinds: &[ChartKind]) -> Result<Vec<ChartOutcome>> {
        kinds.iter().map(|kind| self.draw(table, kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::TableRow;
    use crate::message::Sentiment;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// Records calls and writes the method name to the file.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: RefCell<Vec<String>>,
    }

    impl RecordingRenderer {
        fn record(&self, path: &Path, what: &str) -> Result<()> {
            self.calls.borrow_mut().push(what.to_string());
            fs::write(path, what)?;
            Ok(())
        }
    }

    impl ChartRenderer for RecordingRenderer {
        fn timeline(&self, path: &Path, _title: &str, _series: &TimeSeries) -> Result<()> {
            self.record(path, "timeline")
        }

        fn scatter(&self, path: &Path, _title: &str, _scatter: &TopicScatter) -> Result<()> {
            self.record(path, "scatter")
        }

        fn sentiment_bars(&self, path: &Path, _title: &str, _counts: &SentimentCounts) -> Result<()> {
            self.record(path, "sentiment_bars")
        }

        fn topic_bars(&self, path: &Path, _title: &str, _counts: &[TopicCount]) -> Result<()> {
            self.record(path, "topic_bars")
        }
    }

    fn sample() -> ResultTable {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        ResultTable::from_rows(vec![
            TableRow::new(day(1), Sentiment::Positive, "Economy"),
            TableRow::new(day(3), Sentiment::Negative, "Economy"),
        ])
        .unwrap()
    }

    #[test]
    fn test_draw_writes_named_file() {
        let dir = tempdir().unwrap();
        let visualizer = Visualizer::new(RecordingRenderer::default(), dir.path().join("Output"));
        let outcome = visualizer.draw(&sample(), &ChartKind::GeneralTimeline).unwrap();
        let expected = dir.path().join("Output").join("general_timeline.svg");
        assert_eq!(outcome, ChartOutcome::Written(expected.clone()));
        assert!(expected.exists());
    }

    #[test]
    fn test_absent_topic_writes_nothing() {
        let dir = tempdir().unwrap();
        let visualizer = Visualizer::new(RecordingRenderer::default(), dir.path());
        let outcome = visualizer
            .draw(&sample(), &ChartKind::TopicTimeline("Sports".into()))
            .unwrap();
        assert_eq!(outcome, ChartOutcome::NotFound("Sports".into()));
        assert!(!dir.path().join("Sports_timeline.svg").exists());
        assert!(visualizer.renderer().calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_column_skips_only_charts_that_need_it() {
        let dir = tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let table = ResultTable::from_columns(
            1,
            Some(vec![day]),
            Some(vec![Sentiment::Positive]),
            None,
            None,
        )
        .unwrap();
        let visualizer = Visualizer::new(RecordingRenderer::default(), dir.path());

        let outcomes = visualizer
            .draw_all(&table, &[ChartKind::TopicFrequency, ChartKind::GeneralHistogram])
            .unwrap();
        assert_eq!(outcomes[0], ChartOutcome::MissingColumn("Label"));
        assert!(matches!(outcomes[1], ChartOutcome::Written(_)));
        assert!(!dir.path().join("topic_frequency_histogram.svg").exists());
        assert!(dir.path().join("general_histogram.svg").exists());
        assert_eq!(*visualizer.renderer().calls.borrow(), vec!["sentiment_bars"]);
    }

    #[test]
    fn test_draw_all_dispatches() {
        let dir = tempdir().unwrap();
        let visualizer = Visualizer::new(RecordingRenderer::default(), dir.path())
            .with_vocabulary(TopicVocabulary::news());
        let kinds = [
            ChartKind::GeneralHistogram,
            ChartKind::TopicDynamics,
            ChartKind::TopicFrequency,
            ChartKind::TopicHistogram("economy".into()),
        ];
        let outcomes = visualizer.draw_all(&sample(), &kinds).unwrap();
        assert!(outcomes.iter().all(|o| matches!(o, ChartOutcome::Written(_))));
        assert_eq!(
            *visualizer.renderer().calls.borrow(),
            vec!["sentiment_bars", "scatter", "topic_bars", "sentiment_bars"]
        );
        assert!(dir.path().join("economy_histogram.svg").exists());
    }
}
