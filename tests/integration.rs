//! Integration tests for the extract -> classify -> table -> output pipeline.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chatlens::classify::{
    Classifier, ClassifierBackend, LexiconBackend, Prediction, SensitiveTopicTable, Stage,
    StageKind, TopicVocabulary,
};
use chatlens::config::{AnalysisConfig, OutputConfig};
use chatlens::core::{Orchestrator, ResultTable, build_stages, read_table, write_table};
use chatlens::parser::{MessageExtractor, Restriction, discover_documents};
use chatlens::parsers::TelegramHtmlExtractor;
use chatlens::visualize::aggregate::daily_sentiment;
use chatlens::visualize::{
    ChartKind, ChartOutcome, ChartRenderer, SentimentCounts, TimeSeries, TopicCount,
    TopicScatter, Visualizer,
};
use chatlens::{ChatlensError, MessageRecord, Result, Sentiment};
use chrono::NaiveDate;
use tempfile::tempdir;

// ============================================================================
// Fixtures
// ============================================================================

fn post(title: &str, text: &str) -> String {
    format!(
        r#"<div class="message default clearfix">
 <div class="body">
  <div class="pull_right date details" title="{title}">10:30</div>
  <div class="from_name">Channel</div>
  <div class="text">{text}</div>
 </div>
</div>
"#
    )
}

fn service(text: &str) -> String {
    format!(
        r#"<div class="message service"><div class="body details">{text}</div></div>
"#
    )
}

fn export(blocks: &[String]) -> String {
    format!(
        "<html><body><div class=\"history\">\n{}</div></body></html>",
        blocks.concat()
    )
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn records(texts: &[&str]) -> Vec<MessageRecord> {
    texts
        .iter()
        .map(|t| MessageRecord::new(t, day(2024, 3, 15)).unwrap())
        .collect()
}

// ============================================================================
// Recording backend
// ============================================================================

/// Logs every acquire and release, and optionally fails.
#[derive(Default)]
struct RecordingBackend {
    events: RefCell<Vec<String>>,
    alive: RefCell<usize>,
    max_alive: RefCell<usize>,
    /// Stage whose acquisition fails
    unavailable: Option<StageKind>,
    /// Stage whose classifier fails on the record with this index
    fail_at: Option<(StageKind, usize)>,
}

impl RecordingBackend {
    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

struct RecordingClassifier<'a> {
    backend: &'a RecordingBackend,
    stage: Stage,
    seen: usize,
}

impl Classifier for RecordingClassifier<'_> {
    fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    fn classify(&mut self, _text: &str) -> Result<Prediction> {
        let index = self.seen;
        self.seen += 1;
        if self.backend.fail_at == Some((self.kind(), index)) {
            return Err(ChatlensError::classification(self.kind(), "model crashed"));
        }
        Ok(match &self.stage {
            Stage::Sentiment => Prediction::Sentiment(Sentiment::Neutral),
            Stage::Topic(vocabulary) => Prediction::Topic(vocabulary.labels[0].clone()),
            Stage::SensitiveTopic(table) => {
                let id = table.first_id().unwrap();
                Prediction::SensitiveTopic(table.label_for(id).unwrap().to_string())
            }
        })
    }
}

impl Drop for RecordingClassifier<'_> {
    fn drop(&mut self) {
        *self.backend.alive.borrow_mut() -= 1;
        self.backend
            .events
            .borrow_mut()
            .push(format!("release {}", self.stage.kind()));
    }
}

impl ClassifierBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn acquire(&self, stage: &Stage) -> Result<Box<dyn Classifier + '_>> {
        if self.unavailable == Some(stage.kind()) {
            self.events
                .borrow_mut()
                .push(format!("unavailable {}", stage.kind()));
            return Err(ChatlensError::model_unavailable(stage.kind(), "weights missing"));
        }
        self.events
            .borrow_mut()
            .push(format!("acquire {}", stage.kind()));
        let alive = {
            let mut alive = self.alive.borrow_mut();
            *alive += 1;
            *alive
        };
        let mut max = self.max_alive.borrow_mut();
        *max = (*max).max(alive);
        Ok(Box::new(RecordingClassifier {
            backend: self,
            stage: stage.clone(),
            seen: 0,
        }))
    }
}

fn sensitive_stage_list() -> Vec<Stage> {
    vec![
        Stage::Sentiment,
        Stage::Topic(TopicVocabulary::news()),
        Stage::SensitiveTopic(SensitiveTopicTable::from_pairs([(0, "none"), (1, "drugs")]).unwrap()),
    ]
}

// ============================================================================
// Extraction scenarios
// ============================================================================

#[test]
fn test_service_block_is_excluded() {
    let html = export(&[
        service("15 March 2024"),
        post("15.03.2024 10:30:00 UTC+03:00", "First post"),
        service("Channel photo changed"),
        post("16.03.2024 09:00:00 UTC+03:00", "Second post"),
    ]);
    let found = TelegramHtmlExtractor::new().extract_document(&html);
    let texts: Vec<_> = found.iter().map(MessageRecord::text).collect();
    assert_eq!(texts, vec!["First post", "Second post"]);
}

#[test]
fn test_two_documents_yield_only_message_blocks() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("messages.html"),
        export(&[
            post("01.01.2024 10:00:00", "one"),
            post("01.01.2024 11:00:00", "two"),
            post("02.01.2024 09:00:00", "three"),
        ]),
    )
    .unwrap();
    let notice = r#"<div class="message service"><div class="body">
  <div class="pull_right date details" title="02.01.2024 12:00:00">12:00</div>
  <div class="service_text">Channel created</div>
 </div></div>
"#;
    fs::write(dir.path().join("messages2.html"), export(&[notice.to_string()])).unwrap();

    let paths = discover_documents(dir.path()).unwrap();
    let found = TelegramHtmlExtractor::new()
        .extract_files(&paths, Restriction::Unlimited)
        .unwrap();
    let texts: Vec<_> = found.iter().map(MessageRecord::text).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn test_extraction_is_repeatable() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("messages.html"),
        export(&[
            service("1 January 2024"),
            post("01.01.2024 10:00:00", "first"),
            post("03.01.2024 08:00:00", "second"),
        ]),
    )
    .unwrap();
    fs::write(
        dir.path().join("messages2.html"),
        export(&[post("04.01.2024 10:00:00", "third")]),
    )
    .unwrap();

    let extractor = TelegramHtmlExtractor::new();
    let paths = discover_documents(dir.path()).unwrap();
    let first = extractor.extract_files(&paths, Restriction::Unlimited).unwrap();
    let second = extractor.extract_files(&paths, Restriction::Unlimited).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_date_title_is_normalized() {
    let html = export(&[post("15.03.2024 10:30:00", "Hello")]);
    let found = TelegramHtmlExtractor::new().extract_document(&html);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].date(), day(2024, 3, 15));
    assert_eq!(found[0].date_string(), "15/03/2024");
}

#[test]
fn test_documents_accumulate_in_file_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("messages2.html"),
        export(&[post("02.01.2024 10:00:00", "from file two")]),
    )
    .unwrap();
    fs::write(
        dir.path().join("messages.html"),
        export(&[
            post("01.01.2024 10:00:00", "from file one"),
            post("01.01.2024 11:00:00", "also file one"),
        ]),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not an export").unwrap();

    let paths = discover_documents(dir.path()).unwrap();
    assert_eq!(paths.len(), 2);

    let found = TelegramHtmlExtractor::new()
        .extract_files(&paths, Restriction::Unlimited)
        .unwrap();
    let texts: Vec<_> = found.iter().map(MessageRecord::text).collect();
    assert_eq!(texts, vec!["from file one", "also file one", "from file two"]);

    let limited = TelegramHtmlExtractor::new()
        .extract_files(&paths, Restriction::First(2))
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[1].text(), "also file one");
}

#[test]
fn test_missing_input_file_is_skipped() {
    let dir = tempdir().unwrap();
    let present = dir.path().join("messages.html");
    fs::write(&present, export(&[post("01.01.2024 10:00:00", "kept")])).unwrap();
    let paths = vec![dir.path().join("gone.html"), present];

    let found = TelegramHtmlExtractor::new()
        .extract_files(&paths, Restriction::Unlimited)
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_missing_data_dir() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        discover_documents(&dir.path().join("Data")),
        Err(ChatlensError::DataDirNotFound { .. })
    ));
}

// ============================================================================
// Orchestration
// ============================================================================

#[test]
fn test_stages_run_one_at_a_time() {
    let backend = RecordingBackend::default();
    let out = Orchestrator::new(&backend)
        .run(records(&["a", "b", "c"]), &sensitive_stage_list())
        .unwrap();

    assert_eq!(
        backend.events(),
        vec![
            "acquire Sentiment",
            "release Sentiment",
            "acquire Topic",
            "release Topic",
            "acquire Sensitive topic",
            "release Sensitive topic",
        ]
    );
    assert_eq!(*backend.max_alive.borrow(), 1);
    assert!(out.iter().all(MessageRecord::is_classified));
    assert_eq!(out[2].topic(), Some("Politics"));
    assert_eq!(out[2].sensitive_topic(), Some("none"));
}

#[test]
fn test_classification_failure_releases_handle() {
    let backend = RecordingBackend {
        fail_at: Some((StageKind::Topic, 1)),
        ..RecordingBackend::default()
    };
    let err = Orchestrator::new(&backend)
        .run(records(&["a", "b", "c"]), &sensitive_stage_list())
        .unwrap_err();

    assert!(matches!(
        err,
        ChatlensError::Classification {
            stage: StageKind::Topic,
            ..
        }
    ));
    assert_eq!(
        backend.events(),
        vec![
            "acquire Sentiment",
            "release Sentiment",
            "acquire Topic",
            "release Topic",
        ]
    );
    assert_eq!(*backend.alive.borrow(), 0);
}

#[test]
fn test_unavailable_model_aborts_run() {
    let backend = RecordingBackend {
        unavailable: Some(StageKind::Topic),
        ..RecordingBackend::default()
    };
    let err = Orchestrator::new(&backend)
        .run(records(&["a"]), &sensitive_stage_list())
        .unwrap_err();

    assert!(err.is_stage_failure());
    assert_eq!(
        backend.events(),
        vec!["acquire Sentiment", "release Sentiment", "unavailable Topic"]
    );
}

#[test]
fn test_no_records_acquire_nothing() {
    let backend = RecordingBackend::default();
    let out = Orchestrator::new(&backend)
        .run(Vec::new(), &sensitive_stage_list())
        .unwrap();
    assert!(out.is_empty());
    assert!(backend.events().is_empty());
}

#[test]
fn test_missing_topic_table_fails_before_classification() {
    let dir = tempdir().unwrap();
    let config = AnalysisConfig::new()
        .with_sensitive_topic(true)
        .with_topic_table(dir.path().join("id2topic.json"));
    let err = build_stages(&config).unwrap_err();
    assert!(matches!(err, ChatlensError::MissingTopicTable { .. }));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_pipeline_to_csv_and_back() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("Data");
    fs::create_dir(&data).unwrap();
    fs::write(
        data.join("messages.html"),
        export(&[
            service("1 March 2024"),
            post("01.03.2024 08:00:00 UTC+03:00", "A great win for the football team"),
            post("01.03.2024 09:00:00 UTC+03:00", "Inflation crisis hits the central bank"),
            post("03.03.2024 12:00:00 UTC+03:00", "Hospital doctors report progress"),
        ]),
    )
    .unwrap();
    let table_path = dir.path().join("id2topic.json");
    fs::write(&table_path, r#"{"0": "none", "1": "drugs", "2": "gambling"}"#).unwrap();

    let paths = discover_documents(&data).unwrap();
    let extracted = TelegramHtmlExtractor::new()
        .extract_files(&paths, Restriction::from_cli(-1).unwrap())
        .unwrap();
    assert_eq!(extracted.len(), 3);

    let config = AnalysisConfig::new()
        .with_sensitive_topic(true)
        .with_topic_table(&table_path);
    let stages = build_stages(&config).unwrap();
    let backend = LexiconBackend::default();
    let classified = Orchestrator::new(&backend).run(extracted, &stages).unwrap();

    let table = ResultTable::from_records(&classified).unwrap();
    assert_eq!(
        table.headers(),
        vec!["Date", "Semantic Tag", "Label", "Sensitive Topic"]
    );
    assert_eq!(
        table.sentiments(),
        &[Sentiment::Positive, Sentiment::Negative, Sentiment::Positive]
    );
    assert_eq!(table.labels(), &["Sports", "Economy", "Health"]);

    let output = OutputConfig::new().with_path(dir.path().join("Output").join("output.csv"));
    write_table(&table, &output).unwrap();
    let content = fs::read_to_string(&output.path).unwrap();
    assert!(content.starts_with("Date|Semantic Tag|Label|Sensitive Topic\n01/03/2024|Positive|Sports|"));

    let loaded = read_table(&output.path, '|').unwrap();
    assert_eq!(loaded, table);

    let series = daily_sentiment(&loaded);
    let values: Vec<i64> = series.values().collect();
    assert_eq!(values, vec![0, 0, 1]);
}

// ============================================================================
// Charts
// ============================================================================

/// Writes the chart kind to the target file.
struct TextRenderer;

impl TextRenderer {
    fn write(path: &Path, body: &str) -> Result<()> {
        fs::write(path, body)?;
        Ok(())
    }
}

impl ChartRenderer for TextRenderer {
    fn timeline(&self, path: &Path, _title: &str, series: &TimeSeries) -> Result<()> {
        let values: Vec<String> = series.values().map(|v| v.to_string()).collect();
        Self::write(path, &values.join(","))
    }

    fn scatter(&self, path: &Path, _title: &str, scatter: &TopicScatter) -> Result<()> {
        Self::write(path, &scatter.points.len().to_string())
    }

    fn sentiment_bars(&self, path: &Path, _title: &str, counts: &SentimentCounts) -> Result<()> {
        Self::write(path, &counts.total().to_string())
    }

    fn topic_bars(&self, path: &Path, _title: &str, counts: &[TopicCount]) -> Result<()> {
        Self::write(path, &counts.len().to_string())
    }
}

fn chart_table() -> ResultTable {
    let rows = [
        (day(2024, 1, 1), Sentiment::Positive),
        (day(2024, 1, 1), Sentiment::Positive),
        (day(2024, 1, 3), Sentiment::Negative),
        (day(2024, 1, 3), Sentiment::Neutral),
    ];
    let records: Vec<MessageRecord> = rows
        .iter()
        .map(|(date, sentiment)| {
            MessageRecord::new("post", *date)
                .unwrap()
                .with_sentiment(*sentiment)
                .with_topic("Economy")
        })
        .collect();
    ResultTable::from_records(&records).unwrap()
}

#[test]
fn test_daily_sums_fill_gaps() {
    let series = daily_sentiment(&chart_table());
    assert_eq!(series.range(), Some((day(2024, 1, 1), day(2024, 1, 3))));
    let values: Vec<i64> = series.values().collect();
    assert_eq!(values, vec![2, 0, -1]);
}

#[test]
fn test_opposite_sentiments_cancel_out() {
    let rows = [
        (day(2024, 1, 1), Sentiment::Positive),
        (day(2024, 1, 1), Sentiment::Negative),
        (day(2024, 1, 3), Sentiment::Neutral),
    ];
    let records: Vec<MessageRecord> = rows
        .iter()
        .map(|(date, sentiment)| {
            MessageRecord::new("post", *date)
                .unwrap()
                .with_sentiment(*sentiment)
                .with_topic("Economy")
        })
        .collect();
    let table = ResultTable::from_records(&records).unwrap();

    let series = daily_sentiment(&table);
    let points: Vec<(NaiveDate, i64)> = series.points.iter().map(|p| (p.date, p.value)).collect();
    assert_eq!(
        points,
        vec![(day(2024, 1, 1), 0), (day(2024, 1, 2), 0), (day(2024, 1, 3), 0)]
    );
}

#[test]
fn test_absent_topic_writes_no_file() {
    let dir = tempdir().unwrap();
    let visualizer = Visualizer::new(TextRenderer, dir.path());
    let table = chart_table();

    let outcome = visualizer
        .draw(&table, &ChartKind::TopicTimeline("Sports".into()))
        .unwrap();
    assert_eq!(outcome, ChartOutcome::NotFound("Sports".into()));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

    let outcome = visualizer
        .draw(&table, &ChartKind::TopicTimeline("economy".into()))
        .unwrap();
    let expected: PathBuf = dir.path().join("economy_timeline.svg");
    assert_eq!(outcome, ChartOutcome::Written(expected.clone()));
    assert_eq!(fs::read_to_string(expected).unwrap(), "2,0,-1");
}

#[cfg(feature = "charts")]
#[test]
fn test_svg_charts_are_written() {
    use chatlens::visualize::SvgRenderer;

    let dir = tempdir().unwrap();
    let visualizer = Visualizer::new(SvgRenderer::default(), dir.path())
        .with_vocabulary(TopicVocabulary::news());
    let kinds = [
        ChartKind::GeneralTimeline,
        ChartKind::MonthlyTimeline,
        ChartKind::GeneralHistogram,
        ChartKind::TopicDynamics,
        ChartKind::TopicFrequency,
        ChartKind::TopicHistogram("Economy".into()),
    ];
    for outcome in visualizer.draw_all(&chart_table(), &kinds).unwrap() {
        let ChartOutcome::Written(path) = outcome else {
            panic!("expected a written chart");
        };
        assert!(fs::read_to_string(path).unwrap().contains("<svg"));
    }
}
