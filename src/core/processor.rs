//! Stage-by-stage analysis of extracted records.
//!
//! The [`Orchestrator`] runs classifier stages strictly one after another:
//! acquire the stage's classifier, classify every record, drop the handle,
//! move on. At most one classifier is alive at any time, which keeps peak
//! memory at the size of the largest single model.
//!
//! # Example
//!
//! ```rust
//! use chatlens::classify::LexiconBackend;
//! use chatlens::config::AnalysisConfig;
//! use chatlens::core::processor::{Orchestrator, build_stages};
//! use chatlens::MessageRecord;
//! use chrono::NaiveDate;
//!
//! # fn main() -> chatlens::Result<()> {
//! let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let records = vec![MessageRecord::new("A great win for the team", date)?];
//!
//! let backend = LexiconBackend::default();
//! let stages = build_stages(&AnalysisConfig::default())?;
//! let classified = Orchestrator::new(&backend).run(records, &stages)?;
//!
//! assert!(classified[0].is_classified());
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::classify::{ClassifierBackend, Prediction, SensitiveTopicTable, Stage, StageKind};
use crate::config::AnalysisConfig;
use crate::error::{ChatlensError, Result};
use crate::message::MessageRecord;
use crate::progress::{ProgressCallback, StageProgress};

/// Builds the ordered stage list for `config`.
///
/// The sensitive-topic table is loaded here, before any record is
/// extracted or classified.
///
/// # Errors
///
/// Returns [`ChatlensError::MissingTopicTable`] or
/// [`ChatlensError::InvalidTopicTable`] when the sensitive-topic stage is
/// enabled and its table cannot be loaded, and
/// [`ChatlensError::InvalidVocabulary`] for a bad topic vocabulary.
pub fn build_stages(config: &AnalysisConfig) -> Result<Vec<Stage>> {
    let mut stages = vec![Stage::Sentiment, Stage::Topic(config.topic_vocabulary()?)];
    if config.sensitive_topic {
        stages.push(Stage::SensitiveTopic(SensitiveTopicTable::load(
            &config.topic_table,
        )?));
    }
    Ok(stages)
}

/// Statistics about one completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub kind: StageKind,
    /// Records classified
    pub records: usize,
    pub elapsed: Duration,
}

impl StageReport {
    /// Records per second, or 0 if the stage took no measurable time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.records as f64 / secs
    }
}

/// Drives classifier stages over a record set.
pub struct Orchestrator<'a> {
    backend: &'a dyn ClassifierBackend,
    progress: Option<ProgressCallback>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn ClassifierBackend) -> Self {
        Self {
            backend,
            progress: None,
        }
    }

    /// Reports progress after every classified record.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Runs `stages` in order over `records`.
    ///
    /// # Errors
    ///
    /// Aborts on the first stage failure: [`ChatlensError::ModelUnavailable`]
    /// if a classifier cannot be acquired, [`ChatlensError::Classification`]
    /// if it fails on a record or returns a label outside the stage's
    /// vocabulary.
    pub fn run(&self, records: Vec<MessageRecord>, stages: &[Stage]) -> Result<Vec<MessageRecord>> {
        self.run_with_reports(records, stages).map(|(records, _)| records)
    }

    /// Like [`run`](Self::run), also returning per-stage statistics.
    pub fn run_with_reports(
        &self,
        mut records: Vec<MessageRecord>,
        stages: &[Stage],
    ) -> Result<(Vec<MessageRecord>, Vec<StageReport>)> {
        let mut reports = Vec::with_capacity(stages.len());
        if records.is_empty() {
            debug!("no records, skipping classifier stages");
            return Ok((records, reports));
        }

        for stage in stages {
            reports.push(self.run_stage(stage, &mut records)?);
        }
        Ok((records, reports))
    }

    fn run_stage(&self, stage: &Stage, records: &mut [MessageRecord]) -> Result<StageReport> {
        let kind = stage.kind();
        let total = records.len();
        let started = Instant::now();
        info!(stage = %kind, backend = self.backend.name(), records = total, "stage started");

        let mut classifier = self.backend.acquire(stage)?;
        debug!(stage = %kind, "classifier acquired");

        for (index, record) in records.iter_mut().enumerate() {
            let prediction = classifier.classify(record.text())?;
            if !stage.accepts(&prediction) {
                return Err(ChatlensError::classification(
                    kind,
                    format!("record {} got label '{}' outside the stage vocabulary", index, prediction),
                ));
            }
            match prediction {
                Prediction::Sentiment(sentiment) => record.set_sentiment(sentiment),
                Prediction::Topic(label) => record.set_topic(label),
                Prediction::SensitiveTopic(label) => record.set_sensitive_topic(label),
            }
            if let Some(callback) = &self.progress {
                callback(StageProgress::new(kind, index + 1, total));
            }
        }

        drop(classifier);
        debug!(stage = %kind, "classifier released");

        let elapsed = started.elapsed();
        info!(stage = %kind, records = total, elapsed_ms = elapsed.as_millis() as u64, "stage finished");
        Ok(StageReport {
            kind,
            records: total,
            elapsed,
        })
    }
}
