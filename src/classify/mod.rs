//! Classifier capability contract.
//!
//! The analysis pipeline never talks to a model directly. It asks a
//! [`ClassifierBackend`] to [`acquire`](ClassifierBackend::acquire) a
//! [`Classifier`] for one [`Stage`], runs it over every record, and drops it.
//! Dropping the handle is what releases the stage's model state, so release
//! happens on every exit path, including `?` returns.
//!
//! # Backends
//!
//! | Backend | Feature | Source of labels |
//! |---------|---------|------------------|
//! | [`LexiconBackend`] | always | keyword hit counts |
//! | [`HttpBackend`](http::HttpBackend) | `http-backend` | hosted inference endpoints |
//!
//! # Example
//!
//! ```rust
//! use chatlens::classify::{ClassifierBackend, LexiconBackend, Prediction, Stage};
//! use chatlens::Sentiment;
//!
//! let backend = LexiconBackend::default();
//! let mut classifier = backend.acquire(&Stage::Sentiment)?;
//! let prediction = classifier.classify("What a great win for the team")?;
//! assert_eq!(prediction, Prediction::Sentiment(Sentiment::Positive));
//! # Ok::<(), chatlens::ChatlensError>(())
//! ```

#[cfg(feature = "http-backend")]
pub mod http;
pub mod lexicon;
pub mod vocabulary;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Sentiment;

pub use lexicon::{Lexicon, LexiconBackend};
pub use vocabulary::{SensitiveTopicTable, TopicVocabulary};

/// Tag identifying a classifier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Sentiment,
    Topic,
    SensitiveTopic,
}

impl StageKind {
    /// Returns the stage identifier used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Sentiment => "sentiment",
            StageKind::Topic => "topic",
            StageKind::SensitiveTopic => "sensitive_topic",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Sentiment => write!(f, "Sentiment"),
            StageKind::Topic => write!(f, "Topic"),
            StageKind::SensitiveTopic => write!(f, "Sensitive topic"),
        }
    }
}

/// One classifier pass, carrying the closed vocabulary its labels must
/// come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Three-way sentiment
    Sentiment,
    /// Zero-shot topic over a configured vocabulary
    Topic(TopicVocabulary),
    /// Sensitive-topic class mapped through an id -> label table
    SensitiveTopic(SensitiveTopicTable),
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Sentiment => StageKind::Sentiment,
            Stage::Topic(_) => StageKind::Topic,
            Stage::SensitiveTopic(_) => StageKind::SensitiveTopic,
        }
    }

    /// Returns `true` if `prediction` is a legal output of this stage.
    pub fn accepts(&self, prediction: &Prediction) -> bool {
        match (self, prediction) {
            (Stage::Sentiment, Prediction::Sentiment(_)) => true,
            (Stage::Topic(vocabulary), Prediction::Topic(label)) => vocabulary.contains(label),
            (Stage::SensitiveTopic(table), Prediction::SensitiveTopic(label)) => {
                table.contains_label(label)
            }
            _ => false,
        }
    }
}

/// The label a classifier assigned to one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    Sentiment(Sentiment),
    Topic(String),
    SensitiveTopic(String),
}

impl Prediction {
    pub fn kind(&self) -> StageKind {
        match self {
            Prediction::Sentiment(_) => StageKind::Sentiment,
            Prediction::Topic(_) => StageKind::Topic,
            Prediction::SensitiveTopic(_) => StageKind::SensitiveTopic,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Sentiment(s) => write!(f, "{}", s),
            Prediction::Topic(label) | Prediction::SensitiveTopic(label) => f.write_str(label),
        }
    }
}

/// A loaded classifier for a single stage.
///
/// Implementations hold whatever the stage needs (keyword sets, an HTTP
/// client, model weights) and release it in `Drop`. A classifier must be a
/// pure function of the text it is given: no state may carry over from one
/// record to the next.
pub trait Classifier {
    /// The stage this handle was acquired for.
    fn kind(&self) -> StageKind;

    /// Classifies one message text.
    fn classify(&mut self, text: &str) -> Result<Prediction>;
}

/// Source of classifier handles.
///
/// # Implementation Notes
///
/// `acquire` is where a backend loads (or connects to) the model for a
/// stage. It must fail with
/// [`ChatlensError::ModelUnavailable`](crate::ChatlensError::ModelUnavailable)
/// rather than return a handle that cannot classify.
///
/// ```rust,ignore
/// impl ClassifierBackend for MyBackend {
///     fn name(&self) -> &'static str { "my-backend" }
///
///     fn acquire(&self, stage: &Stage) -> Result<Box<dyn Classifier + '_>> {
///         let model = load_weights(stage.kind())?;
///         Ok(Box::new(MyClassifier { model, stage: stage.clone() }))
///     }
/// }
/// ```
pub trait ClassifierBackend {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &'static str;

    /// Loads the resources for `stage` and returns a handle owning them.
    fn acquire(&self, stage: &Stage) -> Result<Box<dyn Classifier + '_>>;
}

/// Returns the index of the first maximal score, ignoring NaN.
///
/// ```
/// use chatlens::classify::argmax;
///
/// assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
/// assert_eq!(argmax(&[f32::NAN, 0.3]), Some(1));
/// assert_eq!(argmax(&[]), None);
/// ```
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}
