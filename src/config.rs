//! Configuration types for extraction, analysis, output and charts.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies. [`AppConfig`] groups them into the
//! JSON document accepted by `--config`; command-line flags override values
//! loaded from it.
//!
//! # Sections
//!
//! - [`ExtractConfig`] - selectors and message restriction
//! - [`AnalysisConfig`] - topic vocabulary and the sensitive-topic stage
//! - [`OutputConfig`] - CSV destination and separator
//! - [`VisualizeConfig`] - CSV input and chart directory
//! - [`BackendConfig`] - which classifier backend to use
//!
//! # Example
//!
//! ```rust
//! use chatlens::config::{AnalysisConfig, ExtractConfig};
//!
//! let extract = ExtractConfig::new().with_restriction(100);
//! let analysis = AnalysisConfig::new()
//!     .with_sensitive_topic(true)
//!     .with_vocabulary("news-v2");
//!
//! assert_eq!(extract.restriction, 100);
//! assert!(analysis.sensitive_topic);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(feature = "http-backend")]
use crate::classify::http::HttpConfig;
use crate::classify::{ClassifierBackend, LexiconBackend, TopicVocabulary};
use crate::error::{ChatlensError, Result};

/// Default directory scanned for `*.html` exports.
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Default CSV destination.
pub const DEFAULT_OUTPUT: &str = "Output/output.csv";

/// Default chart directory.
pub const DEFAULT_CHART_DIR: &str = "Output";

/// Default sensitive-topic lookup table.
pub const DEFAULT_TOPIC_TABLE: &str = "id2topic.json";

/// Default number of messages kept.
pub const DEFAULT_RESTRICTION: i64 = 25;

/// Default CSV separator.
pub const DEFAULT_DELIMITER: char = '|';

/// Configuration for Telegram HTML export extraction.
///
/// # Example
///
/// ```rust
/// use chatlens::config::ExtractConfig;
///
/// let config = ExtractConfig::new()
///     .with_date_selector("div.date")
///     .with_date_classes(["date"])
///     .with_restriction(-1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Candidate message blocks (default: `div.body`)
    pub body_selector: String,

    /// Class list a candidate must have exactly (default: `["body"]`)
    pub body_classes: Vec<String>,

    /// Text sub-block (default: `div.text`)
    pub text_selector: String,

    /// Date sub-block whose `title` holds the timestamp
    /// (default: `div.pull_right.date.details`)
    pub date_selector: String,

    /// Class list the date sub-block must have exactly; empty accepts any
    /// (default: `["pull_right", "date", "details"]`)
    pub date_classes: Vec<String>,

    /// Messages kept: `-1` for all, otherwise the first N (default: 25)
    pub restriction: i64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            body_selector: "div.body".to_string(),
            body_classes: vec!["body".to_string()],
            text_selector: "div.text".to_string(),
            date_selector: "div.pull_right.date.details".to_string(),
            date_classes: vec!["pull_right".to_string(), "date".to_string(), "details".to_string()],
            restriction: DEFAULT_RESTRICTION,
        }
    }
}

impl ExtractConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body_selector(mut self, selector: impl Into<String>) -> Self {
        self.body_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_text_selector(mut self, selector: impl Into<String>) -> Self {
        self.text_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_date_selector(mut self, selector: impl Into<String>) -> Self {
        self.date_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_date_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the message restriction (`-1` keeps every message).
    #[must_use]
    pub fn with_restriction(mut self, restriction: i64) -> Self {
        self.restriction = restriction;
        self
    }
}

/// Configuration of the classifier stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the sensitive-topic stage (default: false)
    pub sensitive_topic: bool,

    /// `id -> label` table of the sensitive-topic model (default: `id2topic.json`)
    pub topic_table: PathBuf,

    /// Built-in vocabulary name (default: `news-v1`)
    pub vocabulary: String,

    /// Custom vocabulary file; takes precedence over `vocabulary`
    pub vocabulary_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sensitive_topic: false,
            topic_table: PathBuf::from(DEFAULT_TOPIC_TABLE),
            vocabulary: TopicVocabulary::news().version,
            vocabulary_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the sensitive-topic stage.
    #[must_use]
    pub fn with_sensitive_topic(mut self, enabled: bool) -> Self {
        self.sensitive_topic = enabled;
        self
    }

    #[must_use]
    pub fn with_topic_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.topic_table = path.into();
        self
    }

    /// Selects a built-in vocabulary by name.
    #[must_use]
    pub fn with_vocabulary(mut self, name: impl Into<String>) -> Self {
        self.vocabulary = name.into();
        self
    }

    /// Uses a vocabulary loaded from a JSON file.
    #[must_use]
    pub fn with_vocabulary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.vocabulary_path = Some(path.into());
        self
    }

    /// Resolves the configured topic vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InvalidVocabulary`] for an unknown built-in
    /// name or an invalid file.
    pub fn topic_vocabulary(&self) -> Result<TopicVocabulary> {
        if let Some(path) = &self.vocabulary_path {
            return TopicVocabulary::load(path);
        }
        TopicVocabulary::builtin(&self.vocabulary).ok_or_else(|| {
            ChatlensError::invalid_vocabulary(format!(
                "unknown built-in vocabulary '{}'. Expected one of: news-v1, news-v2",
                self.vocabulary
            ))
        })
    }
}

/// Configuration for charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizeConfig {
    /// CSV produced by a previous run (default: `Output/output.csv`)
    pub input: PathBuf,

    /// Directory charts are written to (default: `Output`)
    pub output_dir: PathBuf,

    /// Chart width in pixels
    pub width: u32,

    /// Chart height in pixels
    pub height: u32,

    /// Group the general timeline by month instead of by day
    pub monthly: bool,
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_OUTPUT),
            output_dir: PathBuf::from(DEFAULT_CHART_DIR),
            width: 1200,
            height: 600,
            monthly: false,
        }
    }
}

impl VisualizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = path.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_monthly(mut self, monthly: bool) -> Self {
        self.monthly = monthly;
        self
    }
}

/// Classifier backend selection.
///
/// In JSON the variant is chosen by `kind`:
///
/// ```json
/// {"kind": "lexicon", "lexicon": "my_words.json"}
/// {"kind": "http", "sentiment_url": "https://...", "topic_url": "https://..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[non_exhaustive]
pub enum BackendConfig {
    /// Offline keyword scoring, with an optional custom lexicon file
    Lexicon {
        #[serde(default)]
        lexicon: Option<PathBuf>,
    },

    /// Hosted inference endpoints
    #[cfg(feature = "http-backend")]
    Http(HttpConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Lexicon { lexicon: None }
    }
}

impl BackendConfig {
    /// Returns the backend name as accepted by `--backend`.
    pub fn name(&self) -> &'static str {
        match self {
            BackendConfig::Lexicon { .. } => "lexicon",
            #[cfg(feature = "http-backend")]
            BackendConfig::Http(_) => "http",
        }
    }

    /// Instantiates the configured backend.
    pub fn build(&self) -> Result<Box<dyn ClassifierBackend>> {
        match self {
            BackendConfig::Lexicon { lexicon: None } => Ok(Box::new(LexiconBackend::default())),
            BackendConfig::Lexicon {
                lexicon: Some(path),
            } => Ok(Box::new(LexiconBackend::from_file(path)?)),
            #[cfg(feature = "http-backend")]
            BackendConfig::Http(config) => Ok(Box::new(
                crate::classify::http::HttpBackend::new(config.clone())?,
            )),
        }
    }
}

/// Full application configuration, as loaded by `--config`.
///
/// Every section is optional in the file.
///
/// ```rust
/// use chatlens::config::AppConfig;
///
/// let config: AppConfig = serde_json::from_str(r#"{
///     "extract": {"restriction": -1},
///     "analysis": {"sensitive_topic": true}
/// }"#).unwrap();
///
/// assert_eq!(config.extract.restriction, -1);
/// assert_eq!(config.output.delimiter, '|');
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned for `*.html` exports (default: `Data`)
    pub data_dir: Option<PathBuf>,
    pub extract: ExtractConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub visualize: VisualizeConfig,
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InputNotFound`] if the file does not exist and
    /// [`ChatlensError::Json`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChatlensError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The data directory, falling back to `Data`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

/// Configuration of the CSV output.
///
/// # Example
///
/// ```rust
/// use chatlens::config::OutputConfig;
///
/// let config = OutputConfig::new().with_delimiter(';').with_path("out/table.csv");
/// assert_eq!(config.delimiter_byte().unwrap(), b';');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV destination (default: `Output/output.csv`)
    pub path: PathBuf,

    /// Column separator (default: `|`)
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The separator as the single byte the CSV codec needs.
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(self.delimiter)
    }
}

/// Validates a CSV separator.
///
/// # Errors
///
/// Returns [`ChatlensError::InvalidDelimiter`] unless `c` is a single ASCII
/// character other than a quote or line break.
pub fn delimiter_byte(c: char) -> Result<u8> {
    if !c.is_ascii() || matches!(c, '"' | '\n' | '\r') {
        return Err(ChatlensError::InvalidDelimiter {
            input: c.to_string(),
        });
    }
    Ok(c as u8)
}

/// Parses a separator given on the command line.
pub fn parse_delimiter(input: &str) -> Result<char> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            delimiter_byte(c)?;
            Ok(c)
        }
        _ => Err(ChatlensError::InvalidDelimiter {
            input: input.to_string(),
        }),
    }
}
