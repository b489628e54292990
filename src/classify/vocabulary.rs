//! Closed label sets for the topic and sensitive-topic stages.
//!
//! Both are configuration, not code: the topic stage and the visualizer read
//! the same [`TopicVocabulary`], so the two cannot drift apart, and the
//! sensitive-topic labels come from an external `id -> label` JSON table.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChatlensError, Result};

/// Versioned list of topic labels.
///
/// Order matters: it is the candidate order handed to zero-shot models,
/// the tie-break order of the lexicon backend, and the axis order of topic
/// charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicVocabulary {
    /// Identifier of this label set, e.g. `news-v1`
    pub version: String,
    /// Candidate labels
    pub labels: Vec<String>,
}

impl TopicVocabulary {
    /// Creates a validated vocabulary.
    pub fn new<I, S>(version: impl Into<String>, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary = Self {
            version: version.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        };
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// The news vocabulary used by default.
    pub fn news() -> Self {
        Self {
            version: "news-v1".to_string(),
            labels: [
                "Politics",
                "Economy",
                "Technology",
                "Sports",
                "Health",
                "Entertainment",
                "Science",
                "Environment",
                "World News",
                "Local News",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    /// Variant with `Sport` and an extra `Culture` label.
    pub fn news_v2() -> Self {
        Self {
            version: "news-v2".to_string(),
            labels: [
                "Politics",
                "Economy",
                "Technology",
                "Sport",
                "Culture",
                "Health",
                "Entertainment",
                "Science",
                "Environment",
                "World News",
                "Local News",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    /// Returns a built-in vocabulary by version name.
    pub fn builtin(version: &str) -> Option<Self> {
        match version {
            "news-v1" => Some(Self::news()),
            "news-v2" => Some(Self::news_v2()),
            _ => None,
        }
    }

    /// Loads a vocabulary from a JSON file of the form
    /// `{"version": "...", "labels": ["...", ...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let vocabulary: Self = serde_json::from_str(&content)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Checks that the vocabulary is non-empty, has no blank labels and no
    /// case-insensitive duplicates.
    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(ChatlensError::invalid_vocabulary(format!(
                "'{}' has no labels",
                self.version
            )));
        }
        let mut seen = HashSet::new();
        for label in &self.labels {
            if label.trim().is_empty() {
                return Err(ChatlensError::invalid_vocabulary(format!(
                    "'{}' contains a blank label",
                    self.version
                )));
            }
            if !seen.insert(label.to_lowercase()) {
                return Err(ChatlensError::invalid_vocabulary(format!(
                    "'{}' lists '{}' more than once",
                    self.version, label
                )));
            }
        }
        Ok(())
    }

    /// Returns `true` if `label` is one of the labels (exact match).
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Returns the position of `label` (exact match).
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for TopicVocabulary {
    fn default() -> Self {
        Self::news()
    }
}

/// `id -> label` mapping of a sensitive-topic model's output classes.
///
/// On disk this is a JSON object with stringified integer keys:
///
/// ```json
/// {"0": "none", "1": "gambling", "2": "pornography"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensitiveTopicTable {
    labels: BTreeMap<usize, String>,
}

impl SensitiveTopicTable {
    /// Loads the table, failing eagerly if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ChatlensError::MissingTopicTable {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let invalid = |message: String| ChatlensError::InvalidTopicTable {
            path: path.to_path_buf(),
            message,
        };

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        let mut labels = BTreeMap::new();
        for (key, label) in raw {
            let id = key
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(format!("key '{}' is not a class index", key)))?;
            labels.insert(id, label);
        }
        if labels.is_empty() {
            return Err(invalid("table is empty".to_string()));
        }
        Ok(Self { labels })
    }

    /// Builds a table from `(id, label)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let labels: BTreeMap<usize, String> =
            pairs.into_iter().map(|(id, l)| (id, l.into())).collect();
        if labels.is_empty() {
            return Err(ChatlensError::config("sensitive topic table is empty"));
        }
        Ok(Self { labels })
    }

    /// Label of class `id`.
    pub fn label_for(&self, id: usize) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.values().any(|l| l == label)
    }

    /// Class ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels.keys().copied()
    }

    /// The lowest class id, conventionally the "no sensitive topic" class.
    pub fn first_id(&self) -> Option<usize> {
        self.labels.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
