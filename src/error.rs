//! Unified error types for chatlens.
//!
//! This module provides a single [`ChatlensError`] enum that covers every
//! failure the library can report, from a missing data directory to a
//! classifier stage that could not be loaded.
//!
//! # Error Handling Philosophy
//!
//! - **Record-level** problems (a service message, a malformed date) never
//!   surface here: the extractor skips the block and logs it.
//! - **Stage-level** problems ([`ModelUnavailable`](ChatlensError::ModelUnavailable),
//!   [`Classification`](ChatlensError::Classification)) abort the run, so a
//!   half-classified table is never written.
//! - **Configuration** problems are reported before any record is processed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::classify::StageKind;

/// A specialized [`Result`] type for chatlens operations.
///
/// # Example
///
/// ```rust
/// use chatlens::error::Result;
/// use chatlens::MessageRecord;
///
/// fn my_function() -> Result<Vec<MessageRecord>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatlensError>;

/// The error type for all chatlens operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatlensError {
    /// An I/O error occurred.
    ///
    /// This typically happens when an input file cannot be read or the
    /// output directory is not writable.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The configured data directory does not exist.
    #[error("Data directory not found: {}", path.display())]
    DataDirNotFound {
        /// The directory that was searched
        path: PathBuf,
    },

    /// A required input file (e.g. the CSV for `visualize`) does not exist.
    #[error("Input file not found: {}", path.display())]
    InputNotFound {
        /// The missing file
        path: PathBuf,
    },

    /// A CSS selector in the extractor configuration could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector as written in the configuration
        selector: String,
        /// Parser diagnostic
        message: String,
    },

    /// A message restriction other than the `-1` sentinel was negative.
    #[error("Invalid message restriction {value}. Expected -1 (no limit) or a non-negative count")]
    InvalidRestriction {
        /// The rejected value
        value: i64,
    },

    /// The CSV column separator is not a single ASCII character.
    #[error("Invalid separator '{input}'. Expected a single ASCII character")]
    InvalidDelimiter {
        /// The rejected separator
        input: String,
    },

    /// Invalid date format in filter configuration.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// The sensitive-topic lookup table file does not exist.
    #[error("Sensitive topic table not found: {}", path.display())]
    MissingTopicTable {
        /// Where the table was expected
        path: PathBuf,
    },

    /// The sensitive-topic lookup table exists but is unusable.
    #[error("Invalid sensitive topic table {}: {message}", path.display())]
    InvalidTopicTable {
        /// The table file
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// A topic vocabulary is empty, has blank labels, or has duplicates.
    #[error("Invalid topic vocabulary: {message}")]
    InvalidVocabulary {
        /// What is wrong with it
        message: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// A classifier stage could not acquire its model resources.
    #[error("{stage} model unavailable: {message}")]
    ModelUnavailable {
        /// The stage that failed to load
        stage: StageKind,
        /// Backend diagnostic
        message: String,
    },

    /// A classifier failed on a record, or returned a label outside the
    /// stage's closed vocabulary.
    #[error("{stage} classification failed: {message}")]
    Classification {
        /// The stage that was running
        stage: StageKind,
        /// Backend diagnostic
        message: String,
    },

    /// A stage produced a column whose length differs from the row count.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    NonRectangular {
        /// Column header
        column: &'static str,
        /// Number of rows in the table
        expected: usize,
        /// Number of values actually present
        actual: usize,
    },

    /// A chart could not be drawn.
    #[error("Failed to render {chart}: {message}")]
    Render {
        /// Chart file name
        chart: String,
        /// Drawing backend diagnostic
        message: String,
    },

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatlensError {
    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatlensError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates an invalid configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ChatlensError::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid vocabulary error.
    pub fn invalid_vocabulary(message: impl Into<String>) -> Self {
        ChatlensError::InvalidVocabulary {
            message: message.into(),
        }
    }

    /// Creates a model-unavailable error for `stage`.
    pub fn model_unavailable(stage: StageKind, message: impl Into<String>) -> Self {
        ChatlensError::ModelUnavailable {
            stage,
            message: message.into(),
        }
    }

    /// Creates a classification error for `stage`.
    pub fn classification(stage: StageKind, message: impl Into<String>) -> Self {
        ChatlensError::Classification {
            stage,
            message: message.into(),
        }
    }

    /// Creates a render error for the chart written to `chart`.
    pub fn render(chart: impl Into<String>, message: impl ToString) -> Self {
        ChatlensError::Render {
            chart: chart.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatlensError::Io(_))
    }

    /// Returns `true` if the error aborted a classifier stage.
    pub fn is_stage_failure(&self) -> bool {
        matches!(
            self,
            ChatlensError::ModelUnavailable { .. } | ChatlensError::Classification { .. }
        )
    }

    /// Returns `true` for configuration problems detected before processing.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ChatlensError::Config { .. }
                | ChatlensError::MissingTopicTable { .. }
                | ChatlensError::InvalidTopicTable { .. }
                | ChatlensError::InvalidVocabulary { .. }
                | ChatlensError::InvalidSelector { .. }
                | ChatlensError::InvalidRestriction { .. }
                | ChatlensError::InvalidDelimiter { .. }
        )
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ChatlensError::InvalidDate { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
