//! # Chatlens
//!
//! A Rust library for sentiment, topic and sensitive-topic analysis of
//! Telegram channel HTML exports.
//!
//! ## Overview
//!
//! Chatlens reads the `messages*.html` files written by Telegram Desktop,
//! extracts every well-formed post as a dated [`MessageRecord`], and runs the
//! records through a sequence of classifier stages:
//!
//! 1. **Sentiment** - `Neutral`, `Positive` or `Negative`
//! 2. **Topic** - one label of a [`TopicVocabulary`](classify::TopicVocabulary)
//! 3. **Sensitive topic** (optional) - a label of an `id2topic.json` table
//!
//! Only one stage's classifier is alive at a time. The results form a
//! rectangular [`ResultTable`](core::ResultTable) that can be filtered,
//! written to CSV and charted.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatlens::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let paths = discover_documents(Path::new("Data"))?;
//!     let records = TelegramHtmlExtractor::new().extract_files(&paths, Restriction::First(25))?;
//!
//!     let backend = LexiconBackend::default();
//!     let stages = build_stages(&AnalysisConfig::default())?;
//!     let records = Orchestrator::new(&backend).run(records, &stages)?;
//!
//!     let table = ResultTable::from_records(&records)?;
//!     write_table(&filter_by_topic(&table, "econ"), &OutputConfig::new())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - the [`MessageExtractor`](parser::MessageExtractor) trait,
//!   [`Restriction`](parser::Restriction) and document discovery
//! - [`parsers`] - [`TelegramHtmlExtractor`](parsers::TelegramHtmlExtractor)
//! - [`classify`] - classifier stages, backends and vocabularies
//! - [`core`] - orchestration, the result table, filters and writers
//! - [`visualize`] - chart aggregations and rendering
//! - [`config`] - configuration sections and the `--config` file
//! - [`progress`] - per-stage progress reporting
//! - [`cli`] - CLI types (feature `cli`)
//! - [`error`] - unified error type ([`ChatlensError`], [`Result`])
//! - [`prelude`] - convenient re-exports

pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod message;
pub mod parser;
pub mod parsers;
pub mod progress;
pub mod visualize;

// Re-export the main types at the crate root for convenience
pub use error::{ChatlensError, Result};
pub use message::{MessageRecord, Sentiment};

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatlens::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::{MessageRecord, Sentiment};

    // Error types
    pub use crate::error::{ChatlensError, Result};

    // Extraction
    pub use crate::parser::{MessageExtractor, RawDocument, Restriction, discover_documents};
    pub use crate::parsers::TelegramHtmlExtractor;

    // Classification
    pub use crate::classify::{
        Classifier, ClassifierBackend, LexiconBackend, Prediction, SensitiveTopicTable, Stage,
        StageKind, TopicVocabulary,
    };

    // Configuration
    pub use crate::config::{AnalysisConfig, AppConfig, ExtractConfig, OutputConfig};

    // Processing
    pub use crate::core::{
        Orchestrator, ResultTable, TableFilter, TableRow, build_stages, filter_by_topic,
        read_table, to_csv, write_table,
    };

    // Charts
    pub use crate::visualize::{ChartKind, ChartOutcome, ChartRenderer, Visualizer};
    #[cfg(feature = "charts")]
    pub use crate::visualize::SvgRenderer;
}
