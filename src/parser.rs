//! Message extraction seam.
//!
//! This module provides the [`MessageExtractor`] trait, the [`Restriction`]
//! applied to extracted records, and [`discover_documents`] for locating
//! export files in a data directory.
//!
//! # Example
//!
//! ```rust
//! use chatlens::parser::{MessageExtractor, RawDocument, Restriction};
//! use chatlens::parsers::TelegramHtmlExtractor;
//!
//! let html = r#"
//!     <div class="body">
//!         <div class="pull_right date details" title="15.03.2024 10:30:00">10:30</div>
//!         <div class="text">Markets rally</div>
//!     </div>
//! "#;
//!
//! let extractor = TelegramHtmlExtractor::new();
//! let documents = vec![RawDocument::new("messages.html", html)];
//! let records = extractor.extract(&documents, Restriction::Unlimited);
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].date_string(), "15/03/2024");
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::MessageRecord;
use crate::error::{ChatlensError, Result};

/// Limit on the number of records kept after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Restriction {
    /// Keep every record
    #[default]
    Unlimited,
    /// Keep the first N records in encounter order
    First(usize),
}

impl Restriction {
    /// The command-line sentinel meaning "no limit".
    pub const NO_LIMIT: i64 = -1;

    /// Converts the integer given on the command line.
    ///
    /// ```
    /// use chatlens::parser::Restriction;
    ///
    /// assert_eq!(Restriction::from_cli(-1).unwrap(), Restriction::Unlimited);
    /// assert_eq!(Restriction::from_cli(25).unwrap(), Restriction::First(25));
    /// assert!(Restriction::from_cli(-2).is_err());
    /// ```
    pub fn from_cli(value: i64) -> Result<Self> {
        match value {
            Self::NO_LIMIT => Ok(Restriction::Unlimited),
            n if n >= 0 => usize::try_from(n)
                .map(Restriction::First)
                .map_err(|_| ChatlensError::InvalidRestriction { value }),
            _ => Err(ChatlensError::InvalidRestriction { value }),
        }
    }

    /// Truncates `records` in place.
    pub fn apply<T>(self, records: &mut Vec<T>) {
        if let Restriction::First(n) = self {
            records.truncate(n);
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Restriction::Unlimited => write!(f, "all"),
            Restriction::First(n) => write!(f, "first {}", n),
        }
    }
}

/// Content of one export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Where the content came from, for logs
    pub source: String,
    /// Raw markup
    pub content: String,
}

impl RawDocument {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// Reads a document from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

/// Extracts message records from exported documents.
///
/// # Implementation Notes
///
/// Extractors must implement:
/// - [`name`](MessageExtractor::name) - Extractor identifier
/// - [`extract_document`](MessageExtractor::extract_document) - Records of one document
///
/// Malformed blocks are skipped, never reported as errors. The provided
/// methods accumulate records across documents in order and apply the
/// restriction last.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl MessageExtractor for MyExtractor {
///     fn name(&self) -> &'static str { "MyExtractor" }
///
///     fn extract_document(&self, html: &str) -> Vec<MessageRecord> {
///         // Walk the markup here
///         vec![]
///     }
/// }
/// ```
pub trait MessageExtractor {
    /// Returns the human-readable name of this extractor.
    fn name(&self) -> &'static str;

    /// Extracts every well-formed record of a single document, in order.
    fn extract_document(&self, html: &str) -> Vec<MessageRecord>;

    /// Extracts records from several documents and applies `limit`.
    fn extract(&self, documents: &[RawDocument], limit: Restriction) -> Vec<MessageRecord> {
        let mut records = Vec::new();
        for document in documents {
            let found = self.extract_document(&document.content);
            debug!(source = %document.source, records = found.len(), "document extracted");
            records.extend(found);
        }
        limit.apply(&mut records);
        records
    }

    /// Reads and extracts the given files.
    ///
    /// A path that does not exist is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::Io`] for read failures other than a missing
    /// file.
    fn extract_files(&self, paths: &[PathBuf], limit: Restriction) -> Result<Vec<MessageRecord>> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match RawDocument::read(path) {
                Ok(document) => documents.push(document),
                Err(ChatlensError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "input file not found, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        let records = self.extract(&documents, limit);
        info!(
            extractor = self.name(),
            documents = documents.len(),
            records = records.len(),
            "extraction finished"
        );
        Ok(records)
    }
}

/// Lists the `*.html` files of `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`ChatlensError::DataDirNotFound`] if `dir` is not a directory.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ChatlensError::DataDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        if is_html && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if paths.is_empty() {
        warn!(dir = %dir.display(), "no HTML documents found");
    }
    Ok(paths)
}
