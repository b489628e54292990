//! Progress reporting for classifier stages.
//!
//! This module provides a callback-based progress mechanism for library
//! users who want push-based updates while the orchestrator works through
//! the record set.
//!
//! # Example
//!
//! ```rust
//! use chatlens::classify::StageKind;
//! use chatlens::progress::{ProgressCallback, StageProgress};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     println!("{}: {:.1}%", progress.stage, progress.percentage());
//! });
//!
//! for i in 0..10usize {
//!     callback(StageProgress::new(StageKind::Sentiment, i + 1, 10));
//! }
//! ```

use std::sync::Arc;

use crate::classify::StageKind;

/// Progress of one classifier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageProgress {
    /// Stage being run
    pub stage: StageKind,

    /// Records classified so far
    pub processed: usize,

    /// Records in the run
    pub total: usize,
}

impl StageProgress {
    pub fn new(stage: StageKind, processed: usize, total: usize) -> Self {
        Self {
            stage,
            processed,
            total,
        }
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// ```rust
    /// use chatlens::classify::StageKind;
    /// use chatlens::progress::StageProgress;
    ///
    /// assert_eq!(StageProgress::new(StageKind::Topic, 5, 20).percentage(), 25.0);
    /// assert_eq!(StageProgress::new(StageKind::Topic, 0, 0).percentage(), 100.0);
    /// ```
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64) * 100.0
        }
    }

    /// Returns whether every record of the stage has been classified.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Callback invoked after each classified record.
///
/// The callback is `Send + Sync` so it can be shared with a progress bar
/// or a UI thread.
pub type ProgressCallback = Arc<dyn Fn(StageProgress) + Send + Sync>;
