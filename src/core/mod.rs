//! Core processing logic for chatlens.
//!
//! This module contains:
//! - [`table`] - the analysed result table
//! - [`processor`] - stage-by-stage classification of records
//! - [`filter`] - topic and date filters over a table
//! - [`output`] - CSV and JSON writers
//!
//! # Quick Start
//!
//! ```rust
//! use chatlens::core::{
//!     Orchestrator, ResultTable, TableFilter, build_stages,
//!     filter_by_topic, read_table, to_csv, write_table,
//! };
//! ```

pub mod filter;
pub mod output;
pub mod processor;
pub mod table;

// Re-export main types for convenience
pub use filter::{TableFilter, filter_by_topic};
pub use output::{read_table, to_aggregations_json, to_csv, write_aggregations_json, write_table};
pub use processor::{Orchestrator, StageReport, build_stages};
pub use table::{ResultTable, TableRow};
