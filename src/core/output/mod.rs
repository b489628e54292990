//! Output format writers.
//!
//! - [`write_table`] / [`to_csv`] / [`read_table`] - the analysed table as
//!   delimited text (default delimiter `|`)
//! - [`write_aggregations_json`] / [`to_aggregations_json`] - chart
//!   aggregations as pretty JSON
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> chatlens::Result<()> {
//! use chatlens::config::OutputConfig;
//! use chatlens::core::output::{read_table, write_table};
//!
//! let config = OutputConfig::new().with_path("Output/output.csv");
//! let table = read_table(&config.path, config.delimiter)?;
//! write_table(&table, &config.clone().with_path("Output/copy.csv"))?;
//! # Ok(())
//! # }
//! ```

mod csv_writer;
mod json_writer;

pub use csv_writer::{read_table, to_csv, write_table};
pub use json_writer::{to_aggregations_json, write_aggregations_json};
