//! CSV output writer and reader.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::warn;

use crate::config::{OutputConfig, delimiter_byte};
use crate::core::table::{COL_DATE, COL_LABEL, COL_SENSITIVE, COL_SENTIMENT, ResultTable};
use crate::error::{ChatlensError, Result};
use crate::message::{DATE_FORMAT, Sentiment, parse_record_date};

/// Writes a table to CSV, creating parent directories as needed.
///
/// # Format
/// - Delimiter: from `config` (default `|`)
/// - Columns: `Date`, `Semantic Tag`, `Label`, and `Sensitive Topic` when
///   the table has it
/// - Dates: `DD/MM/YYYY`
/// - No index column
/// - Encoding: UTF-8
pub fn write_table(table: &ResultTable, config: &OutputConfig) -> Result<()> {
    let delimiter = config.delimiter_byte()?;
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(&config.path)?;
    write_to(table, file, delimiter)
}

/// Renders a table as a CSV string.
pub fn to_csv(table: &ResultTable, delimiter: char) -> Result<String> {
    let mut buffer = Vec::new();
    write_to(table, &mut buffer, delimiter_byte(delimiter)?)?;
    String::from_utf8(buffer).map_err(|e| ChatlensError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn write_to<W: io::Write>(table: &ResultTable, out: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);

    writer.write_record(table.headers())?;
    for index in 0..table.len() {
        writer.write_record(build_record(table, index))?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV record for row `index`, one cell per present column.
fn build_record(table: &ResultTable, index: usize) -> Vec<String> {
    let mut record = Vec::with_capacity(4);
    if let Some(date) = table.dates().get(index) {
        record.push(date.format(DATE_FORMAT).to_string());
    }
    if let Some(sentiment) = table.sentiments().get(index) {
        record.push(sentiment.to_string());
    }
    if let Some(label) = table.labels().get(index) {
        record.push(label.clone());
    }
    if let Some(sensitive) = table.sensitive_topics().and_then(|column| column.get(index)) {
        record.push(sensitive.clone());
    }
    record
}

/// Loads a table written by [`write_table`].
///
/// Columns are found by header name; unknown columns (such as an index
/// column written by other tools) are ignored. A known column missing from
/// the header is logged and left out of the table, so charts that do not
/// need it can still be drawn.
///
/// # Errors
///
/// - [`ChatlensError::InputNotFound`] if `path` does not exist
/// - [`ChatlensError::InvalidDate`] / [`ChatlensError::Config`] for
///   malformed cells
pub fn read_table(path: &Path, delimiter: char) -> Result<ResultTable> {
    if !path.exists() {
        return Err(ChatlensError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| headers.iter().position(|h| h.trim() == name);
    let date_col = column(COL_DATE);
    let sentiment_col = column(COL_SENTIMENT);
    let label_col = column(COL_LABEL);
    let sensitive_col = column(COL_SENSITIVE);
    for (name, col) in [
        (COL_DATE, date_col),
        (COL_SENTIMENT, sentiment_col),
        (COL_LABEL, label_col),
    ] {
        if col.is_none() {
            warn!(column = name, path = %path.display(), "column missing from input");
        }
    }

    let mut dates = date_col.map(|_| Vec::new());
    let mut sentiments = sentiment_col.map(|_| Vec::new());
    let mut labels = label_col.map(|_| Vec::new());
    let mut sensitive_topics = sensitive_col.map(|_| Vec::new());
    let mut len = 0;
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |col: usize| record.get(col).unwrap_or_default();

        if let (Some(col), Some(column)) = (date_col, dates.as_mut()) {
            let date = parse_record_date(cell(col)).ok_or_else(|| ChatlensError::InvalidDate {
                input: cell(col).to_string(),
                expected: "DD/MM/YYYY",
            })?;
            column.push(date);
        }
        if let (Some(col), Some(column)) = (sentiment_col, sentiments.as_mut()) {
            let sentiment: Sentiment = cell(col).parse().map_err(|e| {
                ChatlensError::config(format!("{}: row {}: {}", path.display(), index + 1, e))
            })?;
            column.push(sentiment);
        }
        if let (Some(col), Some(column)) = (label_col, labels.as_mut()) {
            column.push(cell(col).to_string());
        }
        if let (Some(col), Some(column)) = (sensitive_col, sensitive_topics.as_mut()) {
            column.push(cell(col).to_string());
        }
        len += 1;
    }
    ResultTable::from_columns(len, dates, sentiments, labels, sensitive_topics)
}
