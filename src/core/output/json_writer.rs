//! JSON export of chart aggregations.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::visualize::AggregationBundle;

/// Writes the aggregations behind the requested charts as pretty JSON,
/// creating parent directories as needed.
///
/// # Format
/// ```json
/// {
///   "general_histogram": {"negative": 1, "neutral": 0, "positive": 3},
///   "missing_topics": ["Sports"]
/// }
/// ```
/// Charts that were not requested are omitted.
pub fn write_aggregations_json(path: &Path, bundle: &AggregationBundle) -> Result<()> {
    let json = to_aggregations_json(bundle)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Same as [`write_aggregations_json`], returned as a string.
pub fn to_aggregations_json(bundle: &AggregationBundle) -> Result<String> {
    Ok(serde_json::to_string_pretty(bundle)?)
}
