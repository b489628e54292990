//! Column-oriented result table.
//!
//! [`ResultTable`] is what the analysis produces and what filtering, CSV
//! export and charts consume. Every column has exactly one value per row;
//! the constructors refuse to build anything else.
//!
//! A table loaded back from CSV may lack some columns. Accessors of an
//! absent column return an empty slice; [`ResultTable::missing_column`]
//! tells charts which of their inputs are not there.
//!
//! # Columns
//!
//! | Header | Type | Source |
//! |--------|------|--------|
//! | `Date` | `NaiveDate` | extraction |
//! | `Semantic Tag` | [`Sentiment`] | sentiment stage |
//! | `Label` | `String` | topic stage |
//! | `Sensitive Topic` | `String` (optional column) | sensitive-topic stage |

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ChatlensError, Result};
use crate::message::{MessageRecord, Sentiment};

/// Header of the date column.
pub const COL_DATE: &str = "Date";
/// Header of the sentiment column.
pub const COL_SENTIMENT: &str = "Semantic Tag";
/// Header of the topic column.
pub const COL_LABEL: &str = "Label";
/// Header of the optional sensitive-topic column.
pub const COL_SENSITIVE: &str = "Sensitive Topic";

/// One row of a [`ResultTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub sentiment: Sentiment,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive_topic: Option<String>,
}

impl TableRow {
    pub fn new(date: NaiveDate, sentiment: Sentiment, label: impl Into<String>) -> Self {
        Self {
            date,
            sentiment,
            label: label.into(),
            sensitive_topic: None,
        }
    }

    #[must_use]
    pub fn with_sensitive_topic(mut self, label: impl Into<String>) -> Self {
        self.sensitive_topic = Some(label.into());
        self
    }
}

/// Rectangular analysis result, rows indexed `0..len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    len: usize,
    dates: Option<Vec<NaiveDate>>,
    sentiments: Option<Vec<Sentiment>>,
    labels: Option<Vec<String>>,
    sensitive_topics: Option<Vec<String>>,
}

impl ResultTable {
    /// Builds the table from classified records.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::NonRectangular`] if a record lacks its
    /// sentiment or topic, or if only some records carry a sensitive topic.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatlens::core::table::ResultTable;
    /// use chatlens::{MessageRecord, Sentiment};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let record = MessageRecord::new("Rates cut", date)?
    ///     .with_sentiment(Sentiment::Positive)
    ///     .with_topic("Economy");
    ///
    /// let table = ResultTable::from_records(&[record])?;
    /// assert_eq!(table.headers(), vec!["Date", "Semantic Tag", "Label"]);
    /// assert_eq!(table.labels()[0], "Economy");
    /// # Ok::<(), chatlens::ChatlensError>(())
    /// ```
    pub fn from_records(records: &[MessageRecord]) -> Result<Self> {
        let expected = records.len();
        let sentiments: Vec<Sentiment> = records.iter().filter_map(|r| r.sentiment()).collect();
        check_column(COL_SENTIMENT, expected, sentiments.len())?;

        let labels: Vec<String> = records
            .iter()
            .filter_map(|r| r.topic().map(str::to_string))
            .collect();
        check_column(COL_LABEL, expected, labels.len())?;

        let sensitive: Vec<String> = records
            .iter()
            .filter_map(|r| r.sensitive_topic().map(str::to_string))
            .collect();
        let sensitive_topics = if sensitive.is_empty() {
            None
        } else {
            check_column(COL_SENSITIVE, expected, sensitive.len())?;
            Some(sensitive)
        };

        Ok(Self {
            len: expected,
            dates: Some(records.iter().map(MessageRecord::date).collect()),
            sentiments: Some(sentiments),
            labels: Some(labels),
            sensitive_topics,
        })
    }

    /// Builds the table from rows.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::NonRectangular`] if only some rows carry a
    /// sensitive topic.
    pub fn from_rows(rows: Vec<TableRow>) -> Result<Self> {
        let expected = rows.len();
        let with_sensitive = rows.iter().filter(|r| r.sensitive_topic.is_some()).count();
        if with_sensitive != 0 {
            check_column(COL_SENSITIVE, expected, with_sensitive)?;
        }

        let mut dates = Vec::with_capacity(expected);
        let mut sentiments = Vec::with_capacity(expected);
        let mut labels = Vec::with_capacity(expected);
        let mut sensitive_topics = (with_sensitive != 0).then(|| Vec::with_capacity(expected));
        for row in rows {
            dates.push(row.date);
            sentiments.push(row.sentiment);
            labels.push(row.label);
            if let (Some(column), Some(value)) = (sensitive_topics.as_mut(), row.sensitive_topic) {
                column.push(value);
            }
        }
        Ok(Self {
            len: expected,
            dates: Some(dates),
            sentiments: Some(sentiments),
            labels: Some(labels),
            sensitive_topics,
        })
    }

    /// Builds a table of `len` rows from whichever columns are present.
    ///
    /// Used when loading a table back from CSV, where any column may be
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::NonRectangular`] if a present column does not
    /// hold exactly `len` values.
    pub fn from_columns(
        len: usize,
        dates: Option<Vec<NaiveDate>>,
        sentiments: Option<Vec<Sentiment>>,
        labels: Option<Vec<String>>,
        sensitive_topics: Option<Vec<String>>,
    ) -> Result<Self> {
        if let Some(column) = &dates {
            check_column(COL_DATE, len, column.len())?;
        }
        if let Some(column) = &sentiments {
            check_column(COL_SENTIMENT, len, column.len())?;
        }
        if let Some(column) = &labels {
            check_column(COL_LABEL, len, column.len())?;
        }
        if let Some(column) = &sensitive_topics {
            check_column(COL_SENSITIVE, len, column.len())?;
        }
        Ok(Self {
            len,
            dates,
            sentiments,
            labels,
            sensitive_topics,
        })
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns row `index`, or `None` if out of range or if the table lacks
    /// one of `Date`, `Semantic Tag` and `Label`.
    pub fn row(&self, index: usize) -> Option<TableRow> {
        Some(TableRow {
            date: *self.dates.as_ref()?.get(index)?,
            sentiment: *self.sentiments.as_ref()?.get(index)?,
            label: self.labels.as_ref()?.get(index)?.clone(),
            sensitive_topic: match &self.sensitive_topics {
                Some(column) => Some(column.get(index)?.clone()),
                None => None,
            },
        })
    }

    /// Iterates over the rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = TableRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Headers of the present columns, in output order.
    pub fn headers(&self) -> Vec<&'static str> {
        [COL_DATE, COL_SENTIMENT, COL_LABEL, COL_SENSITIVE]
            .into_iter()
            .filter(|header| self.has_column(header))
            .collect()
    }

    /// Whether the column named `header` is present.
    pub fn has_column(&self, header: &str) -> bool {
        match header {
            COL_DATE => self.dates.is_some(),
            COL_SENTIMENT => self.sentiments.is_some(),
            COL_LABEL => self.labels.is_some(),
            COL_SENSITIVE => self.sensitive_topics.is_some(),
            _ => false,
        }
    }

    /// First header of `required` the table lacks.
    pub fn missing_column(&self, required: &[&'static str]) -> Option<&'static str> {
        required.iter().copied().find(|header| !self.has_column(header))
    }

    pub fn has_sensitive_topics(&self) -> bool {
        self.sensitive_topics.is_some()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.dates.as_deref().unwrap_or_default()
    }

    pub fn sentiments(&self) -> &[Sentiment] {
        self.sentiments.as_deref().unwrap_or_default()
    }

    pub fn labels(&self) -> &[String] {
        self.labels.as_deref().unwrap_or_default()
    }

    pub fn sensitive_topics(&self) -> Option<&[String]> {
        self.sensitive_topics.as_deref()
    }

    /// Returns a new table with the rows matching `predicate`, reindexed
    /// from zero. `self` is left untouched.
    ///
    /// The result has the same columns as `self`. A table without rows (see
    /// [`ResultTable::row`]) matches nothing.
    pub fn filter_rows<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&TableRow) -> bool,
    {
        let keep: Vec<usize> = (0..self.len)
            .filter(|&i| self.row(i).is_some_and(|row| predicate(&row)))
            .collect();
        Self {
            len: keep.len(),
            dates: select(self.dates.as_deref(), &keep),
            sentiments: select(self.sentiments.as_deref(), &keep),
            labels: select(self.labels.as_deref(), &keep),
            sensitive_topics: select(self.sensitive_topics.as_deref(), &keep),
        }
    }

    /// Earliest and latest date, or `None` for an empty table or one
    /// without a `Date` column.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.dates().iter().min()?;
        let max = self.dates().iter().max()?;
        Some((*min, *max))
    }
}

fn select<T: Clone>(column: Option<&[T]>, keep: &[usize]) -> Option<Vec<T>> {
    column.map(|values| keep.iter().map(|&i| values[i].clone()).collect())
}

fn check_column(column: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ChatlensError::NonRectangular {
            column,
            expected,
            actual,
        });
    }
    Ok(())
}
