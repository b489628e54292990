//! Telegram Desktop HTML export extractor.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::MessageRecord;
use crate::config::ExtractConfig;
use crate::error::{ChatlensError, Result};
use crate::parser::MessageExtractor;

/// Extractor for Telegram Desktop HTML exports (`messages.html`,
/// `messages2.html`, ...).
///
/// Telegram writes every post as a block like:
/// ```html
/// <div class="body">
///   <div class="pull_right date details" title="15.03.2024 10:30:00 UTC+03:00">10:30</div>
///   <div class="from_name">Channel</div>
///   <div class="text">Message text<br>second line</div>
/// </div>
/// ```
///
/// Only `div` elements whose class list is exactly `body` are considered;
/// `body details` blocks hold service notices (date separators, joins) and
/// are skipped, as are blocks without a text sub-block (media-only posts).
/// The date sub-block must likewise carry exactly `pull_right date details`.
pub struct TelegramHtmlExtractor {
    body: Selector,
    body_classes: Vec<String>,
    text: Selector,
    date: Selector,
    date_classes: Vec<String>,
}

impl TelegramHtmlExtractor {
    /// Creates an extractor with the default Telegram selectors.
    pub fn new() -> Self {
        // The default selectors are static and known to parse.
        Self::with_config(&ExtractConfig::default())
            .unwrap_or_else(|e| unreachable!("default selectors are valid: {}", e))
    }

    /// Creates an extractor with custom selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::InvalidSelector`] if a selector does not parse.
    pub fn with_config(config: &ExtractConfig) -> Result<Self> {
        let mut body_classes = config.body_classes.clone();
        body_classes.sort();
        let mut date_classes = config.date_classes.clone();
        date_classes.sort();
        Ok(Self {
            body: parse_selector(&config.body_selector)?,
            body_classes,
            text: parse_selector(&config.text_selector)?,
            date: parse_selector(&config.date_selector)?,
            date_classes,
        })
    }

    fn is_message_body(&self, block: &ElementRef<'_>) -> bool {
        has_exact_classes(block, &self.body_classes)
    }

    fn is_date(&self, element: &ElementRef<'_>) -> bool {
        self.date_classes.is_empty() || has_exact_classes(element, &self.date_classes)
    }

    fn extract_block(&self, block: ElementRef<'_>) -> Option<MessageRecord> {
        let Some(text_block) = block.select(&self.text).next() else {
            debug!("skipping block without text");
            return None;
        };
        let text: String = text_block.text().collect();

        let Some(title) = block
            .select(&self.date)
            .find(|d| self.is_date(d))
            .and_then(|d| d.value().attr("title"))
        else {
            debug!("skipping block without date title");
            return None;
        };

        let record = MessageRecord::from_export(&text, title);
        if record.is_none() {
            debug!(title, "skipping block with empty text or malformed date");
        }
        record
    }
}

impl Default for TelegramHtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageExtractor for TelegramHtmlExtractor {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    fn extract_document(&self, html: &str) -> Vec<MessageRecord> {
        let document = Html::parse_document(html);
        document
            .select(&self.body)
            .filter(|block| self.is_message_body(block))
            .filter_map(|block| self.extract_block(block))
            .collect()
    }
}

/// Returns `true` if the element's class list equals `expected` (sorted).
fn has_exact_classes(element: &ElementRef<'_>, expected: &[String]) -> bool {
    let mut classes: Vec<&str> = element.value().classes().collect();
    classes.sort_unstable();
    classes.len() == expected.len()
        && classes
            .iter()
            .zip(expected)
            .all(|(a, b)| *a == b.as_str())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ChatlensError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
