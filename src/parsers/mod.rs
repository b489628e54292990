//! Chat export extractors.
//!
//! Each extractor implements [`MessageExtractor`](crate::parser::MessageExtractor).
//!
//! # Available Extractors
//!
//! - [`TelegramHtmlExtractor`] - Parses Telegram Desktop HTML exports
//!
//! # Example
//!
//! ```rust
//! use chatlens::config::ExtractConfig;
//! use chatlens::parsers::TelegramHtmlExtractor;
//!
//! let config = ExtractConfig::new().with_text_selector("div.text");
//! let extractor = TelegramHtmlExtractor::with_config(&config)?;
//! # Ok::<(), chatlens::ChatlensError>(())
//! ```

mod telegram;

pub use telegram::TelegramHtmlExtractor;
