//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Cli`] - top-level arguments (verbosity and subcommand)
//! - [`RunArgs`] - extraction and classification of HTML exports
//! - [`VisualizeArgs`] - charts of a previously written table
//! - [`BackendKind`] - classifier backend selection
//!
//! Flags of the form `--re`, `--gt`, `--tdt` are kept as aliases of the
//! longer spelled-out names.
//!
//! # Example
//!
//! ```rust
//! use chatlens::cli::{Cli, Command};
//! use chatlens::visualize::ChartKind;
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["chatlens", "visualize", "--gt", "--tt", "Economy"]);
//! let Command::Visualize(args) = cli.command else { unreachable!() };
//! assert_eq!(
//!     args.chart_kinds(),
//!     vec![ChartKind::GeneralTimeline, ChartKind::TopicTimeline("Economy".into())]
//! );
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::parse_delimiter;
use crate::visualize::ChartKind;

/// Sentiment and topic analysis of Telegram channel HTML exports.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatlens")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatlens run
    chatlens run --data-dir exports --re -1 -o Output/all.csv
    chatlens run --html messages.html messages2.html --sensitive
    chatlens visualize --gt --gh --tdt
    chatlens visualize --tt Economy --th Economy --json")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log filter implied by `-v` / `-q` when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract messages, classify them and write the result table
    Run(RunArgs),

    /// Draw charts of a result table
    Visualize(VisualizeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory scanned for *.html exports [default: Data]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Explicit export files (overrides --data-dir)
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub html: Vec<PathBuf>,

    /// Path of the CSV table [default: Output/output.csv]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// CSV separator [default: |]
    #[arg(long, value_name = "CHAR", value_parser = parse_separator)]
    pub sep: Option<char>,

    /// Messages kept, -1 for all [default: 25]
    #[arg(
        long = "restrict",
        visible_alias = "re",
        value_name = "N",
        allow_negative_numbers = true
    )]
    pub restrict: Option<i64>,

    /// Keep only rows whose topic contains this text (case-insensitive)
    #[arg(long, value_name = "QUERY")]
    pub topic: Option<String>,

    /// Keep only rows on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Keep only rows on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Run the sensitive-topic stage
    #[arg(long)]
    pub sensitive: bool,

    /// id -> label table of the sensitive-topic stage [default: id2topic.json]
    #[arg(long, value_name = "PATH")]
    pub topic_table: Option<PathBuf>,

    /// Topic vocabulary: a built-in name (news-v1, news-v2) or a JSON file
    #[arg(long, value_name = "PATH")]
    pub vocabulary: Option<String>,

    /// Classifier backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Custom lexicon for the lexicon backend
    #[arg(long, value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VisualizeArgs {
    /// CSV table written by `run` [default: Output/output.csv]
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// CSV separator [default: |]
    #[arg(long, value_name = "CHAR", value_parser = parse_separator)]
    pub sep: Option<char>,

    /// Directory charts are written to [default: Output]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Daily sentiment timeline
    #[arg(long = "general-timeline", visible_alias = "gt")]
    pub general_timeline: bool,

    /// Topic of every message over time
    #[arg(long = "topic-dynamics", visible_alias = "tdt")]
    pub topic_dynamics: bool,

    /// Sentiment distribution
    #[arg(long = "general-histogram", visible_alias = "gh")]
    pub general_histogram: bool,

    /// Sentiment timeline of one topic (repeatable)
    #[arg(long = "topic-timeline", visible_alias = "tt", value_name = "TOPIC")]
    pub topic_timeline: Vec<String>,

    /// Sentiment distribution of one topic (repeatable)
    #[arg(long = "topic-histogram", visible_alias = "th", value_name = "TOPIC")]
    pub topic_histogram: Vec<String>,

    /// Messages per topic
    #[arg(long = "topic-frequency", visible_alias = "tfh")]
    pub topic_frequency: bool,

    /// Monthly sentiment timeline
    #[arg(long)]
    pub monthly: bool,

    /// Topic vocabulary ordering the topic axes: a built-in name or a JSON file
    #[arg(long, value_name = "PATH")]
    pub vocabulary: Option<String>,

    /// Also write the chart data to charts.json in the output directory
    #[arg(long)]
    pub json: bool,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl VisualizeArgs {
    /// Charts requested on the command line, in a fixed order.
    pub fn chart_kinds(&self) -> Vec<ChartKind> {
        let mut kinds = Vec::new();
        if self.general_timeline {
            kinds.push(ChartKind::GeneralTimeline);
        }
        if self.monthly {
            kinds.push(ChartKind::MonthlyTimeline);
        }
        if self.general_histogram {
            kinds.push(ChartKind::GeneralHistogram);
        }
        if self.topic_dynamics {
            kinds.push(ChartKind::TopicDynamics);
        }
        if self.topic_frequency {
            kinds.push(ChartKind::TopicFrequency);
        }
        kinds.extend(
            self.topic_timeline
                .iter()
                .map(|topic| ChartKind::TopicTimeline(topic.clone())),
        );
        kinds.extend(
            self.topic_histogram
                .iter()
                .map(|topic| ChartKind::TopicHistogram(topic.clone())),
        );
        kinds
    }
}

/// Classifier backends selectable with `--backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Offline keyword scoring
    #[default]
    Lexicon,

    /// Hosted inference endpoints (URLs from --config)
    Http,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Lexicon => write!(f, "lexicon"),
            BackendKind::Http => write!(f, "http"),
        }
    }
}

fn parse_separator(input: &str) -> Result<char, String> {
    parse_delimiter(input).map_err(|e| e.to_string())
}
