//! # chatlens CLI
//!
//! Command-line interface for the chatlens library.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatlens::classify::TopicVocabulary;
#[cfg(feature = "http-backend")]
use chatlens::classify::http::HttpConfig;
use chatlens::cli::{BackendKind, Cli, Command, RunArgs, VisualizeArgs};
use chatlens::config::{AnalysisConfig, AppConfig, BackendConfig};
use chatlens::core::{
    Orchestrator, ResultTable, TableFilter, build_stages, read_table, write_aggregations_json,
    write_table,
};
use chatlens::parser::{MessageExtractor, Restriction, discover_documents};
use chatlens::parsers::TelegramHtmlExtractor;
use chatlens::progress::StageProgress;
use chatlens::visualize::{ChartKind, ChartOutcome, SvgRenderer, Visualizer, collect_aggregations};
use chatlens::{ChatlensError, Result};

/// Name of the aggregation export written by `visualize --json`.
const AGGREGATIONS_FILE: &str = "charts.json";

fn main() {
    let cli = <Cli as ClapParser>::parse();
    init_logging(&cli);

    let result = match &cli.command {
        Command::Run(args) => run(args),
        Command::Visualize(args) => visualize(args),
    };
    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

/// `--vocabulary` takes a built-in name or a file path.
fn apply_vocabulary(analysis: &mut AnalysisConfig, value: &str) {
    if TopicVocabulary::builtin(value).is_some() {
        analysis.vocabulary = value.to_string();
        analysis.vocabulary_path = None;
    } else {
        analysis.vocabulary_path = Some(PathBuf::from(value));
    }
}

fn apply_backend(
    config: &mut AppConfig,
    kind: Option<BackendKind>,
    lexicon: Option<&PathBuf>,
) -> Result<()> {
    match kind {
        Some(BackendKind::Http) => use_http_backend(config)?,
        Some(BackendKind::Lexicon) => {
            config.backend = BackendConfig::Lexicon {
                lexicon: lexicon.cloned(),
            };
        }
        None => {
            if let Some(path) = lexicon {
                config.backend = BackendConfig::Lexicon {
                    lexicon: Some(path.clone()),
                };
            }
        }
    }
    Ok(())
}

/// Keeps an http section from `--config`, otherwise starts from defaults.
#[cfg(feature = "http-backend")]
fn use_http_backend(config: &mut AppConfig) -> Result<()> {
    if !matches!(config.backend, BackendConfig::Http(_)) {
        config.backend = BackendConfig::Http(HttpConfig::default());
    }
    Ok(())
}

#[cfg(not(feature = "http-backend"))]
fn use_http_backend(_config: &mut AppConfig) -> Result<()> {
    Err(ChatlensError::config(
        "the http backend is not available in this build",
    ))
}

// ============================================================================
// run
// ============================================================================

fn run(args: &RunArgs) -> Result<()> {
    let total_start = Instant::now();

    let mut config = load_config(args.config.as_ref())?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(path) = &args.output {
        config.output.path = path.clone();
    }
    if let Some(sep) = args.sep {
        config.output.delimiter = sep;
    }
    if let Some(n) = args.restrict {
        config.extract.restriction = n;
    }
    if args.sensitive {
        config.analysis.sensitive_topic = true;
    }
    if let Some(path) = &args.topic_table {
        config.analysis.topic_table = path.clone();
    }
    if let Some(vocabulary) = &args.vocabulary {
        apply_vocabulary(&mut config.analysis, vocabulary);
    }
    apply_backend(&mut config, args.backend, args.lexicon.as_ref())?;

    // Validate everything before touching the inputs
    let restriction = Restriction::from_cli(config.extract.restriction)?;
    config.output.delimiter_byte()?;
    let mut filter = TableFilter::new();
    if let Some(topic) = &args.topic {
        filter = filter.with_topic(topic.clone());
    }
    if let Some(from) = &args.from {
        filter = filter.with_date_from(from)?;
    }
    if let Some(to) = &args.to {
        filter = filter.with_date_to(to)?;
    }
    let stages = build_stages(&config.analysis)?;
    let backend = config.backend.build()?;
    let extractor = TelegramHtmlExtractor::with_config(&config.extract)?;

    let paths = if args.html.is_empty() {
        discover_documents(&config.data_dir())?
    } else {
        args.html.clone()
    };

    println!("🔎 chatlens v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Inputs:   {} file(s)", paths.len());
    println!("✂️  Limit:    {}", restriction);
    println!("🧠 Backend:  {}", backend.name());
    println!("💾 Output:   {}", config.output.path.display());
    if config.analysis.sensitive_topic {
        println!("🔒 Sensitive topics: {}", config.analysis.topic_table.display());
    }
    println!();

    println!("⏳ Extracting with {}...", extractor.name());
    let extract_start = Instant::now();
    let records = extractor.extract_files(&paths, restriction)?;
    println!(
        "   Found {} messages ({:.2}s)",
        records.len(),
        extract_start.elapsed().as_secs_f64()
    );

    if records.is_empty() {
        println!();
        println!("ℹ️  No messages found, nothing to analyse.");
        return Ok(());
    }
    let extracted = records.len();

    println!("🧮 Classifying...");
    let progress = Arc::new(|p: StageProgress| {
        if p.is_complete() {
            println!("   {} done ({} records)", p.stage, p.total);
        }
    });
    let (records, reports) = Orchestrator::new(&*backend)
        .with_progress(progress)
        .run_with_reports(records, &stages)?;

    let table = ResultTable::from_records(&records)?;
    let table = if filter.is_active() {
        println!("🔍 Filtering...");
        let filtered = filter.apply(&table);
        println!("   {} of {} rows kept", filtered.len(), table.len());
        filtered
    } else {
        table
    };

    println!("💾 Writing CSV...");
    let write_start = Instant::now();
    write_table(&table, &config.output)?;
    println!("   Written in {:.2}s", write_start.elapsed().as_secs_f64());

    let total_time = total_start.elapsed();

    println!();
    println!("✅ Done! Output saved to {}", config.output.path.display());

    println!();
    println!("📊 Summary:");
    println!("   Extracted: {} messages", extracted);
    if filter.is_active() {
        println!("   Filtered:  {} rows", table.len());
    }
    println!("   Columns:   {}", table.headers().join(", "));

    println!();
    println!("⚡ Performance:");
    for report in &reports {
        println!(
            "   {:<16} {:.2}s ({:.0} records/sec)",
            report.kind.to_string(),
            report.elapsed.as_secs_f64(),
            report.throughput()
        );
    }
    println!("   Total time:      {:.2}s", total_time.as_secs_f64());

    Ok(())
}

// ============================================================================
// visualize
// ============================================================================

fn visualize(args: &VisualizeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(input) = &args.input {
        config.visualize.input = input.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.visualize.output_dir = dir.clone();
    }
    if let Some(sep) = args.sep {
        config.output.delimiter = sep;
    }
    if args.monthly {
        config.visualize.monthly = true;
    }
    if let Some(vocabulary) = &args.vocabulary {
        apply_vocabulary(&mut config.analysis, vocabulary);
    }

    let mut kinds = args.chart_kinds();
    if config.visualize.monthly && !args.monthly {
        kinds.push(ChartKind::MonthlyTimeline);
    }
    if kinds.is_empty() {
        return Err(ChatlensError::config(
            "no chart selected; use --gt, --gh, --tdt, --tfh, --tt TOPIC, --th TOPIC or --monthly",
        ));
    }

    let vocabulary = config.analysis.topic_vocabulary()?;
    let input = &config.visualize.input;

    println!("🔎 chatlens v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", input.display());
    println!("🖼️  Output:  {}", config.visualize.output_dir.display());
    println!();

    let table = read_table(input, config.output.delimiter)?;
    println!("   Loaded {} rows", table.len());

    let renderer =
        SvgRenderer::new().with_size(config.visualize.width, config.visualize.height);
    let visualizer = Visualizer::new(renderer, &config.visualize.output_dir)
        .with_vocabulary(vocabulary.clone());

    let mut written = 0;
    for kind in &kinds {
        match visualizer.draw(&table, kind)? {
            ChartOutcome::Written(path) => {
                written += 1;
                println!("📈 {} -> {}", kind, path.display());
            }
            ChartOutcome::NotFound(topic) => {
                println!("⚠️  Topic '{}' not found, skipped {}", topic, kind.file_name());
            }
            ChartOutcome::MissingColumn(column) => {
                println!("⚠️  Column '{}' missing, skipped {}", column, kind.file_name());
            }
        }
    }

    if args.json {
        let bundle = collect_aggregations(&table, &kinds, Some(&vocabulary));
        let path = config.visualize.output_dir.join(AGGREGATIONS_FILE);
        write_aggregations_json(&path, &bundle)?;
        println!("🧾 Chart data -> {}", path.display());
    }

    println!();
    println!("✅ Done! {} of {} charts written", written, kinds.len());
    Ok(())
}
