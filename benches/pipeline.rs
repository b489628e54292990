//! Benchmarks for chatlens extraction, classification and aggregation.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench pipeline -- extraction`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chatlens::classify::{LexiconBackend, Stage, TopicVocabulary};
use chatlens::core::{Orchestrator, ResultTable, TableRow, filter_by_topic, to_csv};
use chatlens::parser::MessageExtractor;
use chatlens::parsers::TelegramHtmlExtractor;
use chatlens::visualize::aggregate::{daily_sentiment, topic_frequency, topic_scatter};
use chatlens::{MessageRecord, Sentiment};

use chrono::{Days, NaiveDate};

const TEXTS: &[&str] = &[
    "Great win for the national football team",
    "Bank crisis deepens as inflation rises",
    "Parliament vote on the new budget law",
    "Hospital doctors report progress on the vaccine",
    "City mayor opens a new road in the district",
];

const LABELS: &[&str] = &["Politics", "Economy", "Sports", "Health", "Local News"];

// =============================================================================
// Test Data Generators
// =============================================================================

fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn generate_export_html(count: usize) -> String {
    let mut blocks = String::with_capacity(count * 300);
    for i in 0..count {
        let date = origin() + Days::new((i / 10) as u64);
        if i % 7 == 6 {
            blocks.push_str(&format!(
                r#"<div class="message service"><div class="body details">{}</div></div>"#,
                date.format("%-d %B %Y")
            ));
            continue;
        }
        blocks.push_str(&format!(
            r#"<div class="message default clearfix"><div class="body"><div class="pull_right date details" title="{} 10:00:00 UTC+03:00">10:00</div><div class="from_name">News</div><div class="text">{}<br>#news</div></div></div>"#,
            date.format("%d.%m.%Y"),
            TEXTS[i % TEXTS.len()]
        ));
    }
    format!("<html><body><div class=\"history\">{}</div></body></html>", blocks)
}

fn generate_records(count: usize) -> Vec<MessageRecord> {
    (0..count)
        .map(|i| {
            let date = origin() + Days::new((i / 10) as u64);
            MessageRecord::new(TEXTS[i % TEXTS.len()], date).unwrap()
        })
        .collect()
}

fn generate_table(count: usize) -> ResultTable {
    let sentiments = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];
    let rows = (0..count)
        .map(|i| {
            TableRow::new(
                origin() + Days::new((i / 25) as u64),
                sentiments[i % sentiments.len()],
                LABELS[i % LABELS.len()],
            )
        })
        .collect();
    ResultTable::from_rows(rows).unwrap()
}

// =============================================================================
// Extraction Benchmarks
// =============================================================================

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let extractor = TelegramHtmlExtractor::new();

    for size in [100_usize, 1_000, 10_000] {
        let html = generate_export_html(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &html, |b, html| {
            b.iter(|| {
                let records = extractor.extract_document(black_box(html));
                black_box(records)
            });
        });
    }
    group.finish();
}

// =============================================================================
// Classification Benchmarks
// =============================================================================

fn bench_lexicon_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexicon_classification");
    let backend = LexiconBackend::default();
    let stages = [Stage::Sentiment, Stage::Topic(TopicVocabulary::news())];

    for size in [100_usize, 1_000, 10_000] {
        let records = generate_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &records,
            |b, records| {
                b.iter(|| {
                    let classified = Orchestrator::new(&backend)
                        .run(black_box(records.clone()), &stages)
                        .unwrap();
                    black_box(classified)
                });
            },
        );
    }
    group.finish();
}

// =============================================================================
// Table Benchmarks
// =============================================================================

fn bench_topic_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("topic_filter");

    for size in [1_000_usize, 10_000, 100_000] {
        let table = generate_table(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| black_box(filter_by_topic(black_box(table), "news")));
        });
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let vocabulary = TopicVocabulary::news();

    for size in [1_000_usize, 10_000, 100_000] {
        let table = generate_table(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("daily", size), &table, |b, table| {
            b.iter(|| black_box(daily_sentiment(black_box(table))));
        });
        group.bench_with_input(BenchmarkId::new("scatter", size), &table, |b, table| {
            b.iter(|| black_box(topic_scatter(black_box(table), Some(&vocabulary))));
        });
        group.bench_with_input(BenchmarkId::new("frequency", size), &table, |b, table| {
            b.iter(|| black_box(topic_frequency(black_box(table), Some(&vocabulary))));
        });
    }
    group.finish();
}

fn bench_output_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_csv");

    for size in [100_usize, 1_000, 10_000] {
        let table = generate_table(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| {
                let csv = to_csv(black_box(table), '|').unwrap();
                black_box(csv)
            });
        });
    }
    group.finish();
}

// =============================================================================
// End-to-End Pipeline Benchmark
// =============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let extractor = TelegramHtmlExtractor::new();
    let backend = LexiconBackend::default();
    let stages = [Stage::Sentiment, Stage::Topic(TopicVocabulary::news())];

    for size in [1_000_usize, 10_000] {
        let html = generate_export_html(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &html, |b, html| {
            b.iter(|| {
                // extract -> classify -> table -> csv
                let records = extractor.extract_document(black_box(html));
                let records = Orchestrator::new(&backend).run(records, &stages).unwrap();
                let table = ResultTable::from_records(&records).unwrap();
                let csv = to_csv(&table, '|').unwrap();
                black_box(csv)
            });
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_extraction,
    bench_lexicon_classification,
    bench_topic_filter,
    bench_aggregation,
    bench_output_csv,
    bench_full_pipeline,
);

criterion_main!(benches);
