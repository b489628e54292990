//! Test data generator for chatlens.
//!
//! Writes a synthetic Telegram Desktop HTML export mixing normal posts,
//! joined posts, service notices, media-only posts and posts with a broken
//! date title.
//!
//! Usage: cargo run --features gen-test --bin gen_test -- [messages] [output]
//! Example: cargo run --features gen-test --bin gen_test -- 5000 Data/messages.html

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use rand::seq::SliceRandom;

const OPENINGS: &[&str] = &[
    "Breaking:",
    "Update:",
    "Analysts say",
    "Officials confirm",
    "Today",
    "Сегодня",
    "Reports indicate",
];

const SUBJECTS: &[&str] = &[
    "the parliament vote",
    "the central bank",
    "a new smartphone launch",
    "the national football team",
    "the hospital network",
    "a film festival",
    "researchers at the university",
    "the climate summit",
    "foreign ministers",
    "the city council",
];

const OUTCOMES: &[&str] = &[
    "reported a great success",
    "celebrated a historic win",
    "announced strong growth",
    "faced a deep crisis",
    "suffered a heavy loss",
    "warned of rising inflation",
    "published the weekly schedule",
    "met as planned",
    "made no comment",
];

const EXTRAS: &[&str] = &[
    "",
    " 🔥",
    " More at <a href=\"https://example.org\">example.org</a>",
    " <b>#news</b>",
    "<br>Second line of the post",
    " &amp; more",
];

const SERVICE_NOTICES: &[&str] = &["Channel created", "Channel photo changed", "Pinned a message"];

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let count: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1_000);

    let output = args.get(2).map(|s| s.as_str()).unwrap_or("Data/messages.html");

    println!("🧪 Telegram HTML Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Blocks: {}", count);
    println!("   Output: {}", output);
    println!();

    let start = std::time::Instant::now();
    let stats = generate(count, Path::new(output))?;
    let elapsed = start.elapsed();

    println!("\n✅ Done!");
    println!("   Posts:        {}", stats.posts);
    println!("   Service:      {}", stats.service);
    println!("   Media only:   {}", stats.media);
    println!("   Broken dates: {}", stats.broken_dates);
    println!("   Size: {:.2} MB", stats.bytes as f64 / 1_000_000.0);
    println!("   Time: {:.2}s", elapsed.as_secs_f64());
    Ok(())
}

#[derive(Default)]
struct Stats {
    posts: usize,
    service: usize,
    media: usize,
    broken_dates: usize,
    bytes: usize,
}

fn generate(count: usize, output: &Path) -> io::Result<Stats> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output)?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    let mut rng = rand::thread_rng();
    let mut stats = Stats::default();

    let origin = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default();

    let head = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<title>Exported Data</title>\n</head>\n<body>\n<div class=\"page_wrap\">\n<div class=\"page_body chat_page\">\n<div class=\"history\">\n";
    writer.write_all(head.as_bytes())?;
    stats.bytes += head.len();

    for i in 0..count {
        // About seven blocks per day
        let minutes = (i as i64) * 200 + rng.gen_range(0..120);
        let at = origin + Duration::minutes(minutes);

        let block = match i % 10 {
            0..=4 => {
                stats.posts += 1;
                post_block(i, &at, &random_text(&mut rng), false)
            }
            5 => {
                stats.posts += 1;
                post_block(i, &at, &random_text(&mut rng), true)
            }
            6 => {
                stats.service += 1;
                service_block(i, &at, &mut rng)
            }
            7 => {
                stats.media += 1;
                media_block(i, &at)
            }
            8 => {
                stats.broken_dates += 1;
                broken_date_block(i, &random_text(&mut rng))
            }
            _ => {
                stats.posts += 1;
                post_block(i, &at, &random_text(&mut rng), false)
            }
        };
        stats.bytes += block.len();
        writer.write_all(block.as_bytes())?;

        if (i + 1) % 10_000 == 0 {
            eprint!("\r   Generated {}/{}", i + 1, count);
        }
    }

    let tail = "</div>\n</div>\n</div>\n</body>\n</html>\n";
    writer.write_all(tail.as_bytes())?;
    stats.bytes += tail.len();
    writer.flush()?;
    Ok(stats)
}

fn pick(rng: &mut impl Rng, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn random_text(rng: &mut impl Rng) -> String {
    format!(
        "{} {} {}.{}",
        pick(rng, OPENINGS),
        pick(rng, SUBJECTS),
        pick(rng, OUTCOMES),
        pick(rng, EXTRAS)
    )
}

fn date_title(at: &NaiveDateTime) -> String {
    format!("{} UTC+03:00", at.format("%d.%m.%Y %H:%M:%S"))
}

fn post_block(i: usize, at: &NaiveDateTime, text: &str, joined: bool) -> String {
    let class = if joined {
        "message default clearfix joined"
    } else {
        "message default clearfix"
    };
    let from = if joined {
        String::new()
    } else {
        "<div class=\"from_name\">Test Channel</div>\n".to_string()
    };
    format!(
        "<div class=\"{}\" id=\"message{}\">\n<div class=\"body\">\n<div class=\"pull_right date details\" title=\"{}\">{}</div>\n{}<div class=\"text\">{}</div>\n</div>\n</div>\n",
        class,
        i + 1,
        date_title(at),
        at.format("%H:%M"),
        from,
        text
    )
}

fn service_block(i: usize, at: &NaiveDateTime, rng: &mut impl Rng) -> String {
    let notice = if rng.r#gen::<bool>() {
        at.format("%-d %B %Y").to_string()
    } else {
        pick(rng, SERVICE_NOTICES).to_string()
    };
    format!(
        "<div class=\"message service\" id=\"message-{}\">\n<div class=\"body details\">{}</div>\n</div>\n",
        i + 1,
        notice
    )
}

fn media_block(i: usize, at: &NaiveDateTime) -> String {
    format!(
        "<div class=\"message default clearfix\" id=\"message{}\">\n<div class=\"body\">\n<div class=\"pull_right date details\" title=\"{}\">{}</div>\n<div class=\"media_wrap clearfix\"><a class=\"photo_wrap clearfix pull_left\" href=\"photos/photo_{}.jpg\"></a></div>\n</div>\n</div>\n",
        i + 1,
        date_title(at),
        at.format("%H:%M"),
        i + 1
    )
}

fn broken_date_block(i: usize, text: &str) -> String {
    format!(
        "<div class=\"message default clearfix\" id=\"message{}\">\n<div class=\"body\">\n<div class=\"pull_right date details\" title=\"yesterday\">--:--</div>\n<div class=\"text\">{}</div>\n</div>\n</div>\n",
        i + 1,
        text
    )
}
