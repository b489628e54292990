//! SVG charts drawn with `plotters`.
//!
//! Text uses the generic `sans-serif` family so no font files are needed at
//! build or run time; the viewer picks the actual face.

use std::path::Path;

use plotters::prelude::*;

use super::aggregate::{SentimentCounts, TimeSeries, TopicCount, TopicScatter};
use super::render::ChartRenderer;
use crate::error::{ChatlensError, Result};
use crate::message::DATE_FORMAT;

const CAPTION_SIZE: u32 = 24;
const MARGIN: u32 = 16;
const LABEL_AREA: u32 = 48;

/// Writes charts as SVG files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the canvas size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn chart_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn failed<E: ToString>(chart: &str) -> impl Fn(E) -> ChatlensError + '_ {
    move |e| ChatlensError::render(chart, e)
}

/// Value axis padded so zero and both extremes stay visible.
fn padded_range(range: Option<(i64, i64)>) -> std::ops::Range<i64> {
    let (lo, hi) = range.unwrap_or((0, 0));
    (lo.min(0) - 1)..(hi.max(0) + 2)
}

impl ChartRenderer for SvgRenderer {
    fn timeline(&self, path: &Path, title: &str, series: &TimeSeries) -> Result<()> {
        let name = chart_name(path);
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(failed(&name))?;

        let n = series.len().max(1) as i64;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", CAPTION_SIZE))
            .margin(MARGIN)
            .x_label_area_size(LABEL_AREA)
            .y_label_area_size(LABEL_AREA)
            .build_cartesian_2d(0i64..n, padded_range(series.value_range()))
            .map_err(failed(&name))?;

        let date_label = |x: &i64| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| series.points.get(i))
                .map(|p| p.date.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .x_desc("Date")
            .y_desc("Sentiment")
            .draw()
            .map_err(failed(&name))?;

        let points: Vec<(i64, i64)> = series
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as i64, p.value))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(failed(&name))?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
            )
            .map_err(failed(&name))?;

        root.present().map_err(failed(&name))?;
        Ok(())
    }

    fn scatter(&self, path: &Path, title: &str, scatter: &TopicScatter) -> Result<()> {
        let name = chart_name(path);
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(failed(&name))?;

        let start = scatter.range.map(|(from, _)| from);
        let days = scatter
            .range
            .map(|(from, to)| (to - from).num_days() + 1)
            .unwrap_or(1);
        let topics = scatter.topics.len() as i32;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", CAPTION_SIZE))
            .margin(MARGIN)
            .x_label_area_size(LABEL_AREA)
            .y_label_area_size(LABEL_AREA * 3)
            .build_cartesian_2d(-1i64..days + 1, -1i32..topics.max(1))
            .map_err(failed(&name))?;

        let date_label = |x: &i64| {
            start
                .filter(|_| (0..days).contains(x))
                .and_then(|from| from.checked_add_signed(chrono::Duration::days(*x)))
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        let topic_label = |y: &i32| {
            usize::try_from(*y)
                .ok()
                .and_then(|i| scatter.topics.get(i))
                .cloned()
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .y_labels(scatter.topics.len() + 2)
            .y_label_formatter(&topic_label)
            .x_desc("Date")
            .draw()
            .map_err(failed(&name))?;

        if let Some(from) = start {
            chart
                .draw_series(scatter.points.iter().map(|&(date, topic)| {
                    Circle::new(((date - from).num_days(), topic as i32), 4, BLUE.filled())
                }))
                .map_err(failed(&name))?;
        }

        root.present().map_err(failed(&name))?;
        Ok(())
    }

    fn sentiment_bars(&self, path: &Path, title: &str, counts: &SentimentCounts) -> Result<()> {
        let bars: Vec<(String, usize)> = counts
            .by_axis()
            .iter()
            .map(|(sentiment, count)| (sentiment.to_string(), *count))
            .collect();
        self.bars(path, title, "Sentiment", &bars)
    }

    fn topic_bars(&self, path: &Path, title: &str, counts: &[TopicCount]) -> Result<()> {
        let bars: Vec<(String, usize)> = counts
            .iter()
            .map(|c| (c.topic.clone(), c.count))
            .collect();
        self.bars(path, title, "Topic", &bars)
    }
}

impl SvgRenderer {
    /// Vertical bar chart with one labelled bar per entry.
    fn bars(&self, path: &Path, title: &str, axis: &str, bars: &[(String, usize)]) -> Result<()> {
        let name = chart_name(path);
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(failed(&name))?;

        let n = bars.len().max(1) as u32;
        let top = bars.iter().map(|(_, c)| *c).max().unwrap_or(0) as u32 + 1;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", CAPTION_SIZE))
            .margin(MARGIN)
            .x_label_area_size(LABEL_AREA)
            .y_label_area_size(LABEL_AREA)
            .build_cartesian_2d((0u32..n).into_segmented(), 0u32..top)
            .map_err(failed(&name))?;

        let fmt = |v: &SegmentValue<u32>| -> String {
            match v {
                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => bars
                    .get(*i as usize)
                    .map(|(label, _)| label.clone())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            }
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len().max(1))
            .x_label_formatter(&fmt)
            .x_desc(axis)
            .y_desc("Messages")
            .draw()
            .map_err(failed(&name))?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BLUE.mix(0.6).filled())
                    .margin(12)
                    .data(bars.iter().enumerate().map(|(i, (_, c))| (i as u32, *c as u32))),
            )
            .map_err(failed(&name))?;

        root.present().map_err(failed(&name))?;
        Ok(())
    }
}
