use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::{HourlyActivity, SessionDensity, SessionHourlySeries, SessionTokenTotals};
use crate::utils::text::WordCount;

const CHART_SIZE: (u32, u32) = (1500, 800);
const COLORBAR_WIDTH: i32 = 170;
const COLORBAR_STEPS: usize = 64;
const CAPTION_FONT: (&str, u32) = ("sans-serif", 28);

const INPUT_COLOR: RGBColor = RGBColor(0x34, 0x98, 0xdb);
const OUTPUT_COLOR: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);

// Sequential yellow → orange → red ramp used for heatmap cells.
const YL_OR_RD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

pub fn render_interaction_frequency(path: &Path, series: &[SessionHourlySeries]) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = series
        .iter()
        .flat_map(|session| session.points.iter().map(|(_, rows)| *rows))
        .max()
        .unwrap_or(0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Interaction Frequency Over Time Across Sessions", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0u32..23u32, 0usize..(y_max + 1))?;
    chart
        .configure_mesh()
        .x_labels(24)
        .x_desc("Hour of Day")
        .y_desc("Number of Interactions")
        .draw()?;

    for (index, session) in series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        let points: Vec<(u32, usize)> = session
            .points
            .iter()
            .map(|&(hour, rows)| (u32::from(hour), rows))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(format!("Session {}", session.session_id))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(
            points
                .into_iter()
                .map(|point| Circle::new(point, 4, color.filled())),
        )?;
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

pub fn render_token_distribution(path: &Path, totals: &[SessionTokenTotals]) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (low, high) = totals
        .iter()
        .flat_map(|session| [session.input_tokens, session.output_tokens])
        .fold((0f64, 0f64), |(low, high), value| (low.min(value), high.max(value)));
    let labels: Vec<String> = totals
        .iter()
        .map(|session| format!("Session {}", session.session_id))
        .collect();
    let label_for = |x: &f64| index_label(*x, &labels);

    let mut chart = ChartBuilder::on(&root)
        .caption("Token Distribution Across Sessions", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(category_range(totals.len()), value_range(low, high))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(totals.len().max(1))
        .x_label_formatter(&label_for)
        .x_desc("Session")
        .y_desc("Total Tokens")
        .draw()?;

    chart
        .draw_series(totals.iter().enumerate().map(|(index, session)| {
            let x = index as f64;
            Rectangle::new([(x - 0.35, 0.0), (x, session.input_tokens)], INPUT_COLOR.filled())
        }))?
        .label("Input Tokens")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 16, y + 6)], INPUT_COLOR.filled()));
    chart
        .draw_series(totals.iter().enumerate().map(|(index, session)| {
            let x = index as f64;
            Rectangle::new([(x, 0.0), (x + 0.35, session.output_tokens)], OUTPUT_COLOR.filled())
        }))?
        .label("Output Tokens")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 16, y + 6)], OUTPUT_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

pub fn render_common_words(path: &Path, words: &[WordCount]) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = words.iter().map(|entry| entry.count).max().unwrap_or(0) as f64;
    let rows = words.len();
    // most frequent word on the top row
    let row_of = |index: usize| (rows - 1 - index) as f64;
    let labels: Vec<String> = words.iter().rev().map(|entry| entry.word.clone()).collect();
    let label_for = |y: &f64| index_label(*y, &labels);

    let mut chart = ChartBuilder::on(&root)
        .caption("Top 20 Most Common Words Across All Sessions", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(140)
        .build_cartesian_2d(0f64..(x_max * 1.15).max(1.0), category_range(rows))?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.max(1))
        .y_label_formatter(&label_for)
        .x_desc("Frequency")
        .y_desc("Words")
        .draw()?;

    chart.draw_series(words.iter().enumerate().map(|(index, entry)| {
        let y = row_of(index);
        Rectangle::new(
            [(0.0, y - 0.4), (entry.count as f64, y + 0.4)],
            INPUT_COLOR.filled(),
        )
    }))?;
    chart.draw_series(words.iter().enumerate().map(|(index, entry)| {
        Text::new(
            format!(" {}", entry.count),
            (entry.count as f64, row_of(index)),
            ("sans-serif", 14).into_font(),
        )
    }))?;

    root.present()?;
    Ok(())
}

pub fn render_response_length(path: &Path, densities: &[SessionDensity]) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let points = || {
        densities
            .iter()
            .filter_map(|session| session.curve.as_ref())
            .flat_map(|curve| curve.points.iter().copied())
    };
    let (mut x_min, mut x_max, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY, 0f64);
    for (x, y) in points() {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }
    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        (x_min, x_max) = (0.0, 1.0);
    }
    if y_max <= 0.0 {
        y_max = 1.0;
    }

    let mut chart = ChartBuilder::on(&root)
        .caption("Response Length Distribution Across Sessions", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max * 1.1)?;
    chart
        .configure_mesh()
        .x_desc("Response Length (characters)")
        .y_desc("Density")
        .y_label_formatter(&|y: &f64| format!("{y:.4}"))
        .draw()?;

    let mut drawn = 0usize;
    for (index, session) in densities.iter().enumerate() {
        let Some(curve) = &session.curve else {
            continue;
        };
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(format!("Session {}", session.session_id))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        drawn += 1;
    }

    if drawn > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

pub fn render_activity_heatmap(path: &Path, activity: &HourlyActivity) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (grid_area, bar_area) = root.split_horizontally(CHART_SIZE.0 as i32 - COLORBAR_WIDTH);

    let columns = activity.session_ids.len();
    let rows = activity.hours.len();
    let max_count = activity.max_count().max(1);
    let row_of = |index: usize| (rows - 1 - index) as f64;

    let column_labels = activity.session_ids.clone();
    let row_labels: Vec<String> = activity
        .hours
        .iter()
        .rev()
        .map(|hour| hour.to_string())
        .collect();
    let column_label_for = |x: &f64| index_label(*x, &column_labels);
    let row_label_for = |y: &f64| index_label(*y, &row_labels);

    let mut chart = ChartBuilder::on(&grid_area)
        .caption("Activity Heatmap: Hour vs Session", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(category_range(columns), category_range(rows))?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns.max(1))
        .y_labels(rows.max(1))
        .x_label_formatter(&column_label_for)
        .y_label_formatter(&row_label_for)
        .x_desc("Session ID")
        .y_desc("Hour of Day")
        .draw()?;

    chart.draw_series(activity.counts.iter().enumerate().flat_map(|(row, counts)| {
        counts.iter().enumerate().map(move |(column, &count)| {
            let x = column as f64;
            let y = row_of(row);
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                ramp_color(count as f64 / max_count as f64).filled(),
            )
        })
    }))?;

    let mut colorbar = ChartBuilder::on(&bar_area)
        .margin_top(70)
        .margin_bottom(70)
        .margin_right(20)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..1f64, 0f64..max_count as f64)?;
    colorbar
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Number of Interactions")
        .draw()?;

    let step = max_count as f64 / COLORBAR_STEPS as f64;
    colorbar.draw_series((0..COLORBAR_STEPS).map(|index| {
        let low = index as f64 * step;
        Rectangle::new(
            [(0.0, low), (1.0, low + step)],
            ramp_color((index as f64 + 0.5) / COLORBAR_STEPS as f64).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Interpolates the yellow → red ramp at `fraction` in `[0, 1]`.
#[must_use]
pub fn ramp_color(fraction: f64) -> RGBColor {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let scaled = fraction * (YL_OR_RD.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(YL_OR_RD.len() - 2);
    let t = scaled - lower as f64;
    let (r0, g0, b0) = YL_OR_RD[lower];
    let (r1, g1, b1) = YL_OR_RD[lower + 1];
    let lerp = |from: u8, to: u8| (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u8;

    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Axis span for `count` categories centred on `0..count`.
fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

/// Value axis covering `low..high` and zero, padded by a tenth of the span.
fn value_range(low: f64, high: f64) -> std::ops::Range<f64> {
    let (low, high) = (low.min(0.0), high.max(0.0));
    let pad = ((high - low) * 0.1).max(1.0);
    let start = if low < 0.0 { low - pad } else { 0.0 };
    start..high + pad
}

fn index_label(position: f64, labels: &[String]) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}
