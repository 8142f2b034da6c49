//! # Tide Report Rendering
//!
//! This module turns a [`TideReport`] into terminal text: where the user is,
//! which coast was chosen, the next high and low tide, and an ASCII chart of
//! the upcoming heights. Everything renders to a `String` so callers decide
//! where it goes.
//!
//! Missing tide data renders as an explicit "No tide data available." line;
//! countdown text is only produced for extrema that exist.

use crate::app::{PositionSource, TideReport};
use crate::coast;
use crate::config::DisplayConfig;
use crate::countdown::CountdownDisplay;
use crate::extrema::{TideExtrema, TideKind};
use crate::TideSample;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt::{self, Write};

/// Zoom level for the coast map link
const MAP_ZOOM: u8 = 12;

/// Format a tide height with explicit sign, in meters.
fn format_tide_height(height_m: f64) -> String {
    if height_m == 0.0 {
        " 0.00 m".to_string()
    } else {
        format!("{height_m:+.2} m")
    }
}

/// Coarse "time from now" text, e.g. "in 3h 12m".
pub fn format_relative(delta: Duration) -> String {
    let mins = delta.num_minutes();
    if delta <= Duration::zero() {
        "now".to_string()
    } else if mins < 1 {
        "in a few seconds".to_string()
    } else if mins < 60 {
        format!("in {mins}m")
    } else {
        format!("in {}h {}m", mins / 60, mins % 60)
    }
}

/// The wall-clock line shown at the top of the report and refreshed by `watch`.
pub fn clock_line<Tz>(now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "Current Time: {}",
        now.with_timezone(tz).format("%Y-%m-%d %H:%M:%S")
    )
}

/// One line of live countdown output.
pub fn countdown_line(kind: TideKind, display: &CountdownDisplay) -> String {
    format!("Next {} Tide: {display}", kind.label())
}

/// Render the full report for `now`, with clock times shown in `tz`.
pub fn render_report<Tz>(
    report: &TideReport,
    extrema: &TideExtrema,
    now: DateTime<Utc>,
    tz: &Tz,
    display: &DisplayConfig,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    let local = |t: DateTime<Utc>| t.with_timezone(tz);

    let _ = writeln!(out, "{}", clock_line(now, tz));

    let position = format!("({:.6}, {:.6})", report.position.lat, report.position.lon);
    let _ = match report.position_source {
        PositionSource::Provided => writeln!(out, "Your location: {position}"),
        PositionSource::Stored => writeln!(out, "Using stored location: {position}"),
        PositionSource::Configured => writeln!(out, "Configured location: {position}"),
    };

    let coast_at = report.coast.coordinates;
    let coast_name = report
        .coast
        .name
        .clone()
        .unwrap_or_else(|| "Coast".to_string());
    let _ = writeln!(
        out,
        "Nearest Coast: {coast_name} ({:.6}, {:.6}), {:.1} km away",
        coast_at.lat, coast_at.lon, report.coast.distance_km
    );
    let _ = writeln!(out, "Map: {}", coast::map_url(coast_at, MAP_ZOOM));

    if report.tide_data.offline {
        let _ = writeln!(out, "⚠ OFFLINE: heights from the harmonic model");
    }
    if report.from_cache {
        let _ = writeln!(out, "(cached)");
    }
    out.push('\n');

    if extrema.is_empty() {
        let _ = writeln!(out, "No tide data available.");
        return out;
    }

    for (kind, sample) in extrema.iter() {
        let _ = writeln!(
            out,
            "Next {} Tide: {} ({}, {}) - {}",
            kind.label(),
            local(sample.time).format("%Y-%m-%d %H:%M"),
            format_tide_height(sample.height),
            format_relative(sample.time - now),
            CountdownDisplay::at(sample.time, now)
        );
    }

    if let Some(samples) = report.tide_data.samples() {
        let window_end = now + Duration::hours(display.chart_hours);
        let upcoming: Vec<TideSample> = samples
            .into_iter()
            .filter(|s| s.time > now && s.time <= window_end && s.height.is_finite())
            .collect();
        let chart = render_chart(&upcoming, extrema, display.chart_rows, display.chart_hours);
        if !chart.is_empty() {
            out.push('\n');
            out.push_str(&chart);
        }
    }

    out
}

/// Render upcoming samples as an ASCII chart, marking the next high with `H`
/// and the next low with `L`. Returns an empty string for fewer than two samples.
pub fn render_chart(
    samples: &[TideSample],
    extrema: &TideExtrema,
    rows: usize,
    hours: i64,
) -> String {
    const Y_AXIS_WIDTH: usize = 9; // "+1.23 m │"
    let rows = rows.max(3);
    let sample_count = samples.len();
    if sample_count < 2 {
        return String::new();
    }

    let (min_height, max_height) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), sample| {
            (min.min(sample.height), max.max(sample.height))
        });
    let range = max_height - min_height;

    let height_to_row = |height: f64| {
        let normalized = if range > f64::EPSILON {
            (height - min_height) / range
        } else {
            0.5
        };
        ((1.0 - normalized) * (rows as f64 - 1.0)).round() as usize
    };

    let mut grid = vec![vec![' '; sample_count + Y_AXIS_WIDTH]; rows];

    // Label top, middle and bottom rows
    for height in [max_height, (max_height + min_height) / 2.0, min_height] {
        let row = height_to_row(height);
        let label = format!("{:<width$}", format_tide_height(height), width = Y_AXIS_WIDTH - 1);
        for (i, ch) in label.chars().take(Y_AXIS_WIDTH - 1).enumerate() {
            grid[row][i] = ch;
        }
    }
    for row in grid.iter_mut() {
        row[Y_AXIS_WIDTH - 1] = '│';
    }

    for (column, sample) in samples.iter().enumerate() {
        let mark = if Some(*sample) == extrema.next_high {
            'H'
        } else if Some(*sample) == extrema.next_low {
            'L'
        } else {
            '•'
        };
        grid[height_to_row(sample.height)][column + Y_AXIS_WIDTH] = mark;
    }

    let mut out = String::new();
    for row in grid {
        let _ = writeln!(out, "{}", row.into_iter().collect::<String>().trim_end());
    }

    // Time markers below the chart
    let padding = " ".repeat(Y_AXIS_WIDTH);
    let end_label = format!("+{hours}h");
    let gap = sample_count.saturating_sub(3 + end_label.len());
    let _ = writeln!(out, "{padding}Now{}{end_label}", " ".repeat(gap));
    out
}
