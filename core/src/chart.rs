//! Geometry for the five-day trend chart.
//!
//! `project` is pure: the same series, color and unit always give the same
//! projection. `ChartProjection::to_svg` renders it as a standalone SVG.

use std::fmt::Write;

use serde::Serialize;

use crate::models::DailyPoint;

pub const WIDTH: f64 = 700.0;
pub const HEIGHT: f64 = 300.0;
pub const PADDING: f64 = 60.0;
/// Smallest value the vertical scale is built from, so flat series still plot.
pub const MIN_SCALE: f64 = 10.0;
pub const HEADROOM: f64 = 1.2;

const TICK_FRACTIONS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
const GRID_FRACTIONS: [f64; 3] = [0.0, 0.5, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub value_label: String,
    pub day_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartProjection {
    pub color: String,
    pub unit: String,
    pub scale_max: f64,
    pub points: Vec<ChartPoint>,
    pub line_path: String,
    pub area_path: String,
    pub y_ticks: Vec<AxisTick>,
}

fn plot_width() -> f64 {
    WIDTH - PADDING * 2.0
}

fn plot_height() -> f64 {
    HEIGHT - PADDING * 2.0
}

fn baseline() -> f64 {
    HEIGHT - PADDING
}

/// Project a series onto the chart canvas.
#[must_use]
pub fn project(series: &[DailyPoint], color: &str, unit: &str) -> ChartProjection {
    let scale_max = series
        .iter()
        .map(|p| p.value)
        .fold(MIN_SCALE, f64::max)
        * HEADROOM;

    let x_step = if series.len() > 1 {
        plot_width() / (series.len() - 1) as f64
    } else {
        plot_width()
    };

    let points: Vec<ChartPoint> = series
        .iter()
        .enumerate()
        .map(|(i, p)| ChartPoint {
            x: PADDING + i as f64 * x_step,
            y: baseline() - (p.value / scale_max) * plot_height(),
            value: p.value,
            value_label: format_number(p.value),
            day_label: p.label.clone(),
        })
        .collect();

    let line_path = line_path(&points);
    let area_path = match (points.first(), points.last()) {
        (Some(first), Some(last)) => format!(
            "{line_path} L {} {} L {} {} Z",
            format_number(last.x),
            format_number(baseline()),
            format_number(first.x),
            format_number(baseline()),
        ),
        _ => String::new(),
    };

    let y_ticks = TICK_FRACTIONS
        .iter()
        .map(|t| AxisTick {
            y: baseline() - t * plot_height(),
            label: format_number((scale_max * t).round()),
        })
        .collect();

    ChartProjection {
        color: color.to_string(),
        unit: unit.to_string(),
        scale_max,
        points,
        line_path,
        area_path,
        y_ticks,
    }
}

/// Smooth cubic path; each segment's control points share the horizontal
/// midpoint of its two ends.
fn line_path(points: &[ChartPoint]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {} {}", format_number(first.x), format_number(first.y));
    for pair in points.windows(2) {
        let (p0, p1) = (&pair[0], &pair[1]);
        let mid_x = format_number((p0.x + p1.x) / 2.0);
        let _ = write!(
            d,
            " C {mid_x} {}, {mid_x} {}, {} {}",
            format_number(p0.y),
            format_number(p1.y),
            format_number(p1.x),
            format_number(p1.y),
        );
    }
    d
}

/// Two decimals at most, integers without a fraction, never `-0`.
#[must_use]
pub fn format_number(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0 + 0.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded}")
    }
}

impl ChartProjection {
    #[must_use]
    pub fn to_svg(&self) -> String {
        let grad_id = format!("grad-{}", self.color.trim_start_matches('#'));
        let base = format_number(baseline());
        let pad = format_number(PADDING);
        let right = format_number(WIDTH - PADDING);
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
            format_number(WIDTH),
            format_number(HEIGHT),
        );
        let _ = writeln!(
            svg,
            r#"<defs><linearGradient id="{grad_id}" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="{c}" stop-opacity="0.3"/><stop offset="100%" stop-color="{c}" stop-opacity="0"/></linearGradient></defs>"#,
            c = self.color,
        );
        let _ = writeln!(
            svg,
            r##"<text x="15" y="30" font-size="12" fill="#888" text-anchor="middle" font-weight="bold">{}</text>"##,
            escape(&self.unit),
        );
        let _ = writeln!(
            svg,
            r##"<line x1="{pad}" y1="{pad}" x2="{pad}" y2="{base}" stroke="#555" stroke-width="2"/>"##,
        );
        let _ = writeln!(
            svg,
            r##"<line x1="{pad}" y1="{base}" x2="{right}" y2="{base}" stroke="#555" stroke-width="2"/>"##,
        );
        let _ = writeln!(
            svg,
            r##"<text x="{}" y="{}" font-size="12" fill="#888" text-anchor="middle" font-weight="bold">Days</text>"##,
            format_number(WIDTH / 2.0),
            format_number(HEIGHT - 10.0),
        );

        for tick in &self.y_ticks {
            let y = format_number(tick.y);
            let _ = writeln!(
                svg,
                r##"<line x1="{}" y1="{y}" x2="{pad}" y2="{y}" stroke="#555" stroke-width="1"/><text x="{}" y="{}" font-size="11" fill="#aaa" text-anchor="end">{}</text>"##,
                format_number(PADDING - 5.0),
                format_number(PADDING - 10.0),
                format_number(tick.y + 4.0),
                tick.label,
            );
        }
        for t in GRID_FRACTIONS {
            let y = format_number(baseline() - t * plot_height());
            let _ = writeln!(
                svg,
                r##"<line x1="{pad}" y1="{y}" x2="{right}" y2="{y}" stroke="#333" stroke-dasharray="4"/>"##,
            );
        }

        if !self.points.is_empty() {
            let _ = writeln!(svg, r#"<path d="{}" fill="url(#{grad_id})"/>"#, self.area_path);
            let _ = writeln!(
                svg,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="3" stroke-linecap="round"/>"#,
                self.line_path, self.color,
            );
        }
        for p in &self.points {
            let (x, y) = (format_number(p.x), format_number(p.y));
            let _ = writeln!(
                svg,
                r##"<circle cx="{x}" cy="{y}" r="4" fill="#1E1E1E" stroke="{c}" stroke-width="2"/><text x="{x}" y="{}" font-size="11" fill="{c}" text-anchor="middle" font-weight="bold">{}</text>"##,
                format_number(p.y - 12.0),
                p.value_label,
                c = self.color,
            );
            let _ = writeln!(
                svg,
                r##"<text x="{x}" y="{}" font-size="11" fill="#aaa" text-anchor="middle">{}</text>"##,
                format_number(baseline() + 25.0),
                escape(&p.day_label),
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
