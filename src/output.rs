//! Text and JSON rendering of command results

use std::fmt::Write;

use serde::Serialize;

use crate::diagnostics::{Diagnostics, Severity};
use crate::geometry::ArcDirection;
use crate::machine::{PathSegment, Toolpath};
use crate::program::FileOutcome;
use crate::summary::{FileReport, Range};

/// One row of the summary table; failed files carry an error instead of values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub filename: String,
    pub max_feed_rate: Option<f64>,
    pub max_power: Option<f64>,
    pub error: Option<String>,
}

impl From<&FileOutcome> for SummaryRow {
    fn from(outcome: &FileOutcome) -> Self {
        match &outcome.result {
            Ok(report) => SummaryRow {
                filename: report.summary.filename.clone(),
                max_feed_rate: Some(report.summary.max_feed_rate),
                max_power: Some(report.summary.max_power),
                error: None,
            },
            Err(e) => SummaryRow {
                filename: outcome
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| outcome.path.display().to_string()),
                max_feed_rate: None,
                max_power: None,
                error: Some(e.to_string()),
            },
        }
    }
}

pub fn summary_rows(outcomes: &[FileOutcome]) -> Vec<SummaryRow> {
    outcomes.iter().map(SummaryRow::from).collect()
}

/// Filename / max speed / max power table
pub fn summary_table(rows: &[SummaryRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.filename.len())
        .max()
        .unwrap_or(0)
        .max("Filename".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>12}  {:>12}", "Filename", "Max Speed", "Max Power");
    for row in rows {
        match (&row.error, row.max_feed_rate, row.max_power) {
            (None, Some(speed), Some(power)) => {
                let _ = writeln!(out, "{:<width$}  {:>12.2}  {:>12.2}", row.filename, speed, power);
            }
            (error, _, _) => {
                let message = error.as_deref().unwrap_or("no data");
                let _ = writeln!(out, "{:<width$}  error: {}", row.filename, message);
            }
        }
    }
    out
}

fn format_range(range: Option<Range>, unit: &str) -> String {
    match range {
        Some(range) => format!("{:.1} - {:.1}{}", range.min, range.max, unit),
        None => "N/A".to_string(),
    }
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{:.1}{}", value, unit),
        None => "N/A".to_string(),
    }
}

/// Thermal summary followed by the layer-by-layer table
pub fn layers_text(report: &FileReport) -> String {
    let thermal = &report.thermal;
    let mut out = String::new();

    let _ = writeln!(out, "File: {}", report.summary.filename);
    let _ = writeln!(out, "Layers: {}", report.layer_count);
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(
        out,
        "  Temperature Range:        {}",
        format_range(thermal.temperature_range, "°C")
    );
    let _ = writeln!(
        out,
        "  Most Common Temperature:  {}",
        format_value(thermal.most_common_temperature, "°C")
    );
    let _ = writeln!(
        out,
        "  Fan Speed Range:          {}",
        format_range(thermal.fan_speed_range, "%")
    );
    let _ = writeln!(
        out,
        "  Most Common Fan Speed:    {}",
        format_value(thermal.most_common_fan_speed, "%")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>6}  {:>16}  {:>13}", "Layer", "Temperature (°C)", "Fan Speed (%)");
    for record in &report.layers {
        let _ = writeln!(
            out,
            "{:>6}  {:>16}  {:>13}",
            record.layer,
            format_value(record.temperature, ""),
            format_value(record.fan_speed, "")
        );
    }

    out.push_str(&diagnostics_text(&report.diagnostics));
    out
}

/// One line per segment, then bounds and diagnostics
pub fn preview_text(name: &str, toolpath: &Toolpath) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "G-code Preview: {}", name);
    let _ = writeln!(
        out,
        "{} segments, max power {:.1}, max feed {:.1}, burn length {:.3}",
        toolpath.segments.len(),
        toolpath.max_power,
        toolpath.max_feed_rate,
        toolpath.burn_length()
    );
    if let Some(bounds) = toolpath.bounds {
        let _ = writeln!(
            out,
            "bounds X {:.3}..{:.3}  Y {:.3}..{:.3}",
            bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
        );
    }

    for (i, segment) in toolpath.segments.iter().enumerate() {
        let start = segment.start();
        let end = segment.end();
        let _ = write!(
            out,
            "{:>5} {} ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            i + 1,
            segment_label(segment),
            start.x,
            start.y,
            end.x,
            end.y
        );
        if let PathSegment::Arc(arc) = segment {
            let _ = write!(
                out,
                " center ({:.3}, {:.3}) r {:.3} sweep {:.1}°",
                arc.center.x,
                arc.center.y,
                arc.radius,
                arc.sweep.to_degrees()
            );
        }
        let _ = writeln!(
            out,
            " S{} F{} ({:.0}%)",
            segment.power(),
            segment.feed_rate(),
            toolpath.relative_power(segment) * 100.0
        );
    }

    out.push_str(&diagnostics_text(&toolpath.diagnostics));
    out
}

fn segment_label(segment: &PathSegment) -> &'static str {
    match segment {
        PathSegment::Line(line) if line.rapid => "RAPID",
        PathSegment::Line(_) => "LINE ",
        PathSegment::Arc(arc) => match arc.direction {
            ArcDirection::Clockwise => "CW   ",
            ArcDirection::CounterClockwise => "CCW  ",
        },
    }
}

fn diagnostics_text(diagnostics: &Diagnostics) -> String {
    let mut out = String::new();
    if diagnostics.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Diagnostics:");
    for d in diagnostics.iter() {
        let severity = match d.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        let _ = writeln!(out, "  line {}: {}: {}", d.line, severity, d.message);
    }
    out
}
