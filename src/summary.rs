//! Per-file summaries
//!
//! [`FileSummary`] is a pure reduction over classified lines; it does not
//! depend on line order or machine state. [`ThermalSummary`] condenses the
//! temperature/fan history collected in metrics mode.

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::machine::{LayerRecord, LayerTrace};
use crate::parser::{LineKind, ParsedLine};

/// Highest feed rate and laser power found in a file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub max_feed_rate: f64,
    pub max_power: f64,
}

/// Summarize the speed and power range of a program
///
/// `S` on temperature and fan lines is not laser power and is left out.
pub fn summarize(filename: &str, lines: &[ParsedLine]) -> FileSummary {
    let mut summary = FileSummary {
        filename: filename.to_string(),
        max_feed_rate: 0.0,
        max_power: 0.0,
    };

    for line in lines {
        if let Some(feed_rate) = line.get('F') {
            summary.max_feed_rate = summary.max_feed_rate.max(feed_rate);
        }

        let carries_power = !matches!(line.kind, LineKind::Temperature(_) | LineKind::FanSpeed);
        if carries_power {
            if let Some(power) = line.get('S') {
                summary.max_power = summary.max_power.max(power);
            }
        }
    }

    summary
}

/// Inclusive range of observed values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn of(values: &[f64]) -> Option<Range> {
        let (first, rest) = values.split_first()?;
        Some(rest.iter().fold(
            Range {
                min: *first,
                max: *first,
            },
            |range, &v| Range {
                min: range.min.min(v),
                max: range.max.max(v),
            },
        ))
    }
}

/// Temperature and fan overview of a program
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThermalSummary {
    pub temperature_range: Option<Range>,
    pub most_common_temperature: Option<f64>,
    pub fan_speed_range: Option<Range>,
    pub most_common_fan_speed: Option<f64>,
}

impl ThermalSummary {
    pub fn from_trace(trace: &LayerTrace) -> Self {
        Self {
            temperature_range: Range::of(&trace.temperatures),
            most_common_temperature: most_common(&trace.temperatures),
            fan_speed_range: Range::of(&trace.fan_speeds),
            most_common_fan_speed: most_common(&trace.fan_speeds),
        }
    }
}

/// Most frequent value; ties go to the value seen first
fn most_common(values: &[f64]) -> Option<f64> {
    let mut counts: Vec<(f64, usize)> = Vec::new();

    for &value in values {
        match counts.iter_mut().find(|(v, _)| v.to_bits() == value.to_bits()) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    counts
        .iter()
        .fold(None, |best: Option<(f64, usize)>, &(value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value)
}

/// Metrics-mode result for one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub summary: FileSummary,
    pub thermal: ThermalSummary,
    pub layers: Vec<LayerRecord>,
    pub layer_count: u32,
    pub diagnostics: Diagnostics,
}

impl FileReport {
    pub fn new(summary: FileSummary, trace: LayerTrace) -> Self {
        Self {
            thermal: ThermalSummary::from_trace(&trace),
            summary,
            layers: trace.records,
            layer_count: trace.layer_count,
            diagnostics: trace.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::build_layer_trace;
    use crate::parser::classify_text;

    #[test]
    fn test_summarize_speed_and_power() {
        let lines = classify_text("M4 S0\nS0\nG1X153.924Y78.102F4000\nS500\nG3X1Y1I-2J0F6000\nS0");
        let summary = summarize("job.nc", &lines);

        assert_eq!(summary.filename, "job.nc");
        assert_eq!(summary.max_feed_rate, 6000.0);
        assert_eq!(summary.max_power, 500.0);
    }

    #[test]
    fn test_summarize_ignores_temperature_and_fan_s() {
        let lines = classify_text("M104 S215\nM106 S255\nG1 X1 S80 F900");
        let summary = summarize("print.gcode", &lines);

        assert_eq!(summary.max_power, 80.0);
        assert_eq!(summary.max_feed_rate, 900.0);
    }

    #[test]
    fn test_summarize_is_order_independent() {
        let forward = classify_text("G1 X1 F100 S3\nG1 X2 F300 S1\nG1 X3 F200 S2");
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(summarize("a", &forward), summarize("a", &backward));
    }

    #[test]
    fn test_empty_file_summary() {
        let summary = summarize("empty.nc", &[]);
        assert_eq!(summary.max_feed_rate, 0.0);
        assert_eq!(summary.max_power, 0.0);
    }

    #[test]
    fn test_most_common_prefers_first_on_tie() {
        assert_eq!(most_common(&[]), None);
        assert_eq!(most_common(&[210.0, 200.0, 200.0, 210.0]), Some(210.0));
        assert_eq!(most_common(&[210.0, 200.0, 200.0]), Some(200.0));
    }

    #[test]
    fn test_thermal_summary() {
        let trace = build_layer_trace(&classify_text(
            "M104 S200\nM109 S215\nM104 S215\nM106 S0\nM106 S255\nM106 S255",
        ));
        let thermal = ThermalSummary::from_trace(&trace);

        assert_eq!(
            thermal.temperature_range,
            Some(Range {
                min: 200.0,
                max: 215.0
            })
        );
        assert_eq!(thermal.most_common_temperature, Some(215.0));
        assert_eq!(
            thermal.fan_speed_range,
            Some(Range {
                min: 0.0,
                max: 100.0
            })
        );
        assert_eq!(thermal.most_common_fan_speed, Some(100.0));
    }

    #[test]
    fn test_thermal_summary_without_commands() {
        let trace = build_layer_trace(&classify_text("G1 X1 Z0.2"));
        assert_eq!(ThermalSummary::from_trace(&trace), ThermalSummary::default());
    }
}
