//! G-code state machine
//!
//! One shared state-update step ([`Machine::step`]) consumed in two modes:
//! - geometry mode ([`build_path`]) collects path segments
//! - metrics mode ([`build_layer_trace`]) collects layer/temperature/fan records
//!
//! Lines are processed strictly in order with O(1) state between them.

pub mod path;
pub mod segment;
pub mod state;
pub mod trace;

pub use path::{build_path, PathBuilder, Polyline, Toolpath};
pub use segment::{ArcSegment, LineSegment, PathSegment};
pub use state::{fan_percent, MachineState};
pub use trace::{build_layer_trace, build_layer_trace_with, LayerRecord, LayerTrace};

use crate::dialect::PowerMode;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::geometry::{ArcDirection, ArcResolver, DEFAULT_ARC_TOLERANCE};
use crate::parser::{LineKind, Motion, ParsedLine};

/// Fan speed assumed for an M106 without an S word
const DEFAULT_FAN_PWM: f64 = 255.0;

/// Knobs that change how lines are interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineOptions {
    pub power_mode: PowerMode,
    pub arc_tolerance: f64,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            power_mode: PowerMode::default(),
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
        }
    }
}

/// What a single line produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// Set for every motion line
    pub segment: Option<PathSegment>,
    /// Z rose above the last recorded height
    pub layer_started: bool,
    /// A temperature or fan command was applied
    pub thermal_changed: bool,
}

/// The state machine for one parse
#[derive(Debug)]
pub struct Machine {
    state: MachineState,
    options: MachineOptions,
    resolver: ArcResolver,
    line_number: usize,
    diagnostics: Diagnostics,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineOptions::default())
    }
}

impl Machine {
    pub fn new(options: MachineOptions) -> Self {
        Self {
            state: MachineState::new(),
            options,
            resolver: ArcResolver::new(options.arc_tolerance),
            line_number: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Apply the next line of the program
    pub fn step(&mut self, line: &ParsedLine) -> Step {
        self.line_number += 1;
        self.record_line_issues(line);

        let mut step = Step::default();

        match line.kind {
            LineKind::Motion(motion) => {
                self.apply_feed(line);
                if self.options.power_mode == PowerMode::SameMove {
                    self.apply_power(line);
                }

                step.segment = Some(self.motion_segment(motion, line));

                if self.options.power_mode == PowerMode::NextMove {
                    self.apply_power(line);
                }
                if let Some(z) = line.get('Z') {
                    step.layer_started = self.state.observe_z(z);
                }
            }
            LineKind::Power | LineKind::Feed => {
                self.apply_power(line);
                self.apply_feed(line);
            }
            LineKind::Temperature(_) => match line.get('S') {
                Some(temperature) => {
                    self.state.temperature = Some(temperature);
                    step.thermal_changed = true;
                }
                None => self.diagnostics.add_warning(
                    self.line_number,
                    DiagnosticKind::MalformedLine,
                    "temperature command without S value".to_string(),
                ),
            },
            LineKind::FanSpeed => {
                let raw = line.get('S').unwrap_or(DEFAULT_FAN_PWM);
                self.state.fan_speed = Some(fan_percent(raw));
                step.thermal_changed = true;
            }
            LineKind::Other => {}
        }

        step
    }

    /// Build the segment for a motion line and move to its end point
    fn motion_segment(&mut self, motion: Motion, line: &ParsedLine) -> PathSegment {
        let start = self.state.position;
        let end = self.state.target(line);
        let power = self.state.power;
        let feed_rate = self.state.feed_rate;

        let direction = match motion {
            Motion::Rapid | Motion::Linear => {
                self.state.position = end;
                return PathSegment::Line(LineSegment {
                    start,
                    end,
                    power,
                    feed_rate,
                    rapid: motion == Motion::Rapid,
                });
            }
            Motion::ClockwiseArc => ArcDirection::Clockwise,
            Motion::CounterClockwiseArc => ArcDirection::CounterClockwise,
        };

        let center = start.offset(
            line.get('I').unwrap_or(0.0),
            line.get('J').unwrap_or(0.0),
        );
        let geometry = self.resolver.resolve(start, end, center, direction);

        if let Some(issue) = geometry.issue {
            self.diagnostics.add_warning(
                self.line_number,
                DiagnosticKind::GeometricInconsistency,
                format!("{}: {}", motion.code(), issue),
            );
        }

        self.state.position = end;
        PathSegment::Arc(ArcSegment::new(start, end, geometry, power, feed_rate))
    }

    fn apply_power(&mut self, line: &ParsedLine) {
        if let Some(power) = line.get('S') {
            self.state.power = self.non_negative('S', power);
        }
    }

    fn apply_feed(&mut self, line: &ParsedLine) {
        if let Some(feed_rate) = line.get('F') {
            self.state.feed_rate = self.non_negative('F', feed_rate);
        }
    }

    fn non_negative(&mut self, letter: char, value: f64) -> f64 {
        if value < 0.0 {
            self.diagnostics.add_warning(
                self.line_number,
                DiagnosticKind::MalformedLine,
                format!("negative {} value {} clamped to 0", letter, value),
            );
            0.0
        } else {
            value
        }
    }

    fn record_line_issues(&mut self, line: &ParsedLine) {
        for issue in &line.issues {
            if issue.is_malformed() {
                self.diagnostics.add_warning(
                    self.line_number,
                    DiagnosticKind::MalformedLine,
                    issue.to_string(),
                );
            } else {
                self.diagnostics.add_info(
                    self.line_number,
                    DiagnosticKind::MalformedLine,
                    issue.to_string(),
                );
            }
        }
    }
}
