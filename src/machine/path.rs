//! Geometry mode: program lines to an ordered toolpath

use serde::Serialize;

use super::{Machine, MachineOptions, PathSegment};
use crate::diagnostics::Diagnostics;
use crate::geometry::{Bounds, Point};
use crate::parser::ParsedLine;

/// The reconstructed toolpath of one program
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Toolpath {
    /// Segments in program order; draw order matters
    pub segments: Vec<PathSegment>,
    /// XY extent of all segments, arcs included
    pub bounds: Option<Bounds>,
    pub max_power: f64,
    pub max_feed_rate: f64,
    pub diagnostics: Diagnostics,
}

/// A drawable run of points sharing one power level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub power: f64,
    /// `power` divided by the toolpath maximum (0-1)
    pub relative_power: f64,
    pub burn: bool,
}

impl Toolpath {
    /// Power relative to the strongest move, in 0-1
    ///
    /// The divisor never drops below 1 so an all-zero program stays at 0.
    pub fn relative_power(&self, segment: &PathSegment) -> f64 {
        segment.power() / self.max_power.max(1.0)
    }

    pub fn burn_segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter().filter(|s| s.is_burn())
    }

    pub fn travel_segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter().filter(|s| !s.is_burn())
    }

    /// One polyline per segment, arcs tessellated with `arc_samples` points
    pub fn polylines(&self, arc_samples: usize) -> Vec<Polyline> {
        self.segments
            .iter()
            .map(|segment| Polyline {
                points: segment.polyline(arc_samples),
                power: segment.power(),
                relative_power: self.relative_power(segment),
                burn: segment.is_burn(),
            })
            .collect()
    }

    /// Total XY distance travelled with the laser on
    pub fn burn_length(&self) -> f64 {
        self.burn_segments().map(segment_length).sum()
    }
}

fn segment_length(segment: &PathSegment) -> f64 {
    match segment {
        PathSegment::Line(line) => line.start.planar_distance(&line.end),
        PathSegment::Arc(arc) => arc.geometry().length(),
    }
}

/// Builds a [`Toolpath`] from classified lines
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    options: MachineOptions,
}

impl PathBuilder {
    pub fn new(options: MachineOptions) -> Self {
        Self { options }
    }

    pub fn build(&self, lines: &[ParsedLine]) -> Toolpath {
        let mut machine = Machine::new(self.options);
        let mut toolpath = Toolpath::default();

        for line in lines {
            let step = machine.step(line);
            let Some(segment) = step.segment else {
                continue;
            };

            let segment_bounds = segment.bounds();
            match toolpath.bounds.as_mut() {
                Some(bounds) => {
                    bounds.include(Point::xy(segment_bounds.min_x, segment_bounds.min_y));
                    bounds.include(Point::xy(segment_bounds.max_x, segment_bounds.max_y));
                }
                None => toolpath.bounds = Some(segment_bounds),
            }
            toolpath.max_power = toolpath.max_power.max(segment.power());
            toolpath.max_feed_rate = toolpath.max_feed_rate.max(segment.feed_rate());
            toolpath.segments.push(segment);
        }

        toolpath.diagnostics = machine.into_diagnostics();
        toolpath
    }
}

/// Build a toolpath with default options
pub fn build_path(lines: &[ParsedLine]) -> Toolpath {
    PathBuilder::default().build(lines)
}
