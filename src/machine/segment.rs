//! Path segments emitted by the state machine

use std::f64::consts::FRAC_PI_2;

use serde::Serialize;

use crate::geometry::{self, ArcDirection, ArcGeometry, ArcIssue, Bounds, Point};

/// A straight move (G0/G1)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
    pub power: f64,
    pub feed_rate: f64,
    /// True for G0
    pub rapid: bool,
}

/// A circular move (G2/G3)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcSegment {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub sweep: f64,
    pub direction: ArcDirection,
    pub power: f64,
    pub feed_rate: f64,
    pub issue: Option<ArcIssue>,
}

impl ArcSegment {
    pub fn new(start: Point, end: Point, geometry: ArcGeometry, power: f64, feed_rate: f64) -> Self {
        Self {
            start,
            end,
            center: geometry.center,
            radius: geometry.radius,
            start_angle: geometry.start_angle,
            end_angle: geometry.end_angle,
            sweep: geometry.sweep,
            direction: geometry.direction,
            power,
            feed_rate,
            issue: geometry.issue,
        }
    }

    pub fn geometry(&self) -> ArcGeometry {
        ArcGeometry {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle,
            end_angle: self.end_angle,
            sweep: self.sweep,
            direction: self.direction,
            issue: self.issue,
        }
    }

    pub fn is_full_circle(&self) -> bool {
        self.geometry().is_full_circle()
    }

    /// Polyline approximation with `samples` points
    pub fn tessellate(&self, samples: usize) -> Vec<Point> {
        geometry::tessellate(&self.geometry(), self.start, self.end, samples)
    }

    /// Exact XY extent: endpoints plus every axis crossing inside the sweep
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::from_point(self.start);
        bounds.include(self.end);

        if self.issue == Some(ArcIssue::ZeroRadius) {
            return bounds;
        }

        let (low, high) = if self.sweep >= 0.0 {
            (self.start_angle, self.start_angle + self.sweep)
        } else {
            (self.start_angle + self.sweep, self.start_angle)
        };
        let first = (low / FRAC_PI_2).ceil() as i64;
        let last = (high / FRAC_PI_2).floor() as i64;
        let geometry = self.geometry();
        for quadrant in first..=last {
            bounds.include(geometry.point_at(quadrant as f64 * FRAC_PI_2, self.start.z));
        }

        bounds
    }
}

/// One move of the toolpath, in program order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSegment {
    Line(LineSegment),
    Arc(ArcSegment),
}

impl PathSegment {
    pub fn start(&self) -> Point {
        match self {
            PathSegment::Line(line) => line.start,
            PathSegment::Arc(arc) => arc.start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            PathSegment::Line(line) => line.end,
            PathSegment::Arc(arc) => arc.end,
        }
    }

    pub fn power(&self) -> f64 {
        match self {
            PathSegment::Line(line) => line.power,
            PathSegment::Arc(arc) => arc.power,
        }
    }

    pub fn feed_rate(&self) -> f64 {
        match self {
            PathSegment::Line(line) => line.feed_rate,
            PathSegment::Arc(arc) => arc.feed_rate,
        }
    }

    /// True when the laser is on for this move (non-rapid, power above zero)
    pub fn is_burn(&self) -> bool {
        match self {
            PathSegment::Line(line) => !line.rapid && line.power > 0.0,
            PathSegment::Arc(arc) => arc.power > 0.0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            PathSegment::Line(line) => {
                let mut bounds = Bounds::from_point(line.start);
                bounds.include(line.end);
                bounds
            }
            PathSegment::Arc(arc) => arc.bounds(),
        }
    }

    /// Points to draw: the two endpoints of a line, or a tessellated arc
    pub fn polyline(&self, arc_samples: usize) -> Vec<Point> {
        match self {
            PathSegment::Line(line) => vec![line.start, line.end],
            PathSegment::Arc(arc) => arc.tessellate(arc_samples),
        }
    }
}
