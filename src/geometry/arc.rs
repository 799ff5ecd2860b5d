//! Arc resolution for G2/G3 moves
//!
//! Turns a start point, end point and center into a radius and an angle
//! range whose sweep runs in the commanded direction.

use std::f64::consts::TAU;
use std::fmt;

use serde::Serialize;

use super::point::Point;

/// Absolute slack for the radius comparison, in mm
pub const DEFAULT_ARC_TOLERANCE: f64 = 0.002;

/// Relative slack for radius comparison on large arcs (0.1%)
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.001;

/// Radii at or below this are treated as zero
const ZERO_RADIUS: f64 = 1e-9;

/// Start and end closer than this describe a full circle, in mm
const COINCIDENT: f64 = 1e-6;

/// Direction of travel around the arc center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

/// Geometric problems with an arc as written in the source file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ArcIssue {
    /// I and J both zero: no circle to follow
    ZeroRadius,
    /// The end point does not lie on the circle through the start point
    RadiusMismatch { start_radius: f64, end_radius: f64 },
}

impl fmt::Display for ArcIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcIssue::ZeroRadius => write!(f, "arc has zero radius"),
            ArcIssue::RadiusMismatch {
                start_radius,
                end_radius,
            } => write!(
                f,
                "arc radius mismatch: start radius {:.4}, end radius {:.4}",
                start_radius, end_radius
            ),
        }
    }
}

/// A resolved arc: circle plus direction-corrected angle range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcGeometry {
    pub center: Point,
    /// Distance from start to center
    pub radius: f64,
    pub start_angle: f64,
    /// Reachable from `start_angle` by sweeping in `direction`
    pub end_angle: f64,
    /// Signed sweep in radians: negative for clockwise, positive for counterclockwise
    pub sweep: f64,
    pub direction: ArcDirection,
    pub issue: Option<ArcIssue>,
}

impl ArcGeometry {
    pub fn is_full_circle(&self) -> bool {
        self.sweep.abs() == TAU
    }

    /// Length of the arc in the XY plane
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Point on the circle at `angle`, at height `z`
    pub fn point_at(&self, angle: f64, z: f64) -> Point {
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            z,
        )
    }
}

/// Resolves arcs with a configurable tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcResolver {
    tolerance: f64,
    relative_tolerance: f64,
}

impl Default for ArcResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ARC_TOLERANCE)
    }
}

impl ArcResolver {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs(),
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Resolve an arc from `start` to `end` around `center`
    ///
    /// The radius is always taken from the start point. Coincident start and
    /// end points describe a full circle, swept by exactly 2π.
    pub fn resolve(
        &self,
        start: Point,
        end: Point,
        center: Point,
        direction: ArcDirection,
    ) -> ArcGeometry {
        let radius = start.planar_distance(&center);

        if radius <= ZERO_RADIUS {
            return ArcGeometry {
                center,
                radius: 0.0,
                start_angle: 0.0,
                end_angle: 0.0,
                sweep: 0.0,
                direction,
                issue: Some(ArcIssue::ZeroRadius),
            };
        }

        let end_radius = end.planar_distance(&center);
        let allowed = self.tolerance.max(radius * self.relative_tolerance);
        let issue = ((end_radius - radius).abs() > allowed).then_some(ArcIssue::RadiusMismatch {
            start_radius: radius,
            end_radius,
        });

        let start_angle = start.angle_from(&center);
        let full_circle = start.planar_distance(&end) <= COINCIDENT;

        let sweep = if full_circle {
            match direction {
                ArcDirection::Clockwise => -TAU,
                ArcDirection::CounterClockwise => TAU,
            }
        } else {
            let end_angle = end.angle_from(&center);
            let end_angle = match direction {
                ArcDirection::Clockwise if end_angle > start_angle => end_angle - TAU,
                ArcDirection::CounterClockwise if end_angle < start_angle => end_angle + TAU,
                _ => end_angle,
            };
            end_angle - start_angle
        };

        ArcGeometry {
            center,
            radius,
            start_angle,
            end_angle: start_angle + sweep,
            sweep,
            direction,
            issue,
        }
    }
}

/// Resolve an arc with the default tolerance
pub fn resolve_arc(start: Point, end: Point, center: Point, direction: ArcDirection) -> ArcGeometry {
    ArcResolver::default().resolve(start, end, center, direction)
}

/// Approximate an arc with `samples` points evenly spaced in angle
///
/// The first and last points are exactly `start` and `end`, so consecutive
/// moves stay connected even when the source arc is slightly off-circle.
/// Z is interpolated linearly. Fewer than two samples are raised to two.
pub fn tessellate(geometry: &ArcGeometry, start: Point, end: Point, samples: usize) -> Vec<Point> {
    let samples = samples.max(2);

    if geometry.issue == Some(ArcIssue::ZeroRadius) {
        return vec![start, end];
    }

    let sweep = geometry.sweep;
    let last = (samples - 1) as f64;

    let mut points = Vec::with_capacity(samples);
    points.push(start);
    for i in 1..samples - 1 {
        let t = i as f64 / last;
        let angle = geometry.start_angle + sweep * t;
        let z = start.z + (end.z - start.z) * t;
        points.push(geometry.point_at(angle, z));
    }
    points.push(end);

    points
}
