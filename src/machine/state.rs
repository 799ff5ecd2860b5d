//! Machine state threaded through one parse

use serde::Serialize;

use crate::geometry::Point;
use crate::parser::ParsedLine;

/// Everything the machine remembers between lines
///
/// Created fresh for every parse and never shared between files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MachineState {
    pub position: Point,
    /// Laser power (S), never negative
    pub power: f64,
    /// Feed rate (F), never negative
    pub feed_rate: f64,
    /// Layer counter, bumped each time Z rises above `last_z`
    pub layer: u32,
    pub last_z: f64,
    /// Hotend target in degrees, once one has been set
    pub temperature: Option<f64>,
    /// Fan speed in percent (0-100), once one has been set
    pub fan_speed: Option<f64>,
}

impl MachineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target of a motion line: axes the line leaves out keep their value
    pub fn target(&self, line: &ParsedLine) -> Point {
        Point::new(
            line.get('X').unwrap_or(self.position.x),
            line.get('Y').unwrap_or(self.position.y),
            line.get('Z').unwrap_or(self.position.z),
        )
    }

    /// Record a Z height; returns true when it starts a new layer
    pub fn observe_z(&mut self, z: f64) -> bool {
        if z > self.last_z {
            self.layer += 1;
            self.last_z = z;
            true
        } else {
            false
        }
    }
}

/// Convert an M106 operand to percent
///
/// Values up to and including 1 are read as an already normalized 0-1 fraction,
/// anything larger as 0-255 PWM. `S1` is therefore full fan, not 1/255:
/// the two readings cannot be told apart at exactly 1.
pub fn fan_percent(raw: f64) -> f64 {
    let percent = if raw <= 1.0 {
        raw * 100.0
    } else {
        (raw / 255.0) * 100.0
    };
    percent.clamp(0.0, 100.0)
}
