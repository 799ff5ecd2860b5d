//! Metrics mode: layer, temperature and fan history of a program

use serde::Serialize;

use super::{Machine, MachineOptions};
use crate::diagnostics::Diagnostics;
use crate::parser::{LineKind, ParsedLine};

/// Temperature/fan state at a point of interest
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerRecord {
    pub layer: u32,
    pub temperature: Option<f64>,
    /// Percent, 0-100
    pub fan_speed: Option<f64>,
}

/// Everything metrics mode collects for one program
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerTrace {
    /// Records with consecutive duplicates removed
    pub records: Vec<LayerRecord>,
    /// Every temperature command value, in order
    pub temperatures: Vec<f64>,
    /// Every fan command value (percent), in order
    pub fan_speeds: Vec<f64>,
    /// Number of layers seen
    pub layer_count: u32,
    pub diagnostics: Diagnostics,
}

impl LayerTrace {
    /// Append a record unless it repeats the last one kept
    fn push(&mut self, record: LayerRecord) {
        if self.records.last() != Some(&record) {
            self.records.push(record);
        }
    }
}

/// Collect layer records with explicit options
pub fn build_layer_trace_with(lines: &[ParsedLine], options: MachineOptions) -> LayerTrace {
    let mut machine = Machine::new(options);
    let mut trace = LayerTrace::default();

    for line in lines {
        let step = machine.step(line);
        if !step.layer_started && !step.thermal_changed {
            continue;
        }

        let state = machine.state();
        if step.thermal_changed {
            match line.kind {
                LineKind::Temperature(_) => trace.temperatures.extend(state.temperature),
                LineKind::FanSpeed => trace.fan_speeds.extend(state.fan_speed),
                _ => {}
            }
        }

        trace.push(LayerRecord {
            layer: state.layer,
            temperature: state.temperature,
            fan_speed: state.fan_speed,
        });
    }

    trace.layer_count = machine.state().layer;
    trace.diagnostics = machine.into_diagnostics();
    trace
}

/// Collect layer records with default options
pub fn build_layer_trace(lines: &[ParsedLine]) -> LayerTrace {
    build_layer_trace_with(lines, MachineOptions::default())
}
