//! Laser G-code Tools
//!
//! Reconstructs toolpaths and per-file metrics from laser/CNC G-code.
//!
//! This library provides:
//! - Line classification of G-code text
//! - A modal state machine shared by toolpath and layer tracing
//! - Arc resolution and tessellation
//! - File summaries, thermal summaries and batch analysis
//! - Configuration, file watching and the command-line front end

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod geometry;
pub mod machine;
pub mod output;
pub mod parser;
pub mod program;
pub mod summary;
pub mod watch;

pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use dialect::PowerMode;
pub use error::{Error, Result};
pub use geometry::{resolve_arc, tessellate, Point};
pub use machine::{build_layer_trace, build_path, Machine, MachineOptions, PathSegment};
pub use parser::{classify, classify_text, ParsedLine};
pub use program::{analyze_files, Program};
pub use summary::{summarize, FileReport, FileSummary};
