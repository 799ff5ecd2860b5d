//! Dialect differences between G-code producers
//!
//! Laser G-code in the wild disagrees on what `S` means when it rides on a
//! motion line. Some generators mean "burn this move at S", others emit the
//! S word as a state change that only applies from the next move on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parser::ParsedLine;

/// How an inline `S` word on a motion line is applied
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PowerMode {
    /// `G1 X10 S500` burns this move at 500
    #[default]
    SameMove,
    /// `G1 X10 S500` moves at the previous power; 500 applies afterwards
    NextMove,
}

impl PowerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerMode::SameMove => "same-move",
            PowerMode::NextMove => "next-move",
        }
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "same-move" => Ok(PowerMode::SameMove),
            "next-move" => Ok(PowerMode::NextMove),
            other => Err(format!("unknown power mode '{}'", other)),
        }
    }
}

/// Detect a power mode declared in a comment modeline
///
/// Looks at the comments of the first and last five lines for patterns like:
/// `; power_mode=next-move` or `(power_mode = same-move)`.
pub fn detect_modeline_power_mode(lines: &[ParsedLine]) -> Option<PowerMode> {
    let check_lines: Vec<&ParsedLine> = if lines.len() <= 10 {
        lines.iter().collect()
    } else {
        lines[..5].iter().chain(&lines[lines.len() - 5..]).collect()
    };

    let modeline_re = regex::Regex::new(r"power_mode\s*=\s*([\w-]+)");

    for line in check_lines {
        let Some(comment) = line.comment.as_deref() else {
            continue;
        };
        if let Some(captures) = modeline_re.as_ref().ok()?.captures(comment) {
            match captures.get(1)?.as_str().parse() {
                Ok(mode) => return Some(mode),
                Err(e) => log::warn!("Ignoring modeline: {}", e),
            }
        }
    }

    None
}
