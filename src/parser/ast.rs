//! Classified GCode lines
//!
//! Minimal types representing one parsed line: what kind of command it is
//! and which numeric parameters it carries. No machine state lives here.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::parser::lexer::{Token, TokenKind};

/// Motion commands understood by the path builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// G0
    Rapid,
    /// G1
    Linear,
    /// G2
    ClockwiseArc,
    /// G3
    CounterClockwiseArc,
}

impl Motion {
    pub fn code(self) -> &'static str {
        match self {
            Motion::Rapid => "G0",
            Motion::Linear => "G1",
            Motion::ClockwiseArc => "G2",
            Motion::CounterClockwiseArc => "G3",
        }
    }

    pub fn is_arc(self) -> bool {
        matches!(self, Motion::ClockwiseArc | Motion::CounterClockwiseArc)
    }
}

/// Temperature commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureCode {
    /// M104
    SetHotend,
    /// M109
    SetHotendAndWait,
}

/// What a line does, decided by its leading command word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Motion(Motion),
    /// Standalone `S` line
    Power,
    /// Standalone `F` line
    Feed,
    Temperature(TemperatureCode),
    /// M106
    FanSpeed,
    /// Comments, empty lines and commands outside the supported dialect
    Other,
}

/// Numeric parameters of a line, keyed by uppercase letter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Parameters(BTreeMap<char, f64>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, letter: char) -> Option<f64> {
        self.0.get(&letter).copied()
    }

    pub fn contains(&self, letter: char) -> bool {
        self.0.contains_key(&letter)
    }

    /// Insert a value, returning the previous one for the same letter
    pub fn insert(&mut self, letter: char, value: f64) -> Option<f64> {
        self.0.insert(letter, value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.0.iter().map(|(letter, value)| (*letter, *value))
    }
}

impl FromIterator<(char, f64)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (char, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Recoverable problems found while classifying a line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum LineIssue {
    /// A letter with no number after it
    MissingValue { letter: char },
    /// A word whose numeric text does not parse
    InvalidNumber { word: String },
    /// The same letter twice on one line; the later value wins
    DuplicateParameter { letter: char },
    /// A G/M code outside the supported dialect
    UnsupportedCommand { command: String },
    /// A second command word on the same line
    ExtraCommand { command: String },
    /// Parameters without any command word
    MissingCommand,
    /// Text that is neither a word nor a comment
    StrayText { text: String },
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineIssue::MissingValue { letter } => write!(f, "'{}' has no value", letter),
            LineIssue::InvalidNumber { word } => write!(f, "invalid number in '{}'", word),
            LineIssue::DuplicateParameter { letter } => {
                write!(f, "parameter '{}' given more than once", letter)
            }
            LineIssue::UnsupportedCommand { command } => {
                write!(f, "unsupported command '{}'", command)
            }
            LineIssue::ExtraCommand { command } => {
                write!(f, "extra command '{}' ignored", command)
            }
            LineIssue::MissingCommand => write!(f, "parameters without a command"),
            LineIssue::StrayText { text } => write!(f, "unexpected text '{}'", text),
        }
    }
}

impl LineIssue {
    /// Unsupported commands are expected noise; everything else is a
    /// sign of a damaged line.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, LineIssue::UnsupportedCommand { .. })
    }
}

/// A classified line of GCode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLine {
    pub kind: LineKind,
    /// Normalized command word (e.g. "G1", "M104"), if any
    pub command: Option<String>,
    pub parameters: Parameters,
    /// Comment text without its delimiters
    pub comment: Option<String>,
    pub issues: Vec<LineIssue>,
}

impl ParsedLine {
    pub fn empty() -> Self {
        Self {
            kind: LineKind::Other,
            command: None,
            parameters: Parameters::new(),
            comment: None,
            issues: Vec::new(),
        }
    }

    pub fn motion(&self) -> Option<Motion> {
        match self.kind {
            LineKind::Motion(motion) => Some(motion),
            _ => None,
        }
    }

    pub fn get(&self, letter: char) -> Option<f64> {
        self.parameters.get(letter)
    }
}

/// Convert tokens into a classified line
pub fn tokens_to_parsed_line(tokens: Vec<Token>) -> ParsedLine {
    let mut line = ParsedLine::empty();
    let mut first_parameter = None;

    for token in tokens {
        match token.kind {
            TokenKind::Comment => {
                if line.comment.is_none() {
                    line.comment = Some(extract_comment_text(&token.text));
                }
            }
            TokenKind::Stray => line.issues.push(LineIssue::StrayText { text: token.text }),
            // `M104 S210 T0`: a tool word after the command selects the target
            TokenKind::Command if line.command.is_some() && token.letter() == Some('T') => {
                match parse_parameter_token(&token) {
                    Ok((letter, value)) => {
                        if line.parameters.insert(letter, value).is_some() {
                            line.issues.push(LineIssue::DuplicateParameter { letter });
                        }
                    }
                    Err(issue) => line.issues.push(issue),
                }
            }
            TokenKind::Command => {
                if line.command.is_some() {
                    line.issues.push(LineIssue::ExtraCommand {
                        command: token.text,
                    });
                    continue;
                }

                let (name, kind) = classify_command(&token);
                if kind == LineKind::Other {
                    line.issues.push(LineIssue::UnsupportedCommand {
                        command: name.clone(),
                    });
                }
                line.kind = kind;
                line.command = Some(name);
            }
            TokenKind::Parameter => match parse_parameter_token(&token) {
                Ok((letter, value)) => {
                    first_parameter.get_or_insert(letter);
                    if line.parameters.insert(letter, value).is_some() {
                        line.issues.push(LineIssue::DuplicateParameter { letter });
                    }
                }
                Err(issue) => line.issues.push(issue),
            },
        }
    }

    if line.command.is_none() {
        match first_parameter {
            Some('S') => line.kind = LineKind::Power,
            Some('F') => line.kind = LineKind::Feed,
            Some(_) => line.issues.push(LineIssue::MissingCommand),
            None => {}
        }
    }

    line
}

/// Map a command word to its kind, normalizing zero-padded codes ("G01" -> "G1")
fn classify_command(token: &Token) -> (String, LineKind) {
    let Some(letter) = token.letter() else {
        return (token.text.clone(), LineKind::Other);
    };
    let Ok(code) = token.value_text().parse::<u32>() else {
        return (token.text.clone(), LineKind::Other);
    };

    let kind = match (letter, code) {
        ('G', 0) => LineKind::Motion(Motion::Rapid),
        ('G', 1) => LineKind::Motion(Motion::Linear),
        ('G', 2) => LineKind::Motion(Motion::ClockwiseArc),
        ('G', 3) => LineKind::Motion(Motion::CounterClockwiseArc),
        ('M', 104) => LineKind::Temperature(TemperatureCode::SetHotend),
        ('M', 109) => LineKind::Temperature(TemperatureCode::SetHotendAndWait),
        ('M', 106) => LineKind::FanSpeed,
        _ => LineKind::Other,
    };

    (format!("{}{}", letter, code), kind)
}

/// Parse a parameter token like "X10.5" into its letter and value
fn parse_parameter_token(token: &Token) -> Result<(char, f64), LineIssue> {
    let letter = token.letter().ok_or_else(|| LineIssue::StrayText {
        text: token.text.clone(),
    })?;
    let value_text = token.value_text();

    if value_text.is_empty() {
        return Err(LineIssue::MissingValue { letter });
    }

    match value_text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((letter, value)),
        _ => Err(LineIssue::InvalidNumber {
            word: token.text.clone(),
        }),
    }
}

/// Extract comment text, removing delimiters
fn extract_comment_text(text: &str) -> String {
    if let Some(stripped) = text.strip_prefix(';') {
        stripped.to_string()
    } else if let Some(stripped) = text.strip_prefix('(') {
        stripped.strip_suffix(')').unwrap_or(stripped).to_string()
    } else {
        text.to_string()
    }
}
