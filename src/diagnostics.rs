//! Non-fatal diagnostics collected while building a toolpath
//!
//! A bad line never aborts a parse; it leaves a diagnostic here instead.

use serde::Serialize;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unrecognized command or unparsable number; the offending part was skipped
    MalformedLine,
    /// Arc with zero radius or mismatched start/end radii
    GeometricInconsistency,
}

/// A diagnostic message tied to a 1-based source line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Diagnostics for one file, in line order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, line: usize, kind: DiagnosticKind, message: String) {
        self.push(line, Severity::Warning, kind, message);
    }

    pub fn add_info(&mut self, line: usize, kind: DiagnosticKind, message: String) {
        self.push(line, Severity::Info, kind, message);
    }

    fn push(&mut self, line: usize, severity: Severity, kind: DiagnosticKind, message: String) {
        log::debug!("line {}: {}", line, message);
        self.entries.push(Diagnostic {
            line,
            severity,
            kind,
            message,
        });
    }

    /// True when nothing above info level was recorded
    pub fn is_clean(&self) -> bool {
        !self.entries.iter().any(|d| d.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_cleanliness() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_clean());

        diagnostics.add_info(1, DiagnosticKind::MalformedLine, "unsupported".to_string());
        assert!(diagnostics.is_clean()); // Info doesn't count

        diagnostics.add_warning(2, DiagnosticKind::GeometricInconsistency, "zero".to_string());
        assert!(!diagnostics.is_clean());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(
            diagnostics
                .of_kind(DiagnosticKind::GeometricInconsistency)
                .next()
                .map(|d| d.line),
            Some(2)
        );
    }
}
