//! GCode Parser
//!
//! Tokenization and line classification. Pure functions over single lines;
//! machine state is the business of [`crate::machine`].

pub mod ast;
pub mod lexer;

pub use ast::{LineIssue, LineKind, Motion, Parameters, ParsedLine, TemperatureCode};
pub use lexer::{tokenize_line, Token, TokenKind};

/// Classify a single line of GCode
///
/// This is the main entry point for parsing. It tokenizes the line and
/// decides its kind from the leading command word. Never fails: anything
/// unrecognized ends up as [`LineKind::Other`] with issues attached.
pub fn classify(line: &str) -> ParsedLine {
    let tokens = lexer::tokenize_line(line.trim_end_matches(['\r', '\n']));
    ast::tokens_to_parsed_line(tokens)
}

/// Classify every line of a program text, in order
pub fn classify_text(text: &str) -> Vec<ParsedLine> {
    text.lines().map(classify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_linear_move() {
        let line = classify("G1 X10 Y20");

        assert_eq!(line.kind, LineKind::Motion(Motion::Linear));
        assert_eq!(line.parameters.len(), 2);
        assert_eq!(line.get('X'), Some(10.0));
        assert_eq!(line.get('Y'), Some(20.0));
        assert!(line.issues.is_empty());
    }

    #[test]
    fn test_classify_arcs() {
        assert_eq!(
            classify("G2 X1 Y1 I1 J0").kind,
            LineKind::Motion(Motion::ClockwiseArc)
        );
        assert_eq!(
            classify("G3X10Y0I-5J0").kind,
            LineKind::Motion(Motion::CounterClockwiseArc)
        );
    }

    #[test]
    fn test_inline_power_and_feed_stay_on_motion() {
        let line = classify("G1 X5 S800 F1200");

        assert_eq!(line.kind, LineKind::Motion(Motion::Linear));
        assert_eq!(line.get('S'), Some(800.0));
        assert_eq!(line.get('F'), Some(1200.0));
    }

    #[test]
    fn test_standalone_power_and_feed() {
        let power = classify("S500 ");
        assert_eq!(power.kind, LineKind::Power);
        assert_eq!(power.get('S'), Some(500.0));

        let feed = classify("F4000");
        assert_eq!(feed.kind, LineKind::Feed);
        assert_eq!(feed.get('F'), Some(4000.0));
    }

    #[test]
    fn test_temperature_and_fan() {
        assert_eq!(
            classify("M104 S210").kind,
            LineKind::Temperature(TemperatureCode::SetHotend)
        );
        assert_eq!(
            classify("M109 S215").kind,
            LineKind::Temperature(TemperatureCode::SetHotendAndWait)
        );
        let fan = classify("m106 s128");
        assert_eq!(fan.kind, LineKind::FanSpeed);
        assert_eq!(fan.get('S'), Some(128.0));
    }

    #[test]
    fn test_parameter_order_does_not_matter() {
        let a = classify("G1 Y2 X1 F300");
        let b = classify("G1 F300 X1 Y2");
        assert_eq!(a.parameters, b.parameters);
    }

    #[test]
    fn test_parse_with_comment() {
        let line = classify("G1 X10 ; move to X10");

        assert_eq!(line.kind, LineKind::Motion(Motion::Linear));
        assert_eq!(line.comment.as_deref(), Some(" move to X10"));
    }

    #[test]
    fn test_comment_only_is_other_without_issues() {
        let line = classify("; this is a comment");

        assert_eq!(line.kind, LineKind::Other);
        assert_eq!(line.comment.as_deref(), Some(" this is a comment"));
        assert!(line.issues.is_empty());
    }

    #[test]
    fn test_malformed_number_is_skipped() {
        let line = classify("G1 X Y5");

        assert_eq!(line.kind, LineKind::Motion(Motion::Linear));
        assert_eq!(line.get('X'), None);
        assert_eq!(line.get('Y'), Some(5.0));
        assert_eq!(line.issues, vec![LineIssue::MissingValue { letter: 'X' }]);
    }

    #[test]
    fn test_parse_empty_line() {
        let line = classify("   ");
        assert_eq!(line, ParsedLine::empty());
    }
}
