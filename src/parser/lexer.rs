//! GCode Lexer
//!
//! Fast, simple tokenization of GCode lines.
//! Words may be separated by whitespace or packed together (`G1X10Y20F3000`),
//! so a word ends as soon as its numeric text ends.

/// Token types in GCode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Command word like "G1", "M104"
    Command,
    /// Parameter word like "X10", "S255"
    Parameter,
    /// Comment (semicolon or parenthetical)
    Comment,
    /// Characters that belong to no word (stray digits, punctuation)
    Stray,
}

/// A token with its text content
///
/// Command and parameter text always starts with an uppercase letter.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    /// The word letter of a command or parameter token
    pub fn letter(&self) -> Option<char> {
        match self.kind {
            TokenKind::Command | TokenKind::Parameter => self.text.chars().next(),
            TokenKind::Comment | TokenKind::Stray => None,
        }
    }

    /// The numeric text following the word letter (may be empty)
    pub fn value_text(&self) -> &str {
        match self.kind {
            TokenKind::Command | TokenKind::Parameter => &self.text[1..],
            TokenKind::Comment | TokenKind::Stray => "",
        }
    }
}

/// Tokenize a line of GCode into tokens
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        match ch {
            // Skip whitespace
            ' ' | '\t' | '\r' | '\n' => continue,

            // Program delimiters carry no meaning for path building
            '%' => continue,

            // Semicolon comment: consume rest of line
            ';' => {
                tokens.push(Token {
                    kind: TokenKind::Comment,
                    text: line[start_idx..].to_string(),
                });
                break;
            }

            // Parenthetical comment
            '(' => {
                let mut end_idx = line.len();

                for (idx, ch) in chars.by_ref() {
                    if ch == ')' {
                        end_idx = idx + 1;
                        break;
                    }
                }

                tokens.push(Token {
                    kind: TokenKind::Comment,
                    text: line[start_idx..end_idx].to_string(),
                });
            }

            // Letter starts a word: consume its numeric text only
            c if c.is_ascii_alphabetic() => {
                let mut text = String::new();
                text.push(c.to_ascii_uppercase());

                while let Some(&(_, next_ch)) = chars.peek() {
                    if is_number_char(next_ch) {
                        text.push(next_ch);
                        chars.next();
                    } else {
                        break;
                    }
                }

                let kind = if is_command(&text) {
                    TokenKind::Command
                } else {
                    TokenKind::Parameter
                };

                tokens.push(Token { kind, text });
            }

            // Anything else is kept so the classifier can report it
            _ => {
                let mut end_idx = start_idx + ch.len_utf8();

                while let Some(&(idx, next_ch)) = chars.peek() {
                    if next_ch.is_ascii_alphabetic()
                        || next_ch.is_whitespace()
                        || matches!(next_ch, ';' | '(' | '%')
                    {
                        break;
                    }
                    end_idx = idx + next_ch.len_utf8();
                    chars.next();
                }

                tokens.push(Token {
                    kind: TokenKind::Stray,
                    text: line[start_idx..end_idx].to_string(),
                });
            }
        }
    }

    tokens
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+')
}

/// Determine if a word is a command
///
/// G, M and T (tool select) words are commands, everything else is a parameter.
fn is_command(text: &str) -> bool {
    matches!(text.chars().next(), Some('G' | 'M' | 'T'))
}
