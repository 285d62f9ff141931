//! Source cursor: `strip()` skips whitespace-equivalent punctuation and
//! comments, and a handful of anchored matchers recognize each literal/opcode
//! shape the parser dispatches on.
//!
//! Grounded on the teacher's `lexer.rs`, which hand-scans a byte cursor
//! (`measure_indent`, `read_line_content`, ...) rather than reaching for the
//! `regex` crate; `Stream` keeps that manual-scanning style since every
//! pattern here is small and fixed.

use crate::error::Span;

/// Remaining unconsumed source, tracked as a byte cursor over the original
/// text so `Span`s stay meaningful for diagnostics.
pub struct Stream<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Stream<'a> {
    pub fn new(source: &'a str) -> Self {
        Stream { source, bytes: source.as_bytes(), pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The 0-based line number of the current position, for diagnostics.
    pub fn line(&self) -> usize {
        self.source[..self.pos].bytes().filter(|&b| b == b'\n').count()
    }

    pub fn span(&self) -> Span {
        Span::new(self.pos, self.line())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Skips `( whitespace | '(' | ')' | ':' | '#'..eol )*`. Parens and the
    /// colon are grouping sugar with no semantic effect.
    pub fn strip(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() || b == b'(' || b == b')' || b == b':' => {
                    self.pos += 1;
                }
                Some(b'#') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// `[a-z_][a-z_0-9]*`.
    pub fn match_identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_lowercase() || b == b'_' => self.pos += 1,
            _ => return None,
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(&self.source[start..self.pos])
    }

    /// `\d+`.
    pub fn match_integer(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            None
        } else {
            Some(&self.source[start..self.pos])
        }
    }

    /// `"([^"]*)"` or `'([^']*)'`; returns the body (without quotes).
    /// `Some(Err(()))` signals an unterminated literal so the caller can
    /// raise a `KnightError::Parse` at the correct span.
    pub fn match_string(&mut self) -> Option<Result<&'a str, ()>> {
        let quote = self.peek()?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let body_start = self.pos + 1;
        let mut i = body_start;
        while let Some(&b) = self.bytes.get(i) {
            if b == quote {
                let body = &self.source[body_start..i];
                self.pos = i + 1;
                return Some(Ok(body));
            }
            i += 1;
        }
        self.pos = self.bytes.len();
        Some(Err(()))
    }

    /// `[TF][A-Z]*` for Boolean.
    pub fn match_boolean(&mut self) -> Option<bool> {
        let first = self.peek()?;
        if first != b'T' && first != b'F' {
            return None;
        }
        self.pos += 1;
        self.consume_uppercase_run();
        Some(first == b'T')
    }

    /// `N[A-Z]*` for Null.
    pub fn match_null(&mut self) -> Option<()> {
        if self.peek()? != b'N' {
            return None;
        }
        self.pos += 1;
        self.consume_uppercase_run();
        Some(())
    }

    /// `@` for the empty list literal.
    pub fn match_list_literal(&mut self) -> Option<()> {
        if self.peek()? == b'@' {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// `[A-Z]+` (keyword opcode, extra letters discarded) OR any single
    /// non-whitespace non-identifier-starting char (symbol opcode).
    pub fn match_function_opcode(&mut self) -> Option<char> {
        let first = self.peek()?;
        if first.is_ascii_uppercase() {
            self.pos += 1;
            self.consume_uppercase_run();
            return Some(first as char);
        }
        if first.is_ascii_whitespace() || first.is_ascii_lowercase() || first.is_ascii_digit() {
            return None;
        }
        let ch = self.source[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn consume_uppercase_run(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_uppercase() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_skips_whitespace_parens_colon_and_comments() {
        let mut s = Stream::new("  (:) # a comment\n42");
        s.strip();
        assert_eq!(s.match_integer(), Some("42"));
    }

    #[test]
    fn match_identifier_allows_digits_after_first_char() {
        let mut s = Stream::new("x1_y2 rest");
        assert_eq!(s.match_identifier(), Some("x1_y2"));
    }

    #[test]
    fn match_string_handles_both_quote_styles() {
        let mut s = Stream::new("\"hi\" 'lo'");
        assert_eq!(s.match_string(), Some(Ok("hi")));
        s.strip();
        assert_eq!(s.match_string(), Some(Ok("lo")));
    }

    #[test]
    fn unterminated_string_reports_error() {
        let mut s = Stream::new("\"oops");
        assert_eq!(s.match_string(), Some(Err(())));
    }

    #[test]
    fn boolean_discards_trailing_uppercase_run() {
        let mut s = Stream::new("TRUE");
        assert_eq!(s.match_boolean(), Some(true));
        assert!(s.is_empty());
    }

    #[test]
    fn keyword_opcode_discards_trailing_letters() {
        let mut s = Stream::new("OUTPUT \"x\"");
        assert_eq!(s.match_function_opcode(), Some('O'));
    }

    #[test]
    fn symbol_opcode_matches_single_char() {
        let mut s = Stream::new("+ 1 2");
        assert_eq!(s.match_function_opcode(), Some('+'));
    }
}
