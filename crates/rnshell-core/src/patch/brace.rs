//! Brace matching for keyword-delimited blocks
//!
//! A small state machine (depth counter + position) that resolves the span of
//! a `{ ... }` block starting from an arbitrary offset.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;
use thiserror::Error;

/// How the scanner treats braces that appear inside comments and literals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// Count every brace
    Plain,
    /// Ignore braces inside `//` and `/* */` comments and single-line
    /// `'...'` / `"..."` literals (Gradle, Kotlin, Java)
    #[default]
    CLike,
}

/// Byte offsets of a matched block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Offset of the opening brace
    pub open: usize,
    /// Offset of the matching closing brace
    pub close: usize,
}

impl BlockSpan {
    /// Range of the block body, braces excluded
    pub fn body(&self) -> Range<usize> {
        self.open + 1..self.close
    }

    /// Range of the whole block, braces included
    pub fn outer(&self) -> Range<usize> {
        self.open..self.close + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BraceError {
    #[error("no opening brace at or after offset {start}")]
    NoOpeningBrace { start: usize },

    #[error("block opened at offset {open} is never closed")]
    Unbalanced { open: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Quoted(u8),
    Escaped(u8),
}

/// Next lexer state for byte `b` in C-like text, and how many bytes it used
fn transition(state: State, b: u8, next: Option<u8>) -> (State, usize) {
    match state {
        State::Code => match b {
            b'/' if next == Some(b'/') => (State::LineComment, 2),
            b'/' if next == Some(b'*') => (State::BlockComment, 2),
            b'"' | b'\'' => (State::Quoted(b), 1),
            _ => (State::Code, 1),
        },
        State::LineComment if b == b'\n' => (State::Code, 1),
        State::LineComment => (State::LineComment, 1),
        State::BlockComment if b == b'*' && next == Some(b'/') => (State::Code, 2),
        State::BlockComment => (State::BlockComment, 1),
        // Literals never span lines in the files we patch; a newline
        // ends a stray quote so one apostrophe can't swallow the file.
        State::Quoted(q) => match b {
            b'\\' => (State::Escaped(q), 1),
            b'\n' => (State::Code, 1),
            _ if b == q => (State::Code, 1),
            _ => (State::Quoted(q), 1),
        },
        State::Escaped(q) => (State::Quoted(q), 1),
    }
}

/// Find the block that opens at the first `{` at or after `start` and return
/// the offset of its matching `}`.
///
/// Scanning works on bytes: braces, quotes and slashes are ASCII and never
/// occur inside a multi-byte UTF-8 sequence, so every returned offset is a
/// char boundary.
pub fn match_block(text: &str, start: usize, syntax: Syntax) -> Result<BlockSpan, BraceError> {
    let bytes = text.as_bytes();
    let skip_literals = syntax == Syntax::CLike;

    let mut state = State::Code;
    let mut open: Option<usize> = None;
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];

        if state == State::Code && b == b'{' {
            open.get_or_insert(i);
            depth += 1;
        } else if state == State::Code && b == b'}' {
            if let Some(open_at) = open {
                depth -= 1;
                if depth == 0 {
                    return Ok(BlockSpan {
                        open: open_at,
                        close: i,
                    });
                }
            }
        } else if skip_literals {
            let (next_state, used) = transition(state, b, bytes.get(i + 1).copied());
            state = next_state;
            i += used;
            continue;
        }

        i += 1;
    }

    match open {
        Some(open) => Err(BraceError::Unbalanced { open }),
        None => Err(BraceError::NoOpeningBrace { start }),
    }
}

/// `text` with comments and literals blanked out for C-like syntax.
///
/// Blanked bytes become spaces (newlines are kept), so offsets into the
/// result are valid offsets into `text`.
pub fn code_only(text: &str, syntax: Syntax) -> Cow<'_, str> {
    if syntax == Syntax::Plain {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut state = State::Code;
    let mut i = 0;

    while i < bytes.len() {
        let (next_state, used) = transition(state, bytes[i], bytes.get(i + 1).copied());
        if state != State::Code || next_state != State::Code {
            for b in &mut out[i..i + used] {
                if *b != b'\n' {
                    *b = b' ';
                }
            }
        }
        state = next_state;
        i += used;
    }

    // Blanked regions start and end on ASCII bytes, so whole characters
    // are replaced and the bytes stay valid UTF-8.
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_block() {
        let text = "android { compileSdk 34 }";
        let span = match_block(text, 0, Syntax::Plain).unwrap();
        assert_eq!(span.open, 8);
        assert_eq!(span.close, text.len() - 1);
        assert_eq!(&text[span.body()], " compileSdk 34 ");
    }

    #[test]
    fn test_nested_depth_three() {
        let text = "a { b { c { x } y } z } tail";
        let span = match_block(text, 0, Syntax::Plain).unwrap();
        assert_eq!(span.open, 2);
        assert_eq!(&text[span.close..], "} tail");
    }

    #[test]
    fn test_starts_from_offset() {
        let text = "first { 1 } second { { 2 } }";
        let start = text.find("second").unwrap();
        let span = match_block(text, start, Syntax::Plain).unwrap();
        assert_eq!(&text[span.outer()], "{ { 2 } }");
    }

    #[test]
    fn test_unbalanced_block() {
        let text = "dependencies {\n    implementation(\"a:b:1\")\n    if (x) {\n";
        let err = match_block(text, 0, Syntax::Plain).unwrap_err();
        assert_eq!(err, BraceError::Unbalanced { open: 13 });
    }

    #[test]
    fn test_no_opening_brace() {
        let err = match_block("no braces here", 0, Syntax::Plain).unwrap_err();
        assert_eq!(err, BraceError::NoOpeningBrace { start: 0 });
    }

    #[test]
    fn test_start_past_end() {
        let err = match_block("{}", 10, Syntax::Plain).unwrap_err();
        assert_eq!(err, BraceError::NoOpeningBrace { start: 10 });
    }

    #[test]
    fn test_clike_ignores_comments_and_literals() {
        let text = "deps {\n  // stray } here\n  /* and { here */\n  x(\"}\")\n  y('{')\n}\nafter";
        let span = match_block(text, 0, Syntax::CLike).unwrap();
        assert_eq!(&text[span.close..], "}\nafter");
    }

    #[test]
    fn test_plain_counts_braces_in_literals() {
        let text = "deps { x(\"}\") }";
        let span = match_block(text, 0, Syntax::Plain).unwrap();
        // The quoted brace closes the block in plain mode
        assert_eq!(span.close, text.find("}\"").unwrap());
    }

    #[test]
    fn test_escaped_quote_inside_literal() {
        let text = r#"b { s("a\"}") }"#;
        let span = match_block(text, 0, Syntax::CLike).unwrap();
        assert_eq!(span.close, text.len() - 1);
    }

    #[test]
    fn test_multibyte_text_offsets() {
        let text = "配置 { 值 { 1 } }";
        let span = match_block(text, 0, Syntax::CLike).unwrap();
        assert!(text.is_char_boundary(span.open));
        assert_eq!(&text[span.close..], "}");
    }

    #[test]
    fn test_code_only_blanks_comments_and_literals() {
        let text = "a // b {\nc /* d { */ e \"f {\" g\n";
        let code = code_only(text, Syntax::CLike);
        assert_eq!(code.len(), text.len());
        assert_eq!(code, "a       \nc           e       g\n");
        assert_eq!(code_only(text, Syntax::Plain), text);
    }

    #[test]
    fn test_code_only_keeps_multibyte_offsets() {
        let text = "x // 配置 {\ny {";
        let code = code_only(text, Syntax::CLike);
        assert_eq!(code.len(), text.len());
        assert_eq!(code.find('{'), text.rfind('{'));
    }
}
