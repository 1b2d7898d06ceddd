//! Anchor resolution: where in a text a template gets inserted

use super::brace::{code_only, match_block, BlockSpan, Syntax};
use super::PatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A located position in a text file used as the insertion reference point.
///
/// Anchors that sit on their own line resolve to line boundaries, so
/// templates are written as whole lines ending with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Beginning of the file
    StartOfFile,

    /// End of the file
    EndOfFile,

    /// Before the last `</tag>`
    BeforeClosingTag(String),

    /// After the `>` ending the first `<tag ...>`
    AfterOpeningTag(String),

    /// After the `{` of the first `keyword {` block
    BlockStart(String),

    /// Before the `}` matching the first `keyword {` block
    BlockEnd(String),

    /// After the line containing the first occurrence of a needle
    AfterLine(String),

    /// Immediately before the first occurrence of a needle
    Before(String),

    /// Immediately after the first occurrence of a needle
    After(String),

    /// Immediately before the last occurrence of a needle
    BeforeLast(String),

    /// Immediately after the last occurrence of a needle
    AfterLast(String),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::StartOfFile => write!(f, "start of file"),
            Anchor::EndOfFile => write!(f, "end of file"),
            Anchor::BeforeClosingTag(tag) => write!(f, "</{}>", tag),
            Anchor::AfterOpeningTag(tag) => write!(f, "<{}>", tag),
            Anchor::BlockStart(keyword) => write!(f, "start of `{} {{ }}` block", keyword),
            Anchor::BlockEnd(keyword) => write!(f, "end of `{} {{ }}` block", keyword),
            Anchor::AfterLine(needle) => write!(f, "line containing `{}`", needle),
            Anchor::Before(needle) | Anchor::After(needle) => write!(f, "`{}`", needle),
            Anchor::BeforeLast(needle) | Anchor::AfterLast(needle) => {
                write!(f, "last `{}`", needle)
            }
        }
    }
}

impl Anchor {
    /// Resolve the anchor to a byte offset in `text`
    pub fn resolve(&self, text: &str, syntax: Syntax) -> Result<usize, PatchError> {
        let not_found = || PatchError::AnchorNotFound(self.to_string());

        match self {
            Anchor::StartOfFile => Ok(0),
            Anchor::EndOfFile => Ok(text.len()),
            Anchor::BeforeClosingTag(tag) => {
                let pos = text.rfind(&format!("</{}>", tag)).ok_or_else(not_found)?;
                Ok(line_start_if_indented(text, pos))
            }
            Anchor::AfterOpeningTag(tag) => {
                let start = find_opening_tag(text, tag).ok_or_else(not_found)?;
                let end = text[start..].find('>').ok_or_else(not_found)? + start + 1;
                Ok(next_line_if_trailing_blank(text, end))
            }
            Anchor::BlockStart(keyword) => {
                let span = find_block(text, 0..text.len(), keyword, syntax)?;
                Ok(next_line_if_trailing_blank(text, span.open + 1))
            }
            Anchor::BlockEnd(keyword) => {
                let span = find_block(text, 0..text.len(), keyword, syntax)?;
                Ok(line_start_if_indented(text, span.close))
            }
            Anchor::AfterLine(needle) => {
                let pos = text.find(needle.as_str()).ok_or_else(not_found)?;
                Ok(text[pos..]
                    .find('\n')
                    .map(|nl| pos + nl + 1)
                    .unwrap_or(text.len()))
            }
            Anchor::Before(needle) => text.find(needle.as_str()).ok_or_else(not_found),
            Anchor::After(needle) => text
                .find(needle.as_str())
                .map(|pos| pos + needle.len())
                .ok_or_else(not_found),
            Anchor::BeforeLast(needle) => text.rfind(needle.as_str()).ok_or_else(not_found),
            Anchor::AfterLast(needle) => text
                .rfind(needle.as_str())
                .map(|pos| pos + needle.len())
                .ok_or_else(not_found),
        }
    }
}

/// Locate the first `keyword {` block inside `range` and match its braces.
///
/// The keyword must stand alone (not part of a longer identifier) and be
/// followed by nothing but whitespace before the opening brace. With
/// [`Syntax::CLike`] occurrences inside comments and literals are skipped.
pub fn find_block(
    text: &str,
    range: Range<usize>,
    keyword: &str,
    syntax: Syntax,
) -> Result<BlockSpan, PatchError> {
    let code = code_only(text, syntax);
    let keyword_at = find_keyword_before_brace(&code, range, keyword)
        .ok_or_else(|| PatchError::AnchorNotFound(format!("`{} {{`", keyword)))?;

    match_block(text, keyword_at, syntax).map_err(|source| PatchError::MalformedBlock {
        keyword: keyword.to_string(),
        source,
    })
}

fn find_keyword_before_brace(text: &str, range: Range<usize>, keyword: &str) -> Option<usize> {
    let haystack = &text[range.clone()];
    let mut from = 0;

    while let Some(found) = haystack[from..].find(keyword) {
        let at = from + found;
        let after = at + keyword.len();

        let boundary_before = haystack[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident_char(c));
        let brace_follows = haystack[after..].trim_start().starts_with('{');

        if boundary_before && brace_follows {
            return Some(range.start + at);
        }
        from = after;
    }

    None
}

fn find_opening_tag(text: &str, tag: &str) -> Option<usize> {
    let needle = format!("<{}", tag);
    let mut from = 0;

    while let Some(found) = text[from..].find(&needle) {
        let at = from + found;
        let after = at + needle.len();
        match text[after..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(at),
            _ => from = after,
        }
    }

    None
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// If only whitespace precedes `pos` on its line, move to the line start
fn line_start_if_indented(text: &str, pos: usize) -> usize {
    let line_start = text[..pos].rfind('\n').map_or(0, |nl| nl + 1);
    if text[line_start..pos].trim().is_empty() {
        line_start
    } else {
        pos
    }
}

/// If only whitespace follows `pos` on its line, move past the newline
fn next_line_if_trailing_blank(text: &str, pos: usize) -> usize {
    match text[pos..].find('\n') {
        Some(nl) if text[pos..pos + nl].trim().is_empty() => pos + nl + 1,
        _ => pos,
    }
}
