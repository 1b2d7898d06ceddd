//! Idempotent text patching
//!
//! This module provides:
//! - Anchor resolution (closing tags, keyword blocks, lines, needles)
//! - Brace matching as an explicit state machine
//! - Marker-guarded insertion that is a no-op once applied
//! - Block removal and scoped replacement for build scripts
//! - File-level application with a single encoding policy

pub mod anchor;
pub mod brace;
pub mod file;
pub mod text_io;

use std::borrow::Cow;
use thiserror::Error;

pub use anchor::{find_block, Anchor};
pub use brace::{code_only, match_block, BlockSpan, BraceError, Syntax};
pub use file::{edit_file, patch_file, FilePatchReport};
pub use text_io::{TextEncoding, TextFile, TextIoError};

/// Failure to locate an insertion point
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("anchor not found: {0}")]
    AnchorNotFound(String),

    #[error("malformed `{keyword}` block: {source}")]
    MalformedBlock {
        keyword: String,
        #[source]
        source: BraceError,
    },
}

/// A template inserted at an anchor unless its marker is already present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    marker: String,
    template: String,
    anchor: Anchor,
    syntax: Syntax,
}

impl Patch {
    /// Create a patch. The template should contain the marker, otherwise the
    /// patch is not idempotent.
    pub fn new(marker: impl Into<String>, template: impl Into<String>, anchor: Anchor) -> Self {
        let marker = marker.into();
        let template = template.into();
        debug_assert!(!marker.is_empty(), "patch marker must not be empty");
        debug_assert!(
            template.contains(&marker),
            "patch template must contain its marker"
        );

        Self {
            marker,
            template,
            anchor,
            syntax: Syntax::default(),
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    /// Whether `text` already carries this patch
    pub fn is_applied(&self, text: &str) -> bool {
        text.contains(&self.marker)
    }

    /// Apply the patch. Returns the input unchanged (borrowed) when the marker
    /// is already present.
    pub fn apply<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, PatchError> {
        if self.is_applied(text) {
            tracing::debug!(marker = %self.marker, "patch already present");
            return Ok(Cow::Borrowed(text));
        }

        let at = self.anchor.resolve(text, self.syntax)?;
        tracing::debug!(marker = %self.marker, anchor = %self.anchor, offset = at, "inserting template");

        let mut out = String::with_capacity(text.len() + self.template.len() + 1);
        out.push_str(&text[..at]);
        // Appending to a last line without a newline would glue the template to it
        if at == text.len() && !text.is_empty() && !text.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.template);
        out.push_str(&text[at..]);
        Ok(Cow::Owned(out))
    }

    /// Apply the patch in place. Returns `true` when the text changed.
    pub fn apply_in_place(&self, text: &mut String) -> Result<bool, PatchError> {
        match self.apply(text)? {
            Cow::Borrowed(_) => Ok(false),
            Cow::Owned(patched) => {
                *text = patched;
                Ok(true)
            }
        }
    }
}

/// Remove every `keyword { ... }` block, together with the lines it occupies
pub fn remove_blocks<'a>(
    text: &'a str,
    keyword: &str,
    syntax: Syntax,
) -> Result<Cow<'a, str>, PatchError> {
    let mut current = Cow::Borrowed(text);

    loop {
        let span = match find_block(&current, 0..current.len(), keyword, syntax) {
            Ok(span) => span,
            Err(PatchError::AnchorNotFound(_)) => return Ok(current),
            Err(e) => return Err(e),
        };

        let keyword_at = current[..span.open]
            .rfind(keyword)
            .unwrap_or(span.open);
        let line_start = current[..keyword_at].rfind('\n').map_or(0, |nl| nl + 1);
        let start = if current[line_start..keyword_at].trim().is_empty() {
            line_start
        } else {
            keyword_at
        };

        let after_close = span.close + 1;
        let end = match current[after_close..].find('\n') {
            Some(nl) if current[after_close..after_close + nl].trim().is_empty() => {
                after_close + nl + 1
            }
            _ => after_close,
        };

        tracing::debug!(keyword, start, end, "removing block");
        let mut out = String::with_capacity(current.len());
        out.push_str(&current[..start]);
        out.push_str(&current[end..]);
        current = Cow::Owned(out);
    }
}

/// Replace `from` with `to` inside a nested block path such as
/// `["buildTypes", "release"]`. Text outside the innermost block is untouched.
pub fn replace_in_block<'a>(
    text: &'a str,
    path: &[&str],
    from: &str,
    to: &str,
    syntax: Syntax,
) -> Result<Cow<'a, str>, PatchError> {
    let mut range = 0..text.len();
    for keyword in path {
        let span = find_block(text, range, keyword, syntax)?;
        range = span.body();
    }

    let body = &text[range.clone()];
    if !body.contains(from) {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..range.start]);
    out.push_str(&body.replace(from, to));
    out.push_str(&text[range.end..]);
    Ok(Cow::Owned(out))
}
