//! Structural view of a TOML document.
//!
//! The extraction pipeline only ever sees a [`SyntaxView`]: one [`LineHint`]
//! per source line plus the list of raw structural items (table headers,
//! array-of-tables headers, key-value entries) with their line spans. Any
//! parser able to produce that view can be plugged into
//! [`Extractor::with_parser`](crate::extract::Extractor::with_parser).

pub mod grammar;
pub mod keys;

pub use grammar::TomlGrammar;
pub use keys::{split_dotted, KeyPart};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Inclusive range of 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start >= 1 && start <= end);
        Self { start, end }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

}

impl std::fmt::Display for LineSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// What the parser knows about a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineHint {
    /// A comment is the first thing on this line.
    Comment,
    /// Part of a header or of a key-value entry (including multi-line values).
    Content,
    /// Neither: blank, or only whitespace between items.
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawItemKind {
    Header,
    ArrayHeader,
    Entry,
}

/// A structural item as the parser reports it, before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub kind: RawItemKind,
    /// Key segments as written: `[a."b.c"]` gives `["a", "b.c"]`.
    pub key: Vec<String>,
    pub span: LineSpan,
}

/// Line hints plus raw items, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxView {
    /// One hint per source line; index 0 is line 1.
    pub hints: Vec<LineHint>,
    pub items: Vec<RawItem>,
}

impl SyntaxView {
    pub fn hint(&self, line: usize) -> LineHint {
        line.checked_sub(1)
            .and_then(|idx| self.hints.get(idx))
            .copied()
            .unwrap_or(LineHint::Free)
    }
}

/// A comment- and whitespace-preserving parser for the tabular markup.
pub trait StructuralParser {
    /// Parses `source` or fails with [`TomlDocError::Syntax`](crate::TomlDocError::Syntax).
    fn parse(&self, source: &str) -> Result<SyntaxView>;
}

impl<P: StructuralParser + ?Sized> StructuralParser for &P {
    fn parse(&self, source: &str) -> Result<SyntaxView> {
        (**self).parse(source)
    }
}
