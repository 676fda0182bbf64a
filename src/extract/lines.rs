//! Line classification.

use crate::syntax::{LineHint, SyntaxView};

/// Marker that turns an ordinary `#` comment into a doc-comment.
pub const DOC_MARKER: &str = "#:";

/// Byte offsets of every line in a source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    /// `(start, end)` per line; `end` excludes the line terminator.
    bounds: Vec<(usize, usize)>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut bounds = Vec::new();
        let mut offset = 0;

        for piece in source.split_inclusive('\n') {
            let text = piece.strip_suffix('\n').unwrap_or(piece);
            let text = text.strip_suffix('\r').unwrap_or(text);
            bounds.push((offset, offset + text.len()));
            offset += piece.len();
        }

        Self { source, bounds }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Text of 1-based `line`, without its terminator.
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let (start, end) = *self.bounds.get(line.checked_sub(1)?)?;
        Some(&self.source[start..end])
    }

    /// Byte range from the start of `first` to the end of `last` (inclusive lines).
    pub fn byte_range(&self, first: usize, last: usize) -> Option<std::ops::Range<usize>> {
        let (start, _) = *self.bounds.get(first.checked_sub(1)?)?;
        let (_, end) = *self.bounds.get(last.checked_sub(1)?)?;
        (start <= end).then_some(start..end)
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// Doc-comment line; carries the text after the marker.
    DocComment(&'a str),
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
    pub kind: LineKind<'a>,
}

impl SourceLine<'_> {
    pub fn is_blank(&self) -> bool {
        self.kind == LineKind::Blank
    }

    pub fn is_doc(&self) -> bool {
        matches!(self.kind, LineKind::DocComment(_))
    }
}

/// Labels every line of the document.
///
/// Whether a line is a comment at all is decided by the parser's hints; the
/// marker check only splits comments into doc and ordinary ones.
pub fn classify<'a>(index: &LineIndex<'a>, view: &SyntaxView) -> Vec<SourceLine<'a>> {
    (1..=index.len())
        .filter_map(|number| {
            let text = index.line(number)?;
            let kind = match view.hint(number) {
                LineHint::Comment => classify_comment(text),
                LineHint::Content => LineKind::Structural,
                LineHint::Free if text.trim().is_empty() => LineKind::Blank,
                LineHint::Free => LineKind::Structural,
            };
            Some(SourceLine { number, text, kind })
        })
        .collect()
}

fn classify_comment(text: &str) -> LineKind<'_> {
    match text.trim_start().strip_prefix(DOC_MARKER) {
        Some(rest) => LineKind::DocComment(doc_content(rest)),
        None => LineKind::Comment,
    }
}

/// Drops one separating whitespace character and any trailing whitespace.
fn doc_content(rest: &str) -> &str {
    let rest = rest
        .strip_prefix(' ')
        .or_else(|| rest.strip_prefix('\t'))
        .unwrap_or(rest);
    rest.trim_end()
}
