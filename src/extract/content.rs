//! Verbatim slicing of item source text.

use crate::extract::lines::LineIndex;
use crate::syntax::LineSpan;

/// Raw text of `span`, from the first byte of its first line to the last
/// byte of its last line. Inline comments on those lines are included; the
/// final line terminator is not.
pub fn slice<'a>(index: &LineIndex<'a>, span: LineSpan) -> &'a str {
    index
        .byte_range(span.start, span.end)
        .map(|range| &index.source()[range])
        .unwrap_or("")
}
