//! Grouping of doc-comment lines into blocks.

use serde::Serialize;

use crate::extract::lines::{LineKind, SourceLine};
use crate::syntax::LineSpan;

/// A maximal run of consecutive doc-comment lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocBlock {
    pub span: LineSpan,
    /// Marker-stripped lines joined with `\n`.
    pub text: String,
}

pub fn group_blocks(lines: &[SourceLine<'_>]) -> Vec<DocBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for line in lines {
        match line.kind {
            LineKind::DocComment(content) => match current.as_mut() {
                Some((_, parts)) => parts.push(content),
                None => current = Some((line.number, vec![content])),
            },
            _ => {
                if let Some((start, parts)) = current.take() {
                    blocks.push(finish(start, parts));
                }
            }
        }
    }

    if let Some((start, parts)) = current {
        blocks.push(finish(start, parts));
    }

    blocks
}

fn finish(start: usize, parts: Vec<&str>) -> DocBlock {
    DocBlock {
        span: LineSpan::new(start, start + parts.len() - 1),
        text: parts.join("\n"),
    }
}
