//! Separator and Attachment rules.
//!
//! A doc block `(s, e)` is valid when line `s - 1` is blank (or `s` is the
//! first line) and line `e + 1` is the first line of a structural item.
//! Blocks are disjoint and never adjacent, so each item start line can be
//! claimed by at most one block.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::extract::blocks::DocBlock;
use crate::extract::lines::SourceLine;
use crate::syntax::LineSpan;

/// Index of a structural item in document order.
pub type ItemId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    SeparatorViolation,
    AttachmentViolation,
    OrphanViolation,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::SeparatorViolation => "separator",
            ViolationKind::AttachmentViolation => "attachment",
            ViolationKind::OrphanViolation => "orphan",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Attached { block: DocBlock, item: ItemId },
    Violation { kind: ViolationKind, block_span: LineSpan },
}

/// Start line of every structural item.
#[derive(Debug, Clone, Default)]
pub struct ItemStarts {
    starts: BTreeMap<usize, ItemId>,
}

impl ItemStarts {
    pub fn new(spans: impl IntoIterator<Item = LineSpan>) -> Self {
        let starts = spans
            .into_iter()
            .enumerate()
            .map(|(id, span)| (span.start, id))
            .collect();
        Self { starts }
    }

    pub fn at(&self, line: usize) -> Option<ItemId> {
        self.starts.get(&line).copied()
    }

    pub fn any_after(&self, line: usize) -> bool {
        self.starts.range(line + 1..).next().is_some()
    }
}

pub fn validate(block: DocBlock, lines: &[SourceLine<'_>], starts: &ItemStarts) -> ValidationOutcome {
    let span = block.span;

    if !separated(span, lines) {
        return ValidationOutcome::Violation {
            kind: ViolationKind::SeparatorViolation,
            block_span: span,
        };
    }

    match starts.at(span.end + 1) {
        Some(item) => ValidationOutcome::Attached { block, item },
        None if starts.any_after(span.end) => ValidationOutcome::Violation {
            kind: ViolationKind::AttachmentViolation,
            block_span: span,
        },
        None => ValidationOutcome::Violation {
            kind: ViolationKind::OrphanViolation,
            block_span: span,
        },
    }
}

pub fn validate_all(
    blocks: Vec<DocBlock>,
    lines: &[SourceLine<'_>],
    starts: &ItemStarts,
) -> Vec<ValidationOutcome> {
    blocks
        .into_iter()
        .map(|block| validate(block, lines, starts))
        .collect()
}

fn separated(span: LineSpan, lines: &[SourceLine<'_>]) -> bool {
    if span.start == 1 {
        return true;
    }
    lines
        .get(span.start - 2)
        .is_some_and(|previous| previous.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::lines::LineKind;

    fn lines(kinds: &[LineKind<'static>]) -> Vec<SourceLine<'static>> {
        kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| SourceLine {
                number: i + 1,
                text: "",
                kind: *kind,
            })
            .collect()
    }

    fn block(start: usize, end: usize) -> DocBlock {
        DocBlock {
            span: LineSpan::new(start, end),
            text: "doc".to_string(),
        }
    }

    #[test]
    fn test_attached_after_blank() {
        let lines = lines(&[LineKind::Blank, LineKind::DocComment("doc"), LineKind::Structural]);
        let starts = ItemStarts::new([LineSpan::single(3)]);

        let outcome = validate(block(2, 2), &lines, &starts);
        assert_eq!(
            outcome,
            ValidationOutcome::Attached {
                block: block(2, 2),
                item: 0
            }
        );
    }

    #[test]
    fn test_attached_at_document_start() {
        let lines = lines(&[LineKind::DocComment("doc"), LineKind::Structural]);
        let starts = ItemStarts::new([LineSpan::single(2)]);

        assert!(matches!(
            validate(block(1, 1), &lines, &starts),
            ValidationOutcome::Attached { item: 0, .. }
        ));
    }

    #[test]
    fn test_separator_violation() {
        let lines = lines(&[
            LineKind::Structural,
            LineKind::DocComment("doc"),
            LineKind::Structural,
        ]);
        let starts = ItemStarts::new([LineSpan::single(1), LineSpan::single(3)]);

        assert_eq!(
            validate(block(2, 2), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::SeparatorViolation,
                block_span: LineSpan::single(2)
            }
        );
    }

    #[test]
    fn test_ordinary_comment_is_not_a_separator() {
        let lines = lines(&[LineKind::Comment, LineKind::DocComment("doc"), LineKind::Structural]);
        let starts = ItemStarts::new([LineSpan::single(3)]);

        assert!(matches!(
            validate(block(2, 2), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::SeparatorViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_attachment_violation_on_blank() {
        let lines = lines(&[
            LineKind::Blank,
            LineKind::DocComment("doc"),
            LineKind::Blank,
            LineKind::Structural,
        ]);
        let starts = ItemStarts::new([LineSpan::single(4)]);

        assert!(matches!(
            validate(block(2, 2), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::AttachmentViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_attachment_violation_on_comment() {
        let lines = lines(&[
            LineKind::Blank,
            LineKind::DocComment("doc"),
            LineKind::Comment,
            LineKind::Structural,
        ]);
        let starts = ItemStarts::new([LineSpan::single(4)]);

        assert!(matches!(
            validate(block(2, 2), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::AttachmentViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_orphan_at_end_of_file() {
        let lines = lines(&[LineKind::Structural, LineKind::Blank, LineKind::DocComment("doc")]);
        let starts = ItemStarts::new([LineSpan::single(1)]);

        assert!(matches!(
            validate(block(3, 3), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::OrphanViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_orphan_followed_by_blank_lines_only() {
        let lines = lines(&[LineKind::DocComment("doc"), LineKind::Blank, LineKind::Comment]);
        let starts = ItemStarts::default();

        assert!(matches!(
            validate(block(1, 1), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::OrphanViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_separator_checked_before_attachment() {
        let lines = lines(&[
            LineKind::Structural,
            LineKind::DocComment("doc"),
            LineKind::Blank,
        ]);
        let starts = ItemStarts::new([LineSpan::single(1)]);

        assert!(matches!(
            validate(block(2, 2), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::SeparatorViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_non_start_line_is_detached() {
        let lines = lines(&[
            LineKind::Blank,
            LineKind::DocComment("doc"),
            LineKind::Structural,
            LineKind::Structural,
        ]);
        let starts = ItemStarts::new([LineSpan::single(4)]);

        assert!(matches!(
            validate(block(2, 2), &lines, &starts),
            ValidationOutcome::Violation {
                kind: ViolationKind::AttachmentViolation,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_all_keeps_order() {
        let lines = lines(&[
            LineKind::DocComment("a"),
            LineKind::Structural,
            LineKind::DocComment("b"),
            LineKind::Structural,
        ]);
        let starts = ItemStarts::new([LineSpan::single(2), LineSpan::single(4)]);
        let outcomes = validate_all(vec![block(1, 1), block(3, 3)], &lines, &starts);

        assert!(matches!(outcomes[0], ValidationOutcome::Attached { item: 0, .. }));
        assert!(matches!(
            outcomes[1],
            ValidationOutcome::Violation {
                kind: ViolationKind::SeparatorViolation,
                ..
            }
        ));
    }
}
