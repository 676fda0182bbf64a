//! Final assembly of extraction results and read-only projections over them.

use serde::Serialize;

use crate::error::{Result, TomlDocError};
use crate::extract::blocks::DocBlock;
use crate::extract::content;
use crate::extract::lines::LineIndex;
use crate::extract::paths::{ItemKind, PathSegment, ResolvedItem, TomlPath};
use crate::extract::rules::{ItemId, ValidationOutcome, ViolationKind};
use crate::syntax::LineSpan;

/// A table header, array-of-tables header or key-value entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralItem {
    pub path: TomlPath,
    pub kind: ItemKind,
    pub span: LineSpan,
    pub raw_text: String,
    #[serde(skip)]
    unit: Option<usize>,
}

impl StructuralItem {
    pub fn is_documented(&self) -> bool {
        self.unit.is_some()
    }
}

/// Documentation attached to one structural item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationUnit {
    pub path: TomlPath,
    pub doc_text: String,
    pub raw_toml_content: String,
    pub item_kind: ItemKind,
    /// First line of the doc-comment block.
    pub line_number: usize,
    /// Lines of the documented item.
    pub span: LineSpan,
}

impl DocumentationUnit {
    pub fn full_path(&self) -> String {
        self.path.to_string()
    }

    /// `[project.dependencies]`, `[[servers]]` or `project.name`.
    pub fn toml_path(&self) -> String {
        match self.item_kind {
            ItemKind::Table => format!("[{}]", self.path.header_form()),
            ItemKind::ArrayTableElement(_) => format!("[[{}]]", self.path.header_form()),
            ItemKind::KeyValue => self.path.header_form(),
        }
    }

    /// Anchor suitable for HTML ids, e.g. `toml-project-dependencies`.
    pub fn anchor_id(&self) -> String {
        let mut id = String::from("toml");
        for segment in self.path.segments() {
            id.push('-');
            match segment {
                PathSegment::Key(key) => id.extend(key.chars().map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                        c.to_ascii_lowercase()
                    } else {
                        '-'
                    }
                })),
                PathSegment::Index(index) => id.push_str(&index.to_string()),
            }
        }
        id
    }
}

/// A rejected doc-comment block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: ViolationKind,
    pub block_start_line: usize,
    pub block_end_line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ViolationKind, block_span: LineSpan, label: Option<&str>) -> Self {
        let what = match kind {
            ViolationKind::SeparatorViolation => "must be preceded by a blank line",
            ViolationKind::AttachmentViolation => {
                "is not directly followed by the item it documents"
            }
            ViolationKind::OrphanViolation => "has no item to document",
        };
        let location = if block_span.start == block_span.end {
            format!("line {}", block_span.start)
        } else {
            format!("lines {}", block_span)
        };
        let message = match label {
            Some(label) => format!("{}: doc-comment at {} {}", label, location, what),
            None => format!("doc-comment at {} {}", location, what),
        };

        Self {
            kind,
            block_start_line: block_span.start,
            block_end_line: block_span.end,
            message,
        }
    }

    pub fn span(&self) -> LineSpan {
        LineSpan::new(self.block_start_line, self.block_end_line)
    }

    /// Edit that would make the block valid.
    pub fn suggestion(&self) -> String {
        match self.kind {
            ViolationKind::SeparatorViolation => {
                format!("insert a blank line before line {}", self.block_start_line)
            }
            ViolationKind::AttachmentViolation => format!(
                "remove the lines between line {} and the next item",
                self.block_end_line
            ),
            ViolationKind::OrphanViolation => {
                "remove the block or add the item it documents right after it".to_string()
            }
        }
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Valid documentation, in document order.
    pub units: Vec<DocumentationUnit>,
    /// Rejected blocks, in document order.
    pub diagnostics: Vec<Diagnostic>,
    /// Every structural item, documented or not.
    pub items: Vec<StructuralItem>,
}

/// Which items a rendering layer wants to see.
///
/// Depth is counted in key segments of the resolved path, not in source
/// nesting. A dotted entry `b.c = 1` written in the body of `[a]` has path
/// `a.b.c`, so it is not a direct child of `a` when `recursive` is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub root: TomlPath,
    /// Include items without documentation.
    pub show_all: bool,
    /// Include the full subtree instead of direct children only.
    pub recursive: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            root: TomlPath::root(),
            show_all: false,
            recursive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedItem<'a> {
    pub item: &'a StructuralItem,
    pub doc: Option<&'a DocumentationUnit>,
}

impl ExtractionResult {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Documentation for exactly `path`.
    pub fn unit(&self, path: &TomlPath) -> Result<&DocumentationUnit> {
        self.units
            .iter()
            .find(|unit| &unit.path == path)
            .ok_or_else(|| TomlDocError::UnresolvedPath(path.to_string()))
    }

    pub fn documentation_for(&self, item: &StructuralItem) -> Option<&DocumentationUnit> {
        item.unit.and_then(|i| self.units.get(i))
    }

    /// Projects the items below `selection.root`.
    ///
    /// The root item itself (and, for arrays of tables, each element) is part
    /// of the selection. Results keep document order.
    pub fn select(&self, selection: &Selection) -> Vec<SelectedItem<'_>> {
        let root_depth = selection.root.key_depth();

        self.items
            .iter()
            .filter(|item| item.path.starts_with(&selection.root))
            .filter(|item| selection.recursive || item.path.key_depth() - root_depth <= 1)
            .map(|item| SelectedItem {
                item,
                doc: self.documentation_for(item),
            })
            .filter(|selected| selection.show_all || selected.doc.is_some())
            .collect()
    }

    /// Promotes any violation to an error.
    pub fn into_strict(self, file: &str) -> Result<Self> {
        if self.diagnostics.is_empty() {
            Ok(self)
        } else {
            Err(TomlDocError::StrictViolations {
                file: file.to_string(),
                count: self.diagnostics.len(),
            })
        }
    }
}

pub fn assemble(
    index: &LineIndex<'_>,
    resolved: Vec<ResolvedItem>,
    outcomes: Vec<ValidationOutcome>,
    label: Option<&str>,
) -> ExtractionResult {
    let mut attached: Vec<(ItemId, DocBlock)> = Vec::new();
    let mut diagnostics = Vec::new();

    for outcome in outcomes {
        match outcome {
            ValidationOutcome::Attached { block, item } => attached.push((item, block)),
            ValidationOutcome::Violation { kind, block_span } => {
                diagnostics.push(Diagnostic::new(kind, block_span, label))
            }
        }
    }
    attached.sort_by_key(|(item, _)| *item);

    let mut items: Vec<StructuralItem> = resolved
        .into_iter()
        .map(|r| StructuralItem {
            raw_text: content::slice(index, r.span).to_string(),
            path: r.path,
            kind: r.kind,
            span: r.span,
            unit: None,
        })
        .collect();

    let mut units = Vec::with_capacity(attached.len());
    for (item_id, block) in attached {
        let Some(item) = items.get_mut(item_id) else {
            continue;
        };
        item.unit = Some(units.len());
        units.push(DocumentationUnit {
            path: item.path.clone(),
            doc_text: block.text,
            raw_toml_content: item.raw_text.clone(),
            item_kind: item.kind,
            line_number: block.span.start,
            span: item.span,
        });
    }

    ExtractionResult {
        units,
        diagnostics,
        items,
    }
}
