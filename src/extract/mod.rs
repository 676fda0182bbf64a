//! Doc-comment extraction pipeline.
//!
//! `classify → group → validate → resolve paths → slice content → assemble`,
//! each stage consuming the complete output of the previous one. The
//! pipeline is pure: it never logs, never touches the file system and keeps
//! no state between calls.

pub mod assembler;
pub mod blocks;
pub mod content;
pub mod lines;
pub mod paths;
pub mod rules;

pub use assembler::{
    Diagnostic, DocumentationUnit, ExtractionResult, SelectedItem, Selection, StructuralItem,
};
pub use blocks::DocBlock;
pub use lines::{LineKind, SourceLine, DOC_MARKER};
pub use paths::{ItemKind, PathSegment, TomlPath};
pub use rules::{ValidationOutcome, ViolationKind};

use std::path::Path;

use crate::error::Result;
use crate::syntax::{StructuralParser, TomlGrammar};

pub struct Extractor<P = TomlGrammar> {
    parser: P,
    label: Option<String>,
}

impl Extractor<TomlGrammar> {
    pub fn new() -> Self {
        Self::with_parser(TomlGrammar::new())
    }
}

impl Default for Extractor<TomlGrammar> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StructuralParser> Extractor<P> {
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            label: None,
        }
    }

    /// Prefix for diagnostic messages, usually the file name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Extracts documentation from `source`.
    ///
    /// Fails only when the document itself cannot be parsed; rule violations
    /// end up in [`ExtractionResult::diagnostics`].
    pub fn extract(&self, source: &str) -> Result<ExtractionResult> {
        self.extract_labeled(source, self.label.as_deref())
    }

    /// Reads and extracts one file, labelling diagnostics with its path
    /// unless a label was set explicitly.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractionResult> {
        let source = std::fs::read_to_string(path)?;
        let label = self
            .label
            .clone()
            .unwrap_or_else(|| path.display().to_string());

        let result = self.extract_labeled(&source, Some(&label))?;
        tracing::debug!(
            "{}: {} documented item(s), {} diagnostic(s)",
            label,
            result.units.len(),
            result.diagnostics.len()
        );
        Ok(result)
    }

    fn extract_labeled(&self, source: &str, label: Option<&str>) -> Result<ExtractionResult> {
        let view = self.parser.parse(source)?;

        let index = lines::LineIndex::new(source);
        let classified = lines::classify(&index, &view);
        let doc_blocks = blocks::group_blocks(&classified);

        let starts = rules::ItemStarts::new(view.items.iter().map(|item| item.span));
        let outcomes = rules::validate_all(doc_blocks, &classified, &starts);

        let resolved = paths::resolve_paths(&view.items);

        Ok(assembler::assemble(&index, resolved, outcomes, label))
    }
}

/// Extracts documentation with the default tree-sitter parser.
pub fn extract(source: &str) -> Result<ExtractionResult> {
    Extractor::new().extract(source)
}
