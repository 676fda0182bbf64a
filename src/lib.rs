//! Extraction of `#:` doc-comments from TOML documents.
//!
//! ```text
//! [project]
//!
//! #: The distribution name.
//! name = "demo"
//! ```
//!
//! yields one [`DocumentationUnit`] for `project.name`. A doc-comment block
//! must follow a blank line (or start the file) and must sit directly on top
//! of the item it documents; blocks breaking either rule are reported as
//! [`Diagnostic`]s instead.

pub mod config;
pub mod error;
pub mod extract;
pub mod syntax;
pub mod walker;

pub use config::{Config, ConfigOverrides, OutputFormat, CONFIG_FILENAME};
pub use error::{Result, TomlDocError};
pub use extract::{
    extract, Diagnostic, DocumentationUnit, ExtractionResult, Extractor, ItemKind, PathSegment,
    SelectedItem, Selection, StructuralItem, TomlPath, ViolationKind, DOC_MARKER,
};
pub use syntax::{LineHint, LineSpan, RawItem, RawItemKind, StructuralParser, SyntaxView, TomlGrammar};
pub use walker::FileWalker;
