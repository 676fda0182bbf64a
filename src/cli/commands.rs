use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;

use toml_doc::{
    Diagnostic, ExtractionResult, Extractor, FileWalker, LineSpan, OutputFormat, Result,
    SelectedItem, Selection, TomlPath,
};

#[derive(Parser)]
#[command(name = "toml-doc")]
#[command(about = "Extract and lint #: doc-comments in TOML files")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Show documented items of a file
    toml-doc extract pyproject.toml

    # Show every direct child of [tool.hatch], documented or not
    toml-doc extract pyproject.toml --root tool.hatch --all --direct

    # Check all TOML files below the current directory
    toml-doc lint

    # Fail on any misplaced doc-comment
    toml-doc lint config/ --strict

    # List structural item paths as JSON
    toml-doc paths Cargo.toml --format json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a settings file (defaults to ./.toml-doc.yml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print documentation extracted from a TOML file
    Extract {
        /// TOML file to read
        file: PathBuf,

        /// Only show items below this dotted path (array elements as `#0`)
        #[arg(long)]
        root: Option<TomlPath>,

        /// Include items without documentation
        #[arg(long, overrides_with = "no_all")]
        all: bool,

        /// Only documented items (overrides `show_all` from the config)
        #[arg(long, overrides_with = "all")]
        no_all: bool,

        /// Only direct children of the root instead of the full subtree
        #[arg(long, overrides_with = "recursive")]
        direct: bool,

        /// The full subtree below the root (overrides `recursive: false`)
        #[arg(long, overrides_with = "direct")]
        recursive: bool,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Fail when any doc-comment breaks the placement rules
        #[arg(long, overrides_with = "no_strict")]
        strict: bool,

        /// Report violations without failing (overrides `strict: true`)
        #[arg(long, overrides_with = "strict")]
        no_strict: bool,
    },

    /// Report misplaced doc-comments
    Lint {
        /// Files or directories to check
        paths: Vec<PathBuf>,

        /// Exit with an error on any violation
        #[arg(long, overrides_with = "no_strict")]
        strict: bool,

        /// Never fail on violations (overrides `strict: true`)
        #[arg(long, overrides_with = "strict")]
        no_strict: bool,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List the path of every table, array element and key
    Paths {
        /// TOML file to read
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

/// Turns a `--flag/--no-flag` pair into an optional override.
pub fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub struct ExtractOptions {
    pub root: TomlPath,
    pub show_all: bool,
    pub recursive: bool,
    pub format: OutputFormat,
    pub strict: bool,
}

#[derive(Serialize)]
struct ItemOutput<'a> {
    path: &'a TomlPath,
    kind: &'static str,
    span: LineSpan,
    #[serde(skip_serializing_if = "Option::is_none")]
    toml_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_text: Option<&'a str>,
    raw_toml_content: &'a str,
}

impl<'a> From<SelectedItem<'a>> for ItemOutput<'a> {
    fn from(selected: SelectedItem<'a>) -> Self {
        Self {
            path: &selected.item.path,
            kind: selected.item.kind.as_str(),
            span: selected.item.span,
            toml_path: selected.doc.map(|d| d.toml_path()),
            doc_text: selected.doc.map(|d| d.doc_text.as_str()),
            raw_toml_content: &selected.item.raw_text,
        }
    }
}

#[derive(Serialize)]
struct LintOutput<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    diagnostics: &'a [Diagnostic],
}

pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<()> {
    let label = path.display().to_string();
    let result = Extractor::new().extract_file(path)?;

    for diagnostic in &result.diagnostics {
        tracing::warn!("{}", diagnostic.message);
    }
    let result = if options.strict {
        result.into_strict(&label)?
    } else {
        result
    };

    let selection = Selection {
        root: options.root.clone(),
        show_all: options.show_all,
        recursive: options.recursive,
    };
    let selected = result.select(&selection);
    if selected.is_empty() {
        tracing::info!("No doc-comments found in {}", label);
    }

    match options.format {
        OutputFormat::Json => {
            let output: Vec<ItemOutput> = selected.into_iter().map(ItemOutput::from).collect();
            print_json(&output)?;
        }
        OutputFormat::Text => {
            for item in selected {
                print_item(item);
            }
        }
    }

    Ok(())
}

fn print_item(selected: SelectedItem<'_>) {
    match selected.doc {
        Some(doc) => {
            println!("{}  (line {})", doc.toml_path(), selected.item.span.start);
            for line in doc.doc_text.lines() {
                println!("    {}", line);
            }
        }
        None => {
            println!(
                "{}  (line {}, undocumented)",
                selected.item.path, selected.item.span.start
            );
        }
    }
    println!();
    for line in selected.item.raw_text.lines() {
        println!("    | {}", line);
    }
    println!();
}

pub fn lint(
    roots: &[PathBuf],
    exclude: &[String],
    strict: bool,
    format: OutputFormat,
) -> Result<bool> {
    let walker = FileWalker::new().with_exclude(exclude)?;
    let files = walker.walk_all(roots)?;
    tracing::info!("Checking {} file(s)", files.len());

    // Each document is independent; extraction keeps no shared state.
    let results: Vec<(PathBuf, Result<ExtractionResult>)> = files
        .par_iter()
        .map(|file| (file.clone(), Extractor::new().extract_file(file)))
        .collect();

    let mut fatal = 0;
    let mut violations = 0;
    let mut outputs = Vec::new();

    for (file, result) in &results {
        match result {
            Ok(extraction) => {
                violations += extraction.diagnostics.len();
                outputs.push(LintOutput {
                    file: file.display().to_string(),
                    error: None,
                    diagnostics: &extraction.diagnostics,
                });
            }
            Err(e) => {
                fatal += 1;
                outputs.push(LintOutput {
                    file: file.display().to_string(),
                    error: Some(e.to_string()),
                    diagnostics: &[],
                });
            }
        }
    }

    match format {
        OutputFormat::Json => print_json(&outputs)?,
        OutputFormat::Text => {
            for output in &outputs {
                if let Some(error) = &output.error {
                    println!("{}: error: {}", output.file, error);
                }
                for diagnostic in output.diagnostics {
                    println!("{} [{}]", diagnostic.message, diagnostic.kind);
                    println!("    help: {}", diagnostic.suggestion());
                }
            }
            println!(
                "{} file(s) checked, {} violation(s), {} error(s)",
                results.len(),
                violations,
                fatal
            );
        }
    }

    Ok(fatal == 0 && (!strict || violations == 0))
}

pub fn list_paths(path: &Path, format: OutputFormat) -> Result<()> {
    let result = Extractor::new().extract_file(path)?;
    let selection = Selection {
        show_all: true,
        ..Default::default()
    };
    let selected = result.select(&selection);

    match format {
        OutputFormat::Json => {
            let output: Vec<ItemOutput> = selected.into_iter().map(ItemOutput::from).collect();
            print_json(&output)?;
        }
        OutputFormat::Text => {
            for item in selected {
                println!(
                    "{:<40} {:<12} {}",
                    item.item.path.to_string(),
                    item.item.kind.as_str(),
                    if item.doc.is_some() { "documented" } else { "-" }
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
