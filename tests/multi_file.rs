//! Multi-file runs: config discovery, directory walking and per-file extraction.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use toml_doc::{Config, Extractor, FileWalker, OutputFormat, TomlDocError, ViolationKind};

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn setup_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(
        root,
        ".toml-doc.yml",
        "strict: true\nformat: json\nexclude:\n  - \"vendor/**\"\n",
    );
    write(
        root,
        "pyproject.toml",
        "#: Project table.\n[project]\nname = \"demo\"\n",
    );
    write(
        root,
        "config/server.toml",
        "[server]\nhost = \"h\"\n#: Too close.\nport = 1\n",
    );
    write(root, "config/broken.toml", "[server\nport = 1\n");
    write(root, "vendor/third_party.toml", "#: orphan\n");
    write(root, "notes.md", "#: not toml\n");

    temp_dir
}

#[test]
fn test_config_discovered_in_directory() {
    let workspace = setup_workspace();
    let config = Config::discover(workspace.path(), None).unwrap();

    assert!(config.strict);
    assert_eq!(config.format, OutputFormat::Json);
    assert!(config.recursive);
    assert_eq!(config.exclude, vec!["vendor/**".to_string()]);
}

#[test]
fn test_walk_respects_exclude() {
    let workspace = setup_workspace();
    let config = Config::discover(workspace.path(), None).unwrap();

    let files = FileWalker::new()
        .with_exclude(&config.exclude)
        .unwrap()
        .walk(workspace.path())
        .unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(workspace.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();

    assert_eq!(
        names,
        vec!["config/broken.toml", "config/server.toml", "pyproject.toml"]
    );
}

#[test]
fn test_each_file_extracted_independently() {
    let workspace = setup_workspace();
    let files = FileWalker::new()
        .with_exclude(&["vendor/**"])
        .unwrap()
        .walk(workspace.path())
        .unwrap();

    let extractor = Extractor::new();
    let mut documented = 0;
    let mut violations = Vec::new();
    let mut fatal = 0;

    for file in &files {
        match extractor.extract_file(file) {
            Ok(result) => {
                documented += result.units.len();
                violations.extend(result.diagnostics.iter().map(|d| d.kind));
            }
            Err(TomlDocError::Syntax { line, .. }) => {
                assert!(line <= 2);
                fatal += 1;
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(documented, 1);
    assert_eq!(violations, vec![ViolationKind::SeparatorViolation]);
    assert_eq!(fatal, 1);
}

#[test]
fn test_diagnostic_names_the_file() {
    let workspace = setup_workspace();
    let path = workspace.path().join("config/server.toml");

    let result = Extractor::new().extract_file(&path).unwrap();
    let diagnostic = &result.diagnostics[0];

    assert!(diagnostic.message.contains("server.toml"));
    assert!(diagnostic.message.contains("line 3"));
    assert_eq!(diagnostic.suggestion(), "insert a blank line before line 3");
}

#[test]
fn test_missing_file_is_io_error() {
    let workspace = setup_workspace();
    let err = Extractor::new()
        .extract_file(&workspace.path().join("absent.toml"))
        .unwrap_err();
    assert!(matches!(err, TomlDocError::Io(_)));
}
