use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{Result, TomlDocError};
use crate::syntax::TomlGrammar;

/// Finds TOML documents below a set of roots.
pub struct FileWalker {
    grammar: TomlGrammar,
    exclude: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new() -> Self {
        Self {
            grammar: TomlGrammar::new(),
            exclude: Vec::new(),
        }
    }

    pub fn with_exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            let compiled = glob::Pattern::new(pattern.as_ref()).map_err(|e| {
                TomlDocError::Config(format!("Invalid exclude pattern {}: {}", pattern.as_ref(), e))
            })?;
            self.exclude.push(compiled);
        }
        Ok(self)
    }

    /// Files are returned as is; directories are walked respecting
    /// `.gitignore` and hidden-file rules.
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !root.exists() {
            return Err(TomlDocError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", root.display()),
            )));
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_file() && self.is_supported(path) && !self.is_excluded(root, path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        tracing::debug!(
            "Found {} {} file(s) under {}",
            files.len(),
            self.grammar.name(),
            root.display()
        );
        Ok(files)
    }

    pub fn walk_all(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in roots {
            files.extend(self.walk(root)?);
        }
        // Roots may overlap (a directory and a file inside it).
        files.sort();
        files.dedup();
        Ok(files)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.grammar.file_extensions().contains(&ext))
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

impl Default for FileWalker {
    fn default() -> Self {
        Self::new()
    }
}
