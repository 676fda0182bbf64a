use thiserror::Error;

#[derive(Error, Debug)]
pub enum TomlDocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("No documentation for path: {0}")]
    UnresolvedPath(String),

    #[error("{file}: {count} doc-comment violation(s) in strict mode")]
    StrictViolations { file: String, count: usize },
}

impl TomlDocError {
    /// Builds a syntax error from a 0-based tree-sitter position.
    pub fn syntax_at(row: usize, column: usize, message: impl Into<String>) -> Self {
        TomlDocError::Syntax {
            line: row + 1,
            column: column + 1,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TomlDocError>;
