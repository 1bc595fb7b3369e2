use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by docblock operations.
#[derive(Debug, Error)]
pub enum DocBlockError {
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist `{path}`: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },

    #[error("Syntax error in `{path}` on line {line}, column {column}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Failed to parse `{path}`")]
    ParseFailed { path: PathBuf },

    #[error("PHP grammar could not be loaded: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Declarations in `{path}` no longer match the source ({original} vs {modified})")]
    TreeMismatch {
        path: PathBuf,
        original: usize,
        modified: usize,
    },

    #[error("Ignore error: {0}")]
    Ignore(#[from] ignore::Error),
}

impl DocBlockError {
    /// Returns true for errors that only concern the contents of a single
    /// file and leave the file untouched on disk.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Syntax { .. } | Self::ParseFailed { .. })
    }
}
