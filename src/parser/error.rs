//! Error types for request-file parsing.
//!
//! Every variant carries enough context (file path, line, offending text or
//! import chain) to point users at the problem in their request files.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort parsing of a request file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file (or an imported file) could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line starting with `@` that is not `@name = value`.
    #[error(
        "Invalid variable definition '{text}' at {}:{line}. Expected format: '@name = value'",
        path.display()
    )]
    InvalidVariable {
        path: PathBuf,
        /// Line number in the source file (1-based)
        line: usize,
        text: String,
    },

    /// A line in the header section that is not `Name: Value`.
    #[error(
        "Invalid header format '{text}' at {}:{line}. Expected format: 'Header-Name: value'",
        path.display()
    )]
    InvalidHeader {
        path: PathBuf,
        /// Line number in the source file (1-based)
        line: usize,
        text: String,
    },

    /// A file imports itself, directly or through other files.
    ///
    /// `chain` is the import stack followed by the repeated path.
    #[error("Circular import: {}", format_chain(chain))]
    CircularImport { chain: Vec<PathBuf> },

    /// An `@import` target does not exist.
    #[error("Imported file {} not found (imported from {})", path.display(), importer.display())]
    ImportNotFound { importer: PathBuf, path: PathBuf },
}

impl ParseError {
    /// Returns the 1-based line number when the error is tied to one line.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::InvalidVariable { line, .. } | ParseError::InvalidHeader { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }

    /// The file the error was raised for, when there is a single one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ParseError::Io { path, .. }
            | ParseError::InvalidVariable { path, .. }
            | ParseError::InvalidHeader { path, .. } => Some(path),
            ParseError::ImportNotFound { importer, .. } => Some(importer),
            ParseError::CircularImport { .. } => None,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
