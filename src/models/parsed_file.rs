//! Parse result for a single request file.

use super::request::Request;
use crate::config::ParserConfig;
use crate::environment::load_environment;
use crate::parser::ParseOptions;
use crate::variables::VariableScopes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Requests and variable scopes collected from one file and its imports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedFile {
    /// Path of the parsed file.
    pub path: PathBuf,

    /// Imported requests first (in import order), then this file's own.
    pub requests: Vec<Request>,

    /// File-scoped variables after import merging.
    pub variables: HashMap<String, String>,

    /// Variables of the selected environment.
    pub environment_variables: HashMap<String, String>,

    /// `$shared` variables from the environment files.
    pub global_variables: HashMap<String, String>,

    /// Variables from the dotenv file next to the request file.
    pub dotenv_variables: HashMap<String, String>,

    /// Absolute paths of the files imported directly by this file.
    pub imports: Vec<PathBuf>,
}

impl ParsedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Finds a request by its `@name`.
    pub fn request_named(&self, name: &str) -> Option<&Request> {
        self.requests
            .iter()
            .find(|r| r.name.as_deref() == Some(name))
    }

    /// Finds the last request of this file starting at or before `line`.
    ///
    /// Imported requests are ignored since their line numbers refer to
    /// other files.
    pub fn request_at_line(&self, line: usize) -> Option<&Request> {
        self.requests
            .iter()
            .filter(|r| r.file_path == self.path && r.line_number <= line)
            .max_by_key(|r| r.line_number)
    }

    /// Directory the file lives in.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// (Re)loads the selected environment's variables from the environment
    /// files next to this request file.
    pub fn load_environment(&mut self, environment: Option<&str>, config: &ParserConfig) {
        let loaded = load_environment(self.directory(), environment, config);
        self.environment_variables = loaded.variables;
        self.global_variables = loaded.shared;
    }

    /// Builds the variable scopes for resolving `request`, with fresh
    /// pre-generated system variables.
    pub fn scopes_for(&self, request: &Request, options: &ParseOptions) -> VariableScopes {
        VariableScopes::for_request(self, request, options)
    }
}
