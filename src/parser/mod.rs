//! Request file parser.
//!
//! This module turns `.http` and `.rest` files into a [`ParsedFile`]: the
//! ordered requests (imports first), the file-scoped variables and the
//! environment and dotenv variables found next to the file.
//!
//! Parsing runs in three layers:
//!
//! - [`line::classify`] tags each physical line on its own.
//! - The state machine in [`state`] builds requests from classified lines.
//! - [`import`] parses `# @import "file"` targets recursively.

pub mod error;
pub mod import;
pub mod line;
pub mod request_line;
pub mod state;

pub use error::ParseError;

use crate::config::ParserConfig;
use crate::environment::{load_environment, EnvironmentVariables};
use crate::models::ParsedFile;
use crate::variables::{OsEnvironment, ProcessEnv};
use state::FileParser;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Caller-supplied inputs for parsing and resolution.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Programmatic variables; these take precedence over every other scope.
    pub variables: HashMap<String, String>,

    /// Environment to select from the environment files. Falls back to
    /// `config.default_environment`.
    pub environment: Option<String>,

    pub config: ParserConfig,

    /// Source of process environment variables.
    pub process_env: Arc<dyn ProcessEnv>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            variables: HashMap::new(),
            environment: None,
            config: ParserConfig::default(),
            process_env: Arc::new(OsEnvironment),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_process_env(mut self, process_env: Arc<dyn ProcessEnv>) -> Self {
        self.process_env = process_env;
        self
    }
}

/// State shared by the root file and all of its imports.
pub(crate) struct ParseContext<'a> {
    pub(crate) options: &'a ParseOptions,
    pub(crate) environment: EnvironmentVariables,
}

impl<'a> ParseContext<'a> {
    fn new(root: &Path, options: &'a ParseOptions) -> Self {
        let dir = root.parent().unwrap_or_else(|| Path::new("."));
        let environment = load_environment(dir, options.environment.as_deref(), &options.config);
        Self {
            options,
            environment,
        }
    }
}

/// Parses the request file at `path` with default options.
///
/// # Examples
///
/// ```no_run
/// use rest_client_core::parser::parse;
///
/// let parsed = parse("api/users.http").unwrap();
/// for request in &parsed.requests {
///     println!("{} {}", request.method, request.raw_url);
/// }
/// ```
pub fn parse(path: impl AsRef<Path>) -> Result<ParsedFile, ParseError> {
    parse_with(path, &ParseOptions::default())
}

/// Parses the request file at `path`.
pub fn parse_with(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParsedFile, ParseError> {
    let path = normalize_path(path.as_ref());
    let ctx = ParseContext::new(&path, options);
    parse_path(&path, Vec::new(), &ctx)
}

/// Parses `content` as if it had been read from `path`.
///
/// Imports, file references, environment files and the dotenv file are
/// still resolved relative to `path`.
///
/// # Examples
///
/// ```
/// use rest_client_core::parser::{parse_str, ParseOptions};
///
/// let content = r#"
/// @host = api.example.com
///
/// GET https://{{host}}/users
///
/// ###
///
/// POST https://{{host}}/users
/// Content-Type: application/json
///
/// {"name": "John"}
/// "#;
///
/// let parsed = parse_str(content, "requests.http", &ParseOptions::default()).unwrap();
/// assert_eq!(parsed.requests.len(), 2);
/// assert_eq!(parsed.variables["host"], "api.example.com");
/// ```
pub fn parse_str(
    content: &str,
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParsedFile, ParseError> {
    let path = normalize_path(path.as_ref());
    let ctx = ParseContext::new(&path, options);
    FileParser::new(&path, vec![path.clone()], &ctx).run(content)
}

/// Reads and parses one file. `stack` holds the files being parsed above
/// this one.
pub(crate) fn parse_path(
    path: &Path,
    mut stack: Vec<PathBuf>,
    ctx: &ParseContext<'_>,
) -> Result<ParsedFile, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    stack.push(path.to_path_buf());
    FileParser::new(path, stack, ctx).run(&content)
}

/// Makes `path` absolute. Existing files are canonicalized; other paths
/// are normalized lexically.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
