//! Environment file loader.
//!
//! Reads the environment-selection file next to a request file, then the
//! private environment file of the same shape, whose values override
//! matching keys. Every failure is absorbed: a missing, unreadable or
//! malformed file simply contributes no variables.

use super::models::{EnvironmentVariables, SHARED_KEYS};
use crate::config::ParserConfig;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Reasons an environment file contributed nothing.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The file could not be read (including "not found")
    #[error("failed to read environment file: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid JSON
    #[error("failed to parse environment file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document does not have the expected shape
    #[error("invalid environment format: {0}")]
    InvalidFormat(String),

    /// The selected environment is not defined in the file
    #[error("environment '{0}' is not defined")]
    UnknownEnvironment(String),
}

/// Loads the variables for `environment` from the environment files in
/// `dir`.
///
/// When `environment` is `None`, `config.default_environment` is used; if
/// that is unset too, only the shared section is loaded.
pub fn load_environment(
    dir: &Path,
    environment: Option<&str>,
    config: &ParserConfig,
) -> EnvironmentVariables {
    let selected = environment.or(config.default_environment.as_deref());
    let mut result = EnvironmentVariables::new(selected);

    for file_name in [&config.environment_file, &config.private_environment_file] {
        let path = dir.join(file_name);
        match read_environment_file(&path, selected) {
            Ok(loaded) => {
                log::debug!(
                    "Loaded {} environment and {} shared variables from {}",
                    loaded.variables.len(),
                    loaded.shared.len(),
                    path.display()
                );
                result.merge(loaded);
            }
            Err(EnvError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No environment file at {}", path.display());
            }
            Err(e) => {
                log::warn!("Ignoring environment file {}: {}", path.display(), e);
            }
        }
    }

    result
}

/// Reads one environment file and extracts the selected environment.
fn read_environment_file(
    path: &Path,
    selected: Option<&str>,
) -> Result<EnvironmentVariables, EnvError> {
    let content = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;
    parse_environment_document(&raw, selected)
}

/// Extracts the selected environment and shared section from a parsed
/// environment document.
fn parse_environment_document(
    raw: &Value,
    selected: Option<&str>,
) -> Result<EnvironmentVariables, EnvError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| EnvError::InvalidFormat("root must be a JSON object".to_string()))?;

    let mut result = EnvironmentVariables::new(selected);

    for key in SHARED_KEYS {
        if let Some(value) = obj.get(*key) {
            result.shared.extend(parse_variable_map(value, key)?);
        }
    }

    if let Some(name) = selected {
        let value = lookup_environment(obj, name)
            .ok_or_else(|| EnvError::UnknownEnvironment(name.to_string()))?;
        result.variables = parse_variable_map(value, name)?;
    }

    Ok(result)
}

fn lookup_environment<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if SHARED_KEYS.contains(&name) {
        return None;
    }
    obj.get(name)
}

/// Converts a JSON object into a flat string map.
///
/// Strings are taken as-is, numbers and booleans are stringified and null
/// becomes an empty string. Nested arrays or objects make the whole map
/// invalid.
fn parse_variable_map(value: &Value, context: &str) -> Result<HashMap<String, String>, EnvError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EnvError::InvalidFormat(format!("'{}' must be a JSON object", context)))?;

    let mut map = HashMap::with_capacity(obj.len());

    for (key, val) in obj {
        let value_str = match val {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(EnvError::InvalidFormat(format!(
                    "variable '{}' in '{}' must be a string, number, or boolean",
                    key, context
                )));
            }
        };
        map.insert(key.clone(), value_str);
    }

    Ok(map)
}
