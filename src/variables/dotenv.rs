//! Dotenv file loading.
//!
//! Reads `KEY=value` pairs from the dotenv file that sits next to a request
//! file. A missing or unreadable file yields an empty map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Loads `file_name` from `dir`.
pub fn load_dotenv(dir: &Path, file_name: &str) -> HashMap<String, String> {
    let path = dir.join(file_name);
    match fs::read_to_string(&path) {
        Ok(content) => {
            let vars = parse_dotenv(&content);
            log::debug!("Loaded {} dotenv variables from {}", vars.len(), path.display());
            vars
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
        Err(e) => {
            log::warn!("Failed to read dotenv file {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// Parses dotenv content.
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is
/// allowed and matching single or double quotes around the value are
/// removed. Lines without `=` are logged and skipped.
pub fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                log::warn!("Invalid dotenv line {}: empty key", line_num + 1);
                continue;
            }
            vars.insert(key.to_string(), unquote(value.trim()).to_string());
        } else {
            log::warn!("Invalid dotenv line {}: {}", line_num + 1, line);
        }
    }

    vars
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
