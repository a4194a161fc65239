//! `@import` handling.
//!
//! Imported files are parsed with the same options as the importer. The
//! import stack (every file currently being parsed on this branch, root
//! first) is passed by value, so sibling imports never see each other's
//! entries.

use super::error::ParseError;
use super::{normalize_path, parse_path, ParseContext};
use crate::models::ParsedFile;
use std::path::{Path, PathBuf};

/// Resolves an import target relative to the importing file.
pub fn resolve_import_path(importer: &Path, target: &str) -> PathBuf {
    let dir = importer.parent().unwrap_or_else(|| Path::new("."));
    normalize_path(&dir.join(target))
}

/// Fails when `target` is already on `stack`.
pub fn check_cycle(stack: &[PathBuf], target: &Path) -> Result<(), ParseError> {
    if stack.iter().any(|p| p == target) {
        let mut chain = stack.to_vec();
        chain.push(target.to_path_buf());
        return Err(ParseError::CircularImport { chain });
    }
    Ok(())
}

/// Parses the file `target` imported from `importer`.
pub(crate) fn parse_import(
    importer: &Path,
    target: &str,
    stack: Vec<PathBuf>,
    ctx: &ParseContext<'_>,
) -> Result<ParsedFile, ParseError> {
    let path = resolve_import_path(importer, target);
    check_cycle(&stack, &path)?;

    if !path.is_file() {
        return Err(ParseError::ImportNotFound {
            importer: importer.to_path_buf(),
            path,
        });
    }

    log::debug!("Importing {} from {}", path.display(), importer.display());
    parse_path(&path, stack, ctx)
}
