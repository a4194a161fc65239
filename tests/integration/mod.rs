//! Integration tests module for the request-file parser
//!
//! This module provides common utilities and test infrastructure for
//! parsing real files on disk.

pub mod environment_test;
pub mod import_test;
pub mod resolution_test;

use rest_client_core::parser::ParseOptions;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Writes `content` to `name` inside `dir`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Helper to create a temporary directory holding a single .http file
pub fn create_temp_http_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = write_file(temp_dir.path(), "test.http", content);
    (temp_dir, file_path)
}

/// Options with an isolated, empty process environment.
pub fn isolated_options() -> ParseOptions {
    ParseOptions::new().with_process_env(Arc::new(HashMap::<String, String>::new()))
}
