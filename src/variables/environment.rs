//! Process environment access.
//!
//! The resolver never calls `std::env` directly; it goes through a
//! [`ProcessEnv`] so callers (and tests) can supply their own view of the
//! process environment.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;

/// Read-only accessor for process environment variables.
pub trait ProcessEnv: Debug + Send + Sync {
    /// Returns the value of `name`, or `None` when it is unset or not
    /// valid unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl ProcessEnv for OsEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return None;
        }
        env::var(name).ok()
    }
}

impl ProcessEnv for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
