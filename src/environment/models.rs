//! Environment data models.
//!
//! An environment-selection file maps environment names (e.g. "dev",
//! "staging") to flat variable maps. Loading one environment yields the
//! selected environment's variables plus the `$shared` section.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys treated as the shared section rather than an environment name.
pub const SHARED_KEYS: &[&str] = &["$shared", "shared"];

/// Variables contributed by the environment files for one selected
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariables {
    /// Environment name that was selected, if any.
    pub name: Option<String>,

    /// Variables of the selected environment.
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Variables from the shared section, visible in every environment.
    #[serde(default)]
    pub shared: HashMap<String, String>,
}

impl EnvironmentVariables {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            ..Self::default()
        }
    }

    /// Gets a variable, checking the selected environment before the
    /// shared section.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.variables.get(key).or_else(|| self.shared.get(key))
    }

    /// Overlays `other` onto `self`; keys present in `other` win.
    pub fn merge(&mut self, other: EnvironmentVariables) {
        self.variables.extend(other.variables);
        self.shared.extend(other.shared);
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.shared.is_empty()
    }
}
