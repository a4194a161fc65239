//! Configuration schema for the request-file parser.
//!
//! This module defines the configuration structure and validation logic for
//! the settings that control where environment and dotenv files are looked
//! up and how variable resolution behaves.

use serde::{Deserialize, Serialize};

/// Upper bound for `max_resolution_passes`.
pub const MAX_RESOLUTION_PASSES: usize = 10;

/// Main configuration structure for the parser.
///
/// All settings can be provided as JSON under the "rest-client" key.
/// Missing settings fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    /// Name of the environment-selection file, looked up next to the
    /// request file. Defaults to "http-client.env.json".
    #[serde(default = "default_environment_file")]
    pub environment_file: String,

    /// Name of the private environment file whose values override the
    /// public one. Defaults to "http-client.private.env.json".
    #[serde(default = "default_private_environment_file")]
    pub private_environment_file: String,

    /// Name of the dotenv file next to the request file. Defaults to ".env".
    #[serde(default = "default_dotenv_file")]
    pub dotenv_file: String,

    /// Environment selected when the caller does not name one.
    #[serde(default)]
    pub default_environment: Option<String>,

    /// Number of substitution passes before giving up on nested
    /// placeholders. Defaults to 10.
    ///
    /// Must be between 1 and 10.
    #[serde(default = "default_max_resolution_passes")]
    pub max_resolution_passes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            environment_file: default_environment_file(),
            private_environment_file: default_private_environment_file(),
            dotenv_file: default_dotenv_file(),
            default_environment: None,
            max_resolution_passes: default_max_resolution_passes(),
        }
    }
}

impl ParserConfig {
    /// Validates the configuration and returns an error message for the
    /// first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_resolution_passes == 0 || self.max_resolution_passes > MAX_RESOLUTION_PASSES {
            return Err(format!(
                "maxResolutionPasses must be between 1 and {}",
                MAX_RESOLUTION_PASSES
            ));
        }

        for (key, value) in [
            ("environmentFile", &self.environment_file),
            ("privateEnvironmentFile", &self.private_environment_file),
            ("dotenvFile", &self.dotenv_file),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", key));
            }
        }

        Ok(())
    }

    /// Returns a new config with values from `other` taking precedence.
    pub fn merge(&self, other: &ParserConfig) -> ParserConfig {
        ParserConfig {
            environment_file: other.environment_file.clone(),
            private_environment_file: other.private_environment_file.clone(),
            dotenv_file: other.dotenv_file.clone(),
            default_environment: other
                .default_environment
                .clone()
                .or_else(|| self.default_environment.clone()),
            max_resolution_passes: other.max_resolution_passes,
        }
    }
}

fn default_environment_file() -> String {
    "http-client.env.json".to_string()
}

fn default_private_environment_file() -> String {
    "http-client.private.env.json".to_string()
}

fn default_dotenv_file() -> String {
    ".env".to_string()
}

fn default_max_resolution_passes() -> usize {
    MAX_RESOLUTION_PASSES
}
