//! Configuration loading for the request-file parser.
//!
//! Configuration is read from a JSON settings document under the
//! "rest-client" key and merged with defaults. There is no global
//! configuration instance; callers pass a [`ParserConfig`] through
//! [`crate::parser::ParseOptions`].

pub mod schema;

pub use schema::{ParserConfig, MAX_RESOLUTION_PASSES};

use serde_json::Value;

/// Loads configuration from a JSON settings value.
///
/// Reads the "rest-client" settings, merges them with defaults and
/// validates the result. Settings that fail to deserialize are logged and
/// replaced by the defaults.
///
/// # Example
///
/// ```
/// use rest_client_core::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "rest-client": {
///         "environmentFile": "envs.json",
///         "defaultEnvironment": "dev"
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.environment_file, "envs.json");
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ParserConfig, String> {
    let mut config = ParserConfig::default();

    if let Some(settings) = settings_json {
        if let Some(section) = settings.get("rest-client") {
            match serde_json::from_value::<ParserConfig>(section.clone()) {
                Ok(user_config) => {
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse rest-client settings: {}. Using defaults.",
                        e
                    );
                }
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    Ok(config)
}
