//! Environment management.
//!
//! This module loads environment-selection files (`http-client.env.json`
//! and its private counterpart) that define different sets of variables
//! for different contexts (dev, staging, production).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use rest_client_core::config::ParserConfig;
//! use rest_client_core::environment::load_environment;
//!
//! let env = load_environment(Path::new("/path/to/requests"), Some("dev"), &ParserConfig::default());
//! if let Some(url) = env.get("baseUrl") {
//!     println!("Base URL: {}", url);
//! }
//! ```

pub mod loader;
pub mod models;

pub use loader::{load_environment, EnvError};
pub use models::EnvironmentVariables;
