//! Variable resolution for request files.
//!
//! This module provides the scoped lookup ([`VariableScopes`]), the dynamic
//! system-variable generators ([`GeneratorCatalog`]) and the multi-pass
//! [`Resolver`] that combines them.

pub mod dotenv;
pub mod environment;
pub mod scope;
pub mod substitution;
pub mod system;

pub use dotenv::{load_dotenv, parse_dotenv};
pub use environment::{OsEnvironment, ProcessEnv};
pub use scope::{ScopeKind, VariableScopes};
pub use substitution::{resolve, ResolvedRequest, Resolver};
pub use system::{pregenerate_request_variables, GeneratorCatalog, GeneratorContext};
