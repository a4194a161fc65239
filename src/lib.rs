//! Request-file parsing and variable resolution for REST clients
//!
//! This crate reads `.http` and `.rest` files describing one or more HTTP
//! requests and turns each request into a fully-resolved description that a
//! transport layer can send. It does not perform any network I/O itself.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **parser**: Classifies lines, runs the request state machine and
//!   merges `@import`ed files into a [`ParsedFile`]
//! - **models**: Requests, headers, bodies and the parse result
//! - **variables**: Scoped `{{name}}` lookup, the `{{$generator}}` catalog
//!   and the multi-pass [`Resolver`]
//! - **environment**: Loads `http-client.env.json` and its private
//!   counterpart
//! - **config**: Parser settings (file names, pass limit, default
//!   environment)
//!
//! # Usage
//!
//! ```no_run
//! use rest_client_core::parser::{parse_with, ParseOptions};
//! use rest_client_core::variables::Resolver;
//!
//! let options = ParseOptions::new().with_environment("dev");
//! let parsed = parse_with("api/users.http", &options)?;
//!
//! let resolver = Resolver::new();
//! for request in &parsed.requests {
//!     let mut scopes = parsed.scopes_for(request, &options);
//!     let resolved = resolver.resolve_request(request, &mut scopes);
//!     println!("{} {}", resolved.method, resolved.url);
//! }
//! # Ok::<(), rest_client_core::parser::ParseError>(())
//! ```
//!
//! # Variable precedence
//!
//! Placeholders are looked up in programmatic variables, then file
//! variables, the selected environment, the shared environment section,
//! the process environment and finally the dotenv file. `$uuid`, `$guid`,
//! `$timestamp` and `$randomInt` are generated once per request so repeated
//! references agree; every other generator is evaluated per occurrence.

pub mod config;
pub mod environment;
pub mod models;
pub mod parser;
pub mod variables;

pub use config::ParserConfig;
pub use models::{ParsedFile, Request};
pub use parser::{parse, parse_str, parse_with, ParseError, ParseOptions};
pub use variables::{resolve, ResolvedRequest, Resolver, VariableScopes};
