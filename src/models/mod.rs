//! Data models for parsed request files.
//!
//! This module contains the structures produced by the parser: individual
//! requests with their headers, bodies and settings, and the per-file parse
//! result holding all requests and variable scopes.

pub mod parsed_file;
pub mod request;

pub use parsed_file::ParsedFile;
pub use request::{
    FileReference, Header, Headers, HttpMethod, Request, RequestBody, RequestSettings,
};
