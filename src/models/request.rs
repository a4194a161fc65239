//! Request data models.
//!
//! This module defines the structures produced by the parser for a single
//! request block: the method, URL, ordered headers, body, per-request
//! settings and the variables visible at that point in the file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// HTTP request method.
///
/// The standard verbs get their own variant. Any other RFC 7230 token is
/// kept verbatim as an extension method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP TRACE method - perform a message loop-back test
    TRACE,
    /// HTTP CONNECT method - establish a tunnel to the server
    CONNECT,
    /// Any other method token (e.g. `PROPFIND`, `QUERY`)
    Extension(String),
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::CONNECT => "CONNECT",
            HttpMethod::Extension(token) => token,
        }
    }

    /// Builds a method from an already-validated token.
    ///
    /// Standard verbs are matched case-insensitively; anything else becomes
    /// an [`HttpMethod::Extension`] with its original spelling.
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::GET,
            "POST" => HttpMethod::POST,
            "PUT" => HttpMethod::PUT,
            "DELETE" => HttpMethod::DELETE,
            "PATCH" => HttpMethod::PATCH,
            "OPTIONS" => HttpMethod::OPTIONS,
            "HEAD" => HttpMethod::HEAD,
            "TRACE" => HttpMethod::TRACE,
            "CONNECT" => HttpMethod::CONNECT,
            _ => HttpMethod::Extension(token.to_string()),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Ordered, multi-valued header list.
///
/// Repeated names are appended rather than overwritten, so the values of a
/// given header keep the order they were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(Vec<Header>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a header, keeping any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Header {
            name: name.into(),
            value: value.into(),
        });
    }

    /// First value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// All values for `name` in insertion order (case-insensitive).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A body loaded from a file next to the request file (`< path`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Absolute path of the referenced file.
    pub path: PathBuf,

    /// Encoding token from `<@encoding path`, lowercased.
    pub encoding: Option<String>,

    /// `true` for `<@` references, whose content goes through variable
    /// substitution; `false` for static `<` references.
    pub substitute: bool,
}

/// Request body as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestBody {
    /// Literal body text.
    Text(String),
    /// External file reference.
    File(FileReference),
}

impl RequestBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestBody::Text(text) => Some(text),
            RequestBody::File(_) => None,
        }
    }
}

/// Per-request settings set through comment directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSettings {
    /// `# @no-redirect`
    pub no_redirect: bool,

    /// `# @no-cookie-jar`
    pub no_cookie_jar: bool,

    /// `# @timeout <ms>`
    pub timeout: Option<Duration>,
}

/// Represents an HTTP request parsed from a `.http` or `.rest` file.
///
/// URL, header values and body still contain their `{{...}}` placeholders;
/// see [`crate::variables::Resolver`] for turning a request into its
/// final form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Name from `# @name` or the text trailing the `###` separator.
    pub name: Option<String>,

    /// HTTP method (GET, POST, PUT, DELETE, etc.).
    pub method: HttpMethod,

    /// Target URL as written, with query continuation lines appended.
    pub raw_url: String,

    /// Best-effort parse of `raw_url`.
    ///
    /// `None` while the URL still contains placeholders or is otherwise not
    /// an absolute URL.
    pub url: Option<Url>,

    /// Optional HTTP version specification, e.g. "HTTP/1.1".
    pub http_version: Option<String>,

    /// Request headers in the order they were written.
    pub headers: Headers,

    /// Optional request body.
    pub body: Option<RequestBody>,

    /// File-scoped variables visible to this request.
    pub variables: HashMap<String, String>,

    /// Redirect, cookie-jar and timeout directives.
    pub settings: RequestSettings,

    /// Path to the source file containing this request.
    pub file_path: PathBuf,

    /// Line number (1-based) of the request line.
    pub line_number: usize,
}

impl Request {
    /// Creates a new request with default values for optional fields.
    pub fn new(method: HttpMethod, raw_url: impl Into<String>) -> Self {
        let raw_url = raw_url.into();
        let url = Url::parse(&raw_url).ok();
        Self {
            name: None,
            method,
            raw_url,
            url,
            http_version: None,
            headers: Headers::new(),
            body: None,
            variables: HashMap::new(),
            settings: RequestSettings::default(),
            file_path: PathBuf::new(),
            line_number: 0,
        }
    }

    /// Unique identifier based on file name and line number.
    pub fn id(&self) -> String {
        let file_name = self
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        format!("{}_line_{}", file_name, self.line_number)
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// Literal body text, if the body is not a file reference.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_ref().and_then(RequestBody::as_text)
    }
}
