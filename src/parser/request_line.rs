//! Parsing helpers for the individual pieces of a request block: the
//! request line, header lines and file-reference bodies.

use crate::models::{FileReference, HttpMethod};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static HTTP_VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^HTTP/\d+(?:\.\d+)?$").expect("Failed to compile version regex"));

/// Encodings accepted after `<@`.
pub const FILE_ENCODINGS: &[&str] = &[
    "utf-8",
    "utf8",
    "latin1",
    "iso-8859-1",
    "ascii",
    "cp1252",
    "windows-1252",
];

/// The pieces of a request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: HttpMethod,
    /// May be empty when the line held only a method.
    pub url: String,
    pub http_version: Option<String>,
}

/// Returns `true` if `token` is a non-empty RFC 7230 `token`.
pub fn is_method_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(is_tchar)
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn is_bare_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://") || token.starts_with("{{")
}

/// Parses `METHOD URL [HTTP/version]` or a bare URL implying `GET`.
///
/// Returns `None` when the line does not start a request.
///
/// # Examples
///
/// ```
/// use rest_client_core::models::HttpMethod;
/// use rest_client_core::parser::request_line::parse_request_line;
///
/// let line = parse_request_line("POST https://api.example.com/users HTTP/1.1").unwrap();
/// assert_eq!(line.method, HttpMethod::POST);
/// assert_eq!(line.url, "https://api.example.com/users");
/// assert_eq!(line.http_version.as_deref(), Some("HTTP/1.1"));
///
/// let line = parse_request_line("https://example.com").unwrap();
/// assert_eq!(line.method, HttpMethod::GET);
/// ```
pub fn parse_request_line(line: &str) -> Option<RequestLine> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let first = *tokens.first()?;

    if tokens.len() == 1 {
        if is_bare_url(first) {
            return Some(RequestLine {
                method: HttpMethod::GET,
                url: first.to_string(),
                http_version: None,
            });
        }
        return is_method_token(first).then(|| RequestLine {
            method: HttpMethod::from_token(first),
            url: String::new(),
            http_version: None,
        });
    }

    if !is_method_token(first) {
        return None;
    }

    let http_version = match tokens.last() {
        Some(last) if tokens.len() > 2 && HTTP_VERSION_REGEX.is_match(last) => {
            tokens.pop().map(str::to_string)
        }
        _ => None,
    };

    Some(RequestLine {
        method: HttpMethod::from_token(first),
        url: tokens[1..].join(" "),
        http_version,
    })
}

/// Splits `Name: Value`. Returns `None` when there is no colon or the name
/// is empty.
pub fn parse_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim()))
}

/// Recognizes `< path` and `<@ [encoding] path` body lines.
///
/// The path is resolved against `base_dir`. A `<` directly followed by
/// other text (an XML body, say) is not a file reference.
pub fn parse_file_reference(line: &str, base_dir: &Path) -> Option<FileReference> {
    let trimmed = line.trim();

    let (rest, substitute) = if let Some(rest) = trimmed.strip_prefix("<@") {
        (rest, true)
    } else {
        let rest = trimmed.strip_prefix('<')?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        (rest, false)
    };

    let rest = rest.trim();
    let (encoding, path) = if substitute {
        match rest.split_once(char::is_whitespace) {
            Some((token, path)) if is_encoding(token) => {
                (Some(token.to_ascii_lowercase()), path.trim())
            }
            _ => (None, rest),
        }
    } else {
        (None, rest)
    };

    if path.is_empty() {
        return None;
    }

    Some(FileReference {
        path: base_dir.join(path),
        encoding,
        substitute,
    })
}

fn is_encoding(token: &str) -> bool {
    FILE_ENCODINGS
        .iter()
        .any(|enc| enc.eq_ignore_ascii_case(token))
}
