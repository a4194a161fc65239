//! Variable substitution engine.
//!
//! This module replaces `{{...}}` placeholders in request text. Resolution
//! happens in two tiers:
//!
//! - **scoped**: `{{name}}` and `{{name | fallback}}` are looked up through
//!   [`VariableScopes`]; `{{$name}}` only consults the pre-generated
//!   request-scoped values.
//! - **dynamic**: any `{{$...}}` still present is handed to the
//!   [`GeneratorCatalog`].
//!
//! Both tiers run once per pass, and passes repeat until the text stops
//! changing or the pass limit is reached. Placeholders left at that point
//! stay in the output as written.

use super::scope::{ScopeKind, VariableScopes};
use super::system::GeneratorCatalog;
use crate::config::MAX_RESOLUTION_PASSES;
use crate::models::{Header, Headers, HttpMethod, Request, RequestBody, RequestSettings};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Matches one `{{directive}}` span.
static VARIABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("Failed to compile variable regex"));

/// A value that is exactly one system-variable placeholder.
static DYNAMIC_PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{\{\s*(\$[^{}]*?)\s*\}\}$").expect("Failed to compile placeholder regex")
});

/// A value that is exactly one plain variable reference, without fallback.
static ALIAS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{\{\s*([^\s{}|$][^\s{}|]*)\s*\}\}$").expect("Failed to compile alias regex")
});

const ESCAPED_OPEN: &str = "\u{E000}";
const ESCAPED_CLOSE: &str = "\u{E001}";

/// How placeholders that match no scope are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Final resolution: use the inline fallback or an empty string, and
    /// run the dynamic generators.
    Request,
    /// `@name = value` definitions: keep unknown placeholders and system
    /// variables as written so they can be resolved per request later.
    Definition,
}

/// A request with every placeholder resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRequest {
    pub name: Option<String>,
    pub method: HttpMethod,
    pub url: String,
    /// Parse of the resolved URL; `None` if it is not an absolute URL.
    pub parsed_url: Option<Url>,
    pub http_version: Option<String>,
    pub headers: Headers,
    /// Text bodies are resolved; file references are passed through for
    /// the caller to read.
    pub body: Option<RequestBody>,
    pub settings: RequestSettings,
    pub file_path: PathBuf,
    pub line_number: usize,
}

/// Resolves placeholders against a set of scopes.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
    catalog: &'c GeneratorCatalog,
    max_passes: usize,
}

impl Default for Resolver<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver<'static> {
    /// A resolver using the shared generator catalog.
    pub fn new() -> Self {
        Self::with_catalog(GeneratorCatalog::shared())
    }
}

impl<'c> Resolver<'c> {
    pub fn with_catalog(catalog: &'c GeneratorCatalog) -> Self {
        Self {
            catalog,
            max_passes: MAX_RESOLUTION_PASSES,
        }
    }

    /// Sets the pass limit, clamped to `1..=10`.
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.clamp(1, MAX_RESOLUTION_PASSES);
        self
    }

    /// Fully resolves `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_client_core::variables::{Resolver, VariableScopes};
    ///
    /// let mut scopes = VariableScopes::default();
    /// scopes.file.insert("baseUrl".to_string(), "https://api.example.com".to_string());
    ///
    /// let result = Resolver::new().resolve("GET {{baseUrl}}/users?q={{q | none}}", &mut scopes);
    /// assert_eq!(result, "GET https://api.example.com/users?q=none");
    /// ```
    pub fn resolve(&self, text: &str, scopes: &mut VariableScopes) -> String {
        self.run(text, scopes, Mode::Request)
    }

    /// Resolves the right-hand side of a variable definition.
    ///
    /// Only scoped lookups run; placeholders that match nothing, and system
    /// variables, are kept as written.
    pub fn resolve_definition(&self, text: &str, scopes: &mut VariableScopes) -> String {
        self.run(text, scopes, Mode::Definition)
    }

    /// Resolves URL, header values and text body of `request`.
    pub fn resolve_request(
        &self,
        request: &Request,
        scopes: &mut VariableScopes,
    ) -> ResolvedRequest {
        let url = self.resolve(&request.raw_url, scopes);
        let parsed_url = Url::parse(&url).ok();

        let headers = request
            .headers
            .iter()
            .map(|h| Header {
                name: h.name.clone(),
                value: self.resolve(&h.value, scopes),
            })
            .collect();

        let body = request.body.as_ref().map(|body| match body {
            RequestBody::Text(text) => RequestBody::Text(self.resolve(text, scopes)),
            RequestBody::File(reference) => RequestBody::File(reference.clone()),
        });

        ResolvedRequest {
            name: request.name.clone(),
            method: request.method.clone(),
            url,
            parsed_url,
            http_version: request.http_version.clone(),
            headers,
            body,
            settings: request.settings.clone(),
            file_path: request.file_path.clone(),
            line_number: request.line_number,
        }
    }

    fn run(&self, text: &str, scopes: &mut VariableScopes, mode: Mode) -> String {
        if !text.contains("{{") {
            return text.to_string();
        }

        let mut current = text
            .replace("\\{{", ESCAPED_OPEN)
            .replace("\\}}", ESCAPED_CLOSE);

        for _ in 0..self.max_passes {
            let mut next = self.scoped_pass(&current, scopes, mode);
            if mode == Mode::Request {
                next = self.dynamic_pass(&next, scopes);
            }
            if next == current {
                break;
            }
            current = next;
        }

        current
            .replace(ESCAPED_OPEN, "{{")
            .replace(ESCAPED_CLOSE, "}}")
    }

    fn scoped_pass(&self, text: &str, scopes: &mut VariableScopes, mode: Mode) -> String {
        VARIABLE_REGEX
            .replace_all(text, |caps: &Captures<'_>| {
                self.resolve_scoped(caps, scopes, mode)
            })
            .into_owned()
    }

    fn resolve_scoped(
        &self,
        caps: &Captures<'_>,
        scopes: &mut VariableScopes,
        mode: Mode,
    ) -> String {
        let placeholder = &caps[0];
        let (name, fallback) = split_directive(&caps[1]);

        if name.starts_with('$') {
            if mode == Mode::Definition {
                return placeholder.to_string();
            }
            return scopes
                .request_scoped
                .get(&normalize_directive(name))
                .cloned()
                .unwrap_or_else(|| placeholder.to_string());
        }

        match scopes.lookup(name) {
            Some((ScopeKind::File, value)) if mode == Mode::Request => {
                self.memoize_file_value(name, value, scopes)
            }
            Some((ScopeKind::File, value))
                if DYNAMIC_PLACEHOLDER_REGEX.is_match(value.trim()) =>
            {
                placeholder.to_string()
            }
            Some((_, value)) => value,
            None => match mode {
                Mode::Request => fallback.unwrap_or_default().to_string(),
                Mode::Definition => placeholder.to_string(),
            },
        }
    }

    /// A file variable whose value is a single generator placeholder is
    /// evaluated once and the result stored back in the file scope. A value
    /// that only names another file variable shares that variable's memo.
    fn memoize_file_value(
        &self,
        name: &str,
        value: String,
        scopes: &mut VariableScopes,
    ) -> String {
        self.memoized(name, &value, scopes, self.max_passes)
            .unwrap_or(value)
    }

    fn memoized(
        &self,
        name: &str,
        value: &str,
        scopes: &mut VariableScopes,
        depth: usize,
    ) -> Option<String> {
        let value = value.trim();
        let generated = if let Some(caps) = DYNAMIC_PLACEHOLDER_REGEX.captures(value) {
            let directive = normalize_directive(&caps[1]);
            if scopes.request_scoped.contains_key(&directive) {
                return None;
            }
            self.catalog.evaluate(&directive, &scopes.generator_context())?
        } else {
            let caps = ALIAS_REGEX.captures(value)?;
            let target = &caps[1];
            if depth == 0 || target == name {
                return None;
            }
            let Some((ScopeKind::File, target_value)) = scopes.lookup(target) else {
                return None;
            };
            self.memoized(target, &target_value, scopes, depth - 1)?
        };

        scopes.file.insert(name.to_string(), generated.clone());
        Some(generated)
    }

    fn dynamic_pass(&self, text: &str, scopes: &VariableScopes) -> String {
        let ctx = scopes.generator_context();
        VARIABLE_REGEX
            .replace_all(text, |caps: &Captures<'_>| {
                let (name, _) = split_directive(&caps[1]);
                if !name.starts_with('$') {
                    return caps[0].to_string();
                }
                self.catalog
                    .evaluate(name, &ctx)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Resolves `text` with the shared catalog.
pub fn resolve(text: &str, scopes: &mut VariableScopes) -> String {
    Resolver::new().resolve(text, scopes)
}

/// Splits `name | fallback`. The fallback is trimmed but may be empty.
fn split_directive(directive: &str) -> (&str, Option<&str>) {
    match directive.split_once('|') {
        Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
        None => (directive.trim(), None),
    }
}

/// Collapses runs of whitespace so `{{ $uuid }}` and `{{$uuid}}` share a key.
fn normalize_directive(directive: &str) -> String {
    directive.split_whitespace().collect::<Vec<_>>().join(" ")
}
