//! The request-file state machine.
//!
//! [`FileParser`] consumes classified lines front to back and builds one
//! request at a time. All parser state lives in a single [`ParserState`]
//! value plus the in-progress [`RequestBuilder`]; there are no independent
//! flags to keep in sync.

use super::error::ParseError;
use super::import;
use super::line::{classify, CommentKind, LineKind};
use super::request_line::{parse_file_reference, parse_header, parse_request_line};
use super::ParseContext;
use crate::models::{
    FileReference, Headers, HttpMethod, ParsedFile, Request, RequestBody, RequestSettings,
};
use crate::variables::dotenv::load_dotenv;
use crate::variables::{Resolver, VariableScopes};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Where the parser is within the current request block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No request is being built.
    BetweenRequests,
    /// A request line has been read; query continuation lines may follow.
    RequestLine,
    /// At least one header has been read.
    Headers,
    /// Past the blank line that ends the headers.
    Body(BodyMode),
}

/// How body lines are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Nothing but blank lines seen so far.
    Start,
    Plain,
    /// Lines starting with `&` continue the previous line.
    FormUrlEncoded,
    /// The body is a file reference; further lines are ignored.
    FileReference,
}

/// Directives seen before the request they apply to.
#[derive(Debug, Default)]
struct PendingDirectives {
    name: Option<String>,
    settings: RequestSettings,
}

/// A request under construction.
#[derive(Debug)]
struct RequestBuilder {
    name: Option<String>,
    method: HttpMethod,
    url: String,
    http_version: Option<String>,
    headers: Headers,
    query_fragments: Vec<String>,
    body_lines: Vec<String>,
    file_body: Option<FileReference>,
    settings: RequestSettings,
    line_number: usize,
}

impl RequestBuilder {
    /// Appends pending `?`/`&` lines to the URL.
    fn flush_query(&mut self) {
        for fragment in self.query_fragments.drain(..) {
            let param = fragment.trim_start_matches(['?', '&']);
            if param.is_empty() {
                continue;
            }
            let joiner = if self.url.contains('?') { '&' } else { '?' };
            self.url.push(joiner);
            self.url.push_str(param);
        }
    }

    fn is_form(&self) -> bool {
        self.headers
            .get("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(FORM_URLENCODED))
    }
}

/// Parses one file. Imports are parsed recursively with their own
/// `FileParser`.
pub(crate) struct FileParser<'a> {
    path: &'a Path,
    dir: PathBuf,
    ctx: &'a ParseContext<'a>,
    import_stack: Vec<PathBuf>,
    resolver: Resolver<'static>,
    scopes: VariableScopes,
    own_variables: HashSet<String>,
    state: ParserState,
    current: Option<RequestBuilder>,
    pending: PendingDirectives,
    requests: Vec<Request>,
    imported_requests: Vec<Request>,
    imports: Vec<PathBuf>,
}

impl<'a> FileParser<'a> {
    /// `import_stack` must already contain `path`.
    pub(crate) fn new(
        path: &'a Path,
        import_stack: Vec<PathBuf>,
        ctx: &'a ParseContext<'a>,
    ) -> Self {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let options = ctx.options;

        let mut scopes = VariableScopes::new(Arc::clone(&options.process_env));
        scopes.programmatic = options.variables.clone();
        scopes.environment = ctx.environment.variables.clone();
        scopes.global = ctx.environment.shared.clone();
        scopes.dotenv = load_dotenv(&dir, &options.config.dotenv_file);

        Self {
            path,
            dir,
            ctx,
            import_stack,
            resolver: Resolver::new().max_passes(options.config.max_resolution_passes),
            scopes,
            own_variables: HashSet::new(),
            state: ParserState::BetweenRequests,
            current: None,
            pending: PendingDirectives::default(),
            requests: Vec::new(),
            imported_requests: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, content: &str) -> Result<ParsedFile, ParseError> {
        let content = content.replace("\r\n", "\n");
        for (index, line) in content.lines().enumerate() {
            self.process_line(line, index + 1)?;
        }
        self.finalize();

        let mut requests = self.imported_requests;
        requests.append(&mut self.requests);

        log::debug!(
            "Parsed {} requests and {} variables from {}",
            requests.len(),
            self.scopes.file.len(),
            self.path.display()
        );

        Ok(ParsedFile {
            path: self.path.to_path_buf(),
            requests,
            variables: self.scopes.file,
            environment_variables: self.ctx.environment.variables.clone(),
            global_variables: self.ctx.environment.shared.clone(),
            dotenv_variables: self.scopes.dotenv,
            imports: self.imports,
        })
    }

    fn process_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        let kind = classify(line);

        if let LineKind::Separator { name } = kind {
            self.finalize();
            self.pending = PendingDirectives {
                name: name.map(str::to_string),
                ..PendingDirectives::default()
            };
            return Ok(());
        }

        if let ParserState::Body(mode) = self.state {
            self.process_body_line(line, mode);
            return Ok(());
        }

        match kind {
            LineKind::Separator { .. } | LineKind::Comment(CommentKind::Plain) => Ok(()),
            LineKind::Comment(CommentKind::CommentedSeparator) => Ok(()),
            LineKind::Comment(comment) => self.apply_directive(comment, line_number),
            LineKind::Variable { name, value } => {
                self.define_variable(name, value);
                Ok(())
            }
            LineKind::MalformedVariable => Err(ParseError::InvalidVariable {
                path: self.path.to_path_buf(),
                line: line_number,
                text: line.trim().to_string(),
            }),
            LineKind::Blank => {
                if let Some(builder) = self.current.as_mut() {
                    builder.flush_query();
                    self.state = ParserState::Body(BodyMode::Start);
                }
                Ok(())
            }
            LineKind::Content(text) => self.process_content(text, line_number),
        }
    }

    fn process_content(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        let trimmed = line.trim();

        match (self.state, self.current.as_mut()) {
            (ParserState::RequestLine | ParserState::Headers, Some(builder))
                if trimmed.starts_with('?') || trimmed.starts_with('&') =>
            {
                builder.query_fragments.push(trimmed.to_string());
                Ok(())
            }
            (ParserState::RequestLine | ParserState::Headers, Some(builder)) => {
                let Some((name, value)) = parse_header(trimmed) else {
                    return Err(ParseError::InvalidHeader {
                        path: self.path.to_path_buf(),
                        line: line_number,
                        text: trimmed.to_string(),
                    });
                };
                builder.flush_query();
                builder.headers.append(name, value);
                self.state = ParserState::Headers;
                Ok(())
            }
            _ => {
                self.start_request(trimmed, line_number);
                Ok(())
            }
        }
    }

    fn start_request(&mut self, line: &str, line_number: usize) {
        let parsed = match parse_request_line(line) {
            Some(parsed) if !parsed.url.is_empty() => parsed,
            _ => {
                log::warn!(
                    "Ignoring line {} in {}: not a request line: {}",
                    line_number,
                    self.path.display(),
                    line
                );
                return;
            }
        };

        let pending = std::mem::take(&mut self.pending);
        self.current = Some(RequestBuilder {
            name: pending.name,
            method: parsed.method,
            url: parsed.url,
            http_version: parsed.http_version,
            headers: Headers::new(),
            query_fragments: Vec::new(),
            body_lines: Vec::new(),
            file_body: None,
            settings: pending.settings,
            line_number,
        });
        self.state = ParserState::RequestLine;
    }

    fn process_body_line(&mut self, line: &str, mode: BodyMode) {
        let Some(builder) = self.current.as_mut() else {
            return;
        };

        match mode {
            BodyMode::Start => {
                if line.trim().is_empty() {
                    return;
                }
                if line.trim_start().starts_with('<') {
                    if let Some(reference) = parse_file_reference(line, &self.dir) {
                        builder.file_body = Some(reference);
                        self.state = ParserState::Body(BodyMode::FileReference);
                        return;
                    }
                }
                let mode = if builder.is_form() {
                    BodyMode::FormUrlEncoded
                } else {
                    BodyMode::Plain
                };
                builder.body_lines.push(line.to_string());
                self.state = ParserState::Body(mode);
            }
            BodyMode::Plain => builder.body_lines.push(line.to_string()),
            BodyMode::FormUrlEncoded => {
                let trimmed = line.trim();
                match builder.body_lines.last_mut() {
                    Some(previous) if trimmed.starts_with('&') => previous.push_str(trimmed),
                    _ => builder.body_lines.push(line.to_string()),
                }
            }
            BodyMode::FileReference => {
                if !line.trim().is_empty() {
                    log::debug!("Ignoring body line after file reference: {}", line);
                }
            }
        }
    }

    fn apply_directive(
        &mut self,
        comment: CommentKind<'_>,
        line_number: usize,
    ) -> Result<(), ParseError> {
        if let CommentKind::Import(target) = comment {
            return self.import(target);
        }

        let (name, settings) = match self.current.as_mut() {
            Some(builder) => (&mut builder.name, &mut builder.settings),
            None => (&mut self.pending.name, &mut self.pending.settings),
        };

        match comment {
            CommentKind::Name(value) => *name = Some(value.to_string()),
            CommentKind::NoRedirect => settings.no_redirect = true,
            CommentKind::NoCookieJar => settings.no_cookie_jar = true,
            CommentKind::Timeout(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => settings.timeout = Some(Duration::from_millis(ms)),
                _ => log::warn!(
                    "Ignoring invalid @timeout '{}' at {}:{}",
                    raw,
                    self.path.display(),
                    line_number
                ),
            },
            CommentKind::Plain | CommentKind::CommentedSeparator | CommentKind::Import(_) => {}
        }
        Ok(())
    }

    fn define_variable(&mut self, name: &str, value: &str) {
        let resolved = self.resolver.resolve_definition(value, &mut self.scopes);
        self.scopes.file.insert(name.to_string(), resolved);
        self.own_variables.insert(name.to_string());
    }

    fn import(&mut self, target: &str) -> Result<(), ParseError> {
        let imported =
            import::parse_import(self.path, target, self.import_stack.clone(), self.ctx)?;

        for (name, value) in imported.variables {
            if !self.own_variables.contains(&name) {
                self.scopes.file.insert(name, value);
            }
        }
        self.imported_requests.extend(imported.requests);
        self.imports.push(imported.path);
        Ok(())
    }

    fn finalize(&mut self) {
        self.state = ParserState::BetweenRequests;
        let Some(mut builder) = self.current.take() else {
            return;
        };
        builder.flush_query();

        if builder.method.as_str().is_empty() || builder.url.trim().is_empty() {
            log::debug!(
                "Dropping request at {}:{} without method or URL",
                self.path.display(),
                builder.line_number
            );
            return;
        }

        let body = match builder.file_body {
            Some(reference) => Some(RequestBody::File(reference)),
            None => {
                let text = builder.body_lines.join("\n");
                let text = text.trim_end();
                (!text.is_empty()).then(|| RequestBody::Text(text.to_string()))
            }
        };

        let mut request = Request::new(builder.method, builder.url);
        request.name = builder.name;
        request.http_version = builder.http_version;
        request.headers = builder.headers;
        request.body = body;
        request.variables = self.scopes.file.clone();
        request.settings = builder.settings;
        request.file_path = self.path.to_path_buf();
        request.line_number = builder.line_number;
        self.requests.push(request);
    }
}
