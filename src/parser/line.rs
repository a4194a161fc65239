//! Line classification for request files.
//!
//! [`classify`] looks at one physical line in isolation and says what kind
//! of line it is. It knows nothing about parser state: whether a `Content`
//! line is a request line, a header or body text is decided by the state
//! machine.

/// What a comment line contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind<'a> {
    /// Ordinary comment text
    Plain,
    /// `# ###`: a separator that has been commented out
    CommentedSeparator,
    /// `# @name <text>`
    Name(&'a str),
    /// `# @no-redirect`
    NoRedirect,
    /// `# @no-cookie-jar`
    NoCookieJar,
    /// `# @timeout <value>`, value not yet validated
    Timeout(&'a str),
    /// `# @import "<path>"`, quotes removed
    Import(&'a str),
}

/// The classification of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// `###` with an optional trailing request name
    Separator { name: Option<&'a str> },
    Comment(CommentKind<'a>),
    /// `@name = value`, both sides trimmed
    Variable { name: &'a str, value: &'a str },
    /// Starts with `@` but is not a valid definition
    MalformedVariable,
    /// Anything else; the untrimmed line
    Content(&'a str),
}

/// Classifies a single line (without its line terminator).
///
/// # Examples
///
/// ```
/// use rest_client_core::parser::line::{classify, CommentKind, LineKind};
///
/// assert_eq!(classify("### Get users"), LineKind::Separator { name: Some("Get users") });
/// assert_eq!(classify("# @no-redirect"), LineKind::Comment(CommentKind::NoRedirect));
/// assert_eq!(
///     classify("@host = example.com"),
///     LineKind::Variable { name: "host", value: "example.com" }
/// );
/// ```
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if trimmed.starts_with("###") {
        let name = trimmed.trim_start_matches('#').trim();
        return LineKind::Separator {
            name: (!name.is_empty()).then_some(name),
        };
    }

    if let Some(body) = trimmed
        .strip_prefix("//")
        .or_else(|| trimmed.strip_prefix('#'))
    {
        return LineKind::Comment(classify_comment(body.trim()));
    }

    if let Some(rest) = trimmed.strip_prefix('@') {
        return classify_variable(rest);
    }

    LineKind::Content(line)
}

fn classify_comment(body: &str) -> CommentKind<'_> {
    if body.starts_with("###") {
        return CommentKind::CommentedSeparator;
    }

    let Some(directive) = body.strip_prefix('@') else {
        return CommentKind::Plain;
    };

    let key_end = directive
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(directive.len());
    let (key, arg) = directive.split_at(key_end);
    let arg = arg.trim_start_matches(|c: char| c.is_whitespace() || c == '=').trim();

    match key {
        "name" if !arg.is_empty() => CommentKind::Name(arg),
        "no-redirect" => CommentKind::NoRedirect,
        "no-cookie-jar" => CommentKind::NoCookieJar,
        "timeout" => CommentKind::Timeout(arg),
        "import" if !arg.is_empty() => CommentKind::Import(unquote(arg)),
        _ => CommentKind::Plain,
    }
}

fn classify_variable(rest: &str) -> LineKind<'_> {
    let Some((name, value)) = rest.split_once('=') else {
        return LineKind::MalformedVariable;
    };
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return LineKind::MalformedVariable;
    }
    LineKind::Variable {
        name,
        value: value.trim(),
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    value
}
