//! module source addresses
//!
//! A module source is the string assigned to the `source` attribute of a `module` block.
//! The supported format is
//!
//! ```text
//! [git::][<scheme>://]<host><module>[//<submodule>][?ref=<revision>]
//! ```
//!
//! - `git::` is the only special prefix
//! - `<submodule>` starts at the first `//` of the path and keeps the marker
//! - at most one query parameter is accepted and it must be `ref`
//! - without a scheme the host is not split off, it stays the leading part of `<module>`
//!
//! Parsing is lossless: for every accepted `s`, `ModuleSource::parse(s)?.to_string() == s`.
//! The only exception is the `github.com/...` shorthand, which becomes `https://github.com/...`.
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The only special prefix we know how to handle
pub const GIT_PREFIX: &str = "git::";

/// Host that may be written without a scheme, implies `https://`
const WELL_KNOWN_HOST: &str = "github.com";

const REVISION_PARAMETER: &str = "ref";

const TEMPLATE_SEQUENCES: [&str; 2] = ["${", "%{"];

/// Pinned revision of a module (value of the `ref` query parameter)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(String);

impl Revision {
    pub fn new(revision: impl Into<String>) -> Self {
        Self(revision.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Revision {
    fn from(value: &str) -> Self {
        Revision::new(value)
    }
}

impl From<String> for Revision {
    fn from(value: String) -> Self {
        Revision(value)
    }
}

/// A module source split into its parts
///
/// Every field is kept exactly as written. An empty value means the part is absent, which is
/// also what makes a partially filled source usable as a filter or as a replacement template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModuleSource {
    /// [GIT_PREFIX] or empty
    pub special_prefix: String,
    pub scheme: String,
    /// authority as written, including user info and port
    pub host: String,
    /// path of the module (organization and repository) up to a `//` marker
    pub module: String,
    /// rest of the path starting at the `//` marker
    pub submodule: String,
    pub revision: Revision,
}

impl ModuleSource {
    /// Parse a module source string
    ///
    /// An empty string yields an empty source.
    pub fn parse(source: &str) -> Result<Self, SourceError> {
        if source.is_empty() {
            return Ok(Self::default());
        }

        if let Some(c) = source
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(SyntaxError::UnexpectedCharacter(c).into());
        }

        // would turn the surrounding hcl literal into a template
        if TEMPLATE_SEQUENCES.iter().any(|sequence| source.contains(sequence)) {
            return Err(InvalidFormat::TemplateSequence.into());
        }

        let source = expand_shorthand(source);
        let (special_prefix, source) = split_special_prefix(&source)?;
        let (source, query) = split_query(source)?;
        let (scheme, host, path) = split_url(source)?;

        let (module, submodule) = match path.find("//") {
            Some(index) => path.split_at(index),
            None => (path, ""),
        };

        let revision = parse_query(query)?;

        Ok(Self {
            special_prefix: special_prefix.to_owned(),
            scheme: scheme.to_owned(),
            host: host.to_owned(),
            module: module.to_owned(),
            submodule: submodule.to_owned(),
            revision,
        })
    }

    /// Combine two sources
    ///
    /// Every non-empty field of `overlay` replaces the field of `self`, empty fields are kept
    /// from `self`.
    pub fn merge(&self, overlay: &ModuleSource) -> ModuleSource {
        fn pick(base: &str, overlay: &str) -> String {
            let value = if overlay.is_empty() { base } else { overlay };
            value.to_owned()
        }

        ModuleSource {
            special_prefix: pick(&self.special_prefix, &overlay.special_prefix),
            scheme: pick(&self.scheme, &overlay.scheme),
            host: pick(&self.host, &overlay.host),
            module: pick(&self.module, &overlay.module),
            submodule: pick(&self.submodule, &overlay.submodule),
            revision: pick(self.revision.as_str(), overlay.revision.as_str()).into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &ModuleSource::default()
    }

    /// Serialize, refusing results that would not parse back to the same source
    pub fn to_checked_string(&self) -> Result<String, SourceError> {
        let serialized = self.to_string();
        let parsed = ModuleSource::parse(&serialized)?;
        if &parsed != self {
            return Err(InvalidFormat::Ambiguous(serialized).into());
        }

        Ok(serialized)
    }
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.special_prefix)?;
        if !self.scheme.is_empty() {
            write!(f, "{}://", self.scheme)?;
        }
        f.write_str(&self.host)?;
        f.write_str(&self.module)?;
        f.write_str(&self.submodule)?;
        if !self.revision.is_empty() {
            write!(f, "?{REVISION_PARAMETER}={}", self.revision)?;
        }

        Ok(())
    }
}

impl FromStr for ModuleSource {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleSource::parse(s)
    }
}

/// `github.com/org/repo` is shorthand for `https://github.com/org/repo`
fn expand_shorthand(source: &str) -> Cow<'_, str> {
    match source.strip_prefix(WELL_KNOWN_HOST) {
        Some(rest) if rest.is_empty() || rest.starts_with(|c: char| c == '/' || c == '?') => {
            Cow::Owned(format!("https://{source}"))
        }
        _ => Cow::Borrowed(source),
    }
}

/// Split at the last `::`, the prefix keeps the colons
fn split_special_prefix(source: &str) -> Result<(&str, &str), SourceError> {
    let Some(index) = source.rfind("::") else {
        return Ok(("", source));
    };

    let (prefix, rest) = source.split_at(index + 2);
    if rest.is_empty() {
        return Err(InvalidFormat::PrefixOnly.into());
    }

    if prefix != GIT_PREFIX {
        return Err(InvalidFormat::UnsupportedPrefix(prefix.to_owned()).into());
    }

    Ok((prefix, rest))
}

/// Split off the raw query, the path is never inspected for `?`
fn split_query(source: &str) -> Result<(&str, Option<&str>), SourceError> {
    if source.contains('#') {
        return Err(InvalidFormat::Fragment.into());
    }

    Ok(match source.split_once('?') {
        Some((source, query)) => (source, Some(query)),
        None => (source, None),
    })
}

fn parse_query(query: Option<&str>) -> Result<Revision, SourceError> {
    let Some(query) = query else {
        return Ok(Revision::default());
    };

    // we do not know what other parameters would mean, so refuse instead of dropping them
    if query.contains('&') {
        return Err(InvalidFormat::TooManyQueryParameters.into());
    }

    match query.split_once('=') {
        Some((REVISION_PARAMETER, "")) => Err(InvalidFormat::EmptyRevision.into()),
        Some((REVISION_PARAMETER, revision)) => Ok(Revision::new(revision)),
        _ => Err(InvalidFormat::UnexpectedQueryParameter(query.to_owned()).into()),
    }
}

/// Returns scheme, host and path
///
/// Fields are cut from the raw string, [url::Url] only checks that the syntax is sound. Its
/// normalized output would break the round trip.
fn split_url(source: &str) -> Result<(&str, &str, &str), SourceError> {
    if let Some((scheme, rest)) = source.split_once("://") {
        if is_scheme(scheme) {
            url::Url::parse(source).map_err(SyntaxError::from)?;

            let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
            return Ok((scheme, host, path));
        }
    }

    let first_segment = source.split('/').next().unwrap_or_default();
    if first_segment.contains(':') {
        return Err(SyntaxError::ColonInFirstSegment(first_segment.to_owned()).into());
    }

    let base = url::Url::parse("file:///").map_err(SyntaxError::from)?;
    base.join(source).map_err(SyntaxError::from)?;

    Ok(("", "", source))
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The string is a URL, but not one we can safely interpret as a module source
    #[error("invalid module source format")]
    InvalidFormat(#[from] InvalidFormat),
    #[error("cannot parse source string")]
    Syntax(#[from] SyntaxError),
}

impl SourceError {
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, SourceError::InvalidFormat(_))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidFormat {
    #[error("module source consists only of special prefix")]
    PrefixOnly,
    #[error("only 'git::' special prefix is supported but got '{0}'")]
    UnsupportedPrefix(String),
    #[error("more than 1 query parameter found")]
    TooManyQueryParameters,
    #[error("query param '{0}' is provided but it is not 'ref'")]
    UnexpectedQueryParameter(String),
    #[error("'ref' query param has no value")]
    EmptyRevision,
    #[error("fragments are not supported")]
    Fragment,
    #[error("template sequences ('${{' or '%{{') are not supported")]
    TemplateSequence,
    #[error("'{0}' does not read back as the same module source")]
    Ambiguous(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("first path segment '{0}' cannot contain a colon")]
    ColonInFirstSegment(String),
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
}
