use parse_display::Display;
use percent_encoding::percent_decode_str;
use regex::{Regex, escape};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::LazyLock;
use std::{fmt, str};
use tracing::{debug, trace};

mod uri;
mod vars;

mod tests_readme;

pub use uri::{Uri, UriSyntax};
pub use vars::Vars;

/// Finds `{name}` placeholders. A name is one or more characters other than `/`.
static VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^/]+?)\}").unwrap());

/// Capture group substituted for every placeholder in the match pattern.
const VALUE_RE: &str = "(.*)";

/// A URI template with `{name}` placeholders.
///
/// Parsing happens once in [`UriTemplate::new`]; the result is immutable and
/// can be shared between threads.
#[derive(Clone)]
pub struct UriTemplate {
    source: String,
    exprs: Vec<Expr>,
    pattern: String,
    find_regex: Regex,
    full_regex: Regex,
}
impl fmt::Debug for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.source)
    }
}
impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
impl Eq for UriTemplate {}
impl Hash for UriTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

/// A placeholder occurrence, `range` covering the braces.
#[derive(Debug, Clone)]
struct Expr {
    range: Range<usize>,
}
impl Expr {
    fn name<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.start + 1..self.range.end - 1]
    }
}

impl UriTemplate {
    /// Parses a template.
    ///
    /// Literal text between placeholders is percent-encoded as [`Uri::parse`]
    /// would encode it, so the pattern matches expanded URIs. If the pattern
    /// ends with `/`, that one `/` is dropped: `/hotels/{hotel}/` matches
    /// `/hotels/1` as well as `/hotels/1/`, while a template ending in a
    /// literal `/hotels/` no longer fully matches `/hotels/`. Implementations
    /// that quote each literal run as a whole (`\Q…\E`) never end the pattern
    /// in `/` and so never drop it; this one escapes character by character
    /// and does.
    ///
    /// Fails only when `s` is empty or whitespace.
    pub fn new(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::new(s, None, ErrorKind::InvalidArgument));
        }
        let mut exprs = Vec::new();
        let mut pattern = String::new();
        let mut end = 0;
        for m in VAR_RE.find_iter(s) {
            push_literal(&s[end..m.start()], &mut pattern);
            pattern.push_str(VALUE_RE);
            exprs.push(Expr { range: m.range() });
            end = m.end();
        }
        push_literal(&s[end..], &mut pattern);
        if pattern.ends_with('/') {
            pattern.pop();
        }
        let find_regex = compile(s, &pattern)?;
        let full_regex = compile(s, &format!(r"\A(?:{pattern})\z"))?;
        debug!(template = s, vars = exprs.len(), pattern = %pattern, "compiled uri template");
        Ok(Self {
            source: s.to_string(),
            exprs,
            pattern,
            find_regex,
            full_regex,
        })
    }

    /// Substitutes values into the template and structures the result as a [`Uri`].
    ///
    /// Values are inserted verbatim, then the whole string is encoded once by
    /// [`Uri::parse`]. Maps must hold every variable name; sequences must hold
    /// exactly one value per placeholder.
    pub fn expand(&self, vars: impl Vars) -> Result<Uri> {
        if let Some(actual) = vars.positional_len() {
            if actual != self.exprs.len() {
                return Err(Error::new(
                    &self.source,
                    None,
                    ErrorKind::VariableCountMismatch {
                        expected: self.exprs.len(),
                        actual,
                    },
                ));
            }
        }
        let mut values = Vec::with_capacity(self.exprs.len());
        for (index, expr) in self.exprs.iter().enumerate() {
            let name = expr.name(&self.source);
            let Some(value) = vars.var(index, name) else {
                return Err(Error::new(
                    &self.source,
                    Some(expr.range.start),
                    ErrorKind::MissingVariable(name.to_string()),
                ));
            };
            values.push(value);
        }
        let flat = self.substitute(&values);
        trace!(template = %self.source, expanded = %flat, "expanded uri template");
        Uri::parse(&flat).inspect_err(|e| {
            debug!(uri = %flat, error = %e.kind, "expanded template is not a valid uri");
        })
    }
    fn substitute(&self, values: &[Cow<str>]) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut source_index = 0;
        for (expr, value) in self.exprs.iter().zip(values) {
            out.push_str(&self.source[source_index..expr.range.start]);
            out.push_str(value);
            source_index = expr.range.end;
        }
        out.push_str(&self.source[source_index..]);
        out
    }

    /// Returns `true` if the whole of `uri` matches the template.
    pub fn matches(&self, uri: &str) -> bool {
        self.full_regex.is_match(uri)
    }

    /// Extracts variable values from the first match found in `uri`.
    ///
    /// Unlike [`matches`](Self::matches) the match need not span the whole
    /// input, so `/hotels/{hotel}` extracts `hotel` from
    /// `http://example.com/hotels/1` even though it does not match it.
    /// Returns empty [`Captures`] when nothing matches.
    pub fn captures<'a>(&'a self, uri: &'a str) -> Captures<'a> {
        let mut captures = Captures::empty();
        let Some(c) = self.find_regex.captures(uri) else {
            trace!(template = %self.source, uri, "no match");
            return captures;
        };
        for (index, expr) in self.exprs.iter().enumerate() {
            if let Some(m) = c.get(index + 1) {
                captures.insert(Match::new(m, expr.name(&self.source)));
            }
        }
        captures
    }

    /// The template as given to [`new`](Self::new).
    pub fn as_str(&self) -> &str {
        &self.source
    }
    /// The unanchored regular expression used for matching.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
    /// Variable names in order of appearance, duplicates included.
    pub fn var_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.exprs.iter().map(|e| e.name(&self.source))
    }
    /// Position of the first placeholder named `name`.
    pub fn find_var_name(&self, name: &str) -> Option<usize> {
        self.var_names().position(|n| n == name)
    }
}

fn push_literal(literal: &str, pattern: &mut String) {
    if !literal.is_empty() {
        pattern.push_str(&escape(&uri::encode_literal(literal)));
    }
}

fn compile(source: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::new(source, None, ErrorKind::InvalidPattern(e.to_string())))
}

impl str::FromStr for UriTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
impl Serialize for UriTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}
impl<'de> Deserialize<'de> for UriTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(de::Error::custom)
    }
}

/// Variable values extracted by [`UriTemplate::captures`].
///
/// Holds one entry per distinct name, in order of first appearance. When a
/// name occurs more than once the last occurrence supplies the value.
#[derive(Debug)]
pub struct Captures<'a> {
    ms: Vec<Match<'a>>,
}

impl<'a> Captures<'a> {
    pub const fn empty() -> Self {
        Self { ms: Vec::new() }
    }
    fn insert(&mut self, m: Match<'a>) {
        match self.ms.iter_mut().find(|e| e.name == m.name) {
            Some(e) => *e = m,
            None => self.ms.push(m),
        }
    }

    /// The entry for `name`, holding the value of its last occurrence.
    pub fn name(&self, name: &str) -> Option<&Match<'a>> {
        self.ms.iter().find(|m| m.name == name)
    }
    /// Number of distinct variable names.
    pub fn len(&self) -> usize {
        self.ms.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ms.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Match<'a>> {
        self.ms.iter()
    }
}
impl<'c, 'a> IntoIterator for &'c Captures<'a> {
    type Item = &'c Match<'a>;
    type IntoIter = std::slice::Iter<'c, Match<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
impl Serialize for Captures<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.ms.len()))?;
        for m in &self.ms {
            map.serialize_entry(m.name, m.value())?;
        }
        map.end()
    }
}

#[derive(Debug)]
pub struct Match<'a> {
    m: regex::Match<'a>,
    name: &'a str,
}
impl<'a> Match<'a> {
    fn new(m: regex::Match<'a>, name: &'a str) -> Self {
        Self { m, name }
    }
    pub fn name(&self) -> &'a str {
        self.name
    }
    /// The matched text, exactly as it occurs in the input.
    pub fn value(&self) -> &'a str {
        self.m.as_str()
    }
    /// The matched text with percent-encoded octets decoded.
    pub fn decoded_value(&self) -> Result<Cow<'a, str>> {
        percent_decode_str(self.m.as_str())
            .decode_utf8()
            .map_err(|_| Error::new(self.m.as_str(), None, ErrorKind::InvalidUtf8))
    }
    /// Byte offset of the value in the matched input.
    pub fn start(&self) -> usize {
        self.m.start()
    }
    pub fn end(&self) -> usize {
        self.m.end()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    #[display("template must contain at least one non-whitespace character")]
    InvalidArgument,
    #[display("no value for variable '{0}'")]
    MissingVariable(String),
    #[display("expected {expected} variable values, got {actual}")]
    VariableCountMismatch { expected: usize, actual: usize },
    #[display("invalid result uri: {0}")]
    InvalidResultUri(UriSyntax),
    #[display("invalid match pattern: {0}")]
    InvalidPattern(String),
    #[display("invalid utf-8 in percent-encoded value")]
    InvalidUtf8,
}

#[derive(Clone, Debug)]
pub struct Error {
    source: String,
    source_index: Option<usize>,
    kind: ErrorKind,
}

impl Error {
    fn new(source: &str, source_index: Option<usize>, kind: ErrorKind) -> Self {
        Self {
            source: source.to_string(),
            source_index,
            kind,
        }
    }
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
    /// The template, expanded URI or matched value the error refers to.
    pub fn input(&self) -> &str {
        &self.source
    }
    /// Byte offset into [`input`](Self::input) where the problem was found.
    pub fn index(&self) -> Option<usize> {
        self.source_index
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.source_index {
            Some(index) => write!(
                f,
                "{} (\"{} >>>> {}\")",
                self.kind,
                &self.source[..index],
                &self.source[index..],
            ),
            None => write!(f, "{} (\"{}\")", self.kind, self.source),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn placeholder_grammar() {
        let t = UriTemplate::new("/{a{b}/{}/{c/d}/{e}").unwrap();
        assert_eq!(t.var_names().collect::<Vec<_>>(), ["a{b", "e"]);
    }

    #[test]
    fn literals_are_encoded_and_escaped() {
        let t = UriTemplate::new("http://example.com/hotels/{hotel}").unwrap();
        assert_eq!(t.pattern(), r"http://example\.com/hotels/(.*)");
        let t = UriTemplate::new("/my hotels/{id}").unwrap();
        assert_eq!(t.pattern(), "/my%20hotels/(.*)");
    }

    #[test]
    fn trailing_slash_is_dropped_from_pattern() {
        let t = UriTemplate::new("/hotels/{hotel}/").unwrap();
        assert_eq!(t.pattern(), "/hotels/(.*)");
        let t = UriTemplate::new("/hotels/").unwrap();
        assert_eq!(t.pattern(), "/hotels");
    }

    #[test]
    fn find_var_name_returns_first_occurrence() {
        let t = UriTemplate::new("/{a}/{b}/{a}").unwrap();
        assert_eq!(t.find_var_name("a"), Some(0));
        assert_eq!(t.find_var_name("b"), Some(1));
    }

    #[test]
    fn substitute_is_verbatim() {
        let t = UriTemplate::new("/a/{x}/{y}").unwrap();
        let values = [Cow::Borrowed("$1"), Cow::Borrowed("{y}")];
        assert_eq!(t.substitute(&values), "/a/$1/{y}");
    }

    #[test]
    fn error_display() {
        let e = UriTemplate::new("/h/{hotel}/b/{booking}")
            .unwrap()
            .expand(["1"])
            .unwrap_err();
        assert_eq!(
            e.to_string(),
            "expected 2 variable values, got 1 (\"/h/{hotel}/b/{booking}\")"
        );
        let e = Uri::parse("ht tp://x").unwrap_err();
        assert_eq!(
            e.to_string(),
            "invalid result uri: illegal character in scheme name (\"ht >>>>  tp://x\")"
        );
    }

    #[traced_test]
    #[test]
    fn logs_compiled_pattern() {
        UriTemplate::new("/hotels/{hotel}").unwrap();
        assert!(logs_contain("compiled uri template"));
    }
}
