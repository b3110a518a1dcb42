use crate::{Error, ErrorKind, Result};
use parse_display::Display;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Serialize, Serializer};
use std::fmt;

/// Bytes encoded in a path. `%` is always encoded.
const ENCODE_PATH: &AsciiSet = &NON_ALPHANUMERIC
    // unreserved
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    // punct
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'/');

/// Bytes encoded in a scheme-specific part, query or fragment.
const ENCODE_URIC: &AsciiSet = &ENCODE_PATH.remove(b'?').remove(b'[').remove(b']');

/// Why a string could not be structured into a [`Uri`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum UriSyntax {
    #[display("expected scheme name")]
    MissingScheme,
    #[display("illegal character in scheme name")]
    IllegalSchemeChar,
    #[display("expected scheme-specific part")]
    MissingSchemeSpecificPart,
    #[display("expected authority")]
    ExpectedAuthority,
}

/// A URI produced by expanding a [`UriTemplate`](crate::UriTemplate).
///
/// All components are stored in their encoded (ASCII) form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    serialization: String,
    scheme: Option<String>,
    scheme_specific_part: String,
    authority: Option<String>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl Uri {
    /// Structures `s` into a URI, percent-encoding each component once.
    ///
    /// The path of a hierarchical URI is encoded with the path rules whether
    /// or not a scheme is present, so `[` and `]` only survive in the
    /// authority, query and fragment.
    ///
    /// The first `:` always ends the scheme. Without a scheme the string is a
    /// path, optionally followed by `?query` and `#fragment`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts = Parts::split(s);
        if let Parts::Absolute {
            scheme,
            ssp,
            fragment,
        } = parts
        {
            if let Err((index, syntax)) = check_scheme(scheme) {
                return Err(Error::new(s, Some(index), ErrorKind::InvalidResultUri(syntax)));
            }
            if ssp.is_empty() {
                return Err(Error::new(
                    s,
                    Some(scheme.len() + 1),
                    ErrorKind::InvalidResultUri(UriSyntax::MissingSchemeSpecificPart),
                ));
            }
            // `//` opens an authority, which may only be empty when something follows it
            if ssp == "//" && fragment.is_none() {
                return Err(Error::new(
                    s,
                    Some(scheme.len() + 3),
                    ErrorKind::InvalidResultUri(UriSyntax::ExpectedAuthority),
                ));
            }
        }
        Ok(parts.to_uri())
    }

    pub fn as_str(&self) -> &str {
        &self.serialization
    }
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }
    pub fn scheme_specific_part(&self) -> &str {
        &self.scheme_specific_part
    }
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }
    /// `None` for opaque URIs such as `mailto:a@b`.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }
    pub fn is_opaque(&self) -> bool {
        self.is_absolute() && self.path.is_none()
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.serialization)
    }
}
impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.serialization)
    }
}
impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.serialization
    }
}
impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.serialization
    }
}
impl Serialize for Uri {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.serialization)
    }
}

/// Percent-encodes a literal run of a template the same way [`Uri::parse`]
/// would, but never fails.
pub(crate) fn encode_literal(s: &str) -> String {
    Parts::split(s).to_uri().serialization
}

#[derive(Debug, Clone, Copy)]
enum Parts<'a> {
    Absolute {
        scheme: &'a str,
        ssp: &'a str,
        fragment: Option<&'a str>,
    },
    Relative {
        path: &'a str,
        query: Option<&'a str>,
        fragment: Option<&'a str>,
    },
}

impl<'a> Parts<'a> {
    fn split(s: &'a str) -> Self {
        if let Some((scheme, rest)) = s.split_once(':') {
            let (ssp, fragment) = split_fragment(rest);
            Self::Absolute {
                scheme,
                ssp,
                fragment,
            }
        } else if let Some((path, rest)) = s.split_once('?') {
            let (query, fragment) = split_fragment(rest);
            Self::Relative {
                path,
                query: Some(query),
                fragment,
            }
        } else {
            let (path, fragment) = split_fragment(s);
            Self::Relative {
                path,
                query: None,
                fragment,
            }
        }
    }

    fn to_uri(self) -> Uri {
        match self {
            Self::Absolute {
                scheme,
                ssp,
                fragment,
            } => {
                let scheme = encode(scheme, ENCODE_URIC);
                let fragment = fragment.map(|s| encode(s, ENCODE_URIC));
                let (ssp, authority, path, query) = if ssp.starts_with('/') {
                    let (authority, path, query) = split_hierarchical(ssp);
                    let authority = authority.map(|s| encode(s, ENCODE_URIC));
                    let path = encode(path, ENCODE_PATH);
                    let query = query.map(|s| encode(s, ENCODE_URIC));
                    let mut ssp = String::new();
                    if let Some(authority) = &authority {
                        ssp.push_str("//");
                        ssp.push_str(authority);
                    }
                    ssp.push_str(&path);
                    if let Some(query) = &query {
                        ssp.push('?');
                        ssp.push_str(query);
                    }
                    (ssp, authority, Some(path), query)
                } else {
                    (encode(ssp, ENCODE_URIC), None, None, None)
                };
                let mut serialization = format!("{scheme}:{ssp}");
                push_fragment(&mut serialization, fragment.as_deref());
                Uri {
                    serialization,
                    scheme: Some(scheme),
                    scheme_specific_part: ssp,
                    authority,
                    path,
                    query,
                    fragment,
                }
            }
            Self::Relative {
                path,
                query,
                fragment,
            } => {
                let path = encode(path, ENCODE_PATH);
                let query = query.map(|s| encode(s, ENCODE_URIC));
                let fragment = fragment.map(|s| encode(s, ENCODE_URIC));
                let mut ssp = path.clone();
                if let Some(query) = &query {
                    ssp.push('?');
                    ssp.push_str(query);
                }
                let mut serialization = ssp.clone();
                push_fragment(&mut serialization, fragment.as_deref());
                Uri {
                    serialization,
                    scheme: None,
                    scheme_specific_part: ssp,
                    authority: None,
                    path: Some(path),
                    query,
                    fragment,
                }
            }
        }
    }
}

fn split_fragment(s: &str) -> (&str, Option<&str>) {
    match s.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (s, None),
    }
}

/// Splits a hierarchical part into authority, path and query.
fn split_hierarchical(ssp: &str) -> (Option<&str>, &str, Option<&str>) {
    let (authority, rest) = match ssp.strip_prefix("//") {
        Some(rest) => {
            let end = rest.find(['/', '?']).unwrap_or(rest.len());
            (Some(&rest[..end]), &rest[end..])
        }
        None => (None, ssp),
    };
    match rest.split_once('?') {
        Some((path, query)) => (authority, path, Some(query)),
        None => (authority, rest, None),
    }
}

fn push_fragment(out: &mut String, fragment: Option<&str>) {
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
}

fn encode(s: &str, set: &'static AsciiSet) -> String {
    utf8_percent_encode(s, set).to_string()
}

fn check_scheme(scheme: &str) -> std::result::Result<(), (usize, UriSyntax)> {
    let mut chars = scheme.char_indices();
    match chars.next() {
        None => return Err((0, UriSyntax::MissingScheme)),
        Some((_, c)) if !c.is_ascii_alphabetic() => return Err((0, UriSyntax::IllegalSchemeChar)),
        Some(_) => {}
    }
    for (index, c) in chars {
        if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
            return Err((index, UriSyntax::IllegalSchemeChar));
        }
    }
    Ok(())
}
