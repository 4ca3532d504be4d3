//! # Lenient Address Splitting
//!
//! Signer replies are URI-like but not guaranteed to be valid URIs: the
//! fallback form embeds raw JSON (`{ } [ ] : "`) directly after the host.
//! A strict URI parser would read `:` as a port separator or `[` as an IPv6
//! literal, so addresses are split by hand:
//!
//! ```text
//! scheme ":" ["//"] host-and-path ["?" query] ["#" fragment]
//! ```

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::errors::ParseError;

/// An inbound address broken into the pieces the codec reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAddress<'a> {
    /// Scheme as written (compare case-insensitively).
    pub scheme: &'a str,
    /// Host and path, concatenated and percent-decoded.
    pub host_path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<&'a str>,
}

impl<'a> SplitAddress<'a> {
    /// Split `address`.
    ///
    /// # Errors
    ///
    /// `ParseError::MissingScheme` if there is no non-empty scheme.
    pub fn parse(address: &'a str) -> Result<Self, ParseError> {
        let (scheme, rest) = address.split_once(':').ok_or(ParseError::MissingScheme)?;
        if !is_valid_scheme(scheme) {
            return Err(ParseError::MissingScheme);
        }

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let rest = match rest.split_once('#') {
            Some((before, _fragment)) => before,
            None => rest,
        };
        let (host_path, query) = match rest.split_once('?') {
            Some((host_path, query)) => (host_path, Some(query)),
            None => (rest, None),
        };

        Ok(Self {
            scheme,
            host_path: decode_component(host_path).into_owned(),
            query,
        })
    }

    /// Whether the scheme equals `expected`, ignoring ASCII case.
    #[must_use]
    pub fn has_scheme(&self, expected: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(expected)
    }

    /// First value of query parameter `name`, form-decoded.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}
