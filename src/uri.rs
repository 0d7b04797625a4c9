//! URI component percent-encoding, following RFC 3986.
//!
//! Each [`UriPart`] allows a different set of characters through. Everything
//! else is encoded to bytes, UTF-8 unless another encoding is requested, and
//! each byte is written as an upper-case `%XX` triplet.
//!
//! Unescaping collects runs of consecutive triplets and decodes each run as a
//! whole, so multi-byte characters split across triplets come back intact. In
//! query parameters `+` also stands for a space.
//!
//! ```
//! use text_escape::uri::{escape_uri, unescape_uri, UriPart};
//!
//! assert_eq!(escape_uri("a=b&c", UriPart::QueryParam, "UTF-8").unwrap(), "a%3Db%26c");
//! assert_eq!(escape_uri("café", UriPart::Path, "ISO-8859-1").unwrap(), "caf%E9");
//! assert_eq!(unescape_uri("caf%C3%A9+au+lait", UriPart::QueryParam, "UTF-8").unwrap(), "café au lait");
//! ```
//!
//! Unknown encodings are only reported once a character actually needs
//! encoding or decoding:
//!
//! ```
//! use text_escape::{Error, uri::{escape_uri, UriPart}};
//!
//! assert!(escape_uri("plain", UriPart::Path, "no-such-encoding").is_ok());
//! assert!(matches!(
//!     escape_uri("a b", UriPart::Path, "no-such-encoding"),
//!     Err(Error::UnsupportedEncoding(_))
//! ));
//! ```

use core::{convert::Infallible, fmt};
use std::borrow::Cow;

use memchr::{memchr, memchr2};

use crate::{
    Error, UnsupportedEncodingError,
    charset::Charset,
    stream,
    token::{
        Decoded, EncodedBytes, EscapeTable, EscapeToken, EscapeTokens, UnescapeTable,
        UnescapeTokens, Unescaped, into_ok, parse_hex,
    },
};

/// The URI component a piece of text is destined for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UriPart {
    /// A whole path: `/` is kept.
    Path,
    /// One path segment: `/` is escaped.
    PathSegment,
    /// A query parameter name or value: `= & + #` are escaped.
    QueryParam,
    /// The fragment identifier.
    FragmentId,
}

impl UriPart {
    /// Whether `c` is written through unchanged in this part.
    pub fn is_allowed(self, c: char) -> bool {
        match self {
            UriPart::Path => is_pchar(c) || c == '/',
            UriPart::PathSegment => is_pchar(c),
            UriPart::QueryParam => {
                !matches!(c, '=' | '&' | '+' | '#') && (is_pchar(c) || c == '/' || c == '?')
            }
            UriPart::FragmentId => is_pchar(c) || c == '/' || c == '?',
        }
    }
}

#[inline]
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

#[inline]
fn is_sub_delim(c: char) -> bool {
    matches!(c, '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=')
}

#[inline]
fn is_pchar(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c) || c == ':' || c == '@'
}

//==============================================================================
// Escaping
//==============================================================================

/// UTF-8 percent-encoding of one part. Cannot fail.
#[derive(Clone, Copy, Debug)]
struct Utf8Escape(UriPart);

impl EscapeTable for Utf8Escape {
    type Error = Infallible;

    #[inline]
    fn is_allowed(&self, c: char) -> bool {
        self.0.is_allowed(c)
    }

    fn encode(&self, c: char) -> Result<EscapeToken, Infallible> {
        Ok(EscapeToken::Percent(EncodedBytes::utf8(c)))
    }
}

/// Percent-encoding of one part in a named encoding. Implements
/// [`EscapeTable`].
#[derive(Clone, Debug)]
pub struct UriEscape {
    part: UriPart,
    charset: Result<Charset, UnsupportedEncodingError>,
}

impl UriEscape {
    /// Percent-encodes `part` in the encoding named by `encoding` (a WHATWG
    /// label such as `"UTF-8"`, `"ISO-8859-1"` or `"shift_jis"`).
    pub fn new(part: UriPart, encoding: &str) -> Self {
        Self {
            part,
            charset: Charset::for_label(encoding),
        }
    }

    /// Escapes `text`, borrowing it when nothing needs escaping.
    pub fn escape<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, Error> {
        Ok(EscapeTokens::new(text, self).into_cow()?)
    }

    /// Escapes the window `text[offset..offset + len]` into `sink`.
    pub fn escape_to<W: fmt::Write + ?Sized>(
        &self,
        text: Option<&str>,
        offset: usize,
        len: usize,
        sink: Option<&mut W>,
    ) -> Result<(), Error> {
        stream::escape_to(text, offset, len, sink, self)
    }
}

impl EscapeTable for UriEscape {
    type Error = UnsupportedEncodingError;

    #[inline]
    fn is_allowed(&self, c: char) -> bool {
        self.part.is_allowed(c)
    }

    fn encode(&self, c: char) -> Result<EscapeToken, UnsupportedEncodingError> {
        let charset = self.charset.as_ref().map_err(Clone::clone)?;
        Ok(EscapeToken::Percent(charset.encode_char(c)?))
    }
}

fn escape_utf8(text: &str, part: UriPart) -> Cow<'_, str> {
    into_ok(EscapeTokens::new(text, Utf8Escape(part)).into_cow())
}

/// Escapes a whole path as UTF-8.
pub fn escape_uri_path(text: &str) -> Cow<'_, str> {
    escape_utf8(text, UriPart::Path)
}

/// Escapes a single path segment as UTF-8.
pub fn escape_uri_path_segment(text: &str) -> Cow<'_, str> {
    escape_utf8(text, UriPart::PathSegment)
}

/// Escapes a query parameter name or value as UTF-8.
pub fn escape_uri_query_param(text: &str) -> Cow<'_, str> {
    escape_utf8(text, UriPart::QueryParam)
}

/// Escapes a fragment identifier as UTF-8.
pub fn escape_uri_fragment_id(text: &str) -> Cow<'_, str> {
    escape_utf8(text, UriPart::FragmentId)
}

/// Escapes `text` for `part` in the named encoding.
pub fn escape_uri<'a>(text: &'a str, part: UriPart, encoding: &str) -> Result<Cow<'a, str>, Error> {
    UriEscape::new(part, encoding).escape(text)
}

/// Window-and-sink form of [`escape_uri`].
pub fn escape_uri_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
    part: UriPart,
    encoding: &str,
) -> Result<(), Error> {
    UriEscape::new(part, encoding).escape_to(text, offset, len, sink)
}

//==============================================================================
// Unescaping
//==============================================================================

/// Strict percent-decoding of one part. Implements [`UnescapeTable`].
#[derive(Clone, Debug)]
pub struct UriUnescape {
    part: UriPart,
    charset: Result<Charset, UnsupportedEncodingError>,
}

impl UriUnescape {
    /// Decodes `part` with bytes interpreted in the encoding named by
    /// `encoding`.
    pub fn new(part: UriPart, encoding: &str) -> Self {
        Self {
            part,
            charset: Charset::for_label(encoding),
        }
    }

    /// Decodes `text`, borrowing it when there is nothing to decode.
    pub fn unescape<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, Error> {
        UnescapeTokens::new(text, self).into_cow()
    }

    /// Decodes the window `text[offset..offset + len]` into `sink`.
    pub fn unescape_to<W: fmt::Write + ?Sized>(
        &self,
        text: Option<&str>,
        offset: usize,
        len: usize,
        sink: Option<&mut W>,
    ) -> Result<(), Error> {
        stream::unescape_to(text, offset, len, sink, self)
    }

    #[inline]
    fn plus_is_space(&self) -> bool {
        self.part == UriPart::QueryParam
    }
}

impl UnescapeTable for UriUnescape {
    type Error = Error;

    #[inline]
    fn find_lead(&self, bytes: &[u8]) -> Option<usize> {
        if self.plus_is_space() {
            memchr2(b'%', b'+', bytes)
        } else {
            memchr(b'%', bytes)
        }
    }

    fn decode(&self, rest: &str, position: usize) -> Result<Option<Unescaped>, Error> {
        if rest.starts_with('+') {
            return Ok(Some(Unescaped::char(' ', 1)));
        }

        // One run of `%XX` triplets is decoded in one go.
        let mut bytes = Vec::new();
        let mut len = 0;
        while rest[len..].starts_with('%') {
            let triplet = &rest[len + 1..];
            let byte = parse_hex::<2>(triplet, position + len, 1)?;
            bytes.push(byte as u8);
            len += 3;
        }

        let charset = self.charset.as_ref().map_err(Clone::clone)?;
        let value = if len == 3 && bytes[0].is_ascii() && matches!(charset, Charset::Utf8) {
            Decoded::Char(bytes[0] as char)
        } else {
            Decoded::Text(charset.decode(bytes)?)
        };
        Ok(Some(Unescaped { value, len }))
    }
}

/// Decodes `text` as `part` with UTF-8 bytes.
fn unescape_utf8(text: &str, part: UriPart) -> Result<Cow<'_, str>, Error> {
    UriUnescape {
        part,
        charset: Ok(Charset::Utf8),
    }
    .unescape(text)
}

/// Decodes a whole path. `+` is kept as is.
pub fn unescape_uri_path(text: &str) -> Result<Cow<'_, str>, Error> {
    unescape_utf8(text, UriPart::Path)
}

/// Decodes a single path segment. `+` is kept as is.
pub fn unescape_uri_path_segment(text: &str) -> Result<Cow<'_, str>, Error> {
    unescape_utf8(text, UriPart::PathSegment)
}

/// Decodes a query parameter name or value. `+` becomes a space.
pub fn unescape_uri_query_param(text: &str) -> Result<Cow<'_, str>, Error> {
    unescape_utf8(text, UriPart::QueryParam)
}

/// Decodes a fragment identifier. `+` is kept as is.
pub fn unescape_uri_fragment_id(text: &str) -> Result<Cow<'_, str>, Error> {
    unescape_utf8(text, UriPart::FragmentId)
}

/// Decodes `text` as `part`, reading bytes in the named encoding.
pub fn unescape_uri<'a>(text: &'a str, part: UriPart, encoding: &str) -> Result<Cow<'a, str>, Error> {
    UriUnescape::new(part, encoding).unescape(text)
}

/// Window-and-sink form of [`unescape_uri`].
pub fn unescape_uri_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
    part: UriPart,
    encoding: &str,
) -> Result<(), Error> {
    UriUnescape::new(part, encoding).unescape_to(text, offset, len, sink)
}
