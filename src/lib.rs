//! # Copy-on-write text escaping
//!
//! A collection of stateless escape and unescape transforms for several output
//! contexts: HTML markup, URI components, CSV fields and Java `.properties`
//! files. Every context runs on the same engine: a single-pass scanner that
//! splits the input into borrowed literal runs and characters needing a
//! transform, and an assembler that only allocates once the first transform
//! is found.
//!
//! ## Key Features
//! - **Identity Preservation**: When nothing needs to change, the string-shaped
//!   functions return [`Cow::Borrowed`] pointing at the very same input slice.
//! - **Escape Levels**: HTML and `.properties` escaping is configurable from
//!   "markup significant only" up to "every character".
//! - **Streaming Sinks**: Every context also accepts an `(offset, len)` window
//!   and writes straight into any [`core::fmt::Write`] sink.
//! - **Full Unicode Handling**: Supplementary characters are never split, and
//!   numeric escapes of surrogate halves are recombined on unescape.
//! - **Charsets**: URI percent-encoding can run over any encoding known to the
//!   [`encoding`] crate, not only UTF-8.
//!
//! ## Quick Start: Escaping
//!
//! ```
//! use std::borrow::Cow;
//! use text_escape::{escape_html5, escape_uri_path_segment};
//!
//! assert_eq!(escape_html5(r#"<div class="A">"#), "&lt;div class=&quot;A&quot;&gt;");
//! assert_eq!(escape_uri_path_segment("users list"), "users%20list");
//!
//! // Nothing to escape: no allocation, same slice back.
//! assert!(matches!(escape_html5("plain text"), Cow::Borrowed(_)));
//! ```
//!
//! ## Quick Start: Unescaping
//!
//! ```
//! use text_escape::{unescape_html, unescape_properties, unescape_uri_query_param};
//!
//! assert_eq!(unescape_html("Tom &amp; Jerry"), "Tom & Jerry");
//! assert_eq!(unescape_uri_query_param("a+b").unwrap(), "a b");
//! assert_eq!(unescape_properties(r"smile \uD83D\uDE00").unwrap(), "smile 😀");
//! ```
//!
//! ## Streaming into a sink
//!
//! ```
//! use text_escape::properties::{PropertiesEscape, PropertiesEscapeLevel, PropertiesRole};
//!
//! let escaper = PropertiesEscape::new(
//!     PropertiesRole::Value,
//!     PropertiesEscapeLevel::AllNonAsciiPlusBasicEscapeSet,
//! );
//!
//! let mut sink = String::new();
//! escaper.escape_to(Some("key=\tá!"), 4, 4, Some(&mut sink)).unwrap();
//! assert_eq!(sink, r"\t\u00E1!");
//! ```
#![deny(missing_docs)]

use core::{convert::Infallible, fmt};
#[cfg(doc)]
use std::borrow::Cow;

use thiserror::Error;

mod charset;
pub mod csv;
pub mod html;
pub mod properties;
pub mod stream;
pub mod token;
pub mod uri;

pub use csv::{escape_csv, unescape_csv};
pub use html::{
    HtmlEscapeLevel, HtmlEscapeType, escape_html, escape_html4, escape_html4_xml, escape_html5,
    escape_html5_xml, unescape_html,
};
pub use properties::{
    PropertiesEscapeLevel, PropertiesRole, escape_properties_key, escape_properties_key_minimal,
    escape_properties_value, escape_properties_value_minimal, unescape_properties,
};
pub use uri::{
    UriPart, escape_uri_fragment_id, escape_uri_path, escape_uri_path_segment,
    escape_uri_query_param, unescape_uri_fragment_id, unescape_uri_path,
    unescape_uri_path_segment, unescape_uri_query_param,
};

// =============================================================================
// Error Types
// =============================================================================

/// Any error produced by the escaping engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller broke the argument contract (missing sink, bad window).
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),
    /// The requested text encoding is not known.
    #[error(transparent)]
    UnsupportedEncoding(#[from] UnsupportedEncodingError),
    /// The input contained a malformed escape sequence.
    #[error(transparent)]
    Unescape(#[from] UnescapeError),
    /// The output sink refused a write.
    #[error("failed to write to the output sink")]
    Write(#[from] fmt::Error),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A violation of the calling contract, raised before any output is produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidArgumentError {
    /// No output sink was supplied.
    #[error("argument 'sink' cannot be absent")]
    MissingSink,
    /// `offset` points past the end of the input.
    #[error("invalid offset {offset}: input length is {text_len}")]
    OffsetOutOfBounds {
        /// The requested offset.
        offset: usize,
        /// The length of the input.
        text_len: usize,
    },
    /// `offset + len` points past the end of the input.
    #[error("invalid (offset, len) = ({offset}, {len}): input length is {text_len}")]
    LengthOutOfBounds {
        /// The requested offset.
        offset: usize,
        /// The requested length.
        len: usize,
        /// The length of the input.
        text_len: usize,
    },
    /// The window does not start or end on a `char` boundary.
    #[error("window ({offset}, {len}) does not fall on char boundaries")]
    NotCharBoundary {
        /// The requested offset.
        offset: usize,
        /// The requested length.
        len: usize,
    },
    /// A numeric escape level outside of the range defined by the context.
    #[error("escape level {level} is not defined for this context")]
    InvalidLevel {
        /// The rejected level.
        level: u8,
    },
}

/// The named text encoding is not supported.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unsupported encoding {label:?}{}", .cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default())]
pub struct UnsupportedEncodingError {
    pub(crate) label: String,
    pub(crate) cause: Option<String>,
}

impl UnsupportedEncodingError {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            cause: None,
        }
    }

    /// Returns the encoding label that could not be used.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Details of an invalid escape sequence error.
#[derive(Copy, Eq, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct InvalidEscapeError {
    /// The invalid character found after the escape lead.
    pub found: char,
}

/// Details of a lone UTF-16 surrogate error.
#[derive(Copy, Eq, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct LoneSurrogateError {
    /// The 16-bit surrogate code point.
    pub surrogate: u16,
}

/// Details of an invalid hex digit error.
#[derive(Copy, Eq, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct InvalidHexError {
    /// The non-hex character that was found.
    pub found: char,
}

/// The specific kind of error that can occur while unescaping.
#[derive(Copy, Eq, PartialEq, Clone, Debug, Error)]
#[non_exhaustive]
pub enum UnescapeErrorKind {
    /// Found an escape lead followed by an unexpected character (e.g., `\x`).
    #[error("invalid escape: {:?}", .0.found)]
    InvalidEscape(InvalidEscapeError),
    /// A fixed-width hex field contained a non-hex character.
    #[error("found invalid hex digit {:?}", .0.found)]
    InvalidHex(InvalidHexError),
    /// Input ended in the middle of an escape sequence (e.g., `%4`).
    #[error("unexpected end of input while parsing escape sequence")]
    UnexpectedEof,
    /// A `\uXXXX` sequence yielded a surrogate without its partner.
    #[error("lone surrogate found: 0x{:04X}", .0.surrogate)]
    LoneSurrogate(LoneSurrogateError),
}

/// An error that can occur during unescaping.
#[derive(Copy, Eq, PartialEq, Clone, Debug, Error)]
#[error("{kind} at position {position}, offset {offset}")]
pub struct UnescapeError {
    pub(crate) kind: UnescapeErrorKind,
    /// Byte position of the escape lead in the input.
    pub(crate) position: usize,
    /// Byte offset from the escape lead where the error was detected.
    pub(crate) offset: u8,
}

impl UnescapeError {
    pub(crate) const fn new(kind: UnescapeErrorKind, position: usize, offset: u8) -> Self {
        Self {
            kind,
            position,
            offset,
        }
    }

    /// Returns the specific kind of error that occurred.
    ///
    /// ### Example
    ///
    /// ```
    /// # use text_escape::{unescape_properties, Error, UnescapeErrorKind, InvalidHexError};
    /// let Err(Error::Unescape(err)) = unescape_properties(r"\u123Z") else { panic!() };
    ///
    /// match err.kind() {
    ///     UnescapeErrorKind::InvalidHex(InvalidHexError { found, .. }) => assert_eq!(found, 'Z'),
    ///     _ => panic!("Expected an InvalidHex error"),
    /// }
    /// ```
    pub fn kind(&self) -> UnescapeErrorKind {
        self.kind
    }

    /// Returns the byte position of the escape lead (`\`, `%`, ...) that
    /// started the malformed sequence.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the byte offset from the escape lead where the error was
    /// detected.
    ///
    /// - For `\x`, the offset is `1` (pointing to `x`).
    /// - For `\u123?`, the offset is `5` (pointing to `?`).
    /// - For `%4` at the end of input, the offset is `2` (the missing digit).
    pub fn offset(&self) -> u8 {
        self.offset
    }
}

#[cfg(test)]
pub(crate) fn ensure_env_logger_initialized() {
    use std::sync::Once;

    static LOGGER_INIT: Once = Once::new();
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unescape_error_display() {
        let err = UnescapeError::new(
            UnescapeErrorKind::InvalidEscape(InvalidEscapeError { found: 'x' }),
            4,
            1,
        );
        assert_eq!(err.to_string(), "invalid escape: 'x' at position 4, offset 1");
        assert_eq!(err.position(), 4);
        assert_eq!(err.offset(), 1);
    }

    #[test]
    fn unsupported_encoding_display() {
        let err = UnsupportedEncodingError::new("klingon");
        assert_eq!(err.to_string(), r#"unsupported encoding "klingon""#);

        let err = UnsupportedEncodingError {
            label: "x".into(),
            cause: Some("boom".into()),
        };
        assert_eq!(err.to_string(), r#"unsupported encoding "x": boom"#);
    }

    #[test]
    fn errors_convert_into_crate_error() {
        let err: Error = InvalidArgumentError::MissingSink.into();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err: Error = fmt::Error.into();
        assert_eq!(err.to_string(), "failed to write to the output sink");
    }

    #[test]
    fn sync_regression() {
        use core::panic::{RefUnwindSafe, UnwindSafe};

        fn assert_send_sync<T: Send + Sync + UnwindSafe + RefUnwindSafe>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<html::HtmlEscape>();
        assert_send_sync::<properties::PropertiesEscape>();
    }
}
