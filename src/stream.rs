//! Window-and-sink entry points shared by every context.
//!
//! Each context offers, next to its string-shaped functions, a variant taking
//! an optional input, an `(offset, len)` byte window over it and an optional
//! [`fmt::Write`] sink. The checks run in a fixed order before anything is
//! written:
//!
//! 1. the sink must be present,
//! 2. `offset` must not exceed the input length,
//! 3. `offset + len` must not exceed the input length,
//! 4. both ends of the window must fall on `char` boundaries.
//!
//! An absent input is treated as empty: the window must then be `(0, 0)` and
//! nothing is written.
//!
//! ```
//! use text_escape::stream::escape_to;
//! use text_escape::html::{HtmlEscape, HtmlEscapeLevel, HtmlEscapeType};
//!
//! let table = HtmlEscape::new(
//!     HtmlEscapeType::Html4NamedReferencesDefaultToDecimal,
//!     HtmlEscapeLevel::OnlyMarkupSignificantExceptApos,
//! );
//!
//! let mut out = String::new();
//! escape_to(Some("x < y & z"), 2, 5, Some(&mut out), table).unwrap();
//! assert_eq!(out, "&lt; y &amp;");
//! ```

use core::fmt;

use crate::{
    Error, InvalidArgumentError,
    token::{EscapeTable, EscapeTokens, UnescapeTable, UnescapeTokens},
};

/// Validates a window over `text` and returns the selected slice.
///
/// Returns `Ok(None)` for an absent input with the empty window.
pub fn check_window(
    text: Option<&str>,
    offset: usize,
    len: usize,
) -> Result<Option<&str>, InvalidArgumentError> {
    let text_len = text.map_or(0, str::len);
    if offset > text_len {
        return Err(InvalidArgumentError::OffsetOutOfBounds { offset, text_len });
    }
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= text_len)
        .ok_or(InvalidArgumentError::LengthOutOfBounds {
            offset,
            len,
            text_len,
        })?;

    let Some(text) = text else {
        return Ok(None);
    };
    text.get(offset..end)
        .map(Some)
        .ok_or(InvalidArgumentError::NotCharBoundary { offset, len })
}

#[inline]
fn require_sink<W: ?Sized>(sink: Option<&mut W>) -> Result<&mut W, InvalidArgumentError> {
    sink.ok_or(InvalidArgumentError::MissingSink)
}

/// Escapes the window `text[offset..offset + len]` into `sink`.
pub fn escape_to<T, W>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
    table: T,
) -> Result<(), Error>
where
    T: EscapeTable,
    T::Error: Into<Error>,
    W: fmt::Write + ?Sized,
{
    let sink = require_sink(sink)?;
    match check_window(text, offset, len)? {
        Some(window) => EscapeTokens::new(window, table).write_to(sink),
        None => Ok(()),
    }
}

/// Unescapes the window `text[offset..offset + len]` into `sink`.
///
/// Error positions are reported relative to the start of `text`, not of the
/// window. Output produced before a malformed sequence stays in the sink.
pub fn unescape_to<T, W>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
    table: T,
) -> Result<(), Error>
where
    T: UnescapeTable,
    T::Error: Into<Error>,
    W: fmt::Write + ?Sized,
{
    let sink = require_sink(sink)?;
    match check_window(text, offset, len)? {
        Some(window) => UnescapeTokens::at_position(window, table, offset).write_to(sink),
        None => Ok(()),
    }
}
