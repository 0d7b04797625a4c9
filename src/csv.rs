//! CSV field quoting, as in RFC 4180.
//!
//! A field made only of alphanumeric characters is left alone. Anything else
//! is wrapped in double quotes, with every embedded quote doubled.
//!
//! ```
//! use text_escape::{escape_csv, unescape_csv};
//!
//! assert_eq!(escape_csv("value,with,commas"), r#""value,with,commas""#);
//! assert_eq!(escape_csv(r#"He said "hi""#), r#""He said ""hi""""#);
//! assert_eq!(unescape_csv(r#""He said ""hi""""#), r#"He said "hi""#);
//! ```

use core::fmt;
use std::borrow::Cow;

use log::trace;
use memchr::{memchr, memmem};

use crate::{
    Error,
    stream::check_window,
    token::{EXTRA_CAPACITY, Output, Sink, into_ok},
};

#[inline]
fn needs_quoting(text: &str) -> bool {
    !text.chars().all(char::is_alphanumeric)
}

/// Writes `text` between quotes, doubling embedded quotes.
fn write_quoted<O: Output + ?Sized>(text: &str, out: &mut O) -> Result<(), O::Error> {
    out.push('"')?;
    let mut rest = text;
    while let Some(pos) = memchr(b'"', rest.as_bytes()) {
        out.push_str(&rest[..=pos])?;
        out.push('"')?;
        rest = &rest[pos + 1..];
    }
    out.push_str(rest)?;
    out.push('"')
}

/// Writes `text` with every `""` collapsed to `"`.
fn write_unquoted<O: Output + ?Sized>(text: &str, out: &mut O) -> Result<(), O::Error> {
    let mut rest = text;
    while let Some(pos) = memmem::find(rest.as_bytes(), b"\"\"") {
        out.push_str(&rest[..=pos])?;
        rest = &rest[pos + 2..];
    }
    out.push_str(rest)
}

/// The inside of a quoted field, or `None` when `text` is not quoted.
#[inline]
fn quoted_body(text: &str) -> Option<&str> {
    text.strip_prefix('"')?.strip_suffix('"')
}

/// Quotes `text` when it contains any non-alphanumeric character.
pub fn escape_csv(text: &str) -> Cow<'_, str> {
    if !needs_quoting(text) {
        return Cow::Borrowed(text);
    }
    trace!("csv: quoting a field of {} bytes", text.len());
    let mut out = String::with_capacity(text.len() + EXTRA_CAPACITY);
    into_ok(write_quoted(text, &mut out));
    Cow::Owned(out)
}

/// Window-and-sink form of [`escape_csv`].
pub fn escape_csv_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
) -> Result<(), Error> {
    let sink = sink.ok_or(crate::InvalidArgumentError::MissingSink)?;
    let Some(window) = check_window(text, offset, len)? else {
        return Ok(());
    };
    if needs_quoting(window) {
        write_quoted(window, &mut Sink(sink))?;
    } else {
        sink.write_str(window)?;
    }
    Ok(())
}

/// Removes the quoting from a quoted field. Unquoted text is returned as is.
///
/// When the quoted body holds no doubled quote the result borrows the body.
pub fn unescape_csv(text: &str) -> Cow<'_, str> {
    let Some(body) = quoted_body(text) else {
        return Cow::Borrowed(text);
    };
    if memmem::find(body.as_bytes(), b"\"\"").is_none() {
        return Cow::Borrowed(body);
    }
    trace!("csv: unquoting a field of {} bytes", text.len());
    let mut out = String::with_capacity(body.len());
    into_ok(write_unquoted(body, &mut out));
    Cow::Owned(out)
}

/// Window-and-sink form of [`unescape_csv`].
pub fn unescape_csv_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
) -> Result<(), Error> {
    let sink = sink.ok_or(crate::InvalidArgumentError::MissingSink)?;
    let Some(window) = check_window(text, offset, len)? else {
        return Ok(());
    };
    match quoted_body(window) {
        Some(body) => write_unquoted(body, &mut Sink(sink))?,
        None => sink.write_str(window)?,
    }
    Ok(())
}
