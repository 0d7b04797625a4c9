//! Provides the low-level, token-based engine every escaping context runs on.
//!
//! A context is described by two small tables: an [`EscapeTable`] that decides
//! which characters pass through untouched and how the rest are encoded, and an
//! [`UnescapeTable`] that finds escape leads and decodes the sequence behind
//! them. This module turns those tables into iterators, [`EscapeTokens`] and
//! [`UnescapeTokens`], that walk a string slice and yield tokens.
//!
//! ## Escaping
//!
//! The [`EscapeTokens`] iterator yields [`EscapedToken`]s, separating borrowed
//! literal runs from the single characters that must be transformed. The
//! caller asks the table to [`encode`](EscapeTable::encode) each of those into
//! an [`EscapeToken`], which knows how to render itself.
//!
//! ## Unescaping
//!
//! The [`UnescapeTokens`] iterator yields [`UnescapedToken`]s. A malformed
//! sequence is reported only after every literal run preceding it has been
//! yielded, and the iterator is fused afterwards.
//!
//! ## Copy-on-write
//!
//! [`EscapeTokens::into_cow`] and [`UnescapeTokens::into_cow`] collect the
//! tokens into a [`Cow`]. When the input needs no transform the result borrows
//! the very same slice, and no buffer is ever allocated.

use core::{convert::Infallible, fmt, iter::FusedIterator};
use std::borrow::Cow;

use log::trace;

use crate::{Error, InvalidHexError, UnescapeError, UnescapeErrorKind};

/// Slack added to the input length when the output buffer is first allocated.
pub(crate) const EXTRA_CAPACITY: usize = 20;

//==============================================================================
// Tables
//==============================================================================

/// Describes how a context escapes text.
pub trait EscapeTable {
    /// The error produced by [`encode`](Self::encode). Contexts that cannot
    /// fail use [`Infallible`].
    type Error;

    /// Returns `true` when `c` is written through unchanged.
    fn is_allowed(&self, c: char) -> bool;

    /// Whether ASCII letters always pass through without consulting
    /// [`is_allowed`](Self::is_allowed). Only "escape everything" levels
    /// turn this off.
    #[inline]
    fn letters_always_allowed(&self) -> bool {
        true
    }

    /// Encodes a character that is not allowed.
    fn encode(&self, c: char) -> Result<EscapeToken, Self::Error>;
}

/// Describes how a context unescapes text.
pub trait UnescapeTable {
    /// The error produced by [`decode`](Self::decode).
    type Error;

    /// Returns the index of the first possible escape lead in `bytes`.
    ///
    /// Leads must be ASCII bytes so every returned index is a `char` boundary.
    fn find_lead(&self, bytes: &[u8]) -> Option<usize>;

    /// Decodes the escape sequence at the start of `rest`, which begins with a
    /// lead found by [`find_lead`](Self::find_lead). `position` is the byte
    /// position of that lead in the whole input, for error reporting.
    ///
    /// Returns `Ok(None)` when the lead does not start a sequence this context
    /// recognises, in which case the lead is kept as literal text.
    fn decode(&self, rest: &str, position: usize) -> Result<Option<Unescaped>, Self::Error>;
}

impl<T: EscapeTable + ?Sized> EscapeTable for &T {
    type Error = T::Error;

    #[inline]
    fn is_allowed(&self, c: char) -> bool {
        (**self).is_allowed(c)
    }

    #[inline]
    fn letters_always_allowed(&self) -> bool {
        (**self).letters_always_allowed()
    }

    #[inline]
    fn encode(&self, c: char) -> Result<EscapeToken, Self::Error> {
        (**self).encode(c)
    }
}

impl<T: UnescapeTable + ?Sized> UnescapeTable for &T {
    type Error = T::Error;

    #[inline]
    fn find_lead(&self, bytes: &[u8]) -> Option<usize> {
        (**self).find_lead(bytes)
    }

    #[inline]
    fn decode(&self, rest: &str, position: usize) -> Result<Option<Unescaped>, Self::Error> {
        (**self).decode(rest, position)
    }
}

//==============================================================================
// Escape tokens
//==============================================================================

/// The rendered form of one escaped character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EscapeToken {
    /// A fixed replacement, written verbatim (e.g. `\t`).
    Alias(&'static str),
    /// A named character reference, written as `&name;`.
    NamedReference(&'static str),
    /// A decimal character reference, written as `&#N;`.
    DecimalReference(u32),
    /// A hexadecimal character reference, written as `&#xh;` (lower case).
    HexadecimalReference(u32),
    /// A `\uXXXX` escape of one UTF-16 unit (upper case).
    Unicode(u16),
    /// Two `\uXXXX` escapes of a surrogate pair.
    UnicodePair(u16, u16),
    /// `%XX` triplets for each byte of an encoded character (upper case).
    Percent(EncodedBytes),
}

/// The bytes of a single character in some text encoding.
///
/// UTF-8 never needs more than four bytes, so the common case stays inline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBytes(Repr);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Repr {
    Inline([u8; 4], u8),
    Heap(Vec<u8>),
}

impl EncodedBytes {
    /// The UTF-8 encoding of `c`.
    pub fn utf8(c: char) -> Self {
        let mut buf = [0u8; 4];
        let len = c.encode_utf8(&mut buf).len() as u8;
        Self(Repr::Inline(buf, len))
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Repr::Inline(buf, len) => &buf[..*len as usize],
            Repr::Heap(bytes) => bytes,
        }
    }
}

impl From<Vec<u8>> for EncodedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Repr::Heap(bytes))
    }
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";
const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

impl EscapeToken {
    /// Writes this token into `out`.
    pub(crate) fn write_to<O: Output + ?Sized>(&self, out: &mut O) -> Result<(), O::Error> {
        match self {
            EscapeToken::Alias(s) => out.push_str(s),
            EscapeToken::NamedReference(name) => {
                out.push('&')?;
                out.push_str(name)?;
                out.push(';')
            }
            EscapeToken::DecimalReference(n) => {
                out.push_str("&#")?;
                push_decimal(out, *n)?;
                out.push(';')
            }
            EscapeToken::HexadecimalReference(n) => {
                out.push_str("&#x")?;
                push_hex(out, *n, HEX_LOWER, 1)?;
                out.push(';')
            }
            EscapeToken::Unicode(unit) => push_unicode(out, *unit),
            EscapeToken::UnicodePair(high, low) => {
                push_unicode(out, *high)?;
                push_unicode(out, *low)
            }
            EscapeToken::Percent(bytes) => {
                for &b in bytes.as_bytes() {
                    out.push('%')?;
                    push_hex(out, b as u32, HEX_UPPER, 2)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for EscapeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(&mut Sink(f))
    }
}

fn push_unicode<O: Output + ?Sized>(out: &mut O, unit: u16) -> Result<(), O::Error> {
    out.push_str("\\u")?;
    push_hex(out, unit as u32, HEX_UPPER, 4)
}

fn push_decimal<O: Output + ?Sized>(out: &mut O, mut n: u32) -> Result<(), O::Error> {
    let mut digits = [0u8; 10];
    let mut start = digits.len();
    loop {
        start -= 1;
        digits[start] = (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    for &d in &digits[start..] {
        out.push((b'0' + d) as char)?;
    }
    Ok(())
}

/// Writes `n` in hex, zero-padded to at least `width` digits.
fn push_hex<O: Output + ?Sized>(
    out: &mut O,
    n: u32,
    alphabet: &[u8; 16],
    width: usize,
) -> Result<(), O::Error> {
    let significant = (32 - n.leading_zeros() as usize).div_ceil(4);
    for i in (0..significant.max(width)).rev() {
        out.push(alphabet[((n >> (i * 4)) & 0xF) as usize] as char)?;
    }
    Ok(())
}

//==============================================================================
// Output
//==============================================================================

/// Where assembled text goes: a growable `String` or a caller's sink.
pub(crate) trait Output {
    type Error;

    fn push_str(&mut self, s: &str) -> Result<(), Self::Error>;

    fn push(&mut self, c: char) -> Result<(), Self::Error>;
}

impl Output for String {
    type Error = Infallible;

    #[inline]
    fn push_str(&mut self, s: &str) -> Result<(), Infallible> {
        String::push_str(self, s);
        Ok(())
    }

    #[inline]
    fn push(&mut self, c: char) -> Result<(), Infallible> {
        String::push(self, c);
        Ok(())
    }
}

/// Adapts any [`fmt::Write`] to [`Output`].
pub(crate) struct Sink<'w, W: ?Sized>(pub(crate) &'w mut W);

impl<W: fmt::Write + ?Sized> Output for Sink<'_, W> {
    type Error = fmt::Error;

    #[inline]
    fn push_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s)
    }

    #[inline]
    fn push(&mut self, c: char) -> fmt::Result {
        self.0.write_char(c)
    }
}

/// A failure while piping tokens from a table into an output.
pub(crate) enum PipeError<T, O> {
    Table(T),
    Output(O),
}

impl<T: Into<Error>> From<PipeError<T, fmt::Error>> for Error {
    fn from(err: PipeError<T, fmt::Error>) -> Self {
        match err {
            PipeError::Table(err) => err.into(),
            PipeError::Output(err) => Error::Write(err),
        }
    }
}

/// Unwraps the result of a context that cannot fail.
#[inline]
pub(crate) fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Unwraps a pipeline that wrote into a `String`, which never fails.
fn into_table_error<T>(result: Result<(), PipeError<T, Infallible>>) -> Result<(), T> {
    match result {
        Ok(()) => Ok(()),
        Err(PipeError::Table(err)) => Err(err),
        Err(PipeError::Output(never)) => match never {},
    }
}

//==============================================================================
// Escaping
//==============================================================================

/// A token representing a piece of escaped text.
///
/// This enum is the item yielded by the [`EscapeTokens`] iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapedToken<'a> {
    /// A slice of the original input that did not require escaping.
    Literal(&'a str),
    /// A character the table did not allow through.
    Escaped(char),
}

/// An iterator over a string that yields [`EscapedToken`]s.
///
/// This is a low-level API for producing an escaped representation of a string
/// slice without allocation. Literal runs are borrowed from the input.
///
/// ```
/// use text_escape::html::{HtmlEscape, HtmlEscapeLevel, HtmlEscapeType};
/// use text_escape::token::{EscapeTokens, EscapedToken};
///
/// let table = HtmlEscape::new(
///     HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
///     HtmlEscapeLevel::OnlyMarkupSignificant,
/// );
/// let tokens: Vec<_> = EscapeTokens::new("a<b", table).collect();
/// assert_eq!(
///     tokens,
///     [EscapedToken::Literal("a"), EscapedToken::Escaped('<'), EscapedToken::Literal("b")]
/// );
/// ```
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct EscapeTokens<'a, T> {
    text: &'a str,
    table: T,
}

impl<'a, T: EscapeTable> EscapeTokens<'a, T> {
    /// Creates a new tokenizing escaper for the given string slice.
    #[inline]
    pub const fn new(text: &'a str, table: T) -> Self {
        Self { text, table }
    }

    /// Returns the part of the input not yet consumed.
    #[inline]
    pub const fn remnant(&self) -> &'a str {
        self.text
    }

    /// Returns the table driving this iterator.
    #[inline]
    pub fn table(&self) -> &T {
        &self.table
    }

    #[inline(always)]
    fn passes(&self, c: char) -> bool {
        (c.is_ascii_alphabetic() && self.table.letters_always_allowed()) || self.table.is_allowed(c)
    }

    /// Byte index of the first character in the remnant that must be escaped.
    #[inline]
    fn find_escape(&self) -> Option<usize> {
        self.text
            .char_indices()
            .find_map(|(i, c)| (!self.passes(c)).then_some(i))
    }

    /// Collects the escaped text, borrowing the input when nothing changes.
    pub fn into_cow(self) -> Result<Cow<'a, str>, T::Error> {
        let text = self.text;
        let Some(first) = self.find_escape() else {
            return Ok(Cow::Borrowed(text));
        };

        trace!("escape: allocating output at byte {first} of {}", text.len());
        let mut out = String::with_capacity(text.len() + EXTRA_CAPACITY);
        into_table_error(self.pipe(&mut out))?;
        Ok(Cow::Owned(out))
    }

    /// Writes the escaped text into `sink`.
    pub fn write_to<W>(self, sink: &mut W) -> Result<(), Error>
    where
        W: fmt::Write + ?Sized,
        T::Error: Into<Error>,
    {
        Ok(self.pipe(&mut Sink(sink))?)
    }

    pub(crate) fn pipe<O: Output + ?Sized>(
        mut self,
        out: &mut O,
    ) -> Result<(), PipeError<T::Error, O::Error>> {
        while let Some(token) = self.next() {
            match token {
                EscapedToken::Literal(s) => out.push_str(s).map_err(PipeError::Output)?,
                EscapedToken::Escaped(c) => self
                    .table
                    .encode(c)
                    .map_err(PipeError::Table)?
                    .write_to(out)
                    .map_err(PipeError::Output)?,
            }
        }
        Ok(())
    }
}

impl<'a, T: EscapeTable> Iterator for EscapeTokens<'a, T> {
    type Item = EscapedToken<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let first = self.text.chars().next()?;
        if !self.passes(first) {
            self.text = &self.text[first.len_utf8()..];
            return Some(EscapedToken::Escaped(first));
        }

        let pos = self.find_escape().unwrap_or(self.text.len());
        let (literal, rest) = self.text.split_at(pos);
        self.text = rest;
        Some(EscapedToken::Literal(literal))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.text.is_empty() {
            (0, Some(0))
        } else {
            (1, Some(self.text.len()))
        }
    }
}

impl<T: EscapeTable> FusedIterator for EscapeTokens<'_, T> {}

impl<T: EscapeTable<Error = Infallible> + Clone> fmt::Display for EscapeTokens<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clone().pipe(&mut Sink(f)) {
            Ok(()) => Ok(()),
            Err(PipeError::Output(err)) => Err(err),
            Err(PipeError::Table(never)) => match never {},
        }
    }
}

//==============================================================================
// Unescaping
//==============================================================================

/// The value an escape sequence stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A single character.
    Char(char),
    /// Several characters, as produced by a run of percent-encoded bytes.
    Text(String),
}

/// A decoded escape sequence and how many input bytes it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unescaped {
    /// What the sequence decodes to.
    pub value: Decoded,
    /// The length in bytes of the sequence, lead included.
    pub len: usize,
}

impl Unescaped {
    /// A sequence of `len` bytes standing for `c`.
    #[inline]
    pub const fn char(c: char, len: usize) -> Self {
        Self {
            value: Decoded::Char(c),
            len,
        }
    }
}

/// A token representing a piece of unescaped text.
///
/// This enum is the item yielded by the [`UnescapeTokens`] iterator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapedToken<'a> {
    /// A slice of the original input that contained no escape sequence.
    Literal(&'a str),
    /// The value of one escape sequence.
    Unescaped(Decoded),
}

impl<'a> UnescapedToken<'a> {
    fn write_to<O: Output + ?Sized>(&self, out: &mut O) -> Result<(), O::Error> {
        match self {
            UnescapedToken::Literal(s) => out.push_str(s),
            UnescapedToken::Unescaped(Decoded::Char(c)) => out.push(*c),
            UnescapedToken::Unescaped(Decoded::Text(s)) => out.push_str(s),
        }
    }
}

/// An iterator over a string that yields [`UnescapedToken`]s.
///
/// ```
/// use text_escape::html::HtmlUnescape;
/// use text_escape::token::{Decoded, UnescapeTokens, UnescapedToken};
///
/// let mut tokens = UnescapeTokens::new("1 &lt; 2", HtmlUnescape);
/// assert_eq!(tokens.next(), Some(Ok(UnescapedToken::Literal("1 "))));
/// assert_eq!(tokens.next(), Some(Ok(UnescapedToken::Unescaped(Decoded::Char('<')))));
/// assert_eq!(tokens.next(), Some(Ok(UnescapedToken::Literal(" 2"))));
/// assert_eq!(tokens.next(), None);
/// ```
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct UnescapeTokens<'a, T> {
    text: &'a str,
    /// Byte position of `text` within the caller's input.
    position: usize,
    table: T,
    pending: Option<Decoded>,
}

impl<'a, T: UnescapeTable> UnescapeTokens<'a, T> {
    /// Creates a new tokenizing unescaper for the given string slice.
    #[inline]
    pub const fn new(text: &'a str, table: T) -> Self {
        Self::at_position(text, table, 0)
    }

    /// Like [`new`](Self::new), but error positions are reported relative to
    /// an enclosing input in which `text` starts at `position`.
    #[inline]
    pub(crate) const fn at_position(text: &'a str, table: T, position: usize) -> Self {
        Self {
            text,
            position,
            table,
            pending: None,
        }
    }

    /// Returns the part of the input not yet consumed.
    #[inline]
    pub const fn remnant(&self) -> &'a str {
        self.text
    }

    #[inline]
    fn take_literal(&mut self, len: usize) -> UnescapedToken<'a> {
        let (literal, rest) = self.text.split_at(len);
        self.text = rest;
        self.position += len;
        UnescapedToken::Literal(literal)
    }

    /// Collects the unescaped text, borrowing the input when nothing changes.
    pub fn into_cow(mut self) -> Result<Cow<'a, str>, T::Error> {
        let text = self.text;
        let first = match self.next() {
            None => return Ok(Cow::Borrowed(text)),
            Some(Err(err)) => return Err(err),
            Some(Ok(UnescapedToken::Literal(_))) if self.text.is_empty() && self.pending.is_none() => {
                return Ok(Cow::Borrowed(text));
            }
            Some(Ok(first)) => first,
        };

        trace!("unescape: allocating output for {} bytes", text.len());
        let mut out = String::with_capacity(text.len() + EXTRA_CAPACITY);
        into_ok(first.write_to(&mut out));
        into_table_error(self.pipe(&mut out))?;
        Ok(Cow::Owned(out))
    }

    /// Writes the unescaped text into `sink`.
    pub fn write_to<W>(self, sink: &mut W) -> Result<(), Error>
    where
        W: fmt::Write + ?Sized,
        T::Error: Into<Error>,
    {
        Ok(self.pipe(&mut Sink(sink))?)
    }

    pub(crate) fn pipe<O: Output + ?Sized>(
        self,
        out: &mut O,
    ) -> Result<(), PipeError<T::Error, O::Error>> {
        for token in self {
            token
                .map_err(PipeError::Table)?
                .write_to(out)
                .map_err(PipeError::Output)?;
        }
        Ok(())
    }
}

impl<'a, T: UnescapeTable> Iterator for UnescapeTokens<'a, T> {
    type Item = Result<UnescapedToken<'a>, T::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.pending.take() {
            return Some(Ok(UnescapedToken::Unescaped(value)));
        }
        if self.text.is_empty() {
            return None;
        }

        // Leads the table declines are skipped over and stay in the literal.
        let mut search = 0;
        loop {
            let Some(found) = self.table.find_lead(&self.text.as_bytes()[search..]) else {
                return Some(Ok(self.take_literal(self.text.len())));
            };
            let lead = search + found;

            match self.table.decode(&self.text[lead..], self.position + lead) {
                Ok(None) => search = lead + 1,
                Ok(Some(Unescaped { value, len })) => {
                    if lead == 0 {
                        self.text = &self.text[len..];
                        self.position += len;
                        return Some(Ok(UnescapedToken::Unescaped(value)));
                    }
                    let literal = self.take_literal(lead);
                    self.text = &self.text[len..];
                    self.position += len;
                    self.pending = Some(value);
                    return Some(Ok(literal));
                }
                // Literal text before a bad sequence goes out first; the
                // sequence is decoded again, and fails, on the next call.
                Err(_) if lead > 0 => return Some(Ok(self.take_literal(lead))),
                Err(err) => {
                    self.text = "";
                    return Some(Err(err));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = self.pending.is_some() as usize;
        if self.text.is_empty() {
            (pending, Some(pending))
        } else {
            (pending + 1, Some(pending + self.text.len()))
        }
    }
}

impl<T: UnescapeTable> FusedIterator for UnescapeTokens<'_, T> {}

impl<'a> Extend<UnescapedToken<'a>> for String {
    #[inline]
    fn extend<I: IntoIterator<Item = UnescapedToken<'a>>>(&mut self, iter: I) {
        iter.into_iter()
            .for_each(move |token| into_ok(token.write_to(&mut *self)));
    }
}

impl<'a> FromIterator<UnescapedToken<'a>> for String {
    #[inline]
    fn from_iter<I: IntoIterator<Item = UnescapedToken<'a>>>(iter: I) -> String {
        let mut s = String::new();
        s.extend(iter);
        s
    }
}

//==============================================================================
// Shared decoding helpers
//==============================================================================

// --- Look-Up Table for Hex Decoding ---
const HEX: [Option<u8>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = match i as u8 {
            b'0'..=b'9' => Some(i as u8 - b'0'),
            b'a'..=b'f' => Some(i as u8 - b'a' + 10),
            b'A'..=b'F' => Some(i as u8 - b'A' + 10),
            _ => None,
        };
        i += 1;
    }
    table
};

/// The value of a single hex digit.
#[inline(always)]
pub(crate) fn hex_value(b: u8) -> Option<u8> {
    HEX[b as usize]
}

/// Parses exactly `N` hex digits from the start of `text`.
///
/// `position` and `base_offset` locate the digits for error reporting: the
/// lead is at `position`, and the first digit is `base_offset` bytes after it.
#[inline(always)]
pub(crate) fn parse_hex<const N: usize>(
    text: &str,
    position: usize,
    base_offset: u8,
) -> Result<u32, UnescapeError> {
    let bytes = text.as_bytes();
    if let Some(chunk) = bytes.get(..N) {
        let mut value = 0u32;
        let mut valid = true;
        for &b in chunk {
            match HEX[b as usize] {
                Some(v) => value = value << 4 | v as u32,
                None => valid = false,
            }
        }
        if valid {
            return Ok(value);
        }
    }

    #[cold]
    fn handle_error(text: &str, limit: usize, position: usize, base_offset: u8) -> UnescapeError {
        for (i, c) in text.char_indices().take_while(|&(i, _)| i < limit) {
            if !c.is_ascii_hexdigit() {
                return UnescapeError::new(
                    UnescapeErrorKind::InvalidHex(InvalidHexError { found: c }),
                    position,
                    base_offset + i as u8,
                );
            }
        }

        // Every digit present was valid, there just were not enough of them.
        UnescapeError::new(
            UnescapeErrorKind::UnexpectedEof,
            position,
            base_offset + text.len().min(limit) as u8,
        )
    }

    Err(handle_error(text, N, position, base_offset))
}

/// Combines a UTF-16 surrogate pair into the character it encodes.
#[inline]
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    if !(0xD800..=0xDBFF).contains(&high) || !(0xDC00..=0xDFFF).contains(&low) {
        return None;
    }
    let code = 0x10000 + (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Escapes `*` and `[`, lets everything else through.
    #[derive(Clone, Copy)]
    struct Stars;

    impl EscapeTable for Stars {
        type Error = Infallible;

        fn is_allowed(&self, c: char) -> bool {
            c != '*' && c != '['
        }

        fn encode(&self, c: char) -> Result<EscapeToken, Infallible> {
            Ok(match c {
                '*' => EscapeToken::Alias("[s]"),
                _ => EscapeToken::Alias("[b]"),
            })
        }
    }

    /// Decodes `[s]` and `[b]`, skips `[` followed by anything else, and
    /// rejects `[!`.
    struct Brackets;

    impl UnescapeTable for Brackets {
        type Error = UnescapeError;

        fn find_lead(&self, bytes: &[u8]) -> Option<usize> {
            memchr::memchr(b'[', bytes)
        }

        fn decode(&self, rest: &str, position: usize) -> Result<Option<Unescaped>, UnescapeError> {
            if rest.starts_with("[s]") {
                Ok(Some(Unescaped::char('*', 3)))
            } else if rest.starts_with("[b]") {
                Ok(Some(Unescaped::char('[', 3)))
            } else if rest.starts_with("[!") {
                Err(UnescapeError::new(UnescapeErrorKind::UnexpectedEof, position, 1))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn test_escape_tokens_split_literals() {
        let tokens: Vec<_> = EscapeTokens::new("a*bc**", Stars).collect();
        assert_eq!(
            tokens,
            [
                EscapedToken::Literal("a"),
                EscapedToken::Escaped('*'),
                EscapedToken::Literal("bc"),
                EscapedToken::Escaped('*'),
                EscapedToken::Escaped('*'),
            ]
        );
    }

    #[test]
    fn test_escape_cow_borrows_when_clean() {
        crate::ensure_env_logger_initialized();
        let input = "nothing to see";
        let out = EscapeTokens::new(input, Stars).into_cow().unwrap();
        match out {
            Cow::Borrowed(s) => assert!(core::ptr::eq(s, input)),
            Cow::Owned(_) => panic!("expected a borrowed result"),
        }
    }

    #[test]
    fn test_escape_cow_owned() {
        crate::ensure_env_logger_initialized();
        let out = EscapeTokens::new("a*[é", Stars).into_cow().unwrap();
        assert_eq!(out, "a[s][b]é");
    }

    #[test]
    fn test_escape_display_and_sink() {
        let tokens = EscapeTokens::new("**", Stars);
        assert_eq!(tokens.to_string(), "[s][s]");

        let mut sink = String::from(">");
        tokens.write_to(&mut sink).unwrap();
        assert_eq!(sink, ">[s][s]");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(EscapeTokens::new("", Stars).next(), None);
        assert_eq!(UnescapeTokens::new("", Brackets).next(), None);
    }

    #[test]
    fn test_unescape_tokens() {
        let mut iter = UnescapeTokens::new("x[s]y[b]", Brackets);
        assert_eq!(iter.next(), Some(Ok(UnescapedToken::Literal("x"))));
        assert_eq!(iter.next(), Some(Ok(UnescapedToken::Unescaped(Decoded::Char('*')))));
        assert_eq!(iter.next(), Some(Ok(UnescapedToken::Literal("y"))));
        assert_eq!(iter.next(), Some(Ok(UnescapedToken::Unescaped(Decoded::Char('[')))));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_unescape_declined_lead_stays_literal() {
        let input = "a[x]b[";
        let mut iter = UnescapeTokens::new(input, Brackets);
        assert_eq!(iter.next(), Some(Ok(UnescapedToken::Literal(input))));
        assert_eq!(iter.next(), None);

        match UnescapeTokens::new(input, Brackets).into_cow().unwrap() {
            Cow::Borrowed(s) => assert!(core::ptr::eq(s, input)),
            Cow::Owned(_) => panic!("expected a borrowed result"),
        }
    }

    #[test]
    fn test_unescape_error_after_literal() {
        let mut iter = UnescapeTokens::new("ab[!", Brackets);
        assert_eq!(iter.next(), Some(Ok(UnescapedToken::Literal("ab"))));
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(err.position(), 2);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_unescape_cow() {
        crate::ensure_env_logger_initialized();
        assert_eq!(UnescapeTokens::new("[s][s]!", Brackets).into_cow().unwrap(), "**!");
        assert!(UnescapeTokens::new("[s][!", Brackets).into_cow().is_err());
    }

    #[test]
    fn test_unescape_collect_into_string() {
        let s: String = UnescapeTokens::new("1[s]2", Brackets)
            .map(Result::unwrap)
            .collect();
        assert_eq!(s, "1*2");
    }

    #[test]
    fn test_token_rendering() {
        assert_eq!(EscapeToken::NamedReference("amp").to_string(), "&amp;");
        assert_eq!(EscapeToken::DecimalReference(0).to_string(), "&#0;");
        assert_eq!(EscapeToken::DecimalReference(128512).to_string(), "&#128512;");
        assert_eq!(EscapeToken::HexadecimalReference(0x27).to_string(), "&#x27;");
        assert_eq!(EscapeToken::HexadecimalReference(0x1F600).to_string(), "&#x1f600;");
        assert_eq!(EscapeToken::Unicode(0x9).to_string(), "\\u0009");
        assert_eq!(
            EscapeToken::UnicodePair(0xD83D, 0xDE00).to_string(),
            "\\uD83D\\uDE00"
        );
        assert_eq!(EscapeToken::Percent(EncodedBytes::utf8('é')).to_string(), "%C3%A9");
        assert_eq!(EscapeToken::Percent(EncodedBytes::from(vec![0x0A])).to_string(), "%0A");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex::<4>("00e9", 0, 2), Ok(0xE9));
        assert_eq!(parse_hex::<2>("fFz", 0, 1), Ok(0xFF));

        let err = parse_hex::<4>("12x4", 7, 2).unwrap_err();
        assert_eq!(err.kind(), UnescapeErrorKind::InvalidHex(InvalidHexError { found: 'x' }));
        assert_eq!((err.position(), err.offset()), (7, 4));

        let err = parse_hex::<4>("12", 0, 2).unwrap_err();
        assert_eq!(err.kind(), UnescapeErrorKind::UnexpectedEof);
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_combine_surrogates() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), Some('😀'));
        assert_eq!(combine_surrogates(0xDE00, 0xD83D), None);
    }
}
