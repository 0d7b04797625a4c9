//! HTML markup escaping and unescaping.
//!
//! Escaping is driven by two settings. The [`HtmlEscapeLevel`] decides which
//! characters are escaped at all, and the [`HtmlEscapeType`] decides how each
//! of them is written: as a named reference (`&eacute;`) when one exists, or
//! as a decimal (`&#233;`) or hexadecimal (`&#xe9;`) numeric reference.
//!
//! Unescaping is lenient, the way browsers are: anything that is not a
//! recognisable character reference is kept verbatim.
//!
//! ```
//! use text_escape::html::{escape_html, unescape_html, HtmlEscapeLevel, HtmlEscapeType};
//!
//! let escaped = escape_html(
//!     "café & crème",
//!     HtmlEscapeType::HexadecimalReferences,
//!     HtmlEscapeLevel::AllNonAsciiPlusMarkupSignificant,
//! );
//! assert_eq!(escaped, "caf&#xe9; &#x26; cr&#xe8;me");
//! assert_eq!(unescape_html(&escaped), "café & crème");
//!
//! // Browsers accept this, and so do we.
//! assert_eq!(unescape_html("AT&T &copy 2024 &bogus;"), "AT&T © 2024 &bogus;");
//! ```

use core::{convert::Infallible, fmt};
use std::borrow::Cow;

use memchr::memchr;

use crate::{
    Error, InvalidArgumentError, stream,
    token::{
        EscapeTable, EscapeToken, EscapeTokens, UnescapeTable, UnescapeTokens, Unescaped,
        combine_surrogates, hex_value, into_ok,
    },
};

mod entities;

//==============================================================================
// Configuration
//==============================================================================

/// How aggressively HTML text is escaped. Every level escapes everything the
/// levels below it do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum HtmlEscapeLevel {
    /// Level 0: `<`, `>`, `&` and `"`.
    OnlyMarkupSignificantExceptApos = 0,
    /// Level 1: level 0 plus `'`.
    OnlyMarkupSignificant = 1,
    /// Level 2: level 1 plus every non-ASCII character.
    #[default]
    AllNonAsciiPlusMarkupSignificant = 2,
    /// Level 3: level 2 plus every ASCII character that is not alphanumeric.
    AllNonAlphanumeric = 3,
    /// Level 4: every character.
    AllCharacters = 4,
}

impl TryFrom<u8> for HtmlEscapeLevel {
    type Error = InvalidArgumentError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Ok(match level {
            0 => Self::OnlyMarkupSignificantExceptApos,
            1 => Self::OnlyMarkupSignificant,
            2 => Self::AllNonAsciiPlusMarkupSignificant,
            3 => Self::AllNonAlphanumeric,
            4 => Self::AllCharacters,
            _ => return Err(InvalidArgumentError::InvalidLevel { level }),
        })
    }
}

impl From<HtmlEscapeLevel> for u8 {
    fn from(level: HtmlEscapeLevel) -> Self {
        level as u8
    }
}

/// How escaped characters are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HtmlEscapeType {
    /// HTML 4.01 names where possible, `&#N;` otherwise.
    Html4NamedReferencesDefaultToDecimal,
    /// HTML 4.01 names where possible, `&#xh;` otherwise.
    Html4NamedReferencesDefaultToHexa,
    /// HTML5 names where possible, `&#N;` otherwise.
    #[default]
    Html5NamedReferencesDefaultToDecimal,
    /// HTML5 names where possible, `&#xh;` otherwise.
    Html5NamedReferencesDefaultToHexa,
    /// Always `&#N;`.
    DecimalReferences,
    /// Always `&#xh;`.
    HexadecimalReferences,
}

impl HtmlEscapeType {
    /// `Some(true)` for HTML5 names, `Some(false)` for HTML 4.01 names.
    const fn names(self) -> Option<bool> {
        match self {
            Self::Html4NamedReferencesDefaultToDecimal | Self::Html4NamedReferencesDefaultToHexa => {
                Some(false)
            }
            Self::Html5NamedReferencesDefaultToDecimal | Self::Html5NamedReferencesDefaultToHexa => {
                Some(true)
            }
            Self::DecimalReferences | Self::HexadecimalReferences => None,
        }
    }

    const fn is_hexadecimal(self) -> bool {
        matches!(
            self,
            Self::Html4NamedReferencesDefaultToHexa
                | Self::Html5NamedReferencesDefaultToHexa
                | Self::HexadecimalReferences
        )
    }
}

//==============================================================================
// Escaping
//==============================================================================

/// Lowest level at which each ASCII character gets escaped.
const ASCII_LEVELS: [u8; 128] = {
    let mut table = [3u8; 128];
    let mut i = 0;
    while i < 128 {
        if (i as u8).is_ascii_alphanumeric() {
            table[i] = 4;
        }
        i += 1;
    }
    table[b'<' as usize] = 0;
    table[b'>' as usize] = 0;
    table[b'&' as usize] = 0;
    table[b'"' as usize] = 0;
    table[b'\'' as usize] = 1;
    table
};

const NON_ASCII_LEVEL: u8 = 2;

/// An HTML escaping configuration. Implements [`EscapeTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HtmlEscape {
    /// How escaped characters are written.
    pub escape_type: HtmlEscapeType,
    /// Which characters are escaped.
    pub level: HtmlEscapeLevel,
}

impl HtmlEscape {
    /// Creates a configuration.
    pub const fn new(escape_type: HtmlEscapeType, level: HtmlEscapeLevel) -> Self {
        Self { escape_type, level }
    }

    /// Escapes `text`, borrowing it when nothing needs escaping.
    pub fn escape(self, text: &str) -> Cow<'_, str> {
        into_ok(EscapeTokens::new(text, self).into_cow())
    }

    /// Escapes the window `text[offset..offset + len]` into `sink`.
    ///
    /// See the [`stream`] module for the argument checks.
    pub fn escape_to<W: fmt::Write + ?Sized>(
        self,
        text: Option<&str>,
        offset: usize,
        len: usize,
        sink: Option<&mut W>,
    ) -> Result<(), Error> {
        stream::escape_to(text, offset, len, sink, self)
    }
}

impl EscapeTable for HtmlEscape {
    type Error = Infallible;

    #[inline]
    fn is_allowed(&self, c: char) -> bool {
        let threshold = if c.is_ascii() {
            ASCII_LEVELS[c as usize]
        } else {
            NON_ASCII_LEVEL
        };
        (self.level as u8) < threshold
    }

    #[inline]
    fn letters_always_allowed(&self) -> bool {
        self.level != HtmlEscapeLevel::AllCharacters
    }

    fn encode(&self, c: char) -> Result<EscapeToken, Infallible> {
        let named = self
            .escape_type
            .names()
            .and_then(|html5| entities::name_for(c, html5));
        Ok(match named {
            Some(name) => EscapeToken::NamedReference(name),
            None if self.escape_type.is_hexadecimal() => EscapeToken::HexadecimalReference(c as u32),
            None => EscapeToken::DecimalReference(c as u32),
        })
    }
}

/// Escapes with HTML5 names at level 2 (markup-significant plus non-ASCII).
pub fn escape_html5(text: &str) -> Cow<'_, str> {
    HtmlEscape::new(
        HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
        HtmlEscapeLevel::AllNonAsciiPlusMarkupSignificant,
    )
    .escape(text)
}

/// Escapes with HTML5 names at level 1 (markup-significant only).
pub fn escape_html5_xml(text: &str) -> Cow<'_, str> {
    HtmlEscape::new(
        HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
        HtmlEscapeLevel::OnlyMarkupSignificant,
    )
    .escape(text)
}

/// Escapes with HTML 4.01 names at level 2 (markup-significant plus non-ASCII).
pub fn escape_html4(text: &str) -> Cow<'_, str> {
    HtmlEscape::new(
        HtmlEscapeType::Html4NamedReferencesDefaultToDecimal,
        HtmlEscapeLevel::AllNonAsciiPlusMarkupSignificant,
    )
    .escape(text)
}

/// Escapes with HTML 4.01 names at level 1 (markup-significant only).
pub fn escape_html4_xml(text: &str) -> Cow<'_, str> {
    HtmlEscape::new(
        HtmlEscapeType::Html4NamedReferencesDefaultToDecimal,
        HtmlEscapeLevel::OnlyMarkupSignificant,
    )
    .escape(text)
}

/// Escapes `text` with an explicit type and level.
pub fn escape_html(text: &str, escape_type: HtmlEscapeType, level: HtmlEscapeLevel) -> Cow<'_, str> {
    HtmlEscape::new(escape_type, level).escape(text)
}

/// Window-and-sink form of [`escape_html`].
pub fn escape_html_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
    escape_type: HtmlEscapeType,
    level: HtmlEscapeLevel,
) -> Result<(), Error> {
    HtmlEscape::new(escape_type, level).escape_to(text, offset, len, sink)
}

//==============================================================================
// Unescaping
//==============================================================================

/// Lenient HTML character reference decoding. Implements [`UnescapeTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HtmlUnescape;

impl UnescapeTable for HtmlUnescape {
    type Error = Infallible;

    #[inline]
    fn find_lead(&self, bytes: &[u8]) -> Option<usize> {
        memchr(b'&', bytes)
    }

    fn decode(&self, rest: &str, _position: usize) -> Result<Option<Unescaped>, Infallible> {
        Ok(match rest.as_bytes().get(1) {
            Some(b'#') => decode_numeric(rest),
            Some(b) if b.is_ascii_alphanumeric() => decode_named(rest),
            _ => None,
        })
    }
}

/// `&name;`, or a legacy `&name` without the semicolon. The longest name
/// wins, so `&notin;` is `∉` while `&notit;` is `¬it;`.
fn decode_named(rest: &str) -> Option<Unescaped> {
    let name_len = rest.as_bytes()[1..]
        .iter()
        .take(entities::MAX_NAME_LEN + 1)
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    let name = &rest[1..1 + name_len];

    if rest.as_bytes().get(1 + name_len) == Some(&b';') {
        if let Some(entity) = entities::lookup(name) {
            return Some(Unescaped::char(entity.value, name_len + 2));
        }
    }

    (1..=name_len).rev().find_map(|len| {
        entities::lookup(&name[..len])
            .filter(|entity| entity.is_legacy())
            .map(|entity| Unescaped::char(entity.value, len + 1))
    })
}

/// Parses `&#N` or `&#xH` plus an optional `;`. Returns the value, capped just
/// above U+10FFFF, and the length consumed.
fn parse_numeric(rest: &str) -> Option<(u32, usize)> {
    const CAP: u32 = 0x11_0000;

    let bytes = rest.as_bytes();
    let (radix, start) = match bytes.get(2) {
        Some(b'x' | b'X') => (16, 3),
        _ => (10, 2),
    };
    let digit = |b: u8| match radix {
        16 => hex_value(b),
        _ => b.is_ascii_digit().then(|| b - b'0'),
    };

    let mut value = 0u32;
    let mut end = start;
    while let Some(d) = bytes.get(end).copied().and_then(digit) {
        value = value.saturating_mul(radix).saturating_add(d as u32).min(CAP);
        end += 1;
    }
    if end == start {
        return None;
    }
    if bytes.get(end) == Some(&b';') {
        end += 1;
    }
    Some((value, end))
}

fn decode_numeric(rest: &str) -> Option<Unescaped> {
    let (value, len) = parse_numeric(rest)?;

    if (0xD800..=0xDBFF).contains(&value) {
        let low = rest
            .get(len..)
            .filter(|next| next.starts_with("&#"))
            .and_then(parse_numeric)
            .filter(|(low, _)| (0xDC00..=0xDFFF).contains(low));
        if let Some((low, low_len)) = low {
            if let Some(c) = combine_surrogates(value as u16, low as u16) {
                return Some(Unescaped::char(c, len + low_len));
            }
        }
    }

    let c = char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER);
    Some(Unescaped::char(c, len))
}

/// Resolves every character reference in `text`. Never fails: anything that
/// is not a reference is kept as is.
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    into_ok(UnescapeTokens::new(text, HtmlUnescape).into_cow())
}

/// Window-and-sink form of [`unescape_html`].
pub fn unescape_html_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
) -> Result<(), Error> {
    stream::unescape_to(text, offset, len, sink, HtmlUnescape)
}
