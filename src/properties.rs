//! Java `.properties` escaping and unescaping.
//!
//! Keys and values are escaped slightly differently: in a key, a space, `:` or
//! `=` would end the key, so they get a single escape character (SEC) of their
//! own. Everything else that must be escaped is written as `\uXXXX`, and
//! characters outside the Basic Multilingual Plane as a pair of them.
//!
//! Unescaping is strict: a backslash must introduce a known sequence.
//!
//! ```
//! use text_escape::{escape_properties_key, escape_properties_value, unescape_properties};
//!
//! assert_eq!(escape_properties_key("user name"), r"user\ name");
//! assert_eq!(escape_properties_value("tab\there"), r"tab\there");
//! assert_eq!(unescape_properties(r"caf\u00E9").unwrap(), "café");
//! assert!(unescape_properties(r"oops\q").is_err());
//! ```

use core::{convert::Infallible, fmt};
use std::borrow::Cow;

use memchr::memchr;

use crate::{
    Error, InvalidArgumentError, InvalidEscapeError, LoneSurrogateError, UnescapeError,
    UnescapeErrorKind, stream,
    token::{
        EscapeTable, EscapeToken, EscapeTokens, UnescapeTable, UnescapeTokens, Unescaped,
        combine_surrogates, into_ok, parse_hex,
    },
};

/// Whether the text is a key or a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PropertiesRole {
    /// The part before the separator.
    Key,
    /// The part after the separator.
    #[default]
    Value,
}

/// How aggressively `.properties` text is escaped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum PropertiesEscapeLevel {
    /// Level 1: the single escape characters and control characters.
    BasicEscapeSet = 1,
    /// Level 2: level 1 plus every non-ASCII character.
    #[default]
    AllNonAsciiPlusBasicEscapeSet = 2,
    /// Level 3: level 2 plus every ASCII character that is not alphanumeric.
    AllNonAlphanumeric = 3,
    /// Level 4: every character.
    AllCharacters = 4,
}

impl TryFrom<u8> for PropertiesEscapeLevel {
    type Error = InvalidArgumentError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Ok(match level {
            1 => Self::BasicEscapeSet,
            2 => Self::AllNonAsciiPlusBasicEscapeSet,
            3 => Self::AllNonAlphanumeric,
            4 => Self::AllCharacters,
            _ => return Err(InvalidArgumentError::InvalidLevel { level }),
        })
    }
}

impl From<PropertiesEscapeLevel> for u8 {
    fn from(level: PropertiesEscapeLevel) -> Self {
        level as u8
    }
}

//==============================================================================
// Escaping
//==============================================================================

const fn ascii_levels(key: bool) -> [u8; 128] {
    let mut table = [3u8; 128];
    let mut i = 0;
    while i < 128 {
        let b = i as u8;
        if b.is_ascii_alphanumeric() {
            table[i] = 4;
        } else if b < 0x20 || b == 0x7F {
            table[i] = 1;
        }
        i += 1;
    }
    table[b'\\' as usize] = 1;
    if key {
        table[b' ' as usize] = 1;
        table[b':' as usize] = 1;
        table[b'=' as usize] = 1;
    }
    table
}

static VALUE_LEVELS: [u8; 128] = ascii_levels(false);
static KEY_LEVELS: [u8; 128] = ascii_levels(true);

/// A `.properties` escaping configuration. Implements [`EscapeTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertiesEscape {
    /// Key or value.
    pub role: PropertiesRole,
    /// Which characters are escaped.
    pub level: PropertiesEscapeLevel,
}

impl PropertiesEscape {
    /// Creates a configuration.
    pub const fn new(role: PropertiesRole, level: PropertiesEscapeLevel) -> Self {
        Self { role, level }
    }

    /// Escapes `text`, borrowing it when nothing needs escaping.
    pub fn escape(self, text: &str) -> Cow<'_, str> {
        into_ok(EscapeTokens::new(text, self).into_cow())
    }

    /// Escapes the window `text[offset..offset + len]` into `sink`.
    pub fn escape_to<W: fmt::Write + ?Sized>(
        self,
        text: Option<&str>,
        offset: usize,
        len: usize,
        sink: Option<&mut W>,
    ) -> Result<(), Error> {
        stream::escape_to(text, offset, len, sink, self)
    }

    fn single_escape(&self, c: char) -> Option<&'static str> {
        let key = self.role == PropertiesRole::Key;
        Some(match c {
            '\t' => r"\t",
            '\n' => r"\n",
            '\u{C}' => r"\f",
            '\r' => r"\r",
            '\\' => r"\\",
            ' ' if key => r"\ ",
            ':' if key => r"\:",
            '=' if key => r"\=",
            _ => return None,
        })
    }
}

impl EscapeTable for PropertiesEscape {
    type Error = Infallible;

    #[inline]
    fn is_allowed(&self, c: char) -> bool {
        let threshold = match c {
            '\0'..='\u{7F}' => match self.role {
                PropertiesRole::Key => KEY_LEVELS[c as usize],
                PropertiesRole::Value => VALUE_LEVELS[c as usize],
            },
            '\u{80}'..='\u{9F}' => 1,
            _ => 2,
        };
        (self.level as u8) < threshold
    }

    #[inline]
    fn letters_always_allowed(&self) -> bool {
        self.level != PropertiesEscapeLevel::AllCharacters
    }

    fn encode(&self, c: char) -> Result<EscapeToken, Infallible> {
        if let Some(alias) = self.single_escape(c) {
            return Ok(EscapeToken::Alias(alias));
        }
        let mut buf = [0u16; 2];
        let units = c.encode_utf16(&mut buf);
        Ok(if units.len() == 1 {
            EscapeToken::Unicode(units[0])
        } else {
            EscapeToken::UnicodePair(units[0], units[1])
        })
    }
}

/// Escapes a value at level 2 (basic set plus non-ASCII).
pub fn escape_properties_value(text: &str) -> Cow<'_, str> {
    escape_properties(text, PropertiesRole::Value, PropertiesEscapeLevel::AllNonAsciiPlusBasicEscapeSet)
}

/// Escapes a value at level 1 (basic set only).
pub fn escape_properties_value_minimal(text: &str) -> Cow<'_, str> {
    escape_properties(text, PropertiesRole::Value, PropertiesEscapeLevel::BasicEscapeSet)
}

/// Escapes a key at level 2 (basic set plus non-ASCII).
pub fn escape_properties_key(text: &str) -> Cow<'_, str> {
    escape_properties(text, PropertiesRole::Key, PropertiesEscapeLevel::AllNonAsciiPlusBasicEscapeSet)
}

/// Escapes a key at level 1 (basic set only).
pub fn escape_properties_key_minimal(text: &str) -> Cow<'_, str> {
    escape_properties(text, PropertiesRole::Key, PropertiesEscapeLevel::BasicEscapeSet)
}

/// Escapes `text` with an explicit role and level.
pub fn escape_properties(
    text: &str,
    role: PropertiesRole,
    level: PropertiesEscapeLevel,
) -> Cow<'_, str> {
    PropertiesEscape::new(role, level).escape(text)
}

/// Window-and-sink form of [`escape_properties`].
pub fn escape_properties_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
    role: PropertiesRole,
    level: PropertiesEscapeLevel,
) -> Result<(), Error> {
    PropertiesEscape::new(role, level).escape_to(text, offset, len, sink)
}

//==============================================================================
// Unescaping
//==============================================================================

/// Strict backslash-escape decoding. Implements [`UnescapeTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertiesUnescape;

impl UnescapeTable for PropertiesUnescape {
    type Error = UnescapeError;

    #[inline]
    fn find_lead(&self, bytes: &[u8]) -> Option<usize> {
        memchr(b'\\', bytes)
    }

    fn decode(&self, rest: &str, position: usize) -> Result<Option<Unescaped>, UnescapeError> {
        let Some(next) = rest[1..].chars().next() else {
            return Err(UnescapeError::new(UnescapeErrorKind::UnexpectedEof, position, 1));
        };
        let c = match next {
            't' => '\t',
            'n' => '\n',
            'f' => '\u{C}',
            'r' => '\r',
            '\\' | ' ' | ':' | '=' | '#' | '!' => next,
            'u' => return decode_unicode(rest, position).map(Some),
            found => {
                return Err(UnescapeError::new(
                    UnescapeErrorKind::InvalidEscape(InvalidEscapeError { found }),
                    position,
                    1,
                ));
            }
        };
        Ok(Some(Unescaped::char(c, 2)))
    }
}

/// Decodes `\uXXXX`, joining it with a following `\uXXXX` when the two form a
/// surrogate pair.
fn decode_unicode(rest: &str, position: usize) -> Result<Unescaped, UnescapeError> {
    let first = parse_hex::<4>(&rest[2..], position, 2)? as u16;

    let lone = || {
        UnescapeError::new(
            UnescapeErrorKind::LoneSurrogate(LoneSurrogateError { surrogate: first }),
            position,
            6,
        )
    };

    if (0xD800..=0xDBFF).contains(&first) {
        let tail = &rest[6..];
        if !tail.starts_with(r"\u") {
            return Err(lone());
        }
        let low = parse_hex::<4>(&tail[2..], position, 8)? as u16;
        return combine_surrogates(first, low)
            .map(|c| Unescaped::char(c, 12))
            .ok_or_else(lone);
    }

    char::from_u32(first as u32)
        .map(|c| Unescaped::char(c, 6))
        .ok_or_else(lone)
}

/// Resolves every escape sequence in `text`.
pub fn unescape_properties(text: &str) -> Result<Cow<'_, str>, Error> {
    Ok(UnescapeTokens::new(text, PropertiesUnescape).into_cow()?)
}

/// Window-and-sink form of [`unescape_properties`].
pub fn unescape_properties_to<W: fmt::Write + ?Sized>(
    text: Option<&str>,
    offset: usize,
    len: usize,
    sink: Option<&mut W>,
) -> Result<(), Error> {
    stream::unescape_to(text, offset, len, sink, PropertiesUnescape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvalidHexError;
    use pretty_assertions::assert_eq;

    const LEVELS: [PropertiesEscapeLevel; 4] = [
        PropertiesEscapeLevel::BasicEscapeSet,
        PropertiesEscapeLevel::AllNonAsciiPlusBasicEscapeSet,
        PropertiesEscapeLevel::AllNonAlphanumeric,
        PropertiesEscapeLevel::AllCharacters,
    ];

    fn unescape_err(input: &str) -> UnescapeError {
        match unescape_properties(input) {
            Err(Error::Unescape(err)) => err,
            other => panic!("expected an unescape error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_single_escape_characters() {
        assert_eq!(escape_properties_value("\t"), r"\t");
        assert_eq!(escape_properties_value("a\nb\r\u{C}\\"), r"a\nb\r\f\\");
        assert_eq!(escape_properties_value("a b:c=d"), "a b:c=d");
        assert_eq!(escape_properties_key("a b:c=d"), r"a\ b\:c\=d");
    }

    #[test]
    fn test_controls_and_non_ascii() {
        assert_eq!(escape_properties_value("á"), r"\u00E1");
        assert_eq!(escape_properties_value_minimal("á"), "á");
        assert_eq!(escape_properties_value_minimal("\u{0}\u{7F}\u{85}"), r"\u0000\u007F\u0085");
        assert_eq!(escape_properties_key_minimal("\u{1B}"), r"\u001B");
        assert_eq!(escape_properties_value("😀"), r"\uD83D\uDE00");
    }

    #[test]
    fn test_high_levels() {
        assert_eq!(
            escape_properties(
                "a-b",
                PropertiesRole::Value,
                PropertiesEscapeLevel::AllNonAlphanumeric
            ),
            r"a\u002Db"
        );
        assert_eq!(
            escape_properties("ab\t", PropertiesRole::Value, PropertiesEscapeLevel::AllCharacters),
            r"\u0061\u0062\t"
        );
    }

    #[test]
    fn test_escape_identity() {
        let input = "plain value";
        match escape_properties_value(input) {
            Cow::Borrowed(s) => assert!(core::ptr::eq(s, input)),
            Cow::Owned(_) => panic!("expected a borrowed result"),
        }
    }

    #[test]
    fn test_level_monotonicity() {
        let sample = "aZ09 :=#!\\\t\n\u{0}\u{7F}\u{85}é😀";
        for role in [PropertiesRole::Key, PropertiesRole::Value] {
            for window in LEVELS.windows(2) {
                let lower = PropertiesEscape::new(role, window[0]);
                let higher = PropertiesEscape::new(role, window[1]);
                for c in sample.chars() {
                    if !lower.is_allowed(c) {
                        assert!(!higher.is_allowed(c), "{c:?} escaped at {:?} only", window[0]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_level_from_u8() {
        assert_eq!(PropertiesEscapeLevel::try_from(1), Ok(PropertiesEscapeLevel::BasicEscapeSet));
        assert_eq!(
            PropertiesEscapeLevel::try_from(0),
            Err(InvalidArgumentError::InvalidLevel { level: 0 })
        );
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_properties(r"a\tb\n\f\r\\").unwrap(), "a\tb\n\u{C}\r\\");
        assert_eq!(unescape_properties(r"\ \:\=\#\!").unwrap(), " :=#!");
        assert_eq!(unescape_properties(r"\u00E1\u00e1").unwrap(), "áá");
        assert_eq!(unescape_properties(r"\uD83D\uDE00\u0021").unwrap(), "😀!");

        let input = "no escapes";
        match unescape_properties(input).unwrap() {
            Cow::Borrowed(s) => assert!(core::ptr::eq(s, input)),
            Cow::Owned(_) => panic!("expected a borrowed result"),
        }
    }

    #[test]
    fn test_unescape_errors() {
        let err = unescape_err(r"ab\q");
        assert_eq!(err.kind(), UnescapeErrorKind::InvalidEscape(InvalidEscapeError { found: 'q' }));
        assert_eq!((err.position(), err.offset()), (2, 1));

        let err = unescape_err("trailing\\");
        assert_eq!(err.kind(), UnescapeErrorKind::UnexpectedEof);
        assert_eq!(err.position(), 8);

        let err = unescape_err(r"\u12");
        assert_eq!(err.kind(), UnescapeErrorKind::UnexpectedEof);
        assert_eq!(err.offset(), 4);

        let err = unescape_err(r"\u12G4");
        assert_eq!(err.kind(), UnescapeErrorKind::InvalidHex(InvalidHexError { found: 'G' }));
        assert_eq!(err.offset(), 4);

        let err = unescape_err(r"\uD83Dx");
        assert_eq!(
            err.kind(),
            UnescapeErrorKind::LoneSurrogate(LoneSurrogateError { surrogate: 0xD83D })
        );

        let err = unescape_err(r"\uDE00");
        assert!(matches!(err.kind(), UnescapeErrorKind::LoneSurrogate(_)));

        let err = unescape_err(r"\uD83DA");
        assert!(matches!(err.kind(), UnescapeErrorKind::LoneSurrogate(_)));
    }

    #[test]
    fn test_round_trip() {
        let sample = "key = value:\t\\ #! \u{0}\u{9F} über 😀";
        for role in [PropertiesRole::Key, PropertiesRole::Value] {
            for level in LEVELS {
                let escaped = escape_properties(sample, role, level);
                assert_eq!(unescape_properties(&escaped).unwrap(), sample, "{role:?} at {level:?}");
            }
        }
    }

    #[test]
    fn test_window_forms() {
        let mut sink = String::new();
        escape_properties_to(
            Some("k=v\t"),
            2,
            2,
            Some(&mut sink),
            PropertiesRole::Value,
            PropertiesEscapeLevel::BasicEscapeSet,
        )
        .unwrap();
        unescape_properties_to(Some(r"x\u0021"), 1, 6, Some(&mut sink)).unwrap();
        assert_eq!(sink, r"v\t!");
    }
}
