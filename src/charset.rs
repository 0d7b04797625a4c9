//! Text encodings for percent-encoding.
//!
//! UTF-8 is handled by the standard library. Every other label is resolved
//! through the WHATWG label registry of the [`encoding`] crate, except the
//! ISO-8859-1 and US-ASCII aliases, which WHATWG folds into windows-1252 and
//! which are pinned to the real single-byte tables here.

use core::fmt;

use encoding::{DecoderTrap, EncoderTrap, EncodingRef, all, label::encoding_from_whatwg_label};
use log::debug;

use crate::UnsupportedEncodingError;
use crate::token::EncodedBytes;

#[derive(Clone, Copy)]
pub(crate) enum Charset {
    Utf8,
    Encoding(EncodingRef),
}

impl Charset {
    pub(crate) fn for_label(label: &str) -> Result<Self, UnsupportedEncodingError> {
        let normalized = label.trim().to_ascii_lowercase();
        let charset = match normalized.as_str() {
            "utf-8" | "utf8" | "unicode-1-1-utf-8" => Charset::Utf8,
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" => {
                Charset::Encoding(all::ISO_8859_1)
            }
            "us-ascii" | "ascii" => Charset::Encoding(all::ASCII),
            _ => Charset::Encoding(
                encoding_from_whatwg_label(&normalized)
                    .ok_or_else(|| UnsupportedEncodingError::new(label))?,
            ),
        };
        debug!("resolved encoding label {label:?} to {}", charset.name());
        Ok(charset)
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }

    /// Encodes one character. Characters the encoding cannot represent are
    /// replaced the way the encoding's own replacement rule dictates.
    pub(crate) fn encode_char(&self, c: char) -> Result<EncodedBytes, UnsupportedEncodingError> {
        match self {
            Charset::Utf8 => Ok(EncodedBytes::utf8(c)),
            Charset::Encoding(encoding) => {
                let mut buf = [0u8; 4];
                encoding
                    .encode(c.encode_utf8(&mut buf), EncoderTrap::Replace)
                    .map(EncodedBytes::from)
                    .map_err(|cause| self.failure(cause.into_owned()))
            }
        }
    }

    /// Decodes a run of bytes. Malformed input decodes to U+FFFD.
    pub(crate) fn decode(&self, bytes: Vec<u8>) -> Result<String, UnsupportedEncodingError> {
        match self {
            Charset::Utf8 => Ok(match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
            }),
            Charset::Encoding(encoding) => encoding
                .decode(&bytes, DecoderTrap::Replace)
                .map_err(|cause| self.failure(cause.into_owned())),
        }
    }

    #[cold]
    fn failure(&self, cause: String) -> UnsupportedEncodingError {
        UnsupportedEncodingError {
            label: self.name().to_owned(),
            cause: Some(cause),
        }
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Charset {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_utf8_fast_path() {
        crate::ensure_env_logger_initialized();
        assert_eq!(Charset::for_label("UTF-8").unwrap(), Charset::Utf8);
        assert_eq!(Charset::for_label(" utf8 ").unwrap(), Charset::Utf8);
    }

    #[test]
    fn pins_latin1_aliases() {
        let charset = Charset::for_label("ISO-8859-1").unwrap();
        assert_eq!(charset.encode_char('é').unwrap().as_bytes(), &[0xE9]);
        assert_eq!(charset.decode(vec![0xE9]).unwrap(), "é");
        // Not folded into windows-1252.
        assert_eq!(charset.decode(vec![0x80]).unwrap(), "\u{80}");
    }

    #[test]
    fn resolves_whatwg_labels() {
        let charset = Charset::for_label("shift_jis").unwrap();
        assert_eq!(charset.encode_char('あ').unwrap().as_bytes(), &[0x82, 0xA0]);
    }

    #[test]
    fn rejects_unknown_labels() {
        let err = Charset::for_label("no-such-charset").unwrap_err();
        assert_eq!(err.label(), "no-such-charset");
    }

    #[test]
    fn utf8_decode_is_lossy() {
        assert_eq!(Charset::Utf8.decode(vec![b'a', 0xFF]).unwrap(), "a\u{FFFD}");
    }
}
