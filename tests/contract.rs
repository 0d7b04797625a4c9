//! Behaviour shared by every context: round-trips, identity preservation,
//! level ordering, argument checks and the reference vectors.

use std::borrow::Cow;
use std::sync::Once;

use pretty_assertions::assert_eq;
use text_escape::csv::{escape_csv, escape_csv_to, unescape_csv, unescape_csv_to};
use text_escape::html::{
    HtmlEscape, HtmlEscapeLevel, HtmlEscapeType, escape_html, escape_html_to, unescape_html,
    unescape_html_to,
};
use text_escape::properties::{
    PropertiesEscapeLevel, PropertiesRole, escape_properties, escape_properties_to,
    unescape_properties, unescape_properties_to,
};
use text_escape::uri::{UriPart, escape_uri, escape_uri_to, unescape_uri, unescape_uri_to};
use text_escape::{Error, InvalidArgumentError};

fn ensure_env_logger_initialized() {
    static LOGGER_INIT: Once = Once::new();
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

const SAMPLES: &[&str] = &[
    "",
    "plain",
    "Tom & Jerry <3 \"quotes\" and 'apostrophes'",
    "tab\tnewline\ncarriage\rform\u{C}back\\slash",
    "key = value: #comment !bang",
    "/path/to/a file?query=1&other=a+b#frag%20",
    "naïve café, Œuvre, 東京, Ελληνικά",
    "emoji 😀👍🏽 and 𝄞 outside the BMP",
    "\u{0}\u{1}\u{7F}\u{80}\u{9F}\u{A0}\u{FEFF}",
    "&amp; &#60; %41 \\u0041 \"\"",
];

const HTML_TYPES: [HtmlEscapeType; 6] = [
    HtmlEscapeType::Html4NamedReferencesDefaultToDecimal,
    HtmlEscapeType::Html4NamedReferencesDefaultToHexa,
    HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
    HtmlEscapeType::Html5NamedReferencesDefaultToHexa,
    HtmlEscapeType::DecimalReferences,
    HtmlEscapeType::HexadecimalReferences,
];

const HTML_LEVELS: [HtmlEscapeLevel; 5] = [
    HtmlEscapeLevel::OnlyMarkupSignificantExceptApos,
    HtmlEscapeLevel::OnlyMarkupSignificant,
    HtmlEscapeLevel::AllNonAsciiPlusMarkupSignificant,
    HtmlEscapeLevel::AllNonAlphanumeric,
    HtmlEscapeLevel::AllCharacters,
];

const PROPERTIES_LEVELS: [PropertiesEscapeLevel; 4] = [
    PropertiesEscapeLevel::BasicEscapeSet,
    PropertiesEscapeLevel::AllNonAsciiPlusBasicEscapeSet,
    PropertiesEscapeLevel::AllNonAlphanumeric,
    PropertiesEscapeLevel::AllCharacters,
];

const URI_PARTS: [UriPart; 4] = [
    UriPart::Path,
    UriPart::PathSegment,
    UriPart::QueryParam,
    UriPart::FragmentId,
];

fn assert_same_slice(out: &Cow<'_, str>, input: &str, what: &str) {
    match out {
        Cow::Borrowed(s) => assert!(core::ptr::eq(*s, input), "{what}: a different slice"),
        Cow::Owned(s) => panic!("{what}: {input:?} was copied into {s:?}"),
    }
}

// =============================================================================
// Round-trip
// =============================================================================

#[test]
fn html_round_trip() {
    ensure_env_logger_initialized();
    for sample in SAMPLES {
        for escape_type in HTML_TYPES {
            for level in HTML_LEVELS {
                let escaped = escape_html(sample, escape_type, level);
                assert_eq!(
                    unescape_html(&escaped),
                    *sample,
                    "{escape_type:?} / {level:?}"
                );
            }
        }
    }
}

#[test]
fn uri_round_trip() {
    ensure_env_logger_initialized();
    for sample in SAMPLES {
        for part in URI_PARTS {
            let escaped = escape_uri(sample, part, "UTF-8").unwrap();
            assert_eq!(unescape_uri(&escaped, part, "UTF-8").unwrap(), *sample, "{part:?}");
        }
    }
}

#[test]
fn uri_round_trip_latin1() {
    let sample = "déjà vu & ñandú";
    let escaped = escape_uri(sample, UriPart::QueryParam, "ISO-8859-1").unwrap();
    assert_eq!(escaped, "d%E9j%E0%20vu%20%26%20%F1and%FA");
    assert_eq!(
        unescape_uri(&escaped, UriPart::QueryParam, "ISO-8859-1").unwrap(),
        sample
    );
}

#[test]
fn properties_round_trip() {
    ensure_env_logger_initialized();
    for sample in SAMPLES {
        for role in [PropertiesRole::Key, PropertiesRole::Value] {
            for level in PROPERTIES_LEVELS {
                let escaped = escape_properties(sample, role, level);
                assert_eq!(
                    unescape_properties(&escaped).unwrap(),
                    *sample,
                    "{role:?} / {level:?}"
                );
            }
        }
    }
}

#[test]
fn csv_round_trip() {
    for sample in SAMPLES {
        assert_eq!(unescape_csv(&escape_csv(sample)), *sample);
    }
}

// =============================================================================
// Identity preservation
// =============================================================================

#[test]
fn escape_identity() {
    let input = "Identity2024";
    for escape_type in HTML_TYPES {
        for level in &HTML_LEVELS[..4] {
            assert_same_slice(&escape_html(input, escape_type, *level), input, "html");
        }
    }
    for part in URI_PARTS {
        assert_same_slice(&escape_uri(input, part, "UTF-8").unwrap(), input, "uri");
    }
    for role in [PropertiesRole::Key, PropertiesRole::Value] {
        for level in &PROPERTIES_LEVELS[..3] {
            assert_same_slice(&escape_properties(input, role, *level), input, "properties");
        }
    }
    assert_same_slice(&escape_csv(input), input, "csv");
}

#[test]
fn unescape_identity() {
    let input = "no leads here: just text, 😀 and = signs";
    assert_same_slice(&unescape_html(input), input, "html");
    for part in URI_PARTS {
        assert_same_slice(&unescape_uri(input, part, "UTF-8").unwrap(), input, "uri");
    }
    assert_same_slice(&unescape_properties(input).unwrap(), input, "properties");
    assert_same_slice(&unescape_csv(input), input, "csv");
}

#[test]
fn level_four_escapes_letters() {
    let escaped = escape_html(
        "a",
        HtmlEscapeType::DecimalReferences,
        HtmlEscapeLevel::AllCharacters,
    );
    assert_eq!(escaped, "&#97;");
    let escaped = escape_properties(
        "a",
        PropertiesRole::Value,
        PropertiesEscapeLevel::AllCharacters,
    );
    assert!(matches!(escaped, Cow::Owned(_)));
}

// =============================================================================
// Level monotonicity
// =============================================================================

/// Every character that comes out changed at one level comes out changed at
/// every higher level too.
#[test]
fn escaping_grows_with_level() {
    let alphabet: Vec<char> = (0u32..0x250)
        .chain([0x2026, 0x20AC, 0x1F600])
        .filter_map(char::from_u32)
        .collect();

    for c in &alphabet {
        let text = c.to_string();
        let html: Vec<bool> = HTML_LEVELS
            .iter()
            .map(|&level| escape_html(&text, HtmlEscapeType::DecimalReferences, level) != text)
            .collect();
        assert!(html.windows(2).all(|w| !w[0] || w[1]), "html {c:?}: {html:?}");

        for role in [PropertiesRole::Key, PropertiesRole::Value] {
            let props: Vec<bool> = PROPERTIES_LEVELS
                .iter()
                .map(|&level| escape_properties(&text, role, level) != text)
                .collect();
            assert!(props.windows(2).all(|w| !w[0] || w[1]), "{role:?} {c:?}: {props:?}");
        }
    }
}

// =============================================================================
// Argument checks
// =============================================================================

type WindowFn = fn(Option<&str>, usize, usize, Option<&mut String>) -> Result<(), Error>;

fn html_escape(t: Option<&str>, o: usize, l: usize, s: Option<&mut String>) -> Result<(), Error> {
    escape_html_to(
        t,
        o,
        l,
        s,
        HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
        HtmlEscapeLevel::AllNonAsciiPlusMarkupSignificant,
    )
}

fn uri_escape(t: Option<&str>, o: usize, l: usize, s: Option<&mut String>) -> Result<(), Error> {
    escape_uri_to(t, o, l, s, UriPart::QueryParam, "UTF-8")
}

fn uri_unescape(t: Option<&str>, o: usize, l: usize, s: Option<&mut String>) -> Result<(), Error> {
    unescape_uri_to(t, o, l, s, UriPart::QueryParam, "UTF-8")
}

fn properties_escape(
    t: Option<&str>,
    o: usize,
    l: usize,
    s: Option<&mut String>,
) -> Result<(), Error> {
    escape_properties_to(
        t,
        o,
        l,
        s,
        PropertiesRole::Value,
        PropertiesEscapeLevel::AllNonAsciiPlusBasicEscapeSet,
    )
}

fn window_functions() -> [(&'static str, WindowFn); 8] {
    [
        ("html escape", html_escape),
        ("html unescape", unescape_html_to::<String>),
        ("uri escape", uri_escape),
        ("uri unescape", uri_unescape),
        ("properties escape", properties_escape),
        ("properties unescape", unescape_properties_to::<String>),
        ("csv escape", escape_csv_to::<String>),
        ("csv unescape", unescape_csv_to::<String>),
    ]
}

#[test]
fn out_of_bounds_windows_are_rejected() {
    let text = "a<b&c";
    let bad = [
        (6, 0),
        (usize::MAX, 0),
        (0, 6),
        (3, 3),
        (1, usize::MAX),
        (usize::MAX, usize::MAX),
    ];
    for (name, f) in window_functions() {
        for (offset, len) in bad {
            let mut sink = String::new();
            let err = f(Some(text), offset, len, Some(&mut sink)).unwrap_err();
            assert!(
                matches!(err, Error::InvalidArgument(_)),
                "{name} ({offset}, {len}): {err:?}"
            );
            assert_eq!(sink, "", "{name} wrote before failing");
        }
    }
}

#[test]
fn missing_sink_is_always_rejected() {
    let windows = [(Some("a<b"), 0, 3), (Some("a<b"), 9, 9), (None, 0, 0)];
    for (name, f) in window_functions() {
        for (text, offset, len) in windows {
            assert_eq!(
                f(text, offset, len, None),
                Err(Error::InvalidArgument(InvalidArgumentError::MissingSink)),
                "{name}"
            );
        }
    }
}

#[test]
fn windows_must_fall_on_char_boundaries() {
    for (name, f) in window_functions() {
        let mut sink = String::new();
        assert_eq!(
            f(Some("é"), 0, 1, Some(&mut sink)),
            Err(Error::InvalidArgument(InvalidArgumentError::NotCharBoundary {
                offset: 0,
                len: 1
            })),
            "{name}"
        );
    }
}

// =============================================================================
// Absent input
// =============================================================================

#[test]
fn absent_input_is_a_no_op() {
    let absent: Option<&str> = None;
    assert_eq!(absent.map(text_escape::escape_html5), None);
    assert_eq!(absent.map(escape_csv), None);

    for (name, f) in window_functions() {
        let mut sink = String::from("untouched");
        f(None, 0, 0, Some(&mut sink)).unwrap();
        assert_eq!(sink, "untouched", "{name}");
    }
}

#[test]
fn windows_select_the_right_span() {
    let text = "<<a b>>";
    let mut sink = String::new();
    escape_html_to(
        Some(text),
        1,
        5,
        Some(&mut sink),
        HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
        HtmlEscapeLevel::OnlyMarkupSignificant,
    )
    .unwrap();
    assert_eq!(sink, "&lt;a b&gt;");

    let mut sink = String::new();
    HtmlEscape::default()
        .escape_to(Some(text), 7, 0, Some(&mut sink))
        .unwrap();
    assert_eq!(sink, "");
}

// =============================================================================
// Reference vectors
// =============================================================================

#[test]
fn reference_vectors() {
    assert_eq!(
        escape_html(
            r#"<div class="A">"#,
            HtmlEscapeType::Html5NamedReferencesDefaultToDecimal,
            HtmlEscapeLevel::AllNonAsciiPlusMarkupSignificant
        ),
        "&lt;div class=&quot;A&quot;&gt;"
    );

    let segments: Vec<_> = "admin/users list"
        .split('/')
        .map(text_escape::escape_uri_path_segment)
        .collect();
    assert_eq!(segments, ["admin", "users%20list"]);
    assert_eq!(
        text_escape::unescape_uri_path_segment("users%20list").unwrap(),
        "users list"
    );

    assert_eq!(text_escape::escape_uri_query_param("a=b&c"), "a%3Db%26c");
    assert_eq!(text_escape::unescape_uri_query_param("a+b").unwrap(), "a b");
    assert_eq!(text_escape::unescape_uri_path("a+b").unwrap(), "a+b");

    assert_eq!(escape_csv("value,with,commas"), "\"value,with,commas\"");
    assert_eq!(
        escape_csv(r#"He said ""hi""""#),
        r#""He said """"hi""""""""#
    );

    assert_eq!(text_escape::escape_properties_value("\t"), "\\t");
    assert_eq!(text_escape::escape_properties_value("á"), "\\u00E1");
}
