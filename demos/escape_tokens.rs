//! Demonstrates the token-level API by plugging a custom table into the
//! escape engine: Markdown-significant characters get a backslash, and the
//! engine takes care of literal runs, `Cow` and sinks.

use std::borrow::Cow;
use std::convert::Infallible;

use text_escape::html::HtmlUnescape;
use text_escape::token::{
    EscapeTable, EscapeToken, EscapeTokens, EscapedToken, UnescapeTokens, UnescapedToken,
};

/// Escapes the characters that Markdown would otherwise interpret.
#[derive(Clone, Copy)]
struct Markdown;

impl EscapeTable for Markdown {
    type Error = Infallible;

    fn is_allowed(&self, c: char) -> bool {
        !matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '<' | '>')
    }

    fn encode(&self, c: char) -> Result<EscapeToken, Infallible> {
        Ok(EscapeToken::Alias(match c {
            '\\' => r"\\",
            '`' => r"\`",
            '*' => r"\*",
            '_' => r"\_",
            '[' => r"\[",
            ']' => r"\]",
            '#' => r"\#",
            '<' => "&lt;",
            _ => "&gt;",
        }))
    }
}

fn main() {
    let input = "Use *args and **kwargs in my_function [see docs]";

    println!("--- Tokens ---");
    for token in EscapeTokens::new(input, Markdown) {
        match token {
            EscapedToken::Literal(s) => println!("literal {s:?}"),
            EscapedToken::Escaped(c) => println!("escape  {c:?} -> {}", Markdown.encode(c).unwrap()),
        }
    }

    println!("\n--- Display ---");
    println!("{}", EscapeTokens::new(input, Markdown));

    println!("\n--- Cow ---");
    let clean = "nothing to do here";
    let cow = EscapeTokens::new(clean, Markdown).into_cow().unwrap();
    println!("borrowed: {}", matches!(cow, Cow::Borrowed(_)));

    println!("\n--- Unescape tokens ---");
    for token in UnescapeTokens::new("1 &lt; 2 &amp;&amp; 3 &gt 2", HtmlUnescape) {
        match token.unwrap() {
            UnescapedToken::Literal(s) => println!("literal {s:?}"),
            UnescapedToken::Unescaped(value) => println!("decoded {value:?}"),
        }
    }
}
