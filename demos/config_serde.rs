//! Demonstrates loading escaping configurations from JSON with the `serde`
//! feature enabled.
//!
//! Run with `cargo run --example config_serde --features serde`.

use serde::Deserialize;
use std::collections::HashMap;

use text_escape::html::HtmlEscape;
use text_escape::properties::PropertiesEscape;
use text_escape::uri::{UriPart, escape_uri};

#[derive(Debug, Deserialize)]
struct Config {
    html: HtmlEscape,
    properties: PropertiesEscape,
    uri: HashMap<String, UriTarget>,
}

#[derive(Debug, Deserialize)]
struct UriTarget {
    part: UriPart,
    encoding: String,
}

const CONFIG: &str = r#"{
    "html": { "escape_type": "html4_named_references_default_to_hexa", "level": "all_non_alphanumeric" },
    "properties": { "role": "key", "level": "basic_escape_set" },
    "uri": {
        "search": { "part": "query_param", "encoding": "UTF-8" },
        "legacy": { "part": "path", "encoding": "ISO-8859-1" }
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config: Config = serde_json::from_str(CONFIG)?;
    println!("{config:#?}\n");

    let sample = "Crème brûlée = 5€ & more";
    println!("html:       {}", config.html.escape(sample));
    println!("properties: {}", config.properties.escape(sample));

    let mut targets: Vec<_> = config.uri.iter().collect();
    targets.sort_by_key(|(name, _)| name.as_str());
    for (name, target) in targets {
        println!(
            "uri {name:<7} {}",
            escape_uri(sample, target.part, &target.encoding)?
        );
    }
    Ok(())
}
