//! Demonstrates the window-and-sink API: a `.properties` file is read once and
//! every key and value is unescaped straight out of the file buffer, without
//! slicing or copying it first.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use text_escape::escape_html5_xml;
use text_escape::properties::unescape_properties_to;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let file_path = get_file_path();
    let content = fs::read_to_string(&file_path)
        .expect("Failed to open demos/data/messages.properties. Make sure the file exists.");

    let mut report = String::new();
    let mut line_start = 0;
    for line in content.split_inclusive('\n') {
        let offset = line_start;
        line_start += line.len();

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some(separator) = find_separator(line) else {
            continue;
        };

        let mut key = String::new();
        let mut value = String::new();
        unescape_properties_to(Some(&content), offset, separator, Some(&mut key))?;
        unescape_properties_to(
            Some(&content),
            offset + separator + 1,
            line.len() - separator - 1,
            Some(&mut value),
        )?;

        writeln!(report, "{key:>16} => {value}")?;
        writeln!(report, "{:>16}    as XML: {}", "", escape_html5_xml(&value))?;
    }

    println!("Unescaped {}:\n{report}", file_path.display());
    Ok(())
}

/// Byte index of the first `=` or `:` not preceded by a backslash.
fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, b) in line.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'=' | b':' => return Some(i),
            _ => {}
        }
    }
    None
}

fn get_file_path() -> PathBuf {
    if let Some(path) = std::env::args_os().nth(1) {
        return PathBuf::from(path);
    }
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let mut file_path = PathBuf::from(manifest_dir);
    file_path.push("demos/data/messages.properties");
    file_path
}
