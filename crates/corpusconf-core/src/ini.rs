//! Section-delimited `key = value` text
//!
//! ```text
//! # comment
//! [.global]
//! corpora_dir = corpora
//!
//! [Russian]
//! format = toolbox
//! sessions = ${.global:corpora_dir}/Russian/${format}/*.txt
//! ```
//!
//! Comment lines start with `#` or `;`. An indented line right after a key
//! continues that key's value on a new line.

use crate::error::{Error, Result, SourceLocation};
use crate::store::{RawStore, Section};

/// Parse text into a raw store
pub fn parse(text: &str) -> Result<RawStore> {
    let mut store = RawStore::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Continuation of the previous value
        if line.starts_with(char::is_whitespace) {
            if let (Some(section), Some(key)) = (&current, &last_key) {
                let previous = store.get(section, key)?.to_string();
                store.insert(section.as_str(), key.as_str(), format!("{}\n{}", previous, trimmed));
                continue;
            }
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| at_line(Error::parse("Section header is missing ']'"), line_no))?
                .trim();
            if name.is_empty() {
                return Err(at_line(Error::parse("Empty section name"), line_no));
            }
            if store.contains_section(name) {
                return Err(at_line(
                    Error::parse(format!("Section [{}] is declared twice", name)),
                    line_no,
                ));
            }
            store.insert_section(name);
            current = Some(name.to_string());
            last_key = None;
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            at_line(
                Error::parse(format!("Expected 'key = value', got '{}'", trimmed)),
                line_no,
            )
        })?;
        let key = key.trim();
        let value = value.trim();

        let section = current.as_deref().ok_or_else(|| {
            at_line(
                Error::parse(format!("Key '{}' appears before any [section] header", key)),
                line_no,
            )
        })?;
        if key.is_empty() {
            return Err(at_line(Error::parse("Empty key"), line_no));
        }
        if store.insert(section, key, value).is_some() {
            return Err(at_line(
                Error::parse(format!("Key '{}' is declared twice in [{}]", key, section)),
                line_no,
            ));
        }
        last_key = Some(key.to_string());
    }

    Ok(store)
}

/// Render sections back to text
pub fn render<'a>(sections: impl Iterator<Item = (&'a str, &'a Section)>) -> String {
    let mut out = String::new();
    for (i, (name, section)) in sections.enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", name));
        for (key, value) in section {
            let value = value.replace('\n', "\n    ");
            out.push_str(&format!("{} = {}\n", key, value));
        }
    }
    out
}

fn at_line(err: Error, line: usize) -> Error {
    err.with_source_location(SourceLocation {
        file: "<string>".into(),
        line: Some(line),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
# Shared settings
[.global]
corpora_dir = corpora
db_dir = database

; one corpus
[Russian]
format = toolbox
sessions = ${.global:corpora_dir}/Russian/${format}/*.txt
"#;

    #[test]
    fn test_parse_sections_and_keys() {
        let store = parse(SAMPLE).unwrap();

        let names: Vec<_> = store.section_names().collect();
        assert_eq!(names, vec![".global", "Russian"]);
        assert_eq!(store.get(".global", "db_dir").unwrap(), "database");
        assert_eq!(
            store.get("Russian", "sessions").unwrap(),
            "${.global:corpora_dir}/Russian/${format}/*.txt"
        );
    }

    #[test]
    fn test_split_on_first_equals() {
        let store = parse("[A]\nquery = a=b\n").unwrap();
        assert_eq!(store.get("A", "query").unwrap(), "a=b");
    }

    #[test]
    fn test_keys_keep_case() {
        let store = parse("[A]\nFormat = cha\n").unwrap();
        assert!(store.get("A", "Format").is_ok());
        assert!(store.get("A", "format").is_err());
    }

    #[test]
    fn test_empty_value_allowed() {
        let store = parse("[A]\nacronym =\n").unwrap();
        assert_eq!(store.get("A", "acronym").unwrap(), "");
    }

    #[test]
    fn test_continuation_lines() {
        let store = parse("[A]\nowner = First Owner\n    Second Owner\nformat = cha\n").unwrap();
        assert_eq!(store.get("A", "owner").unwrap(), "First Owner\nSecond Owner");
        assert_eq!(store.get("A", "format").unwrap(), "cha");
    }

    #[test]
    fn test_empty_section_kept() {
        let store = parse("[A]\n[B]\nk = v\n").unwrap();
        assert!(store.section("A").unwrap().is_empty());
    }

    #[test]
    fn test_key_before_section() {
        let err = parse("k = v\n[A]\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.source_location.unwrap().line, Some(1));
    }

    #[test]
    fn test_missing_delimiter() {
        let err = parse("[A]\n\njust words\n").unwrap_err();
        assert_eq!(err.source_location.unwrap().line, Some(3));
    }

    #[test]
    fn test_duplicate_section() {
        let err = parse("[A]\nk = 1\n[A]\n").unwrap_err();
        assert!(err.to_string().contains("declared twice"));
        assert_eq!(err.source_location.unwrap().line, Some(3));
    }

    #[test]
    fn test_duplicate_key() {
        let err = parse("[A]\nk = 1\nk = 2\n").unwrap_err();
        assert!(err.to_string().contains("Key 'k' is declared twice in [A]"));
    }

    #[test]
    fn test_bad_headers() {
        assert!(parse("[A\n").is_err());
        assert!(parse("[ ]\n").is_err());
    }

    #[test]
    fn test_render_reparses() {
        let store = parse(SAMPLE).unwrap();
        let text = render(store.sections());

        assert!(text.starts_with("[.global]\ncorpora_dir = corpora\n"));
        assert_eq!(parse(&text).unwrap(), store);
    }
}
