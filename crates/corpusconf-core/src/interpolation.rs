//! Placeholder parsing
//!
//! Parses raw values like:
//! - `corpora/Cree/xml/*.xml` - literal text, no placeholders
//! - `${format}` - reference to a key of the owning section
//! - `${.global:corpora_dir}` - reference qualified with a section
//! - `${.global:corpora_dir}/Russian/${format}/*.txt` - literals and references interleaved
//!
//! Names are taken verbatim: no whitespace trimming, case-sensitive.

use std::fmt;

use crate::error::{Error, Result};

/// A `${...}` reference as written in a raw value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Explicit section, if the placeholder was written `${section:key}`
    pub section: Option<String>,
    /// The referenced key
    pub key: String,
}

impl Reference {
    /// Section this reference points into, given the section that owns it
    pub fn target_section<'a>(&'a self, owner: &'a str) -> &'a str {
        self.section.as_deref().unwrap_or(owner)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{}:{}", section, self.key),
            None => write!(f, "{}", self.key),
        }
    }
}

/// One piece of a parsed raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text copied through unchanged
    Literal(String),
    /// A placeholder to be substituted
    Reference(Reference),
}

/// Parser for raw values
pub struct PlaceholderParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PlaceholderParser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the entire input into segments
    ///
    /// Adjacent literal text is always merged, so the result alternates
    /// between literals and references. An empty input yields no segments.
    pub fn parse(&mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();

        while !self.is_eof() {
            if self.check_placeholder_start() {
                let reference = self.parse_placeholder()?;
                segments.push(Segment::Reference(reference));
            } else {
                let literal = self.collect_literal();
                match segments.last_mut() {
                    Some(Segment::Literal(prev)) => prev.push_str(&literal),
                    _ => segments.push(Segment::Literal(literal)),
                }
            }
        }

        Ok(segments)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn check_placeholder_start(&self) -> bool {
        self.rest().starts_with("${")
    }

    /// Collect literal text until the next `${` or end of input
    fn collect_literal(&mut self) -> String {
        let rest = self.rest();
        // A leading `$` is literal here, otherwise we'd be at a placeholder.
        let skip = rest.chars().next().map_or(0, char::len_utf8);
        let end = rest[skip..].find("${").map_or(rest.len(), |i| i + skip);
        self.pos += end;
        rest[..end].to_string()
    }

    /// Parse a placeholder starting at `${`
    fn parse_placeholder(&mut self) -> Result<Reference> {
        self.pos += 2;
        let body_start = self.pos;
        let rest = self.rest();

        let close = rest.find('}').ok_or_else(|| {
            Error::malformed_placeholder(self.input, "Unclosed '${'")
        })?;
        let body = &rest[..close];

        if body.contains("${") {
            return Err(Error::malformed_placeholder(
                self.input,
                "Nested '${' inside a placeholder",
            ));
        }
        if body.is_empty() {
            return Err(Error::malformed_placeholder(self.input, "Empty placeholder"));
        }

        let reference = match body.split_once(':') {
            Some((section, key)) => {
                if section.is_empty() || key.is_empty() {
                    return Err(Error::malformed_placeholder(
                        self.input,
                        format!("Incomplete reference '{}'", body),
                    ));
                }
                Reference {
                    section: Some(section.to_string()),
                    key: key.to_string(),
                }
            }
            None => Reference {
                section: None,
                key: body.to_string(),
            },
        };

        self.pos = body_start + close + 1;
        Ok(reference)
    }
}

/// Parse a raw value into segments
pub fn parse(input: &str) -> Result<Vec<Segment>> {
    PlaceholderParser::new(input).parse()
}

/// Check if a string contains `${`, well-formed or not
pub fn contains_placeholder(input: &str) -> bool {
    input.contains("${")
}
