//! Raw section store
//!
//! Holds sections and their `key = value` pairs exactly as declared, before
//! any placeholder is resolved. Section order and key order are preserved.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ini;

/// Ordered key/value pairs of one section
pub type Section = IndexMap<String, String>;

/// Ordered mapping from section name to its raw key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawStore {
    sections: IndexMap<String, Section>,
}

impl RawStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse section-delimited `key = value` text
    pub fn from_ini_str(text: &str) -> Result<Self> {
        ini::parse(text)
    }

    /// Read and parse a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let store = ini::parse(&content).map_err(|e| e.in_file(filename))?;
        log::debug!(
            "Loaded {} section(s) from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Load and merge several files in order
    ///
    /// Later files add sections and override individual keys of earlier
    /// ones. A section or key keeps the position of its first declaration.
    pub fn load_merged<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged = Self::new();
        for path in paths {
            merged.merge(Self::from_file(path)?);
        }
        Ok(merged)
    }

    /// Merge another store into this one (last writer wins per key)
    pub fn merge(&mut self, other: RawStore) {
        for (name, section) in other.sections {
            let target = self.sections.entry(name).or_default();
            for (key, value) in section {
                target.insert(key, value);
            }
        }
    }

    /// Add an empty section if it isn't declared yet
    pub fn insert_section(&mut self, section: impl Into<String>) {
        self.sections.entry(section.into()).or_default();
    }

    /// Set a raw value, creating the section if needed
    ///
    /// Returns the previous value of the key, if any.
    pub fn insert(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into())
    }

    /// Get the raw value at `(section, key)`
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
            .ok_or_else(|| Error::not_found(format!("{}:{}", section, key)))
    }

    /// Look up `(section, key)` returning the stored names along with the value
    pub(crate) fn lookup(&self, section: &str, key: &str) -> Option<(&str, &str, &str)> {
        let (name, entries) = self.sections.get_key_value(section)?;
        let (key, value) = entries.get_key_value(key)?;
        Some((name.as_str(), key.as_str(), value.as_str()))
    }

    /// Get a whole section
    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| Error::not_found(format!("[{}]", name)))
    }

    /// Check whether a section is declared
    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Iterate sections in declaration order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, s)| (name.as_str(), s))
    }

    /// Section names in declaration order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the store has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render back to section-delimited text
    pub fn to_ini_string(&self) -> String {
        ini::render(self.sections())
    }
}
