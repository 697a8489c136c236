//! Placeholder resolution
//!
//! Turns a [`RawStore`] into a [`ResolvedStore`] in which no value contains
//! placeholder syntax any more.
//!
//! Resolution walks the reference graph with an explicit stack of frames,
//! one per `(section, key)` currently being resolved. The stack doubles as
//! the visitation path: meeting a pair that is already on it is a cycle.
//! Finished values are memoized for the rest of the run, so a value shared
//! by many others (like `.global:corpora_dir`) is resolved once.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ini;
use crate::interpolation::{self, Segment};
use crate::store::{RawStore, Section};

/// Fully resolved sections, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedStore {
    sections: IndexMap<String, Section>,
}

impl ResolvedStore {
    /// Get the resolved value at `(section, key)`
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
            .ok_or_else(|| Error::not_found(format!("{}:{}", section, key)))
    }

    /// Get a whole resolved section
    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| Error::not_found(format!("[{}]", name)))
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

    /// Whether there are no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render to section-delimited text
    pub fn to_ini_string(&self) -> String {
        ini::render(self.sections())
    }
}

/// A value being resolved
struct Frame<'a> {
    section: &'a str,
    key: &'a str,
    segments: std::vec::IntoIter<Segment>,
    buffer: String,
}

impl<'a> Frame<'a> {
    fn new(section: &'a str, key: &'a str, raw: &'a str) -> Result<Self> {
        let segments = interpolation::parse(raw).map_err(|e| e.with_path(location(section, key)))?;
        Ok(Self {
            section,
            key,
            segments: segments.into_iter(),
            buffer: String::with_capacity(raw.len()),
        })
    }

    fn location(&self) -> String {
        location(self.section, self.key)
    }
}

fn location(section: &str, key: &str) -> String {
    format!("{}:{}", section, key)
}

/// Resolves placeholders of one raw store
///
/// The memo lives as long as the resolver, so resolving the same pair twice
/// through one resolver does the work once. The raw store is never modified.
pub struct Resolver<'a> {
    store: &'a RawStore,
    memo: HashMap<(&'a str, &'a str), String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a raw store
    pub fn new(store: &'a RawStore) -> Self {
        Self {
            store,
            memo: HashMap::new(),
        }
    }

    /// Resolve every value of every section
    pub fn resolve_all(mut self) -> Result<ResolvedStore> {
        let store = self.store;
        let mut sections = IndexMap::with_capacity(store.len());

        for (name, raw_section) in store.sections() {
            let mut section = Section::with_capacity(raw_section.len());
            for (key, raw) in raw_section {
                let value = self.resolve_node(name, key, raw)?;
                section.insert(key.clone(), value);
            }
            sections.insert(name.to_string(), section);
        }

        log::debug!(
            "Resolved {} value(s) across {} section(s)",
            self.memo.len(),
            sections.len()
        );
        Ok(ResolvedStore { sections })
    }

    /// Resolve a single value
    pub fn resolve(&mut self, section: &str, key: &str) -> Result<String> {
        let (section, key, raw) = self
            .store
            .lookup(section, key)
            .ok_or_else(|| Error::not_found(location(section, key)))?;
        self.resolve_node(section, key, raw)
    }

    fn resolve_node(&mut self, section: &'a str, key: &'a str, raw: &'a str) -> Result<String> {
        if let Some(done) = self.memo.get(&(section, key)) {
            return Ok(done.clone());
        }

        let mut path = vec![Frame::new(section, key, raw)?];

        while let Some(frame) = path.last_mut() {
            match frame.segments.next() {
                Some(Segment::Literal(text)) => frame.buffer.push_str(&text),
                Some(Segment::Reference(reference)) => {
                    let target = reference.target_section(frame.section);
                    let Some((ts, tk, traw)) = self.store.lookup(target, &reference.key) else {
                        let holder = frame.location();
                        let qualified = location(target, &reference.key);
                        return Err(Error::unresolved_reference(qualified, Some(holder)));
                    };

                    if let Some(done) = self.memo.get(&(ts, tk)) {
                        frame.buffer.push_str(done);
                        continue;
                    }

                    if let Some(start) = path.iter().position(|f| f.section == ts && f.key == tk) {
                        let mut chain: Vec<String> = path[start..].iter().map(Frame::location).collect();
                        chain.push(location(ts, tk));
                        let at = path[path.len() - 1].location();
                        return Err(Error::circular_reference(at, chain));
                    }

                    log::trace!(
                        "Resolving {} as {} (depth {})",
                        reference,
                        location(ts, tk),
                        path.len()
                    );
                    let next = Frame::new(ts, tk, traw)?;
                    path.push(next);
                }
                None => {
                    if let Some(finished) = path.pop() {
                        // Substitution may splice a trailing `$` onto a literal `{`.
                        if interpolation::contains_placeholder(&finished.buffer) {
                            return Err(Error::malformed_placeholder(
                                &finished.buffer,
                                "Substitution produced '${'",
                            )
                            .with_path(finished.location()));
                        }
                        if let Some(parent) = path.last_mut() {
                            parent.buffer.push_str(&finished.buffer);
                        }
                        self.memo
                            .insert((finished.section, finished.key), finished.buffer);
                    }
                }
            }
        }

        self.memo
            .get(&(section, key))
            .cloned()
            .ok_or_else(|| Error::not_found(location(section, key)))
    }
}

impl RawStore {
    /// Resolve all placeholders into a new store
    pub fn resolve(&self) -> Result<ResolvedStore> {
        Resolver::new(self).resolve_all()
    }
}
