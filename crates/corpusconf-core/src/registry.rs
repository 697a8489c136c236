//! Corpus registry
//!
//! The registry is the typed, validated view of a resolved store: one
//! [`CorpusEntry`] per section, except the global defaults section which only
//! exists to be referenced. Once built it never changes.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::resolver::ResolvedStore;
use crate::store::{RawStore, Section};

/// Name of the global defaults section unless configured otherwise
pub const DEFAULT_GLOBAL_SECTION: &str = ".global";

/// Keys every corpus section must declare, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 9] = [
    "iso_639_3",
    "glottolog_code",
    "language",
    "corpus",
    "owner",
    "name",
    "license",
    "format",
    "sessions",
];

/// Keys a corpus section may declare
pub const OPTIONAL_FIELDS: [&str; 2] = ["acronym", "metadata_dir"];

/// Options for building a registry
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Section holding shared defaults; never becomes a corpus
    pub global_section: String,
    /// Fail when the global section is not declared
    pub require_global: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            global_section: DEFAULT_GLOBAL_SECTION.to_string(),
            require_global: false,
        }
    }
}

impl RegistryOptions {
    /// Use a different global defaults section name
    pub fn with_global_section(mut self, name: impl Into<String>) -> Self {
        self.global_section = name.into();
        self
    }

    /// Require the global defaults section to be present
    pub fn require_global(mut self, required: bool) -> Self {
        self.require_global = required;
        self
    }
}

/// Resolved description of one corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusEntry {
    /// Corpus identifier: the section name
    pub id: String,
    /// ISO 639-3 language code
    pub iso_639_3: String,
    /// Glottolog languoid identifier
    pub glottolog_code: String,
    /// Language name
    pub language: String,
    /// Corpus identifier as declared in the section
    pub corpus: String,
    /// Owner(s) of the corpus
    pub owner: String,
    /// Short label used in place of the name, when declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    /// Display name
    pub name: String,
    /// License the corpus is distributed under
    pub license: String,
    /// Source format of the session files (e.g. `toolbox`, `cha`)
    pub format: String,
    /// Glob pattern matching the session files
    pub sessions: String,
    /// Glob pattern of auxiliary metadata files, for formats that need them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_dir: Option<String>,
    /// Every other key of the section, in declaration order
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}

impl CorpusEntry {
    /// Build an entry from a resolved section
    pub fn from_section(id: &str, section: &Section) -> Result<Self> {
        for field in REQUIRED_FIELDS {
            if !section.contains_key(field) {
                return Err(Error::missing_field(id, field));
            }
        }

        let required = |field: &str| section.get(field).cloned().unwrap_or_default();
        let optional = |field: &str| section.get(field).filter(|v| !v.is_empty()).cloned();

        let extra = section
            .iter()
            .filter(|(k, _)| {
                !REQUIRED_FIELDS.contains(&k.as_str()) && !OPTIONAL_FIELDS.contains(&k.as_str())
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            id: id.to_string(),
            iso_639_3: required("iso_639_3"),
            glottolog_code: required("glottolog_code"),
            language: required("language"),
            corpus: required("corpus"),
            owner: required("owner"),
            acronym: optional("acronym"),
            name: required("name"),
            license: required("license"),
            format: required("format"),
            sessions: required("sessions"),
            metadata_dir: optional("metadata_dir"),
            extra,
        })
    }

    /// Look up any attribute of the entry by its key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            "iso_639_3" => Some(&self.iso_639_3),
            "glottolog_code" => Some(&self.glottolog_code),
            "language" => Some(&self.language),
            "corpus" => Some(&self.corpus),
            "owner" => Some(&self.owner),
            "acronym" => self.acronym.as_deref(),
            "name" => Some(&self.name),
            "license" => Some(&self.license),
            "format" => Some(&self.format),
            "sessions" => Some(&self.sessions),
            "metadata_dir" => self.metadata_dir.as_deref(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Derive the metadata file belonging to a session file
    ///
    /// The session path must lie under the fixed directory part of
    /// `sessions`; that part is swapped for the fixed directory part of
    /// `metadata_dir`. When `metadata_dir` ends in `*.ext`, the session
    /// file's extension becomes `.ext`.
    ///
    /// ```
    /// # use corpusconf_core::CorpusRegistry;
    /// let registry = CorpusRegistry::from_ini_str(r#"
    /// [Russian]
    /// iso_639_3 = rus
    /// glottolog_code = russ1263
    /// language = Russian
    /// corpus = Russian
    /// owner = Stoll
    /// name = Stoll Corpus
    /// license = restricted
    /// format = toolbox
    /// sessions = corpora/Russian/toolbox/*.txt
    /// metadata_dir = corpora/Russian/imdi/*.imdi
    /// "#).unwrap();
    /// let russian = registry.get("Russian").unwrap();
    /// assert_eq!(
    ///     russian.metadata_path_for("corpora/Russian/toolbox/A00210817.txt").as_deref(),
    ///     Some("corpora/Russian/imdi/A00210817.imdi")
    /// );
    /// ```
    pub fn metadata_path_for(&self, session_path: &str) -> Option<String> {
        let metadata = self.metadata_dir.as_deref()?;
        let (session_base, _) = split_glob(&self.sessions);
        let (metadata_base, metadata_leaf) = split_glob(metadata);

        let relative = match session_base {
            Some(dir) => session_path.strip_prefix(dir)?.strip_prefix('/')?,
            None => session_path,
        };

        let extension = metadata_leaf
            .and_then(|leaf| leaf.rsplit('/').next())
            .and_then(|name| name.strip_prefix('*'))
            .filter(|ext| ext.starts_with('.') && !has_glob(ext));

        let relative = match extension {
            Some(ext) => replace_extension(relative, ext),
            None => relative.to_string(),
        };
        Some(match metadata_base {
            Some(dir) => format!("{}/{}", dir, relative),
            None => relative,
        })
    }
}

fn has_glob(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Split a glob into its fixed directory and the part holding wildcards
///
/// Neither half keeps the separating `/`. The directory is `None` when the
/// wildcards start at the first component, and `Some("")` for the root.
fn split_glob(pattern: &str) -> (Option<&str>, Option<&str>) {
    match pattern.find(['*', '?', '[', '{']) {
        Some(idx) => match pattern[..idx].rfind('/') {
            Some(cut) => (Some(&pattern[..cut]), Some(&pattern[cut + 1..])),
            None => (None, Some(pattern)),
        },
        None => (Some(pattern.trim_end_matches('/')), None),
    }
}

fn replace_extension(path: &str, ext: &str) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}", &path[..name_start + dot], ext),
        _ => format!("{}{}", path, ext),
    }
}

/// Identifier comparison ignores case and surrounding whitespace
fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Immutable, ordered collection of corpus entries
#[derive(Debug, Clone)]
pub struct CorpusRegistry {
    entries: Vec<CorpusEntry>,
    index: HashMap<String, usize>,
    globals: Section,
}

impl CorpusRegistry {
    /// Build a registry from resolved sections
    pub fn from_resolved(resolved: &ResolvedStore, options: &RegistryOptions) -> Result<Self> {
        let globals = match resolved.section(&options.global_section) {
            Ok(section) => section.clone(),
            Err(err) if options.require_global => {
                return Err(err.with_help(format!(
                    "Declare a [{}] section with the shared defaults",
                    options.global_section
                )));
            }
            Err(_) => Section::new(),
        };

        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for (name, section) in resolved.sections() {
            if name == options.global_section {
                continue;
            }

            let key = normalize(name);
            if let Some(&existing) = index.get(&key) {
                let first: &CorpusEntry = &entries[existing];
                return Err(Error::duplicate_corpus(first.id.as_str(), name));
            }

            let entry = CorpusEntry::from_section(name, section)?;
            index.insert(key, entries.len());
            entries.push(entry);
        }

        log::debug!("Registered {} corpora", entries.len());
        Ok(Self {
            entries,
            index,
            globals,
        })
    }

    /// Resolve a raw store and build a registry from it
    pub fn from_raw(raw: &RawStore, options: &RegistryOptions) -> Result<Self> {
        Self::from_resolved(&raw.resolve()?, options)
    }

    /// Parse, resolve, and validate section-delimited text
    pub fn from_ini_str(text: &str) -> Result<Self> {
        Self::from_raw(&RawStore::from_ini_str(text)?, &RegistryOptions::default())
    }

    /// Load a registry from a file with default options
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_raw(&RawStore::from_file(path)?, &RegistryOptions::default())
    }

    /// Load several files, merged in order, with the given options
    pub fn load_merged<P: AsRef<Path>>(paths: &[P], options: &RegistryOptions) -> Result<Self> {
        Self::from_raw(&RawStore::load_merged(paths)?, options)
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Iterate entries in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, CorpusEntry> {
        self.entries.iter()
    }

    /// Fetch one entry by corpus identifier
    pub fn get(&self, id: &str) -> Result<&CorpusEntry> {
        self.index
            .get(&normalize(id))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| {
                Error::not_found(id).with_help(format!(
                    "Known corpora: {}",
                    self.names().collect::<Vec<_>>().join(", ")
                ))
            })
    }

    /// Whether a corpus is registered
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&normalize(id))
    }

    /// Corpus identifiers in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved global defaults (empty if the section is not declared)
    pub fn globals(&self) -> &Section {
        &self.globals
    }

    /// One resolved global default
    pub fn global(&self, key: &str) -> Result<&str> {
        self.globals
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::not_found(format!("global default '{}'", key)))
    }
}

impl<'a> IntoIterator for &'a CorpusRegistry {
    type Item = &'a CorpusEntry;
    type IntoIter = std::slice::Iter<'a, CorpusEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
