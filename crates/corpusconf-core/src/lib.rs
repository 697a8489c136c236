//! corpusconf-core: Corpus metadata registry with interpolation support
//!
//! This crate turns section-delimited `key = value` text describing linguistic
//! corpora into a validated, immutable registry. Values may reference other
//! values with `${key}` (same section) or `${section:key}` placeholders.
//!
//! # Example
//!
//! ```rust
//! use corpusconf_core::CorpusRegistry;
//!
//! let ini = r#"
//! [.global]
//! corpora_dir = corpora
//!
//! [Chintang]
//! iso_639_3 = ctn
//! glottolog_code = chhi1245
//! language = Chintang
//! corpus = Chintang
//! owner = Bickel, Balthasar; Stoll, Sabine
//! name = Chintang Language Corpus
//! license = CC BY-NC-SA
//! format = toolbox
//! sessions = ${.global:corpora_dir}/Chintang/${format}/*.txt
//! "#;
//!
//! let registry = CorpusRegistry::from_ini_str(ini).unwrap();
//! let chintang = registry.get("Chintang").unwrap();
//! assert_eq!(chintang.sessions, "corpora/Chintang/toolbox/*.txt");
//! ```

pub mod error;
pub mod interpolation;
pub mod registry;
pub mod resolver;
pub mod store;

mod ini;

pub use error::{Error, ErrorKind, Result};
pub use registry::{CorpusEntry, CorpusRegistry, RegistryOptions};
pub use resolver::{ResolvedStore, Resolver};
pub use store::{RawStore, Section};
