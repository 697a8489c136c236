//! Error types for corpusconf
//!
//! Every error carries a kind, the `section:key` it concerns when there is
//! one, an optional source location, and an actionable help message.

use std::fmt;

/// Result type alias for corpusconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for corpusconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Location in the store where the error occurred (e.g., "Russian:sessions")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error parsing section-delimited text
    Parse,
    /// I/O error (file not found, unreadable, ...)
    Io,
    /// `${` without a closing brace, or an empty reference
    MalformedPlaceholder,
    /// A placeholder names a section or key that does not exist
    UnresolvedReference { reference: String },
    /// A placeholder chain loops back onto itself
    CircularReference { chain: Vec<String> },
    /// A corpus section lacks a mandatory field
    MissingField { section: String, field: String },
    /// Two sections normalize to the same corpus identifier
    DuplicateCorpus { first: String, second: String },
    /// Lookup of a section, key, or corpus that does not exist
    NotFound { name: String },
}

impl Error {
    fn bare(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::bare(ErrorKind::Parse)
        }
    }

    /// Create an I/O error for the given file
    pub fn io(file: impl Into<String>, message: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            help: Some(format!("Check that '{}' exists and is readable", file)),
            cause: Some(message.into()),
            source_location: Some(SourceLocation { file, line: None }),
            ..Self::bare(ErrorKind::Io)
        }
    }

    /// Create a malformed placeholder error
    pub fn malformed_placeholder(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            help: Some("Placeholders are written ${key} or ${section:key}".into()),
            cause: Some(format!("{} in '{}'", message.into(), value.into())),
            ..Self::bare(ErrorKind::MalformedPlaceholder)
        }
    }

    /// Create an unresolved reference error
    pub fn unresolved_reference(reference: impl Into<String>, holder: Option<String>) -> Self {
        let reference = reference.into();
        Self {
            path: holder,
            help: Some(format!(
                "Check that '{}' is declared in the configuration",
                reference
            )),
            ..Self::bare(ErrorKind::UnresolvedReference { reference })
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(path: impl Into<String>, chain: Vec<String>) -> Self {
        let chain_str = chain.join(" → ");
        Self {
            path: Some(path.into()),
            help: Some("Break the circular dependency by removing one of the references".into()),
            cause: Some(format!("Chain: {}", chain_str)),
            ..Self::bare(ErrorKind::CircularReference { chain })
        }
    }

    /// Create a missing field error
    pub fn missing_field(section: impl Into<String>, field: impl Into<String>) -> Self {
        let section = section.into();
        let field = field.into();
        Self {
            path: Some(section.clone()),
            help: Some(format!("Add '{} = ...' to section [{}]", field, section)),
            ..Self::bare(ErrorKind::MissingField { section, field })
        }
    }

    /// Create a duplicate corpus error
    pub fn duplicate_corpus(first: impl Into<String>, second: impl Into<String>) -> Self {
        let first = first.into();
        let second = second.into();
        Self {
            path: Some(second.clone()),
            help: Some(format!(
                "Rename or remove one of [{}] and [{}]; corpus names are compared without case",
                first, second
            )),
            ..Self::bare(ErrorKind::DuplicateCorpus { first, second })
        }
    }

    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            help: Some(format!("Check that '{}' exists in the configuration", name)),
            ..Self::bare(ErrorKind::NotFound { name })
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Attach a file name, keeping any line already recorded
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        let line = self.source_location.as_ref().and_then(|loc| loc.line);
        self.source_location = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::MalformedPlaceholder => write!(f, "Malformed placeholder")?,
            ErrorKind::UnresolvedReference { reference } => {
                write!(f, "Unresolved reference: {}", reference)?
            }
            ErrorKind::CircularReference { .. } => write!(f, "Circular reference detected")?,
            ErrorKind::MissingField { section, field } => {
                write!(f, "Missing field '{}' in section [{}]", field, section)?
            }
            ErrorKind::DuplicateCorpus { first, second } => {
                write!(f, "Duplicate corpus: [{}] collides with [{}]", second, first)?
            }
            ErrorKind::NotFound { name } => write!(f, "Not found: {}", name)?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
