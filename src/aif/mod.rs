//! AIF graph: an indexed, read-only view of an AIDA Interchange Format file.
//!
//! - **Loading** ([`turtle`]): Turtle is parsed with `oxigraph` and copied into
//!   a plain triple index, so blank nodes stay addressable.
//! - **Index** ([`AifGraph`]): subject/predicate and predicate/object lookups
//!   with the uniqueness checks AIF relies on.
//! - **Vocabulary** ([`vocab`]): RDF and AIDA ontology terms, resolved against
//!   the namespace the file declares.

pub mod index;
pub mod turtle;
pub mod vocab;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AifError;

pub use index::AifGraph;
pub use turtle::{load, parse_turtle};
pub use vocab::{Vocab, Vocabulary};

/// Result type for AIF graph operations.
pub type AifResult<T> = std::result::Result<T, AifError>;

/// An RDF term as it appears in an AIF graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    /// A named node (IRI).
    Iri(String),
    /// A blank node, by its label.
    Blank(String),
    /// A literal with its datatype IRI.
    Literal { value: String, datatype: String },
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// The IRI, blank node label, or literal lexical value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::Blank(label) => label,
            Self::Literal { value, .. } => value,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Short display name: the IRI local name, or the raw value for other terms.
    pub fn local_name(&self) -> &str {
        match self {
            Self::Iri(iri) => local_name(iri),
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => f.write_str(iri),
            Self::Blank(label) => write!(f, "_:{label}"),
            Self::Literal { value, .. } => f.write_str(value),
        }
    }
}

/// Text after the last `#`, else after the last `/`, else the whole IRI.
pub fn local_name(iri: &str) -> &str {
    if let Some(pos) = iri.rfind('#') {
        return &iri[pos + 1..];
    }
    match iri.rfind('/') {
        Some(pos) => &iri[pos + 1..],
        None => iri,
    }
}
