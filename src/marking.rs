//! Markings: the annotations an engine produces or a gold standard expects.
//!
//! The variants are structurally nested supersets:
//!
//! ```text
//! Span ──────────┬── TypedSpan ──────────┐
//!   (start, len) │     + types           ├── TypedNamedEntity
//!                └── MeaningSpan ────────┘     span + types + uris
//! Meaning ───────────  + uris
//!   (uris only)
//! ```
//!
//! Evaluators never care which concrete variant an engine returned. They ask
//! for a projection (`as_span`, `as_typed_span`, ...) and get `None` when the
//! marking lacks the required fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A character range within a document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start character offset (inclusive).
    pub start: usize,
    /// Number of characters.
    pub length: usize,
}

impl Span {
    /// Create a span from an offset and a length.
    #[must_use]
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// End character offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// Whether the two spans share at least one character.
    ///
    /// An empty span shares no character with anything.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start.max(other.start) < self.end().min(other.end())
    }

    /// Character overlap ratio (intersection over union).
    ///
    /// Two identical empty spans have a ratio of 1.0.
    #[must_use]
    pub fn overlap_ratio(&self, other: &Span) -> f64 {
        if self == other {
            return 1.0;
        }
        let intersection_start = self.start.max(other.start);
        let intersection_end = self.end().min(other.end());
        if intersection_start >= intersection_end {
            return 0.0;
        }
        let intersection = (intersection_end - intersection_start) as f64;
        let union = self.length as f64 + other.length as f64 - intersection;
        intersection / union
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.length)
    }
}

/// A span with a set of type URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedSpan {
    /// Position.
    pub span: Span,
    /// Type URIs.
    pub types: BTreeSet<String>,
}

impl TypedSpan {
    /// Create a typed span.
    pub fn new<I, S>(start: usize, length: usize, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            span: Span::new(start, length),
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

/// A reference to one entity of a knowledge base, without a position.
///
/// The same entity may be known under several URIs (e.g. `owl:sameAs`
/// aliases), hence the set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meaning {
    /// Knowledge-base URIs.
    pub uris: BTreeSet<String>,
}

impl Meaning {
    /// Create a meaning referencing a single URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uris: std::iter::once(uri.into()).collect(),
        }
    }

    /// Create a meaning with several equivalent URIs.
    pub fn with_uris<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: uris.into_iter().map(Into::into).collect(),
        }
    }
}

/// A linked mention: position plus knowledge-base URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeaningSpan {
    /// Position.
    pub span: Span,
    /// Knowledge-base URIs.
    pub uris: BTreeSet<String>,
}

impl MeaningSpan {
    /// Create a linked mention referencing a single URI.
    pub fn new(start: usize, length: usize, uri: impl Into<String>) -> Self {
        Self {
            span: Span::new(start, length),
            uris: std::iter::once(uri.into()).collect(),
        }
    }
}

/// A typed, linked mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedNamedEntity {
    /// Position.
    pub span: Span,
    /// Knowledge-base URIs.
    pub uris: BTreeSet<String>,
    /// Type URIs.
    pub types: BTreeSet<String>,
}

impl TypedNamedEntity {
    /// Create a typed, linked mention referencing a single URI.
    pub fn new<I, S>(start: usize, length: usize, uri: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            span: Span::new(start, length),
            uris: std::iter::once(uri.into()).collect(),
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

/// Any annotation over a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marking {
    /// Recognized mention.
    Span(Span),
    /// Typed mention.
    TypedSpan(TypedSpan),
    /// Position-free entity reference.
    Meaning(Meaning),
    /// Linked mention.
    MeaningSpan(MeaningSpan),
    /// Typed, linked mention.
    TypedNamedEntity(TypedNamedEntity),
}

impl Marking {
    /// Short variant name, used in logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Marking::Span(_) => "Span",
            Marking::TypedSpan(_) => "TypedSpan",
            Marking::Meaning(_) => "Meaning",
            Marking::MeaningSpan(_) => "MeaningSpan",
            Marking::TypedNamedEntity(_) => "TypedNamedEntity",
        }
    }

    /// Position, if the marking has one.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Marking::Span(s) => Some(*s),
            Marking::TypedSpan(t) => Some(t.span),
            Marking::Meaning(_) => None,
            Marking::MeaningSpan(m) => Some(m.span),
            Marking::TypedNamedEntity(e) => Some(e.span),
        }
    }

    /// Type URIs, if the marking carries types.
    #[must_use]
    pub fn types(&self) -> Option<&BTreeSet<String>> {
        match self {
            Marking::TypedSpan(t) => Some(&t.types),
            Marking::TypedNamedEntity(e) => Some(&e.types),
            _ => None,
        }
    }

    /// Knowledge-base URIs, if the marking carries a meaning.
    #[must_use]
    pub fn uris(&self) -> Option<&BTreeSet<String>> {
        match self {
            Marking::Meaning(m) => Some(&m.uris),
            Marking::MeaningSpan(m) => Some(&m.uris),
            Marking::TypedNamedEntity(e) => Some(&e.uris),
            _ => None,
        }
    }

    /// Project to a plain span.
    #[must_use]
    pub fn as_span(&self) -> Option<Span> {
        self.span()
    }

    /// Project to a typed span.
    #[must_use]
    pub fn as_typed_span(&self) -> Option<TypedSpan> {
        Some(TypedSpan {
            span: self.span()?,
            types: self.types()?.clone(),
        })
    }

    /// Project to a position-free meaning.
    #[must_use]
    pub fn as_meaning(&self) -> Option<Meaning> {
        Some(Meaning {
            uris: self.uris()?.clone(),
        })
    }

    /// Project to a linked mention.
    #[must_use]
    pub fn as_meaning_span(&self) -> Option<MeaningSpan> {
        Some(MeaningSpan {
            span: self.span()?,
            uris: self.uris()?.clone(),
        })
    }

    /// Project to a typed, linked mention.
    #[must_use]
    pub fn as_typed_named_entity(&self) -> Option<TypedNamedEntity> {
        match self {
            Marking::TypedNamedEntity(e) => Some(e.clone()),
            _ => None,
        }
    }
}

impl From<Span> for Marking {
    fn from(s: Span) -> Self {
        Marking::Span(s)
    }
}

impl From<TypedSpan> for Marking {
    fn from(t: TypedSpan) -> Self {
        Marking::TypedSpan(t)
    }
}

impl From<Meaning> for Marking {
    fn from(m: Meaning) -> Self {
        Marking::Meaning(m)
    }
}

impl From<MeaningSpan> for Marking {
    fn from(m: MeaningSpan) -> Self {
        Marking::MeaningSpan(m)
    }
}

impl From<TypedNamedEntity> for Marking {
    fn from(e: TypedNamedEntity) -> Self {
        Marking::TypedNamedEntity(e)
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marking::Span(s) => write!(f, "{s}"),
            Marking::TypedSpan(t) => write!(f, "{} types=[{}]", t.span, join(&t.types)),
            Marking::Meaning(m) => write!(f, "uris=[{}]", join(&m.uris)),
            Marking::MeaningSpan(m) => write!(f, "{} uris=[{}]", m.span, join(&m.uris)),
            Marking::TypedNamedEntity(e) => write!(
                f,
                "{} uris=[{}] types=[{}]",
                e.span,
                join(&e.uris),
                join(&e.types)
            ),
        }
    }
}
