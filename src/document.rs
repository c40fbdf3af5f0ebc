//! Documents handed to annotation engines and gold standards.

use crate::marking::Marking;
use serde::{Deserialize, Serialize};

/// A text with an identifier and the markings attached to it.
///
/// Documents are never modified by decorators or evaluators; everything that
/// derives new markings returns a new `Document` or a new marking list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    uri: String,
    text: String,
    #[serde(default)]
    markings: Vec<Marking>,
}

impl Document {
    /// Create a document without markings.
    pub fn new(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
            markings: Vec::new(),
        }
    }

    /// Create a document with markings.
    pub fn with_markings(
        text: impl Into<String>,
        uri: impl Into<String>,
        markings: Vec<Marking>,
    ) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
            markings,
        }
    }

    /// Document identifier.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attached markings.
    #[must_use]
    pub fn markings(&self) -> &[Marking] {
        &self.markings
    }

    /// Copy of this document whose markings are reduced to plain spans.
    ///
    /// Typing and linking engines receive such a document: the positions are
    /// given, the types and meanings are what the engine has to produce.
    /// Position-free markings are dropped.
    #[must_use]
    pub fn with_span_hints(&self) -> Self {
        Self {
            uri: self.uri.clone(),
            text: self.text.clone(),
            markings: self
                .markings
                .iter()
                .filter_map(Marking::as_span)
                .map(Marking::Span)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marking::{Meaning, MeaningSpan, Span};

    #[test]
    fn test_span_hints_strip_meanings() {
        let doc = Document::with_markings(
            "Berlin is a city.",
            "doc-0",
            vec![
                MeaningSpan::new(0, 6, "http://dbpedia.org/resource/Berlin").into(),
                Meaning::new("http://dbpedia.org/resource/Germany").into(),
            ],
        );
        let hinted = doc.with_span_hints();
        assert_eq!(hinted.markings(), &[Marking::Span(Span::new(0, 6))]);
        assert_eq!(hinted.text(), doc.text());
        assert_eq!(hinted.uri(), "doc-0");
        // original untouched
        assert_eq!(doc.markings().len(), 2);
    }
}
