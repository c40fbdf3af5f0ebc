//! A scripted annotator for tests and dry runs.

use super::{Annotator, Capability, CapabilitySet};
use crate::document::Document;
use crate::marking::{Marking, Meaning, MeaningSpan, Span, TypedNamedEntity, TypedSpan};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Annotator that answers from a table keyed by document URI.
///
/// Every capability call projects the scripted markings to the variant the
/// capability returns (a `TypedNamedEntity` answers a recognition call with
/// its span). Documents without a script get an empty answer.
///
/// # Example
///
/// ```rust
/// use annobench::annotator::{Annotator, Capability, CapabilitySet, MockAnnotator};
/// use annobench::{Document, Span};
///
/// let mut mock = MockAnnotator::new("mock", CapabilitySet::of(&[Capability::Recognition]))
///     .with_markings("doc-0", vec![Span::new(0, 13).into()])
///     .failing_on("doc-1");
///
/// let spans = mock.perform_recognition(&Document::new("Amy Winehouse", "doc-0")).unwrap();
/// assert_eq!(spans, vec![Span::new(0, 13)]);
/// assert!(mock.perform_recognition(&Document::new("...", "doc-1")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockAnnotator {
    name: String,
    capabilities: CapabilitySet,
    responses: HashMap<String, Vec<Marking>>,
    failing: HashSet<String>,
    fail_always: bool,
    calls: usize,
}

impl MockAnnotator {
    /// Create a mock exposing `capabilities`.
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            name: name.into(),
            capabilities,
            responses: HashMap::new(),
            failing: HashSet::new(),
            fail_always: false,
            calls: 0,
        }
    }

    /// Answer calls for `document_uri` with `markings`.
    #[must_use]
    pub fn with_markings(mut self, document_uri: impl Into<String>, markings: Vec<Marking>) -> Self {
        self.responses.insert(document_uri.into(), markings);
        self
    }

    /// Script answers from documents, keyed by their URIs.
    #[must_use]
    pub fn with_documents(mut self, documents: &[Document]) -> Self {
        for doc in documents {
            self.responses
                .insert(doc.uri().to_string(), doc.markings().to_vec());
        }
        self
    }

    /// Fail every call for `document_uri`.
    #[must_use]
    pub fn failing_on(mut self, document_uri: impl Into<String>) -> Self {
        self.failing.insert(document_uri.into());
        self
    }

    /// Fail every call.
    #[must_use]
    pub fn failing_always(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Calls received so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn respond<T>(
        &mut self,
        capability: Capability,
        document: &Document,
        project: impl Fn(&Marking) -> Option<T>,
    ) -> Result<Vec<T>> {
        if !self.capabilities.contains(capability) {
            return Err(Error::unsupported(&self.name, capability));
        }
        self.calls += 1;
        if self.fail_always || self.failing.contains(document.uri()) {
            return Err(Error::annotation(format!(
                "{} failed on {}",
                self.name,
                document.uri()
            )));
        }
        Ok(self
            .responses
            .get(document.uri())
            .map(|markings| markings.iter().filter_map(&project).collect())
            .unwrap_or_default())
    }
}

impl Annotator for MockAnnotator {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn perform_recognition(&mut self, document: &Document) -> Result<Vec<Span>> {
        self.respond(Capability::Recognition, document, Marking::as_span)
    }

    fn perform_typing(&mut self, document: &Document) -> Result<Vec<TypedSpan>> {
        self.respond(Capability::Typing, document, Marking::as_typed_span)
    }

    fn perform_linking(&mut self, document: &Document) -> Result<Vec<MeaningSpan>> {
        self.respond(Capability::Linking, document, Marking::as_meaning_span)
    }

    fn perform_extraction(&mut self, document: &Document) -> Result<Vec<MeaningSpan>> {
        self.respond(Capability::Extraction, document, Marking::as_meaning_span)
    }

    fn perform_concept_linking(&mut self, document: &Document) -> Result<Vec<Meaning>> {
        self.respond(Capability::ConceptLinking, document, Marking::as_meaning)
    }

    fn perform_oke_task1(&mut self, document: &Document) -> Result<Vec<TypedNamedEntity>> {
        self.respond(Capability::OkeTask1, document, Marking::as_typed_named_entity)
    }

    fn perform_oke_task2(&mut self, document: &Document) -> Result<Vec<TypedNamedEntity>> {
        self.respond(Capability::OkeTask2, document, Marking::as_typed_named_entity)
    }
}
