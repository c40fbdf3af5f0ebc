//! The annotation engine contract and the decorators that wrap it.
//!
//! An engine implements [`Annotator`] and overrides the `perform_*` methods
//! of the capabilities it supports; the remaining methods keep their default,
//! which reports [`Error::UnsupportedCapability`]. What an engine supports is
//! advertised through [`Annotator::capabilities`], so callers can check
//! before calling.
//!
//! # Decorators
//!
//! | Decorator | Aspect | Result contributed |
//! |-----------|--------|--------------------|
//! | [`ErrorCountingAnnotator`] | [`ErrorCounting`] | `"error count"` |
//! | [`TimeMeasuringAnnotator`] | [`TimeMeasuring`] | `"avg millis/doc"` |
//!
//! Both are the same generic [`Decorated`] wrapper with a different aspect,
//! and both implement [`Annotator`] themselves, so they stack in either order.

pub mod capability;
pub mod decorator;
pub mod mock;
pub mod resilience;
pub mod timing;

pub use capability::{Capability, CapabilitySet, ExperimentType};
pub use decorator::{create_decorator, Aspect, CallOutcome, Decorated};
pub use mock::MockAnnotator;
pub use resilience::{
    create_error_counting_decorator, create_error_counting_decorator_with_tolerance,
    max_errors_for, ErrorCounting, ErrorCountingAnnotator, DEFAULT_TOLERATED_ERROR_FRACTION,
    ERROR_COUNT_RESULT_NAME,
};
pub use timing::{
    create_time_measuring_decorator, TimeMeasuring, TimeMeasuringAnnotator, AVG_TIME_RESULT_NAME,
};

use crate::document::Document;
use crate::marking::{Marking, Meaning, MeaningSpan, Span, TypedNamedEntity, TypedSpan};
use crate::{Error, Result};

/// An annotation engine.
///
/// Calls take `&mut self`: engines (and the decorators around them) are used
/// by one task at a time and may keep per-task state.
pub trait Annotator {
    /// Engine name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Capabilities this engine supports.
    fn capabilities(&self) -> CapabilitySet;

    /// Find entity mentions.
    fn perform_recognition(&mut self, _document: &Document) -> Result<Vec<Span>> {
        Err(Error::unsupported(self.name(), Capability::Recognition))
    }

    /// Type the mentions given as span markings of the document.
    fn perform_typing(&mut self, _document: &Document) -> Result<Vec<TypedSpan>> {
        Err(Error::unsupported(self.name(), Capability::Typing))
    }

    /// Link the mentions given as span markings of the document.
    fn perform_linking(&mut self, _document: &Document) -> Result<Vec<MeaningSpan>> {
        Err(Error::unsupported(self.name(), Capability::Linking))
    }

    /// Find and link entity mentions in one call.
    fn perform_extraction(&mut self, _document: &Document) -> Result<Vec<MeaningSpan>> {
        Err(Error::unsupported(self.name(), Capability::Extraction))
    }

    /// Find the entities a document talks about, without positions.
    fn perform_concept_linking(&mut self, _document: &Document) -> Result<Vec<Meaning>> {
        Err(Error::unsupported(self.name(), Capability::ConceptLinking))
    }

    /// OKE task 1: recognize, link and type.
    fn perform_oke_task1(&mut self, _document: &Document) -> Result<Vec<TypedNamedEntity>> {
        Err(Error::unsupported(self.name(), Capability::OkeTask1))
    }

    /// OKE task 2: type induction for the given entities.
    fn perform_oke_task2(&mut self, _document: &Document) -> Result<Vec<TypedNamedEntity>> {
        Err(Error::unsupported(self.name(), Capability::OkeTask2))
    }

    /// Call the operation for `capability` and return generic markings.
    fn perform(&mut self, capability: Capability, document: &Document) -> Result<Vec<Marking>> {
        fn widen<T: Into<Marking>>(markings: Vec<T>) -> Vec<Marking> {
            markings.into_iter().map(Into::into).collect()
        }
        match capability {
            Capability::Recognition => self.perform_recognition(document).map(widen),
            Capability::Typing => self.perform_typing(document).map(widen),
            Capability::Linking => self.perform_linking(document).map(widen),
            Capability::Extraction => self.perform_extraction(document).map(widen),
            Capability::ConceptLinking => self.perform_concept_linking(document).map(widen),
            Capability::OkeTask1 => self.perform_oke_task1(document).map(widen),
            Capability::OkeTask2 => self.perform_oke_task2(document).map(widen),
        }
    }
}

impl<A: Annotator + ?Sized> Annotator for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&self) -> CapabilitySet {
        (**self).capabilities()
    }

    fn perform_recognition(&mut self, document: &Document) -> Result<Vec<Span>> {
        (**self).perform_recognition(document)
    }

    fn perform_typing(&mut self, document: &Document) -> Result<Vec<TypedSpan>> {
        (**self).perform_typing(document)
    }

    fn perform_linking(&mut self, document: &Document) -> Result<Vec<MeaningSpan>> {
        (**self).perform_linking(document)
    }

    fn perform_extraction(&mut self, document: &Document) -> Result<Vec<MeaningSpan>> {
        (**self).perform_extraction(document)
    }

    fn perform_concept_linking(&mut self, document: &Document) -> Result<Vec<Meaning>> {
        (**self).perform_concept_linking(document)
    }

    fn perform_oke_task1(&mut self, document: &Document) -> Result<Vec<TypedNamedEntity>> {
        (**self).perform_oke_task1(document)
    }

    fn perform_oke_task2(&mut self, document: &Document) -> Result<Vec<TypedNamedEntity>> {
        (**self).perform_oke_task2(document)
    }
}
