//! One generic decorator for every capability combination.
//!
//! Experiment types need different capability combinations (A2KB needs four,
//! OKE task 1 six). [`Decorated`] covers all of them with three fields:
//!
//! ```text
//! ┌──────────────────── Decorated<A, X> ────────────────────┐
//! │  inner: A              the raw (or already wrapped)     │
//! │                        engine                           │
//! │  capabilities          what this wrapper exposes        │
//! │  aspect: X             error counting, timing, ...      │
//! └─────────────────────────────────────────────────────────┘
//!
//! perform_typing(doc)
//!     │
//!     ├── Typing ∉ capabilities ──► Err(UnsupportedCapability)
//!     │
//!     └── aspect.apply(|| inner.perform_typing(doc))
//!             │
//!             ├── Completed(v)        ──► Ok(v)
//!             ├── Substituted{v, e}   ──► Ok(v)     (e was logged, counted)
//!             ├── Failed(e)           ──► Err(e)    (passed through)
//!             └── Aborted(e)          ──► Err(e)    (task must stop)
//! ```
//!
//! Every capability method is a one-line call to the same `invoke`.

use super::{Annotator, Capability, CapabilitySet, ExperimentType};
use crate::document::Document;
use crate::eval::{EvaluationResultContainer, Evaluator};
use crate::marking::{Marking, Meaning, MeaningSpan, Span, TypedNamedEntity, TypedSpan};
use crate::{Error, Result};
use std::fmt;

/// What happened to one decorated call.
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// The engine returned a result; it is passed on unchanged.
    Completed(T),
    /// The engine failed; the failure was absorbed and `value` stands in.
    Substituted {
        /// Replacement result.
        value: T,
        /// The absorbed failure.
        error: Error,
    },
    /// The engine failed and the aspect left the error alone.
    Failed(Error),
    /// The task has to be abandoned.
    Aborted(Error),
}

impl<T> CallOutcome<T> {
    /// Collapse into the `Result` a capability method returns.
    pub fn into_result(self) -> Result<T> {
        match self {
            CallOutcome::Completed(value) | CallOutcome::Substituted { value, .. } => Ok(value),
            CallOutcome::Failed(error) | CallOutcome::Aborted(error) => Err(error),
        }
    }

    /// Whether a failure was absorbed.
    #[must_use]
    pub fn is_substituted(&self) -> bool {
        matches!(self, CallOutcome::Substituted { .. })
    }

    /// Whether the task has to be abandoned.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, CallOutcome::Aborted(_))
    }
}

/// A cross-cutting concern applied to every delegated call.
pub trait Aspect {
    /// Run `call` (the delegation to the wrapped engine) under this aspect.
    fn apply<T, F>(&mut self, annotator: &str, capability: Capability, call: F) -> CallOutcome<Vec<T>>
    where
        T: fmt::Debug,
        F: FnOnce() -> Result<Vec<T>>;

    /// Add the named results this aspect reports to `results`.
    fn contribute(&self, results: &mut EvaluationResultContainer) -> Result<()>;
}

/// An engine wrapped with one aspect, exposing a declared capability set.
#[derive(Debug, Clone)]
pub struct Decorated<A, X> {
    inner: A,
    capabilities: CapabilitySet,
    aspect: X,
}

impl<A: Annotator, X: Aspect> Decorated<A, X> {
    /// Wrap `inner`, exposing `capabilities`.
    ///
    /// Fails if the wrapped engine does not advertise every capability the
    /// wrapper is asked to expose.
    pub fn new(inner: A, capabilities: CapabilitySet, aspect: X) -> Result<Self> {
        let missing = capabilities.difference(inner.capabilities());
        if !missing.is_empty() {
            return Err(Error::configuration(format!(
                "annotator {} lacks required capabilities {}",
                inner.name(),
                missing
            )));
        }
        Ok(Self {
            inner,
            capabilities,
            aspect,
        })
    }

    /// The wrapped engine.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// The wrapped engine, mutably.
    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.inner
    }

    /// Unwrap, dropping the aspect state.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// The aspect state.
    pub fn aspect(&self) -> &X {
        &self.aspect
    }

    /// The aspect state, mutably.
    pub fn aspect_mut(&mut self) -> &mut X {
        &mut self.aspect
    }

    fn invoke<T, F>(&mut self, capability: Capability, document: &Document, call: F) -> Result<Vec<T>>
    where
        T: fmt::Debug,
        F: FnOnce(&mut A, &Document) -> Result<Vec<T>>,
    {
        if !self.capabilities.contains(capability) {
            return Err(Error::unsupported(self.inner.name(), capability));
        }
        let Self { inner, aspect, .. } = self;
        let name = inner.name().to_owned();
        aspect
            .apply(&name, capability, || call(inner, document))
            .into_result()
    }
}

impl<A: Annotator, X: Aspect> Annotator for Decorated<A, X> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn perform_recognition(&mut self, document: &Document) -> Result<Vec<Span>> {
        self.invoke(Capability::Recognition, document, A::perform_recognition)
    }

    fn perform_typing(&mut self, document: &Document) -> Result<Vec<TypedSpan>> {
        self.invoke(Capability::Typing, document, A::perform_typing)
    }

    fn perform_linking(&mut self, document: &Document) -> Result<Vec<MeaningSpan>> {
        self.invoke(Capability::Linking, document, A::perform_linking)
    }

    fn perform_extraction(&mut self, document: &Document) -> Result<Vec<MeaningSpan>> {
        self.invoke(Capability::Extraction, document, A::perform_extraction)
    }

    fn perform_concept_linking(&mut self, document: &Document) -> Result<Vec<Meaning>> {
        self.invoke(Capability::ConceptLinking, document, A::perform_concept_linking)
    }

    fn perform_oke_task1(&mut self, document: &Document) -> Result<Vec<TypedNamedEntity>> {
        self.invoke(Capability::OkeTask1, document, A::perform_oke_task1)
    }

    fn perform_oke_task2(&mut self, document: &Document) -> Result<Vec<TypedNamedEntity>> {
        self.invoke(Capability::OkeTask2, document, A::perform_oke_task2)
    }
}

/// Decorators report their aspect's results; the marking lists are ignored.
impl<A: Annotator, X: Aspect> Evaluator for Decorated<A, X> {
    fn evaluate(
        &self,
        _produced: &[Vec<Marking>],
        _gold: &[Vec<Marking>],
        results: &mut EvaluationResultContainer,
    ) -> Result<()> {
        self.aspect.contribute(results)
    }
}

/// Wrap `engine` for `experiment_type` with `aspect`.
///
/// The wrapper exposes exactly the capabilities the experiment type requires.
/// Unmapped experiment types and engines missing a required capability are
/// configuration errors.
pub fn create_decorator<A: Annotator, X: Aspect>(
    experiment_type: ExperimentType,
    engine: A,
    aspect: X,
) -> Result<Decorated<A, X>> {
    let capabilities = experiment_type.required_capabilities()?;
    Decorated::new(engine, capabilities, aspect)
}
