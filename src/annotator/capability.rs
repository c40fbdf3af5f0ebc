//! Capabilities an annotation engine may expose, and which experiment types
//! need which of them.
//!
//! # The lattice
//!
//! ```text
//!                       OKE_Task1
//!                ┌──────────┴───────────┐
//!              A2KB                   Typing
//!   ┌─────────┬──┴──────┬──────────┐
//! Recognition Linking ConceptLinking Extraction
//! ```
//!
//! Composite experiment types need several capabilities at once. A decorator
//! does not get a dedicated type per combination: it carries a
//! [`CapabilitySet`] and checks membership at call time.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One annotation operation an engine may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    /// text → spans
    Recognition,
    /// text + spans → typed spans
    Typing,
    /// text + spans → linked spans (D2KB)
    Linking,
    /// text → linked spans, recognition and linking in one call (A2KB)
    Extraction,
    /// text → position-free meanings (C2KB)
    ConceptLinking,
    /// OKE challenge task 1: recognize, link and type entities in one call.
    OkeTask1,
    /// OKE challenge task 2: type induction for a given entity.
    OkeTask2,
}

impl Capability {
    /// All capabilities in declaration order.
    pub fn all() -> &'static [Capability] {
        &[
            Capability::Recognition,
            Capability::Typing,
            Capability::Linking,
            Capability::Extraction,
            Capability::ConceptLinking,
            Capability::OkeTask1,
            Capability::OkeTask2,
        ]
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Recognition => "Entity Recognition",
            Capability::Typing => "Entity Typing",
            Capability::Linking => "Disambiguation",
            Capability::Extraction => "Extraction",
            Capability::ConceptLinking => "Concept Linking",
            Capability::OkeTask1 => "OKE Task 1",
            Capability::OkeTask2 => "OKE Task 2",
        }
    }

    /// Whether the capability bundles several base operations into one call.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Capability::OkeTask1 | Capability::OkeTask2)
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of capabilities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from a slice.
    #[must_use]
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < capabilities.len() {
            bits |= capabilities[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Add a capability.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Membership test.
    #[must_use]
    pub const fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Whether every capability of `other` is in `self`.
    #[must_use]
    pub const fn contains_all(&self, other: CapabilitySet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: CapabilitySet) -> Self {
        Self(self.0 | other.0)
    }

    /// Capabilities of `self` that are not in `other`.
    #[must_use]
    pub const fn difference(self, other: CapabilitySet) -> Self {
        Self(self.0 & !other.0)
    }

    /// Number of capabilities.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::all().iter().copied().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), CapabilitySet::with)
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

const A2KB_CAPABILITIES: CapabilitySet = CapabilitySet::of(&[
    Capability::ConceptLinking,
    Capability::Linking,
    Capability::Recognition,
    Capability::Extraction,
]);

/// Benchmark experiment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentType {
    /// Concepts to knowledge base: position-free entity linking.
    C2KB,
    /// Disambiguate given mentions to knowledge base.
    D2KB,
    /// Annotate (recognize and link) to knowledge base.
    A2KB,
    /// Entity recognition.
    ERec,
    /// Entity typing of given mentions.
    ETyping,
    /// OKE challenge task 1.
    #[serde(rename = "OKE_Task1")]
    OkeTask1,
    /// OKE challenge task 2.
    #[serde(rename = "OKE_Task2")]
    OkeTask2,
    /// Ranked C2KB. No decorator mapping.
    Rc2KB,
    /// Scored A2KB. No decorator mapping.
    Sa2KB,
    /// Scored C2KB. No decorator mapping.
    Sc2KB,
}

impl ExperimentType {
    /// All experiment types, including the unmapped ones.
    pub fn all() -> &'static [ExperimentType] {
        &[
            ExperimentType::C2KB,
            ExperimentType::D2KB,
            ExperimentType::A2KB,
            ExperimentType::ERec,
            ExperimentType::ETyping,
            ExperimentType::OkeTask1,
            ExperimentType::OkeTask2,
            ExperimentType::Rc2KB,
            ExperimentType::Sa2KB,
            ExperimentType::Sc2KB,
        ]
    }

    /// Short name as used in experiment configurations.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ExperimentType::C2KB => "C2KB",
            ExperimentType::D2KB => "D2KB",
            ExperimentType::A2KB => "A2KB",
            ExperimentType::ERec => "ERec",
            ExperimentType::ETyping => "ETyping",
            ExperimentType::OkeTask1 => "OKE_Task1",
            ExperimentType::OkeTask2 => "OKE_Task2",
            ExperimentType::Rc2KB => "Rc2KB",
            ExperimentType::Sa2KB => "Sa2KB",
            ExperimentType::Sc2KB => "Sc2KB",
        }
    }

    /// Capabilities an engine must expose to run this experiment type.
    pub fn required_capabilities(&self) -> Result<CapabilitySet> {
        match self {
            ExperimentType::C2KB => Ok(CapabilitySet::of(&[Capability::ConceptLinking])),
            ExperimentType::D2KB => Ok(CapabilitySet::of(&[Capability::Linking])),
            ExperimentType::A2KB => Ok(A2KB_CAPABILITIES),
            ExperimentType::ERec => Ok(CapabilitySet::of(&[Capability::Recognition])),
            ExperimentType::ETyping => Ok(CapabilitySet::of(&[Capability::Typing])),
            ExperimentType::OkeTask1 => Ok(A2KB_CAPABILITIES
                .with(Capability::Typing)
                .with(Capability::OkeTask1)),
            ExperimentType::OkeTask2 => Ok(CapabilitySet::of(&[Capability::OkeTask2])),
            ExperimentType::Rc2KB | ExperimentType::Sa2KB | ExperimentType::Sc2KB => {
                Err(self.unmapped())
            }
        }
    }

    /// The capability a task of this type calls once per document.
    pub fn primary_capability(&self) -> Result<Capability> {
        match self {
            ExperimentType::C2KB => Ok(Capability::ConceptLinking),
            ExperimentType::D2KB => Ok(Capability::Linking),
            ExperimentType::A2KB => Ok(Capability::Extraction),
            ExperimentType::ERec => Ok(Capability::Recognition),
            ExperimentType::ETyping => Ok(Capability::Typing),
            ExperimentType::OkeTask1 => Ok(Capability::OkeTask1),
            ExperimentType::OkeTask2 => Ok(Capability::OkeTask2),
            ExperimentType::Rc2KB | ExperimentType::Sa2KB | ExperimentType::Sc2KB => {
                Err(self.unmapped())
            }
        }
    }

    /// Whether the engine is given the gold positions as input.
    #[must_use]
    pub fn uses_span_hints(&self) -> bool {
        matches!(
            self,
            ExperimentType::D2KB | ExperimentType::ETyping | ExperimentType::OkeTask2
        )
    }

    fn unmapped(&self) -> Error {
        Error::configuration(format!(
            "experiment type {} has no capability mapping",
            self.name()
        ))
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
