//! # annobench
//!
//! Benchmarking entity annotation engines against gold standards.
//!
//! - **Engines**: one [`Annotator`](annotator::Annotator) trait, a method per
//!   capability (recognition, typing, linking, extraction, concept linking,
//!   OKE tasks)
//! - **Decorators**: error counting and time measurement wrap any engine and
//!   stack in either order
//! - **Evaluation**: strong, weak and proportional matching; micro and macro
//!   precision, recall and F1; subtask averaging for composite experiments
//!
//! ## Quick Start
//!
//! ```rust
//! use annobench::annotator::{Capability, CapabilitySet, ExperimentType, MockAnnotator};
//! use annobench::config::EvalConfig;
//! use annobench::eval::ExperimentTask;
//! use annobench::{Document, MeaningSpan, Span};
//!
//! let gold = vec![Document::with_markings(
//!     "Amy Winehouse is dead after a suspected drug overdose",
//!     "doc-0",
//!     vec![MeaningSpan::new(0, 13, "http://dbpedia.org/resource/Amy_Winehouse").into()],
//! )];
//! let engine = MockAnnotator::new("demo", CapabilitySet::of(&[Capability::Recognition]))
//!     .with_markings("doc-0", vec![Span::new(0, 13).into()]);
//!
//! let task = ExperimentTask::new("demo-task", ExperimentType::ERec, EvalConfig::default());
//! let results = task.run(engine, &gold).unwrap();
//! assert_eq!(results.value("Micro F1 score"), Some(1.0));
//! assert_eq!(results.value("error count"), Some(0.0));
//! ```
//!
//! ## Experiment Types
//!
//! | Type | Engine call | Evaluated on |
//! |------|-------------|--------------|
//! | ERec | recognition | spans |
//! | ETyping | typing (spans given) | typed spans |
//! | D2KB | linking (spans given) | linked spans |
//! | C2KB | concept linking | meanings |
//! | A2KB | extraction | spans + linked spans |
//! | OKE_Task1 | OKE task 1 | spans + linked spans + typed spans |
//! | OKE_Task2 | OKE task 2 (spans given) | typed named entities |
//!
//! ## Logging
//!
//! Uses the `log` facade. No logger is installed; binaries and tests pick
//! their own.

#![warn(missing_docs)]

pub mod annotator;
pub mod config;
mod document;
mod error;
pub mod eval;
mod marking;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use annobench::prelude::*;
    //!
    //! let engine = MockAnnotator::new("m", CapabilitySet::of(&[Capability::Recognition]));
    //! let task = ExperimentTask::new("t", ExperimentType::ERec, EvalConfig::default());
    //! let results = task.run(engine, &[]).unwrap();
    //! assert!(results.value("Macro F1 score").unwrap().is_nan());
    //! ```
    pub use crate::annotator::{
        Annotator, Capability, CapabilitySet, ExperimentType, MockAnnotator,
    };
    pub use crate::config::EvalConfig;
    pub use crate::error::{Error, Result};
    pub use crate::eval::{
        EvaluationResult, EvaluationResultContainer, Evaluator, ExperimentTask, Matching,
    };
    pub use crate::{Document, Marking, Meaning, MeaningSpan, Span, TypedNamedEntity, TypedSpan};
}

// Re-exports
pub use document::Document;
pub use error::{Error, ErrorKind, Result};
pub use marking::{Marking, Meaning, MeaningSpan, Span, TypedNamedEntity, TypedSpan};
