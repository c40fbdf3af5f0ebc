//! Evaluation: matching produced markings against gold markings.
//!
//! # Overview
//!
//! ```text
//! produced[doc]  gold[doc]
//!      │             │
//!      └──── MatchingsCounter (level + policy) ───► MatchingCount per doc
//!                                                        │
//!                          FMeasureCalculator ◄──────────┘
//!                                  │
//!                   Micro/Macro Precision, Recall, F1 ──► EvaluationResultContainer
//! ```
//!
//! Composite experiments evaluate several levels at once through
//! [`SubTaskAverageCalculator`], which reports every subtask in its own
//! container and averages the result names all subtasks share.
//!
//! # Matching policies
//!
//! | Policy | Credit for a pair |
//! |--------|-------------------|
//! | [`Matching::StrongAnnotationMatch`] | 1 if positions are identical |
//! | [`Matching::WeakAnnotationMatch`] | 1 if positions overlap |
//! | [`Matching::ProportionalOverlap`] | overlap ratio of the positions |
//!
//! In every policy the attributes of the level (types, URIs) must match too.
//!
//! # Example
//!
//! ```rust
//! use annobench::eval::{Evaluator, EvaluationResultContainer, FMeasureCalculator, MarkingLevel, Matching};
//! use annobench::Span;
//!
//! let evaluator = FMeasureCalculator::new(MarkingLevel::Span, Matching::StrongAnnotationMatch);
//! let produced = vec![vec![Span::new(0, 13).into()]];
//! let gold = vec![vec![Span::new(0, 13).into()]];
//!
//! let mut results = EvaluationResultContainer::new();
//! evaluator.evaluate(&produced, &gold, &mut results).unwrap();
//! assert_eq!(results.value("Micro F1 score"), Some(1.0));
//! ```

pub mod experiment;
pub mod factory;
pub mod fmeasure;
pub mod matching;
pub mod result;
pub mod subtask;

pub use experiment::ExperimentTask;
pub use factory::evaluator_for;
pub use fmeasure::{
    macro_f_measure, micro_f_measure, FMeasure, FMeasureCalculator, MACRO_F1_NAME,
    MACRO_PRECISION_NAME, MACRO_RECALL_NAME, MICRO_F1_NAME, MICRO_PRECISION_NAME,
    MICRO_RECALL_NAME,
};
pub use matching::{MarkingLevel, Matching, MatchingCount, MatchingsCounter};
pub use result::{EvaluationResult, EvaluationResultContainer};
pub use subtask::{SubTaskAverageCalculator, SubTaskEvaluator};

use crate::marking::Marking;
use crate::{Error, Result};

/// Anything that turns produced and gold markings into named results.
///
/// `produced[i]` and `gold[i]` belong to the same document.
pub trait Evaluator {
    /// Evaluate and append results to `results`.
    fn evaluate(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
        results: &mut EvaluationResultContainer,
    ) -> Result<()>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
        results: &mut EvaluationResultContainer,
    ) -> Result<()> {
        (**self).evaluate(produced, gold, results)
    }
}

/// Produced and gold lists must describe the same documents.
pub(crate) fn check_aligned(produced: &[Vec<Marking>], gold: &[Vec<Marking>]) -> Result<()> {
    if produced.len() != gold.len() {
        return Err(Error::invalid_input(format!(
            "got results for {} documents but {} gold standard documents",
            produced.len(),
            gold.len()
        )));
    }
    Ok(())
}
