//! Precision, recall and F1, micro and macro averaged.
//!
//! | Count (TP, FP, FN) | Precision | Recall | F1 |
//! |--------------------|-----------|--------|----|
//! | (0, 0, 0) | 1.0 | 1.0 | 1.0 |
//! | TP = 0, FP + FN > 0 | 0.0 | 0.0 | 0.0 |
//! | otherwise | TP/(TP+FP) | TP/(TP+FN) | 2PR/(P+R) |
//!
//! A document where nothing was expected and nothing was found is a perfect
//! document, not an undefined one.

use super::matching::{MarkingLevel, Matching, MatchingCount, MatchingsCounter};
use super::{EvaluationResult, EvaluationResultContainer, Evaluator};
use crate::marking::Marking;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Result name of the micro-averaged precision.
pub const MICRO_PRECISION_NAME: &str = "Micro Precision";
/// Result name of the micro-averaged recall.
pub const MICRO_RECALL_NAME: &str = "Micro Recall";
/// Result name of the micro-averaged F1.
pub const MICRO_F1_NAME: &str = "Micro F1 score";
/// Result name of the macro-averaged precision.
pub const MACRO_PRECISION_NAME: &str = "Macro Precision";
/// Result name of the macro-averaged recall.
pub const MACRO_RECALL_NAME: &str = "Macro Recall";
/// Result name of the macro-averaged F1.
pub const MACRO_F1_NAME: &str = "Macro F1 score";

/// Precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FMeasure {
    /// Precision.
    pub precision: f64,
    /// Recall.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
}

impl FMeasure {
    /// Create from the three values.
    #[must_use]
    pub const fn new(precision: f64, recall: f64, f1: f64) -> Self {
        Self {
            precision,
            recall,
            f1,
        }
    }

    /// Measures of a single count.
    #[must_use]
    pub fn from_count(count: &MatchingCount) -> Self {
        if count.is_empty() {
            return Self::new(1.0, 1.0, 1.0);
        }
        let tp = count.true_positives;
        if tp == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        let precision = tp / (tp + count.false_positives);
        let recall = tp / (tp + count.false_negatives);
        let f1 = 2.0 * precision * recall / (precision + recall);
        Self::new(precision, recall, f1)
    }
}

/// Sum the counts, then compute once.
#[must_use]
pub fn micro_f_measure(counts: &[MatchingCount]) -> FMeasure {
    let total: MatchingCount = counts.iter().sum();
    FMeasure::from_count(&total)
}

/// Compute per document, then average. NaN for an empty list.
#[must_use]
pub fn macro_f_measure(counts: &[MatchingCount]) -> FMeasure {
    if counts.is_empty() {
        return FMeasure::new(f64::NAN, f64::NAN, f64::NAN);
    }
    let n = counts.len() as f64;
    let (p, r, f) = counts
        .iter()
        .map(FMeasure::from_count)
        .fold((0.0, 0.0, 0.0), |(p, r, f), m| {
            (p + m.precision, r + m.recall, f + m.f1)
        });
    FMeasure::new(p / n, r / n, f / n)
}

/// Evaluator reporting micro and macro precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FMeasureCalculator {
    counter: MatchingsCounter,
}

impl FMeasureCalculator {
    /// Calculator counting at `level` under `matching`.
    #[must_use]
    pub const fn new(level: MarkingLevel, matching: Matching) -> Self {
        Self {
            counter: MatchingsCounter::new(level, matching),
        }
    }

    /// The underlying counter.
    #[must_use]
    pub fn counter(&self) -> &MatchingsCounter {
        &self.counter
    }

    /// Micro and macro measures, in that order.
    pub fn calculate_measures(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
    ) -> Result<(FMeasure, FMeasure)> {
        let counts = self.counter.count_all(produced, gold)?;
        Ok((micro_f_measure(&counts), macro_f_measure(&counts)))
    }
}

impl Evaluator for FMeasureCalculator {
    fn evaluate(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
        results: &mut EvaluationResultContainer,
    ) -> Result<()> {
        let (micro, macro_) = self.calculate_measures(produced, gold)?;
        results.add_all([
            EvaluationResult::double(MICRO_PRECISION_NAME, micro.precision),
            EvaluationResult::double(MICRO_RECALL_NAME, micro.recall),
            EvaluationResult::double(MICRO_F1_NAME, micro.f1),
            EvaluationResult::double(MACRO_PRECISION_NAME, macro_.precision),
            EvaluationResult::double(MACRO_RECALL_NAME, macro_.recall),
            EvaluationResult::double(MACRO_F1_NAME, macro_.f1),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marking::Span;

    fn assert_measure(m: FMeasure, p: f64, r: f64, f1: f64) {
        assert!((m.precision - p).abs() < 1e-6, "precision {m:?}");
        assert!((m.recall - r).abs() < 1e-6, "recall {m:?}");
        assert!((m.f1 - f1).abs() < 1e-6, "f1 {m:?}");
    }

    #[test]
    fn test_nothing_expected_nothing_found() {
        assert_measure(FMeasure::from_count(&MatchingCount::new(0.0, 0.0, 0.0)), 1.0, 1.0, 1.0);
    }

    #[test]
    fn test_only_false_positives() {
        assert_measure(FMeasure::from_count(&MatchingCount::new(0.0, 3.0, 0.0)), 0.0, 0.0, 0.0);
    }

    #[test]
    fn test_only_false_negatives() {
        assert_measure(FMeasure::from_count(&MatchingCount::new(0.0, 0.0, 2.0)), 0.0, 0.0, 0.0);
    }

    #[test]
    fn test_standard_formula() {
        assert_measure(FMeasure::from_count(&MatchingCount::new(8.0, 2.0, 2.0)), 0.8, 0.8, 0.8);
    }

    #[test]
    fn test_macro_averages_documents() {
        let counts = [MatchingCount::new(1.0, 0.0, 0.0), MatchingCount::new(0.0, 1.0, 1.0)];
        assert_measure(macro_f_measure(&counts), 0.5, 0.5, 0.5);
    }

    #[test]
    fn test_macro_perfect_and_empty_documents() {
        // (1,1,1) -> 0.5 each; (0,0,0) -> 1.0 each
        let counts = [MatchingCount::new(1.0, 1.0, 1.0), MatchingCount::new(0.0, 0.0, 0.0)];
        assert_measure(macro_f_measure(&counts), 0.75, 0.75, 0.75);
    }

    #[test]
    fn test_macro_empty_is_nan() {
        let m = macro_f_measure(&[]);
        assert!(m.precision.is_nan() && m.recall.is_nan() && m.f1.is_nan());
    }

    #[test]
    fn test_micro_sums_counts() {
        let counts = [MatchingCount::new(1.0, 0.0, 0.0), MatchingCount::new(3.0, 1.0, 0.0)];
        assert_measure(micro_f_measure(&counts), 0.8, 1.0, 1.6 / 1.8);
    }

    #[test]
    fn test_evaluator_emits_six_leaves() {
        let calc = FMeasureCalculator::new(MarkingLevel::Span, Matching::StrongAnnotationMatch);
        let produced = vec![vec![Marking::from(Span::new(0, 4))]];
        let gold = vec![vec![Marking::from(Span::new(0, 4)), Span::new(9, 2).into()]];
        let mut results = EvaluationResultContainer::new();
        calc.evaluate(&produced, &gold, &mut results).unwrap();

        let names: Vec<_> = results.results().iter().map(EvaluationResult::name).collect();
        assert_eq!(
            names,
            vec![
                MICRO_PRECISION_NAME,
                MICRO_RECALL_NAME,
                MICRO_F1_NAME,
                MACRO_PRECISION_NAME,
                MACRO_RECALL_NAME,
                MACRO_F1_NAME
            ]
        );
        assert!((results.value(MICRO_RECALL_NAME).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_evaluator_rejects_misaligned_input() {
        let calc = FMeasureCalculator::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        let mut results = EvaluationResultContainer::new();
        assert!(calc.evaluate(&[vec![]], &[], &mut results).is_err());
        assert!(results.is_empty());
    }
}
