//! Which evaluation an experiment type gets.

use super::fmeasure::FMeasureCalculator;
use super::matching::{MarkingLevel, Matching};
use super::subtask::{SubTaskAverageCalculator, SubTaskEvaluator};
use super::Evaluator;
use crate::annotator::ExperimentType;
use crate::{Error, Result};

/// Subtask name of the recognition part of composite experiments.
pub const ENTITY_RECOGNITION_SUBTASK: &str = "Entity Recognition";
/// Subtask name of the linking part of composite experiments.
pub const D2KB_SUBTASK: &str = "D2KB";
/// Subtask name of the typing part of composite experiments.
pub const ENTITY_TYPING_SUBTASK: &str = "Entity Typing";

/// Build the evaluator for `experiment_type` under `matching`.
///
/// | Type | Evaluation |
/// |------|------------|
/// | ERec | F-measure on spans |
/// | ETyping | F-measure on typed spans |
/// | D2KB | F-measure on linked spans |
/// | C2KB | F-measure on meanings |
/// | A2KB | recognition + D2KB subtasks, averaged |
/// | OKE_Task1 | recognition + D2KB + typing subtasks, averaged |
/// | OKE_Task2 | F-measure on typed named entities |
///
/// Unmapped types are configuration errors.
pub fn evaluator_for(
    experiment_type: ExperimentType,
    matching: Matching,
) -> Result<Box<dyn Evaluator>> {
    let f_measure = |level| FMeasureCalculator::new(level, matching);
    let evaluator: Box<dyn Evaluator> = match experiment_type {
        ExperimentType::ERec => Box::new(f_measure(MarkingLevel::Span)),
        ExperimentType::ETyping => Box::new(f_measure(MarkingLevel::TypedSpan)),
        ExperimentType::D2KB => Box::new(f_measure(MarkingLevel::MeaningSpan)),
        ExperimentType::C2KB => Box::new(f_measure(MarkingLevel::Meaning)),
        ExperimentType::OkeTask2 => Box::new(f_measure(MarkingLevel::TypedNamedEntity)),
        ExperimentType::A2KB => Box::new(SubTaskAverageCalculator::new(vec![
            SubTaskEvaluator::new(ENTITY_RECOGNITION_SUBTASK, f_measure(MarkingLevel::Span)),
            SubTaskEvaluator::new(D2KB_SUBTASK, f_measure(MarkingLevel::MeaningSpan)),
        ])),
        ExperimentType::OkeTask1 => Box::new(SubTaskAverageCalculator::new(vec![
            SubTaskEvaluator::new(ENTITY_RECOGNITION_SUBTASK, f_measure(MarkingLevel::Span)),
            SubTaskEvaluator::new(D2KB_SUBTASK, f_measure(MarkingLevel::MeaningSpan)),
            SubTaskEvaluator::new(ENTITY_TYPING_SUBTASK, f_measure(MarkingLevel::TypedSpan)),
        ])),
        ExperimentType::Rc2KB | ExperimentType::Sa2KB | ExperimentType::Sc2KB => {
            return Err(Error::configuration(format!(
                "no evaluation is defined for experiment type {experiment_type}"
            )))
        }
    };
    Ok(evaluator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{EvaluationResultContainer, MICRO_F1_NAME};
    use crate::marking::{Marking, MeaningSpan, TypedNamedEntity};

    #[test]
    fn test_unmapped_types_rejected() {
        for t in [ExperimentType::Rc2KB, ExperimentType::Sa2KB, ExperimentType::Sc2KB] {
            assert!(matches!(
                evaluator_for(t, Matching::WeakAnnotationMatch),
                Err(Error::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_every_mapped_type_has_an_evaluator() {
        for &t in ExperimentType::all() {
            if t.required_capabilities().is_ok() {
                assert!(evaluator_for(t, Matching::StrongAnnotationMatch).is_ok(), "{t}");
            }
        }
    }

    #[test]
    fn test_a2kb_reports_subtasks_and_average() {
        let evaluator = evaluator_for(ExperimentType::A2KB, Matching::StrongAnnotationMatch).unwrap();
        // right position, wrong entity: recognition 1.0, linking 0.0
        let produced: Vec<Vec<Marking>> = vec![vec![MeaningSpan::new(0, 6, "dbr:Paris").into()]];
        let gold: Vec<Vec<Marking>> = vec![vec![MeaningSpan::new(0, 6, "dbr:Berlin").into()]];
        let mut results = EvaluationResultContainer::new();
        evaluator.evaluate(&produced, &gold, &mut results).unwrap();

        let recognition = results.container(ENTITY_RECOGNITION_SUBTASK).unwrap();
        let linking = results.container(D2KB_SUBTASK).unwrap();
        assert_eq!(recognition.value(MICRO_F1_NAME), Some(1.0));
        assert_eq!(linking.value(MICRO_F1_NAME), Some(0.0));
        assert!((results.value(MICRO_F1_NAME).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_oke_task1_has_three_subtasks() {
        let evaluator =
            evaluator_for(ExperimentType::OkeTask1, Matching::WeakAnnotationMatch).unwrap();
        let entity: Marking = TypedNamedEntity::new(0, 6, "dbr:Berlin", ["dbo:City"]).into();
        let mut results = EvaluationResultContainer::new();
        evaluator
            .evaluate(&[vec![entity.clone()]], &[vec![entity]], &mut results)
            .unwrap();
        assert!(results.container(ENTITY_TYPING_SUBTASK).is_some());
        assert_eq!(results.value(MICRO_F1_NAME), Some(1.0));
    }
}
