//! Running one engine over one gold standard for one experiment type.
//!
//! ```text
//! gold documents ──► ErrorCounting( TimeMeasuring( engine ) ) ──► produced markings
//!                                                                        │
//!        evaluator_for(type, matching) ◄─────────────────────────────────┘
//!                 │
//!                 ▼
//!   F-measure leaves, "avg millis/doc", "error count"
//! ```

use super::factory::evaluator_for;
use super::{EvaluationResultContainer, Evaluator};
use crate::annotator::{
    create_decorator, create_time_measuring_decorator, Annotator, ErrorCounting, ExperimentType,
};
use crate::config::EvalConfig;
use crate::document::Document;
use crate::marking::Marking;
use crate::Result;

/// One experiment: an experiment type and the settings to run it with.
#[derive(Debug, Clone)]
pub struct ExperimentTask {
    id: String,
    experiment_type: ExperimentType,
    config: EvalConfig,
}

impl ExperimentTask {
    /// Create a task.
    pub fn new(id: impl Into<String>, experiment_type: ExperimentType, config: EvalConfig) -> Self {
        Self {
            id: id.into(),
            experiment_type,
            config,
        }
    }

    /// Task identifier, used in logs.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Experiment type.
    #[must_use]
    pub fn experiment_type(&self) -> ExperimentType {
        self.experiment_type
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Annotate every gold document with `engine` and evaluate the result.
    ///
    /// Setup problems (unmapped type, missing capability, bad tolerance) fail
    /// before the engine sees a document. Engine failures are absorbed until
    /// the tolerance is exhausted, which aborts the task.
    pub fn run<A: Annotator>(
        &self,
        engine: A,
        gold_documents: &[Document],
    ) -> Result<EvaluationResultContainer> {
        log::info!(
            "Starting experiment task {} ({}, {}, {} documents)",
            self.id,
            self.experiment_type,
            self.config.matching,
            gold_documents.len()
        );
        let result = self.execute(engine, gold_documents);
        match &result {
            Ok(_) => log::info!("Experiment task {} finished", self.id),
            Err(e) => log::warn!("Experiment task {} aborted: {}", self.id, e),
        }
        result
    }

    fn execute<A: Annotator>(
        &self,
        engine: A,
        gold_documents: &[Document],
    ) -> Result<EvaluationResultContainer> {
        self.config.validate()?;
        let evaluator = evaluator_for(self.experiment_type, self.config.matching)?;
        let capability = self.experiment_type.primary_capability()?;

        let timed = create_time_measuring_decorator(self.experiment_type, engine)?;
        let error_counting = ErrorCounting::for_expected_calls(
            gold_documents.len(),
            self.config.tolerated_error_fraction,
        )?
        .with_result_logging(self.config.log_results);
        let mut decorated = create_decorator(self.experiment_type, timed, error_counting)?;

        let mut produced = Vec::with_capacity(gold_documents.len());
        for document in gold_documents {
            let input = if self.experiment_type.uses_span_hints() {
                document.with_span_hints()
            } else {
                Document::new(document.text(), document.uri())
            };
            produced.push(decorated.perform(capability, &input)?);
        }

        let gold: Vec<Vec<Marking>> = gold_documents
            .iter()
            .map(|d| d.markings().to_vec())
            .collect();
        let mut results = EvaluationResultContainer::new();
        evaluator.evaluate(&produced, &gold, &mut results)?;
        decorated.inner().evaluate(&produced, &gold, &mut results)?;
        decorated.evaluate(&produced, &gold, &mut results)?;
        Ok(results)
    }
}
