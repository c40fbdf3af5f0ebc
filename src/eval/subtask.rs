//! Composite experiments: several evaluations over the same markings.
//!
//! ```text
//! SubTaskAverageCalculator
//! ├── SubTaskEvaluator "Entity Recognition"  ──► container "Entity Recognition"
//! ├── SubTaskEvaluator "D2KB"                ──► container "D2KB"
//! └── mean of every leaf name found in all subtasks ──► root leaves
//! ```

use super::{EvaluationResult, EvaluationResultContainer, Evaluator};
use crate::marking::Marking;
use crate::Result;

/// An evaluator whose results are grouped under a subtask name.
pub struct SubTaskEvaluator {
    name: String,
    evaluator: Box<dyn Evaluator>,
}

impl SubTaskEvaluator {
    /// Group the results of `evaluator` under `name`.
    pub fn new(name: impl Into<String>, evaluator: impl Evaluator + 'static) -> Self {
        Self {
            name: name.into(),
            evaluator: Box::new(evaluator),
        }
    }

    /// Subtask name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SubTaskEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubTaskEvaluator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Evaluator for SubTaskEvaluator {
    fn evaluate(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
        results: &mut EvaluationResultContainer,
    ) -> Result<()> {
        let mut container = EvaluationResultContainer::named(&self.name);
        self.evaluator.evaluate(produced, gold, &mut container)?;
        results.add(container)
    }
}

/// Runs subtasks and averages the results they have in common.
#[derive(Debug, Default)]
pub struct SubTaskAverageCalculator {
    subtasks: Vec<SubTaskEvaluator>,
}

impl SubTaskAverageCalculator {
    /// Calculator over `subtasks`, evaluated in order.
    #[must_use]
    pub fn new(subtasks: Vec<SubTaskEvaluator>) -> Self {
        Self { subtasks }
    }

    /// Append a subtask.
    #[must_use]
    pub fn with_subtask(mut self, subtask: SubTaskEvaluator) -> Self {
        self.subtasks.push(subtask);
        self
    }

    /// The subtasks.
    #[must_use]
    pub fn subtasks(&self) -> &[SubTaskEvaluator] {
        &self.subtasks
    }
}

impl Evaluator for SubTaskAverageCalculator {
    fn evaluate(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
        results: &mut EvaluationResultContainer,
    ) -> Result<()> {
        let mut subtask_results = EvaluationResultContainer::new();
        for subtask in &self.subtasks {
            subtask.evaluate(produced, gold, &mut subtask_results)?;
        }
        let averages = average_shared_leaves(subtask_results.results());
        results.add_all(subtask_results.into_results())?;
        results.add_all(
            averages
                .into_iter()
                .map(|(name, value)| EvaluationResult::double(name, value)),
        )
    }
}

/// Mean of every leaf name that occurs in each subtask tree.
///
/// Names keep the order of their first appearance in the first subtask. The
/// mean runs over all collected values, so a name repeated inside one subtask
/// contributes each occurrence.
fn average_shared_leaves(subtasks: &[EvaluationResult]) -> Vec<(String, f64)> {
    let flattened: Vec<Vec<(&str, f64)>> = subtasks.iter().map(EvaluationResult::leaves).collect();
    let Some((first, rest)) = flattened.split_first() else {
        return Vec::new();
    };

    let mut averages: Vec<(String, f64)> = Vec::new();
    for (name, _) in first {
        if averages.iter().any(|(seen, _)| seen == name) {
            continue;
        }
        if !rest.iter().all(|leaves| leaves.iter().any(|(n, _)| n == name)) {
            continue;
        }
        let values: Vec<f64> = flattened
            .iter()
            .flatten()
            .filter(|(n, _)| n == name)
            .map(|&(_, v)| v)
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        averages.push(((*name).to_string(), mean));
    }
    averages
}
