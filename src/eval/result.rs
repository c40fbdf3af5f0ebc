//! The result tree every evaluator writes into.
//!
//! ```text
//! (root)
//! ├── ERec
//! │   ├── Micro Precision   0.8
//! │   ├── ...
//! │   └── Macro F1 score    0.93
//! ├── D2KB
//! │   └── ...
//! ├── Micro Precision       0.75     ← averaged over subtasks
//! ├── avg millis/doc        12.5
//! └── error count           0
//! ```
//!
//! Insertion order is preserved and names are unique within one level.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of the result tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvaluationResult {
    /// Real-valued leaf.
    Double {
        /// Result name.
        name: String,
        /// Value; may be NaN when undefined.
        value: f64,
    },
    /// Integer leaf.
    Int {
        /// Result name.
        name: String,
        /// Value.
        value: i64,
    },
    /// Named group of results.
    Container(EvaluationResultContainer),
}

impl EvaluationResult {
    /// Real-valued leaf.
    pub fn double(name: impl Into<String>, value: f64) -> Self {
        EvaluationResult::Double {
            name: name.into(),
            value,
        }
    }

    /// Integer leaf.
    pub fn int(name: impl Into<String>, value: i64) -> Self {
        EvaluationResult::Int {
            name: name.into(),
            value,
        }
    }

    /// Result name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            EvaluationResult::Double { name, .. } | EvaluationResult::Int { name, .. } => name,
            EvaluationResult::Container(c) => c.name(),
        }
    }

    /// Numeric value of a leaf; `None` for containers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvaluationResult::Double { value, .. } => Some(*value),
            EvaluationResult::Int { value, .. } => Some(*value as f64),
            EvaluationResult::Container(_) => None,
        }
    }

    /// Whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, EvaluationResult::Container(_))
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, f64)>) {
        match self {
            EvaluationResult::Container(c) => {
                for r in &c.results {
                    r.collect_leaves(out);
                }
            }
            leaf => {
                if let Some(v) = leaf.as_f64() {
                    out.push((leaf.name(), v));
                }
            }
        }
    }

    /// All leaves below (or at) this node, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<(&str, f64)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }
}

impl From<EvaluationResultContainer> for EvaluationResult {
    fn from(c: EvaluationResultContainer) -> Self {
        EvaluationResult::Container(c)
    }
}

/// An ordered, named group of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResultContainer {
    name: String,
    results: Vec<EvaluationResult>,
}

impl EvaluationResultContainer {
    /// Unnamed root container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Named container.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
        }
    }

    /// Container name (empty for a root).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a result. Fails if a result with the same name exists at
    /// this level.
    pub fn add(&mut self, result: impl Into<EvaluationResult>) -> Result<()> {
        let result = result.into();
        if self.get(result.name()).is_some() {
            return Err(Error::evaluation(format!(
                "duplicate result name \"{}\" in container \"{}\"",
                result.name(),
                self.name
            )));
        }
        self.results.push(result);
        Ok(())
    }

    /// Append several results in order.
    pub fn add_all<I>(&mut self, results: I) -> Result<()>
    where
        I: IntoIterator<Item = EvaluationResult>,
    {
        results.into_iter().try_for_each(|r| self.add(r))
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Take the children.
    #[must_use]
    pub fn into_results(self) -> Vec<EvaluationResult> {
        self.results
    }

    /// Direct child by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EvaluationResult> {
        self.results.iter().find(|r| r.name() == name)
    }

    /// Numeric value of a direct leaf child.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(EvaluationResult::as_f64)
    }

    /// Direct container child by name.
    #[must_use]
    pub fn container(&self, name: &str) -> Option<&EvaluationResultContainer> {
        match self.get(name)? {
            EvaluationResult::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// All leaves, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<(&str, f64)> {
        let mut out = Vec::new();
        for r in &self.results {
            r.collect_leaves(&mut out);
        }
        out
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for r in &self.results {
            let indent = "  ".repeat(depth);
            match r {
                EvaluationResult::Double { name, value } => {
                    writeln!(f, "{indent}{name:<24} {value:.4}")?
                }
                EvaluationResult::Int { name, value } => writeln!(f, "{indent}{name:<24} {value}")?,
                EvaluationResult::Container(c) => {
                    writeln!(f, "{indent}{}", c.name)?;
                    c.fmt_indented(f, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for EvaluationResultContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut c = EvaluationResultContainer::new();
        c.add(EvaluationResult::double("b", 1.0)).unwrap();
        c.add(EvaluationResult::int("a", 2)).unwrap();
        let names: Vec<_> = c.results().iter().map(EvaluationResult::name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut c = EvaluationResultContainer::named("ERec");
        c.add(EvaluationResult::double("F1", 0.5)).unwrap();
        let err = c.add(EvaluationResult::double("F1", 0.7)).unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_same_name_at_different_levels() {
        let mut inner = EvaluationResultContainer::named("sub");
        inner.add(EvaluationResult::double("F1", 0.5)).unwrap();
        let mut root = EvaluationResultContainer::new();
        root.add(inner).unwrap();
        root.add(EvaluationResult::double("F1", 0.5)).unwrap();
        assert_eq!(root.leaves(), vec![("F1", 0.5), ("F1", 0.5)]);
        assert_eq!(root.container("sub").unwrap().value("F1"), Some(0.5));
    }

    #[test]
    fn test_depth_first_leaves() {
        let mut a = EvaluationResultContainer::named("a");
        a.add(EvaluationResult::double("x", 1.0)).unwrap();
        let mut b = EvaluationResultContainer::named("b");
        b.add(EvaluationResult::int("y", 2)).unwrap();
        a.add(b).unwrap();
        a.add(EvaluationResult::double("z", 3.0)).unwrap();
        let node = EvaluationResult::from(a);
        assert_eq!(node.leaves(), vec![("x", 1.0), ("y", 2.0), ("z", 3.0)]);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut c = EvaluationResultContainer::new();
        c.add(EvaluationResult::int("error count", 0)).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: EvaluationResultContainer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_display() {
        let mut c = EvaluationResultContainer::new();
        c.add(EvaluationResult::int("error count", 3)).unwrap();
        assert!(c.to_string().contains("error count"));
    }
}
