//! Pairing produced markings with gold markings.
//!
//! A [`MatchingsCounter`] looks at both marking lists through one
//! [`MarkingLevel`] (which fields count) and one [`Matching`] policy (how
//! positions are compared). Every produced/gold pair gets a credit in
//! `[0, 1]`; a one-to-one assignment maximizing the total credit is then
//! computed with the Hungarian method.
//!
//! ```text
//!              gold 0   gold 1   gold 2
//! produced 0 [  1.0      0.0      0.0  ]      TP = Σ credit of assigned pairs
//! produced 1 [  0.0      0.0      1.0  ]      FP = unassigned produced + Σ(1 − c)
//! produced 2 [  0.0      0.0      0.0  ]      FN = unassigned gold     + Σ(1 − c)
//! ```
//!
//! Pairs assigned with zero credit count as unassigned.

use super::check_aligned;
use crate::marking::{Marking, Span};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =============================================================================
// Policies and levels
// =============================================================================

/// How two positions are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Matching {
    /// Positions must be identical.
    StrongAnnotationMatch,
    /// Positions must share at least one character.
    #[default]
    WeakAnnotationMatch,
    /// Credit is the overlap ratio (intersection over union) of the positions.
    ProportionalOverlap,
}

impl Matching {
    /// All policies.
    #[must_use]
    pub fn all() -> &'static [Matching] {
        &[
            Matching::StrongAnnotationMatch,
            Matching::WeakAnnotationMatch,
            Matching::ProportionalOverlap,
        ]
    }

    /// Policy name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Matching::StrongAnnotationMatch => "strong annotation match",
            Matching::WeakAnnotationMatch => "weak annotation match",
            Matching::ProportionalOverlap => "proportional overlap",
        }
    }

    /// Credit for two positions, before attributes are considered.
    #[must_use]
    pub fn position_credit(&self, produced: &Span, gold: &Span) -> f64 {
        match self {
            Matching::StrongAnnotationMatch => f64::from(u8::from(produced == gold)),
            Matching::WeakAnnotationMatch => {
                f64::from(u8::from(produced == gold || produced.overlaps(gold)))
            }
            Matching::ProportionalOverlap => produced.overlap_ratio(gold),
        }
    }
}

impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which fields of a marking take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkingLevel {
    /// Position only.
    Span,
    /// Position and types.
    TypedSpan,
    /// URIs only.
    Meaning,
    /// Position and URIs.
    MeaningSpan,
    /// Position, URIs and types.
    TypedNamedEntity,
}

impl MarkingLevel {
    /// Whether the level compares positions.
    #[must_use]
    pub fn has_position(&self) -> bool {
        !matches!(self, MarkingLevel::Meaning)
    }

    /// Whether the level compares type sets.
    #[must_use]
    pub fn has_types(&self) -> bool {
        matches!(self, MarkingLevel::TypedSpan | MarkingLevel::TypedNamedEntity)
    }

    /// Whether the level compares URIs.
    #[must_use]
    pub fn has_meaning(&self) -> bool {
        matches!(
            self,
            MarkingLevel::Meaning | MarkingLevel::MeaningSpan | MarkingLevel::TypedNamedEntity
        )
    }

    /// Whether `marking` carries every field this level needs.
    #[must_use]
    pub fn accepts(&self, marking: &Marking) -> bool {
        (!self.has_position() || marking.span().is_some())
            && (!self.has_types() || marking.types().is_some())
            && (!self.has_meaning() || marking.uris().is_some())
    }

    /// Credit of a pair under `matching`; both markings must be accepted.
    #[must_use]
    pub fn credit(&self, matching: Matching, produced: &Marking, gold: &Marking) -> f64 {
        if self.has_types() && produced.types() != gold.types() {
            return 0.0;
        }
        if self.has_meaning() && !share_uri(produced.uris(), gold.uris()) {
            return 0.0;
        }
        match (self.has_position(), produced.span(), gold.span()) {
            (false, _, _) => 1.0,
            (true, Some(p), Some(g)) => matching.position_credit(&p, &g),
            _ => 0.0,
        }
    }
}

fn share_uri(a: Option<&BTreeSet<String>>, b: Option<&BTreeSet<String>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_disjoint(b),
        _ => false,
    }
}

// =============================================================================
// Counts
// =============================================================================

/// True positive, false positive and false negative mass of one document.
///
/// Real-valued because partial credit contributes fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingCount {
    /// Matched credit.
    pub true_positives: f64,
    /// Produced markings (or credit shortfall) without a gold counterpart.
    pub false_positives: f64,
    /// Gold markings (or credit shortfall) without a produced counterpart.
    pub false_negatives: f64,
}

impl MatchingCount {
    /// Create a count.
    #[must_use]
    pub const fn new(true_positives: f64, false_positives: f64, false_negatives: f64) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    /// Whether nothing was produced and nothing was expected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.true_positives == 0.0 && self.false_positives == 0.0 && self.false_negatives == 0.0
    }
}

impl Add for MatchingCount {
    type Output = MatchingCount;

    fn add(self, rhs: MatchingCount) -> MatchingCount {
        MatchingCount::new(
            self.true_positives + rhs.true_positives,
            self.false_positives + rhs.false_positives,
            self.false_negatives + rhs.false_negatives,
        )
    }
}

impl AddAssign for MatchingCount {
    fn add_assign(&mut self, rhs: MatchingCount) {
        *self = *self + rhs;
    }
}

impl Sum for MatchingCount {
    fn sum<I: Iterator<Item = MatchingCount>>(iter: I) -> Self {
        iter.fold(MatchingCount::default(), Add::add)
    }
}

impl<'a> Sum<&'a MatchingCount> for MatchingCount {
    fn sum<I: Iterator<Item = &'a MatchingCount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Counter
// =============================================================================

/// Counts matchings at one level under one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingsCounter {
    level: MarkingLevel,
    matching: Matching,
}

impl MatchingsCounter {
    /// Create a counter.
    #[must_use]
    pub const fn new(level: MarkingLevel, matching: Matching) -> Self {
        Self { level, matching }
    }

    /// The level markings are viewed at.
    #[must_use]
    pub fn level(&self) -> MarkingLevel {
        self.level
    }

    /// The position policy.
    #[must_use]
    pub fn matching(&self) -> Matching {
        self.matching
    }

    /// Count one document.
    #[must_use]
    pub fn count_matchings(&self, produced: &[Marking], gold: &[Marking]) -> MatchingCount {
        let produced = self.eligible(produced, "produced");
        let gold = self.eligible(gold, "gold");
        if produced.is_empty() || gold.is_empty() {
            return MatchingCount::new(0.0, produced.len() as f64, gold.len() as f64);
        }

        let credits: Vec<Vec<f64>> = produced
            .iter()
            .map(|p| {
                gold.iter()
                    .map(|g| self.level.credit(self.matching, p, g))
                    .collect()
            })
            .collect();

        let mut matched = 0usize;
        let mut true_positives = 0.0;
        let mut shortfall = 0.0;
        for (i, j) in max_credit_assignment(&credits, gold.len())
            .into_iter()
            .enumerate()
            .filter_map(|(i, j)| Some((i, j?)))
        {
            let credit = credits[i][j];
            if credit > 0.0 {
                matched += 1;
                true_positives += credit;
                shortfall += 1.0 - credit;
            }
        }

        MatchingCount::new(
            true_positives,
            (produced.len() - matched) as f64 + shortfall,
            (gold.len() - matched) as f64 + shortfall,
        )
    }

    /// Count every document, in order.
    pub fn count_all(
        &self,
        produced: &[Vec<Marking>],
        gold: &[Vec<Marking>],
    ) -> Result<Vec<MatchingCount>> {
        check_aligned(produced, gold)?;
        Ok(produced
            .iter()
            .zip(gold)
            .map(|(p, g)| self.count_matchings(p, g))
            .collect())
    }

    fn eligible<'a>(&self, markings: &'a [Marking], side: &str) -> Vec<&'a Marking> {
        markings
            .iter()
            .filter(|m| {
                let ok = self.level.accepts(m);
                if !ok {
                    log::debug!(
                        "Ignoring {} marking {} at level {:?}",
                        side,
                        m,
                        self.level
                    );
                }
                ok
            })
            .collect()
    }
}

// =============================================================================
// Assignment
// =============================================================================

/// One-to-one assignment of rows to columns maximizing the summed credit.
///
/// `credits` is a rows × `cols` matrix. Returns, per row, the assigned
/// column (rows left over when rows > cols get `None`). Runs the O(n³)
/// potentials formulation of the Hungarian method on the negated matrix,
/// padded to a square with zeros.
fn max_credit_assignment(credits: &[Vec<f64>], cols: usize) -> Vec<Option<usize>> {
    let rows = credits.len();
    let n = rows.max(cols);
    let cost = |i: usize, j: usize| -> f64 {
        if i < rows && j < cols {
            -credits[i][j]
        } else {
            0.0
        }
    };

    // 1-based; index 0 is the virtual start column.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut row_of_col = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        row_of_col[0] = i;
        let mut j0 = 0usize;
        let mut min_v = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = row_of_col[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[row_of_col[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }
            j0 = j1;
            if row_of_col[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            row_of_col[j0] = row_of_col[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![None; rows];
    for (j, &i) in row_of_col.iter().enumerate().skip(1) {
        if (1..=rows).contains(&i) && j <= cols {
            assignment[i - 1] = Some(j - 1);
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marking::{Meaning, MeaningSpan, TypedNamedEntity, TypedSpan};

    fn spans(list: &[(usize, usize)]) -> Vec<Marking> {
        list.iter().map(|&(s, l)| Span::new(s, l).into()).collect()
    }

    fn assert_count(c: MatchingCount, tp: f64, fp: f64, fn_: f64) {
        assert!((c.true_positives - tp).abs() < 1e-9, "tp {c:?}");
        assert!((c.false_positives - fp).abs() < 1e-9, "fp {c:?}");
        assert!((c.false_negatives - fn_).abs() < 1e-9, "fn {c:?}");
    }

    #[test]
    fn test_strong_exact_match() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::StrongAnnotationMatch);
        let c = counter.count_matchings(
            &spans(&[(0, 8), (21, 3), (42, 4), (81, 5)]),
            &spans(&[(21, 3), (0, 8), (42, 4)]),
        );
        assert_count(c, 3.0, 1.0, 0.0);
    }

    #[test]
    fn test_strong_rejects_partial_overlap() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::StrongAnnotationMatch);
        let c = counter.count_matchings(&spans(&[(4, 9)]), &spans(&[(0, 13)]));
        assert_count(c, 0.0, 1.0, 1.0);
    }

    #[test]
    fn test_weak_accepts_partial_overlap() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        let c = counter.count_matchings(&spans(&[(4, 9)]), &spans(&[(0, 13)]));
        assert_count(c, 1.0, 0.0, 0.0);
    }

    #[test]
    fn test_weak_empty_span_inside_gold_is_no_match() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        let c = counter.count_matchings(&spans(&[(5, 0)]), &spans(&[(0, 10)]));
        assert_count(c, 0.0, 1.0, 1.0);
        // identical empty spans still match
        let c = counter.count_matchings(&spans(&[(5, 0)]), &spans(&[(5, 0)]));
        assert_count(c, 1.0, 0.0, 0.0);
    }

    #[test]
    fn test_proportional_partial_credit() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::ProportionalOverlap);
        // [0,10) vs [0,5): 5 of 10
        let c = counter.count_matchings(&spans(&[(0, 5)]), &spans(&[(0, 10)]));
        assert_count(c, 0.5, 0.5, 0.5);
    }

    #[test]
    fn test_assignment_is_one_to_one() {
        // two produced spans inside one gold span: only one may match
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        let c = counter.count_matchings(&spans(&[(0, 3), (4, 3)]), &spans(&[(0, 10)]));
        assert_count(c, 1.0, 1.0, 0.0);
    }

    #[test]
    fn test_assignment_maximizes_total_credit() {
        // Greedy on row 0 would take gold 0 and leave produced 1 unmatched.
        let credits = vec![vec![1.0, 1.0], vec![1.0, 0.0]];
        let a = max_credit_assignment(&credits, 2);
        assert_eq!(a, vec![Some(1), Some(0)]);

        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        let c = counter.count_matchings(&spans(&[(0, 10), (0, 3)]), &spans(&[(2, 3), (8, 5)]));
        assert_count(c, 2.0, 0.0, 0.0);
    }

    #[test]
    fn test_assignment_rectangular() {
        let credits = vec![vec![0.2, 0.9, 0.1]];
        assert_eq!(max_credit_assignment(&credits, 3), vec![Some(1)]);

        let credits = vec![vec![0.3], vec![0.8], vec![0.5]];
        assert_eq!(max_credit_assignment(&credits, 1), vec![None, Some(0), None]);
    }

    #[test]
    fn test_empty_sides() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        assert!(counter.count_matchings(&[], &[]).is_empty());
        assert_count(counter.count_matchings(&spans(&[(0, 1)]), &[]), 0.0, 1.0, 0.0);
        assert_count(counter.count_matchings(&[], &spans(&[(0, 1), (3, 1)])), 0.0, 0.0, 2.0);
    }

    #[test]
    fn test_meaning_uris_intersect() {
        let counter = MatchingsCounter::new(MarkingLevel::Meaning, Matching::StrongAnnotationMatch);
        let produced: Vec<Marking> = vec![Meaning::with_uris(["dbr:Berlin", "wd:Q64"]).into()];
        let gold: Vec<Marking> = vec![Meaning::new("wd:Q64").into()];
        assert_count(counter.count_matchings(&produced, &gold), 1.0, 0.0, 0.0);

        let wrong: Vec<Marking> = vec![Meaning::new("wd:Q1").into()];
        assert_count(counter.count_matchings(&wrong, &gold), 0.0, 1.0, 1.0);
    }

    #[test]
    fn test_meaning_span_requires_position_and_uri() {
        let counter =
            MatchingsCounter::new(MarkingLevel::MeaningSpan, Matching::StrongAnnotationMatch);
        let gold: Vec<Marking> = vec![MeaningSpan::new(0, 6, "dbr:Berlin").into()];
        let wrong_uri: Vec<Marking> = vec![MeaningSpan::new(0, 6, "dbr:Paris").into()];
        assert_count(counter.count_matchings(&wrong_uri, &gold), 0.0, 1.0, 1.0);
        let right: Vec<Marking> = vec![TypedNamedEntity::new(0, 6, "dbr:Berlin", ["dbo:City"]).into()];
        assert_count(counter.count_matchings(&right, &gold), 1.0, 0.0, 0.0);
    }

    #[test]
    fn test_types_must_be_equal() {
        let counter = MatchingsCounter::new(MarkingLevel::TypedSpan, Matching::WeakAnnotationMatch);
        let gold: Vec<Marking> = vec![TypedSpan::new(0, 6, ["dbo:City", "dbo:Place"]).into()];
        let subset: Vec<Marking> = vec![TypedSpan::new(0, 6, ["dbo:City"]).into()];
        assert_count(counter.count_matchings(&subset, &gold), 0.0, 1.0, 1.0);
        let equal: Vec<Marking> = vec![TypedSpan::new(1, 3, ["dbo:Place", "dbo:City"]).into()];
        assert_count(counter.count_matchings(&equal, &gold), 1.0, 0.0, 0.0);
    }

    #[test]
    fn test_ineligible_markings_ignored() {
        let counter = MatchingsCounter::new(MarkingLevel::MeaningSpan, Matching::WeakAnnotationMatch);
        let produced: Vec<Marking> = vec![Span::new(0, 6).into()];
        let gold: Vec<Marking> = vec![MeaningSpan::new(0, 6, "dbr:Berlin").into()];
        assert_count(counter.count_matchings(&produced, &gold), 0.0, 0.0, 1.0);
    }

    #[test]
    fn test_count_all_requires_aligned_lists() {
        let counter = MatchingsCounter::new(MarkingLevel::Span, Matching::WeakAnnotationMatch);
        assert!(counter.count_all(&[vec![]], &[]).is_err());
        let counts = counter
            .count_all(&[spans(&[(0, 1)]), vec![]], &[spans(&[(0, 1)]), vec![]])
            .unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts[1].is_empty());
    }

    #[test]
    fn test_count_sum() {
        let total: MatchingCount = [MatchingCount::new(1.0, 2.0, 3.0), MatchingCount::new(1.0, 0.0, 1.0)]
            .iter()
            .sum();
        assert_eq!(total, MatchingCount::new(2.0, 2.0, 4.0));
    }
}
