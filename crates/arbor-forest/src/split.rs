use crate::dataset::Dataset;
use crate::entropy::{gain, gini_gain};

/// Fitness function used to rank candidate split attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCriterion {
    /// Information gain: reduction in base-2 entropy of the target.
    #[default]
    InformationGain,
    /// Reduction in Gini impurity: 1 - Σ(p_i²)
    GiniGain,
}

impl SplitCriterion {
    /// Score a split of `dataset` on `attribute`. Higher is better.
    ///
    /// The target attribute always scores 0.0.
    #[must_use]
    pub fn score(&self, dataset: &Dataset, attribute: &str) -> f64 {
        match self {
            SplitCriterion::InformationGain => gain(dataset, attribute),
            SplitCriterion::GiniGain => gini_gain(dataset, attribute),
        }
    }
}

/// Pick the highest-scoring attribute among `candidates`.
///
/// Ties go to the earliest candidate. Returns `None` when `candidates` is empty.
pub(crate) fn best_attribute<'c>(
    dataset: &Dataset,
    candidates: &'c [String],
    criterion: SplitCriterion,
) -> Option<&'c str> {
    let mut best: Option<(&'c str, f64)> = None;
    for candidate in candidates {
        let score = criterion.score(dataset, candidate);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((candidate.as_str(), score));
        }
    }
    best.map(|(attribute, _)| attribute)
}
