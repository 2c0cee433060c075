//! Impurity measures over the target distribution and the gain of a split.

use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::tally::Tally;

/// Shannon entropy (base 2) of a class distribution.
///
/// Zero-count classes never appear in a [`Tally`], so `log2(0)` is never
/// evaluated. Returns 0.0 for an empty tally.
pub(crate) fn entropy_of(counts: &Tally<'_>) -> f64 {
    let n = counts.total();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    -counts
        .iter()
        .map(|(_, c)| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Gini impurity `1 - Σ p²` of a class distribution. 0.0 for an empty tally.
pub(crate) fn gini_of(counts: &Tally<'_>) -> f64 {
    let n = counts.total();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|(_, c)| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Target-class counts of each partition `attribute == v`, in first-seen order of `v`.
fn partition_counts<'a>(dataset: &'a Dataset, attribute: &str) -> Vec<(&'a str, Tally<'a>)> {
    let target = dataset.target_attribute();
    let mut partitions: Vec<(&'a str, Tally<'a>)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for record in dataset.records() {
        let (Some(value), Some(class)) = (record.get(attribute), record.get(target)) else {
            continue;
        };
        let i = *index.entry(value).or_insert_with(|| {
            partitions.push((value, Tally::new()));
            partitions.len() - 1
        });
        partitions[i].1.add(class);
    }
    partitions
}

/// Parent impurity minus the size-weighted impurity of each partition on `attribute`.
fn impurity_decrease(dataset: &Dataset, attribute: &str, impurity: fn(&Tally<'_>) -> f64) -> f64 {
    if attribute == dataset.target_attribute() || dataset.is_empty() {
        return 0.0;
    }
    let n = dataset.len() as f64;
    let parent = impurity(&dataset.value_frequencies(dataset.target_attribute()));
    let children: f64 = partition_counts(dataset, attribute)
        .iter()
        .map(|(_, counts)| counts.total() as f64 / n * impurity(counts))
        .sum();
    parent - children
}

/// Entropy of the target attribute's distribution in `dataset`.
///
/// `0.0` when every record has the same class (or there are no records);
/// `log2(k)` when `k` classes are equally frequent.
#[must_use]
pub fn entropy(dataset: &Dataset) -> f64 {
    entropy_of(&dataset.value_frequencies(dataset.target_attribute()))
}

/// Information gain of splitting `dataset` on `attribute`:
/// `entropy(S) − Σ_v |S_v|/|S| · entropy(S_v)`.
///
/// The target attribute always scores 0.0.
#[must_use]
pub fn gain(dataset: &Dataset, attribute: &str) -> f64 {
    impurity_decrease(dataset, attribute, entropy_of)
}

/// Gini impurity of the target attribute's distribution in `dataset`.
#[must_use]
pub fn gini(dataset: &Dataset) -> f64 {
    gini_of(&dataset.value_frequencies(dataset.target_attribute()))
}

/// Decrease in Gini impurity from splitting `dataset` on `attribute`.
///
/// The target attribute always scores 0.0.
#[must_use]
pub fn gini_gain(dataset: &Dataset, attribute: &str) -> f64 {
    impurity_decrease(dataset, attribute, gini_of)
}
