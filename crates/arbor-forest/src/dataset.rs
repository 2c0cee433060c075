//! Categorical records and the dataset container the learners consume.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::error::ForestError;
use crate::tally::Tally;

/// A single row: attribute name → category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(HashMap<String, String>);

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Return the value for `attribute`, if present.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }

    /// Set the value for `attribute`, returning the previous value.
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(attribute.into(), value.into())
    }

    /// Number of attributes that carry a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if the record carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// How [`Dataset::sample`] draws records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
    /// Bootstrap: every draw picks uniformly from the full dataset.
    #[default]
    WithReplacement,
    /// Each record is drawn at most once.
    WithoutReplacement,
}

/// An ordered set of records over an ordered attribute list.
///
/// The last attribute is the target (class label). Every record carries a
/// value for every attribute; [`Dataset::new`] rejects incomplete records, and
/// derived datasets only ever hold copies of already validated records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    attributes: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, validating the attribute list and every record.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::NoAttributes`] | `attributes` is empty |
    /// | [`ForestError::DuplicateAttribute`] | an attribute name repeats |
    /// | [`ForestError::MissingValue`] | a record lacks some attribute |
    pub fn new(attributes: Vec<String>, records: Vec<Record>) -> Result<Self, ForestError> {
        if attributes.is_empty() {
            return Err(ForestError::NoAttributes);
        }
        let mut seen = HashSet::with_capacity(attributes.len());
        for attribute in &attributes {
            if !seen.insert(attribute.as_str()) {
                return Err(ForestError::DuplicateAttribute {
                    attribute: attribute.clone(),
                });
            }
        }
        for (record_index, record) in records.iter().enumerate() {
            if let Some(missing) = attributes.iter().find(|a| record.get(a).is_none()) {
                return Err(ForestError::MissingValue {
                    record_index,
                    attribute: missing.clone(),
                });
            }
        }
        Ok(Self { attributes, records })
    }

    fn derive(&self, records: Vec<Record>) -> Self {
        Self {
            attributes: self.attributes.clone(),
            records,
        }
    }

    /// All attributes, target last.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// The class-label attribute.
    #[must_use]
    pub fn target_attribute(&self) -> &str {
        &self.attributes[self.attributes.len() - 1]
    }

    /// Every attribute except the target.
    #[must_use]
    pub fn feature_attributes(&self) -> &[String] {
        &self.attributes[..self.attributes.len() - 1]
    }

    /// The records, in order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the target value of every record.
    pub fn target_values(&self) -> impl Iterator<Item = &str> {
        let target = self.target_attribute();
        self.records.iter().filter_map(move |r| r.get(target))
    }

    /// Draw `size` records at random.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::SampleTooLarge`] when sampling without
    /// replacement asks for more than `len()` records, or when sampling with
    /// replacement asks for any records from an empty dataset.
    pub fn sample(&self, size: usize, sampling: Sampling, rng: &mut impl Rng) -> Result<Self, ForestError> {
        let too_large = match sampling {
            Sampling::WithReplacement => size > 0 && self.is_empty(),
            Sampling::WithoutReplacement => size > self.len(),
        };
        if too_large {
            return Err(ForestError::SampleTooLarge {
                requested: size,
                available: self.len(),
            });
        }

        let records = match sampling {
            Sampling::WithReplacement => (0..size)
                .map(|_| self.records[rng.gen_range(0..self.len())].clone())
                .collect(),
            Sampling::WithoutReplacement => rand::seq::index::sample(rng, self.len(), size)
                .into_iter()
                .map(|i| self.records[i].clone())
                .collect(),
        };
        Ok(self.derive(records))
    }

    /// Split into `(held_out, remaining)` where `held_out` is the index range
    /// `[start, end)` and `remaining` is everything else, both in order.
    ///
    /// Out-of-range bounds are clamped to `len()`.
    #[must_use]
    pub fn split(&self, start: usize, end: usize) -> (Self, Self) {
        let end = end.min(self.len());
        let start = start.min(end);
        let held_out = self.records[start..end].to_vec();
        let remaining = self.records[..start]
            .iter()
            .chain(&self.records[end..])
            .cloned()
            .collect();
        (self.derive(held_out), self.derive(remaining))
    }

    /// Records whose `attribute` equals `value`.
    #[must_use]
    pub fn filter(&self, attribute: &str, value: &str) -> Self {
        let records = self
            .records
            .iter()
            .filter(|r| r.get(attribute) == Some(value))
            .cloned()
            .collect();
        self.derive(records)
    }

    /// Count how often each value of `attribute` occurs, in first-seen order.
    #[must_use]
    pub fn value_frequencies(&self, attribute: &str) -> Tally<'_> {
        self.records.iter().filter_map(|r| r.get(attribute)).collect()
    }

    /// Distinct values of `attribute`, in first-seen order.
    #[must_use]
    pub fn unique_values(&self, attribute: &str) -> Vec<&str> {
        self.value_frequencies(attribute).iter().map(|(v, _)| v).collect()
    }

    /// The most frequent target value. Ties go to the value seen first.
    ///
    /// `None` for an empty dataset.
    #[must_use]
    pub fn majority_class(&self) -> Option<&str> {
        self.value_frequencies(self.target_attribute()).winner()
    }
}
