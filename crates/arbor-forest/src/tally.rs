//! First-seen-order frequency counts over string categories.

use std::collections::HashMap;

/// Counts occurrences of string values, remembering the order in which each
/// distinct value was first seen.
///
/// Counts live in a `Vec` in first-seen order; a `HashMap` from value to
/// position makes each insert O(1), so all-distinct columns stay linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally<'a> {
    counts: Vec<(&'a str, usize)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Tally<'a> {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `value`.
    pub fn add(&mut self, value: &'a str) {
        match self.index.get(value) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(value, self.counts.len());
                self.counts.push((value, 1));
            }
        }
    }

    /// Return the count for `value` (0 if never seen).
    #[must_use]
    pub fn count(&self, value: &str) -> usize {
        self.index.get(value).map_or(0, |&i| self.counts[i].1)
    }

    /// Return the most frequent value.
    ///
    /// Ties go to the value that was seen first. `None` when empty.
    #[must_use]
    pub fn winner(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, usize)> = None;
        for &(value, count) in &self.counts {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Return `true` if nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|&(_, c)| c).sum()
    }

    /// Iterate `(value, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, usize)> + '_ {
        self.counts.iter().copied()
    }
}

impl<'a> FromIterator<&'a str> for Tally<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for value in iter {
            tally.add(value);
        }
        tally
    }
}
