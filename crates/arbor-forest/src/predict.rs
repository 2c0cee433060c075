//! Prediction methods for the Random Forest ensemble.

use crate::dataset::Record;
use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::tally::Tally;
use crate::tree::DecisionTree;

impl RandomForest {
    /// Classify a single record by majority vote over the trees.
    ///
    /// Trees grown from zero records abstain. Ties go to the class whose
    /// first vote came earliest. Returns `Ok(None)` when every tree abstains.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingAttribute`] if any tree needs an
    /// attribute the record does not carry.
    pub fn classify(&self, record: &Record) -> Result<Option<&str>, ForestError> {
        let mut votes = Tally::new();
        for tree in &self.trees {
            if let Some(class) = tree.classify(record)? {
                votes.add(class);
            }
        }
        Ok(votes.winner())
    }

    /// Lazily classify each record in `records`, preserving input order.
    pub fn classify_many<'a>(
        &'a self,
        records: impl IntoIterator<Item = &'a Record> + 'a,
    ) -> impl Iterator<Item = Result<Option<&'a str>, ForestError>> + 'a {
        records.into_iter().map(move |record| self.classify(record))
    }

    /// Return the number of trees in the forest.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the trees, in build order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
