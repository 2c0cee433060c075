//! Configuration builder for Random Forest training.

use crate::dataset::{Dataset, Sampling};
use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::split::SplitCriterion;
use crate::tree::DecisionTreeConfig;

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default           |
/// |----------------|-------------------|
/// | `max_depth`    | `None`            |
/// | `criterion`    | `InformationGain` |
/// | `sampling`     | `WithReplacement` |
/// | `sample_ratio` | 1.0               |
/// | `seed`         | 42                |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) criterion: SplitCriterion,
    pub(crate) sampling: Sampling,
    pub(crate) sample_ratio: f64,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_depth: None,
            criterion: SplitCriterion::InformationGain,
            sampling: Sampling::WithReplacement,
            sample_ratio: 1.0,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set whether per-tree samples are drawn with or without replacement.
    #[must_use]
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the per-tree sample size as a fraction of the training set.
    #[must_use]
    pub fn with_sample_ratio(mut self, sample_ratio: f64) -> Self {
        self.sample_ratio = sample_ratio;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the sampling mode.
    #[must_use]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Return the per-tree sample ratio.
    #[must_use]
    pub fn sample_ratio(&self) -> f64 {
        self.sample_ratio
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of records each tree is trained on for a training set of `n_records`.
    #[must_use]
    pub fn sample_size(&self, n_records: usize) -> usize {
        ((n_records as f64) * self.sample_ratio).ceil() as usize
    }

    /// The per-tree configuration derived from this forest configuration.
    #[must_use]
    pub fn tree_config(&self) -> DecisionTreeConfig {
        DecisionTreeConfig::new()
            .with_criterion(self.criterion)
            .with_max_depth(self.max_depth)
    }

    /// Train a Random Forest on `dataset`.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                     |
    /// |-----------------------------------|------------------------------------------|
    /// | [`ForestError::InvalidSampleRatio`] | `sample_ratio` is not in (0.0, 1.0]    |
    /// | [`ForestError::SampleTooLarge`]     | a per-tree sample cannot be drawn      |
    pub fn fit(&self, dataset: &Dataset) -> Result<RandomForest, ForestError> {
        crate::forest::train(self, dataset)
    }
}
