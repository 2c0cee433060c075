//! Random Forest classification over categorical data: train, classify, cross-validate.
//!
//! Provides ID3 decision trees scored by information gain (or Gini gain),
//! bootstrap or without-replacement sampling per tree, parallel training via
//! rayon, majority-vote classification, and contiguous k-fold
//! cross-validation with a confusion matrix over string classes.

mod config;
mod confusion;
mod dataset;
mod entropy;
mod error;
mod eval;
mod forest;
mod node;
mod predict;
mod split;
mod tally;
mod tree;

pub use config::RandomForestConfig;
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::{Dataset, Record, Sampling};
pub use entropy::{entropy, gain, gini, gini_gain};
pub use error::ForestError;
pub use eval::{CrossValidation, CrossValidationResult, FoldResult};
pub use forest::RandomForest;
pub use node::Node;
pub use split::SplitCriterion;
pub use tally::Tally;
pub use tree::{DecisionTree, DecisionTreeConfig};
