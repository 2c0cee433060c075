use std::fmt;

use tracing::{debug, instrument};

use crate::{
    ForestError,
    dataset::{Dataset, Record},
    node::Node,
    split::{SplitCriterion, best_attribute},
};

/// Configuration for a single ID3 decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default             |
/// |-------------|---------------------|
/// | `criterion` | `InformationGain`   |
/// | `max_depth` | `None` (unlimited)  |
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::InformationGain,
            max_depth: None,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` means grow until leaves are pure or attributes run out.
    /// `Some(d)` stops splitting at depth `d` (root is depth 0), so
    /// `Some(0)` always yields a single leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Grow a decision tree over every non-target attribute of `dataset`.
    ///
    /// An empty dataset is not an error: it yields a single leaf with no class.
    #[instrument(skip(self, dataset), fields(n_records = dataset.len()))]
    pub fn fit(&self, dataset: &Dataset) -> DecisionTree {
        let root = build_node(dataset, dataset.feature_attributes(), self, 0);
        let tree = DecisionTree { root };
        debug!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "decision tree built"
        );
        tree
    }
}

/// Recursively grow the subtree for `dataset`, splitting only on `candidates`.
fn build_node(dataset: &Dataset, candidates: &[String], config: &DecisionTreeConfig, depth: usize) -> Node {
    let n_records = dataset.len();
    let majority = dataset.majority_class();
    let leaf = |class: Option<&str>| Node::Leaf {
        class: class.map(str::to_string),
        n_records,
    };

    let depth_reached = config.max_depth.is_some_and(|max_d| depth >= max_d);
    if dataset.is_empty() || candidates.is_empty() || depth_reached {
        return leaf(majority);
    }

    if dataset.value_frequencies(dataset.target_attribute()).len() == 1 {
        return leaf(majority);
    }

    let (Some(best), Some(default_class)) = (best_attribute(dataset, candidates, config.criterion), majority)
    else {
        return leaf(majority);
    };

    let remaining: Vec<String> = candidates.iter().filter(|a| *a != best).cloned().collect();
    let children = dataset
        .unique_values(best)
        .into_iter()
        .map(|value| {
            let subset = dataset.filter(best, value);
            let child = build_node(&subset, &remaining, config, depth + 1);
            (value.to_string(), child)
        })
        .collect();

    Node::Split {
        attribute: best.to_string(),
        default_class: default_class.to_string(),
        children,
        n_records,
    }
}

/// A fitted ID3 decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub(crate) root: Node,
}

impl DecisionTree {
    /// Predict the class of a single record.
    ///
    /// Returns `Ok(None)` only for a tree grown from zero records.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingAttribute`] when the record lacks a value
    /// for an attribute on its path through the tree.
    pub fn classify(&self, record: &Record) -> Result<Option<&str>, ForestError> {
        self.root.classify(record)
    }

    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.walk().count()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.walk().filter(|(node, _)| node.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.walk().map(|(_, d)| d).max().unwrap_or(0)
    }

    /// Depth-first walk yielding `(node, depth)` pairs.
    fn walk(&self) -> impl Iterator<Item = (&Node, usize)> {
        let mut stack = vec![(&self.root, 0usize)];
        std::iter::from_fn(move || {
            let (node, d) = stack.pop()?;
            if let Node::Split { children, .. } = node {
                stack.extend(children.iter().map(|(_, child)| (child, d + 1)));
            }
            Some((node, d))
        })
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
